//! Reads query descriptors, either from a `Key:Value` input file or from command tokens.

use std::fs;
use std::path::Path;

use crate::routing::error::QueryError;
use crate::routing::network::graph::VertexId;
use crate::routing::planner::{Query, QueryBuilder, TravelMode};

/// Placeholder for an absent value in command style input.
pub const EMPTY_TOKEN: &str = "_";

pub fn read_query_file(path: &Path) -> Result<Query, QueryError> {
    let content = fs::read_to_string(path).map_err(|e| QueryError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_query_file(&content)
}

/// Parses the content of an input file, e.g.
///
/// ```text
/// Mode:driving
/// Source:5
/// Destination:4
/// AvoidNodes:2,3
/// AvoidSegments:(1,2),(3,4)
/// IncludeNode:
/// ```
///
/// Keys are case insensitive; empty values mean the constraint is absent.
pub fn parse_query_file(content: &str) -> Result<Query, QueryError> {
    let mut fields = QueryFields::default();

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| QueryError::MalformedLine(line.to_string()))?;
        let value = value.trim();
        let slot = match key.trim().to_ascii_lowercase().as_str() {
            "mode" => &mut fields.mode,
            "source" => &mut fields.source,
            "destination" => &mut fields.destination,
            "avoidnodes" => &mut fields.avoid_nodes,
            "avoidsegments" => &mut fields.avoid_segments,
            "includenode" => &mut fields.include_node,
            _ => return Err(QueryError::UnknownField(key.trim().to_string())),
        };
        *slot = (!value.is_empty()).then_some(value);
    }
    fields.into_query()
}

/// Parses command style input: `mode source destination [avoidNodes] [avoidSegments]
/// [includeNode]`, where `_` stands for an absent constraint.
pub fn parse_query_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Query, QueryError> {
    let token = |index: usize| {
        tokens
            .get(index)
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty() && *t != EMPTY_TOKEN)
    };
    QueryFields {
        mode: token(0),
        source: token(1),
        destination: token(2),
        avoid_nodes: token(3),
        avoid_segments: token(4),
        include_node: token(5),
    }
    .into_query()
}

#[derive(Default)]
struct QueryFields<'a> {
    mode: Option<&'a str>,
    source: Option<&'a str>,
    destination: Option<&'a str>,
    avoid_nodes: Option<&'a str>,
    avoid_segments: Option<&'a str>,
    include_node: Option<&'a str>,
}

impl QueryFields<'_> {
    fn into_query(self) -> Result<Query, QueryError> {
        let mode = parse_mode(self.mode.ok_or(QueryError::MissingField("Mode"))?)?;
        let source = parse_id(
            "Source",
            self.source.ok_or(QueryError::MissingField("Source"))?,
        )?;
        let destination = parse_id(
            "Destination",
            self.destination
                .ok_or(QueryError::MissingField("Destination"))?,
        )?;

        let mut builder = QueryBuilder::default();
        builder
            .mode(mode)
            .source(source)
            .destination(destination)
            .avoid_nodes(self.avoid_nodes.map_or(Ok(Vec::new()), parse_id_list)?)
            .avoid_segments(self.avoid_segments.map_or(Ok(Vec::new()), parse_segments)?);
        if let Some(include) = self.include_node {
            builder.include_node(parse_id("IncludeNode", include)?);
        }
        builder
            .build()
            .map_err(|e| QueryError::Incomplete(e.to_string()))
    }
}

fn parse_mode(value: &str) -> Result<TravelMode, QueryError> {
    if value.eq_ignore_ascii_case("driving") {
        Ok(TravelMode::Driving)
    } else {
        Err(QueryError::UnsupportedMode(value.to_string()))
    }
}

fn parse_id(field: &'static str, value: &str) -> Result<VertexId, QueryError> {
    value.trim().parse().map_err(|_| QueryError::InvalidId {
        field,
        value: value.to_string(),
    })
}

/// `2,3,7`
fn parse_id_list(value: &str) -> Result<Vec<VertexId>, QueryError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| parse_id("AvoidNodes", id))
        .collect()
}

/// `(1,2),(3,4)`
fn parse_segments(value: &str) -> Result<Vec<(VertexId, VertexId)>, QueryError> {
    let invalid = || QueryError::InvalidSegments(value.to_string());
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();

    let mut segments = Vec::new();
    let mut rest = compact.as_str();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('(').ok_or_else(invalid)?;
        let end = inner.find(')').ok_or_else(invalid)?;
        let (from, to) = inner[..end].split_once(',').ok_or_else(invalid)?;
        let from = from.parse().map_err(|_| invalid())?;
        let to = to.parse().map_err(|_| invalid())?;
        segments.push((from, to));

        rest = &inner[end + 1..];
        rest = rest.strip_prefix(',').unwrap_or(rest);
    }
    Ok(segments)
}
