use std::path::PathBuf;

use thiserror::Error;

use crate::routing::network::graph::{Distance, VertexId};

/// Errors raised by the routing core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("vertex {0} does not exist in the graph")]
    UnknownVertex(VertexId),

    /// The alternative route can never be cheaper than the best route, as it is computed on a
    /// subgraph. If it is, the engine is broken and the result must not be used.
    #[error("alternative route weight {alternative} is below best route weight {primary}")]
    InconsistentAlternative {
        primary: Distance,
        alternative: Distance,
    },
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset file {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid {field} '{value}' in {path:?}")]
    InvalidValue {
        path: PathBuf,
        field: &'static str,
        value: String,
    },

    #[error("distance row references unknown location code '{code}' in {path:?}")]
    UnknownLocation { path: PathBuf, code: String },

    #[error(transparent)]
    Graph(#[from] RoutingError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("failed to read query file {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("line '{0}' is not of the form 'Key:Value'")]
    MalformedLine(String),

    #[error("required field '{0}' is missing")]
    MissingField(&'static str),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("'{value}' is not a valid vertex id for {field}")]
    InvalidId { field: &'static str, value: String },

    #[error("'{0}' is not a valid list of segments, expected '(a,b),(c,d)'")]
    InvalidSegments(String),

    #[error("mode '{0}' is not supported, only 'driving' is")]
    UnsupportedMode(String),

    #[error("query is incomplete: {0}")]
    Incomplete(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value '{value}' for override '{key}'")]
    InvalidOverride { key: String, value: String },
}

/// Everything that can abort a run of the `best_route` binary.
#[derive(Debug, Error)]
pub enum BestRouteError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write result to {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
