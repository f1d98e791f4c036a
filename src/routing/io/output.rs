use std::fmt::Write;
use std::fs;
use std::path::Path;

use itertools::Itertools;

use crate::routing::dijkstra::Route;
use crate::routing::error::BestRouteError;
use crate::routing::planner::{AlternativeRoutes, PlannedRoutes, Query};

/// Renders the answer to a query in the line based result format:
///
/// ```text
/// Source:1
/// Destination:4
/// BestDrivingRoute:1,3,4(4)
/// AlternativeDrivingRoute:1,2,4(6)
/// ```
pub fn format_result(query: &Query, routes: &PlannedRoutes) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = writeln!(out, "Source:{}", query.source);
    let _ = writeln!(out, "Destination:{}", query.destination);

    match routes {
        PlannedRoutes::BestAndAlternative(AlternativeRoutes { best, alternative }) => {
            let _ = writeln!(out, "BestDrivingRoute:{}", format_route(best.as_ref()));
            let _ = writeln!(
                out,
                "AlternativeDrivingRoute:{}",
                format_route(alternative.as_ref())
            );
        }
        PlannedRoutes::Restricted(route) => {
            let _ = writeln!(out, "RestrictedDrivingRoute:{}", format_route(route.as_ref()));
        }
    }
    out
}

/// `1,3,4(4)` or `none`
pub fn format_route(route: Option<&Route>) -> String {
    match route {
        Some(route) => format!("{}({})", route.vertices.iter().join(","), route.weight),
        None => "none".to_string(),
    }
}

pub fn write_result(path: &Path, content: &str) -> Result<(), BestRouteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| BestRouteError::Output {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| BestRouteError::Output {
        path: path.to_path_buf(),
        source,
    })
}
