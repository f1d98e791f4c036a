//! Destructive graph edits used to force routes around parts of the network.
//!
//! All operations ignore vertices and edges that are already absent.

use tracing::debug;

use crate::routing::network::graph::{Graph, VertexId};

/// Removes the interior of `path` from the graph: first the edges between consecutive interior
/// vertices (including the edge into the last vertex), then the interior vertices with all their
/// remaining edges. The first and the last vertex of the path are kept.
pub fn remove_path(graph: &mut Graph, path: &[VertexId]) {
    if path.len() < 3 {
        return;
    }
    let interior = &path[1..path.len() - 1];

    for pair in path[1..].windows(2) {
        graph.remove_edge(pair[0], pair[1]);
    }
    for &id in interior {
        graph.remove_vertex(id);
    }
    debug!("Removed interior {:?} of path.", interior);
}

/// Removes every listed vertex and its incident edges.
pub fn remove_nodes(graph: &mut Graph, ids: &[VertexId]) {
    let removed = ids.iter().filter(|&&id| graph.remove_vertex(id)).count();
    debug!("Removed {removed} of {} vertices to avoid.", ids.len());
}

/// Removes the directed edge `a -> b` for every listed pair `(a, b)`.
pub fn remove_edges(graph: &mut Graph, pairs: &[(VertexId, VertexId)]) {
    let removed = pairs
        .iter()
        .filter(|&&(from, to)| graph.remove_edge(from, to))
        .count();
    debug!("Removed {removed} of {} segments to avoid.", pairs.len());
}
