use tracing::trace;

use crate::routing::data_structures::IndexedMinQueue;
use crate::routing::network::graph::{Distance, Graph, PredecessorEdge, VertexId, INFINITY};

/// A path through the graph, listed from origin to destination, and the sum of the weights of
/// the traversed edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub vertices: Vec<VertexId>,
    pub weight: Distance,
}

impl Route {
    pub fn new(vertices: Vec<VertexId>, weight: Distance) -> Self {
        Route { vertices, weight }
    }

    pub fn origin(&self) -> Option<VertexId> {
        self.vertices.first().copied()
    }

    pub fn destination(&self) -> Option<VertexId> {
        self.vertices.last().copied()
    }

    /// Vertices strictly between origin and destination.
    pub fn interior(&self) -> &[VertexId] {
        if self.vertices.len() < 2 {
            return &[];
        }
        &self.vertices[1..self.vertices.len() - 1]
    }

    /// Appends `other`, which has to start where this route ends. The shared vertex is kept once.
    pub fn concat(mut self, other: Route) -> Route {
        debug_assert_eq!(self.destination(), other.origin());
        self.vertices.extend(other.vertices.into_iter().skip(1));
        self.weight = self.weight.saturating_add(other.weight);
        self
    }
}

pub struct Dijkstra {}

impl Dijkstra {
    /// Computes the shortest distance from `origin` to every vertex of the graph. Results are
    /// stored on the vertices (`distance`, `predecessor`, `visited`) and read back with
    /// [`Dijkstra::get_path`].
    ///
    /// Relaxation only accepts strictly shorter distances. Among several shortest paths, the one
    /// found first (in heap extraction and adjacency order) is kept.
    #[tracing::instrument(level = "trace", skip(graph))]
    pub fn run(graph: &mut Graph, origin: VertexId) {
        Self::reset(graph);

        let Some(start) = graph.find_vertex_mut(origin) else {
            trace!("Origin {origin} is not part of the graph. Nothing is reachable.");
            return;
        };
        start.distance = 0;

        let mut queue: IndexedMinQueue<VertexId, Distance> = IndexedMinQueue::new();
        queue.push(origin, 0);

        while let Some((current, current_distance)) = queue.pop() {
            let Some(vertex) = graph.find_vertex_mut(current) else {
                continue;
            };
            vertex.visited = true;

            let edge_count = vertex.out_edges.len();
            for index in 0..edge_count {
                let edge = match graph.find_vertex(current) {
                    Some(vertex) => vertex.out_edges[index],
                    None => break,
                };
                let candidate = current_distance.saturating_add(Distance::from(edge.weight));

                let Some(neighbour) = graph.find_vertex_mut(edge.to) else {
                    continue;
                };
                if candidate >= neighbour.distance {
                    continue;
                }
                neighbour.distance = candidate;
                neighbour.predecessor = Some(PredecessorEdge {
                    origin: current,
                    index,
                });

                if !queue.decrease_key(edge.to, candidate) {
                    queue.push(edge.to, candidate);
                }
            }
        }
    }

    /// Reconstructs the path to `destination` found by the last [`Dijkstra::run`]. Returns `None`
    /// if the destination does not exist or was not reached.
    pub fn get_path(graph: &Graph, destination: VertexId) -> Option<Route> {
        let target = graph.find_vertex(destination)?;
        if target.distance == INFINITY {
            return None;
        }

        let mut vertices = vec![destination];
        let mut weight: Distance = 0;
        let mut predecessor = target.predecessor;

        while let Some(PredecessorEdge { origin, index }) = predecessor {
            let vertex = graph.find_vertex(origin)?;
            let edge = vertex.out_edges.get(index)?;
            debug_assert_eq!(edge.to, *vertices.last()?);
            weight = weight.saturating_add(Distance::from(edge.weight));
            vertices.push(origin);
            predecessor = vertex.predecessor;
        }
        vertices.reverse();

        debug_assert_eq!(weight, target.distance);
        Some(Route::new(vertices, weight))
    }

    /// Runs Dijkstra from `origin` and returns the path to `destination`.
    pub fn route(graph: &mut Graph, origin: VertexId, destination: VertexId) -> Option<Route> {
        Self::run(graph, origin);
        Self::get_path(graph, destination)
    }

    fn reset(graph: &mut Graph) {
        for vertex in graph.vertices_mut() {
            vertex.reset();
        }
    }
}
