use nohash_hasher::IntMap;

use crate::routing::error::RoutingError;

pub type VertexId = u64;
pub type Weight = u32;
/// Sum of edge weights along a path. Wider than [`Weight`] so that path sums never saturate.
pub type Distance = u64;

/// Tentative distance of a vertex that has not been reached.
pub const INFINITY: Distance = Distance::MAX;

/// Directed edge, owned by its origin vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub to: VertexId,
    pub weight: Weight,
}

/// Non-owning reference to the edge a vertex was last relaxed over: the edge sits at `index` in
/// the adjacency list of `origin`. Only valid until the graph is mutated again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredecessorEdge {
    pub origin: VertexId,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub has_parking: bool,
    pub(crate) distance: Distance,
    pub(crate) predecessor: Option<PredecessorEdge>,
    pub(crate) visited: bool,
    pub(crate) out_edges: Vec<Edge>,
    // origins of incoming edges, one entry per edge
    pub(crate) in_edges: Vec<VertexId>,
}

impl Vertex {
    fn new(id: VertexId) -> Self {
        Vertex {
            id,
            has_parking: false,
            distance: INFINITY,
            predecessor: None,
            visited: false,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        }
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

    pub fn predecessor(&self) -> Option<PredecessorEdge> {
        self.predecessor
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn out_edges(&self) -> &[Edge] {
        &self.out_edges
    }

    pub(crate) fn reset(&mut self) {
        self.distance = INFINITY;
        self.predecessor = None;
        self.visited = false;
    }
}

/// Vertex and edge store of a road network. Vertices are keyed by their id, edges are kept in
/// the adjacency list of their origin.
///
/// Routing on a graph is destructive (see [`crate::routing::adjuster`]), so every independent
/// query needs its own copy. `clone` produces a deep copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    vertices: IntMap<VertexId, Vertex>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    /// Adds a vertex without edges. Returns false if the id is already taken, in which case the
    /// graph stays untouched.
    pub fn add_vertex(&mut self, id: VertexId) -> bool {
        if self.vertices.contains_key(&id) {
            return false;
        }
        self.vertices.insert(id, Vertex::new(id));
        true
    }

    pub fn set_parking(&mut self, id: VertexId, has_parking: bool) -> Result<(), RoutingError> {
        let vertex = self
            .vertices
            .get_mut(&id)
            .ok_or(RoutingError::UnknownVertex(id))?;
        vertex.has_parking = has_parking;
        Ok(())
    }

    /// Adds a directed edge. Both endpoints must have been added before.
    pub fn add_edge(
        &mut self,
        from: VertexId,
        to: VertexId,
        weight: Weight,
    ) -> Result<(), RoutingError> {
        if !self.vertices.contains_key(&to) {
            return Err(RoutingError::UnknownVertex(to));
        }
        let origin = self
            .vertices
            .get_mut(&from)
            .ok_or(RoutingError::UnknownVertex(from))?;
        origin.out_edges.push(Edge { to, weight });

        // checked above
        if let Some(destination) = self.vertices.get_mut(&to) {
            destination.in_edges.push(from);
        }
        Ok(())
    }

    pub fn find_vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub(crate) fn find_vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(&id)
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// Returns the first edge from `from` to `to`, if any.
    pub fn find_edge(&self, from: VertexId, to: VertexId) -> Option<&Edge> {
        self.vertices
            .get(&from)?
            .out_edges
            .iter()
            .find(|edge| edge.to == to)
    }

    /// Removes the first directed edge from `from` to `to`. Returns whether an edge was removed.
    pub fn remove_edge(&mut self, from: VertexId, to: VertexId) -> bool {
        let Some(origin) = self.vertices.get_mut(&from) else {
            return false;
        };
        let Some(pos) = origin.out_edges.iter().position(|edge| edge.to == to) else {
            return false;
        };
        origin.out_edges.remove(pos);

        if let Some(destination) = self.vertices.get_mut(&to) {
            if let Some(pos) = destination.in_edges.iter().position(|&id| id == from) {
                destination.in_edges.swap_remove(pos);
            }
        }
        true
    }

    /// Removes a vertex together with all its outgoing and incoming edges. Returns whether the
    /// vertex existed.
    pub fn remove_vertex(&mut self, id: VertexId) -> bool {
        let Some(vertex) = self.vertices.remove(&id) else {
            return false;
        };

        for edge in &vertex.out_edges {
            if let Some(destination) = self.vertices.get_mut(&edge.to) {
                destination.in_edges.retain(|&origin| origin != id);
            }
        }
        for origin in &vertex.in_edges {
            if let Some(origin) = self.vertices.get_mut(origin) {
                origin.out_edges.retain(|edge| edge.to != id);
            }
        }
        true
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub(crate) fn vertices_mut(&mut self) -> impl Iterator<Item = &mut Vertex> {
        self.vertices.values_mut()
    }

    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn number_of_edges(&self) -> usize {
        self.vertices.values().map(|v| v.out_edges.len()).sum()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::routing::error::RoutingError;
    use crate::routing::network::graph::{Edge, Graph, INFINITY};

    /// A(1) -> B(2) -> D(4) with weights 1 and 5, A -> C(3) -> D with weights 2 and 2.
    pub fn get_diamond_test_graph() -> Graph {
        let mut graph = Graph::new();
        for id in 1..=4 {
            graph.add_vertex(id);
        }
        graph.add_edge(1, 2, 1).unwrap();
        graph.add_edge(2, 4, 5).unwrap();
        graph.add_edge(1, 3, 2).unwrap();
        graph.add_edge(3, 4, 2).unwrap();
        graph
    }

    fn assert_no_dangling_edges(graph: &Graph) {
        for vertex in graph.vertices() {
            for edge in vertex.out_edges() {
                assert!(
                    graph.contains_vertex(edge.to),
                    "edge {} -> {} points to a removed vertex",
                    vertex.id,
                    edge.to
                );
            }
            for origin in &vertex.in_edges {
                assert!(graph.contains_vertex(*origin));
            }
        }
    }

    #[test]
    fn add_vertex_twice() {
        let mut graph = Graph::new();
        assert!(graph.add_vertex(1));
        graph.set_parking(1, true).unwrap();
        assert!(!graph.add_vertex(1));

        assert_eq!(graph.number_of_vertices(), 1);
        let vertex = graph.find_vertex(1).unwrap();
        assert!(vertex.has_parking);
        assert_eq!(vertex.distance(), INFINITY);
        assert_eq!(vertex.predecessor(), None);
        assert!(!vertex.is_visited());
    }

    #[test]
    fn add_edge_requires_endpoints() {
        let mut graph = Graph::new();
        graph.add_vertex(1);

        assert_eq!(graph.add_edge(1, 2, 3), Err(RoutingError::UnknownVertex(2)));
        assert_eq!(graph.add_edge(2, 1, 3), Err(RoutingError::UnknownVertex(2)));
        assert_eq!(graph.number_of_edges(), 0);
        assert!(graph.find_vertex(1).unwrap().in_edges.is_empty());
    }

    #[test]
    fn add_and_find_edge() {
        let graph = get_diamond_test_graph();

        assert_eq!(graph.number_of_edges(), 4);
        assert_eq!(graph.find_edge(1, 3), Some(&Edge { to: 3, weight: 2 }));
        // edges are directed
        assert_eq!(graph.find_edge(3, 1), None);
        assert_eq!(
            graph.find_vertex(1).unwrap().out_edges(),
            &[Edge { to: 2, weight: 1 }, Edge { to: 3, weight: 2 }]
        );
    }

    #[test]
    fn remove_edge() {
        let mut graph = get_diamond_test_graph();

        assert!(graph.remove_edge(1, 3));
        assert_eq!(graph.find_edge(1, 3), None);
        assert!(graph.find_vertex(3).unwrap().in_edges.is_empty());
        assert_eq!(graph.number_of_edges(), 3);

        // already gone, wrong direction, unknown vertex
        assert!(!graph.remove_edge(1, 3));
        assert!(!graph.remove_edge(4, 2));
        assert!(!graph.remove_edge(42, 1));
        assert_eq!(graph.number_of_edges(), 3);
    }

    #[test]
    fn remove_edge_removes_single_parallel_edge() {
        let mut graph = Graph::new();
        graph.add_vertex(1);
        graph.add_vertex(2);
        graph.add_edge(1, 2, 7).unwrap();
        graph.add_edge(1, 2, 3).unwrap();

        assert!(graph.remove_edge(1, 2));
        assert_eq!(graph.find_edge(1, 2), Some(&Edge { to: 2, weight: 3 }));
        assert_eq!(graph.find_vertex(2).unwrap().in_edges, vec![1]);
    }

    #[test]
    fn remove_vertex_removes_incident_edges() {
        let mut graph = get_diamond_test_graph();
        graph.add_edge(4, 3, 1).unwrap();

        assert!(graph.remove_vertex(3));

        assert!(graph.find_vertex(3).is_none());
        assert_eq!(graph.find_edge(1, 3), None);
        assert_eq!(graph.find_edge(4, 3), None);
        assert_eq!(graph.number_of_edges(), 2);
        assert_eq!(graph.find_vertex(4).unwrap().in_edges, vec![2]);
        assert_no_dangling_edges(&graph);

        assert!(!graph.remove_vertex(3));
    }

    #[test]
    fn remove_vertex_with_self_loop() {
        let mut graph = get_diamond_test_graph();
        graph.add_edge(2, 2, 1).unwrap();

        assert!(graph.remove_vertex(2));
        assert_eq!(graph.number_of_edges(), 2);
        assert_no_dangling_edges(&graph);
    }

    #[test]
    fn clone_is_deep() {
        let graph = get_diamond_test_graph();
        let mut copy = graph.clone();
        copy.remove_vertex(3);

        assert!(graph.contains_vertex(3));
        assert_eq!(graph.number_of_edges(), 4);
        assert_eq!(copy.number_of_edges(), 2);
    }
}
