use derive_builder::Builder;
use tracing::{debug, info};

use crate::routing::adjuster::{remove_edges, remove_nodes, remove_path};
use crate::routing::dijkstra::{Dijkstra, Route};
use crate::routing::error::RoutingError;
use crate::routing::network::graph::{Graph, VertexId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TravelMode {
    #[default]
    Driving,
}

/// Describes one routing request. A query without constraints asks for the best and an
/// alternative route; any constraint turns it into a restricted query.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct Query {
    #[builder(default)]
    pub mode: TravelMode,
    pub source: VertexId,
    pub destination: VertexId,
    #[builder(default)]
    pub avoid_nodes: Vec<VertexId>,
    #[builder(default)]
    pub avoid_segments: Vec<(VertexId, VertexId)>,
    #[builder(default, setter(strip_option))]
    pub include_node: Option<VertexId>,
}

impl Query {
    pub fn is_restricted(&self) -> bool {
        !self.avoid_nodes.is_empty()
            || !self.avoid_segments.is_empty()
            || self.include_node.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternativeRoutes {
    pub best: Option<Route>,
    pub alternative: Option<Route>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedRoutes {
    BestAndAlternative(AlternativeRoutes),
    Restricted(Option<Route>),
}

/// Answers queries against an immutable base graph. Each query runs on its own copy of the
/// graph, as routing removes vertices and edges.
pub struct RoutePlanner<'g> {
    graph: &'g Graph,
}

impl<'g> RoutePlanner<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        RoutePlanner { graph }
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub fn plan(&self, query: &Query) -> Result<PlannedRoutes, RoutingError> {
        let mut graph = self.graph.clone();

        let result = if query.is_restricted() {
            PlannedRoutes::Restricted(restricted_route(
                &mut graph,
                query.source,
                query.destination,
                &query.avoid_nodes,
                &query.avoid_segments,
                query.include_node,
            ))
        } else {
            PlannedRoutes::BestAndAlternative(best_and_alternative(
                &mut graph,
                query.source,
                query.destination,
            )?)
        };
        info!(
            "Planned {:?} route from {} to {}.",
            query.mode, query.source, query.destination
        );
        Ok(result)
    }
}

/// Computes the best route and an alternative that shares no interior vertex with it.
///
/// Destroys the interior of the best route in `graph`.
pub fn best_and_alternative(
    graph: &mut Graph,
    source: VertexId,
    destination: VertexId,
) -> Result<AlternativeRoutes, RoutingError> {
    let Some(best) = Dijkstra::route(graph, source, destination) else {
        debug!("No route from {source} to {destination}.");
        return Ok(AlternativeRoutes {
            best: None,
            alternative: None,
        });
    };

    remove_path(graph, &best.vertices);
    let alternative = Dijkstra::route(graph, source, destination);

    if let Some(alternative) = &alternative {
        check_alternative(&best, alternative)?;
    }

    Ok(AlternativeRoutes {
        best: Some(best),
        alternative,
    })
}

/// The alternative is computed on a subgraph of the graph the best route was found on, so it can
/// never be cheaper. If it is, the engine is broken and the result must not be used.
pub fn check_alternative(best: &Route, alternative: &Route) -> Result<(), RoutingError> {
    if alternative.weight < best.weight {
        return Err(RoutingError::InconsistentAlternative {
            primary: best.weight,
            alternative: alternative.weight,
        });
    }
    Ok(())
}

/// Computes the best route avoiding the given vertices and segments and, if requested, passing
/// through `include_node`. The include node is reached by a shortest path from `source`, and the
/// destination by a shortest path from the include node.
///
/// Removes the avoided vertices and segments from `graph`.
pub fn restricted_route(
    graph: &mut Graph,
    source: VertexId,
    destination: VertexId,
    avoid_nodes: &[VertexId],
    avoid_segments: &[(VertexId, VertexId)],
    include_node: Option<VertexId>,
) -> Option<Route> {
    if !avoid_nodes.is_empty() {
        remove_nodes(graph, avoid_nodes);
    }
    if !avoid_segments.is_empty() {
        remove_edges(graph, avoid_segments);
    }

    let Some(include) = include_node else {
        return Dijkstra::route(graph, source, destination);
    };

    let Some(first_leg) = Dijkstra::route(graph, source, include) else {
        debug!("Include node {include} is not reachable from {source}.");
        return None;
    };
    let Some(second_leg) = Dijkstra::route(graph, include, destination) else {
        debug!("Destination {destination} is not reachable from include node {include}.");
        return None;
    };
    Some(first_leg.concat(second_leg))
}

#[cfg(test)]
mod tests {
    use crate::routing::dijkstra::Route;
    use crate::routing::error::RoutingError;
    use crate::routing::network::graph::tests::get_diamond_test_graph;
    use crate::routing::network::graph::Graph;
    use crate::routing::planner::{
        best_and_alternative, check_alternative, restricted_route, AlternativeRoutes,
        PlannedRoutes, QueryBuilder, RoutePlanner,
    };

    const A: u64 = 1;
    const B: u64 = 2;
    const C: u64 = 3;
    const D: u64 = 4;

    #[test]
    fn best_and_alternative_in_diamond() {
        let mut graph = get_diamond_test_graph();
        let routes = best_and_alternative(&mut graph, A, D).unwrap();

        assert_eq!(routes.best, Some(Route::new(vec![A, C, D], 4)));
        assert_eq!(routes.alternative, Some(Route::new(vec![A, B, D], 6)));
        assert!(!graph.contains_vertex(C));
    }

    #[test]
    fn no_alternative_without_detour() {
        let mut graph = get_diamond_test_graph();
        graph.remove_vertex(B);

        let routes = best_and_alternative(&mut graph, A, D).unwrap();
        assert_eq!(routes.best, Some(Route::new(vec![A, C, D], 4)));
        assert_eq!(routes.alternative, None);
    }

    #[test]
    fn direct_edge_is_its_own_alternative() {
        let mut graph = Graph::new();
        graph.add_vertex(1);
        graph.add_vertex(2);
        graph.add_edge(1, 2, 3).unwrap();

        // no interior, so nothing is removed
        let routes = best_and_alternative(&mut graph, 1, 2).unwrap();
        assert_eq!(routes.best, Some(Route::new(vec![1, 2], 3)));
        assert_eq!(routes.alternative, routes.best);
    }

    #[test]
    fn cheaper_alternative_is_rejected() {
        let best = Route::new(vec![A, C, D], 4);

        assert_eq!(
            check_alternative(&best, &Route::new(vec![A, B, D], 3)),
            Err(RoutingError::InconsistentAlternative {
                primary: 4,
                alternative: 3
            })
        );
        assert_eq!(check_alternative(&best, &Route::new(vec![A, B, D], 4)), Ok(()));
        assert_eq!(check_alternative(&best, &Route::new(vec![A, B, D], 6)), Ok(()));
    }

    #[test]
    fn no_route_at_all() {
        let mut graph = get_diamond_test_graph();
        let routes = best_and_alternative(&mut graph, D, A).unwrap();
        assert_eq!(
            routes,
            AlternativeRoutes {
                best: None,
                alternative: None
            }
        );
        // nothing was removed
        assert_eq!(graph.number_of_vertices(), 4);
    }

    #[test]
    fn alternative_never_cheaper_on_longer_network() {
        // 1 -> 2 -> 3 -> 6 (3), 1 -> 4 -> 6 (4), 1 -> 5 -> 3 (2 + 1), 1 -> 6 (10)
        let mut graph = Graph::new();
        for id in 1..=6 {
            graph.add_vertex(id);
        }
        for (from, to, weight) in [
            (1, 2, 1),
            (2, 3, 1),
            (3, 6, 1),
            (1, 4, 2),
            (4, 6, 2),
            (1, 5, 2),
            (5, 3, 1),
            (1, 6, 10),
        ] {
            graph.add_edge(from, to, weight).unwrap();
        }

        let routes = best_and_alternative(&mut graph, 1, 6).unwrap();
        let best = routes.best.unwrap();
        let alternative = routes.alternative.unwrap();
        assert_eq!(best, Route::new(vec![1, 2, 3, 6], 3));
        assert_eq!(alternative, Route::new(vec![1, 4, 6], 4));
        assert!(alternative.weight >= best.weight);
        assert!(best
            .interior()
            .iter()
            .all(|id| !alternative.vertices.contains(id)));
    }

    #[test]
    fn restricted_avoid_node() {
        let mut graph = get_diamond_test_graph();
        let route = restricted_route(&mut graph, A, D, &[C], &[], None);
        assert_eq!(route, Some(Route::new(vec![A, B, D], 6)));
    }

    #[test]
    fn restricted_avoid_segment() {
        let mut graph = get_diamond_test_graph();
        let route = restricted_route(&mut graph, A, D, &[], &[(C, D)], None);
        assert_eq!(route, Some(Route::new(vec![A, B, D], 6)));
        // the vertex itself is still there
        assert!(graph.contains_vertex(C));
    }

    #[test]
    fn restricted_include_node() {
        let mut graph = get_diamond_test_graph();
        let route = restricted_route(&mut graph, A, D, &[], &[], Some(B)).unwrap();
        assert_eq!(route, Route::new(vec![A, B, D], 6));
        assert_eq!(route.vertices.iter().filter(|&&id| id == B).count(), 1);
    }

    #[test]
    fn include_legs_sum_without_clamping() {
        let mut graph = Graph::new();
        for id in 1..=3 {
            graph.add_vertex(id);
        }
        graph.add_edge(1, 2, 3_000_000_000).unwrap();
        graph.add_edge(2, 3, 3_000_000_000).unwrap();

        let route = restricted_route(&mut graph, 1, 3, &[], &[], Some(2));
        assert_eq!(route, Some(Route::new(vec![1, 2, 3], 6_000_000_000)));
    }

    #[test]
    fn restricted_include_unreachable() {
        let mut graph = get_diamond_test_graph();
        assert_eq!(restricted_route(&mut graph, A, D, &[B], &[], Some(B)), None);

        let mut graph = get_diamond_test_graph();
        graph.add_vertex(5);
        graph.add_edge(1, 5, 1).unwrap();
        assert_eq!(restricted_route(&mut graph, A, D, &[], &[], Some(5)), None);
    }

    #[test]
    fn restricted_include_source_or_destination() {
        let mut graph = get_diamond_test_graph();
        assert_eq!(
            restricted_route(&mut graph, A, D, &[], &[], Some(A)),
            Some(Route::new(vec![A, C, D], 4))
        );
        assert_eq!(
            restricted_route(&mut graph, A, D, &[], &[], Some(D)),
            Some(Route::new(vec![A, C, D], 4))
        );
    }

    #[test]
    fn restricted_combined_constraints() {
        let mut graph = get_diamond_test_graph();
        let route = restricted_route(&mut graph, A, D, &[C], &[(B, D)], None);
        assert_eq!(route, None);
    }

    #[test]
    fn planner_keeps_base_graph() {
        let graph = get_diamond_test_graph();
        let planner = RoutePlanner::new(&graph);

        let unrestricted = QueryBuilder::default()
            .source(A)
            .destination(D)
            .build()
            .unwrap();
        assert!(!unrestricted.is_restricted());
        let first = planner.plan(&unrestricted).unwrap();
        let second = planner.plan(&unrestricted).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            PlannedRoutes::BestAndAlternative(AlternativeRoutes {
                best: Some(Route::new(vec![A, C, D], 4)),
                alternative: Some(Route::new(vec![A, B, D], 6)),
            })
        );

        let restricted = QueryBuilder::default()
            .source(A)
            .destination(D)
            .include_node(C)
            .build()
            .unwrap();
        assert!(restricted.is_restricted());
        assert_eq!(
            planner.plan(&restricted).unwrap(),
            PlannedRoutes::Restricted(Some(Route::new(vec![A, C, D], 4)))
        );

        assert_eq!(graph, get_diamond_test_graph());
    }
}
