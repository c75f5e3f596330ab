//! Canonical forms of rooted balls.

use std::collections::HashMap;

use crate::canon::{Canonicalizer, ColoredGraph};
use crate::rooted::RootedGraph;
use crate::types::{Payload, VertexId};

/// Lay the ball out as a colored graph grouped by ascending color.
///
/// Within a color, vertices keep shell order. Edges leaving the ball are
/// dropped.
pub fn ball_graph(rooted: &RootedGraph<'_>) -> ColoredGraph {
    let network = rooted.network();
    let mut order: Vec<VertexId> = rooted.vertices().collect();
    order.sort_by_key(|&v| network.color(v));

    let local: HashMap<VertexId, usize> = order.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let colors = order.iter().map(|&v| network.color(v)).collect();
    let adjacency = order
        .iter()
        .map(|&v| {
            network
                .neighbors(v)
                .iter()
                .filter_map(|u| local.get(u).copied())
                .collect()
        })
        .collect();
    ColoredGraph::new(colors, adjacency)
}

/// Canonical-form payload of a rooted ball.
pub fn canonical_form(rooted: &RootedGraph<'_>, canonicalizer: &dyn Canonicalizer) -> Payload {
    canonicalizer.canonicalize(&ball_graph(rooted)).to_payload()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::RefinementCanonicalizer;
    use crate::network::tests::cycle;
    use crate::network::Network;

    #[test]
    fn test_ball_grouped_by_color() {
        let mut network = Network::new(0);
        let a = network.add_vertex(2);
        let b = network.add_vertex(0);
        let c = network.add_vertex(1);
        network.add_edge(a, b);
        network.add_edge(a, c);
        let rooted = RootedGraph::extract(&network, a, 1).unwrap();
        let graph = ball_graph(&rooted);
        assert_eq!(graph.colors(), &[0, 1, 2]);
        assert_eq!(graph.adjacency()[2].len(), 2);
    }

    #[test]
    fn test_edges_outside_ball_dropped() {
        let network = cycle(6);
        let rooted = RootedGraph::extract(&network, VertexId::new(0), 1).unwrap();
        let graph = ball_graph(&rooted);
        assert_eq!(graph.len(), 3);
        let total: usize = graph.adjacency().iter().map(Vec::len).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_vertex_transitive_roots_agree() {
        let network = cycle(7);
        let canonicalizer = RefinementCanonicalizer::new();
        let first = canonical_form(
            &RootedGraph::extract(&network, VertexId::new(0), 2).unwrap(),
            &canonicalizer,
        );
        for v in network.ids() {
            let rooted = RootedGraph::extract(&network, v, 2).unwrap();
            assert_eq!(canonical_form(&rooted, &canonicalizer), first);
        }
    }

    #[test]
    fn test_closed_and_open_balls_differ() {
        let canonicalizer = RefinementCanonicalizer::new();
        let closed = cycle(5);
        let open = cycle(7);
        let a = canonical_form(
            &RootedGraph::extract(&closed, VertexId::new(0), 2).unwrap(),
            &canonicalizer,
        );
        let b = canonical_form(
            &RootedGraph::extract(&open, VertexId::new(0), 2).unwrap(),
            &canonicalizer,
        );
        assert_eq!(a.len(), 5);
        assert_ne!(a, b);
    }
}
