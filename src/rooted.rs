//! Radius-bounded neighborhood extraction.
//!
//! A [`RootedGraph`] is a non-owning view of the closed ball of radius `r`
//! around a root vertex, organized into distance shells.
//!
//! ## Algorithm
//!
//! 1. Shell 0 is `{root}`
//! 2. For each of `r` rounds, every unvisited neighbor of the current shell
//!    is tagged with the next depth and appended to the next shell
//! 3. Shells that run past the root's component stay empty
//!
//! ## Scratch State
//!
//! Per-vertex traversal state (BFS distance, local rank) lives in a map owned
//! by the rooted graph, never on the vertices. Dropping the view discards it,
//! so every vertex is neutral before and after each extraction, on every exit
//! path.

use std::collections::HashMap;

use crate::network::Network;
use crate::types::VertexId;

/// Error type for extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// Root vertex is not part of the network.
    #[error("Root vertex not found: {0}")]
    RootNotFound(VertexId),
}

/// Transient state of one vertex inside a rooted graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexState {
    /// Graph distance from the root.
    pub distance: usize,
    /// Position in shell order (root has rank 0).
    pub rank: usize,
}

/// The closed ball of radius `r` around a root, split into shells.
#[derive(Debug)]
pub struct RootedGraph<'a> {
    network: &'a Network,
    radius: usize,
    shells: Vec<Vec<VertexId>>,
    state: HashMap<VertexId, VertexState>,
}

impl<'a> RootedGraph<'a> {
    /// Extract the rooted graph of radius `radius` around `root`.
    pub fn extract(network: &'a Network, root: VertexId, radius: usize) -> Result<Self, ExtractError> {
        if !network.contains(root) {
            return Err(ExtractError::RootNotFound(root));
        }

        let mut state: HashMap<VertexId, VertexState> = HashMap::new();
        state.insert(root, VertexState { distance: 0, rank: 0 });

        let mut shells: Vec<Vec<VertexId>> = Vec::with_capacity(radius + 1);
        shells.push(vec![root]);

        for depth in 1..=radius {
            let mut next_shell = Vec::new();
            for &current in &shells[depth - 1] {
                for &next in network.neighbors(current) {
                    if !state.contains_key(&next) {
                        let rank = state.len();
                        state.insert(next, VertexState { distance: depth, rank });
                        next_shell.push(next);
                    }
                }
            }
            shells.push(next_shell);
        }

        Ok(Self {
            network,
            radius,
            shells,
            state,
        })
    }

    /// The underlying network.
    pub fn network(&self) -> &'a Network {
        self.network
    }

    /// The root vertex.
    pub fn root(&self) -> VertexId {
        self.shells[0][0]
    }

    /// Radius of the ball.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// All shells, `shells()[i]` holding the vertices at distance `i`.
    pub fn shells(&self) -> &[Vec<VertexId>] {
        &self.shells
    }

    /// One shell (empty beyond the radius).
    pub fn shell(&self, i: usize) -> &[VertexId] {
        self.shells.get(i).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of vertices in the ball.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Always false: the root is in the ball.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Check if a vertex is inside the ball.
    pub fn contains(&self, v: VertexId) -> bool {
        self.state.contains_key(&v)
    }

    /// Distance from the root, `None` outside the ball.
    pub fn distance(&self, v: VertexId) -> Option<usize> {
        self.state.get(&v).map(|s| s.distance)
    }

    /// Rank in shell order, `None` outside the ball.
    pub fn rank(&self, v: VertexId) -> Option<usize> {
        self.state.get(&v).map(|s| s.rank)
    }

    /// Every vertex of the ball in shell order (ranks ascending).
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.shells.iter().flatten().copied()
    }

    /// Check that every vertex of shell `i` has degree `pattern[i % pattern.len()]`.
    ///
    /// For example `[4, 2]` accepts perfectly coordinated silica environments
    /// rooted at a silicon. An empty pattern accepts everything.
    pub fn check_valences(&self, pattern: &[usize]) -> bool {
        if pattern.is_empty() {
            return true;
        }
        self.shells.iter().enumerate().all(|(i, shell)| {
            let expected = pattern[i % pattern.len()];
            shell.iter().all(|&v| self.network.degree(v) == expected)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::tests::{cycle, path};
    use proptest::prelude::*;

    #[test]
    fn test_square_shells() {
        let network = cycle(4);
        let rooted = RootedGraph::extract(&network, VertexId::new(0), 1).unwrap();
        assert_eq!(rooted.shell(0), &[VertexId::new(0)]);
        assert_eq!(rooted.shell(1), &[VertexId::new(1), VertexId::new(3)]);
        assert_eq!(rooted.len(), 3);
        assert_eq!(rooted.distance(VertexId::new(2)), None);
    }

    #[test]
    fn test_empty_shells_past_component() {
        let network = path(2);
        let rooted = RootedGraph::extract(&network, VertexId::new(0), 3).unwrap();
        assert_eq!(rooted.shells().len(), 4);
        assert!(rooted.shell(2).is_empty());
        assert!(rooted.shell(3).is_empty());
    }

    #[test]
    fn test_root_not_found() {
        let network = path(2);
        let err = RootedGraph::extract(&network, VertexId::new(5), 1).unwrap_err();
        assert_eq!(err, ExtractError::RootNotFound(VertexId::new(5)));
    }

    #[test]
    fn test_ranks_follow_shell_order() {
        let network = cycle(6);
        let rooted = RootedGraph::extract(&network, VertexId::new(2), 3).unwrap();
        for (expected, v) in rooted.vertices().enumerate() {
            assert_eq!(rooted.rank(v), Some(expected));
        }
    }

    #[test]
    fn test_check_valences() {
        // Star: center degree 4, leaves degree 1.
        let mut network = Network::new(0);
        let center = network.add_vertex(0);
        for _ in 0..4 {
            let leaf = network.add_vertex(1);
            network.add_edge(center, leaf);
        }
        let rooted = RootedGraph::extract(&network, center, 1).unwrap();
        assert!(rooted.check_valences(&[4, 1]));
        assert!(!rooted.check_valences(&[4, 2]));
        assert!(rooted.check_valences(&[]));
    }

    #[test]
    fn test_no_leakage_between_extractions() {
        let network = cycle(7);
        let first: Vec<_> = {
            let rooted = RootedGraph::extract(&network, VertexId::new(0), 2).unwrap();
            rooted.vertices().collect()
        };
        // A different root in between must not disturb a repeated extraction.
        {
            let other = RootedGraph::extract(&network, VertexId::new(3), 3).unwrap();
            assert_eq!(other.len(), 7);
        }
        let again = RootedGraph::extract(&network, VertexId::new(0), 2).unwrap();
        assert_eq!(again.vertices().collect::<Vec<_>>(), first);
        assert_eq!(again.distance(VertexId::new(3)), None);
    }

    fn arb_network() -> impl Strategy<Value = Network> {
        (1usize..14).prop_flat_map(|n| {
            proptest::collection::vec((0..n, 0..n), 0..(3 * n)).prop_map(move |edges| {
                let mut network = Network::new(0);
                for _ in 0..n {
                    network.add_vertex(0);
                }
                for (a, b) in edges {
                    network.add_edge(VertexId::new(a), VertexId::new(b));
                }
                network
            })
        })
    }

    proptest! {
        #[test]
        fn prop_shells_partition_ball(network in arb_network(), root_seed in 0usize..100, radius in 0usize..5) {
            let root = VertexId::new(root_seed % network.len());
            let rooted = RootedGraph::extract(&network, root, radius).unwrap();
            let reference = network.distances_from(root, radius);

            prop_assert_eq!(rooted.shells().len(), radius + 1);
            let mut seen = std::collections::HashSet::new();
            for (i, shell) in rooted.shells().iter().enumerate() {
                for &v in shell {
                    prop_assert!(seen.insert(v), "vertex {} in two shells", v);
                    prop_assert_eq!(reference[v.index()], Some(i));
                    prop_assert_eq!(rooted.distance(v), Some(i));
                }
            }
            let ball_size = reference.iter().filter(|d| d.is_some()).count();
            prop_assert_eq!(seen.len(), ball_size);
        }
    }
}
