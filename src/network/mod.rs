//! Global vertex store.
//!
//! A [`Network`] is an index-addressed arena of colored vertices with
//! symmetric adjacency. It is built once (by the [loader](loader) or
//! programmatically) and then only read during analysis.

pub mod loader;

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::canonical::canonical_hash_hex;
use crate::types::{Color, VertexId};

pub use loader::LoadError;

/// A vertex in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    /// Position in the arena.
    pub id: VertexId,
    /// Vertex color.
    pub color: Color,
    /// Adjacent vertices, in insertion order.
    pub neighbors: Vec<VertexId>,
}

impl Vertex {
    /// Number of neighbors.
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }
}

/// An undirected, colored network tagged with its data preparation.
#[derive(Debug, Clone, Default)]
pub struct Network {
    preparation: usize,
    vertices: Vec<Vertex>,
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    preparation: usize,
    colors: Vec<Color>,
    adjacency: Vec<&'a [VertexId]>,
}

impl Network {
    /// Create an empty network for a preparation.
    pub fn new(preparation: usize) -> Self {
        Self {
            preparation,
            vertices: Vec::new(),
        }
    }

    /// Data preparation this network belongs to.
    pub fn preparation(&self) -> usize {
        self.preparation
    }

    /// Reassign the data preparation.
    pub fn set_preparation(&mut self, preparation: usize) {
        self.preparation = preparation;
    }

    /// Add an isolated vertex and return its id.
    pub fn add_vertex(&mut self, color: Color) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex {
            id,
            color,
            neighbors: Vec::new(),
        });
        id
    }

    /// Add an undirected edge.
    ///
    /// Returns `false` (and changes nothing) for self-loops, unknown ids, or
    /// an edge that already exists.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) {
            return false;
        }
        if self.vertices[a.index()].neighbors.contains(&b) {
            return false;
        }
        self.vertices[a.index()].neighbors.push(b);
        self.vertices[b.index()].neighbors.push(a);
        true
    }

    /// Add a directed adjacency entry, completing it later with [`symmetrize`](Self::symmetrize).
    pub(crate) fn push_neighbor(&mut self, from: VertexId, to: VertexId) {
        self.vertices[from.index()].neighbors.push(to);
    }

    /// Ensure that `u → v` implies `v → u` for every vertex from `start` on.
    pub(crate) fn symmetrize(&mut self, start: usize) {
        for i in start..self.vertices.len() {
            let current = VertexId::new(i);
            for j in 0..self.vertices[i].neighbors.len() {
                let other = self.vertices[i].neighbors[j];
                if other == current {
                    continue;
                }
                if !self.vertices[other.index()].neighbors.contains(&current) {
                    self.vertices[other.index()].neighbors.push(current);
                }
            }
        }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the network has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Check if an id belongs to this network.
    pub fn contains(&self, id: VertexId) -> bool {
        id.index() < self.vertices.len()
    }

    /// Number of undirected edges.
    pub fn num_edges(&self) -> usize {
        self.vertices.iter().map(Vertex::degree).sum::<usize>() / 2
    }

    /// Look up a vertex.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index())
    }

    /// All vertices in id order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All ids in order.
    pub fn ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.iter().map(|v| v.id)
    }

    /// Neighbors of a vertex.
    ///
    /// # Panics
    /// Panics if `id` is not in this network.
    pub fn neighbors(&self, id: VertexId) -> &[VertexId] {
        &self.vertices[id.index()].neighbors
    }

    /// Degree of a vertex.
    ///
    /// # Panics
    /// Panics if `id` is not in this network.
    pub fn degree(&self, id: VertexId) -> usize {
        self.vertices[id.index()].neighbors.len()
    }

    /// Color of a vertex.
    ///
    /// # Panics
    /// Panics if `id` is not in this network.
    pub fn color(&self, id: VertexId) -> Color {
        self.vertices[id.index()].color
    }

    /// Breadth-first distances from `source` to every vertex, up to `limit`.
    ///
    /// Entries beyond the limit or in another component are `None`.
    pub fn distances_from(&self, source: VertexId, limit: usize) -> Vec<Option<usize>> {
        let mut distances = vec![None; self.vertices.len()];
        if !self.contains(source) {
            return distances;
        }
        distances[source.index()] = Some(0);
        let mut queue = VecDeque::from([source]);
        while let Some(current) = queue.pop_front() {
            let depth = distances[current.index()].unwrap_or(0);
            if depth >= limit {
                continue;
            }
            for &next in self.neighbors(current) {
                if distances[next.index()].is_none() {
                    distances[next.index()] = Some(depth + 1);
                    queue.push_back(next);
                }
            }
        }
        distances
    }

    /// Graph distance between two vertices if it is at most `limit`.
    ///
    /// The search only touches the ball of radius `limit` around `from`.
    pub fn distance_within(&self, from: VertexId, to: VertexId, limit: usize) -> Option<usize> {
        if from == to {
            return Some(0);
        }
        let mut seen: HashSet<VertexId> = HashSet::from([from]);
        let mut frontier = vec![from];
        for depth in 1..=limit {
            let mut next_frontier = Vec::new();
            for current in frontier {
                for &next in self.neighbors(current) {
                    if next == to {
                        return Some(depth);
                    }
                    if seen.insert(next) {
                        next_frontier.push(next);
                    }
                }
            }
            if next_frontier.is_empty() {
                break;
            }
            frontier = next_frontier;
        }
        None
    }

    /// Content fingerprint (xxh64 over canonical JSON of colors and adjacency).
    pub fn fingerprint(&self) -> String {
        let input = FingerprintInput {
            preparation: self.preparation,
            colors: self.vertices.iter().map(|v| v.color).collect(),
            adjacency: self.vertices.iter().map(|v| v.neighbors.as_slice()).collect(),
        };
        canonical_hash_hex(&input)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Cycle on `n` vertices, all color 0.
    pub(crate) fn cycle(n: usize) -> Network {
        let mut network = Network::new(0);
        for _ in 0..n {
            network.add_vertex(0);
        }
        for i in 0..n {
            network.add_edge(VertexId::new(i), VertexId::new((i + 1) % n));
        }
        network
    }

    /// Path on `n` vertices, all color 0.
    pub(crate) fn path(n: usize) -> Network {
        let mut network = Network::new(0);
        for _ in 0..n {
            network.add_vertex(0);
        }
        for i in 1..n {
            network.add_edge(VertexId::new(i - 1), VertexId::new(i));
        }
        network
    }

    #[test]
    fn test_add_edge_is_symmetric_and_deduplicated() {
        let mut network = Network::new(0);
        let a = network.add_vertex(0);
        let b = network.add_vertex(1);
        assert!(network.add_edge(a, b));
        assert!(!network.add_edge(b, a));
        assert!(!network.add_edge(a, a));
        assert_eq!(network.neighbors(a), &[b]);
        assert_eq!(network.neighbors(b), &[a]);
        assert_eq!(network.num_edges(), 1);
    }

    #[test]
    fn test_distances_from() {
        let network = path(5);
        let d = network.distances_from(VertexId::new(0), 3);
        assert_eq!(d, vec![Some(0), Some(1), Some(2), Some(3), None]);
    }

    #[test]
    fn test_distance_within_respects_limit() {
        let network = cycle(8);
        let a = VertexId::new(0);
        let b = VertexId::new(4);
        assert_eq!(network.distance_within(a, b, 4), Some(4));
        assert_eq!(network.distance_within(a, b, 3), None);
        assert_eq!(network.distance_within(a, a, 0), Some(0));
    }

    #[test]
    fn test_fingerprint_determinism() {
        assert_eq!(cycle(6).fingerprint(), cycle(6).fingerprint());
        assert_ne!(cycle(6).fingerprint(), path(6).fingerprint());
    }
}
