//! Primitive ring statistics (Yuan–Cormack).
//!
//! A ring is primitive if it cannot be split into two smaller rings: for
//! every pair of ring vertices, no path through the network is shorter
//! than the shorter arc of the ring between them.
//!
//! ## Algorithm
//!
//! 1. Walk the shells of a rooted graph. A vertex `v` at distance `d` with
//!    two or more neighbors at `d - 1` closes even candidates (two distinct
//!    shortest paths from the root meet at `v`); a neighbor `w` at distance
//!    `d` closes odd candidates through the edge `v-w`
//! 2. Candidates are built from every distance-monotonic path back to the
//!    root
//! 3. Each candidate is checked pairwise. Distances from a few reference
//!    vertices give a cheap lower bound on pair distances (triangle
//!    inequality); only pairs the bound cannot settle run a bounded BFS
//!
//! ## Global Pass
//!
//! [`compute_primitive_rings_global`] visits every selected root and credits
//! each primitive ring to all of its vertices. A ring is only processed from
//! its lowest-id selected vertex, so it is counted exactly once.
//!
//! Ring detection is exhaustive for rings that fit inside the ball
//! (length up to `2r + 1`); the reference bound only speeds up the check.

use std::collections::{HashMap, HashSet};

use crate::network::Network;
use crate::rooted::{ExtractError, RootedGraph};
use crate::types::{Payload, VertexId};

/// Full distance arrays from a few far-apart reference vertices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    distances: Vec<Vec<Option<usize>>>,
}

impl References {
    /// Pick three references starting from `start`.
    ///
    /// The first is the farthest vertex from `start`, the second the farthest
    /// from the first, the third maximizes the sum of distances to both.
    /// Only the component of `start` is reachable; pairs elsewhere are never
    /// ruled out by the bound.
    pub fn compute(network: &Network, start: VertexId) -> Self {
        if !network.contains(start) {
            return Self::default();
        }
        let limit = network.len();

        let from_start = network.distances_from(start, limit);
        let first = farthest(&from_start).unwrap_or(start);
        let d1 = network.distances_from(first, limit);
        let second = farthest(&d1).unwrap_or(first);
        let d2 = network.distances_from(second, limit);

        let sums: Vec<Option<usize>> = d1
            .iter()
            .zip(&d2)
            .map(|(a, b)| Some((*a)? + (*b)?))
            .collect();
        let third = farthest(&sums).unwrap_or(first);
        let d3 = network.distances_from(third, limit);

        Self {
            distances: vec![d1, d2, d3],
        }
    }

    /// Number of reference vertices.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Check if there are no references.
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Check if some reference proves `dist(a, b) >= ring_distance`.
    pub fn rules_out_shortcut(&self, a: VertexId, b: VertexId, ring_distance: usize) -> bool {
        self.distances.iter().any(|row| {
            match (row.get(a.index()).copied().flatten(), row.get(b.index()).copied().flatten()) {
                (Some(da), Some(db)) => da.abs_diff(db) >= ring_distance,
                _ => false,
            }
        })
    }
}

/// First vertex with the strictly largest finite value.
fn farthest(values: &[Option<usize>]) -> Option<VertexId> {
    let mut best: Option<(usize, usize)> = None;
    for (index, value) in values.iter().enumerate() {
        if let Some(score) = *value {
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((index, score));
            }
        }
    }
    best.map(|(index, _)| VertexId::new(index))
}

/// Which vertices a ring search may step on.
#[derive(Debug, Clone, Copy)]
enum RingScope<'s> {
    /// Every vertex of the ball.
    Local,
    /// Skip selected roots with a lower id than the current root.
    Global(&'s HashSet<VertexId>),
}

impl RingScope<'_> {
    fn allows(&self, root: VertexId, v: VertexId) -> bool {
        match self {
            RingScope::Local => true,
            RingScope::Global(selected) => v > root || !selected.contains(&v),
        }
    }
}

/// Every distance-monotonic path from `sink` back to the root, sink first.
fn monotone_paths(rooted: &RootedGraph<'_>, sink: VertexId, scope: RingScope<'_>) -> Vec<Vec<VertexId>> {
    let network = rooted.network();
    let root = rooted.root();
    let mut complete = Vec::new();
    let mut stack = vec![vec![sink]];

    while let Some(path) = stack.pop() {
        let Some(&current) = path.last() else { continue };
        let Some(depth) = rooted.distance(current) else { continue };
        for &next in network.neighbors(current) {
            if next == root {
                let mut done = path.clone();
                done.push(root);
                complete.push(done);
            } else if rooted.distance(next).is_some_and(|d| d + 1 == depth) && scope.allows(root, next) {
                let mut extended = path.clone();
                extended.push(next);
                stack.push(extended);
            }
        }
    }
    complete
}

/// Candidate rings through the root of `rooted`, in cyclic vertex order.
fn candidate_rings(rooted: &RootedGraph<'_>, scope: RingScope<'_>) -> Vec<Vec<VertexId>> {
    let network = rooted.network();
    let root = rooted.root();
    let mut rings = Vec::new();

    for depth in 1..=rooted.radius() {
        for &v in rooted.shell(depth) {
            if !scope.allows(root, v) {
                continue;
            }
            let neighbors = network.neighbors(v);
            let num_shorter = neighbors
                .iter()
                .filter(|&&u| rooted.distance(u) == Some(depth - 1))
                .count();
            let closing: Vec<VertexId> = neighbors
                .iter()
                .copied()
                .filter(|&w| w > v && rooted.distance(w) == Some(depth) && scope.allows(root, w))
                .collect();
            if num_shorter < 2 && closing.is_empty() {
                continue;
            }

            let paths = monotone_paths(rooted, v, scope);

            if num_shorter >= 2 {
                for (j, left) in paths.iter().enumerate() {
                    for right in &paths[j + 1..] {
                        let mut ring = left.clone();
                        ring.extend(right[1..right.len() - 1].iter().rev());
                        rings.push(ring);
                    }
                }
            }

            for w in closing {
                let other_paths = monotone_paths(rooted, w, scope);
                for left in &paths {
                    for right in &other_paths {
                        let mut ring = left.clone();
                        ring.extend(right[..right.len() - 1].iter().rev());
                        rings.push(ring);
                    }
                }
            }
        }
    }
    rings
}

/// Check if a closed walk is a primitive ring.
///
/// A repeated vertex is reported as not primitive.
pub fn is_primitive(network: &Network, ring: &[VertexId], references: &References) -> bool {
    let size = ring.len();
    for i in 0..size {
        for j in (i + 1)..size {
            let ring_distance = (j - i).min(size - (j - i));
            if references.rules_out_shortcut(ring[i], ring[j], ring_distance) {
                continue;
            }
            if network
                .distance_within(ring[i], ring[j], ring_distance - 1)
                .is_some()
            {
                return false;
            }
        }
    }
    true
}

/// Per-vertex counts of primitive rings by length.
///
/// `profile(v)[L - 1]` is the number of primitive rings of length `L`
/// through `v`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingHistograms {
    profiles: HashMap<VertexId, Vec<u64>>,
}

impl RingHistograms {
    /// Create an empty set of histograms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit one ring to each of its vertices.
    pub fn add_ring(&mut self, ring: &[VertexId]) {
        let length = ring.len();
        if length == 0 {
            return;
        }
        for &v in ring {
            let profile = self.profiles.entry(v).or_default();
            if profile.len() < length {
                profile.resize(length, 0);
            }
            profile[length - 1] += 1;
        }
    }

    /// Fold another set of histograms into this one.
    pub fn merge(&mut self, other: RingHistograms) {
        for (v, counts) in other.profiles {
            let profile = self.profiles.entry(v).or_default();
            if profile.len() < counts.len() {
                profile.resize(counts.len(), 0);
            }
            for (slot, count) in profile.iter_mut().zip(counts) {
                *slot += count;
            }
        }
    }

    /// Ring counts of `v` (empty if it lies on no ring).
    pub fn profile(&self, v: VertexId) -> &[u64] {
        self.profiles.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of vertices lying on at least one ring.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if no ring was recorded.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// One-row payload for `v`.
    pub fn to_payload(&self, v: VertexId) -> Payload {
        Payload::single_row(self.profile(v).iter().map(|&c| c as i64).collect())
    }
}

/// Primitive ring profile of the root, considering only the root's ball.
pub fn primitive_ring_profile(rooted: &RootedGraph<'_>, references: &References) -> Payload {
    let mut histograms = RingHistograms::new();
    for ring in candidate_rings(rooted, RingScope::Local) {
        if is_primitive(rooted.network(), &ring, references) {
            histograms.add_ring(&ring);
        }
    }
    histograms.to_payload(rooted.root())
}

/// Count primitive rings through every vertex, searching from each selected root.
///
/// Duplicate roots are processed once.
pub fn compute_primitive_rings_global(
    network: &Network,
    radius: usize,
    roots: &[VertexId],
    references: &References,
) -> Result<RingHistograms, ExtractError> {
    let selected: HashSet<VertexId> = roots.iter().copied().collect();
    let mut processed: HashSet<VertexId> = HashSet::with_capacity(roots.len());
    let mut histograms = RingHistograms::new();

    for &root in roots {
        if !processed.insert(root) {
            continue;
        }
        let rooted = RootedGraph::extract(network, root, radius)?;
        for ring in candidate_rings(&rooted, RingScope::Global(&selected)) {
            if is_primitive(network, &ring, references) {
                histograms.add_ring(&ring);
            }
        }
    }
    Ok(histograms)
}
