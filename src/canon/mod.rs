//! Canonical labelling of colored graphs.
//!
//! The canonical-form classifier only depends on the [`Canonicalizer`]
//! capability: a colored graph goes in, a canonical quadruple comes out.
//! Two colored graphs are isomorphic (preserving colors) iff their
//! quadruples are equal element-wise.
//!
//! The built-in [`RefinementCanonicalizer`] uses equitable partition
//! refinement plus an individualization search. Bindings to an external
//! automorphism library can implement the same trait.

mod refine;

use serde::{Deserialize, Serialize};

use crate::types::{Color, Payload};

pub use refine::RefinementCanonicalizer;

/// A colored, undirected graph on vertices `0..n`.
///
/// Vertices are expected to be grouped by ascending color; the canonical
/// labelling never moves a vertex out of its color cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColoredGraph {
    colors: Vec<Color>,
    adjacency: Vec<Vec<usize>>,
}

impl ColoredGraph {
    /// Build a colored graph.
    ///
    /// # Panics
    /// Panics if the lengths differ or a neighbor index is out of range.
    pub fn new(colors: Vec<Color>, adjacency: Vec<Vec<usize>>) -> Self {
        assert_eq!(colors.len(), adjacency.len(), "one color per vertex");
        let n = colors.len();
        assert!(
            adjacency.iter().flatten().all(|&u| u < n),
            "neighbor index out of range"
        );
        Self { colors, adjacency }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Vertex colors.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Adjacency lists.
    pub fn adjacency(&self) -> &[Vec<usize>] {
        &self.adjacency
    }

    /// Vertices grouped into cells of equal color, ascending by color.
    pub(crate) fn color_cells(&self) -> Vec<Vec<usize>> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&v| (self.colors[v], v));
        let mut cells: Vec<Vec<usize>> = Vec::new();
        let mut last: Option<Color> = None;
        for v in order {
            if last == Some(self.colors[v]) {
                if let Some(cell) = cells.last_mut() {
                    cell.push(v);
                }
            } else {
                cells.push(vec![v]);
                last = Some(self.colors[v]);
            }
        }
        cells
    }
}

/// Canonical quadruple in the sparse-graph layout used by nauty, plus the
/// color of every cell.
///
/// `partition` only marks cell boundaries; `cell_colors` says which color
/// each cell carries, so balls of equal shape but different colors differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalForm {
    /// Degree of each canonical position.
    pub degrees: Vec<usize>,
    /// Start of each position's neighbor list in `edges`.
    pub offsets: Vec<usize>,
    /// Concatenated, sorted neighbor lists.
    pub edges: Vec<usize>,
    /// `0` marks the last position of a color cell, `1` otherwise.
    pub partition: Vec<u8>,
    /// Color of each cell, ascending.
    pub cell_colors: Vec<Color>,
}

impl CanonicalForm {
    /// Build the form from canonical adjacency rows and `(color, size)` cells.
    pub(crate) fn from_rows(rows: &[Vec<usize>], cells: &[(Color, usize)]) -> Self {
        let degrees: Vec<usize> = rows.iter().map(Vec::len).collect();
        let mut offsets = Vec::with_capacity(rows.len());
        let mut edges = Vec::with_capacity(degrees.iter().sum());
        for row in rows {
            offsets.push(edges.len());
            edges.extend_from_slice(row);
        }
        let mut partition = Vec::with_capacity(rows.len());
        for &(_, size) in cells {
            partition.extend(std::iter::repeat(1u8).take(size.saturating_sub(1)));
            if size > 0 {
                partition.push(0);
            }
        }
        Self {
            degrees,
            offsets,
            edges,
            partition,
            cell_colors: cells.iter().map(|&(color, _)| color).collect(),
        }
    }

    /// Flatten into a five-row payload: degrees, offsets, edges, partition
    /// and cell colors.
    pub fn to_payload(&self) -> Payload {
        let widen = |row: &[usize]| row.iter().map(|&x| x as i64).collect::<Vec<_>>();
        Payload::new(vec![
            widen(&self.degrees),
            widen(&self.offsets),
            widen(&self.edges),
            self.partition.iter().map(|&x| x as i64).collect(),
            self.cell_colors.iter().map(|&c| i64::from(c)).collect(),
        ])
    }
}

/// Capability that maps colored graphs to canonical forms.
pub trait Canonicalizer: std::fmt::Debug + Send + Sync {
    /// Compute the canonical form of `graph`.
    ///
    /// Must return equal forms for graphs that are isomorphic by a
    /// color-preserving bijection, and different forms otherwise.
    fn canonicalize(&self, graph: &ColoredGraph) -> CanonicalForm;
}
