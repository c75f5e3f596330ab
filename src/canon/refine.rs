//! Partition refinement canonicalizer.
//!
//! ## Algorithm
//!
//! 1. Start from the color partition (cells ordered by color)
//! 2. Refine to the coarsest equitable partition: split every cell by the
//!    number of neighbors its vertices have in each cell, repeat until stable
//! 3. If the partition is discrete it defines a labelling (a leaf);
//!    otherwise individualize each vertex of the first smallest non-trivial
//!    cell in turn and recurse
//! 4. The canonical form is the lexicographically smallest leaf adjacency
//!
//! Leaves with the same adjacency as the first or best leaf yield
//! automorphisms. They prune the search twice: the remainder of the subtree
//! is abandoned up to the node where the two paths diverge, and children in
//! the same orbit (under automorphisms fixing the current path) as an
//! already explored child are skipped.

use super::{CanonicalForm, Canonicalizer, ColoredGraph};
use crate::disjoint::UnionFind;
use crate::types::Color;

/// Canonicalizer based on equitable refinement and individualization.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefinementCanonicalizer;

impl RefinementCanonicalizer {
    /// Create a new canonicalizer.
    pub fn new() -> Self {
        Self
    }
}

impl Canonicalizer for RefinementCanonicalizer {
    fn canonicalize(&self, graph: &ColoredGraph) -> CanonicalForm {
        let color_cells = graph.color_cells();
        let cells: Vec<(Color, usize)> = color_cells
            .iter()
            .map(|cell| (graph.colors()[cell[0]], cell.len()))
            .collect();
        if graph.is_empty() {
            return CanonicalForm::from_rows(&[], &cells);
        }

        let mut search = Search::new(graph);
        let mut root = color_cells;
        refine(graph, &mut root);
        let mut path = Vec::new();
        search.explore(root, &mut path);

        let rows = search
            .best
            .map(|leaf| leaf.rows)
            .unwrap_or_default();
        CanonicalForm::from_rows(&rows, &cells)
    }
}

#[derive(Debug, Clone)]
struct Leaf {
    /// `labelling[p]` is the vertex placed at canonical position `p`.
    labelling: Vec<usize>,
    /// Sorted neighbor positions of each position.
    rows: Vec<Vec<usize>>,
    /// Individualized vertices leading to this leaf.
    path: Vec<usize>,
}

struct Search<'g> {
    graph: &'g ColoredGraph,
    first: Option<Leaf>,
    best: Option<Leaf>,
    /// Automorphisms found so far, as vertex permutations.
    generators: Vec<Vec<usize>>,
}

impl<'g> Search<'g> {
    fn new(graph: &'g ColoredGraph) -> Self {
        Self {
            graph,
            first: None,
            best: None,
            generators: Vec::new(),
        }
    }

    /// Explore the subtree below `cells`.
    ///
    /// Returns `Some(depth)` when the caller chain should abandon every node
    /// deeper than `depth`.
    fn explore(&mut self, cells: Vec<Vec<usize>>, path: &mut Vec<usize>) -> Option<usize> {
        let Some(target) = target_cell(&cells) else {
            return self.visit_leaf(&cells, path);
        };

        let depth = path.len();
        let mut explored: Vec<usize> = Vec::new();
        for &v in &cells[target] {
            if !explored.is_empty() && self.in_explored_orbit(v, &explored, path) {
                continue;
            }
            explored.push(v);

            let mut child = individualize(&cells, target, v);
            refine(self.graph, &mut child);
            path.push(v);
            let jump = self.explore(child, path);
            path.pop();

            if let Some(level) = jump {
                if level < depth {
                    return Some(level);
                }
            }
        }
        None
    }

    fn visit_leaf(&mut self, cells: &[Vec<usize>], path: &[usize]) -> Option<usize> {
        let labelling: Vec<usize> = cells.iter().map(|cell| cell[0]).collect();
        let mut position = vec![0usize; labelling.len()];
        for (p, &v) in labelling.iter().enumerate() {
            position[v] = p;
        }
        let rows: Vec<Vec<usize>> = labelling
            .iter()
            .map(|&v| {
                let mut row: Vec<usize> = self.graph.adjacency()[v].iter().map(|&u| position[u]).collect();
                row.sort_unstable();
                row
            })
            .collect();
        let leaf = Leaf {
            labelling,
            rows,
            path: path.to_vec(),
        };

        if self.first.is_none() {
            self.first = Some(leaf.clone());
            self.best = Some(leaf);
            return None;
        }
        let first = self.first.as_ref()?;
        if first.rows == leaf.rows {
            let jump = common_prefix(&first.path, &leaf.path);
            let generator = automorphism(&first.labelling, &leaf.labelling);
            self.generators.push(generator);
            return Some(jump);
        }

        let best = self.best.as_ref().unwrap_or(first);
        match leaf.rows.cmp(&best.rows) {
            std::cmp::Ordering::Equal => {
                let jump = common_prefix(&best.path, &leaf.path);
                let generator = automorphism(&best.labelling, &leaf.labelling);
                self.generators.push(generator);
                Some(jump)
            }
            std::cmp::Ordering::Less => {
                self.best = Some(leaf);
                None
            }
            std::cmp::Ordering::Greater => None,
        }
    }

    /// Check if `v` shares an orbit with an explored sibling under the
    /// automorphisms that fix `path` pointwise.
    fn in_explored_orbit(&self, v: usize, explored: &[usize], path: &[usize]) -> bool {
        let stabilizing: Vec<&Vec<usize>> = self
            .generators
            .iter()
            .filter(|g| path.iter().all(|&p| g[p] == p))
            .collect();
        if stabilizing.is_empty() {
            return false;
        }

        let mut orbits = UnionFind::new(self.graph.len());
        for generator in stabilizing {
            for (x, &y) in generator.iter().enumerate() {
                orbits.union(x, y);
            }
        }
        let root = orbits.find(v);
        explored.iter().any(|&u| orbits.find(u) == root)
    }
}

/// Index of the first smallest cell with more than one vertex.
fn target_cell(cells: &[Vec<usize>]) -> Option<usize> {
    cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.len() > 1)
        .min_by_key(|(i, cell)| (cell.len(), *i))
        .map(|(i, _)| i)
}

fn individualize(cells: &[Vec<usize>], target: usize, v: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::with_capacity(cells.len() + 1);
    for (i, cell) in cells.iter().enumerate() {
        if i == target {
            result.push(vec![v]);
            result.push(cell.iter().copied().filter(|&u| u != v).collect());
        } else {
            result.push(cell.clone());
        }
    }
    result
}

/// Refine an ordered partition to the coarsest equitable partition below it.
///
/// Cells are split in place; the pieces of a cell are ordered by their
/// neighbor-count signature, so the result is labelling-invariant.
fn refine(graph: &ColoredGraph, cells: &mut Vec<Vec<usize>>) {
    let n = graph.len();
    let mut cell_of = vec![0usize; n];
    loop {
        if cells.len() == n {
            return;
        }
        for (ci, cell) in cells.iter().enumerate() {
            for &v in cell {
                cell_of[v] = ci;
            }
        }

        let num_cells = cells.len();
        let mut next: Vec<Vec<usize>> = Vec::with_capacity(num_cells);
        let mut changed = false;
        for cell in cells.iter() {
            if cell.len() == 1 {
                next.push(cell.clone());
                continue;
            }
            let mut keyed: Vec<(Vec<usize>, usize)> = cell
                .iter()
                .map(|&v| {
                    let mut signature = vec![0usize; num_cells];
                    for &u in &graph.adjacency()[v] {
                        signature[cell_of[u]] += 1;
                    }
                    (signature, v)
                })
                .collect();
            keyed.sort();

            let mut pieces = 0;
            let mut iter = keyed.into_iter().peekable();
            while let Some((signature, v)) = iter.next() {
                let mut piece = vec![v];
                while let Some((next_sig, _)) = iter.peek() {
                    if *next_sig != signature {
                        break;
                    }
                    if let Some((_, u)) = iter.next() {
                        piece.push(u);
                    }
                }
                next.push(piece);
                pieces += 1;
            }
            changed |= pieces > 1;
        }
        *cells = next;
        if !changed {
            return;
        }
    }
}

fn common_prefix(a: &[usize], b: &[usize]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Permutation sending `from[p]` to `to[p]` for every position `p`.
fn automorphism(from: &[usize], to: &[usize]) -> Vec<usize> {
    let mut perm = vec![0usize; from.len()];
    for (&x, &y) in from.iter().zip(to) {
        perm[x] = y;
    }
    perm
}
