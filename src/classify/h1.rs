//! H1 barcodes of rooted graphs.
//!
//! For every annulus `shells[i..=j]` the first Betti number (independent
//! cycles) is `components - vertices + edges`. The barcode entry
//! `interval[i][j]` counts cycles that are born at shell `i` and die at
//! shell `j`; it is obtained by Möbius inversion of the annulus ranks over
//! the poset of intervals ordered by reversed inclusion.
//!
//! ## Algorithm
//!
//! 1. For each start shell `i`, grow the annulus one shell at a time and
//!    maintain components with a union-find over local ranks
//! 2. Combine the rank table with the precomputed [`MobiusTable`]
//! 3. Mirror the upper triangle so the payload is symmetric

use crate::disjoint::UnionFind;
use crate::rooted::RootedGraph;
use crate::types::Payload;

/// Möbius function of the interval poset for one radius.
///
/// `get(i, j, m, n)` is only meaningful for `i <= m <= n <= j`; every other
/// entry is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobiusTable {
    radius: usize,
    values: Vec<i64>,
}

impl MobiusTable {
    /// Compute the table for intervals inside `0..=radius`.
    pub fn compute(radius: usize) -> Self {
        let dim = radius + 1;
        let mut table = Self {
            radius,
            values: vec![0; dim * dim * dim * dim],
        };

        for i in 0..dim {
            for j in i..dim {
                table.set(i, j, i, j, 1);
                for d in 1..=(j - i) {
                    for m1 in i..=(i + d) {
                        let Some(n1) = (j + m1).checked_sub(d + i) else {
                            continue;
                        };
                        if n1 < m1 {
                            continue;
                        }
                        let mut sum = 0;
                        for m2 in i..=m1 {
                            for n2 in n1..=j {
                                if (m2, n2) != (m1, n1) {
                                    sum += table.get(i, j, m2, n2);
                                }
                            }
                        }
                        table.set(i, j, m1, n1, -sum);
                    }
                }
            }
        }
        table
    }

    /// Radius the table was computed for.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// `μ([i, j], [m, n])`.
    pub fn get(&self, i: usize, j: usize, m: usize, n: usize) -> i64 {
        self.values[self.index(i, j, m, n)]
    }

    fn set(&mut self, i: usize, j: usize, m: usize, n: usize, value: i64) {
        let idx = self.index(i, j, m, n);
        self.values[idx] = value;
    }

    fn index(&self, i: usize, j: usize, m: usize, n: usize) -> usize {
        let dim = self.radius + 1;
        ((i * dim + j) * dim + m) * dim + n
    }
}

/// First Betti number of every annulus `shells[i..=j]`, `i <= j`.
///
/// Entries with `i > j` are zero.
pub fn compute_h1_counts(rooted: &RootedGraph<'_>) -> Vec<Vec<i64>> {
    let network = rooted.network();
    let radius = rooted.radius();
    let mut counts = vec![vec![0i64; radius + 1]; radius + 1];

    for start in 0..=radius {
        let mut components = UnionFind::new(rooted.len());
        let (mut num_components, mut num_vertices, mut num_edges) = (0i64, 0i64, 0i64);

        for end in start..=radius {
            let shell = rooted.shell(end);
            num_vertices += shell.len() as i64;
            num_components += shell.len() as i64;

            for &v in shell {
                let Some(v_rank) = rooted.rank(v) else { continue };
                for &u in network.neighbors(v) {
                    let Some(u_distance) = rooted.distance(u) else { continue };
                    // Same shell: once from the lower id. Otherwise from the farther end.
                    let counted = if u_distance == end {
                        u > v
                    } else {
                        u_distance < end && u_distance >= start
                    };
                    if !counted {
                        continue;
                    }
                    num_edges += 1;
                    if let Some(u_rank) = rooted.rank(u) {
                        if components.union(v_rank, u_rank) {
                            num_components -= 1;
                        }
                    }
                }
            }

            counts[start][end] = num_components - num_vertices + num_edges;
        }
    }
    counts
}

/// Compute the symmetric H1 barcode payload of a rooted graph.
///
/// # Panics
/// Panics if `mobius` was computed for a different radius.
pub fn h1_barcode(rooted: &RootedGraph<'_>, mobius: &MobiusTable) -> Payload {
    let radius = rooted.radius();
    assert_eq!(mobius.radius(), radius, "Möbius table radius mismatch");

    let counts = compute_h1_counts(rooted);
    let mut intervals = vec![vec![0i64; radius + 1]; radius + 1];
    for i in 0..=radius {
        for j in i..=radius {
            let mut value = 0;
            for m in i..=j {
                for n in m..=j {
                    value += counts[m][n] * mobius.get(i, j, m, n);
                }
            }
            intervals[i][j] = value;
            intervals[j][i] = value;
        }
    }
    Payload::new(intervals)
}
