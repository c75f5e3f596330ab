//! Distances and entropies between preparations.
//!
//! All metrics are computed over the class frequencies of a distribution.
//! With a single preparation there is nothing to compare: a warning is
//! logged and the result is all zeros.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::warn;

use super::distribution::EmpiricalDistribution;

/// Square matrix indexed by preparation.
pub type PrepMatrix = Vec<Vec<f64>>;

impl EmpiricalDistribution {
    /// Symmetric matrix of Lp distances `(Σ |f_j - f_k|^p)^(1/p)`.
    ///
    /// # Panics
    /// Panics if `p` is zero.
    pub fn lp_distance(&self, p: u32) -> PrepMatrix {
        assert!(p > 0, "Lp exponent must be positive");
        let n = self.num_preps();
        let mut distances = vec![vec![0.0; n]; n];
        if n == 1 {
            warn!("Only one preparation, cannot compute Lp distance");
            return distances;
        }

        let exponent = f64::from(p);
        for class in self.classes() {
            for j in 0..n {
                for k in (j + 1)..n {
                    distances[j][k] += (class.frequency(j) - class.frequency(k)).abs().powf(exponent);
                }
            }
        }
        for j in 0..n {
            for k in (j + 1)..n {
                distances[j][k] = distances[j][k].powf(1.0 / f64::from(p));
                distances[k][j] = distances[j][k];
            }
        }
        distances
    }

    /// KL divergences `D(j || k) = Σ f_j ln(f_j / f_k)`, both directions.
    ///
    /// Classes missing from either preparation are skipped, so the result
    /// stays finite on sparse data.
    pub fn kl_divergence(&self) -> PrepMatrix {
        let n = self.num_preps();
        let mut divergences = vec![vec![0.0; n]; n];
        if n == 1 {
            warn!("Only one preparation, cannot compute KL divergence");
            return divergences;
        }

        for class in self.classes() {
            for j in 0..n {
                for k in (j + 1)..n {
                    let (p, q) = (class.frequency(j), class.frequency(k));
                    if p != 0.0 && q != 0.0 {
                        divergences[j][k] += p * (p / q).ln();
                        divergences[k][j] += q * (q / p).ln();
                    }
                }
            }
        }
        divergences
    }

    /// Unnormalized Shannon entropy `-Σ f ln f` of every preparation.
    pub fn shannon_entropy(&self) -> Vec<f64> {
        let n = self.num_preps();
        let mut entropies = vec![0.0; n];
        for class in self.classes() {
            for (prep, entropy) in entropies.iter_mut().enumerate() {
                if class.count(prep) != 0 {
                    let f = class.frequency(prep);
                    *entropy -= f * f.ln();
                }
            }
        }
        entropies
    }
}

/// Write a matrix, one space-separated row per line.
pub fn write_matrix(path: impl AsRef<Path>, matrix: &[Vec<f64>]) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for row in matrix {
        write_row(&mut out, row)?;
    }
    out.flush()
}

/// Write a vector as a single space-separated line.
pub fn write_vector(path: impl AsRef<Path>, values: &[f64]) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_row(&mut out, values)?;
    out.flush()
}

fn write_row<W: Write>(out: &mut W, row: &[f64]) -> std::io::Result<()> {
    let line: Vec<String> = row.iter().map(|x| x.to_string()).collect();
    writeln!(out, "{}", line.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::tests::{cycle, path};
    use crate::policy::{ClassificationPolicy, RootSelection};
    use crate::types::ClassificationType;

    fn shell_distribution(networks: Vec<crate::network::Network>) -> EmpiricalDistribution {
        let policy = ClassificationPolicy::new(ClassificationType::ShellCount, 1, RootSelection::All);
        let mut distribution = EmpiricalDistribution::new(policy).unwrap();
        for (prep, mut network) in networks.into_iter().enumerate() {
            network.set_preparation(prep);
            distribution.compute(&network, &[]).unwrap();
        }
        distribution
    }

    #[test]
    fn test_identical_preparations() {
        let distribution = shell_distribution(vec![cycle(5), cycle(8)]);
        let l1 = distribution.lp_distance(1);
        assert_eq!(l1[0][1], 0.0);
        let kl = distribution.kl_divergence();
        assert_eq!(kl[0][1], 0.0);
        assert_eq!(kl[1][0], 0.0);
    }

    #[test]
    fn test_disjoint_preparations() {
        // Cycle: every root sees [1, 2]. Path of 3: [1, 1] twice, [1, 2] once.
        let distribution = shell_distribution(vec![cycle(4), path(3)]);
        let l1 = distribution.lp_distance(1);
        // |1 - 1/3| + |0 - 2/3| = 4/3
        assert!((l1[0][1] - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(l1[0][1], l1[1][0]);
        assert_eq!(l1[0][0], 0.0);

        let l2 = distribution.lp_distance(2);
        let expected = ((2.0f64 / 3.0).powi(2) * 2.0).sqrt();
        assert!((l2[0][1] - expected).abs() < 1e-12);

        // Only the shared class contributes.
        let kl = distribution.kl_divergence();
        assert!((kl[0][1] - (3.0f64).ln()).abs() < 1e-12);
        assert!((kl[1][0] - (1.0 / 3.0) * (1.0f64 / 3.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_large_exponent_does_not_grow() {
        let distribution = shell_distribution(vec![cycle(4), path(3)]);
        let l2 = distribution.lp_distance(2)[0][1];
        for p in [1u32 << 31, u32::MAX] {
            let lp = distribution.lp_distance(p)[0][1];
            assert!(lp.is_finite());
            assert!(lp <= l2, "L{p} = {lp} exceeds L2 = {l2}");
        }
    }

    #[test]
    fn test_entropy() {
        let distribution = shell_distribution(vec![cycle(4), path(3)]);
        let entropy = distribution.shannon_entropy();
        assert_eq!(entropy[0], 0.0);
        let expected = -(1.0 / 3.0) * (1.0f64 / 3.0).ln() - (2.0 / 3.0) * (2.0f64 / 3.0).ln();
        assert!((entropy[1] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_single_preparation_is_zero() {
        let distribution = shell_distribution(vec![path(4)]);
        assert_eq!(distribution.lp_distance(2), vec![vec![0.0]]);
        assert_eq!(distribution.kl_divergence(), vec![vec![0.0]]);
        assert!(distribution.shannon_entropy()[0] > 0.0);
    }

    #[test]
    fn test_write_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("out_L1.txt");
        write_matrix(&file, &[vec![0.0, 0.5], vec![0.5, 0.0]]).unwrap();
        let text = std::fs::read_to_string(&file).unwrap();
        assert_eq!(text, "0 0.5\n0.5 0\n");
    }
}
