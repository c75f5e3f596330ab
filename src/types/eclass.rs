//! Equivalence classes of rooted graphs.
//!
//! An equivalence class pairs a structural [`Payload`] with a hash key and
//! the per-preparation bookkeeping (counts, frequencies, examples) used to
//! build empirical distributions.
//!
//! ## Identity
//!
//! Two classes are equal iff they agree on scheme, radius, key and payload.
//! Equal payloads always produce equal keys; the converse does not hold, so
//! registries must compare payloads after a key match.

use serde::{Deserialize, Serialize};

use super::classification::{ClassificationType, Payload};
use super::vertex::VertexId;

const HASH_COMBINE_CONSTANT: u64 = 0x9e37_79b9;

fn hash_combine(key: u64, value: i64) -> u64 {
    key ^ (value as u64)
        .wrapping_add(HASH_COMBINE_CONSTANT)
        .wrapping_add(key << 6)
        .wrapping_add(key >> 2)
}

/// Compute the bucket key of a payload.
///
/// H1 barcodes are seeded with the triangular number of their dimension and
/// only fold the upper triangle, so barcodes of different radii rarely
/// collide. Every other scheme is seeded with its total entry count.
pub fn payload_key(classification: ClassificationType, payload: &Payload) -> u64 {
    match classification {
        ClassificationType::H1Barcode => {
            let n = payload.len() as u64;
            let mut key = n * (n + 1) / 2;
            for (i, row) in payload.rows().iter().enumerate() {
                for &value in row.iter().skip(i) {
                    key = hash_combine(key, value);
                }
            }
            key
        }
        _ => payload
            .rows()
            .iter()
            .flatten()
            .fold(payload.total_len() as u64, |key, &value| hash_combine(key, value)),
    }
}

/// An equivalence class together with its multi-preparation statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquivalenceClass {
    /// Classification scheme.
    pub classification: ClassificationType,
    /// Radius of the rooted graphs in this class.
    pub radius: usize,
    /// Bucket key derived from the payload.
    pub key: u64,
    /// Structural summary shared by every member.
    pub payload: Payload,
    /// Number of roots in the class, per preparation.
    pub counts: Vec<u64>,
    /// `counts[p] / roots[p]`, per preparation.
    pub frequencies: Vec<f64>,
    /// Root ids in order of discovery, per preparation.
    pub examples: Vec<Vec<VertexId>>,
}

impl EquivalenceClass {
    /// Create a class with no observations.
    pub fn new(classification: ClassificationType, radius: usize, payload: Payload) -> Self {
        let key = payload_key(classification, &payload);
        Self {
            classification,
            radius,
            key,
            payload,
            counts: Vec::new(),
            frequencies: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Grow the per-preparation arrays (zero-filled) to `num_preps`.
    ///
    /// Never shrinks.
    pub fn resize(&mut self, num_preps: usize) {
        if self.counts.len() < num_preps {
            self.counts.resize(num_preps, 0);
        }
        if self.frequencies.len() < num_preps {
            self.frequencies.resize(num_preps, 0.0);
        }
        if self.examples.len() < num_preps {
            self.examples.resize_with(num_preps, Vec::new);
        }
    }

    /// Record one more root of this class in `preparation`.
    pub fn record(&mut self, preparation: usize, root: VertexId) {
        self.resize(preparation + 1);
        self.counts[preparation] += 1;
        self.examples[preparation].push(root);
    }

    /// Recompute every frequency from the per-preparation root totals.
    ///
    /// A preparation with zero roots has frequency zero.
    pub fn update_frequencies(&mut self, root_totals: &[u64]) {
        self.resize(root_totals.len());
        for (prep, &total) in root_totals.iter().enumerate() {
            self.frequencies[prep] = if total == 0 {
                0.0
            } else {
                self.counts[prep] as f64 / total as f64
            };
        }
    }

    /// Count in `preparation` (zero if never observed).
    pub fn count(&self, preparation: usize) -> u64 {
        self.counts.get(preparation).copied().unwrap_or(0)
    }

    /// Frequency in `preparation` (zero if never observed).
    pub fn frequency(&self, preparation: usize) -> f64 {
        self.frequencies.get(preparation).copied().unwrap_or(0.0)
    }

    /// Structural identity check used to resolve key collisions.
    pub fn same_class(&self, other: &Self) -> bool {
        self.classification == other.classification
            && self.radius == other.radius
            && self.key == other.key
            && self.payload == other.payload
    }
}

impl PartialEq for EquivalenceClass {
    fn eq(&self, other: &Self) -> bool {
        self.same_class(other)
    }
}

impl Eq for EquivalenceClass {}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell_class(row: Vec<i64>) -> EquivalenceClass {
        EquivalenceClass::new(ClassificationType::ShellCount, 1, Payload::single_row(row))
    }

    #[test]
    fn test_equal_payload_equal_key() {
        let a = shell_class(vec![1, 2]);
        let b = shell_class(vec![1, 2]);
        assert_eq!(a.key, b.key);
        assert_eq!(a, b);
    }

    #[test]
    fn test_order_sensitive_key() {
        let a = shell_class(vec![1, 2]);
        let b = shell_class(vec![2, 1]);
        assert_ne!(a, b);
        assert_ne!(a.key, b.key);
    }

    #[test]
    fn test_radius_and_type_distinguish() {
        let payload = Payload::single_row(vec![1, 2]);
        let a = EquivalenceClass::new(ClassificationType::ShellCount, 1, payload.clone());
        let b = EquivalenceClass::new(ClassificationType::ShellCount, 2, payload.clone());
        let c = EquivalenceClass::new(ClassificationType::PrimitiveRings, 1, payload);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_h1_key_ignores_lower_triangle() {
        let upper = Payload::new(vec![vec![0, 1], vec![0, 0]]);
        let mirrored = Payload::new(vec![vec![0, 1], vec![1, 0]]);
        assert_eq!(
            payload_key(ClassificationType::H1Barcode, &upper),
            payload_key(ClassificationType::H1Barcode, &mirrored)
        );
    }

    #[test]
    fn test_h1_seed_depends_on_dimension() {
        let one = Payload::new(vec![vec![0]]);
        let two = Payload::new(vec![vec![0, 0], vec![0, 0]]);
        assert_ne!(
            payload_key(ClassificationType::H1Barcode, &one),
            payload_key(ClassificationType::H1Barcode, &two)
        );
    }

    #[test]
    fn test_resize_zero_fills() {
        let mut class = shell_class(vec![1]);
        class.record(0, VertexId::new(3));
        class.resize(3);
        assert_eq!(class.counts, vec![1, 0, 0]);
        assert_eq!(class.examples.len(), 3);
        assert!(class.examples[2].is_empty());
    }

    #[test]
    fn test_frequencies_guard_zero_roots() {
        let mut class = shell_class(vec![1]);
        class.record(0, VertexId::new(0));
        class.record(0, VertexId::new(1));
        class.update_frequencies(&[4, 0]);
        assert!((class.frequency(0) - 0.5).abs() < 1e-12);
        assert_eq!(class.frequency(1), 0.0);
    }
}
