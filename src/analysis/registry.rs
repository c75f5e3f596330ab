//! Key-bucketed store of equivalence classes.

use std::collections::BTreeMap;

use crate::types::{EquivalenceClass, VertexId};

/// Ordered map from payload key to the classes sharing that key.
///
/// Buckets hold more than one class only on hash collisions; membership is
/// decided by [`EquivalenceClass::same_class`]. Iteration follows ascending
/// key, then insertion order within a bucket.
#[derive(Debug, Clone, Default)]
pub struct EquivalenceRegistry {
    buckets: BTreeMap<u64, Vec<EquivalenceClass>>,
}

impl EquivalenceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one root of `candidate`'s class in `preparation`.
    ///
    /// An unseen class is inserted with its arrays sized to `num_preps`.
    /// Returns `true` if the class is new.
    pub fn observe(
        &mut self,
        mut candidate: EquivalenceClass,
        preparation: usize,
        root: VertexId,
        num_preps: usize,
    ) -> bool {
        let bucket = self.buckets.entry(candidate.key).or_default();
        if let Some(existing) = bucket.iter_mut().find(|class| class.same_class(&candidate)) {
            existing.record(preparation, root);
            return false;
        }
        candidate.resize(num_preps);
        candidate.record(preparation, root);
        bucket.push(candidate);
        true
    }

    /// Insert a class with its statistics as-is.
    ///
    /// Used when reloading a saved distribution; no duplicate check.
    pub fn insert(&mut self, class: EquivalenceClass) {
        self.buckets.entry(class.key).or_default().push(class);
    }

    /// Look up the class structurally equal to `probe`.
    pub fn find(&self, probe: &EquivalenceClass) -> Option<&EquivalenceClass> {
        self.buckets
            .get(&probe.key)?
            .iter()
            .find(|class| class.same_class(probe))
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Check if no class was recorded.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of distinct keys.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Iterate over every class.
    pub fn iter(&self) -> impl Iterator<Item = &EquivalenceClass> {
        self.buckets.values().flatten()
    }

    /// Iterate mutably over every class.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EquivalenceClass> {
        self.buckets.values_mut().flatten()
    }

    /// Grow every class to `num_preps` preparations.
    pub fn resize_all(&mut self, num_preps: usize) {
        for class in self.iter_mut() {
            class.resize(num_preps);
        }
    }

    /// Recompute every frequency from per-preparation root totals.
    pub fn update_frequencies(&mut self, root_totals: &[u64]) {
        for class in self.iter_mut() {
            class.update_frequencies(root_totals);
        }
    }
}
