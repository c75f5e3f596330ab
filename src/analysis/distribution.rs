//! Multi-preparation empirical distributions of equivalence classes.
//!
//! ## Algorithm
//!
//! For each network handed to [`EmpiricalDistribution::compute`]:
//!
//! 1. Grow the per-preparation arrays if the network's preparation is new
//! 2. Select roots ([`RootSelection`] or caller-supplied ids)
//! 3. Primitive rings only: pick reference vertices and, in global mode,
//!    finish the ring pass over all roots before classifying any of them
//! 4. Extract, classify and record every root in the registry
//! 5. Recompute every class frequency for every preparation
//!
//! ## Determinism Guarantees
//!
//! - Roots are visited in ascending id order (explicit ids in caller order)
//! - Registry iteration is ordered by key, then discovery
//! - Same networks in the same order + same policy → identical distribution

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use super::registry::EquivalenceRegistry;
use crate::canon::{Canonicalizer, RefinementCanonicalizer};
use crate::classify::{
    compute_primitive_rings_global, Classifier, Classify, MobiusTable, References, RingClassifier,
};
use crate::network::Network;
use crate::policy::{ClassificationPolicy, PolicyError, RingStrategy, RootSelection};
use crate::rooted::{ExtractError, RootedGraph};
use crate::types::{ClassificationType, EquivalenceClass, VertexId};

/// Error type for distribution computation.
#[derive(Debug, thiserror::Error)]
pub enum DistributionError {
    /// Explicit root outside the network.
    #[error("Root vertex {root} out of range for network with {len} vertices")]
    RootOutOfRange {
        /// Offending id.
        root: VertexId,
        /// Network size.
        len: usize,
    },

    /// Neighborhood extraction failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Invalid policy.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Summary of one [`EmpiricalDistribution::compute`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionUpdate {
    /// Preparation of the processed network.
    pub preparation: usize,
    /// Content fingerprint of the processed network.
    pub network_fingerprint: String,
    /// Roots classified in this call.
    pub roots: usize,
    /// Classes seen for the first time.
    pub new_classes: usize,
    /// Classes in the distribution after the call.
    pub total_classes: usize,
}

/// Empirical distribution of equivalence classes across preparations.
#[derive(Debug, Clone)]
pub struct EmpiricalDistribution {
    policy: ClassificationPolicy,
    num_preps: usize,
    root_totals: Vec<u64>,
    registry: EquivalenceRegistry,
    mobius: Option<Arc<MobiusTable>>,
    canonicalizer: Arc<dyn Canonicalizer>,
}

impl EmpiricalDistribution {
    /// Create an empty distribution.
    pub fn new(policy: ClassificationPolicy) -> Result<Self, DistributionError> {
        policy.validate()?;
        Ok(Self::from_parts(policy, Vec::new(), EquivalenceRegistry::new()))
    }

    /// Rebuild a distribution from saved statistics.
    pub(crate) fn from_parts(
        policy: ClassificationPolicy,
        root_totals: Vec<u64>,
        registry: EquivalenceRegistry,
    ) -> Self {
        let mobius = (policy.classification == ClassificationType::H1Barcode)
            .then(|| Arc::new(MobiusTable::compute(policy.radius)));
        Self {
            num_preps: root_totals.len(),
            policy,
            root_totals,
            registry,
            mobius,
            canonicalizer: Arc::new(RefinementCanonicalizer::new()),
        }
    }

    /// Use another canonicalizer for canonical-form classification.
    pub fn with_canonicalizer(mut self, canonicalizer: Arc<dyn Canonicalizer>) -> Self {
        self.canonicalizer = canonicalizer;
        self
    }

    /// Classify the selected roots of `network` and fold them into the distribution.
    ///
    /// `explicit_roots` is only read under [`RootSelection::Explicit`].
    pub fn compute(
        &mut self,
        network: &Network,
        explicit_roots: &[VertexId],
    ) -> Result<DistributionUpdate, DistributionError> {
        let preparation = network.preparation();
        let network_fingerprint = network.fingerprint();
        let _span = info_span!(
            "compute_distribution",
            preparation,
            network = %network_fingerprint,
            vertices = network.len(),
            classification = %self.policy.classification,
        )
        .entered();

        if preparation >= self.num_preps {
            self.num_preps = preparation + 1;
            self.root_totals.resize(self.num_preps, 0);
            self.registry.resize_all(self.num_preps);
        }

        let roots = self.select_roots(network, explicit_roots)?;
        self.root_totals[preparation] += roots.len() as u64;
        if roots.is_empty() {
            warn!(preparation, selection = %self.policy.selection, "No root vertices selected");
        }

        let classifier = self.classifier_for(network, &roots)?;
        let mut new_classes = 0;
        for &root in &roots {
            let rooted = RootedGraph::extract(network, root, self.policy.radius)?;
            let payload = classifier.classify(&rooted);
            let candidate = EquivalenceClass::new(self.policy.classification, self.policy.radius, payload);
            if self.registry.observe(candidate, preparation, root, self.num_preps) {
                new_classes += 1;
            }
        }

        self.registry.update_frequencies(&self.root_totals);

        let update = DistributionUpdate {
            preparation,
            network_fingerprint,
            roots: roots.len(),
            new_classes,
            total_classes: self.registry.len(),
        };
        info!(
            roots = update.roots,
            new_classes = update.new_classes,
            total_classes = update.total_classes,
            "Distribution updated"
        );
        Ok(update)
    }

    fn select_roots(&self, network: &Network, explicit_roots: &[VertexId]) -> Result<Vec<VertexId>, DistributionError> {
        if !self.policy.selection.is_explicit() {
            return Ok(self.policy.selection.select(network, self.policy.radius));
        }
        if let Some(&root) = explicit_roots.iter().find(|&&root| !network.contains(root)) {
            return Err(DistributionError::RootOutOfRange {
                root,
                len: network.len(),
            });
        }
        Ok(explicit_roots.to_vec())
    }

    fn classifier_for(&self, network: &Network, roots: &[VertexId]) -> Result<Classifier, DistributionError> {
        let classifier = match self.policy.classification {
            ClassificationType::CanonicalForm => Classifier::CanonicalForm(Arc::clone(&self.canonicalizer)),
            ClassificationType::H1Barcode => match &self.mobius {
                Some(mobius) => Classifier::H1Barcode(Arc::clone(mobius)),
                None => Classifier::h1_barcode(self.policy.radius),
            },
            ClassificationType::PrimitiveRings => {
                let references = References::compute(network, VertexId::new(0));
                match self.policy.ring_strategy {
                    RingStrategy::Local => Classifier::PrimitiveRings(RingClassifier::Local(Arc::new(references))),
                    RingStrategy::Global => {
                        let histograms =
                            compute_primitive_rings_global(network, self.policy.radius, roots, &references)?;
                        debug!(vertices_on_rings = histograms.len(), "Global ring pass complete");
                        Classifier::PrimitiveRings(RingClassifier::Global(Arc::new(histograms)))
                    }
                }
            }
            ClassificationType::ValenceProfile => Classifier::ValenceProfile,
            ClassificationType::ShellCount => Classifier::ShellCount,
        };
        Ok(classifier)
    }

    /// Parameters of this distribution.
    pub fn policy(&self) -> &ClassificationPolicy {
        &self.policy
    }

    /// Classification scheme.
    pub fn classification(&self) -> ClassificationType {
        self.policy.classification
    }

    /// Radius of the rooted graphs.
    pub fn radius(&self) -> usize {
        self.policy.radius
    }

    /// Root selection rule.
    pub fn selection(&self) -> &RootSelection {
        &self.policy.selection
    }

    /// Number of preparations seen (highest index + 1).
    pub fn num_preps(&self) -> usize {
        self.num_preps
    }

    /// Roots classified per preparation.
    pub fn root_totals(&self) -> &[u64] {
        &self.root_totals
    }

    /// The class registry.
    pub fn registry(&self) -> &EquivalenceRegistry {
        &self.registry
    }

    /// Every class, ordered by key.
    pub fn classes(&self) -> impl Iterator<Item = &EquivalenceClass> {
        self.registry.iter()
    }

    /// Every class as an owned list, ordered by key.
    pub fn to_vec(&self) -> Vec<EquivalenceClass> {
        self.registry.iter().cloned().collect()
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if no class was recorded.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::tests::cycle;

    fn policy(classification: ClassificationType, radius: usize) -> ClassificationPolicy {
        ClassificationPolicy::new(classification, radius, RootSelection::All)
    }

    #[test]
    fn test_square_shell_count() {
        let mut distribution = EmpiricalDistribution::new(policy(ClassificationType::ShellCount, 1)).unwrap();
        let update = distribution.compute(&cycle(4), &[]).unwrap();
        assert_eq!(update.roots, 4);
        assert_eq!(update.new_classes, 1);

        let classes = distribution.to_vec();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].payload.rows(), &[vec![1, 2]]);
        assert_eq!(classes[0].counts, vec![4]);
        assert!((classes[0].frequency(0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_update_carries_network_fingerprint() {
        let mut distribution = EmpiricalDistribution::new(policy(ClassificationType::ShellCount, 1)).unwrap();
        let square = cycle(4);
        let first = distribution.compute(&square, &[]).unwrap();
        assert_eq!(first.network_fingerprint, square.fingerprint());
        assert_eq!(first.network_fingerprint.len(), 16);

        let second = distribution.compute(&cycle(5), &[]).unwrap();
        assert_ne!(second.network_fingerprint, first.network_fingerprint);
    }

    #[test]
    fn test_preparations_grow_arrays() {
        let mut distribution = EmpiricalDistribution::new(policy(ClassificationType::ShellCount, 1)).unwrap();
        distribution.compute(&cycle(4), &[]).unwrap();

        let mut second = cycle(5);
        second.set_preparation(2);
        distribution.compute(&second, &[]).unwrap();

        assert_eq!(distribution.num_preps(), 3);
        assert_eq!(distribution.root_totals(), &[4, 0, 5]);
        for class in distribution.classes() {
            assert_eq!(class.counts.len(), 3);
            assert_eq!(class.frequency(1), 0.0);
        }
    }

    #[test]
    fn test_explicit_roots() {
        let mut distribution = EmpiricalDistribution::new(ClassificationPolicy::new(
            ClassificationType::ShellCount,
            1,
            RootSelection::Explicit,
        ))
        .unwrap();
        let update = distribution
            .compute(&cycle(6), &[VertexId::new(1), VertexId::new(4)])
            .unwrap();
        assert_eq!(update.roots, 2);

        let err = distribution.compute(&cycle(6), &[VertexId::new(6)]).unwrap_err();
        assert!(matches!(err, DistributionError::RootOutOfRange { len: 6, .. }));
    }

    #[test]
    fn test_empty_selection_guards_frequencies() {
        let mut distribution = EmpiricalDistribution::new(ClassificationPolicy::new(
            ClassificationType::ShellCount,
            1,
            RootSelection::Color(7),
        ))
        .unwrap();
        let update = distribution.compute(&cycle(4), &[]).unwrap();
        assert_eq!(update.roots, 0);
        assert!(distribution.is_empty());
        assert_eq!(distribution.root_totals(), &[0]);
    }

    #[test]
    fn test_ring_strategies_agree() {
        let mut network = cycle(6);
        network.add_edge(VertexId::new(0), VertexId::new(3));

        let mut global = EmpiricalDistribution::new(policy(ClassificationType::PrimitiveRings, 3)).unwrap();
        global.compute(&network, &[]).unwrap();

        let mut local_policy = policy(ClassificationType::PrimitiveRings, 3);
        local_policy.ring_strategy = RingStrategy::Local;
        let mut local = EmpiricalDistribution::new(local_policy).unwrap();
        local.compute(&network, &[]).unwrap();

        let summarize = |d: &EmpiricalDistribution| {
            d.classes()
                .map(|c| (c.payload.clone(), c.counts.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(summarize(&global), summarize(&local));
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let mut bad = policy(ClassificationType::ShellCount, 1);
        bad.report_top = 0;
        assert!(matches!(
            EmpiricalDistribution::new(bad),
            Err(DistributionError::Policy(PolicyError::EmptyReport))
        ));
    }
}
