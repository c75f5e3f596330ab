//! # swatches
//!
//! Classification of rooted network neighborhoods and comparison of their
//! empirical distributions.
//!
//! Every selected vertex of a colored network is the root of a ball of
//! radius `r`. The ball is reduced to a structural summary under one of five
//! equivalence notions; counting summaries per data preparation gives an
//! empirical distribution that can be compared across preparations.
//!
//! ## Architecture
//!
//! ```text
//! Network → RootedGraph → Classifier → EquivalenceRegistry → EmpiricalDistribution
//!    ↑                        ↓                                     ↓
//!  loader              canonical form, H1 barcode,       metrics, persist, report
//!                      primitive rings, valences, shells
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same networks in the same order + same policy → identical distribution
//! - Class identity is structural (scheme, radius, payload), never a bare hash
//! - Registry iteration is ordered by key, then discovery

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod canon;
pub mod canonical;
pub mod classify;
mod disjoint;
pub mod network;
pub mod policy;
pub mod rooted;
pub mod types;

// Re-exports
pub use analysis::{
    describe_class, DistributionError, DistributionUpdate, EmpiricalDistribution, EquivalenceRegistry,
    PersistError, PrepMatrix,
};
pub use canon::{CanonicalForm, Canonicalizer, ColoredGraph, RefinementCanonicalizer};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};
pub use classify::{
    compute_h1_counts, compute_primitive_rings_global, is_primitive, Classifier, Classify, MobiusTable,
    References, RingClassifier, RingHistograms,
};
pub use network::{LoadError, Network, Vertex};
pub use policy::{ClassificationPolicy, PolicyError, RingStrategy, RootSelection, IDEAL_SILICA};
pub use rooted::{ExtractError, RootedGraph, VertexState};
pub use types::{ClassificationType, Color, EquivalenceClass, Payload, VertexId};

/// Schema version of the persisted distribution format.
/// Increment on breaking changes to the format.
pub const SWATCHES_SCHEMA_VERSION: &str = "1.0.0";

/// Default policy version identifier.
pub const DEFAULT_POLICY_VERSION: &str = "swatches_v1";
