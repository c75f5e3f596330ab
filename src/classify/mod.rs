//! Rooted-graph classifiers.
//!
//! Every scheme maps a [`RootedGraph`] to a [`Payload`]. Two roots fall in
//! the same equivalence class iff their payloads are equal.
//!
//! | Code | Scheme            | Payload                                  |
//! |------|-------------------|------------------------------------------|
//! | 0    | Canonical form    | degrees, offsets, edges, partition, colors |
//! | 1    | H1 barcode        | symmetric `(r+1)×(r+1)` interval matrix   |
//! | 2    | Primitive rings   | `[[c_1, c_2, …]]` ring counts by length   |
//! | 3    | Valence profile   | sorted degrees, one row per shell        |
//! | 4    | Shell count       | `[[|shell_0|, …, |shell_r|]]`             |
//!
//! Schemes that need per-network preparation (the Möbius table for H1, the
//! reference vertices and global ring pass for rings) carry that state in
//! their [`Classifier`] variant.

pub mod canonical_form;
pub mod h1;
pub mod profile;
pub mod rings;

use std::sync::Arc;

use crate::canon::{Canonicalizer, RefinementCanonicalizer};
use crate::rooted::RootedGraph;
use crate::types::{ClassificationType, Payload};

pub use canonical_form::{ball_graph, canonical_form};
pub use h1::{compute_h1_counts, h1_barcode, MobiusTable};
pub use profile::{shell_count, valence_profile};
pub use rings::{compute_primitive_rings_global, is_primitive, primitive_ring_profile, References, RingHistograms};

/// A classification scheme ready to run on rooted graphs.
pub trait Classify {
    /// Scheme implemented by this classifier.
    fn classification(&self) -> ClassificationType;

    /// Compute the payload of a rooted graph.
    fn classify(&self, rooted: &RootedGraph<'_>) -> Payload;
}

/// Primitive ring classifier state.
#[derive(Debug, Clone)]
pub enum RingClassifier {
    /// Search rings inside each root's ball.
    Local(Arc<References>),
    /// Read the result of a completed global pass.
    Global(Arc<RingHistograms>),
}

/// Dispatch over the built-in schemes.
#[derive(Debug, Clone)]
pub enum Classifier {
    /// Canonical form through a pluggable canonicalizer.
    CanonicalForm(Arc<dyn Canonicalizer>),
    /// H1 barcode; the table radius must match the rooted graphs.
    H1Barcode(Arc<MobiusTable>),
    /// Primitive ring profile.
    PrimitiveRings(RingClassifier),
    /// Sorted degrees per shell.
    ValenceProfile,
    /// Vertices per shell.
    ShellCount,
}

impl Classifier {
    /// Canonical-form classifier backed by the built-in canonicalizer.
    pub fn canonical_form() -> Self {
        Classifier::CanonicalForm(Arc::new(RefinementCanonicalizer::new()))
    }

    /// H1 classifier for rooted graphs of `radius`.
    pub fn h1_barcode(radius: usize) -> Self {
        Classifier::H1Barcode(Arc::new(MobiusTable::compute(radius)))
    }
}

impl Classify for Classifier {
    fn classification(&self) -> ClassificationType {
        match self {
            Classifier::CanonicalForm(_) => ClassificationType::CanonicalForm,
            Classifier::H1Barcode(_) => ClassificationType::H1Barcode,
            Classifier::PrimitiveRings(_) => ClassificationType::PrimitiveRings,
            Classifier::ValenceProfile => ClassificationType::ValenceProfile,
            Classifier::ShellCount => ClassificationType::ShellCount,
        }
    }

    fn classify(&self, rooted: &RootedGraph<'_>) -> Payload {
        match self {
            Classifier::CanonicalForm(canonicalizer) => canonical_form(rooted, canonicalizer.as_ref()),
            Classifier::H1Barcode(mobius) => h1_barcode(rooted, mobius),
            Classifier::PrimitiveRings(RingClassifier::Local(references)) => {
                primitive_ring_profile(rooted, references)
            }
            Classifier::PrimitiveRings(RingClassifier::Global(histograms)) => {
                histograms.to_payload(rooted.root())
            }
            Classifier::ValenceProfile => valence_profile(rooted),
            Classifier::ShellCount => shell_count(rooted),
        }
    }
}
