//! Classification policy: the parameters of one empirical distribution.
//!
//! ## Fingerprint
//!
//! `params_hash` is xxh64 over the canonical JSON of the policy, so a saved
//! distribution or report can be matched to the run that produced it. The
//! policy has no floats, so no quantization is needed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::selection::RootSelection;
use crate::canonical::canonical_hash_hex;
use crate::types::ClassificationType;
use crate::DEFAULT_POLICY_VERSION;

/// Largest accepted radius. The H1 Möbius table grows as `(r + 1)^4`.
pub const MAX_RADIUS: usize = 32;

/// Error type for policy loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// Radius above [`MAX_RADIUS`].
    #[error("Radius {radius} exceeds maximum {max}")]
    RadiusTooLarge {
        /// Requested radius.
        radius: usize,
        /// Allowed maximum.
        max: usize,
    },

    /// Coordination selection without a pattern.
    #[error("Coordination selection needs a non-empty degree pattern")]
    EmptyCoordinationPattern,

    /// Report would show nothing.
    #[error("Report size must be at least 1")]
    EmptyReport,

    /// Policy file could not be read.
    #[error("Failed to read policy: {0}")]
    Io(#[from] std::io::Error),

    /// Policy JSON is malformed.
    #[error("Failed to parse policy: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How primitive rings are searched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingStrategy {
    /// One pass over all selected roots before classification; each ring
    /// is searched once and credited to all of its vertices.
    #[default]
    Global,
    /// Search each root's ball independently.
    Local,
}

/// Parameters of a classification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationPolicy {
    /// Policy version identifier.
    pub version: String,
    /// Equivalence scheme.
    pub classification: ClassificationType,
    /// Radius of the rooted graphs.
    pub radius: usize,
    /// Which vertices act as roots.
    pub selection: RootSelection,
    /// Primitive ring search mode (ignored by other schemes).
    pub ring_strategy: RingStrategy,
    /// Classes listed per section of the report.
    pub report_top: usize,
    /// Example roots listed per preparation in the report.
    pub report_examples: usize,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            classification: ClassificationType::CanonicalForm,
            radius: 3,
            selection: RootSelection::All,
            ring_strategy: RingStrategy::Global,
            report_top: 10,
            report_examples: 10,
        }
    }
}

impl ClassificationPolicy {
    /// Create a policy with default reporting parameters.
    pub fn new(classification: ClassificationType, radius: usize, selection: RootSelection) -> Self {
        Self {
            classification,
            radius,
            selection,
            ..Self::default()
        }
    }

    /// Parse a policy from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a policy from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.radius > MAX_RADIUS {
            return Err(PolicyError::RadiusTooLarge {
                radius: self.radius,
                max: MAX_RADIUS,
            });
        }
        if matches!(&self.selection, RootSelection::Coordination(pattern) if pattern.is_empty()) {
            return Err(PolicyError::EmptyCoordinationPattern);
        }
        if self.report_top == 0 {
            return Err(PolicyError::EmptyReport);
        }
        Ok(())
    }

    /// Compute a hash of the policy parameters.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(self)
    }
}
