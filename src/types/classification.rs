//! Classification schemes and their payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five notions of equivalence for rooted graphs.
///
/// The numeric codes are part of the persisted distribution format and must
/// not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationType {
    /// Isomorphism of the ball as a colored graph (code 0).
    CanonicalForm,
    /// Persistent H1 intervals across shell annuli (code 1).
    H1Barcode,
    /// Number of primitive rings of each length through the root (code 2).
    PrimitiveRings,
    /// Sorted degrees of every shell (code 3).
    ValenceProfile,
    /// Population of every shell (code 4).
    ShellCount,
}

/// Error returned for an unknown classification code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown classification type code: {0}")]
pub struct UnknownClassification(pub i64);

impl ClassificationType {
    /// All schemes in code order.
    pub const ALL: [ClassificationType; 5] = [
        Self::CanonicalForm,
        Self::H1Barcode,
        Self::PrimitiveRings,
        Self::ValenceProfile,
        Self::ShellCount,
    ];

    /// Numeric code used by the persisted format.
    pub fn code(&self) -> u8 {
        match self {
            Self::CanonicalForm => 0,
            Self::H1Barcode => 1,
            Self::PrimitiveRings => 2,
            Self::ValenceProfile => 3,
            Self::ShellCount => 4,
        }
    }

    /// Parse a numeric code.
    pub fn from_code(code: i64) -> Result<Self, UnknownClassification> {
        match code {
            0 => Ok(Self::CanonicalForm),
            1 => Ok(Self::H1Barcode),
            2 => Ok(Self::PrimitiveRings),
            3 => Ok(Self::ValenceProfile),
            4 => Ok(Self::ShellCount),
            other => Err(UnknownClassification(other)),
        }
    }

    /// Human-readable description of the equivalence relation.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::CanonicalForm => "graph isomorphism",
            Self::H1Barcode => "H1 barcode equivalence",
            Self::PrimitiveRings => "primitive ring profile equivalence",
            Self::ValenceProfile => "coordination profile equivalence",
            Self::ShellCount => "shell count equivalence",
        }
    }
}

impl fmt::Display for ClassificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CanonicalForm => write!(f, "canonical_form"),
            Self::H1Barcode => write!(f, "h1_barcode"),
            Self::PrimitiveRings => write!(f, "primitive_rings"),
            Self::ValenceProfile => write!(f, "valence_profile"),
            Self::ShellCount => write!(f, "shell_count"),
        }
    }
}

/// Structural summary of a rooted graph.
///
/// The shape depends on the scheme:
///
/// | Scheme | Rows |
/// |--------|------|
/// | `CanonicalForm` | `[degrees, offsets, edges, partition, cell colors]` |
/// | `H1Barcode` | `(r+1) x (r+1)` symmetric interval matrix |
/// | `PrimitiveRings` | one row, entry `L-1` counts primitive `L`-rings |
/// | `ValenceProfile` | one row per shell, ascending degrees |
/// | `ShellCount` | one row of shell populations |
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Payload(Vec<Vec<i64>>);

impl Payload {
    /// Wrap payload rows.
    pub fn new(rows: Vec<Vec<i64>>) -> Self {
        Self(rows)
    }

    /// Single-row payload.
    pub fn single_row(row: Vec<i64>) -> Self {
        Self(vec![row])
    }

    /// Borrow the rows.
    pub fn rows(&self) -> &[Vec<i64>] {
        &self.0
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of entries across all rows.
    pub fn total_len(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    /// Consume into the raw rows.
    pub fn into_rows(self) -> Vec<Vec<i64>> {
        self.0
    }
}

impl From<Vec<Vec<i64>>> for Payload {
    fn from(rows: Vec<Vec<i64>>) -> Self {
        Self(rows)
    }
}
