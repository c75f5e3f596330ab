//! Vertex identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Color of a vertex (atomic species in a bond network, cell dimension in a
/// cell complex, ...).
pub type Color = u32;

/// Stable identifier of a vertex in a [`Network`](crate::Network).
///
/// Ids are dense indices into the network's vertex arena and implement `Ord`
/// so that every canonical orientation rule (lower id to higher id) is
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(usize);

impl VertexId {
    /// Create a new id from an arena index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for VertexId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id_ordering() {
        let a = VertexId::new(1);
        let b = VertexId::new(2);
        assert!(a < b);
        assert_eq!(VertexId::from(7).index(), 7);
        assert_eq!(a.to_string(), "1");
    }
}
