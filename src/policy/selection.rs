//! Root selection rules.
//!
//! ## Persisted Codes
//!
//! | Code | Rule |
//! |------|------|
//! | `c >= 0` | every vertex of color `c` |
//! | `-1` | every vertex |
//! | `-2` | coordination pattern `[4, 2]` |
//! | `-3` | caller-supplied ids |
//!
//! Only the ideal silica pattern has a code; other coordination patterns
//! are written as `-2` and reload as `[4, 2]`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::network::Network;
use crate::rooted::RootedGraph;
use crate::types::{Color, VertexId};

/// Degrees of a perfectly coordinated silica network rooted at silicon.
pub const IDEAL_SILICA: [usize; 2] = [4, 2];

/// Error returned for an unknown selection code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown root selection code: {0}")]
pub struct UnknownSelection(pub i64);

/// Which vertices of a network act as roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootSelection {
    /// Every vertex.
    #[default]
    All,
    /// Every vertex of one color.
    Color(Color),
    /// Vertices whose ball matches a per-shell degree pattern.
    Coordination(Vec<usize>),
    /// Ids supplied with each network.
    Explicit,
}

impl RootSelection {
    /// Coordination rule for ideal silica.
    pub fn ideal_silica() -> Self {
        RootSelection::Coordination(IDEAL_SILICA.to_vec())
    }

    /// Numeric code used by the persisted format.
    pub fn code(&self) -> i64 {
        match self {
            RootSelection::Color(color) => i64::from(*color),
            RootSelection::All => -1,
            RootSelection::Coordination(_) => -2,
            RootSelection::Explicit => -3,
        }
    }

    /// Parse a numeric code.
    pub fn from_code(code: i64) -> Result<Self, UnknownSelection> {
        match code {
            -1 => Ok(RootSelection::All),
            -2 => Ok(RootSelection::ideal_silica()),
            -3 => Ok(RootSelection::Explicit),
            c if c >= 0 => Color::try_from(c)
                .map(RootSelection::Color)
                .map_err(|_| UnknownSelection(code)),
            other => Err(UnknownSelection(other)),
        }
    }

    /// Check if roots are supplied by the caller.
    pub fn is_explicit(&self) -> bool {
        matches!(self, RootSelection::Explicit)
    }

    /// Roots of `network` in ascending id order.
    ///
    /// [`RootSelection::Explicit`] selects nothing on its own.
    pub fn select(&self, network: &Network, radius: usize) -> Vec<VertexId> {
        match self {
            RootSelection::All => network.ids().collect(),
            RootSelection::Color(color) => network.ids().filter(|&v| network.color(v) == *color).collect(),
            RootSelection::Coordination(pattern) => network
                .ids()
                .filter(|&v| {
                    RootedGraph::extract(network, v, radius).is_ok_and(|rooted| rooted.check_valences(pattern))
                })
                .collect(),
            RootSelection::Explicit => Vec::new(),
        }
    }
}

impl fmt::Display for RootSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootSelection::All => write!(f, "all vertices"),
            RootSelection::Color(color) => write!(f, "color {}", color),
            RootSelection::Coordination(pattern) => write!(f, "coordination {:?}", pattern),
            RootSelection::Explicit => write!(f, "explicit roots"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Silicon (color 0) bonded to four oxygens (color 1), one of them
    /// dangling.
    fn silica_fragment() -> Network {
        let mut network = Network::new(0);
        let si = network.add_vertex(0);
        let other_si = network.add_vertex(0);
        let mut oxygens = Vec::new();
        for _ in 0..4 {
            let o = network.add_vertex(1);
            network.add_edge(si, o);
            oxygens.push(o);
        }
        for &o in &oxygens[..3] {
            network.add_edge(other_si, o);
        }
        network
    }

    #[test]
    fn test_codes() {
        for selection in [
            RootSelection::All,
            RootSelection::Color(14),
            RootSelection::ideal_silica(),
            RootSelection::Explicit,
        ] {
            assert_eq!(RootSelection::from_code(selection.code()).unwrap(), selection);
        }
        assert_eq!(RootSelection::from_code(-7), Err(UnknownSelection(-7)));
    }

    #[test]
    fn test_select_by_color() {
        let network = silica_fragment();
        let roots = RootSelection::Color(0).select(&network, 1);
        assert_eq!(roots, vec![VertexId::new(0), VertexId::new(1)]);
        assert_eq!(RootSelection::All.select(&network, 1).len(), 6);
        assert!(RootSelection::Explicit.select(&network, 1).is_empty());
    }

    #[test]
    fn test_select_by_coordination() {
        let network = silica_fragment();
        // The first silicon has four oxygens, one of which is dangling.
        let roots = RootSelection::ideal_silica().select(&network, 1);
        assert!(roots.is_empty());

        let roots = RootSelection::Coordination(vec![4]).select(&network, 0);
        assert_eq!(roots, vec![VertexId::new(0)]);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&RootSelection::Color(3)).unwrap();
        assert_eq!(json, r#"{"color":3}"#);
        let back: RootSelection = serde_json::from_str(r#""all""#).unwrap();
        assert_eq!(back, RootSelection::All);
    }
}
