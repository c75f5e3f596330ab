//! Degree-based shell summaries.

use crate::rooted::RootedGraph;
use crate::types::Payload;

/// Sorted vertex degrees of every shell, one row per shell.
pub fn valence_profile(rooted: &RootedGraph<'_>) -> Payload {
    let network = rooted.network();
    Payload::new(
        rooted
            .shells()
            .iter()
            .map(|shell| {
                let mut degrees: Vec<i64> = shell.iter().map(|&v| network.degree(v) as i64).collect();
                degrees.sort_unstable();
                degrees
            })
            .collect(),
    )
}

/// Number of vertices in every shell.
pub fn shell_count(rooted: &RootedGraph<'_>) -> Payload {
    Payload::single_row(rooted.shells().iter().map(|shell| shell.len() as i64).collect())
}
