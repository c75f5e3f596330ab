//! Classification policy definitions.

pub mod config;
pub mod selection;

pub use config::{ClassificationPolicy, PolicyError, RingStrategy, MAX_RADIUS};
pub use selection::{RootSelection, UnknownSelection, IDEAL_SILICA};
