//! Core types for rooted-neighborhood classification.

pub mod vertex;
pub mod classification;
pub mod eclass;

pub use vertex::{VertexId, Color};
pub use classification::{ClassificationType, Payload, UnknownClassification};
pub use eclass::{EquivalenceClass, payload_key};
