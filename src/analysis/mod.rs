//! Empirical distributions and their comparison.
//!
//! - [`registry`]: key-bucketed class store
//! - [`distribution`]: the multi-preparation engine
//! - [`metrics`]: Lp distance, KL divergence, Shannon entropy
//! - [`persist`]: plain-text save and reload
//! - [`report`]: human-readable ranking of classes

pub mod distribution;
pub mod metrics;
pub mod persist;
pub mod registry;
pub mod report;

pub use distribution::{DistributionError, DistributionUpdate, EmpiricalDistribution};
pub use metrics::{write_matrix, write_vector, PrepMatrix};
pub use persist::PersistError;
pub use registry::EquivalenceRegistry;
pub use report::describe_class;
