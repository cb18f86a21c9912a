//! Spatial primitives and indexing.

pub mod index;
pub mod queries;

pub use index::CheckpointIndex;
pub use queries::{bearing, haversine_distance};
