//! Document metadata aggregation.
//!
//! Components contribute [`MetadataInstance`]s to a [`MetadataRegistry`]. The
//! registry merges every live instance, in mount order, into a single
//! [`MetadataSnapshot`] that the document template renders into `<head>`.

mod instance;
mod registry;
mod slot;

pub use instance::{MetadataInstance, MetadataSnapshot, StyleEntry};
pub use registry::{InstanceId, MetadataRegistry};
pub use slot::MetadataSlot;
