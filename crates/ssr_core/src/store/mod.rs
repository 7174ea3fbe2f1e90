//! The store aggregate.
//!
//! A [`Store`] holds the router, metadata and style-collection sub-stores
//! plus any number of feature sub-stores built from [`StoreDescriptors`].
//! The server builds one per request and embeds its snapshot in the page;
//! the client builds one per process and merges that snapshot once.

mod aggregate;
mod metadata;
mod observable;
mod router;
mod snapshot;
mod styles;

pub use aggregate::{
    FeatureInit, Store, StoreDescriptors, METADATA_KEY, ROUTER_KEY, STYLES_KEY,
};
pub use metadata::{MetadataStore, SsrData};
pub use observable::{Fields, Items, Observable};
pub use router::{RouteLocation, RouterStore};
pub use snapshot::{exclude, to_plain, CIRCULAR_KEY, EMBED_EXCLUSIONS};
pub use styles::StyleCollector;
