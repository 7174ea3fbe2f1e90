//! Pure SSR logic - no I/O, no async, no side effects beyond in-memory state.
//!
//! This crate provides:
//! - Validated SSR options and the runtime mode
//! - The metadata registry that merges head/body contributions
//! - Hydration skip-list computation for the document template
//! - Module graph resolution from build manifests to preload chunks
//! - The store aggregate with hydration merge and cycle-safe snapshots
//! - A minimal render tree and the document template that emits it
//!
//! # Example
//!
//! ```
//! use hydrate_ssr_core::{compute_skip_list, MetadataCounts};
//!
//! let counts = MetadataCounts { meta: 1, link: 1, style: 0 };
//! let skip = compute_skip_list(counts, false, 2, 1);
//!
//! // Two contributed tags after the three default metas, title at 5 stays.
//! assert_eq!(skip.head, vec![3, 4]);
//! // Store script, two preload chunks, one entry script. Root node stays.
//! assert_eq!(skip.body, vec![1, 2, 3, 4]);
//! ```

mod config;
mod document;
mod error;
mod escape;
pub mod metadata;
mod module_graph;
mod skip_list;
mod state;
pub mod store;
mod view;

pub use config::{RuntimeMode, SsrOptions, DEFAULT_ENTRY_CHUNK, DEFAULT_STORE_GLOBAL};
pub use document::{render_document, store_script, DocumentParts};
pub use error::{Result, SsrCoreError};
pub use escape::{escape_attr, escape_script_json, escape_text};
pub use metadata::{
    InstanceId, MetadataInstance, MetadataRegistry, MetadataSlot, MetadataSnapshot, StyleEntry,
};
pub use module_graph::{
    ClientManifest, ClientSsrData, ModuleGraphs, ModuleId, OneOrMany, ServerManifest, ServerSsrData,
};
pub use skip_list::{
    compute_skip_list, MetadataCounts, Section, SkipList, DEFAULT_HEAD_META_COUNT,
    ROOT_NODE_POSITION, STORE_SCRIPT_POSITION,
};
pub use state::{FailureCause, RenderState, ResolutionPhase};
pub use store::{Observable, Store, StoreDescriptors};
pub use view::{Attrs, HtmlRenderer, Renderer, View};
