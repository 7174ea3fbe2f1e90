//! SSR Page Assembly - Imperative Shell.
//!
//! This crate orchestrates I/O and async control flow around the pure
//! functions in `hydrate_ssr_core`: it resolves routes into render states,
//! loads and caches build manifests, and assembles the final document.
//!
//! # Architecture
//!
//! - **Functional Core** (`hydrate_ssr_core`): metadata merge, skip lists,
//!   chunk resolution, store snapshots, document template
//! - **Imperative Shell** (this crate): manifest I/O, route handler chains,
//!   store acquisition, page assembly
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hydrate_ssr::{
//!     render, ManifestCache, PerRequestStore, RouteResolver, Router, SsrPageAssembler,
//! };
//! use hydrate_ssr_core::{HtmlRenderer, RuntimeMode, SsrOptions, StoreDescriptors, View};
//!
//! let options = SsrOptions::with_defaults(RuntimeMode::Production);
//! let router = Router::new().route("/", [render(|_| Ok(View::text("Hello")))]);
//! let stores = PerRequestStore::new(StoreDescriptors::new(), options.clone());
//! let manifests = ManifestCache::new("dist/client", "dist/server", options.mode.into());
//!
//! let assembler = SsrPageAssembler::new(
//!     RouteResolver::new(router, Arc::new(stores)),
//!     Arc::new(manifests),
//!     Arc::new(HtmlRenderer),
//!     options,
//! );
//! let page = assembler.render("/", Default::default()).await?;
//! ```

mod assembler;
mod client;
mod error;
mod manifest;
mod resolver;
mod router;

// Re-export core types for convenience
pub use hydrate_ssr_core::{RenderState, ResolutionPhase, RuntimeMode, SsrCoreError, SsrOptions};

// Export shell types
pub use assembler::{PageResponse, PageStatus, SsrPageAssembler};
pub use client::{should_skip, skip_list, EmbeddedSnapshot};
pub use error::{sanitize_error, Result, RouteError, SsrError};
pub use manifest::{ManifestCache, ReloadPolicy, MANIFEST_FILE};
pub use resolver::{PerRequestStore, RouteResolver, SingletonStore, StoreSource};
pub use router::{layout, render, LayoutFn, Next, RenderFn, RouteContext, RouteHandler, Router};
