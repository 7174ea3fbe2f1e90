//! Shared application state.

use std::sync::Arc;

use hydrate_ssr::{ManifestCache, PerRequestStore, RouteResolver, SsrPageAssembler};
use hydrate_ssr_core::HtmlRenderer;

use crate::{config::Config, demo};

/// Shared application state.
///
/// Cloned for each request handler. Everything request-scoped (the store,
/// the render state) is built inside the assembler per render.
#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<SsrPageAssembler>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the state serving the demo routes.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let options = config.ssr_options()?;
        let stores = PerRequestStore::new(demo::stores()?, options.clone());
        let resolver = RouteResolver::new(demo::router(), Arc::new(stores));
        let manifests = ManifestCache::new(
            config.client_dir.clone(),
            config.server_dir.clone(),
            options.mode.into(),
        );

        tracing::info!(
            mode = %options.mode,
            client_dir = %config.client_dir.display(),
            server_dir = %config.server_dir.display(),
            "Page assembler initialized"
        );

        let assembler = SsrPageAssembler::new(
            resolver,
            Arc::new(manifests),
            Arc::new(HtmlRenderer),
            options,
        );

        Ok(Self {
            assembler: Arc::new(assembler),
            config: Arc::new(config),
        })
    }
}
