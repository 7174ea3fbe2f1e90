//! Full page assembly: route, metadata, preload chunks, skip lists, document.

use std::{collections::BTreeMap, sync::Arc};

use hydrate_ssr_core::{
    render_document, store_script, DocumentParts, Renderer, SsrOptions,
};

use crate::error::Result;
use crate::manifest::ManifestCache;
use crate::resolver::RouteResolver;

/// Status of an assembled document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Ok,
    NotFound,
}

/// What the HTTP layer should answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResponse {
    Redirect(String),
    Document { status: PageStatus, html: String },
}

/// Orchestrates one server render from path to document string.
pub struct SsrPageAssembler {
    resolver: RouteResolver,
    manifests: Arc<ManifestCache>,
    renderer: Arc<dyn Renderer>,
    options: SsrOptions,
}

impl SsrPageAssembler {
    pub fn new(
        resolver: RouteResolver,
        manifests: Arc<ManifestCache>,
        renderer: Arc<dyn Renderer>,
        options: SsrOptions,
    ) -> Self {
        Self {
            resolver,
            manifests,
            renderer,
            options,
        }
    }

    pub fn options(&self) -> &SsrOptions {
        &self.options
    }

    /// Render the page for `path`.
    ///
    /// Route failures still produce a document. Only manifest and
    /// serialization problems are errors.
    pub async fn render(&self, path: &str, query: BTreeMap<String, String>) -> Result<PageResponse> {
        let state = self.resolver.resolve(path, query).await;
        if let Some(target) = state.redirect_target {
            return Ok(PageResponse::Redirect(target));
        }
        let status = if state.is_not_found() {
            PageStatus::NotFound
        } else {
            PageStatus::Ok
        };

        let graphs = self.manifests.graphs().await?;
        let entries = graphs.entry_files(&self.options.entry_chunk);

        // The resolver always attaches a store, an empty one keeps the
        // template well-formed if it ever does not.
        let store = match state.store {
            Some(store) => store,
            None => Arc::new(hydrate_ssr_core::StoreDescriptors::new().init(&self.options)),
        };

        let app_html = state
            .draw_target
            .as_ref()
            .map(|view| self.renderer.render_to_string(view))
            .unwrap_or_default();

        // Read after rendering: components register metadata, styles and
        // modules while the tree renders.
        let metadata = store.metadata().snapshot();
        let chunks = graphs.resolve_chunks(store.metadata().preload_modules(), &entries);
        let separator = if self.options.mode.is_development() {
            "\n"
        } else {
            ""
        };
        let collected_styles = store.styles().joined(separator);

        let mut parts = DocumentParts {
            metadata: &metadata,
            app_html: &app_html,
            store_script: "",
            chunks: &chunks,
            entries: &entries,
            collected_styles: collected_styles.as_deref(),
            options: &self.options,
        };
        store.metadata().set_skip_list(parts.skip_list());

        let script = store_script(&store.embeddable_snapshot(), &self.options)?;
        parts.store_script = &script;

        tracing::debug!(
            path,
            chunks = chunks.len(),
            entries = entries.len(),
            metadata_version = metadata.version,
            "Page assembled"
        );

        Ok(PageResponse::Document {
            status,
            html: render_document(&parts, self.renderer.as_ref()),
        })
    }
}

impl std::fmt::Debug for SsrPageAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsrPageAssembler")
            .field("resolver", &self.resolver)
            .field("manifests", &self.manifests)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use hydrate_ssr_core::{
        ClientManifest, HtmlRenderer, MetadataInstance, ModuleGraphs, Observable, RuntimeMode,
        ServerManifest, StoreDescriptors, View,
    };
    use serde_json::{json, Value};

    use super::*;
    use crate::client::EmbeddedSnapshot;
    use crate::error::RouteError;
    use crate::resolver::PerRequestStore;
    use crate::router::{render, Router};

    fn graphs() -> ModuleGraphs {
        let server = ServerManifest::from_json(
            r#"{"ssrData": {"moduleIdToPath": {"1": "./About.tsx", "2": "./Entry.tsx"}}}"#,
        )
        .unwrap();
        let client = ClientManifest::from_json(
            r#"{
                "assetsByChunkName": {"main": ["main.js", "main.css"]},
                "ssrData": {
                    "modulePathToId": {"./About.tsx": 10, "./Entry.tsx": 20},
                    "moduleIdToChunkFile": {"10": "about.js", "20": "main.js"}
                }
            }"#,
        )
        .unwrap();
        ModuleGraphs::new(server, client)
    }

    fn router() -> Router {
        Router::new()
            .route(
                "/about",
                [render(|cx| {
                    let metadata = cx.store.metadata();
                    metadata.registry().add(
                        MetadataInstance::new()
                            .title("About")
                            .meta([("name", "description"), ("content", "About us")]),
                    );
                    metadata.require_module("1");
                    metadata.require_module("2");
                    cx.store.styles().insert_css(".about{color:red}");
                    if let Some(counter) = cx.store.feature("counter") {
                        counter.set("count", Observable::value(3));
                    }
                    Ok(View::element("h1").child(View::text("About")))
                })],
            )
            .route("/account", [render(|_| Err(RouteError::redirect("/login")))])
            .route(
                "/broken",
                [render(|_| Err(anyhow::anyhow!("boom").into()))],
            )
    }

    fn assembler(mode: RuntimeMode) -> SsrPageAssembler {
        let options = SsrOptions::with_defaults(mode)
            .with_title_template("%s | Demo")
            .unwrap()
            .with_default_title("Demo");
        let descriptors = StoreDescriptors::new()
            .with_feature("counter", || Observable::from_json(&json!({"count": 0})))
            .unwrap();
        let resolver = RouteResolver::new(
            router(),
            Arc::new(PerRequestStore::new(descriptors, options.clone())),
        );
        SsrPageAssembler::new(
            resolver,
            Arc::new(ManifestCache::fixed(graphs())),
            Arc::new(HtmlRenderer),
            options,
        )
    }

    async fn document(path: &str) -> (PageStatus, String) {
        match assembler(RuntimeMode::Production)
            .render(path, BTreeMap::new())
            .await
            .unwrap()
        {
            PageResponse::Document { status, html } => (status, html),
            PageResponse::Redirect(target) => panic!("unexpected redirect to {target}"),
        }
    }

    fn embedded(html: &str) -> Value {
        EmbeddedSnapshot::from_document(html, "__SSR_STORE__")
            .take()
            .unwrap()
    }

    #[tokio::test]
    async fn test_redirect_produces_no_document() {
        let response = assembler(RuntimeMode::Production)
            .render("/account", BTreeMap::new())
            .await
            .unwrap();
        assert_eq!(response, PageResponse::Redirect("/login".to_string()));
    }

    #[tokio::test]
    async fn test_document_contains_metadata_chunks_and_entries() {
        let (status, html) = document("/about").await;

        assert_eq!(status, PageStatus::Ok);
        assert!(html.contains("<title>About | Demo</title>"));
        assert!(html.contains(r#"<meta content="About us" name="description">"#));
        assert!(html.contains(r#"<div id="root"><h1>About</h1></div>"#));
        assert!(html.contains(r#"<script async src="/about.js"></script>"#));
        assert!(html.contains(r#"<script defer src="/main.js"></script>"#));
        // main.js is an entry, never also a preload chunk.
        assert!(!html.contains(r#"<script async src="/main.js">"#));
        assert!(html.contains("<style>.about{color:red}</style></head>"));
    }

    #[tokio::test]
    async fn test_embedded_store_carries_skip_lists_and_state() {
        let (_, html) = document("/about").await;
        let store = embedded(&html);

        // defaults 0..3 | meta 3 | title 4 | collected style 5
        assert_eq!(store["metadata"]["ssrData"]["headSkip"], json!([3, 5]));
        // root 0 | store 1 | about.js 2 | main.js 3
        assert_eq!(store["metadata"]["ssrData"]["bodySkip"], json!([1, 2, 3]));
        assert_eq!(store["counter"]["count"], 3);
        assert_eq!(store["router"]["path"], "/about");
        assert!(store.get("styles").is_none());
        assert!(store["metadata"].get("instances").is_none());
        assert!(store["metadata"]["ssrData"].get("preloadModules").is_none());
    }

    #[tokio::test]
    async fn test_failed_route_still_renders_document() {
        let (status, html) = document("/broken").await;
        assert_eq!(status, PageStatus::Ok);
        assert!(html.contains(r#"<div id="root"></div>"#));
        assert!(html.contains("<title>Demo</title>"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found_document() {
        let (status, html) = document("/missing").await;
        assert_eq!(status, PageStatus::NotFound);
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn test_development_document_is_hydratable() {
        let response = assembler(RuntimeMode::Development)
            .render("/about", BTreeMap::new())
            .await
            .unwrap();
        let PageResponse::Document { html, .. } = response else {
            panic!("expected a document");
        };

        let store = embedded(&html);
        assert_eq!(store["metadata"]["ssrData"]["bodySkip"], json!([1, 2, 3]));
        assert!(html.contains("window.__SSR_STORE__={\n    \""));
    }
}
