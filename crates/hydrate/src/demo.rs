//! Sample route table and feature stores.
//!
//! Small on purpose: one page per terminal state of route resolution, plus
//! a nested layout and a parametrized page.

use std::sync::Arc;

use async_trait::async_trait;
use hydrate_ssr::{layout, render, Next, RouteContext, RouteError, RouteHandler, Router};
use hydrate_ssr_core::{MetadataInstance, Observable, StoreDescriptors, StyleEntry, View};
use serde_json::json;

/// Server module id of the post page, resolved to its chunk for preloading.
pub const POST_MODULE: &str = "./src/pages/Post.tsx";

const LAYOUT_CSS: &str = ".layout{max-width:60rem;margin:0 auto}";

pub fn stores() -> anyhow::Result<StoreDescriptors> {
    let descriptors = StoreDescriptors::new()
        .with_feature("counter", || Observable::from_json(&json!({"count": 0})))?
        .with_feature("tags", Observable::map)?;
    Ok(descriptors)
}

pub fn router() -> Router {
    Router::new()
        .layer(Arc::new(SiteMetadata))
        .route("/", [render(home)])
        .route("/about", [layout(site_layout), render(about)])
        .route(
            "/account",
            [Arc::new(RequireToken) as Arc<dyn RouteHandler>, render(account)],
        )
        .route("/login", [render(login)])
        .route("/posts/{slug}", [layout(site_layout), render(post)])
        .route("/broken", [render(|_| Ok(View::text("Loading"))), render(broken)])
}

/// Site-wide metadata every page starts from.
struct SiteMetadata;

#[async_trait]
impl RouteHandler for SiteMetadata {
    async fn handle(&self, cx: &mut RouteContext, next: Next<'_>) -> Result<(), RouteError> {
        cx.store.metadata().registry().add(
            MetadataInstance::new()
                .html_attr("lang", "en")
                .meta([("name", "generator"), ("content", "hydrate")]),
        );
        next.run(cx).await
    }
}

/// Redirects to the login page unless a `token` query parameter is present.
struct RequireToken;

#[async_trait]
impl RouteHandler for RequireToken {
    async fn handle(&self, cx: &mut RouteContext, next: Next<'_>) -> Result<(), RouteError> {
        if cx.query("token").is_none() {
            return Err(RouteError::redirect("/login"));
        }
        next.run(cx).await
    }
}

fn site_layout(cx: &RouteContext, page: View) -> View {
    cx.store.styles().insert_css(LAYOUT_CSS);
    View::element("div")
        .attr("class", "layout")
        .child(
            View::element("nav")
                .child(View::element("a").attr("href", "/").child(View::text("Home")))
                .child(View::element("a").attr("href", "/about").child(View::text("About"))),
        )
        .child(page)
}

fn home(cx: &RouteContext) -> Result<View, RouteError> {
    cx.store
        .metadata()
        .registry()
        .add(MetadataInstance::new().title("Home"));
    let count = cx
        .store
        .feature("counter")
        .and_then(|counter| counter.get("count"))
        .and_then(|count| count.as_value().and_then(|v| v.as_i64()))
        .unwrap_or_default();
    Ok(View::element("main")
        .child(View::element("h1").child(View::text("Welcome")))
        .child(View::element("p").child(View::text("Count: ")).child(View::text(count.to_string()))))
}

fn about(cx: &RouteContext) -> Result<View, RouteError> {
    cx.store.metadata().registry().add(
        MetadataInstance::new()
            .title("About")
            .meta([("name", "description"), ("content", "About this site")])
            .link([("rel", "canonical"), ("href", "/about")]),
    );
    Ok(View::element("h1").child(View::text("About")))
}

fn account(cx: &RouteContext) -> Result<View, RouteError> {
    cx.store
        .metadata()
        .registry()
        .add(MetadataInstance::new().title("Account").body_attr("class", "private"));
    Ok(View::element("h1").child(View::text("Your account")))
}

fn login(cx: &RouteContext) -> Result<View, RouteError> {
    cx.store
        .metadata()
        .registry()
        .add(MetadataInstance::new().title("Sign in"));
    Ok(View::element("form")
        .attr("method", "post")
        .child(View::element("input").attr("name", "token"))
        .child(View::element("button").child(View::text("Sign in"))))
}

fn post(cx: &RouteContext) -> Result<View, RouteError> {
    let slug = cx.param("slug").unwrap_or_default();
    let metadata = cx.store.metadata();
    metadata.require_module(POST_MODULE);
    metadata.registry().add(
        MetadataInstance::new()
            .title(slug)
            .style(StyleEntry::new("article{line-height:1.6}")),
    );
    if let Some(tags) = cx.store.feature("tags") {
        tags.set(slug, Observable::value(true));
    }
    Ok(View::element("article").child(View::element("h1").child(View::text(slug))))
}

fn broken(_cx: &RouteContext) -> Result<View, RouteError> {
    Err(anyhow::anyhow!("upstream unavailable").into())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use hydrate_ssr::{PerRequestStore, ResolutionPhase, RouteResolver, SsrOptions};

    use super::*;

    fn resolver() -> RouteResolver {
        let stores = PerRequestStore::new(stores().unwrap(), SsrOptions::default());
        RouteResolver::new(router(), Arc::new(stores))
    }

    #[tokio::test]
    async fn test_every_page_registers_site_metadata() {
        let state = resolver().resolve("/about", BTreeMap::new()).await;
        let metadata = state.store.unwrap().metadata().snapshot();

        assert_eq!(metadata.html_attrs["lang"], "en");
        assert_eq!(metadata.full_title, "About");
        // Site metadata registers first, so its tags come first.
        assert_eq!(metadata.meta[0]["name"], "generator");
        assert_eq!(metadata.meta[1]["name"], "description");
    }

    #[tokio::test]
    async fn test_account_requires_token() {
        let resolver = resolver();

        let anonymous = resolver.resolve("/account", BTreeMap::new()).await;
        assert_eq!(anonymous.redirect_target.as_deref(), Some("/login"));

        let query = BTreeMap::from([("token".to_string(), "t".to_string())]);
        let signed_in = resolver.resolve("/account", query).await;
        assert_eq!(signed_in.phase, ResolutionPhase::Rendered);
    }

    #[tokio::test]
    async fn test_post_records_module_and_tag() {
        let state = resolver().resolve("/posts/hello", BTreeMap::new()).await;
        let store = state.store.unwrap();

        assert_eq!(store.metadata().preload_modules(), vec![POST_MODULE]);
        assert_eq!(store.snapshot()["tags"], json!({"hello": true}));
        assert_eq!(store.metadata().snapshot().style.len(), 1);
    }

    #[tokio::test]
    async fn test_broken_keeps_partial_page() {
        let state = resolver().resolve("/broken", BTreeMap::new()).await;
        assert_eq!(state.phase, ResolutionPhase::Failed);
        assert!(state.draw_target.is_some());
    }
}
