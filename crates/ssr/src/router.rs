//! Path routing with nested handler chains.
//!
//! A request runs through the global layers, then through the matched
//! route's chain. Each handler gets the rest of the chain as [`Next`] and
//! decides whether and when to descend, so a layout can run the page below
//! it and then wrap whatever it drew.

use std::{collections::BTreeMap, fmt, sync::Arc};

use async_trait::async_trait;
use hydrate_ssr_core::{Store, View};

use crate::error::RouteError;

/// Per-resolution context threaded through every handler.
pub struct RouteContext {
    pub path: String,
    pub query: BTreeMap<String, String>,
    /// Captured `{name}` segments, and `*` for a wildcard tail.
    pub params: BTreeMap<String, String>,
    pub store: Arc<Store>,
    pub draw_target: Option<View>,
}

impl RouteContext {
    pub fn new(path: impl Into<String>, query: BTreeMap<String, String>, store: Arc<Store>) -> Self {
        Self {
            path: path.into(),
            query,
            params: BTreeMap::new(),
            store,
            draw_target: None,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

impl fmt::Debug for RouteContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteContext")
            .field("path", &self.path)
            .field("query", &self.query)
            .field("params", &self.params)
            .field("draw_target", &self.draw_target)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, cx: &mut RouteContext, next: Next<'_>) -> Result<(), RouteError>;
}

/// The remainder of a handler chain.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    chain: &'a [Arc<dyn RouteHandler>],
}

impl<'a> Next<'a> {
    /// Run the next handler. Reaching the end of the chain succeeds.
    pub async fn run(self, cx: &mut RouteContext) -> Result<(), RouteError> {
        match self.chain.split_first() {
            Some((handler, rest)) => handler.handle(cx, Next { chain: rest }).await,
            None => Ok(()),
        }
    }
}

/// Handler that sets the draw target from a closure, then continues.
pub struct RenderFn<F>(F);

#[async_trait]
impl<F> RouteHandler for RenderFn<F>
where
    F: Fn(&RouteContext) -> Result<View, RouteError> + Send + Sync,
{
    async fn handle(&self, cx: &mut RouteContext, next: Next<'_>) -> Result<(), RouteError> {
        let view = (self.0)(cx)?;
        cx.draw_target = Some(view);
        next.run(cx).await
    }
}

/// Handler that runs the rest of the chain and wraps what it drew.
pub struct LayoutFn<F>(F);

#[async_trait]
impl<F> RouteHandler for LayoutFn<F>
where
    F: Fn(&RouteContext, View) -> View + Send + Sync,
{
    async fn handle(&self, cx: &mut RouteContext, next: Next<'_>) -> Result<(), RouteError> {
        next.run(cx).await?;
        if let Some(inner) = cx.draw_target.take() {
            cx.draw_target = Some((self.0)(cx, inner));
        }
        Ok(())
    }
}

pub fn render<F>(f: F) -> Arc<dyn RouteHandler>
where
    F: Fn(&RouteContext) -> Result<View, RouteError> + Send + Sync + 'static,
{
    Arc::new(RenderFn(f))
}

pub fn layout<F>(f: F) -> Arc<dyn RouteHandler>
where
    F: Fn(&RouteContext, View) -> View + Send + Sync + 'static,
{
    Arc::new(LayoutFn(f))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|segment| {
                if segment == "*" {
                    Segment::Wildcard
                } else if let Some(name) = segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                {
                    Segment::Param(name.to_string())
                } else {
                    Segment::Static(segment.to_string())
                }
            })
            .collect();
        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = split_path(path).collect();
        let mut params = BTreeMap::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Wildcard => {
                    params.insert("*".to_string(), parts.get(i..)?.join("/"));
                    return Some(params);
                }
                Segment::Static(expected) => {
                    if parts.get(i) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), (*parts.get(i)?).to_string());
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

struct Route {
    pattern: PathPattern,
    chain: Vec<Arc<dyn RouteHandler>>,
}

/// Route table. Routes are tried in registration order.
#[derive(Default)]
pub struct Router {
    layers: Vec<Arc<dyn RouteHandler>>,
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler that runs before every matched route.
    pub fn layer(mut self, handler: Arc<dyn RouteHandler>) -> Self {
        self.layers.push(handler);
        self
    }

    /// Register a chain for `pattern`. Segments are literal, `{name}`, or a
    /// trailing `*`.
    pub fn route(
        mut self,
        pattern: &str,
        chain: impl IntoIterator<Item = Arc<dyn RouteHandler>>,
    ) -> Self {
        self.routes.push(Route {
            pattern: PathPattern::parse(pattern),
            chain: chain.into_iter().collect(),
        });
        self
    }

    /// Run the layers and the first matching chain against `cx`.
    pub async fn dispatch(&self, cx: &mut RouteContext) -> Result<(), RouteError> {
        let Some((route, params)) = self
            .routes
            .iter()
            .find_map(|route| route.pattern.matches(&cx.path).map(|params| (route, params)))
        else {
            return Err(RouteError::NotFound(cx.path.clone()));
        };

        tracing::trace!(path = %cx.path, pattern = %route.pattern.raw, "Route matched");
        cx.params = params;

        let chain: Vec<Arc<dyn RouteHandler>> = self
            .layers
            .iter()
            .chain(route.chain.iter())
            .cloned()
            .collect();
        Next { chain: &chain }.run(cx).await
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("layers", &self.layers.len())
            .field(
                "routes",
                &self.routes.iter().map(|r| r.pattern.raw.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use hydrate_ssr_core::{HtmlRenderer, Renderer, SsrOptions, StoreDescriptors};

    use super::*;

    fn context(path: &str) -> RouteContext {
        let store = StoreDescriptors::new().init(&SsrOptions::default());
        RouteContext::new(path, BTreeMap::new(), Arc::new(store))
    }

    fn html(cx: &RouteContext) -> String {
        cx.draw_target
            .as_ref()
            .map(|v| HtmlRenderer.render_to_static_markup(v))
            .unwrap_or_default()
    }

    struct Record(&'static str);

    #[async_trait]
    impl RouteHandler for Record {
        async fn handle(&self, cx: &mut RouteContext, next: Next<'_>) -> Result<(), RouteError> {
            cx.params.insert(format!("seen-{}", self.0), cx.store.router().path());
            next.run(cx).await
        }
    }

    #[test]
    fn test_pattern_matching() {
        let pattern = PathPattern::parse("/users/{id}/posts");
        let params = pattern.matches("/users/7/posts/").unwrap();
        assert_eq!(params["id"], "7");
        assert!(pattern.matches("/users/7").is_none());
        assert!(pattern.matches("/users/7/posts/1").is_none());

        let root = PathPattern::parse("/");
        assert!(root.matches("/").is_some());
        assert!(root.matches("/x").is_none());

        let tail = PathPattern::parse("/docs/*");
        assert_eq!(tail.matches("/docs/a/b").unwrap()["*"], "a/b");
        assert_eq!(tail.matches("/docs").unwrap()["*"], "");
    }

    #[tokio::test]
    async fn test_layout_wraps_page() {
        let router = Router::new().route(
            "/about",
            [
                layout(|_, inner| View::element("main").child(inner)),
                render(|_| Ok(View::element("h1").child(View::text("About")))),
            ],
        );
        let mut cx = context("/about");

        router.dispatch(&mut cx).await.unwrap();

        assert_eq!(html(&cx), "<main><h1>About</h1></main>");
    }

    #[tokio::test]
    async fn test_layers_run_before_route_chain() {
        let router = Router::new()
            .layer(Arc::new(Record("layer")))
            .route(
                "/{page}",
                [render(|cx| {
                    assert!(cx.params.contains_key("seen-layer"));
                    Ok(View::text(cx.param("page").unwrap_or_default()))
                })],
            );
        let mut cx = context("/home");

        router.dispatch(&mut cx).await.unwrap();

        assert_eq!(html(&cx), "home");
    }

    #[tokio::test]
    async fn test_first_registered_route_wins() {
        let router = Router::new()
            .route("/a", [render(|_| Ok(View::text("first")))])
            .route("/{any}", [render(|_| Ok(View::text("second")))]);
        let mut cx = context("/a");
        router.dispatch(&mut cx).await.unwrap();
        assert_eq!(html(&cx), "first");
    }

    #[tokio::test]
    async fn test_unmatched_path_is_not_found() {
        let router = Router::new().route("/", [render(|_| Ok(View::text("home")))]);
        let mut cx = context("/missing");

        let result = router.dispatch(&mut cx).await;

        assert!(matches!(result, Err(RouteError::NotFound(path)) if path == "/missing"));
    }

    #[tokio::test]
    async fn test_error_stops_chain_but_keeps_partial_target() {
        let router = Router::new().route(
            "/x",
            [
                render(|_| Ok(View::text("partial"))),
                render(|_| Err(RouteError::redirect("/login"))),
                render(|_| Ok(View::text("never"))),
            ],
        );
        let mut cx = context("/x");

        let result = router.dispatch(&mut cx).await;

        assert!(matches!(result, Err(RouteError::Redirect(target)) if target == "/login"));
        assert_eq!(html(&cx), "partial");
    }
}
