use axum::{http::StatusCode, routing::get, Router};
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    config::ASSETS_PREFIX,
    handlers::{health::livez, page::page},
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let assets = ServeDir::new(&state.config.client_dir);
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/livez", get(livez))
        .nest_service(ASSETS_PREFIX, assets)
        // Every other path is a page.
        .fallback(page)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use http_body_util::BodyExt;
    use hydrate_ssr::EmbeddedSnapshot;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::{config::Config, demo::POST_MODULE};

    /// Build directories with manifests matching the demo routes.
    fn build_dirs() -> TempDir {
        let dir = TempDir::new().unwrap();
        let client = dir.path().join("client");
        let server = dir.path().join("server");
        fs::create_dir_all(&client).unwrap();
        fs::create_dir_all(&server).unwrap();

        fs::write(
            server.join("stats.json"),
            format!(r#"{{"ssrData": {{"moduleIdToPath": {{"{POST_MODULE}": "src/pages/Post.tsx"}}}}}}"#),
        )
        .unwrap();
        fs::write(
            client.join("stats.json"),
            r#"{
                "assetsByChunkName": {"main": ["main.js", "main.css"]},
                "ssrData": {
                    "modulePathToId": {"src/pages/Post.tsx": 7},
                    "moduleIdToChunkFile": {"7": "post.js"}
                }
            }"#,
        )
        .unwrap();
        fs::write(client.join("main.js"), "console.log('hydrate')").unwrap();
        dir
    }

    fn app(dir: &TempDir) -> Router {
        let mut config = Config::new(dir.path().join("client"), dir.path().join("server"));
        config.title_template = Some("%s | Demo".to_string());
        config.default_title = "Demo".to_string();
        create_app(AppState::new(config).unwrap())
    }

    async fn get_page(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_livez() {
        let dir = build_dirs();
        let (status, _) = get_page(app(&dir), "/livez").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_home_page() {
        let dir = build_dirs();
        let (status, html) = get_page(app(&dir), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.starts_with("<!DOCTYPE html><html lang=\"en\">"));
        assert!(html.contains("<title>Home | Demo</title>"));
        assert!(html.contains("<p>Count: <!---->0</p>"));
        assert!(html.contains("<script async>window.__SSR_STORE__="));
        assert!(html.contains(r#"<script defer src="/assets/main.js"></script>"#));
    }

    #[tokio::test]
    async fn test_post_page_preloads_chunk_and_hands_over_skip_lists() {
        let dir = build_dirs();
        let (status, html) = get_page(app(&dir), "/posts/hello").await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"<script async src="/assets/post.js"></script>"#));

        let store = EmbeddedSnapshot::from_document(&html, "__SSR_STORE__")
            .take()
            .unwrap();
        // generator meta 3 | title 4 | post style 5 | layout css 6
        assert_eq!(
            store["metadata"]["ssrData"]["headSkip"],
            serde_json::json!([3, 5, 6])
        );
        // root 0 | store 1 | post.js 2 | main.js 3
        assert_eq!(
            store["metadata"]["ssrData"]["bodySkip"],
            serde_json::json!([1, 2, 3])
        );
        assert_eq!(store["tags"]["hello"], true);
        assert_eq!(store["router"]["path"], "/posts/hello");
    }

    #[tokio::test]
    async fn test_account_redirects_to_login() {
        let dir = build_dirs();
        let response = app(&dir)
            .oneshot(
                Request::builder()
                    .uri("/account")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_account_with_token_renders() {
        let dir = build_dirs();
        let (status, html) = get_page(app(&dir), "/account?token=abc").await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"<body class="private">"#));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404_document() {
        let dir = build_dirs();
        let (status, html) = get_page(app(&dir), "/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains(r#"<div id="root"></div>"#));
    }

    #[tokio::test]
    async fn test_failing_page_still_serves_document() {
        let dir = build_dirs();
        let (status, html) = get_page(app(&dir), "/broken").await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"<div id="root">Loading</div>"#));
    }

    #[tokio::test]
    async fn test_static_assets_are_served() {
        let dir = build_dirs();
        let (status, body) = get_page(app(&dir), "/assets/main.js").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "console.log('hydrate')");
    }

    #[tokio::test]
    async fn test_missing_manifests_are_500() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get_page(app(&dir), "/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal configuration error");
    }
}
