//! Server-rendered page handler, mounted as the router fallback.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use hydrate_ssr::{PageResponse, PageStatus};

use crate::{error::AppError, state::AppState};

/// Render whatever page the route table resolves `uri` to.
///
/// Redirects answer 302 with `Location`, unmatched paths 404 with the
/// rendered (empty) document, everything else 200.
pub async fn page(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
) -> Result<Response, AppError> {
    let response = state.assembler.render(uri.path(), query).await?;

    Ok(match response {
        PageResponse::Redirect(target) => {
            (StatusCode::FOUND, [(header::LOCATION, target)]).into_response()
        }
        PageResponse::Document { status, html } => {
            let status = match status {
                PageStatus::Ok => StatusCode::OK,
                PageStatus::NotFound => StatusCode::NOT_FOUND,
            };
            (status, Html(html)).into_response()
        }
    })
}
