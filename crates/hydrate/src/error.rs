use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hydrate_ssr::{sanitize_error, SsrError};

/// Application error type that wraps `anyhow::Error`.
///
/// This allows using `?` on functions that return `Result<_, anyhow::Error>`
/// to automatically convert them into `Result<_, AppError>`.
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self.0, "Application error");

        let message = match self.0.downcast_ref::<SsrError>() {
            Some(ssr_error) => sanitize_error(ssr_error),
            None => "Something went wrong".to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
