//! Handler errors and their HTTP responses.
//!
//! Visitor mistakes (unknown product, blank form field) answer 4xx with the
//! message. Everything else answers a bare 500; the details go to the log and
//! to Sentry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cart::StoreError;

/// Error returned by storefront handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart storage failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Requested product or page does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Form input the handler cannot act on.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code this error answers with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if !self.is_server_error() {
            tracing::debug!(error = %self, %status, "Rejected request");
            return (status, self.to_string()).into_response();
        }

        let event_id = sentry::capture_error(&self);
        tracing::error!(error = %self, sentry_event_id = %event_id, "Request failed");
        (status, "Internal server error").into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, AppError>;

/// Record a visitor action as a Sentry breadcrumb.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "880RR")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let data = data
        .unwrap_or_default()
        .iter()
        .map(|(key, value)| ((*key).to_owned(), serde_json::Value::from(*value)))
        .collect();

    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        data,
        ..Default::default()
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[test]
    fn test_messages() {
        let err = AppError::NotFound("product 880RR".to_owned());
        assert_eq!(err.to_string(), "Not found: product 880RR");

        let err = AppError::BadRequest("product ID is empty".to_owned());
        assert_eq!(err.to_string(), "Bad request: product ID is empty");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound(String::new()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::BadRequest(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Internal(String::new()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_is_server_error() {
        let encode = serde_json::from_str::<u8>("x").unwrap_err();
        let err = AppError::from(StoreError::Encode(encode));
        assert!(err.is_server_error());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_server_error_body_hides_details() {
        let response = AppError::Internal("session table missing".to_owned()).into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "Internal server error");
    }

    #[tokio::test]
    async fn test_client_error_body_explains() {
        let response = AppError::NotFound("product NOPE1".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "Not found: product NOPE1");
    }
}
