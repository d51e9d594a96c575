//! Unified error handling with Sentry integration.
//!
//! Every failure a handler can produce is an [`AppError`], and
//! `IntoResponse` is the single place that decides its status code and JSON
//! body. Server errors are captured to Sentry before responding.
//!
//! Internal error detail never goes into the body directly. It is attached to
//! the response as an [`InternalErrorDetail`] extension, and
//! [`expose_internal_detail`] copies it into the body in development.

use std::any::Any;

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use catalog_cache_core::Product;
use serde::Serialize;
use thiserror::Error;

use crate::config::Environment;
use crate::services::SyncError;
use crate::snapshot::SnapshotError;

const NOT_FOUND_MESSAGE: &str =
    "Please sync products first by making a POST request to /sync-products";
const CONFIGURATION_MISSING_MESSAGE: &str = "Shopify configuration is missing.";
const UNKNOWN_ROUTE_MESSAGE: &str = "The requested endpoint does not exist.";
const INTERNAL_MESSAGE: &str = "An unexpected error occurred.";

/// Application-level error type for the catalog proxy.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify credentials were not configured.
    #[error("Shopify configuration is missing")]
    ConfigurationMissing,

    /// Shopify answered with GraphQL `errors`.
    #[error("GraphQL error: {0}")]
    UpstreamApplication(serde_json::Value),

    /// Shopify could not be reached or answered with a failure status.
    #[error("Shopify API error: {message}")]
    Transport {
        status: Option<u16>,
        timed_out: bool,
        message: String,
    },

    /// The snapshot could not be read or written.
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        /// Products fetched by a sync whose write failed.
        products: Option<Vec<Product>>,
    },

    /// No snapshot has been written yet.
    #[error("No products found")]
    NotFound,

    /// No route matches the request.
    #[error("Unknown route")]
    UnknownRoute,

    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::UpstreamRejected(details) => Self::UpstreamApplication(details),
            SyncError::Transport {
                status,
                timed_out,
                message,
            } => Self::Transport {
                status,
                timed_out,
                message,
            },
            SyncError::Storage { source, products } => Self::Storage {
                message: source.to_string(),
                products: Some(products),
            },
            SyncError::Unexpected(source) => Self::Internal(source.to_string()),
        }
    }
}

impl From<SnapshotError> for AppError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::NotFound(_) => Self::NotFound,
            other => Self::Storage {
                message: other.to_string(),
                products: None,
            },
        }
    }
}

/// JSON error body. Absent fields are omitted.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    products: Option<Vec<Product>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ErrorBody {
    const fn new(error: &'static str) -> Self {
        Self {
            error,
            message: None,
            details: None,
            status: None,
            count: None,
            products: None,
            detail: None,
        }
    }

    fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Internal error detail carried on a 500 response.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UpstreamApplication(_) => StatusCode::BAD_REQUEST,
            Self::Transport {
                timed_out: true, ..
            } => StatusCode::GATEWAY_TIMEOUT,
            Self::Transport { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::NotFound | Self::UnknownRoute => StatusCode::NOT_FOUND,
            Self::ConfigurationMissing | Self::Storage { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationMissing
                | Self::Transport { .. }
                | Self::Storage { .. }
                | Self::Internal(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if matches!(self, Self::UpstreamApplication(_)) {
            tracing::warn!(error = %self, "Request rejected by Shopify");
        }

        let status = self.status_code();

        let (body, detail) = match self {
            Self::ConfigurationMissing => (
                ErrorBody::new("Configuration Missing").message(CONFIGURATION_MISSING_MESSAGE),
                None,
            ),
            Self::UpstreamApplication(details) => (
                ErrorBody {
                    details: Some(details),
                    ..ErrorBody::new("GraphQL Error")
                },
                None,
            ),
            Self::Transport {
                status: upstream,
                message,
                ..
            } => (
                ErrorBody {
                    status: Some(upstream.unwrap_or_else(|| status.as_u16())),
                    ..ErrorBody::new("Shopify API Error").message(message)
                },
                None,
            ),
            Self::Storage { message, products } => (
                ErrorBody {
                    count: products.as_ref().map(Vec::len),
                    products,
                    ..ErrorBody::new("Storage Error").message(message)
                },
                None,
            ),
            Self::NotFound => (
                ErrorBody::new("No products found").message(NOT_FOUND_MESSAGE),
                None,
            ),
            Self::UnknownRoute => (
                ErrorBody::new("Not Found").message(UNKNOWN_ROUTE_MESSAGE),
                None,
            ),
            Self::Internal(detail) => (
                ErrorBody::new("Internal Server Error").message(INTERNAL_MESSAGE),
                Some(detail),
            ),
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(InternalErrorDetail(detail));
        }
        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Render a handler panic as the uniform 500 body.
///
/// Used with `tower_http::catch_panic::CatchPanicLayer::custom`.
#[allow(clippy::needless_pass_by_value)]
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|| "handler panicked".to_string());

    AppError::Internal(format!("panic: {detail}")).into_response()
}

/// Add internal error detail to 500 bodies when running in development.
pub async fn expose_internal_detail(
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if !environment.exposes_error_detail() {
        return response;
    }
    let Some(InternalErrorDetail(detail)) = response.extensions().get::<InternalErrorDetail>().cloned()
    else {
        return response;
    };

    let body = ErrorBody {
        detail: Some(detail),
        ..ErrorBody::new("Internal Server Error").message(INTERNAL_MESSAGE)
    };
    (response.status(), Json(body)).into_response()
}
