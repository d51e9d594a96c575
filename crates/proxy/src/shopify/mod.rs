//! Shopify Admin API client for catalog syncs.
//!
//! # Architecture
//!
//! - `graphql_client` supplies the query body types; HTTP goes through `reqwest` 0.13
//! - One fixed, bounded query per sync (50 products, 10 variants, 5 images each)
//! - Every call is bounded by the configured timeout and carries the
//!   credentials it was given; the client itself holds no credentials
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_cache_proxy::shopify::CatalogClient;
//!
//! let client = CatalogClient::new(&config.shopify)?;
//! let products = client.fetch_products(&credentials).await?;
//! ```

mod client;
mod conversions;
pub mod queries;

pub use client::{CatalogClient, ShopInfo};

use thiserror::Error;

use catalog_cache_core::CredentialError;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// The API accepted the request but reported errors in the body.
    ///
    /// Holds the `errors` payload exactly as returned.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(serde_json::Value),

    /// The API answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Upstream status code.
        status: u16,
        /// Upstream `errors` payload or reason phrase.
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The response body was not the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The HTTP client could not be built.
    #[error("Client configuration error: {0}")]
    Client(#[source] reqwest::Error),

    /// The credential context could not produce an endpoint.
    #[error("Invalid credentials: {0}")]
    Credential(#[from] CredentialError),
}

impl ShopifyError {
    /// Upstream HTTP status associated with this error, if any.
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the failure happened reaching the API rather than in what it
    /// said back.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Timeout(_) | Self::Http(_))
    }
}

/// Whether a top-level `errors` value counts as an application error.
///
/// `null` and `[]` are treated as "no errors"; anything else (a non-empty
/// list, a bare string, an object) is an error.
pub(crate) fn has_graphql_errors(errors: &serde_json::Value) -> bool {
    match errors {
        serde_json::Value::Null => false,
        serde_json::Value::Array(list) => !list.is_empty(),
        _ => true,
    }
}

fn format_graphql_errors(errors: &serde_json::Value) -> String {
    let list = match errors {
        serde_json::Value::Array(list) if !list.is_empty() => list,
        serde_json::Value::Array(_) | serde_json::Value::Null => {
            return "(no error details provided)".to_string();
        }
        serde_json::Value::String(message) => return message.clone(),
        other => return other.to_string(),
    };

    list.iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            // Include message if present
            if let Some(message) = e.get("message").and_then(serde_json::Value::as_str)
                && !message.is_empty()
            {
                parts.push(message.to_string());
            }

            // Include path if present
            if let Some(path) = e.get("path").and_then(serde_json::Value::as_array)
                && !path.is_empty()
            {
                let path_str = path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            // Include location if present
            if let Some(loc) = e
                .get("locations")
                .and_then(serde_json::Value::as_array)
                .and_then(|locs| locs.first())
            {
                let line = loc.get("line").and_then(serde_json::Value::as_i64);
                let column = loc.get("column").and_then(serde_json::Value::as_i64);
                if let (Some(line), Some(column)) = (line, column) {
                    parts.push(format!("at line {line}:{column}"));
                }
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
