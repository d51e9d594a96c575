//! HTTP route handlers for the catalog proxy.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Liveness text
//! GET  /health                         - Health check
//!
//! # Sync (fetch from Shopify, replace the snapshot)
//! POST /sync
//! POST /sync-products
//! POST /sync-product
//! POST /sync-products/sync-products
//! POST /sync-products/sync-product
//!
//! # Cached catalog (read the snapshot)
//! GET  /products
//! GET  /sync
//! GET  /sync-products
//! GET  /sync-product
//! GET  /sync-products/products
//! GET  /sync-products/sync-products
//! GET  /sync-products/sync-product
//! ```
//!
//! Anything else, including a known path with another method, is answered
//! with the JSON 404 body.

pub mod catalog;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Paths that accept `POST` to trigger a sync.
pub const SYNC_PATHS: &[&str] = &[
    "/sync",
    "/sync-products",
    "/sync-product",
    "/sync-products/sync-products",
    "/sync-products/sync-product",
];

/// Paths that accept `GET` to read the cached catalog.
pub const READ_PATHS: &[&str] = &[
    "/products",
    "/sync",
    "/sync-products",
    "/sync-product",
    "/sync-products/products",
    "/sync-products/sync-products",
    "/sync-products/sync-product",
];

/// Create the application router (without state).
///
/// Paths listed in both tables get both methods on one route.
pub fn routes() -> Router<AppState> {
    let mut router = Router::new()
        .route("/", get(catalog::liveness))
        .route("/health", get(catalog::health));

    for path in SYNC_PATHS {
        router = router.route(path, post(catalog::sync_products));
    }
    for path in READ_PATHS {
        router = router.route(path, get(catalog::cached_products));
    }

    router
        .fallback(catalog::unknown_route)
        .method_not_allowed_fallback(catalog::unknown_route)
}
