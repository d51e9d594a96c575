//! Catalog sync and read handlers.

use axum::{Json, extract::State};
use catalog_cache_core::Product;
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::SyncReport;
use crate::state::AppState;

/// Body of a successful sync.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub products: Vec<Product>,
}

impl From<SyncReport> for SyncResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            success: true,
            message: format!("Synced {} products", report.count),
            count: report.count,
            products: report.products,
        }
    }
}

/// Body of a successful cached read.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub success: bool,
    pub count: usize,
    pub products: Vec<Product>,
}

/// Fetch the catalog from Shopify and replace the snapshot.
#[instrument(skip(state))]
pub async fn sync_products(State(state): State<AppState>) -> Result<Json<SyncResponse>> {
    let credentials = state.credentials().ok_or(AppError::ConfigurationMissing)?;
    let report = state.sync().sync(credentials).await?;
    Ok(Json(report.into()))
}

/// Serve the snapshot written by the last successful sync.
#[instrument(skip(state))]
pub async fn cached_products(State(state): State<AppState>) -> Result<Json<CatalogResponse>> {
    let products = state.sync().cached().await?;
    Ok(Json(CatalogResponse {
        success: true,
        count: products.len(),
        products,
    }))
}

/// Liveness text for `/`.
pub async fn liveness() -> &'static str {
    "Catalog cache is running."
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check Shopify or the
/// snapshot.
pub async fn health() -> &'static str {
    "ok"
}

/// Fallback for unmatched routes and methods.
pub async fn unknown_route() -> AppError {
    AppError::UnknownRoute
}
