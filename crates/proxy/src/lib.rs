//! Catalog cache proxy library.
//!
//! Syncs a bounded page of the Shopify catalog into a local JSON snapshot
//! and serves that snapshot over HTTP. The binary in `main.rs` adds
//! configuration loading, Sentry, rate limiting, and the listener; everything
//! else lives here so it can be tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod snapshot;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    middleware::{from_fn, from_fn_with_state},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Build the application router with every layer except rate limiting and
/// Sentry, which the binary adds on top.
pub fn app(state: AppState) -> Router {
    let environment = state.config().environment;

    routes::routes()
        .with_state(state)
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(from_fn_with_state(
            environment,
            error::expose_internal_detail,
        ))
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .layer(CorsLayer::permissive())
}
