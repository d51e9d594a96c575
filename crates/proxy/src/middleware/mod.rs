//! HTTP middleware stack for the catalog proxy.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. Rate limiting JSON rejection and `tower_governor` (added in `main`)
//! 3. CORS
//! 4. `TraceLayer` (request tracing)
//! 5. Request ID (add unique ID to each request)
//! 6. Security headers
//! 7. Internal error detail (development only)
//! 8. Panic catcher

pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use rate_limit::with_rate_limit;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
