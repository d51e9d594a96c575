//! Per-IP rate limiting using governor and `tower_governor`.
//!
//! Defaults to 100 requests per 15 minutes per client IP: a burst of 100 that
//! refills one slot every 9 seconds.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, RETRY_AFTER};
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware::map_response;
use axum::response::Response;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::RateLimitConfig;

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Headers a fronting proxy uses to report the client IP, in order of preference.
const FORWARDING_HEADERS: &[&str] = &[
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

/// Key extractor for the client IP.
///
/// Keys on the peer address of the connection. With `trust_proxy_headers`
/// set, the IP reported by a fronting proxy (`CF-Connecting-IP`,
/// `X-Forwarded-For`, `X-Real-IP`, `Fly-Client-IP`) wins over the peer
/// address. Clients can set those headers freely, so they only mean anything
/// behind a proxy that overwrites them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpKeyExtractor {
    trust_proxy_headers: bool,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub const fn new(trust_proxy_headers: bool) -> Self {
        Self {
            trust_proxy_headers,
        }
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();
        let header_ip = |name: &&str| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        };

        let forwarded = if self.trust_proxy_headers {
            FORWARDING_HEADERS.iter().find_map(header_ip)
        } else {
            None
        };

        forwarded
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, Body>;

/// Create the per-IP rate limiter.
///
/// Returns `None` if the configuration has a zero limit or window.
#[must_use]
pub fn catalog_rate_limiter(config: &RateLimitConfig) -> Option<RateLimiterLayer> {
    let governor = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(config.trust_proxy_headers))
        .period(config.replenish_interval())
        .burst_size(config.requests_per_window)
        .finish()?;
    Some(GovernorLayer::new(Arc::new(governor)))
}

/// Wrap `router` in the per-IP limiter, with JSON 429 bodies.
///
/// Returns `None` if the configuration has a zero limit or window. The
/// limiter keys on the peer address when no proxy header is present, so the
/// router must be served with `into_make_service_with_connect_info`.
#[must_use]
pub fn with_rate_limit(router: Router, config: &RateLimitConfig) -> Option<Router> {
    let limiter = catalog_rate_limiter(config)?;
    Some(router.layer(limiter).layer(map_response(rate_limited_json)))
}

/// Render the limiter's plain-text 429 as a JSON error body.
///
/// Keeps the `retry-after` and `x-ratelimit-*` headers.
pub async fn rate_limited_json(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    let message = parts
        .headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(
            || "Too many requests, please try again later.".to_string(),
            |secs| format!("Too many requests, please try again in {secs} seconds."),
        );
    let body = serde_json::json!({ "error": "Too Many Requests", "message": message });

    parts.headers.remove(CONTENT_LENGTH);
    parts
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Response::from_parts(parts, Body::from(body.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::time::Duration;

    use axum::routing::get;
    use tower::ServiceExt;
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn peer(mut req: Request<Body>, ip: [u8; 4]) -> Request<Body> {
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((ip, 4000))));
        req
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_extractor_ignores_proxy_headers_by_default() {
        let req = peer(
            request(&[
                ("x-forwarded-for", "203.0.113.7"),
                ("cf-connecting-ip", "198.51.100.4"),
            ]),
            [192, 0, 2, 9],
        );
        assert_eq!(
            ClientIpKeyExtractor::default().extract(&req).unwrap(),
            ip("192.0.2.9")
        );
    }

    #[test]
    fn test_trusted_extractor_prefers_proxy_headers() {
        let trusted = ClientIpKeyExtractor::new(true);

        let req = peer(
            request(&[
                ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
                ("cf-connecting-ip", "198.51.100.4"),
            ]),
            [192, 0, 2, 9],
        );
        assert_eq!(trusted.extract(&req).unwrap(), ip("198.51.100.4"));

        let req = request(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        assert_eq!(trusted.extract(&req).unwrap(), ip("203.0.113.7"));
    }

    #[test]
    fn test_trusted_extractor_falls_back_to_peer_address() {
        let req = peer(request(&[("x-real-ip", "not an ip")]), [192, 0, 2, 9]);
        assert_eq!(
            ClientIpKeyExtractor::new(true).extract(&req).unwrap(),
            ip("192.0.2.9")
        );
    }

    #[test]
    fn test_extractor_without_any_source() {
        assert!(ClientIpKeyExtractor::default().extract(&request(&[])).is_err());
        let forwarded_only = request(&[("x-forwarded-for", "203.0.113.7")]);
        assert!(ClientIpKeyExtractor::default().extract(&forwarded_only).is_err());
    }

    #[tokio::test]
    async fn test_limit_is_enforced_with_json_body() {
        let app = with_rate_limit(
            Router::new().route("/", get(|| async { "ok" })),
            &RateLimitConfig {
                requests_per_window: 2,
                window: Duration::from_secs(3600),
                trust_proxy_headers: false,
            },
        )
        .unwrap();

        // Rotating the forwarded IP does not earn a fresh budget
        for i in 0..2 {
            let forwarded = format!("10.0.0.{i}");
            let response = app
                .clone()
                .oneshot(peer(request(&[("x-forwarded-for", &forwarded)]), [203, 0, 113, 7]))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .clone()
            .oneshot(peer(request(&[("x-forwarded-for", "10.0.0.99")]), [203, 0, 113, 7]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Too Many Requests");

        // Another peer still gets through
        let response = app
            .oneshot(peer(request(&[]), [198, 51, 100, 4]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let response = Response::new(Body::from("fine"));
        let response = rate_limited_json(response).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }
}
