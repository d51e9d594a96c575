//! Proxy configuration loaded from environment variables.
//!
//! Configuration is read exactly once at startup into an immutable
//! [`ProxyConfig`]. Request handlers never consult the environment.
//!
//! # Environment Variables
//!
//! ## Shopify (required for `/sync`)
//! - `SHOPIFY_SHOP_NAME` - Shop handle or domain (e.g., `acme` or `acme.myshopify.com`)
//! - `SHOPIFY_ADMIN_API_ACCESS_TOKEN` - Admin API access token
//!
//! Missing Shopify credentials do not stop the proxy from starting: the cached
//! catalog is still served and sync requests report the missing configuration.
//!
//! ## Optional
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-01)
//! - `SHOPIFY_TLS_VERIFY` - `strict` or `accept-invalid` (default: strict)
//! - `SHOPIFY_TIMEOUT_SECS` - Upstream request timeout (default: 30)
//! - `CATALOG_HOST` - Bind address (default: 127.0.0.1)
//! - `CATALOG_PORT` / `PORT` - Listen port (default: 3000)
//! - `CATALOG_SNAPSHOT_PATH` - Snapshot file (default: data/products.json)
//! - `CATALOG_ENV` - `production` or `development` (default: production)
//! - `CATALOG_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `CATALOG_RATE_LIMIT_PER_WINDOW` - Requests per IP per window (default: 100)
//! - `CATALOG_RATE_LIMIT_WINDOW_SECS` - Rate limit window (default: 900)
//! - `CATALOG_TRUST_PROXY_HEADERS` - Key the rate limit on `X-Forwarded-For` and
//!   similar headers instead of the peer address (default: false). Only enable
//!   behind a proxy that overwrites them.
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use catalog_cache_core::CredentialContext;
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_SNAPSHOT_PATH: &str = "data/products.json";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment environment.
///
/// Only `Development` exposes internal error detail in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    /// Whether internal error detail may be sent to clients.
    #[must_use]
    pub const fn exposes_error_detail(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Name used for Sentry's environment tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(format!("expected 'production' or 'development', got '{other}'")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Certificate verification policy for upstream HTTPS calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVerification {
    /// Verify the full certificate chain and host name.
    #[default]
    Strict,
    /// Accept any certificate. Only for debugging intercepting proxies.
    AcceptInvalid,
}

impl FromStr for TlsVerification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" | "true" | "1" => Ok(Self::Strict),
            "accept-invalid" | "false" | "0" => Ok(Self::AcceptInvalid),
            other => Err(format!("expected 'strict' or 'accept-invalid', got '{other}'")),
        }
    }
}

/// Proxy application configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Location of the persisted catalog snapshot
    pub snapshot_path: PathBuf,
    /// Deployment environment
    pub environment: Environment,
    /// Log output format
    pub log_format: LogFormat,
    /// Per-IP rate limiting
    pub rate_limit: RateLimitConfig,
    /// Shopify Admin API configuration
    pub shopify: ShopifyConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Per-IP rate limiting configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window
    pub requests_per_window: u32,
    /// Window length
    pub window: Duration,
    /// Take the client IP from forwarding headers before the peer address
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 100,
            window: Duration::from_secs(15 * 60),
            trust_proxy_headers: false,
        }
    }
}

impl RateLimitConfig {
    /// Time needed to replenish a single request slot.
    #[must_use]
    pub fn replenish_interval(&self) -> Duration {
        self.window / self.requests_per_window.max(1)
    }
}

/// Shopify Admin API configuration.
#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    /// Credentials, absent when the shop or token variable is unset
    pub credentials: Option<CredentialContext>,
    /// Names of the credential variables that were not set
    pub missing: Vec<&'static str>,
    /// Certificate verification policy
    pub tls_verification: TlsVerification,
    /// Upper bound on a single upstream request
    pub timeout: Duration,
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            missing: Vec::new(),
            tls_verification: TlsVerification::Strict,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ProxyConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if the
    /// access token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`ProxyConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Lookup(&lookup);

        let host = env.parsed("CATALOG_HOST", "127.0.0.1")?;
        let port = match env.get("CATALOG_PORT") {
            Some(_) => env.parsed("CATALOG_PORT", "3000")?,
            None => env.parsed("PORT", "3000")?,
        };
        let snapshot_path = PathBuf::from(env.or_default("CATALOG_SNAPSHOT_PATH", DEFAULT_SNAPSHOT_PATH));
        let environment = env.parsed("CATALOG_ENV", "production")?;
        let log_format = env.parsed("CATALOG_LOG_FORMAT", "pretty")?;

        let rate_limit = RateLimitConfig {
            requests_per_window: env.parsed("CATALOG_RATE_LIMIT_PER_WINDOW", "100")?,
            window: Duration::from_secs(env.parsed("CATALOG_RATE_LIMIT_WINDOW_SECS", "900")?),
            trust_proxy_headers: env.parsed("CATALOG_TRUST_PROXY_HEADERS", "false")?,
        };
        if rate_limit.requests_per_window == 0 || rate_limit.window.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_RATE_LIMIT_PER_WINDOW".to_string(),
                "rate limit and window must be greater than zero".to_string(),
            ));
        }
        if rate_limit.replenish_interval().is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_RATE_LIMIT_PER_WINDOW".to_string(),
                "too many requests for the window; one request must refill in at least 1ns".to_string(),
            ));
        }

        let shopify = ShopifyConfig::from_lookup(&env)?;
        let sentry_dsn = env.get("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            snapshot_path,
            environment,
            log_format,
            rate_limit,
            shopify,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyConfig {
    fn from_lookup(env: &Lookup<'_>) -> Result<Self, ConfigError> {
        let shop = env.get("SHOPIFY_SHOP_NAME");
        let token = env.get("SHOPIFY_ADMIN_API_ACCESS_TOKEN");
        let api_version = env.get("SHOPIFY_API_VERSION");

        let mut missing = Vec::new();
        if shop.is_none() {
            missing.push("SHOPIFY_SHOP_NAME");
        }
        if token.is_none() {
            missing.push("SHOPIFY_ADMIN_API_ACCESS_TOKEN");
        }

        let credentials = match (shop, token) {
            (Some(shop), Some(token)) => {
                validate_secret_strength(&token, "SHOPIFY_ADMIN_API_ACCESS_TOKEN")?;
                let context = CredentialContext::new(
                    &shop,
                    SecretString::from(token),
                    api_version.as_deref(),
                )
                .map_err(|e| ConfigError::InvalidEnvVar("SHOPIFY_SHOP_NAME".to_string(), e.to_string()))?;
                Some(context)
            }
            _ => None,
        };

        let timeout_secs: u64 = env.parsed("SHOPIFY_TIMEOUT_SECS", "30")?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            credentials,
            missing,
            tls_verification: env.parsed("SHOPIFY_TLS_VERIFY", "strict")?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source with the usual accessors. Empty values count as unset.
struct Lookup<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Lookup<'_> {
    /// Get an optional variable.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Get and parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Reject secrets that are obviously copied from a template.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ProxyConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ProxyConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.snapshot_path, PathBuf::from("data/products.json"));
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.rate_limit, RateLimitConfig::default());
        assert_eq!(config.shopify.tls_verification, TlsVerification::Strict);
        assert_eq!(config.shopify.timeout, Duration::from_secs(30));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_credentials_are_not_fatal() {
        let config = load(&[("SHOPIFY_SHOP_NAME", "acme")]).unwrap();
        assert!(config.shopify.credentials.is_none());
        assert_eq!(config.shopify.missing, vec!["SHOPIFY_ADMIN_API_ACCESS_TOKEN"]);

        let config = load(&[]).unwrap();
        assert_eq!(config.shopify.missing.len(), 2);
    }

    #[test]
    fn test_credentials_loaded() {
        let config = load(&[
            ("SHOPIFY_SHOP_NAME", "acme"),
            ("SHOPIFY_ADMIN_API_ACCESS_TOKEN", "shpat_0123456789abcdef"),
            ("SHOPIFY_API_VERSION", "2024-07"),
        ])
        .unwrap();
        let credentials = config.shopify.credentials.unwrap();
        assert_eq!(credentials.shop(), "acme");
        assert_eq!(credentials.api_version(), "2024-07");
        assert!(config.shopify.missing.is_empty());
    }

    #[test]
    fn test_api_version_defaults_when_unset() {
        let config = load(&[
            ("SHOPIFY_SHOP_NAME", "acme"),
            ("SHOPIFY_ADMIN_API_ACCESS_TOKEN", "shpat_0123456789abcdef"),
        ])
        .unwrap();
        assert_eq!(config.shopify.credentials.unwrap().api_version(), "2024-01");
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let result = load(&[
            ("SHOPIFY_SHOP_NAME", "acme"),
            ("SHOPIFY_ADMIN_API_ACCESS_TOKEN", "your-admin-token-here"),
        ]);
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_tls_bypass_is_opt_in() {
        let config = load(&[("SHOPIFY_TLS_VERIFY", "accept-invalid")]).unwrap();
        assert_eq!(config.shopify.tls_verification, TlsVerification::AcceptInvalid);

        let result = load(&[("SHOPIFY_TLS_VERIFY", "maybe")]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_port_fallback() {
        let config = load(&[("PORT", "8080")]).unwrap();
        assert_eq!(config.port, 8080);

        let config = load(&[("PORT", "8080"), ("CATALOG_PORT", "9090")]).unwrap();
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load(&[("CATALOG_PORT", "not-a-port")]).is_err());
        assert!(load(&[("CATALOG_ENV", "staging")]).is_err());
        assert!(load(&[("SHOPIFY_TIMEOUT_SECS", "0")]).is_err());
        assert!(load(&[("CATALOG_RATE_LIMIT_PER_WINDOW", "0")]).is_err());
        assert!(load(&[("CATALOG_TRUST_PROXY_HEADERS", "sometimes")]).is_err());
    }

    #[test]
    fn test_rate_limit_that_cannot_refill_rejected() {
        let result = load(&[
            ("CATALOG_RATE_LIMIT_PER_WINDOW", "4294967295"),
            ("CATALOG_RATE_LIMIT_WINDOW_SECS", "1"),
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(ref key, _)) if key == "CATALOG_RATE_LIMIT_PER_WINDOW"));

        let config = load(&[
            ("CATALOG_RATE_LIMIT_PER_WINDOW", "1000000000"),
            ("CATALOG_RATE_LIMIT_WINDOW_SECS", "1"),
        ])
        .unwrap();
        assert_eq!(config.rate_limit.replenish_interval(), Duration::from_nanos(1));
    }

    #[test]
    fn test_proxy_headers_untrusted_by_default() {
        assert!(!load(&[]).unwrap().rate_limit.trust_proxy_headers);
        let config = load(&[("CATALOG_TRUST_PROXY_HEADERS", "true")]).unwrap();
        assert!(config.rate_limit.trust_proxy_headers);
    }

    #[test]
    fn test_development_exposes_detail() {
        let config = load(&[("CATALOG_ENV", "development")]).unwrap();
        assert!(config.environment.exposes_error_detail());
        assert!(!Environment::Production.exposes_error_detail());
    }

    #[test]
    fn test_replenish_interval() {
        let limits = RateLimitConfig::default();
        assert_eq!(limits.replenish_interval(), Duration::from_secs(9));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[
            ("SHOPIFY_SHOP_NAME", "acme"),
            ("SHOPIFY_ADMIN_API_ACCESS_TOKEN", "shpat_supersecretvalue"),
        ])
        .unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("acme"));
        assert!(!debug_output.contains("shpat_supersecretvalue"));
    }
}
