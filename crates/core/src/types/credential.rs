//! Credentials for the Shopify Admin API.
//!
//! A [`CredentialContext`] is built once at startup and handed to every
//! upstream call. It is immutable and never re-read from the environment.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-01";

const SHOP_DOMAIN_SUFFIX: &str = ".myshopify.com";

/// Errors building a credential context.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// Shop identifier is empty.
    #[error("shop identifier is missing")]
    MissingShop,
    /// Access token is empty.
    #[error("access token is missing")]
    MissingAccessToken,
    /// Shop identifier cannot form a valid host name.
    #[error("invalid shop identifier: {0}")]
    InvalidShop(String),
}

/// Shop identifier, access token, and API version needed to address the
/// Admin API.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CredentialContext {
    shop: String,
    access_token: SecretString,
    api_version: String,
}

impl CredentialContext {
    /// Build a credential context.
    ///
    /// `shop` may be a bare handle (`acme`) or a full domain
    /// (`acme.myshopify.com`, optionally with an `https://` scheme). An empty
    /// `api_version` falls back to [`DEFAULT_API_VERSION`].
    ///
    /// # Errors
    ///
    /// Returns `CredentialError` if the shop or token is empty, or if the shop
    /// is not a valid host label.
    pub fn new(
        shop: &str,
        access_token: SecretString,
        api_version: Option<&str>,
    ) -> Result<Self, CredentialError> {
        let shop = normalize_shop(shop);
        if shop.is_empty() {
            return Err(CredentialError::MissingShop);
        }
        if !shop
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(CredentialError::InvalidShop(shop));
        }
        if access_token.expose_secret().trim().is_empty() {
            return Err(CredentialError::MissingAccessToken);
        }

        Ok(Self {
            shop,
            access_token,
            api_version: normalize_api_version(api_version),
        })
    }

    /// Shop handle (without the `.myshopify.com` suffix).
    #[must_use]
    pub fn shop(&self) -> &str {
        &self.shop
    }

    /// Admin API version.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Admin API access token.
    #[must_use]
    pub const fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// Return a copy of this context addressing a different API version.
    ///
    /// Normalized like [`CredentialContext::new`]: a blank version means
    /// [`DEFAULT_API_VERSION`].
    #[must_use]
    pub fn with_api_version(&self, api_version: &str) -> Self {
        Self {
            api_version: normalize_api_version(Some(api_version)),
            ..self.clone()
        }
    }

    /// GraphQL endpoint for this shop and API version:
    /// `https://{shop}.myshopify.com/admin/api/{version}/graphql.json`.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidShop` if the URL cannot be parsed.
    pub fn graphql_endpoint(&self) -> Result<Url, CredentialError> {
        let raw = format!(
            "https://{}{}/admin/api/{}/graphql.json",
            self.shop, SHOP_DOMAIN_SUFFIX, self.api_version
        );
        Url::parse(&raw).map_err(|e| CredentialError::InvalidShop(format!("{}: {e}", self.shop)))
    }
}

impl std::fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialContext")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

fn normalize_api_version(api_version: Option<&str>) -> String {
    api_version
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_API_VERSION)
        .to_string()
}

/// Strip scheme, trailing slashes, and the `.myshopify.com` suffix.
fn normalize_shop(shop: &str) -> String {
    let shop = shop.trim();
    let shop = shop
        .strip_prefix("https://")
        .or_else(|| shop.strip_prefix("http://"))
        .unwrap_or(shop);
    let shop = shop.trim_end_matches('/');
    shop.strip_suffix(SHOP_DOMAIN_SUFFIX)
        .unwrap_or(shop)
        .to_ascii_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn token() -> SecretString {
        SecretString::from("tok_abc")
    }

    #[test]
    fn test_graphql_endpoint() {
        let ctx = CredentialContext::new("acme", token(), Some("2024-01")).unwrap();
        assert_eq!(
            ctx.graphql_endpoint().unwrap().as_str(),
            "https://acme.myshopify.com/admin/api/2024-01/graphql.json"
        );
    }

    #[test]
    fn test_full_domain_is_normalized() {
        let ctx =
            CredentialContext::new("https://Acme.myshopify.com/", token(), Some("2024-04")).unwrap();
        assert_eq!(ctx.shop(), "acme");
        assert_eq!(
            ctx.graphql_endpoint().unwrap().as_str(),
            "https://acme.myshopify.com/admin/api/2024-04/graphql.json"
        );
    }

    #[test]
    fn test_api_version_defaults() {
        let ctx = CredentialContext::new("acme", token(), None).unwrap();
        assert_eq!(ctx.api_version(), DEFAULT_API_VERSION);

        let ctx = CredentialContext::new("acme", token(), Some("  ")).unwrap();
        assert_eq!(ctx.api_version(), DEFAULT_API_VERSION);
    }

    #[test]
    fn test_missing_values_rejected() {
        assert_eq!(
            CredentialContext::new("", token(), None).unwrap_err(),
            CredentialError::MissingShop
        );
        assert_eq!(
            CredentialContext::new("acme", SecretString::from(""), None).unwrap_err(),
            CredentialError::MissingAccessToken
        );
    }

    #[test]
    fn test_invalid_shop_rejected() {
        assert!(matches!(
            CredentialContext::new("acme/../evil", token(), None),
            Err(CredentialError::InvalidShop(_))
        ));
    }

    #[test]
    fn test_with_api_version() {
        let ctx = CredentialContext::new("acme", token(), None).unwrap();
        let other = ctx.with_api_version("2024-10");
        assert_eq!(other.api_version(), "2024-10");
        assert_eq!(other.shop(), "acme");

        let trimmed = ctx.with_api_version(" 2024-07 ");
        assert_eq!(trimmed.api_version(), "2024-07");
    }

    #[test]
    fn test_blank_api_version_override_uses_default() {
        let ctx = CredentialContext::new("acme", token(), Some("2024-10")).unwrap();
        let blank = ctx.with_api_version("");
        assert_eq!(blank.api_version(), DEFAULT_API_VERSION);
        assert_eq!(
            blank.graphql_endpoint().unwrap().as_str(),
            "https://acme.myshopify.com/admin/api/2024-01/graphql.json"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let ctx = CredentialContext::new("acme", SecretString::from("shpat_supersecret"), None)
            .unwrap();
        let debug_output = format!("{ctx:?}");
        assert!(debug_output.contains("acme"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpat_supersecret"));
    }
}
