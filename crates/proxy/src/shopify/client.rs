//! Shopify Admin API client implementation.
//!
//! Uses `graphql_client` query bodies with `reqwest` 0.13 for HTTP. The client
//! holds only transport settings (timeout, certificate policy); credentials
//! are passed to each call.

use std::sync::Arc;
use std::time::Duration;

use catalog_cache_core::{CredentialContext, Product};
use graphql_client::GraphQLQuery;
use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::{ShopifyConfig, TlsVerification};

use super::conversions::convert_products;
use super::queries::{
    PRODUCT_PAGE_SIZE, ProductTitles, ShopInfo as ShopInfoQuery, SyncProducts, product_titles,
    shop_info, sync_products,
};
use super::{ShopifyError, has_graphql_errors};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
const BODY_LOG_LIMIT: usize = 500;

/// Basic shop details returned by a connection check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopInfo {
    /// Shop display name.
    pub name: String,
    /// Shop contact email.
    pub email: Option<String>,
}

/// Client for the Shopify Admin GraphQL API.
///
/// Cheaply cloneable; clones share one connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    timeout: Duration,
    /// Replaces the per-shop endpoint (local stand-ins, forward proxies)
    endpoint_override: Option<Url>,
}

/// Top-level GraphQL response envelope.
///
/// `data` is kept untyped until `errors` has been checked so an error
/// response with a partial or odd `data` still classifies as an error.
#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

impl CatalogClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Client` if the HTTP client cannot be built.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        Self::build(config, None)
    }

    /// Create a client that sends every request to `endpoint` instead of the
    /// shop's `myshopify.com` address.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Client` if the HTTP client cannot be built.
    pub fn with_endpoint(config: &ShopifyConfig, endpoint: Url) -> Result<Self, ShopifyError> {
        Self::build(config, Some(endpoint))
    }

    fn build(config: &ShopifyConfig, endpoint_override: Option<Url>) -> Result<Self, ShopifyError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        if config.tls_verification == TlsVerification::AcceptInvalid {
            warn!(
                "TLS certificate verification is DISABLED for Shopify requests \
                 (SHOPIFY_TLS_VERIFY=accept-invalid); do not run this in production"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(ShopifyError::Client)?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                timeout: config.timeout,
                endpoint_override,
            }),
        })
    }

    /// Request timeout applied to every call.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// GraphQL endpoint used for the given credentials.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Credential` if the shop cannot form a URL.
    pub fn endpoint_for(&self, credentials: &CredentialContext) -> Result<Url, ShopifyError> {
        match &self.inner.endpoint_override {
            Some(endpoint) => Ok(endpoint.clone()),
            None => Ok(credentials.graphql_endpoint()?),
        }
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL query and classify the outcome.
    async fn execute<Q: GraphQLQuery>(
        &self,
        credentials: &CredentialContext,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let endpoint = self.endpoint_for(credentials)?;
        let body = Q::build_query(variables);

        debug!(endpoint = %endpoint, operation = body.operation_name, "Sending GraphQL request");

        let response = self
            .inner
            .client
            .post(endpoint)
            .header(ACCESS_TOKEN_HEADER, credentials.access_token().expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %truncate(&response_text, BODY_LOG_LIMIT),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                message: status_message(status, &response_text),
            });
        }

        let envelope: GraphQLResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!(
                error = %e,
                body = %truncate(&response_text, BODY_LOG_LIMIT),
                "Failed to parse Shopify GraphQL response"
            );
            ShopifyError::Malformed(format!("response is not valid JSON: {e}"))
        })?;

        if let Some(errors) = envelope.errors
            && has_graphql_errors(&errors)
        {
            warn!(errors = %errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(errors));
        }

        let data = envelope
            .data
            .filter(|data| !data.is_null())
            .ok_or_else(|| {
                error!(
                    body = %truncate(&response_text, BODY_LOG_LIMIT),
                    "Shopify GraphQL response has no data and no errors"
                );
                ShopifyError::Malformed("response has no data and no errors".to_string())
            })?;

        serde_json::from_value(data)
            .map_err(|e| ShopifyError::Malformed(format!("unexpected response data: {e}")))
    }

    /// Map a `reqwest` failure to a transport error.
    fn classify(&self, err: reqwest::Error) -> ShopifyError {
        if err.is_timeout() {
            ShopifyError::Timeout(self.inner.timeout)
        } else {
            ShopifyError::Http(err)
        }
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Fetch the bounded catalog page: up to 50 products, each with up to 10
    /// variants and 5 images, flattened into plain product records.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::GraphQL` if the API reported errors, a transport
    /// variant if the API could not be reached, or `ShopifyError::Malformed`
    /// if the body lacked `data.products.edges`.
    #[instrument(skip(self, credentials), fields(shop = %credentials.shop(), api_version = %credentials.api_version()))]
    pub async fn fetch_products(
        &self,
        credentials: &CredentialContext,
    ) -> Result<Vec<Product>, ShopifyError> {
        let data = self
            .execute::<SyncProducts>(credentials, sync_products::Variables::default())
            .await?;

        let products = convert_products(data);
        info!(count = products.len(), limit = PRODUCT_PAGE_SIZE, "Fetched products from Shopify");

        Ok(products)
    }

    /// Fetch the shop name and email. Used to verify credentials and the API
    /// version.
    ///
    /// # Errors
    ///
    /// Same classification as [`CatalogClient::fetch_products`].
    #[instrument(skip(self, credentials), fields(shop = %credentials.shop(), api_version = %credentials.api_version()))]
    pub async fn shop_info(&self, credentials: &CredentialContext) -> Result<ShopInfo, ShopifyError> {
        let data = self
            .execute::<ShopInfoQuery>(credentials, shop_info::Variables)
            .await?;

        Ok(ShopInfo {
            name: data.shop.name,
            email: data.shop.email,
        })
    }

    /// Fetch the titles of the first `first` products.
    ///
    /// # Errors
    ///
    /// Same classification as [`CatalogClient::fetch_products`].
    #[instrument(skip(self, credentials), fields(shop = %credentials.shop()))]
    pub async fn product_titles(
        &self,
        credentials: &CredentialContext,
        first: i64,
    ) -> Result<Vec<String>, ShopifyError> {
        let data = self
            .execute::<ProductTitles>(credentials, product_titles::Variables { first })
            .await?;

        Ok(data.products.into_nodes().map(|node| node.title).collect())
    }
}

/// Describe a non-success response: the upstream `errors` payload when the
/// body carries one, otherwise the reason phrase.
fn status_message(status: reqwest::StatusCode, body: &str) -> String {
    let from_body = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("errors").cloned())
        .map(|errors| match errors {
            serde_json::Value::String(message) => message,
            other => other.to_string(),
        });

    from_body.unwrap_or_else(|| {
        status
            .canonical_reason()
            .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
    })
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
