//! GraphQL query definitions for the Shopify Admin API.
//!
//! The queries are small and fixed, so the `GraphQLQuery` implementations are
//! written out by hand instead of generated from the full Admin schema. Each
//! query lives in its own module with `QUERY`, `OPERATION_NAME`, `Variables`,
//! and `ResponseData`, the same layout `graphql_client` codegen produces.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::Deserialize;

/// Products requested per sync.
pub const PRODUCT_PAGE_SIZE: i64 = 50;
/// Variants requested per product.
pub const VARIANT_PAGE_SIZE: i64 = 10;
/// Images requested per product.
pub const IMAGE_PAGE_SIZE: i64 = 5;

/// A GraphQL connection reduced to its edges.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

/// A single edge of a GraphQL connection.
#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

impl<T> Connection<T> {
    /// Unwrap the `edges { node }` structure, keeping order.
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().map(|edge| edge.node)
    }
}

// =============================================================================
// SyncProducts
// =============================================================================

/// Fetch the bounded catalog page used for a sync.
pub struct SyncProducts;

pub mod sync_products {
    use catalog_cache_core::{ImageGid, Price, ProductGid, ProductStatus, VariantGid};
    use serde::{Deserialize, Serialize};

    use super::Connection;

    pub const OPERATION_NAME: &str = "SyncProducts";
    pub const QUERY: &str = r"query SyncProducts($first: Int!, $variantCount: Int!, $imageCount: Int!) {
  products(first: $first) {
    edges {
      node {
        id
        title
        handle
        description
        productType
        vendor
        tags
        createdAt
        updatedAt
        status
        variants(first: $variantCount) {
          edges {
            node {
              id
              title
              price
              sku
              inventoryQuantity
              availableForSale
            }
          }
        }
        images(first: $imageCount) {
          edges {
            node {
              id
              url
              altText
            }
          }
        }
      }
    }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub first: i64,
        pub variant_count: i64,
        pub image_count: i64,
    }

    impl Default for Variables {
        fn default() -> Self {
            Self {
                first: super::PRODUCT_PAGE_SIZE,
                variant_count: super::VARIANT_PAGE_SIZE,
                image_count: super::IMAGE_PAGE_SIZE,
            }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Connection<ProductNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductNode {
        pub id: ProductGid,
        pub title: String,
        pub handle: String,
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub product_type: String,
        #[serde(default)]
        pub vendor: String,
        #[serde(default)]
        pub tags: Vec<String>,
        pub created_at: chrono::DateTime<chrono::Utc>,
        pub updated_at: chrono::DateTime<chrono::Utc>,
        pub status: ProductStatus,
        pub variants: Connection<VariantNode>,
        pub images: Connection<ImageNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct VariantNode {
        pub id: VariantGid,
        pub title: String,
        pub price: Price,
        pub sku: Option<String>,
        pub inventory_quantity: Option<i64>,
        pub available_for_sale: bool,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ImageNode {
        pub id: Option<ImageGid>,
        pub url: String,
        pub alt_text: Option<String>,
    }
}

impl GraphQLQuery for SyncProducts {
    type Variables = sync_products::Variables;
    type ResponseData = sync_products::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: sync_products::QUERY,
            operation_name: sync_products::OPERATION_NAME,
        }
    }
}

// =============================================================================
// ShopInfo
// =============================================================================

/// Minimal query used to check that a shop, token, and API version work.
pub struct ShopInfo;

pub mod shop_info {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "ShopInfo";
    pub const QUERY: &str = "query ShopInfo {\n  shop {\n    name\n    email\n  }\n}\n";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables;

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub shop: Shop,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Shop {
        pub name: String,
        pub email: Option<String>,
    }
}

impl GraphQLQuery for ShopInfo {
    type Variables = shop_info::Variables;
    type ResponseData = shop_info::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: shop_info::QUERY,
            operation_name: shop_info::OPERATION_NAME,
        }
    }
}

// =============================================================================
// ProductTitles
// =============================================================================

/// Lightweight product listing used by connection checks.
pub struct ProductTitles;

pub mod product_titles {
    use catalog_cache_core::ProductGid;
    use serde::{Deserialize, Serialize};

    use super::Connection;

    pub const OPERATION_NAME: &str = "ProductTitles";
    pub const QUERY: &str = "query ProductTitles($first: Int!) {\n  products(first: $first) {\n    edges {\n      node {\n        id\n        title\n      }\n    }\n  }\n}\n";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Connection<ProductTitleNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ProductTitleNode {
        pub id: ProductGid,
        pub title: String,
    }
}

impl GraphQLQuery for ProductTitles {
    type Variables = product_titles::Variables;
    type ResponseData = product_titles::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: product_titles::QUERY,
            operation_name: product_titles::OPERATION_NAME,
        }
    }
}
