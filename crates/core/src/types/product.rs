//! Product domain types, shaped like the Admin API `Product` node.
//!
//! Field names serialize in camelCase so the persisted snapshot reads like
//! the upstream response. Variants and images are plain ordered lists; the
//! GraphQL `edges { node }` wrappers are flattened before these types are
//! built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ImageGid, ProductGid, VariantGid};
use super::price::Price;
use super::status::ProductStatus;

/// A product in the cached catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product global ID.
    pub id: ProductGid,
    /// Product title.
    pub title: String,
    /// URL handle.
    pub handle: String,
    /// Plain text description.
    pub description: String,
    /// Product type/category.
    pub product_type: String,
    /// Vendor name.
    pub vendor: String,
    /// Product tags.
    pub tags: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Publication status.
    pub status: ProductStatus,
    /// First page of variants, in upstream order.
    pub variants: Vec<Variant>,
    /// First page of images, in upstream order.
    pub images: Vec<Image>,
}

/// A product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Variant global ID.
    pub id: VariantGid,
    /// Variant title (combination of option values).
    pub title: String,
    /// Current price.
    pub price: Price,
    /// SKU code.
    pub sku: Option<String>,
    /// Inventory quantity across all locations. Null when the token lacks
    /// inventory scopes.
    pub inventory_quantity: Option<i64>,
    /// Whether the variant can currently be purchased.
    pub available_for_sale: bool,
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Image global ID.
    pub id: Option<ImageGid>,
    /// CDN URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

impl Product {
    /// Total inventory across the fetched variants, skipping variants whose
    /// quantity is unknown.
    #[must_use]
    pub fn total_inventory(&self) -> i64 {
        self.variants
            .iter()
            .filter_map(|v| v.inventory_quantity)
            .sum()
    }

    /// Whether any fetched variant is available for sale.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.variants.iter().any(|v| v.available_for_sale)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const PRODUCT_JSON: &str = r#"{
        "id": "gid://shopify/Product/1",
        "title": "Dried Pineapple",
        "handle": "dried-pineapple",
        "description": "Sweet.",
        "productType": "Snacks",
        "vendor": "Acme",
        "tags": ["fruit", "dried"],
        "createdAt": "2024-01-15T10:00:00Z",
        "updatedAt": "2024-02-01T08:30:00Z",
        "status": "ACTIVE",
        "variants": [
            {
                "id": "gid://shopify/ProductVariant/11",
                "title": "Small",
                "price": "4.99",
                "sku": "DP-S",
                "inventoryQuantity": 12,
                "availableForSale": true
            },
            {
                "id": "gid://shopify/ProductVariant/12",
                "title": "Large",
                "price": "8.00",
                "sku": null,
                "inventoryQuantity": null,
                "availableForSale": false
            }
        ],
        "images": [
            {"id": "gid://shopify/ProductImage/21", "url": "https://cdn.shopify.com/a.jpg", "altText": null}
        ]
    }"#;

    #[test]
    fn test_product_deserializes_camel_case() {
        let product: Product = serde_json::from_str(PRODUCT_JSON).unwrap();
        assert_eq!(product.product_type, "Snacks");
        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.variants[1].sku, None);
        assert_eq!(product.images[0].alt_text, None);
        assert_eq!(product.id.numeric_id(), Some(1));
    }

    #[test]
    fn test_product_serializes_upstream_field_names() {
        let product: Product = serde_json::from_str(PRODUCT_JSON).unwrap();
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["productType"], "Snacks");
        assert_eq!(value["variants"][0]["inventoryQuantity"], 12);
        assert_eq!(value["variants"][0]["availableForSale"], true);
        assert_eq!(value["variants"][1]["price"], "8.00");
        assert!(value["images"][0]["altText"].is_null());
    }

    #[test]
    fn test_total_inventory_skips_unknown() {
        let product: Product = serde_json::from_str(PRODUCT_JSON).unwrap();
        assert_eq!(product.total_inventory(), 12);
        assert!(product.is_available());
    }
}
