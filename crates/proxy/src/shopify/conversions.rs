//! Conversions from GraphQL response nodes to catalog types.
//!
//! The Admin API nests every list in `edges { node }` wrappers. These helpers
//! flatten products, variants, and images into the plain ordered lists the
//! snapshot stores.

use catalog_cache_core::{Image, Product, Variant};

use super::queries::sync_products::{ImageNode, ProductNode, ResponseData, VariantNode};

/// Flatten a `SyncProducts` response into products, preserving upstream order.
pub fn convert_products(data: ResponseData) -> Vec<Product> {
    data.products.into_nodes().map(convert_product).collect()
}

fn convert_product(node: ProductNode) -> Product {
    Product {
        id: node.id,
        title: node.title,
        handle: node.handle,
        description: node.description,
        product_type: node.product_type,
        vendor: node.vendor,
        tags: node.tags,
        created_at: node.created_at,
        updated_at: node.updated_at,
        status: node.status,
        variants: node.variants.into_nodes().map(convert_variant).collect(),
        images: node.images.into_nodes().map(convert_image).collect(),
    }
}

fn convert_variant(node: VariantNode) -> Variant {
    Variant {
        id: node.id,
        title: node.title,
        price: node.price,
        sku: node.sku,
        inventory_quantity: node.inventory_quantity,
        available_for_sale: node.available_for_sale,
    }
}

fn convert_image(node: ImageNode) -> Image {
    Image {
        id: node.id,
        url: node.url,
        alt_text: node.alt_text,
    }
}
