//! Conversion from raw catalog types to [`storelens_core::ProductItem`].

use serde_json::{Map, Value};
use storelens_core::{ProductId, ProductItem};

use crate::client::extract_store_origin;
use crate::types::ShopifyProduct;

/// Normalizes a raw [`ShopifyProduct`] into a [`ProductItem`].
///
/// Price fields are taken from the first variant exactly as reported. A
/// product is available when any variant is; variants that omit the flag
/// count as available.
#[must_use]
pub fn normalize_product(product: ShopifyProduct, shop_url: &str) -> ProductItem {
    let url = (!product.handle.is_empty()).then(|| {
        format!(
            "{}/products/{}",
            extract_store_origin(shop_url),
            product.handle
        )
    });

    let first_variant = product.variants.first();
    let price = first_variant.and_then(|v| scalar_field(v, "price"));
    let compare_at_price = first_variant.and_then(|v| scalar_field(v, "compare_at_price"));
    let available = product
        .variants
        .iter()
        .any(|v| v.get("available").and_then(Value::as_bool).unwrap_or(true));

    ProductItem {
        id: ProductId::Native(product.id),
        title: product.title,
        handle: product.handle,
        vendor: product.vendor.unwrap_or_default(),
        product_type: product.product_type.unwrap_or_default(),
        price,
        compare_at_price,
        available,
        tags: product.tags.into_values().collect(),
        images: product.images.into_iter().map(|image| image.src).collect(),
        description: product.body_html.filter(|html| !html.trim().is_empty()),
        url,
        variants: product.variants,
    }
}

/// Reads a string or numeric field as a string. Empty strings and nulls are
/// treated as absent.
fn scalar_field(variant: &Map<String, Value>, key: &str) -> Option<String> {
    match variant.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
