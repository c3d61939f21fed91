//! Response types for the public `products.json` endpoint.
//!
//! ### Tags
//! Current storefronts return tags as a JSON array of strings; some older
//! themes and proxies still return one comma-separated string. Both shapes
//! are accepted.
//!
//! ### Malformed entries
//! Each product is decoded on its own. One entry with a missing title or a
//! broken image list is skipped with a warning instead of failing the page.
//!
//! ### Variants
//! Variants are kept as opaque JSON objects and passed through untouched.
//! Only `price`, `compare_at_price`, and `available` are read from them,
//! during normalization.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Top-level response from `GET /products.json`.
///
/// `products` holds the raw entries; see [`ShopifyProductsResponse::into_products`].
#[derive(Debug, Deserialize)]
pub struct ShopifyProductsResponse {
    #[serde(default)]
    pub products: Vec<Value>,
}

impl ShopifyProductsResponse {
    /// Decodes every entry that parses as a [`ShopifyProduct`], skipping the rest.
    #[must_use]
    pub fn into_products(self) -> Vec<ShopifyProduct> {
        self.products
            .into_iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                let id = raw.get("id").cloned();
                match serde_json::from_value::<ShopifyProduct>(raw) {
                    Ok(product) => Some(product),
                    Err(e) => {
                        tracing::warn!(index, ?id, error = %e, "skipping malformed product");
                        None
                    }
                }
            })
            .collect()
    }
}

/// A single product from the storefront catalog.
#[derive(Debug, Deserialize)]
pub struct ShopifyProduct {
    pub id: i64,

    pub title: String,

    #[serde(default)]
    pub handle: String,

    /// Raw HTML product description.
    #[serde(default)]
    pub body_html: Option<String>,

    #[serde(default)]
    pub vendor: Option<String>,

    #[serde(default)]
    pub product_type: Option<String>,

    #[serde(default)]
    pub tags: ShopifyTags,

    #[serde(default)]
    pub images: Vec<ShopifyImage>,

    #[serde(default)]
    pub variants: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ShopifyTags {
    List(Vec<String>),
    Joined(String),
}

impl Default for ShopifyTags {
    fn default() -> Self {
        ShopifyTags::List(Vec::new())
    }
}

impl ShopifyTags {
    /// Trimmed, non-empty tag values.
    pub fn into_values(self) -> impl Iterator<Item = String> {
        let raw = match self {
            ShopifyTags::List(tags) => tags,
            ShopifyTags::Joined(joined) => joined.split(',').map(str::to_owned).collect(),
        };
        raw.into_iter()
            .map(|tag| tag.trim().to_owned())
            .filter(|tag| !tag.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct ShopifyImage {
    pub src: String,
}
