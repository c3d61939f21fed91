//! Individual product-page extraction: JSON-LD `Product` first, then a
//! heading/price-class heuristic.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;
use sha2::{Digest, Sha256};
use storelens_core::{ProductId, ProductItem};

use crate::html::element_text;

static JSON_LD: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector")
});
static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static CLASSED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body [class]").expect("valid selector"));

/// Derives the id of a product that has no native catalog id.
///
/// Hex of the first 8 bytes of SHA-256 over the product URL. Stable only as
/// long as the URL is; not unique across stores.
#[must_use]
pub fn synthetic_id(product_url: &str) -> ProductId {
    let hash = Sha256::digest(product_url.as_bytes());
    let hex = hash[..8]
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>();
    ProductId::Synthetic(hex)
}

/// Extracts a product from a product page, or `None` when neither JSON-LD
/// nor the HTML heuristic yields a title.
#[must_use]
pub fn parse_product_page(html: &str, page_url: &str) -> Option<ProductItem> {
    let document = Html::parse_document(html);

    let from_json_ld = document.select(&JSON_LD).find_map(|script| {
        let raw = script.text().collect::<String>();
        let value = serde_json::from_str::<Value>(raw.trim()).ok()?;
        find_product_node(&value).and_then(|node| product_from_json_ld(node, page_url))
    });
    if from_json_ld.is_some() {
        return from_json_ld;
    }

    let title = document
        .select(&HEADING)
        .chain(document.select(&TITLE))
        .map(element_text)
        .find(|text| !text.is_empty())?;

    let price = document
        .select(&CLASSED)
        .find(|element| {
            element
                .value()
                .attr("class")
                .is_some_and(|class| class.to_ascii_lowercase().contains("price"))
        })
        .map(element_text)
        .filter(|text| !text.is_empty());

    // A reachable product page with no stock signal is assumed purchasable.
    Some(ProductItem {
        price,
        available: true,
        ..empty_item(title, page_url)
    })
}

fn empty_item(title: String, page_url: &str) -> ProductItem {
    ProductItem {
        id: synthetic_id(page_url),
        title,
        handle: handle_from_url(page_url),
        vendor: String::new(),
        product_type: String::new(),
        price: None,
        compare_at_price: None,
        available: false,
        tags: std::collections::BTreeSet::new(),
        images: Vec::new(),
        description: None,
        url: Some(page_url.to_owned()),
        variants: Vec::new(),
    }
}

/// The path segment after `/products/`, without query or trailing slash.
fn handle_from_url(page_url: &str) -> String {
    reqwest::Url::parse(page_url)
        .ok()
        .and_then(|url| {
            let mut segments = url.path_segments()?;
            segments.find(|segment| *segment == "products")?;
            segments.next().map(str::to_owned)
        })
        .unwrap_or_default()
}

/// Finds the first node typed `Product` in a JSON-LD document, descending
/// into top-level arrays and `@graph` containers.
fn find_product_node(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_product_node),
        Value::Object(map) => {
            if is_product_type(map.get("@type")) {
                return Some(value);
            }
            map.get("@graph").and_then(find_product_node)
        }
        _ => None,
    }
}

fn is_product_type(type_value: Option<&Value>) -> bool {
    match type_value {
        Some(Value::String(t)) => t == "Product",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Product")),
        _ => false,
    }
}

fn product_from_json_ld(node: &Value, page_url: &str) -> Option<ProductItem> {
    let title = node
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())?
        .to_owned();

    let vendor = match node.get("brand") {
        Some(Value::String(brand)) => brand.clone(),
        Some(Value::Object(brand)) => brand
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        _ => String::new(),
    };

    let offer = match node.get("offers") {
        Some(Value::Array(offers)) => offers.first(),
        Some(offer @ Value::Object(_)) => Some(offer),
        _ => None,
    };
    let price = offer
        .and_then(|o| o.get("price").or_else(|| o.get("lowPrice")))
        .and_then(|price| match price {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
    let available = offer
        .and_then(|o| o.get("availability"))
        .and_then(Value::as_str)
        .is_some_and(|availability| availability.ends_with("InStock"));

    let images = match node.get("image") {
        Some(Value::String(src)) => vec![src.clone()],
        Some(Value::Array(items)) => items.iter().filter_map(image_src).collect(),
        Some(obj @ Value::Object(_)) => image_src(obj).into_iter().collect(),
        _ => Vec::new(),
    };

    let description = node
        .get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.trim().is_empty())
        .map(str::to_owned);

    Some(ProductItem {
        vendor,
        price,
        available,
        images,
        description,
        ..empty_item(title, page_url)
    })
}

fn image_src(value: &Value) -> Option<String> {
    match value {
        Value::String(src) => Some(src.clone()),
        Value::Object(obj) => obj.get("url").and_then(Value::as_str).map(str::to_owned),
        _ => None,
    }
}
