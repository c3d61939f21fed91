use storelens_core::{MAX_BRAND_CONTEXT_CHARS, MAX_HERO_PRODUCTS};

use super::{fetch_products, root_body, UnitContext, UnitOutput};
use crate::error::ScraperError;
use crate::html::{about_block, extract_links, meta_description, page_title, truncate_chars};

/// An "about" block shorter than this is a nav label, not brand copy.
const MIN_ABOUT_CHARS: usize = 40;

pub(super) async fn extract(ctx: &UnitContext) -> Result<UnitOutput, ScraperError> {
    let body = root_body(ctx)?;
    let store_name = page_title(body);
    let brand_context = about_block(body, MIN_ABOUT_CHARS)
        .or_else(|| meta_description(body))
        .map(|text| truncate_chars(&text, MAX_BRAND_CONTEXT_CHARS));
    let hero_urls = hero_product_urls(body, &ctx.root.url);

    let hero_products = fetch_products(ctx, hero_urls).await;

    Ok(UnitOutput::Homepage {
        store_name,
        brand_context,
        hero_products,
    })
}

/// The first distinct product links on the page, query strings removed.
fn hero_product_urls(html: &str, base_url: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for link in extract_links(html, base_url) {
        if urls.len() >= MAX_HERO_PRODUCTS {
            break;
        }
        let Some(mut url) = link.url.and_then(|u| reqwest::Url::parse(&u).ok()) else {
            continue;
        };
        if !url.path().contains("/products/") {
            continue;
        }
        url.set_query(None);
        let url = url.to_string();
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}
