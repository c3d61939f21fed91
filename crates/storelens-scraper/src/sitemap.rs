//! Product sitemap parsing for stores without a `products.json` endpoint.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ScraperError;

/// Path of the first product sitemap on a Shopify storefront.
pub const PRODUCT_SITEMAP_PATH: &str = "/sitemap_products_1.xml";

/// Maximum number of product URLs taken from the sitemap.
pub const MAX_SITEMAP_PRODUCTS: usize = 50;

/// Returns up to `limit` distinct product-page URLs from a `<urlset>`, in
/// document order.
///
/// Only top-level `<url><loc>` entries count; namespaced children such as
/// `<image:loc>` are ignored.
///
/// # Errors
///
/// Returns [`ScraperError::Xml`] when the document is not well-formed.
pub fn product_urls(xml: &str, limit: usize) -> Result<Vec<String>, ScraperError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut urls: Vec<String> = Vec::new();
    let mut in_url = false;
    let mut in_loc = false;
    let mut buf = Vec::new();

    let xml_error = |reason: String| ScraperError::Xml {
        context: "product sitemap".to_owned(),
        reason,
    };

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"url" => in_url = true,
                b"loc" if in_url => in_loc = true,
                _ => {}
            },
            Ok(Event::Text(e)) if in_loc => {
                let loc = e.unescape().map_err(|err| xml_error(err.to_string()))?;
                push_product_url(&mut urls, loc.trim());
            }
            Ok(Event::CData(e)) if in_loc => {
                let loc = String::from_utf8_lossy(&e);
                push_product_url(&mut urls, loc.trim());
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"loc" => in_loc = false,
                b"url" => in_url = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e.to_string())),
            _ => {}
        }
        if urls.len() >= limit {
            break;
        }
        buf.clear();
    }

    urls.truncate(limit);
    Ok(urls)
}

fn push_product_url(urls: &mut Vec<String>, loc: &str) {
    if loc.contains("/products/") && !urls.iter().any(|u| u == loc) {
        urls.push(loc.to_owned());
    }
}
