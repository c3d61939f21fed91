use std::collections::HashSet;

use storelens_core::{ImportantLink, MAX_IMPORTANT_LINKS};

use super::{platform_for, root_body, UnitContext, UnitOutput};
use crate::error::ScraperError;
use crate::html::extract_links;

const KEYWORDS: [&str; 11] = [
    "track",
    "order",
    "blog",
    "news",
    "contact",
    "support",
    "help",
    "shipping",
    "size-guide",
    "careers",
    "about",
];

/// Social sites linked without a recognisable host, e.g. through redirects.
const SOCIAL_MARKERS: [&str; 3] = ["facebook", "instagram", "twitter"];

pub(super) async fn extract(ctx: &UnitContext) -> Result<UnitOutput, ScraperError> {
    let body = root_body(ctx)?;
    Ok(UnitOutput::Links(important_links(body, &ctx.root.url)))
}

/// Keyword-matched links in document order, unique by resolved URL.
#[must_use]
pub fn important_links(html: &str, base_url: &str) -> Vec<ImportantLink> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for link in extract_links(html, base_url) {
        if links.len() >= MAX_IMPORTANT_LINKS {
            break;
        }
        if link.href.starts_with('#') {
            continue;
        }
        let Some(url) = link.url else {
            continue;
        };
        let href = link.href.to_ascii_lowercase();
        if platform_for(&url).is_some() || SOCIAL_MARKERS.iter().any(|m| href.contains(m)) {
            continue;
        }
        let text = link.text.to_lowercase();
        let Some(keyword) = KEYWORDS
            .iter()
            .find(|keyword| text.contains(*keyword) || href.contains(*keyword))
        else {
            continue;
        };
        if !seen.insert(url.clone()) {
            continue;
        }

        links.push(ImportantLink {
            name: if link.text.is_empty() {
                title_case(keyword)
            } else {
                link.text
            },
            url,
            description: Some(format!("Link related to {keyword}")),
        });
    }

    links
}

/// `"size-guide"` becomes `"Size-Guide"`.
fn title_case(keyword: &str) -> String {
    keyword
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join("-")
}
