//! Target-address normalization and URL helpers.

use crate::error::ScraperError;

/// Normalizes a user-supplied store address into the storage key.
///
/// The scheme defaults to `https` when missing, the host is lowercased, and
/// any path, query, or fragment is dropped: `"Shop.Example.com/collections/all"`
/// becomes `"https://shop.example.com"`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidShopUrl`] when the address is empty, does not
/// parse, has no host, or uses a scheme other than `http`/`https`.
pub fn normalize_target_address(raw: &str) -> Result<String, ScraperError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScraperError::InvalidShopUrl {
            shop_url: raw.to_owned(),
            reason: "address is empty".to_owned(),
        });
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let url = reqwest::Url::parse(&candidate).map_err(|e| ScraperError::InvalidShopUrl {
        shop_url: raw.to_owned(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidShopUrl {
            shop_url: raw.to_owned(),
            reason: format!("unsupported scheme \"{}\"", url.scheme()),
        });
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ScraperError::InvalidShopUrl {
            shop_url: raw.to_owned(),
            reason: "address has no host".to_owned(),
        });
    }

    Ok(url.origin().ascii_serialization())
}

/// Extracts the scheme+host origin from a shop URL.
///
/// Given `"https://shop.example.com/collections/all"`, returns
/// `"https://shop.example.com"`.
#[must_use]
pub fn extract_store_origin(shop_url: &str) -> String {
    reqwest::Url::parse(shop_url).map_or_else(
        |e| {
            tracing::warn!(
                shop_url,
                error = %e,
                "could not parse shop_url as URL; falling back to string split for origin"
            );
            shop_url
                .trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}

/// Resolves `candidate` against `base_url`, dropping any fragment.
///
/// Returns `None` for unparseable input and non-HTTP schemes such as
/// `mailto:` or `javascript:`.
#[must_use]
pub fn absolutize_url(base_url: &str, candidate: &str) -> Option<String> {
    let candidate = candidate.trim().replace("&amp;", "&");
    if candidate.is_empty() {
        return None;
    }
    let base = reqwest::Url::parse(base_url).ok()?;
    let mut joined = base.join(&candidate).ok()?;
    if !matches!(joined.scheme(), "http" | "https") {
        return None;
    }
    joined.set_fragment(None);
    Some(joined.to_string())
}

/// Whether `host` is `domain` or one of its subdomains.
#[must_use]
pub fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
