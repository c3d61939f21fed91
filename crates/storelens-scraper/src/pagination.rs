//! Cursor extraction from the `Link` header of `products.json` responses.
//!
//! ```text
//! <https://shop.com/products.json?limit=250&page_info=PREV>; rel="previous",
//! <https://shop.com/products.json?limit=250&page_info=NEXT>; rel="next"
//! ```

/// Returns the `page_info` cursor of the `rel="next"` link, if any.
#[must_use]
pub fn extract_next_cursor(link_header: Option<&str>) -> Option<String> {
    link_header?
        .split(',')
        .map(str::trim)
        .find(|segment| is_next_relation(segment))
        .and_then(angle_bracket_url)
        .and_then(|url| {
            reqwest::Url::parse(url).ok().and_then(|parsed| {
                parsed
                    .query_pairs()
                    .find(|(key, value)| key == "page_info" && !value.is_empty())
                    .map(|(_, value)| value.into_owned())
            })
        })
}

fn is_next_relation(segment: &str) -> bool {
    segment
        .split(';')
        .skip(1)
        .map(str::trim)
        .any(|param| param == r#"rel="next""# || param == "rel=next")
}

fn angle_bracket_url(segment: &str) -> Option<&str> {
    let start = segment.find('<')? + 1;
    let end = segment.find('>')?;
    (start < end).then(|| &segment[start..end])
}
