//! DOM helpers over `scraper`.
//!
//! `scraper::Html` is not `Send`, so every helper parses and finishes
//! synchronously, returning owned data that can cross an `.await`.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

use crate::client::absolutize_url;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static META_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="description"], meta[property="og:description"]"#)
        .expect("valid selector")
});
static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static BODY_ELEMENTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body *").expect("valid selector"));

/// Elements whose text is never visible content.
const HIDDEN_ELEMENTS: [&str; 6] = ["script", "style", "noscript", "template", "head", "svg"];

/// A link found on a page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// The `href` attribute as written.
    pub href: String,
    /// `href` resolved against the page URL; `None` for non-HTTP targets.
    pub url: Option<String>,
    /// Collapsed link text.
    pub text: String,
}

/// Collapses every run of whitespace to a single space and trims the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates to at most `max_chars` characters on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_owned(),
        None => text.to_owned(),
    }
}

/// Collapsed text of an element and its descendants.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Visible text of a whole document: scripts, styles, and the head removed,
/// whitespace collapsed.
#[must_use]
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            matches!(ancestor.value(), Node::Element(e) if HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    collapse_whitespace(&out)
}

/// Collapsed `<title>` text, if non-empty.
#[must_use]
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&TITLE)
        .next()
        .map(element_text)
        .filter(|title| !title.is_empty())
}

/// Meta description, preferring `name="description"` over `og:description`.
#[must_use]
pub fn meta_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let mut candidates = document
        .select(&META_DESCRIPTION)
        .filter_map(|meta| {
            let content = collapse_whitespace(meta.value().attr("content")?);
            (!content.is_empty()).then(|| (meta.value().attr("name").is_some(), content))
        })
        .collect::<Vec<_>>();
    candidates.sort_by_key(|(is_named, _)| !is_named);
    candidates.into_iter().next().map(|(_, content)| content)
}

/// Text of the first element that directly mentions "about" and carries at
/// least `min_chars` of text.
#[must_use]
pub fn about_block(html: &str, min_chars: usize) -> Option<String> {
    let document = Html::parse_document(html);
    document.select(&BODY_ELEMENTS).find_map(|element| {
        if HIDDEN_ELEMENTS.contains(&element.value().name()) {
            return None;
        }
        let mentions_about = element.children().any(|child| {
            child
                .value()
                .as_text()
                .is_some_and(|text| text.to_ascii_lowercase().contains("about"))
        });
        if !mentions_about {
            return None;
        }
        let text = element_text(element);
        (text.chars().count() >= min_chars).then_some(text)
    })
}

/// All `<a href>` links in document order.
#[must_use]
pub fn extract_links(html: &str, base_url: &str) -> Vec<PageLink> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHORS)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.trim().to_owned();
            Some(PageLink {
                url: absolutize_url(base_url, &href),
                text: element_text(anchor),
                href,
            })
        })
        .collect()
}
