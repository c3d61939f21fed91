//! Replaceable text heuristics for the Contact and FAQ units.
//!
//! Units hold these behind `Arc<dyn _>` so a better strategy can be swapped
//! in through [`crate::Coordinator::with_heuristics`] without touching the
//! units themselves.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use storelens_core::{ContactInfo, Faq, MAX_FAQS, MAX_FAQ_ANSWER_CHARS};

use crate::html::{collapse_whitespace, element_text, truncate_chars};

/// Extracts contact details from the visible text of a contact page.
pub trait ContactParser: Send + Sync {
    fn parse(&self, text: &str) -> ContactInfo;
}

/// Extracts question/answer pairs from the markup of an FAQ page.
pub trait FaqParser: Send + Sync {
    fn parse(&self, html: &str) -> Vec<Faq>;
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").expect("valid regex")
});
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?[\d\s().-]{10,}").expect("valid regex"));
static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,6}\s+[A-Za-z][A-Za-z0-9\s,.#'-]{2,80}?\s\d{5}(?:-\d{4})?\b")
        .expect("valid regex")
});

/// File extensions that show up in `name@2x.png`-style asset names.
const ASSET_SUFFIXES: [&str; 6] = [".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

const MIN_PHONE_DIGITS: usize = 10;

/// Regex-driven contact parser.
///
/// - emails: address pattern, lowercased, asset file names excluded;
/// - phones: runs of digits and separators holding at least 10 digits. A run
///   spanning several numbers (adjacent elements joined by spaces) is cut at
///   the first whitespace gap after each 10-digit group;
/// - address: the first "number, street words, five-digit postcode" run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternContactParser;

impl ContactParser for PatternContactParser {
    fn parse(&self, text: &str) -> ContactInfo {
        let emails = EMAIL_RE
            .find_iter(text)
            .map(|m| m.as_str().to_ascii_lowercase())
            .filter(|email| !ASSET_SUFFIXES.iter().any(|suffix| email.ends_with(suffix)))
            .collect();

        let phones = PHONE_RE
            .find_iter(text)
            .flat_map(|m| split_phone_run(m.as_str()))
            .collect();

        let address = ADDRESS_RE
            .find(text)
            .map(|m| collapse_whitespace(m.as_str()));

        ContactInfo {
            emails,
            phones,
            address,
        }
    }
}

/// Cuts a matched run into numbers of at least [`MIN_PHONE_DIGITS`] digits.
/// Trailing tokens that never reach the minimum are dropped.
fn split_phone_run(run: &str) -> Vec<String> {
    let mut numbers = Vec::new();
    let mut tokens: Vec<&str> = Vec::new();
    let mut digits = 0;

    for token in run.split_whitespace() {
        tokens.push(token);
        digits += token.chars().filter(char::is_ascii_digit).count();
        if digits >= MIN_PHONE_DIGITS {
            let number = tokens.join(" ");
            numbers.push(number.trim_matches(|c: char| c == '-' || c == '.').to_owned());
            tokens.clear();
            digits = 0;
        }
    }

    numbers
}

static FAQ_CONTAINERS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div[class], section[class], li[class], details[class]")
        .expect("valid selector")
});
static QUESTION_CANDIDATES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "h2[class], h3[class], h4[class], button[class], summary[class], div[class], span[class]",
    )
    .expect("valid selector")
});
static ANSWER_CANDIDATES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div[class], p[class]").expect("valid selector"));
static QUESTION_HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3, h4, h5").expect("valid selector"));

static FAQ_CONTAINER_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)faq|question").expect("valid regex"));
static QUESTION_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)question|title").expect("valid regex"));
static ANSWER_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)answer|content").expect("valid regex"));

const MIN_CLASSED_QUESTION_CHARS: usize = 10;
const MIN_HEADING_ANSWER_CHARS: usize = 20;

/// Markup-driven FAQ parser.
///
/// Prefers containers whose class mentions `faq` or `question`, pairing a
/// descendant classed like a question/title with one classed like an
/// answer/content. Only when that finds nothing does it fall back to `h3`-`h5`
/// headings containing `?` followed directly by a `p` or `div` answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupFaqParser;

impl FaqParser for MarkupFaqParser {
    fn parse(&self, html: &str) -> Vec<Faq> {
        let document = Html::parse_document(html);
        let classed = classed_pairs(&document);
        if classed.is_empty() {
            heading_pairs(&document)
        } else {
            classed
        }
    }
}

fn class_matches(element: ElementRef<'_>, pattern: &Regex) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|class| pattern.is_match(class))
}

fn classed_pairs(document: &Html) -> Vec<Faq> {
    let mut seen = HashSet::new();
    let mut faqs = Vec::new();

    for container in document.select(&FAQ_CONTAINERS) {
        if faqs.len() >= MAX_FAQS {
            break;
        }
        if !class_matches(container, &FAQ_CONTAINER_CLASS) {
            continue;
        }
        let Some(question) = container
            .select(&QUESTION_CANDIDATES)
            .find(|el| class_matches(*el, &QUESTION_CLASS))
            .map(element_text)
        else {
            continue;
        };
        let Some(answer) = container
            .select(&ANSWER_CANDIDATES)
            .find(|el| class_matches(*el, &ANSWER_CLASS))
            .map(element_text)
        else {
            continue;
        };

        if question.chars().count() <= MIN_CLASSED_QUESTION_CHARS || answer.is_empty() {
            continue;
        }
        if seen.insert(question.clone()) {
            faqs.push(Faq {
                question,
                answer: truncate_chars(&answer, MAX_FAQ_ANSWER_CHARS),
            });
        }
    }

    faqs
}

fn heading_pairs(document: &Html) -> Vec<Faq> {
    let mut faqs = Vec::new();

    for heading in document.select(&QUESTION_HEADINGS) {
        if faqs.len() >= MAX_FAQS {
            break;
        }
        let question = element_text(heading);
        if !question.contains('?') {
            continue;
        }
        let Some(next) = heading.next_siblings().find_map(ElementRef::wrap) else {
            continue;
        };
        if !matches!(next.value().name(), "p" | "div") {
            continue;
        }
        let answer = element_text(next);
        if answer.chars().count() > MIN_HEADING_ANSWER_CHARS {
            faqs.push(Faq {
                question,
                answer: truncate_chars(&answer, MAX_FAQ_ANSWER_CHARS),
            });
        }
    }

    faqs
}
