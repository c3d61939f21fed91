//! The aggregate brand record produced by one storefront analysis.
//!
//! Every field is independently defaultable: each one is owned by exactly one
//! extractor unit, and a unit that fails leaves its fields at their defaults.
//! `#[serde(default)]` on the record lets older payloads deserialize after new
//! fields are added.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of products kept in [`AggregateRecord::catalog`].
pub const MAX_CATALOG_ITEMS: usize = 500;
/// Maximum number of products kept in [`AggregateRecord::hero_products`].
pub const MAX_HERO_PRODUCTS: usize = 10;
/// Policy texts are truncated to this many characters.
pub const MAX_POLICY_CHARS: usize = 2000;
/// Maximum number of FAQ entries.
pub const MAX_FAQS: usize = 20;
/// FAQ answers are truncated to this many characters.
pub const MAX_FAQ_ANSWER_CHARS: usize = 500;
/// Maximum number of important links.
pub const MAX_IMPORTANT_LINKS: usize = 15;
/// Brand context taken from the storefront is truncated to this many characters.
pub const MAX_BRAND_CONTEXT_CHARS: usize = 500;

/// Identifier of a [`ProductItem`].
///
/// Products from the structured `products.json` endpoint carry Shopify's
/// numeric id. Products scraped from HTML pages have no such id, so one is
/// derived from a hash of the product URL. The two spaces are tagged so they
/// can never be confused: a synthetic id is not unique across stores and is
/// only as stable as the product URL it was derived from.
///
/// Serialized as `{"source": "native", "value": 123}` or
/// `{"source": "synthetic", "value": "9f86d081884c7d65"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum ProductId {
    Native(i64),
    Synthetic(String),
}

impl ProductId {
    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, ProductId::Native(_))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Native(id) => write!(f, "{id}"),
            ProductId::Synthetic(hash) => write!(f, "synthetic:{hash}"),
        }
    }
}

/// A single product, either from the catalog endpoint or scraped from a
/// product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductItem {
    pub id: ProductId,
    pub title: String,
    /// URL slug, e.g. `"classic-tee"`.
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product_type: String,
    /// Price of the first variant exactly as the store reports it. Currency
    /// and format are not validated.
    #[serde(default)]
    pub price: Option<String>,
    /// Comparison ("was") price of the first variant, when on sale.
    #[serde(default)]
    pub compare_at_price: Option<String>,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Raw description markup. Not sanitized.
    #[serde(default)]
    pub description: Option<String>,
    /// Storefront URL of the product page, when known.
    #[serde(default)]
    pub url: Option<String>,
    /// Variant records passed through untouched from the catalog endpoint.
    #[serde(default)]
    pub variants: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Social network recognised by the social-handle extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Instagram,
    Facebook,
    Twitter,
    Tiktok,
    Youtube,
    Linkedin,
    Pinterest,
}

impl SocialPlatform {
    /// All platforms, in the order links are matched against them.
    pub const ALL: [SocialPlatform; 7] = [
        SocialPlatform::Instagram,
        SocialPlatform::Facebook,
        SocialPlatform::Twitter,
        SocialPlatform::Tiktok,
        SocialPlatform::Youtube,
        SocialPlatform::Linkedin,
        SocialPlatform::Pinterest,
    ];

    /// Registrable domains that identify a link to this platform.
    #[must_use]
    pub fn domains(self) -> &'static [&'static str] {
        match self {
            SocialPlatform::Instagram => &["instagram.com", "instagr.am"],
            SocialPlatform::Facebook => &["facebook.com", "fb.com"],
            SocialPlatform::Twitter => &["twitter.com", "x.com"],
            SocialPlatform::Tiktok => &["tiktok.com"],
            SocialPlatform::Youtube => &["youtube.com", "youtu.be"],
            SocialPlatform::Linkedin => &["linkedin.com"],
            SocialPlatform::Pinterest => &["pinterest.com"],
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::Tiktok => "tiktok",
            SocialPlatform::Youtube => "youtube",
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::Pinterest => "pinterest",
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialHandle {
    pub platform: SocialPlatform,
    pub url: String,
    /// Account name parsed from the URL; `None` when the URL shape is not
    /// recognised for the platform.
    #[serde(default)]
    pub handle: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub emails: BTreeSet<String>,
    #[serde(default)]
    pub phones: BTreeSet<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl ContactInfo {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phones.is_empty() && self.address.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantLink {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Everything learned about one storefront in a single analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateRecord {
    /// Normalized absolute URL of the storefront; the storage key.
    pub target_address: String,
    pub store_name: Option<String>,
    /// At most [`MAX_CATALOG_ITEMS`] products.
    pub catalog: Vec<ProductItem>,
    /// Uncapped product count; may exceed `catalog.len()`.
    pub total_product_count: u64,
    pub hero_products: Vec<ProductItem>,
    pub privacy_policy_text: Option<String>,
    pub return_refund_policy_text: Option<String>,
    pub faqs: Vec<Faq>,
    /// At most one entry per platform.
    pub social_handles: Vec<SocialHandle>,
    pub contact: ContactInfo,
    pub brand_context: Option<String>,
    /// Unique by `url`; at most [`MAX_IMPORTANT_LINKS`].
    pub important_links: Vec<ImportantLink>,
    /// Only ever populated by an enhancement hook.
    pub currencies_accepted: Vec<String>,
    /// Only ever populated by an enhancement hook.
    pub payment_methods: Vec<String>,
}

impl AggregateRecord {
    /// An empty record for `target_address` with every field at its default.
    #[must_use]
    pub fn new(target_address: impl Into<String>) -> Self {
        Self {
            target_address: target_address.into(),
            ..Self::default()
        }
    }
}
