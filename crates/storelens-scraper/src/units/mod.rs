//! The seven extractor units.
//!
//! Each unit owns a disjoint set of [`AggregateRecord`] fields and reports
//! either its complete output or a failure marker. [`run`] is the only entry
//! point and never returns an error: every fault inside a unit is logged and
//! turned into [`ExtractorResult::Failure`] here.
//!
//! [`AggregateRecord`]: storelens_core::AggregateRecord

mod catalog;
mod contact;
mod faqs;
mod homepage;
mod links;
mod policies;
mod social;

use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use storelens_core::{ContactInfo, Faq, ImportantLink, ProductItem, SocialHandle};

use crate::client::{Page, StorefrontClient};
use crate::error::ScraperError;
use crate::heuristics::{ContactParser, FaqParser};
use crate::product_page::parse_product_page;

pub use links::important_links;
pub use social::{platform_for, social_handles};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitKind {
    Catalog,
    Homepage,
    Policies,
    Contact,
    Social,
    Faqs,
    Links,
}

impl UnitKind {
    pub const ALL: [UnitKind; 7] = [
        UnitKind::Catalog,
        UnitKind::Homepage,
        UnitKind::Policies,
        UnitKind::Contact,
        UnitKind::Social,
        UnitKind::Faqs,
        UnitKind::Links,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UnitKind::Catalog => "catalog",
            UnitKind::Homepage => "homepage",
            UnitKind::Policies => "policies",
            UnitKind::Contact => "contact",
            UnitKind::Social => "social",
            UnitKind::Faqs => "faqs",
            UnitKind::Links => "links",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed output of one unit. Each variant maps onto fields no other variant
/// touches.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutput {
    Catalog {
        items: Vec<ProductItem>,
        /// Count before capping.
        total_product_count: u64,
    },
    Homepage {
        store_name: Option<String>,
        brand_context: Option<String>,
        hero_products: Vec<ProductItem>,
    },
    Policies {
        privacy: Option<String>,
        return_refund: Option<String>,
    },
    Contact(ContactInfo),
    Social(Vec<SocialHandle>),
    Faqs(Vec<Faq>),
    Links(Vec<ImportantLink>),
}

impl UnitOutput {
    #[must_use]
    pub fn unit(&self) -> UnitKind {
        match self {
            UnitOutput::Catalog { .. } => UnitKind::Catalog,
            UnitOutput::Homepage { .. } => UnitKind::Homepage,
            UnitOutput::Policies { .. } => UnitKind::Policies,
            UnitOutput::Contact(_) => UnitKind::Contact,
            UnitOutput::Social(_) => UnitKind::Social,
            UnitOutput::Faqs(_) => UnitKind::Faqs,
            UnitOutput::Links(_) => UnitKind::Links,
        }
    }
}

/// Terminal state of one unit. A failure carries no partial data.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractorResult {
    Success(UnitOutput),
    Failure { unit: UnitKind, reason: String },
}

impl ExtractorResult {
    #[must_use]
    pub fn unit(&self) -> UnitKind {
        match self {
            ExtractorResult::Success(output) => output.unit(),
            ExtractorResult::Failure { unit, .. } => *unit,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractorResult::Success(_))
    }
}

/// Read-only inputs shared by every unit of one analysis.
pub struct UnitContext {
    pub client: StorefrontClient,
    /// Normalized store origin, e.g. `https://shop.example.com`.
    pub origin: String,
    /// The root page, fetched once before the units start.
    pub root: Page,
    /// Concurrency of nested product-page fetches.
    pub item_concurrency: usize,
    pub contact_parser: Arc<dyn ContactParser>,
    pub faq_parser: Arc<dyn FaqParser>,
}

impl UnitContext {
    /// Absolute URL of a storefront path such as `/pages/faq`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.origin)
    }
}

/// Runs one unit to completion. Never fails.
pub async fn run(kind: UnitKind, ctx: &UnitContext) -> ExtractorResult {
    let outcome = match kind {
        UnitKind::Catalog => catalog::extract(ctx).await,
        UnitKind::Homepage => homepage::extract(ctx).await,
        UnitKind::Policies => policies::extract(ctx).await,
        UnitKind::Contact => contact::extract(ctx).await,
        UnitKind::Social => social::extract(ctx).await,
        UnitKind::Faqs => faqs::extract(ctx).await,
        UnitKind::Links => links::extract(ctx).await,
    };

    match outcome {
        Ok(output) => ExtractorResult::Success(output),
        Err(e) => {
            tracing::warn!(unit = %kind, origin = %ctx.origin, error = %e, "extractor unit failed");
            ExtractorResult::Failure {
                unit: kind,
                reason: e.to_string(),
            }
        }
    }
}

/// Fetches product pages with bounded concurrency, keeping input order and
/// skipping every page that fails or yields no product.
pub(crate) async fn fetch_products(ctx: &UnitContext, urls: Vec<String>) -> Vec<ProductItem> {
    futures::stream::iter(urls)
        .map(|url| fetch_product(ctx, url))
        .buffered(ctx.item_concurrency.max(1))
        .filter_map(|item| async move { item })
        .collect()
        .await
}

async fn fetch_product(ctx: &UnitContext, url: String) -> Option<ProductItem> {
    let page = match ctx.client.fetch_page(&url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "product page fetch failed; skipping");
            return None;
        }
    };
    let body = match page.success_body() {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "product page unavailable; skipping");
            return None;
        }
    };
    let item = parse_product_page(body, &url);
    if item.is_none() {
        tracing::debug!(url = %url, "no product found on page; skipping");
    }
    item
}

/// Body of the shared root page.
fn root_body(ctx: &UnitContext) -> Result<&str, ScraperError> {
    ctx.root.success_body()
}
