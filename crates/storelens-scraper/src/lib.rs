pub mod client;
pub mod coordinator;
pub mod error;
pub mod heuristics;
pub mod html;
pub mod merge;
pub mod normalize;
pub mod pagination;
pub mod product_page;
pub mod sitemap;
pub mod types;
pub mod units;

pub use client::{normalize_target_address, ClientConfig, Page, PageCursor, StorefrontClient};
pub use coordinator::Coordinator;
pub use error::{AnalysisError, FailureCategory, ScraperError};
pub use heuristics::{ContactParser, FaqParser, MarkupFaqParser, PatternContactParser};
pub use merge::merge;
pub use normalize::normalize_product;
pub use types::{ShopifyProduct, ShopifyProductsResponse};
pub use units::{ExtractorResult, UnitContext, UnitKind, UnitOutput};
