pub mod app_config;
pub mod config;
pub mod enhance;
pub mod insights;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use enhance::{Enhancer, NoopEnhancer};
pub use insights::{
    AggregateRecord, ContactInfo, Faq, ImportantLink, ProductId, ProductItem, SocialHandle,
    SocialPlatform, MAX_BRAND_CONTEXT_CHARS, MAX_CATALOG_ITEMS, MAX_FAQS, MAX_FAQ_ANSWER_CHARS,
    MAX_HERO_PRODUCTS, MAX_IMPORTANT_LINKS, MAX_POLICY_CHARS,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
