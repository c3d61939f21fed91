use storelens_core::{AggregateRecord, AppConfig, Enhancer, NoopEnhancer};

use crate::error::EnhanceError;
use crate::gemini::GeminiClient;
use crate::llm::LlmEnhancer;

/// The enhancer chosen at startup: the model-backed one when a model
/// credential is configured, the no-op otherwise.
#[derive(Debug, Clone)]
pub enum BrandEnhancer {
    Noop(NoopEnhancer),
    Llm(LlmEnhancer<GeminiClient>),
}

impl BrandEnhancer {
    /// # Errors
    ///
    /// Returns [`EnhanceError::Http`] if the model HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, EnhanceError> {
        let Some(api_key) = config.google_api_key.as_deref() else {
            tracing::debug!("no model credential configured; enhancement disabled");
            return Ok(Self::Noop(NoopEnhancer));
        };
        let client = GeminiClient::new(api_key, config.llm_model.as_str())?
            .with_base_url(&config.llm_base_url);
        tracing::info!(model = %client.model(), "model enhancement enabled");
        Ok(Self::Llm(LlmEnhancer::new(client)))
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Llm(_))
    }
}

impl Enhancer for BrandEnhancer {
    async fn enhance(&self, record: AggregateRecord) -> AggregateRecord {
        match self {
            Self::Noop(noop) => noop.enhance(record).await,
            Self::Llm(llm) => llm.enhance(record).await,
        }
    }
}
