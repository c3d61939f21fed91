//! Optional model-backed enhancement of a merged [`AggregateRecord`].
//!
//! [`AggregateRecord`]: storelens_core::AggregateRecord

pub mod brand;
pub mod error;
pub mod gemini;
pub mod llm;

use std::future::Future;

pub use brand::BrandEnhancer;
pub use error::EnhanceError;
pub use gemini::GeminiClient;
pub use llm::LlmEnhancer;

/// A text-in, text-out language model.
pub trait TextModel: Send + Sync {
    /// Completes `prompt` under the `system` instruction.
    ///
    /// # Errors
    ///
    /// Any transport, API, or decoding failure of the underlying model.
    fn complete(
        &self,
        system: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String, EnhanceError>> + Send;
}
