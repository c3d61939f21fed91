//! Model-backed enhancement in three independent sub-steps.

use serde::Deserialize;
use storelens_core::{
    AggregateRecord, Enhancer, Faq, ProductItem, MAX_FAQS, MAX_FAQ_ANSWER_CHARS,
};

use crate::error::EnhanceError;
use crate::TextModel;

/// Number of catalog items described to the model.
const CATALOG_SAMPLE: usize = 20;

pub(crate) const BRAND_SYSTEM: &str =
    "You are a brand analysis expert. Help structure and enhance brand information.";
pub(crate) const FAQ_SYSTEM: &str =
    "You are a customer service expert. Help improve FAQ content.";
pub(crate) const CATALOG_SYSTEM: &str =
    "You are an e-commerce analyst. Provide insights based on product catalogs.";

#[derive(Deserialize)]
struct FaqReply {
    question: String,
    answer: String,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogInsights {
    #[serde(default)]
    payment_methods: Vec<String>,
    #[serde(default)]
    currencies: Vec<String>,
}

/// Rewrites brand context, cleans up FAQs, and infers payment methods and
/// currencies from the catalog.
///
/// Each sub-step runs only when its input is present and keeps its input on
/// any failure, so the result never holds less than the record it was given.
#[derive(Debug, Clone)]
pub struct LlmEnhancer<M> {
    model: M,
}

impl<M: TextModel> LlmEnhancer<M> {
    #[must_use]
    pub fn new(model: M) -> Self {
        Self { model }
    }

    async fn brand_context(&self, context: &str) -> Result<String, EnhanceError> {
        let prompt = format!(
            "Please analyze and enhance the following brand context text. Make it more \
             concise, professional, and informative. Extract the key value propositions \
             and brand story. Keep it under 300 words.\n\nOriginal text: {context}"
        );
        let reply = self.model.complete(BRAND_SYSTEM, &prompt).await?;
        let reply = strip_code_fences(&reply);
        if reply.is_empty() {
            return Err(EnhanceError::EmptyResponse);
        }
        Ok(reply.to_owned())
    }

    async fn faqs(&self, faqs: &[Faq]) -> Result<Vec<Faq>, EnhanceError> {
        let listing = faqs
            .iter()
            .map(|faq| format!("Q: {}\nA: {}", faq.question, faq.answer))
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = format!(
            "Please clean up and enhance the following FAQ content. Make questions clearer \
             and answers more helpful. Keep the same structure but improve readability.\n\n\
             FAQs:\n{listing}\n\n\
             Return as JSON array with objects containing 'question' and 'answer' fields."
        );
        let reply = self.model.complete(FAQ_SYSTEM, &prompt).await?;
        let parsed: Vec<FaqReply> =
            serde_json::from_str(strip_code_fences(&reply)).map_err(|e| {
                EnhanceError::Deserialize {
                    context: "FAQ reply".to_owned(),
                    source: e,
                }
            })?;

        Ok(parsed
            .into_iter()
            .filter(|faq| !faq.question.trim().is_empty() && !faq.answer.trim().is_empty())
            .take(MAX_FAQS)
            .map(|faq| Faq {
                question: faq.question.trim().to_owned(),
                answer: faq
                    .answer
                    .trim()
                    .chars()
                    .take(MAX_FAQ_ANSWER_CHARS)
                    .collect(),
            })
            .collect())
    }

    async fn catalog(&self, catalog: &[ProductItem]) -> Result<CatalogInsights, EnhanceError> {
        let listing = catalog_listing(catalog);
        if listing.is_empty() {
            return Ok(CatalogInsights::default());
        }
        let prompt = format!(
            "Analyze the following product catalog and extract insights:\n\n\
             Products:\n{listing}\n\n\
             Please identify:\n\
             1. Likely payment methods this store would accept\n\
             2. Currencies that might be accepted\n\
             3. Target market demographics\n\n\
             Return as JSON with keys: payment_methods (array), currencies (array), \
             target_demographics (string)"
        );
        let reply = self.model.complete(CATALOG_SYSTEM, &prompt).await?;
        serde_json::from_str(strip_code_fences(&reply)).map_err(|e| EnhanceError::Deserialize {
            context: "catalog analysis reply".to_owned(),
            source: e,
        })
    }
}

impl<M: TextModel> Enhancer for LlmEnhancer<M> {
    async fn enhance(&self, mut record: AggregateRecord) -> AggregateRecord {
        let address = record.target_address.clone();

        if let Some(context) = record.brand_context.clone().filter(|c| !c.trim().is_empty()) {
            match self.brand_context(&context).await {
                Ok(rewritten) => record.brand_context = Some(rewritten),
                Err(e) => {
                    tracing::warn!(address = %address, error = %e, "brand context enhancement failed; keeping original");
                }
            }
        }

        if !record.faqs.is_empty() {
            let enhanced = self.faqs(&record.faqs).await;
            match enhanced {
                Ok(faqs) if faqs.len() >= record.faqs.len() => record.faqs = faqs,
                Ok(faqs) => {
                    tracing::warn!(
                        address = %address,
                        returned = faqs.len(),
                        original = record.faqs.len(),
                        "model dropped FAQs; keeping original"
                    );
                }
                Err(e) => {
                    tracing::warn!(address = %address, error = %e, "FAQ enhancement failed; keeping original");
                }
            }
        }

        if !record.catalog.is_empty() {
            let analysis = self.catalog(&record.catalog).await;
            match analysis {
                Ok(insights) => {
                    if !insights.payment_methods.is_empty() {
                        record.payment_methods = insights.payment_methods;
                    }
                    if !insights.currencies.is_empty() {
                        record.currencies_accepted = insights.currencies;
                    }
                }
                Err(e) => {
                    tracing::warn!(address = %address, error = %e, "catalog analysis failed; skipping");
                }
            }
        }

        record
    }
}

/// One line per sampled product: `- {title} by {vendor} (${price})`.
/// Products without a title or vendor are left out.
fn catalog_listing(catalog: &[ProductItem]) -> String {
    catalog
        .iter()
        .take(CATALOG_SAMPLE)
        .filter(|p| !p.title.is_empty() && !p.vendor.is_empty())
        .map(|p| {
            format!(
                "- {} by {} (${})",
                p.title,
                p.vendor,
                p.price.as_deref().unwrap_or("n/a")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
#[path = "llm_test.rs"]
mod tests;
