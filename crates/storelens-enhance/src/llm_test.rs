use std::sync::Mutex;

use storelens_core::{AggregateRecord, Enhancer, Faq, ProductId, ProductItem};

use super::*;

/// Replies by system instruction; records every prompt it receives.
#[derive(Default)]
struct ScriptedModel {
    brand: Option<String>,
    faqs: Option<String>,
    catalog: Option<String>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl TextModel for ScriptedModel {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, EnhanceError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        let reply = match system {
            BRAND_SYSTEM => &self.brand,
            FAQ_SYSTEM => &self.faqs,
            CATALOG_SYSTEM => &self.catalog,
            other => panic!("unexpected system instruction: {other}"),
        };
        reply.clone().ok_or(EnhanceError::Api {
            status: 500,
            message: "scripted failure".to_string(),
        })
    }
}

impl ScriptedModel {
    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn prompt_for(&self, system: &str) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| s == system)
            .map(|(_, p)| p.clone())
    }
}

fn product(n: usize) -> ProductItem {
    ProductItem {
        id: ProductId::Native(i64::try_from(n).unwrap()),
        title: format!("Item {n}"),
        handle: format!("item-{n}"),
        vendor: "Acme".to_string(),
        product_type: String::new(),
        price: Some("10.00".to_string()),
        compare_at_price: None,
        available: true,
        tags: Default::default(),
        images: Vec::new(),
        description: None,
        url: None,
        variants: Vec::new(),
    }
}

fn record() -> AggregateRecord {
    let mut record = AggregateRecord::new("https://shop.example.com");
    record.brand_context = Some("we sell shirts. good shirts.".to_string());
    record.faqs = vec![Faq {
        question: "ship?".to_string(),
        answer: "yes we ship".to_string(),
    }];
    record.catalog = (1..=25).map(product).collect();
    record.total_product_count = 25;
    record
}

const FAQ_REPLY: &str = r#"[{"question": "Do you ship internationally?", "answer": "Yes, we ship worldwide."}]"#;
const CATALOG_REPLY: &str = r#"{"payment_methods": ["Visa", "PayPal"], "currencies": ["USD"], "target_demographics": "adults"}"#;

#[tokio::test]
async fn all_substeps_apply_when_model_cooperates() {
    let enhancer = LlmEnhancer::new(ScriptedModel {
        brand: Some("Acme makes durable everyday shirts.".to_string()),
        faqs: Some(FAQ_REPLY.to_string()),
        catalog: Some(CATALOG_REPLY.to_string()),
        ..ScriptedModel::default()
    });

    let out = enhancer.enhance(record()).await;

    assert_eq!(
        out.brand_context.as_deref(),
        Some("Acme makes durable everyday shirts.")
    );
    assert_eq!(out.faqs[0].question, "Do you ship internationally?");
    assert_eq!(out.payment_methods, vec!["Visa", "PayPal"]);
    assert_eq!(out.currencies_accepted, vec!["USD"]);
    assert_eq!(out.catalog.len(), 25);
}

#[tokio::test]
async fn malformed_faq_reply_keeps_original_faqs_only() {
    let enhancer = LlmEnhancer::new(ScriptedModel {
        brand: Some("Rewritten.".to_string()),
        faqs: Some("Sure! Here are your FAQs: Q: ...".to_string()),
        catalog: Some(CATALOG_REPLY.to_string()),
        ..ScriptedModel::default()
    });

    let input = record();
    let out = enhancer.enhance(input.clone()).await;

    assert_eq!(out.faqs, input.faqs);
    assert_eq!(out.brand_context.as_deref(), Some("Rewritten."));
    assert_eq!(out.payment_methods, vec!["Visa", "PayPal"]);
}

#[tokio::test]
async fn model_errors_leave_record_unchanged() {
    let enhancer = LlmEnhancer::new(ScriptedModel::default());

    let input = record();
    let out = enhancer.enhance(input.clone()).await;

    assert_eq!(out, input);
}

#[tokio::test]
async fn shorter_faq_reply_is_rejected() {
    let mut input = record();
    input.faqs.push(Faq {
        question: "returns?".to_string(),
        answer: "30 days".to_string(),
    });
    let enhancer = LlmEnhancer::new(ScriptedModel {
        faqs: Some(FAQ_REPLY.to_string()),
        ..ScriptedModel::default()
    });

    let out = enhancer.enhance(input.clone()).await;

    assert_eq!(out.faqs, input.faqs);
}

#[tokio::test]
async fn fenced_json_replies_are_accepted() {
    let enhancer = LlmEnhancer::new(ScriptedModel {
        faqs: Some(format!("```json\n{FAQ_REPLY}\n```")),
        catalog: Some(format!("```\n{CATALOG_REPLY}\n```")),
        ..ScriptedModel::default()
    });

    let out = enhancer.enhance(record()).await;

    assert_eq!(out.faqs[0].answer, "Yes, we ship worldwide.");
    assert_eq!(out.currencies_accepted, vec!["USD"]);
}

#[tokio::test]
async fn empty_record_makes_no_model_calls() {
    let model = ScriptedModel::default();
    let enhancer = LlmEnhancer::new(model);

    let input = AggregateRecord::new("https://empty.example.com");
    let out = enhancer.enhance(input.clone()).await;

    assert_eq!(out, input);
    assert_eq!(enhancer.model.calls(), 0);
}

#[tokio::test]
async fn catalog_prompt_samples_first_twenty_products() {
    let enhancer = LlmEnhancer::new(ScriptedModel {
        catalog: Some(CATALOG_REPLY.to_string()),
        ..ScriptedModel::default()
    });

    enhancer.enhance(record()).await;

    let prompt = enhancer.model.prompt_for(CATALOG_SYSTEM).unwrap();
    assert!(prompt.contains("- Item 1 by Acme ($10.00)"));
    assert!(prompt.contains("- Item 20 by Acme ($10.00)"));
    assert!(!prompt.contains("Item 21"));
}

#[test]
fn code_fences_are_stripped() {
    assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
    assert_eq!(strip_code_fences("  [1]  "), "[1]");
    assert_eq!(strip_code_fences("```\n{}\n```\n"), "{}");
}
