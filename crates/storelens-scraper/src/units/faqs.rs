use super::{UnitContext, UnitOutput};
use crate::error::ScraperError;

const FAQ_PATHS: [&str; 4] = [
    "/pages/faq",
    "/faq",
    "/pages/frequently-asked-questions",
    "/help",
];

/// FAQs from the first candidate page that yields any.
pub(super) async fn extract(ctx: &UnitContext) -> Result<UnitOutput, ScraperError> {
    for path in FAQ_PATHS {
        let url = ctx.url(path);
        let page = match ctx.client.fetch_page(&url).await {
            Ok(page) if page.is_success() => page,
            Ok(page) => {
                tracing::debug!(url = %url, status = page.status, "faq candidate unavailable");
                continue;
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "faq candidate fetch failed");
                continue;
            }
        };

        let faqs = ctx.faq_parser.parse(&page.body);
        if !faqs.is_empty() {
            return Ok(UnitOutput::Faqs(faqs));
        }
    }

    Ok(UnitOutput::Faqs(Vec::new()))
}
