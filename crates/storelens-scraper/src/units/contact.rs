use storelens_core::ContactInfo;

use super::{UnitContext, UnitOutput};
use crate::error::ScraperError;
use crate::html::{extract_links, visible_text};

const CONTACT_PATHS: [&str; 3] = ["/pages/contact", "/contact", "/pages/contact-us"];

/// Parses the first contact page that answers with a 2xx status.
pub(super) async fn extract(ctx: &UnitContext) -> Result<UnitOutput, ScraperError> {
    for path in CONTACT_PATHS {
        let url = ctx.url(path);
        let page = match ctx.client.fetch_page(&url).await {
            Ok(page) if page.is_success() => page,
            Ok(page) => {
                tracing::debug!(url = %url, status = page.status, "contact candidate unavailable");
                continue;
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "contact candidate fetch failed");
                continue;
            }
        };

        let text = contact_text(&page.body, &page.url);
        return Ok(UnitOutput::Contact(ctx.contact_parser.parse(&text)));
    }

    Ok(UnitOutput::Contact(ContactInfo::default()))
}

/// Visible text plus the targets of `mailto:` and `tel:` links, which often
/// never appear as text.
fn contact_text(html: &str, base_url: &str) -> String {
    let mut text = visible_text(html);
    for link in extract_links(html, base_url) {
        let lower = link.href.to_ascii_lowercase();
        let target = if lower.starts_with("mailto:") || lower.starts_with("tel:") {
            link.href.split_once(':').map(|(_, rest)| rest)
        } else {
            None
        };
        if let Some(target) = target {
            let target = target.split('?').next().unwrap_or(target);
            text.push_str(" | ");
            text.push_str(target);
        }
    }
    text
}
