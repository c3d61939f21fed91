use storelens_core::MAX_POLICY_CHARS;

use super::{UnitContext, UnitOutput};
use crate::error::ScraperError;
use crate::html::{truncate_chars, visible_text};

const PRIVACY_PATHS: [&str; 3] = [
    "/pages/privacy-policy",
    "/policies/privacy-policy",
    "/privacy",
];

const RETURN_REFUND_PATHS: [&str; 4] = [
    "/pages/refund-policy",
    "/pages/returns",
    "/policies/refund-policy",
    "/refund-policy",
];

/// A candidate page must carry at least this much visible text to count.
const MIN_POLICY_CHARS: usize = 100;

pub(super) async fn extract(ctx: &UnitContext) -> Result<UnitOutput, ScraperError> {
    let (privacy, return_refund) = tokio::join!(
        first_substantial(ctx, &PRIVACY_PATHS),
        first_substantial(ctx, &RETURN_REFUND_PATHS),
    );
    Ok(UnitOutput::Policies {
        privacy,
        return_refund,
    })
}

/// Text of the first candidate with enough visible text. The content itself
/// is not checked for being a policy.
async fn first_substantial(ctx: &UnitContext, paths: &[&str]) -> Option<String> {
    for path in paths {
        let url = ctx.url(path);
        let page = match ctx.client.fetch_page(&url).await {
            Ok(page) if page.is_success() => page,
            Ok(page) => {
                tracing::debug!(url = %url, status = page.status, "policy candidate unavailable");
                continue;
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "policy candidate fetch failed");
                continue;
            }
        };

        let text = visible_text(&page.body);
        if text.chars().count() >= MIN_POLICY_CHARS {
            return Some(truncate_chars(&text, MAX_POLICY_CHARS));
        }
    }
    None
}
