use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use storelens_core::{SocialHandle, SocialPlatform};

use super::{root_body, UnitContext, UnitOutput};
use crate::client::host_matches;
use crate::error::ScraperError;
use crate::html::extract_links;

static INSTAGRAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:instagram\.com|instagr\.am)/([^/?#]+)").expect("valid regex")
});
static FACEBOOK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:facebook|fb)\.com/([^/?#]+)").expect("valid regex"));
static TWITTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:twitter|x)\.com/([^/?#]+)").expect("valid regex"));
static TIKTOK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tiktok\.com/@([^/?#]+)").expect("valid regex"));
static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)youtube\.com/(?:c/|channel/|user/)?([^/?#]+)").expect("valid regex")
});
static LINKEDIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)linkedin\.com/(?:company|in)/([^/?#]+)").expect("valid regex")
});
static PINTEREST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)pinterest\.com/([^/?#]+)").expect("valid regex"));

/// Path segments that are share or content endpoints rather than accounts.
const NON_HANDLES: [&str; 9] = [
    "sharer.php",
    "sharer",
    "share",
    "intent",
    "watch",
    "embed",
    "hashtag",
    "p",
    "pin",
];

pub(super) async fn extract(ctx: &UnitContext) -> Result<UnitOutput, ScraperError> {
    let body = root_body(ctx)?;
    Ok(UnitOutput::Social(social_handles(body, &ctx.root.url)))
}

/// One handle per platform: the first matching link in document order.
#[must_use]
pub fn social_handles(html: &str, base_url: &str) -> Vec<SocialHandle> {
    let mut seen = HashSet::new();
    let mut handles = Vec::new();

    for link in extract_links(html, base_url) {
        let Some(url) = link.url else {
            continue;
        };
        let Some(platform) = platform_for(&url) else {
            continue;
        };
        if seen.insert(platform) {
            handles.push(SocialHandle {
                platform,
                handle: extract_handle(platform, &url),
                url,
            });
        }
    }

    handles
}

/// The platform whose domain table contains the URL's host.
#[must_use]
pub fn platform_for(url: &str) -> Option<SocialPlatform> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    SocialPlatform::ALL.into_iter().find(|platform| {
        platform
            .domains()
            .iter()
            .any(|domain| host_matches(&host, domain))
    })
}

fn extract_handle(platform: SocialPlatform, url: &str) -> Option<String> {
    let pattern: &Regex = match platform {
        SocialPlatform::Instagram => &INSTAGRAM,
        SocialPlatform::Facebook => &FACEBOOK,
        SocialPlatform::Twitter => &TWITTER,
        SocialPlatform::Tiktok => &TIKTOK,
        SocialPlatform::Youtube => &YOUTUBE,
        SocialPlatform::Linkedin => &LINKEDIN,
        SocialPlatform::Pinterest => &PINTEREST,
    };
    let handle = pattern.captures(url)?.get(1)?.as_str().trim_start_matches('@');
    let lower = handle.to_ascii_lowercase();
    (!handle.is_empty() && !NON_HANDLES.contains(&lower.as_str())).then(|| handle.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_link_per_platform_wins() {
        let html = r#"<footer>
            <a href="https://www.instagram.com/acme.ceramics/">IG</a>
            <a href="https://instagram.com/someone_else">IG 2</a>
            <a href="https://x.com/acme?lang=en">X</a>
            <a href="https://www.tiktok.com/@acmepots">TikTok</a>
            <a href="https://www.youtube.com/@AcmeStudio">YouTube</a>
            <a href="https://www.linkedin.com/company/acme-ceramics/">LinkedIn</a>
            <a href="https://www.pinterest.com/acmepots/">Pinterest</a>
            <a href="https://www.facebook.com/sharer.php?u=x">Share</a>
            <a href="https://inbox.com/acme">Not social</a>
          </footer>"#;

        let handles = social_handles(html, "https://acme.test");
        let summary: Vec<_> = handles
            .iter()
            .map(|h| (h.platform, h.handle.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (SocialPlatform::Instagram, Some("acme.ceramics")),
                (SocialPlatform::Twitter, Some("acme")),
                (SocialPlatform::Tiktok, Some("acmepots")),
                (SocialPlatform::Youtube, Some("AcmeStudio")),
                (SocialPlatform::Linkedin, Some("acme-ceramics")),
                (SocialPlatform::Pinterest, Some("acmepots")),
                (SocialPlatform::Facebook, None),
            ]
        );
        assert_eq!(handles[0].url, "https://www.instagram.com/acme.ceramics/");
    }

    #[test]
    fn platform_matching_uses_parsed_host() {
        assert_eq!(
            platform_for("https://fb.com/acme"),
            Some(SocialPlatform::Facebook)
        );
        assert_eq!(
            platform_for("https://youtu.be/abc123"),
            Some(SocialPlatform::Youtube)
        );
        assert_eq!(platform_for("https://dropbox.com/x.com/acme"), None);
        assert_eq!(platform_for("https://shop.example.com/instagram"), None);
    }
}
