//! HTTP transport for storefront pages and the public `products.json` endpoint.

mod origin;
mod products;

use std::time::Duration;

use reqwest::Client;
use storelens_core::app_config::DEFAULT_USER_AGENT;
use storelens_core::AppConfig;

use crate::error::ScraperError;
use crate::types::ShopifyProductsResponse;

pub use origin::{absolutize_url, extract_store_origin, host_matches, normalize_target_address};

/// Maximum number of catalog pages fetched before giving up.
pub(crate) const MAX_PAGES: usize = 40;

/// Page size requested from `products.json`; Shopify's maximum.
pub(crate) const PRODUCTS_PAGE_LIMIT: u32 = 250;

/// Immutable transport settings shared by every unit of one analysis.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    /// Timeout for the root page and the catalog endpoint.
    pub request_timeout: Duration,
    /// Timeout for secondary pages: policies, contact, FAQ, product pages.
    pub page_timeout: Duration,
}

impl ClientConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.scraper_user_agent.clone(),
            request_timeout: Duration::from_secs(config.scraper_request_timeout_secs),
            page_timeout: Duration::from_secs(config.scraper_page_timeout_secs),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            request_timeout: Duration::from_secs(30),
            page_timeout: Duration::from_secs(20),
        }
    }
}

/// A fetched page. Non-2xx responses are returned rather than raised so that
/// callers walking a list of candidate paths can move on to the next one.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl Page {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body of a 2xx page.
    ///
    /// # Errors
    ///
    /// [`ScraperError::NotFound`] for 404, [`ScraperError::UnexpectedStatus`]
    /// for any other non-2xx status.
    pub fn success_body(&self) -> Result<&str, ScraperError> {
        match self.status {
            s if (200..300).contains(&s) => Ok(&self.body),
            404 => Err(ScraperError::NotFound {
                url: self.url.clone(),
            }),
            status => Err(ScraperError::UnexpectedStatus {
                status,
                url: self.url.clone(),
            }),
        }
    }
}

/// Pagination position for `products.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    First,
    /// Cursor taken from a `Link: <...page_info=...>; rel="next"` header.
    PageInfo(String),
    /// Legacy `page=N` pagination for stores that send no `Link` header.
    PageNumber(u32),
}

/// Storefront HTTP client. Cheap to clone; clones share one connection pool.
///
/// No cookie store is configured, so nothing persists between requests.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    client: Client,
    config: ClientConfig,
}

impl StorefrontClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(config: ClientConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches the store root page with the full request timeout.
    ///
    /// # Errors
    ///
    /// Transport failures only; HTTP error statuses come back as a [`Page`].
    pub async fn fetch_root(&self, origin: &str) -> Result<Page, ScraperError> {
        self.get_page(origin, self.config.request_timeout).await
    }

    /// Fetches a secondary storefront page with the shorter page timeout.
    ///
    /// # Errors
    ///
    /// Transport failures only; HTTP error statuses come back as a [`Page`].
    pub async fn fetch_page(&self, url: &str) -> Result<Page, ScraperError> {
        self.get_page(url, self.config.page_timeout).await
    }

    async fn get_page(&self, url: &str, timeout: Duration) -> Result<Page, ScraperError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| ScraperError::from_request(e, url))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| ScraperError::from_request(e, url))?;

        tracing::debug!(url, status, bytes = body.len(), "fetched page");
        Ok(Page {
            url: final_url,
            status,
            body,
        })
    }

    /// Fetches one page of products from the public `products.json` endpoint.
    ///
    /// Returns the parsed page and the raw `Link` header, if any.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::NotFound`] on HTTP 404, which triggers the sitemap fallback.
    /// - [`ScraperError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ScraperError::Timeout`] / [`ScraperError::Http`] on transport failure.
    /// - [`ScraperError::Deserialize`] when the body is not a products document.
    pub async fn fetch_products_page(
        &self,
        shop_url: &str,
        limit: u32,
        cursor: &PageCursor,
    ) -> Result<(ShopifyProductsResponse, Option<String>), ScraperError> {
        let url = Self::products_url(shop_url, limit, cursor)?;
        let referer = extract_store_origin(shop_url);

        let response = self
            .client
            .get(&url)
            .header(
                reqwest::header::ACCEPT,
                "application/json,text/html;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::REFERER, &referer)
            .send()
            .await
            .map_err(|e| ScraperError::from_request(e, &url))?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound { url });
        }
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let link_header = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response
            .text()
            .await
            .map_err(|e| ScraperError::from_request(e, &url))?;
        let parsed = serde_json::from_str::<ShopifyProductsResponse>(&body).map_err(|e| {
            ScraperError::Deserialize {
                context: format!("products page from {shop_url}"),
                source: e,
            }
        })?;

        Ok((parsed, link_header))
    }

    /// Builds the `products.json` URL for the given shop, page size, and cursor.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidShopUrl`] if the extracted origin cannot
    /// be parsed as a valid URL base.
    fn products_url(
        shop_url: &str,
        limit: u32,
        cursor: &PageCursor,
    ) -> Result<String, ScraperError> {
        let origin = extract_store_origin(shop_url);
        let base = format!("{origin}/products.json");
        let mut url = reqwest::Url::parse(&base).map_err(|e| ScraperError::InvalidShopUrl {
            shop_url: shop_url.to_owned(),
            reason: format!("origin \"{origin}\" is not a valid URL base: {e}"),
        })?;

        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        match cursor {
            PageCursor::First => {}
            PageCursor::PageInfo(page_info) => {
                url.query_pairs_mut().append_pair("page_info", page_info);
            }
            PageCursor::PageNumber(page) => {
                url.query_pairs_mut().append_pair("page", &page.to_string());
            }
        }

        Ok(url.to_string())
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
