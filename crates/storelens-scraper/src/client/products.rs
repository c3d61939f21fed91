//! Multi-page catalog fetch for `StorefrontClient`.

use crate::error::ScraperError;
use crate::pagination::extract_next_cursor;
use crate::types::ShopifyProduct;

use super::{PageCursor, StorefrontClient, MAX_PAGES, PRODUCTS_PAGE_LIMIT};

impl StorefrontClient {
    /// Fetches every product from the store's `products.json` endpoint.
    ///
    /// Follows `Link` header cursors when the store sends them. Stores that do
    /// not are walked with `page=N` for as long as full pages keep coming back;
    /// a page whose first product repeats the previous page's first product
    /// means the store ignores the parameter, and the walk stops there.
    ///
    /// **All-or-nothing**: on any page failure, products from earlier pages
    /// are discarded and the error is returned, so the reported total is
    /// never an undercount.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_products_page`].
    /// Returns [`ScraperError::PaginationLimit`] after [`MAX_PAGES`] pages.
    pub async fn fetch_all_products(
        &self,
        shop_url: &str,
    ) -> Result<Vec<ShopifyProduct>, ScraperError> {
        let mut all_products: Vec<ShopifyProduct> = Vec::new();
        let mut cursor = PageCursor::First;
        let mut previous_first_id: Option<i64> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(ScraperError::PaginationLimit {
                    shop_url: shop_url.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }

            let (response, link_header) = self
                .fetch_products_page(shop_url, PRODUCTS_PAGE_LIMIT, &cursor)
                .await?;

            let page_len = response.products.len();
            let products = response.into_products();
            let first_id = products.first().map(|p| p.id);
            if first_id.is_some() && first_id == previous_first_id {
                tracing::debug!(shop_url, page_count, "store repeated a page; stopping");
                break;
            }
            previous_first_id = first_id;
            all_products.extend(products);

            cursor = match extract_next_cursor(link_header.as_deref()) {
                Some(next) => PageCursor::PageInfo(next),
                None if link_header.is_none() && page_len >= PRODUCTS_PAGE_LIMIT as usize => {
                    let next_page = u32::try_from(page_count + 1).unwrap_or(u32::MAX);
                    PageCursor::PageNumber(next_page)
                }
                None => break,
            };
        }

        tracing::debug!(
            shop_url,
            pages = page_count,
            products = all_products.len(),
            "fetched catalog"
        );
        Ok(all_products)
    }
}
