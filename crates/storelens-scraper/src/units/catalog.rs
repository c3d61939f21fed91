use storelens_core::{ProductItem, MAX_CATALOG_ITEMS};

use super::{fetch_products, UnitContext, UnitOutput};
use crate::error::ScraperError;
use crate::normalize::normalize_product;
use crate::sitemap::{product_urls, MAX_SITEMAP_PRODUCTS, PRODUCT_SITEMAP_PATH};

/// `products.json` first; the product sitemap only when that endpoint is 404.
pub(super) async fn extract(ctx: &UnitContext) -> Result<UnitOutput, ScraperError> {
    match ctx.client.fetch_all_products(&ctx.origin).await {
        Ok(products) => {
            let total_product_count = count(products.len());
            let items = products
                .into_iter()
                .take(MAX_CATALOG_ITEMS)
                .map(|product| normalize_product(product, &ctx.origin))
                .collect();
            Ok(UnitOutput::Catalog {
                items,
                total_product_count,
            })
        }
        Err(ScraperError::NotFound { url }) => {
            tracing::info!(url = %url, "products.json not found; using product sitemap");
            let items = from_sitemap(ctx).await?;
            Ok(UnitOutput::Catalog {
                total_product_count: count(items.len()),
                items,
            })
        }
        Err(e) => Err(e),
    }
}

async fn from_sitemap(ctx: &UnitContext) -> Result<Vec<ProductItem>, ScraperError> {
    let page = ctx.client.fetch_page(&ctx.url(PRODUCT_SITEMAP_PATH)).await?;
    let urls = product_urls(page.success_body()?, MAX_SITEMAP_PRODUCTS)?;
    tracing::debug!(origin = %ctx.origin, urls = urls.len(), "product sitemap parsed");

    let mut items = fetch_products(ctx, urls).await;
    items.truncate(MAX_CATALOG_ITEMS);
    Ok(items)
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
