//! Folding unit outcomes into one [`AggregateRecord`].

use std::collections::HashSet;

use storelens_core::{
    AggregateRecord, MAX_CATALOG_ITEMS, MAX_FAQS, MAX_HERO_PRODUCTS, MAX_IMPORTANT_LINKS,
};

use crate::units::{ExtractorResult, UnitOutput};

/// Merges unit outcomes into a record for `target_address`.
///
/// Every [`UnitOutput`] variant writes a disjoint set of fields, so the
/// result does not depend on the order of `results`. Failures contribute
/// nothing. Record-level caps and uniqueness rules are enforced here so they
/// hold whatever a unit returns.
#[must_use]
pub fn merge(
    target_address: &str,
    results: impl IntoIterator<Item = ExtractorResult>,
) -> AggregateRecord {
    let mut record = AggregateRecord::new(target_address);
    for result in results {
        match result {
            ExtractorResult::Success(output) => apply(&mut record, output),
            ExtractorResult::Failure { .. } => {}
        }
    }
    record
}

fn apply(record: &mut AggregateRecord, output: UnitOutput) {
    match output {
        UnitOutput::Catalog {
            mut items,
            total_product_count,
        } => {
            items.truncate(MAX_CATALOG_ITEMS);
            let kept = u64::try_from(items.len()).unwrap_or(u64::MAX);
            record.total_product_count = total_product_count.max(kept);
            record.catalog = items;
        }
        UnitOutput::Homepage {
            store_name,
            brand_context,
            mut hero_products,
        } => {
            hero_products.truncate(MAX_HERO_PRODUCTS);
            record.store_name = store_name;
            record.brand_context = brand_context;
            record.hero_products = hero_products;
        }
        UnitOutput::Policies {
            privacy,
            return_refund,
        } => {
            record.privacy_policy_text = privacy;
            record.return_refund_policy_text = return_refund;
        }
        UnitOutput::Contact(contact) => record.contact = contact,
        UnitOutput::Social(handles) => {
            let mut seen = HashSet::new();
            record.social_handles = handles
                .into_iter()
                .filter(|handle| seen.insert(handle.platform))
                .collect();
        }
        UnitOutput::Faqs(mut faqs) => {
            faqs.truncate(MAX_FAQS);
            record.faqs = faqs;
        }
        UnitOutput::Links(links) => {
            let mut seen = HashSet::new();
            record.important_links = links
                .into_iter()
                .filter(|link| seen.insert(link.url.clone()))
                .take(MAX_IMPORTANT_LINKS)
                .collect();
        }
    }
}
