//! Mapping from one raw upstream shopping result to the canonical
//! [`Product`] the rest of the system (and the browser) operates on.

use serpapi_client::{RawImage, RawShoppingItem};
use shopwizz_common::{Feature, MediaItem, Product, SizeMap, SizeOption, TypicalPrices};

/// Whether an upstream item carries enough to be shown at all. Items
/// without an extracted price and a thumbnail are dropped before
/// normalization rather than rendered half-empty.
pub fn is_usable(item: &RawShoppingItem) -> bool {
    item.extracted_price.is_some() && item.thumbnail.is_some()
}

/// Build the canonical product for the item at `index` within one
/// search response. Deterministic: the same (item, index) pair always
/// yields the same product, including the synthesized id.
pub fn normalize_item(item: &RawShoppingItem, index: usize) -> Product {
    let price = item
        .extracted_price
        .map(|p| format!("${}", format_price(p)))
        .unwrap_or_else(|| "N/A".to_string());

    let product_id = match item.upstream_id() {
        Some(id) => id.to_string(),
        None => synthesize_id(item, index),
    };

    let mut media = Vec::new();
    if let Some(thumbnail) = &item.thumbnail {
        media.push(MediaItem::image(thumbnail));
    }
    for image in &item.images {
        if let Some(link) = image.link() {
            if item.thumbnail.as_deref() != Some(link) {
                media.push(MediaItem::image(link));
            }
        }
    }

    let mut sizes = SizeMap::new();
    for (i, variant) in item.variant_entries().iter().enumerate() {
        let label = variant
            .label()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Option {}", i + 1));
        sizes.insert(
            label,
            SizeOption {
                link: variant.link.clone(),
                product_id: variant.product_id.clone(),
                serpapi_link: variant.serpapi_link.clone(),
                selected: variant.selected.unwrap_or(false),
            },
        );
    }

    let extensions = match &item.brand {
        Some(brand) => vec![brand.clone()],
        None => item.extensions.clone(),
    };

    Product {
        product_id,
        title: item
            .title
            .clone()
            .unwrap_or_else(|| "Untitled Product".to_string()),
        description: item.description.clone().unwrap_or_default(),
        prices: vec![price.clone()],
        typical_prices: TypicalPrices::uniform(price),
        reviews: item.reviews.unwrap_or(0),
        rating: item.rating.unwrap_or(0.0),
        extensions,
        media,
        sizes,
        highlights: item.highlights.clone(),
        features: item
            .features
            .iter()
            .map(|f| Feature {
                name: f.name.clone(),
                text: f.text.clone(),
            })
            .collect(),
        store: item.store().map(str::to_string),
        shipping: item.shipping().map(str::to_string),
        snippet: item.snippet.clone(),
        link: item.link().map(str::to_string),
        reviews_link: item.reviews_link.clone(),
    }
}

/// `"{sanitized-title}_{price}_{index}"` — unique within a batch by
/// construction since the index is.
fn synthesize_id(item: &RawShoppingItem, index: usize) -> String {
    let title: String = item
        .title
        .as_deref()
        .unwrap_or("untitled")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    let price = item
        .extracted_price
        .map(format_price)
        .unwrap_or_else(|| "na".to_string());
    format!("{title}_{price}_{index}")
}

/// Format like the upstream price numbers read: no trailing `.0` on
/// whole amounts.
fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{}", price as i64)
    } else {
        format!("{price}")
    }
}
