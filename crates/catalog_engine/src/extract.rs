use std::collections::BTreeSet;

use catalog_core::{PageContext, ProductRecord};
use chrono::Utc;
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

use crate::fallback::{COLOR_FALLBACKS, SIZE_FALLBACKS};
use crate::islands::parse_island;
use crate::profile::SiteProfile;
use crate::text::{parse_money, strip_markup};

// Fixed page regions for the primary fields.
const NAME_CSS: &str = "span[data-ui-id=\"page-title-wrapper\"]";
const SKU_CSS: &str = "div[itemprop=\"sku\"]";
const DESCRIPTION_CSS: &str = "div.product.attribute.description div.value";
const ISLAND_CSS: &str = "script[type=\"text/x-magento-init\"]";
const PRICE_CSS: &str = "div.product-info-price span.price";
const REGULAR_PRICE_CSS: &str = "div.old-price span.price";
const SPECIAL_PRICE_CSS: &str = "div.special-price span.price";
const OUT_OF_STOCK_CSS: &str = "div.stock.unavailable";
const ATTRIBUTE_ROW_CSS: &str = "div.additional-attributes-wrapper tr";

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Total extraction failure: there was nothing to extract from.
    #[error("empty product page body for {0}")]
    EmptyPage(String),
}

/// Merges the page's structured-data islands and markup fallbacks into one
/// [`ProductRecord`].
///
/// Missing optional data never fails extraction; a malformed island is
/// skipped with a diagnostic note on the record. Only a missing body is
/// fatal.
pub fn extract_product(
    body: &str,
    url: &Url,
    context: &PageContext,
    profile: &SiteProfile,
) -> Result<ProductRecord, ExtractError> {
    if body.trim().is_empty() {
        return Err(ExtractError::EmptyPage(url.to_string()));
    }

    let doc = Html::parse_document(body);
    let mut record = ProductRecord::new(url.to_string());

    record.category = context.category.clone();
    record.parent_category = context.parent_category.clone();
    record.nested_category = context.breadcrumb.get(2).cloned().unwrap_or_default();

    record.name = select_text(&doc, NAME_CSS);
    record.sku = select_text(&doc, SKU_CSS);
    record.description = strip_markup(&select_all_text(&doc, DESCRIPTION_CSS));

    record.price = parse_money(&select_text(&doc, PRICE_CSS));
    record.regular_price = parse_money(&select_text(&doc, REGULAR_PRICE_CSS));
    record.special_price = parse_money(&select_text(&doc, SPECIAL_PRICE_CSS));
    record.in_stock = !selector_matches(&doc, OUT_OF_STOCK_CSS);
    collect_attribute_rows(&doc, &mut record);

    // Labels keep their exact spelling after trim; "Black" and "black"
    // stay distinct options.
    let mut images = BTreeSet::new();
    let mut colors = BTreeSet::new();
    let mut sizes = BTreeSet::new();

    if let Ok(island_selector) = Selector::parse(ISLAND_CSS) {
        for (index, script) in doc.select(&island_selector).enumerate() {
            let payload: String = script.text().collect();
            match parse_island(&payload) {
                Ok(island) => {
                    images.extend(island.images);
                    colors.extend(island.colors);
                    sizes.extend(island.sizes);
                }
                Err(err) => {
                    log::debug!("skipping malformed island {index} on {url}: {err}");
                    record.note_parse_error(&format!("island {index}: {err}"));
                }
            }
        }
    }

    // Markup fallbacks, per field, only when structured data came up empty.
    if colors.is_empty() {
        colors.extend(COLOR_FALLBACKS.evaluate(&doc));
    }
    if sizes.is_empty() {
        sizes.extend(SIZE_FALLBACKS.evaluate(&doc));
    }

    // BTreeSet iteration gives the sorted, deduplicated final form, so the
    // output is independent of island discovery order.
    record.image_urls = images.into_iter().collect();
    record.colors = colors.into_iter().collect();
    record.sizes = sizes.into_iter().collect();

    if record.timestamp.is_none() {
        record.timestamp = Some(Utc::now());
    }
    if record.source.is_empty() {
        record.source = profile.source.clone();
    }

    Ok(record)
}

/// Additional-attribute rows ("Material: Cotton") become entries in the
/// record's attribute map; rows missing either half are ignored.
fn collect_attribute_rows(doc: &Html, record: &mut ProductRecord) {
    let (Ok(row_sel), Ok(label_sel), Ok(value_sel)) = (
        Selector::parse(ATTRIBUTE_ROW_CSS),
        Selector::parse("th"),
        Selector::parse("td"),
    ) else {
        return;
    };
    for row in doc.select(&row_sel) {
        let label = row
            .select(&label_sel)
            .next()
            .map(|th| th.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        let value = row
            .select(&value_sel)
            .next()
            .map(|td| td.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        if !label.is_empty() && !value.is_empty() {
            record.attributes.insert(label, value);
        }
    }
}

fn select_text(doc: &Html, css: &str) -> String {
    let Ok(selector) = Selector::parse(css) else {
        return String::new();
    };
    doc.select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn select_all_text(doc: &Html, css: &str) -> String {
    let Ok(selector) = Selector::parse(css) else {
        return String::new();
    };
    let parts: Vec<String> = doc
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .collect();
    parts.join(" ")
}

fn selector_matches(doc: &Html, css: &str) -> bool {
    Selector::parse(css)
        .map(|selector| doc.select(&selector).next().is_some())
        .unwrap_or(false)
}
