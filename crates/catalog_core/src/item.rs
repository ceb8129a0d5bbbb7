use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One node of the reconstructed category hierarchy.
///
/// Built through [`CategoryNode::from_breadcrumb`] so that the invariant
/// `breadcrumb.last() == name && depth == breadcrumb.len() - 1` holds for
/// every node that exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub name: String,
    pub url: String,
    /// Empty string marks a root category.
    pub parent_name: String,
    pub depth: u32,
    /// Ancestor names from root to this node, inclusive.
    pub breadcrumb: Vec<String>,
    pub discovered_at: DateTime<Utc>,
}

impl CategoryNode {
    /// Derives name, parent and depth from the breadcrumb.
    ///
    /// Returns `None` for an empty breadcrumb or a blank trailing name;
    /// callers treat that as a skipped navigation entry, not an error.
    pub fn from_breadcrumb(breadcrumb: Vec<String>, url: impl Into<String>) -> Option<Self> {
        let name = breadcrumb.last()?.trim().to_string();
        if name.is_empty() {
            return None;
        }
        let parent_name = if breadcrumb.len() >= 2 {
            breadcrumb[breadcrumb.len() - 2].clone()
        } else {
            String::new()
        };
        Some(Self {
            name,
            url: url.into(),
            parent_name,
            depth: (breadcrumb.len() - 1) as u32,
            breadcrumb,
            discovered_at: Utc::now(),
        })
    }
}

/// Outcome of acquiring a single image for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOutcome {
    pub source_url: String,
    #[serde(flatten)]
    pub status: ImageStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageStatus {
    Downloaded { local_path: String, checksum: String },
    Failed { error: String },
}

impl ImageOutcome {
    pub fn downloaded(
        source_url: impl Into<String>,
        local_path: impl Into<String>,
        checksum: impl Into<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            status: ImageStatus::Downloaded {
                local_path: local_path.into(),
                checksum: checksum.into(),
            },
        }
    }

    pub fn failed(source_url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            status: ImageStatus::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_downloaded(&self) -> bool {
        matches!(self.status, ImageStatus::Downloaded { .. })
    }
}

/// One extracted product.
///
/// Every instance owns fresh empty containers; nothing here is shared
/// between records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub sku: String,
    pub name: String,
    pub url: String,

    pub category: String,
    pub parent_category: String,
    pub nested_category: String,

    pub price: Option<f64>,
    pub regular_price: Option<f64>,
    pub special_price: Option<f64>,
    pub currency: String,

    pub description: String,
    pub short_description: String,

    /// Candidate image URLs collected at extraction time.
    pub image_urls: Vec<String>,
    /// Per-image acquisition outcomes, filled once media acquisition joins.
    pub images: Vec<ImageOutcome>,

    pub colors: Vec<String>,
    pub sizes: Vec<String>,

    pub in_stock: bool,
    pub stock_quantity: u32,

    pub attributes: BTreeMap<String, String>,

    pub rating: Option<f64>,
    pub review_count: u32,

    pub brand: String,
    pub mpn: String,
    pub gtin: String,

    pub is_new: bool,
    pub is_bestseller: bool,

    pub timestamp: Option<DateTime<Utc>>,
    /// Source tag of the run that produced the record.
    pub source: String,
    /// Diagnostic set when extraction degraded without aborting.
    pub parse_error: Option<String>,
}

impl ProductRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            sku: String::new(),
            name: String::new(),
            url: url.into(),
            category: String::new(),
            parent_category: String::new(),
            nested_category: String::new(),
            price: None,
            regular_price: None,
            special_price: None,
            currency: "USD".to_string(),
            description: String::new(),
            short_description: String::new(),
            image_urls: Vec::new(),
            images: Vec::new(),
            colors: Vec::new(),
            sizes: Vec::new(),
            in_stock: true,
            stock_quantity: 0,
            attributes: BTreeMap::new(),
            rating: None,
            review_count: 0,
            brand: String::new(),
            mpn: String::new(),
            gtin: String::new(),
            is_new: false,
            is_bestseller: false,
            timestamp: None,
            source: String::new(),
            parse_error: None,
        }
    }

    /// Appends a diagnostic note without losing earlier ones.
    pub fn note_parse_error(&mut self, note: &str) {
        match &mut self.parse_error {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(note);
            }
            None => self.parse_error = Some(note.to_string()),
        }
    }
}

/// A record flowing through the processing pipeline: category or product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogItem {
    Category(CategoryNode),
    Product(ProductRecord),
}

impl CatalogItem {
    pub fn url(&self) -> &str {
        match self {
            CatalogItem::Category(node) => &node.url,
            CatalogItem::Product(record) => &record.url,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            CatalogItem::Category(_) => "category",
            CatalogItem::Product(_) => "product",
        }
    }
}
