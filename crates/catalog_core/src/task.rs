use url::Url;

/// Correlates media completions with the product record that owns them.
pub type RecordId = u64;

/// Hierarchy context inherited by a follow-up page fetch.
///
/// Mirrors what the discoverer knew when it scheduled the page: the task
/// carries it forward so deeper pages can extend the breadcrumb.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageContext {
    pub category: String,
    pub parent_category: String,
    pub breadcrumb: Vec<String>,
    pub depth: u32,
}

impl PageContext {
    pub fn for_breadcrumb(breadcrumb: Vec<String>) -> Self {
        let depth = breadcrumb.len().saturating_sub(1) as u32;
        let category = breadcrumb.last().cloned().unwrap_or_default();
        let parent_category = if breadcrumb.len() >= 2 {
            breadcrumb[breadcrumb.len() - 2].clone()
        } else {
            String::new()
        };
        Self {
            category,
            parent_category,
            breadcrumb,
            depth,
        }
    }
}

/// A follow-up fetch the core hands back to the crawl engine.
///
/// The engine owns transport, retries and scheduling; the core only names
/// what to fetch and what context to echo back with the body.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchTask {
    CategoryPage { url: Url, context: PageContext },
    ProductPage { url: Url, context: PageContext },
    Media(MediaTask),
}

/// One image fetch, tagged with the owning record and its target filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTask {
    pub record: RecordId,
    pub source_url: String,
    pub filename: String,
}

/// Engine-side completion of a [`MediaTask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaFetchResult {
    Fetched(Vec<u8>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Root,
    Category,
    Product,
}

/// A fetched page body delivered by the crawl engine, with the context the
/// originating task carried.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub kind: PageKind,
    pub url: Url,
    pub body: String,
    pub context: PageContext,
}

/// Accepts only absolute http(s) URLs; everything else is discarded by the
/// cleaning rules.
pub fn is_well_formed_media_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
