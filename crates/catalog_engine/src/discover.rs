use std::collections::VecDeque;

use catalog_core::{CategoryNode, FetchTask, PageContext};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::profile::SiteProfile;

const NAV_ENTRY_CSS: &str = "nav.navigation li.level0";
const NAV_NAME_CSS: &str = "a span:not(.ui-menu-icon)";
const NAV_LINK_CSS: &str = "a";
const NAV_SUB_CSS: &str = "ul.level1 a";
const NESTED_CSS: &str = "div.categories a";
const PRODUCT_LINK_CSS: &str = "div.product-item-info > a";
const NEXT_PAGE_CSS: &str = "a.next";

/// One emission of the discovery traversal, in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub enum Discovery {
    Node(CategoryNode),
    Task(FetchTask),
}

/// Walks the root page's navigation and reconstructs the top of the
/// category hierarchy.
///
/// Returns a lazy, non-restartable sequence of nodes and follow-up category
/// fetch tasks; the caller drives the subsequent fetches. Entries whose name
/// matches the profile's exclusion set, or which lack a name or URL, produce
/// nothing.
pub fn discover_root(
    body: &str,
    base_url: &Url,
    profile: &SiteProfile,
) -> impl Iterator<Item = Discovery> {
    let doc = Html::parse_document(body);
    RootDiscovery {
        profile: profile.clone(),
        entries: nav_entries(&doc, base_url).into_iter(),
        pending: VecDeque::new(),
    }
}

struct NavEntry {
    name: String,
    url: Url,
    children: Vec<(String, Url)>,
}

struct RootDiscovery {
    profile: SiteProfile,
    entries: std::vec::IntoIter<NavEntry>,
    pending: VecDeque<Discovery>,
}

impl Iterator for RootDiscovery {
    type Item = Discovery;

    fn next(&mut self) -> Option<Discovery> {
        loop {
            if let Some(emit) = self.pending.pop_front() {
                return Some(emit);
            }
            let entry = self.entries.next()?;
            self.expand(entry);
        }
    }
}

impl RootDiscovery {
    fn expand(&mut self, entry: NavEntry) {
        if self.profile.is_excluded(&entry.name) {
            log::debug!("skipping navigation chrome entry {:?}", entry.name);
            return;
        }

        if self.profile.is_main_category(&entry.name) {
            self.expand_main(entry);
        } else {
            self.expand_standalone(entry);
        }
    }

    /// Main category: node at depth 0, every sub-entry at depth 1, and a
    /// fetch for each sub-entry plus the main page itself.
    fn expand_main(&mut self, entry: NavEntry) {
        let Some(node) =
            CategoryNode::from_breadcrumb(vec![entry.name.clone()], entry.url.as_str())
        else {
            return;
        };
        self.pending.push_back(Discovery::Node(node));

        for (sub_name, sub_url) in entry.children {
            let breadcrumb = vec![entry.name.clone(), sub_name];
            let Some(node) = CategoryNode::from_breadcrumb(breadcrumb.clone(), sub_url.as_str())
            else {
                continue;
            };
            self.pending.push_back(Discovery::Node(node));
            self.pending.push_back(Discovery::Task(FetchTask::CategoryPage {
                url: sub_url,
                context: PageContext::for_breadcrumb(breadcrumb),
            }));
        }

        self.pending.push_back(Discovery::Task(FetchTask::CategoryPage {
            url: entry.url,
            context: PageContext::for_breadcrumb(vec![entry.name]),
        }));
    }

    /// Standalone category: parent inferred from the URL's section segment;
    /// unmapped sections leave the node at the root.
    fn expand_standalone(&mut self, entry: NavEntry) {
        let parent = self.profile.parent_from_url(&entry.url);
        let breadcrumb = if parent.is_empty() {
            vec![entry.name]
        } else {
            vec![parent, entry.name]
        };
        let Some(node) = CategoryNode::from_breadcrumb(breadcrumb.clone(), entry.url.as_str())
        else {
            return;
        };
        self.pending.push_back(Discovery::Node(node));
        self.pending.push_back(Discovery::Task(FetchTask::CategoryPage {
            url: entry.url,
            context: PageContext::for_breadcrumb(breadcrumb),
        }));
    }
}

/// Discovers nested categories (depth 2 and deeper) on a fetched category
/// page, extending the inherited breadcrumb by one level.
///
/// Past the profile's depth limit nothing is emitted; the page itself is
/// still scanned for products by [`scan_category_page`].
pub fn discover_nested(
    body: &str,
    page_url: &Url,
    context: &PageContext,
    profile: &SiteProfile,
) -> impl Iterator<Item = Discovery> {
    let mut links = Vec::new();
    if context.depth < profile.max_depth {
        let doc = Html::parse_document(body);
        links = anchor_links(&doc, NESTED_CSS, page_url);
    } else {
        log::debug!(
            "depth limit {} reached at {page_url}, not descending further",
            profile.max_depth
        );
    }

    let parent_breadcrumb = context.breadcrumb.clone();
    links.into_iter().flat_map(move |(name, url)| {
        let mut breadcrumb = parent_breadcrumb.clone();
        breadcrumb.push(name);
        let Some(node) = CategoryNode::from_breadcrumb(breadcrumb.clone(), url.as_str()) else {
            return Vec::new();
        };
        vec![
            Discovery::Node(node),
            Discovery::Task(FetchTask::CategoryPage {
                url,
                context: PageContext::for_breadcrumb(breadcrumb),
            }),
        ]
    })
}

/// Scans a category page for product links and the pagination trail.
///
/// Emits one product-page fetch per link (context inherited unchanged) and,
/// when a "next" link exists, one category-page fetch continuing the same
/// context. A listing with no products logs a warning and emits nothing for
/// products.
pub fn scan_category_page(
    body: &str,
    page_url: &Url,
    context: &PageContext,
) -> Vec<FetchTask> {
    let doc = Html::parse_document(body);
    let mut tasks = Vec::new();

    let product_links = anchor_hrefs(&doc, PRODUCT_LINK_CSS, page_url);
    if product_links.is_empty() {
        log::warn!("no products found on category page {page_url}");
    }
    for url in product_links {
        tasks.push(FetchTask::ProductPage {
            url,
            context: context.clone(),
        });
    }

    if let Some(next_url) = anchor_hrefs(&doc, NEXT_PAGE_CSS, page_url).into_iter().next() {
        tasks.push(FetchTask::CategoryPage {
            url: next_url,
            context: context.clone(),
        });
    }

    tasks
}

fn nav_entries(doc: &Html, base: &Url) -> Vec<NavEntry> {
    let Ok(entry_sel) = Selector::parse(NAV_ENTRY_CSS) else {
        return Vec::new();
    };
    let Ok(name_sel) = Selector::parse(NAV_NAME_CSS) else {
        return Vec::new();
    };
    let Ok(link_sel) = Selector::parse(NAV_LINK_CSS) else {
        return Vec::new();
    };
    let Ok(sub_sel) = Selector::parse(NAV_SUB_CSS) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for li in doc.select(&entry_sel) {
        let name = li
            .select(&name_sel)
            .next()
            .map(|span| span.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        let url = li
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_url(href, base));
        // Entries missing a name or URL are navigation noise, not errors.
        let Some(url) = url else { continue };
        if name.is_empty() {
            continue;
        }

        let children = li
            .select(&sub_sel)
            .filter_map(|a| anchor_entry(a, base))
            .collect();

        entries.push(NavEntry {
            name,
            url,
            children,
        });
    }
    entries
}

fn anchor_links(doc: &Html, css: &str, base: &Url) -> Vec<(String, Url)> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|a| anchor_entry(a, base))
        .collect()
}

fn anchor_hrefs(doc: &Html, css: &str, base: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_url(href, base))
        .collect()
}

fn anchor_entry(a: ElementRef, base: &Url) -> Option<(String, Url)> {
    let name = a.text().collect::<String>().trim().to_string();
    if name.is_empty() {
        return None;
    }
    let url = resolve_url(a.value().attr("href")?, base)?;
    Some((name, url))
}

fn resolve_url(reference: &str, base: &Url) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.join(trimmed).ok()
}
