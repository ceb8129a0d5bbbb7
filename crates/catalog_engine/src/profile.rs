use std::collections::BTreeMap;
use std::path::PathBuf;

/// Site-specific knowledge the discoverer and extractor consult.
///
/// The defaults describe the Magento demo storefront; another deployment
/// swaps the vocabulary without touching traversal code.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Source tag stamped onto records and the export filename.
    pub source: String,
    /// Top-level names treated as main categories.
    pub main_categories: Vec<String>,
    /// Navigation chrome skipped by name, case-insensitive.
    pub nav_exclusions: Vec<String>,
    /// Maps a URL path segment to the display name of its section, used to
    /// infer a standalone category's parent.
    pub section_vocabulary: BTreeMap<String, String>,
    /// Category discovery stops past this depth; pages beyond it are still
    /// scanned for products.
    pub max_depth: u32,
}

impl Default for SiteProfile {
    fn default() -> Self {
        let mut section_vocabulary = BTreeMap::new();
        for (segment, display) in [
            ("women", "Women"),
            ("men", "Men"),
            ("gear", "Gear"),
            ("training", "Training"),
        ] {
            section_vocabulary.insert(segment.to_string(), display.to_string());
        }
        Self {
            source: "magento".to_string(),
            main_categories: vec![
                "Women".to_string(),
                "Men".to_string(),
                "Gear".to_string(),
                "Training".to_string(),
            ],
            nav_exclusions: vec!["home".to_string(), "sale".to_string()],
            section_vocabulary,
            max_depth: 10,
        }
    }
}

impl SiteProfile {
    pub fn is_main_category(&self, name: &str) -> bool {
        self.main_categories
            .iter()
            .any(|main| main.eq_ignore_ascii_case(name))
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.nav_exclusions
            .iter()
            .any(|skip| skip.eq_ignore_ascii_case(name))
    }

    /// Second-to-last path segment mapped through the section vocabulary;
    /// empty when the URL has no such segment or the segment is unknown.
    pub fn parent_from_url(&self, url: &url::Url) -> String {
        let segments: Vec<&str> = match url.path_segments() {
            Some(segments) => segments.filter(|s| !s.is_empty()).collect(),
            None => return String::new(),
        };
        if segments.len() < 2 {
            return String::new();
        }
        let parent_segment = segments[segments.len() - 2].to_ascii_lowercase();
        self.section_vocabulary
            .get(parent_segment.as_str())
            .cloned()
            .unwrap_or_default()
    }
}

/// Where a run writes its artifacts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory receiving the run-scoped `.jsonl` export file.
    pub output_dir: PathBuf,
    /// Root directory for acquired media assets.
    pub media_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            media_dir: PathBuf::from("media"),
        }
    }
}
