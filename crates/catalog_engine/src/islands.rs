use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

// The two configuration identifiers a product page embeds its option and
// gallery data under. Both must be probed; either may be absent.
const SWATCH_KEY: &str = "[data-role=swatch-options]";
const SWATCH_COMPONENT: &str = "Magento_Swatches/js/swatch-renderer";
const GALLERY_KEY: &str = "[data-gallery-role=gallery-placeholder]";
const GALLERY_COMPONENT: &str = "mage/gallery/gallery";

const COLOR_CODE: &str = "color";
const SIZE_CODE: &str = "size";

/// What one structured-data island contributed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IslandData {
    pub images: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
}

impl IslandData {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.colors.is_empty() && self.sizes.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct SwatchRenderer {
    #[serde(rename = "jsonConfig", default)]
    json_config: SwatchConfig,
}

#[derive(Debug, Default, Deserialize)]
struct SwatchConfig {
    /// Full-size image URL lists keyed by product id.
    #[serde(default)]
    images: BTreeMap<String, Vec<ConfiguredImage>>,
    /// Option attributes keyed by attribute id.
    #[serde(default)]
    attributes: BTreeMap<String, SwatchAttribute>,
}

#[derive(Debug, Deserialize)]
struct SwatchAttribute {
    #[serde(default)]
    code: String,
    #[serde(default)]
    options: Vec<SwatchOption>,
}

#[derive(Debug, Deserialize)]
struct SwatchOption {
    #[serde(default)]
    label: String,
}

#[derive(Debug, Deserialize)]
struct ConfiguredImage {
    #[serde(default)]
    full: String,
}

#[derive(Debug, Deserialize)]
struct GalleryConfig {
    #[serde(default)]
    data: Vec<ConfiguredImage>,
}

/// Parses one embedded script-island payload into its typed contribution.
///
/// Pure function over the payload text. A malformed island (bad JSON or an
/// unexpected shape under a known key) is an `Err` the caller records as a
/// diagnostic and skips; other islands on the page are unaffected.
pub fn parse_island(payload: &str) -> Result<IslandData, serde_json::Error> {
    let root: Value = serde_json::from_str(payload)?;
    let mut data = IslandData::default();

    if let Some(renderer) = root.get(SWATCH_KEY).and_then(|v| v.get(SWATCH_COMPONENT)) {
        let renderer: SwatchRenderer = serde_json::from_value(renderer.clone())?;
        collect_swatch(renderer.json_config, &mut data);
    }

    if let Some(gallery) = root.get(GALLERY_KEY).and_then(|v| v.get(GALLERY_COMPONENT)) {
        let gallery: GalleryConfig = serde_json::from_value(gallery.clone())?;
        for image in gallery.data {
            push_trimmed(&mut data.images, &image.full);
        }
    }

    Ok(data)
}

fn collect_swatch(config: SwatchConfig, data: &mut IslandData) {
    for images in config.images.into_values() {
        for image in images {
            push_trimmed(&mut data.images, &image.full);
        }
    }
    for attribute in config.attributes.into_values() {
        let target = match attribute.code.as_str() {
            COLOR_CODE => &mut data.colors,
            SIZE_CODE => &mut data.sizes,
            _ => continue,
        };
        for option in attribute.options {
            push_trimmed(target, &option.label);
        }
    }
}

// Trim is the only normalization applied to labels and URLs.
fn push_trimmed(target: &mut Vec<String>, value: &str) {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        target.push(trimmed.to_string());
    }
}
