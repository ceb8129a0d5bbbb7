use scraper::{Html, Selector};

/// Where a variant reads its value once the selector matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Attribute(&'static str),
    Text,
}

/// One selector expression in a fallback chain.
#[derive(Debug, Clone, Copy)]
pub struct SelectorVariant {
    pub css: &'static str,
    pub source: ValueSource,
}

/// An ordered list of markup-selector variants for one field.
///
/// Consulted only when structured data produced nothing for the field. Every
/// variant is evaluated and the union of their matches returned; priority
/// order is kept for readability and so new variants land in a defined
/// place, matching the original selector lists this was distilled from.
#[derive(Debug, Clone, Copy)]
pub struct SelectorChain {
    name: &'static str,
    variants: &'static [SelectorVariant],
}

impl SelectorChain {
    pub const fn new(name: &'static str, variants: &'static [SelectorVariant]) -> Self {
        Self { name, variants }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Evaluates the chain against a parsed page. Matched values are
    /// trimmed; empty matches are discarded.
    pub fn evaluate(&self, doc: &Html) -> Vec<String> {
        let mut matches = Vec::new();
        for variant in self.variants {
            let selector = match Selector::parse(variant.css) {
                Ok(selector) => selector,
                Err(_) => {
                    log::debug!("unparseable {} variant: {}", self.name, variant.css);
                    continue;
                }
            };
            for element in doc.select(&selector) {
                let value = match variant.source {
                    ValueSource::Attribute(name) => {
                        element.value().attr(name).map(str::to_string)
                    }
                    ValueSource::Text => Some(element.text().collect::<String>()),
                };
                let Some(value) = value else { continue };
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    matches.push(trimmed.to_string());
                }
            }
        }
        matches
    }
}

/// Color swatch variants, highest-fidelity markup first.
pub const COLOR_FALLBACKS: SelectorChain = SelectorChain::new(
    "color",
    &[
        SelectorVariant {
            css: "div.swatch-attribute.color div.swatch-option",
            source: ValueSource::Attribute("option-label"),
        },
        SelectorVariant {
            css: "div.swatch-attribute.color div.swatch-option",
            source: ValueSource::Attribute("data-option-label"),
        },
        SelectorVariant {
            css: "div.swatch-attribute.color div.swatch-option",
            source: ValueSource::Attribute("aria-label"),
        },
        SelectorVariant {
            css: "div.swatch-option.color",
            source: ValueSource::Attribute("option-label"),
        },
        SelectorVariant {
            css: "div.swatch-option.color",
            source: ValueSource::Attribute("aria-label"),
        },
        SelectorVariant {
            css: "div[attribute-code=\"color\"] div.swatch-option",
            source: ValueSource::Attribute("option-label"),
        },
        SelectorVariant {
            css: "div.product-options-wrapper div.swatch-option.color",
            source: ValueSource::Attribute("option-label"),
        },
        SelectorVariant {
            css: "select[name*=\"color\"] option:not(:first-child)",
            source: ValueSource::Text,
        },
    ],
);

/// Size swatch variants. Size options render as text swatches, hence the
/// `.text` class in the mid-priority variants.
pub const SIZE_FALLBACKS: SelectorChain = SelectorChain::new(
    "size",
    &[
        SelectorVariant {
            css: "div.swatch-attribute.size div.swatch-option",
            source: ValueSource::Attribute("option-label"),
        },
        SelectorVariant {
            css: "div.swatch-attribute.size div.swatch-option",
            source: ValueSource::Attribute("data-option-label"),
        },
        SelectorVariant {
            css: "div.swatch-attribute.size div.swatch-option",
            source: ValueSource::Attribute("aria-label"),
        },
        SelectorVariant {
            css: "div.swatch-option.text",
            source: ValueSource::Attribute("option-label"),
        },
        SelectorVariant {
            css: "div.swatch-option.text",
            source: ValueSource::Attribute("aria-label"),
        },
        SelectorVariant {
            css: "div[attribute-code=\"size\"] div.swatch-option",
            source: ValueSource::Attribute("option-label"),
        },
        SelectorVariant {
            css: "div.product-options-wrapper div.swatch-option.text",
            source: ValueSource::Attribute("option-label"),
        },
        SelectorVariant {
            css: "select[name*=\"size\"] option:not(:first-child)",
            source: ValueSource::Text,
        },
    ],
);
