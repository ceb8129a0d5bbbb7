use catalog_engine::parse_island;
use pretty_assertions::assert_eq;

#[test]
fn unrelated_islands_contribute_nothing() {
    // Pages embed many init payloads; ones without the known keys are fine.
    let island = parse_island(r##"{"#html-body": {"some/other/widget": {}}}"##).unwrap();
    assert!(island.is_empty());
}

#[test]
fn swatch_and_gallery_keys_are_both_probed() {
    let payload = r#"{
        "[data-role=swatch-options]": {
            "Magento_Swatches/js/swatch-renderer": {
                "jsonConfig": {
                    "images": {"93": [{"full": "https://cdn.example/a.jpg"}]},
                    "attributes": {
                        "93": {"code": "color", "options": [{"label": " Black "}]},
                        "144": {"code": "size", "options": [{"label": "M"}]},
                        "7": {"code": "material", "options": [{"label": "Cotton"}]}
                    }
                }
            }
        },
        "[data-gallery-role=gallery-placeholder]": {
            "mage/gallery/gallery": {
                "data": [{"full": "https://cdn.example/b.jpg"}, {"full": ""}]
            }
        }
    }"#;
    let island = parse_island(payload).unwrap();
    assert_eq!(
        island.images,
        vec!["https://cdn.example/a.jpg", "https://cdn.example/b.jpg"]
    );
    // Labels are trimmed, nothing more; non color/size attributes ignored.
    assert_eq!(island.colors, vec!["Black"]);
    assert_eq!(island.sizes, vec!["M"]);
}

#[test]
fn malformed_payloads_are_errors_not_panics() {
    assert!(parse_island("{not json").is_err());
    // Valid JSON but an impossible shape under a known key is malformed too.
    let wrong_shape = r#"{
        "[data-role=swatch-options]": {
            "Magento_Swatches/js/swatch-renderer": {"jsonConfig": "surprise"}
        }
    }"#;
    assert!(parse_island(wrong_shape).is_err());
}

#[test]
fn options_without_labels_are_skipped() {
    let payload = r#"{
        "[data-role=swatch-options]": {
            "Magento_Swatches/js/swatch-renderer": {
                "jsonConfig": {
                    "attributes": {
                        "93": {"code": "color", "options": [{"label": ""}, {}]}
                    }
                }
            }
        }
    }"#;
    let island = parse_island(payload).unwrap();
    assert!(island.colors.is_empty());
}
