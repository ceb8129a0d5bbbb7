use catalog_core::{is_well_formed_media_url, PageContext};

#[test]
fn context_from_breadcrumb_carries_parent_and_depth() {
    let ctx = PageContext::for_breadcrumb(vec!["Women".to_string(), "Tops".to_string()]);
    assert_eq!(ctx.category, "Tops");
    assert_eq!(ctx.parent_category, "Women");
    assert_eq!(ctx.depth, 1);

    let root = PageContext::for_breadcrumb(vec!["Women".to_string()]);
    assert_eq!(root.parent_category, "");
    assert_eq!(root.depth, 0);
}

#[test]
fn media_url_filter_requires_absolute_http() {
    assert!(is_well_formed_media_url("https://cdn.example/a.jpg"));
    assert!(is_well_formed_media_url("http://cdn.example/a.jpg"));
    assert!(!is_well_formed_media_url("ftp://cdn.example/a.jpg"));
    assert!(!is_well_formed_media_url("/media/a.jpg"));
    assert!(!is_well_formed_media_url(""));
    assert!(!is_well_formed_media_url("not a url"));
}
