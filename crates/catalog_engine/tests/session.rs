use std::fs;

use catalog_core::{
    FetchTask, MediaFetchResult, MediaTask, PageContext, PageKind, PageResponse,
};
use catalog_engine::{HarvestSession, RunConfig, SiteProfile};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use url::Url;

const NAV_HTML: &str = r#"
<nav class="navigation"><ul>
  <li class="level0"><a href="/home.html"><span>Home</span></a></li>
  <li class="level0">
    <a href="/women.html"><span>Women</span></a>
    <ul class="level1"><li><a href="/women/tops-women.html">Tops</a></li></ul>
  </li>
</ul></nav>
"#;

const PRODUCT_HTML: &str = r#"
<html><body>
<span data-ui-id="page-title-wrapper">Radiant Tee</span>
<div itemprop="sku">WS12</div>
<div class="product attribute description"><div class="value">Soft tee.</div></div>
<script type="text/x-magento-init">
{
  "[data-gallery-role=gallery-placeholder]": {
    "mage/gallery/gallery": {
      "data": [
        {"full": "https://cdn.example/img/ws12-a.jpg"},
        {"full": "https://cdn.example/img/ws12-b.jpg"}
      ]
    }
  }
}
</script>
</body></html>
"#;

fn setup(temp: &TempDir) -> (HarvestSession, RunConfig) {
    let config = RunConfig {
        output_dir: temp.path().join("output"),
        media_dir: temp.path().join("media"),
    };
    let session = HarvestSession::start(SiteProfile::default(), &config).unwrap();
    (session, config)
}

fn media_tasks(tasks: Vec<FetchTask>) -> Vec<MediaTask> {
    tasks
        .into_iter()
        .map(|task| match task {
            FetchTask::Media(media) => media,
            other => panic!("expected media task, got {other:?}"),
        })
        .collect()
}

#[test]
fn root_page_yields_category_nodes_and_follow_ups() {
    let temp = TempDir::new().unwrap();
    let (mut session, _config) = setup(&temp);

    let tasks = session
        .on_page(&PageResponse {
            kind: PageKind::Root,
            url: Url::parse("https://shop.example/").unwrap(),
            body: NAV_HTML.to_string(),
            context: PageContext::default(),
        })
        .unwrap();

    // Women sub-entry and the Women page itself; "Home" produced nothing.
    assert_eq!(tasks.len(), 2);
    let summary = session.finish().unwrap();
    // The Women and Tops nodes went straight through the pipeline.
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.dropped, 0);
}

#[test]
fn product_record_waits_for_all_media_then_exports() {
    let temp = TempDir::new().unwrap();
    let (mut session, _config) = setup(&temp);

    let tasks = session
        .on_page(&PageResponse {
            kind: PageKind::Product,
            url: Url::parse("https://shop.example/radiant-tee.html").unwrap(),
            body: PRODUCT_HTML.to_string(),
            context: PageContext::for_breadcrumb(vec![
                "Women".to_string(),
                "Tops".to_string(),
            ]),
        })
        .unwrap();
    let tasks = media_tasks(tasks);
    assert_eq!(tasks.len(), 2);

    // One image succeeds, the other fails; the record must still export
    // with both outcomes attached.
    session
        .on_media(&tasks[0], MediaFetchResult::Fetched(b"bytes".to_vec()))
        .unwrap();
    session
        .on_media(
            &tasks[1],
            MediaFetchResult::Failed("http status 404".into()),
        )
        .unwrap();

    let summary = session.finish().unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.dropped, 0);
    assert_eq!(summary.failed_media, 1);

    let content = fs::read_to_string(&summary.output_path).unwrap();
    let line: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(line["kind"], "product");
    assert_eq!(line["sku"], "WS12");
    assert_eq!(line["images"].as_array().unwrap().len(), 2);
    let statuses: Vec<&str> = line["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["status"].as_str().unwrap())
        .collect();
    assert!(statuses.contains(&"downloaded"));
    assert!(statuses.contains(&"failed"));
}

#[test]
fn unfinished_media_is_never_exported() {
    let temp = TempDir::new().unwrap();
    let (mut session, _config) = setup(&temp);

    let tasks = session
        .on_page(&PageResponse {
            kind: PageKind::Product,
            url: Url::parse("https://shop.example/radiant-tee.html").unwrap(),
            body: PRODUCT_HTML.to_string(),
            context: PageContext::default(),
        })
        .unwrap();
    assert_eq!(tasks.len(), 2);

    // Only one of two completions arrives before the run ends.
    let tasks = media_tasks(tasks);
    session
        .on_media(&tasks[0], MediaFetchResult::Fetched(b"bytes".to_vec()))
        .unwrap();

    let summary = session.finish().unwrap();
    assert_eq!(summary.processed, 0);
    let content = fs::read_to_string(&summary.output_path).unwrap();
    assert!(content.is_empty());
}

#[test]
fn category_page_discovers_products_and_nested_categories() {
    let temp = TempDir::new().unwrap();
    let (mut session, _config) = setup(&temp);

    let body = r#"
    <div class="categories"><a href="/women/tops/hoodies.html">Hoodies</a></div>
    <div class="product-item-info"><a href="/radiant-tee.html">Radiant Tee</a></div>
    "#;
    let tasks = session
        .on_page(&PageResponse {
            kind: PageKind::Category,
            url: Url::parse("https://shop.example/women/tops-women.html").unwrap(),
            body: body.to_string(),
            context: PageContext::for_breadcrumb(vec![
                "Women".to_string(),
                "Tops".to_string(),
            ]),
        })
        .unwrap();

    let mut category_tasks = 0;
    let mut product_tasks = 0;
    for task in &tasks {
        match task {
            FetchTask::CategoryPage { .. } => category_tasks += 1,
            FetchTask::ProductPage { .. } => product_tasks += 1,
            FetchTask::Media(_) => panic!("no media expected here"),
        }
    }
    assert_eq!(category_tasks, 1);
    assert_eq!(product_tasks, 1);

    // The nested node was exported as a category item.
    let summary = session.finish().unwrap();
    assert_eq!(summary.processed, 1);
}

#[test]
fn empty_product_body_aborts_with_an_error() {
    let temp = TempDir::new().unwrap();
    let (mut session, _config) = setup(&temp);

    let result = session.on_page(&PageResponse {
        kind: PageKind::Product,
        url: Url::parse("https://shop.example/p").unwrap(),
        body: String::new(),
        context: PageContext::default(),
    });
    assert!(result.is_err());
}
