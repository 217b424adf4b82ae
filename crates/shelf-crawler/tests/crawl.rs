use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use futures::StreamExt;
use shelf_crawler::{
    crawl_catalog, paginate, CrawlError, CrawlerConfig, FetchError, Fetcher, OnError, StarRating,
    StructureError, Throttle,
};
use tokio::time::Instant;
use url::Url;

const ROOT: &str = "http://books.test/";
const TRAVEL: &str = "http://books.test/catalogue/category/books/travel_2/index.html";
const TRAVEL_2: &str = "http://books.test/catalogue/category/books/travel_2/page-2.html";
const TRAVEL_3: &str = "http://books.test/catalogue/category/books/travel_2/page-3.html";
const MYSTERY: &str = "http://books.test/catalogue/category/books/mystery_3/index.html";

#[derive(Default)]
struct Fixtures {
    pages: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl Fixtures {
    fn page(mut self, url: &str, body: String) -> Self {
        self.pages.insert(url.to_string(), body);
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetcher for Fixtures {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

fn config() -> CrawlerConfig {
    CrawlerConfig {
        root_url: ROOT.into(),
        throttle: None,
        ..Default::default()
    }
}

fn root(categories: &[(&str, &str)]) -> String {
    let items = categories
        .iter()
        .map(|(name, href)| format!(r#"<li><a href="{href}">{name}</a></li>"#))
        .collect::<String>();
    format!(
        r#"<html><body>
        <div class="side_categories">
            <ul class="nav nav-list">
                <li>
                    <a href="catalogue/category/books_1/index.html">
                        Books
                    </a>
                    <ul>{items}</ul>
                </li>
            </ul>
        </div>
        </body></html>"#
    )
}

fn catalog_root() -> String {
    root(&[
        ("Travel", "catalogue/category/books/travel_2/index.html"),
        ("Mystery", "catalogue/category/books/mystery_3/index.html"),
    ])
}

fn tile(title: &str, price: &str, rating: &str) -> String {
    format!(
        r#"<li><article class="product_pod">
            <p class="star-rating {rating}"><i class="icon-star"></i></p>
            <h3><a href="book/index.html" title="{title}">{title}</a></h3>
            <div class="product_price">
                <p class="price_color">{price}</p>
                <p class="instock availability"><i class="icon-ok"></i> In stock </p>
            </div>
        </article></li>"#
    )
}

fn listing(tiles: &[String], next: Option<&str>) -> String {
    let pager = next
        .map(|href| {
            format!(r#"<ul class="pager"><li class="next"><a href="{href}">next</a></li></ul>"#)
        })
        .unwrap_or_default();
    format!(
        r#"<html><body><section><ol class="row">{}</ol>{pager}</section></body></html>"#,
        tiles.concat()
    )
}

fn titles(records: &[shelf_crawler::Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| format!("{}/{}", r.category, r.title))
        .collect()
}

#[tokio::test]
async fn crawls_categories_then_pages_then_tiles() {
    let fixtures = Fixtures::default()
        .page(ROOT, catalog_root())
        .page(
            TRAVEL,
            listing(
                &[tile("T1", "£10.00", "One"), tile("T2", "£20.00", "Two")],
                Some("page-2.html"),
            ),
        )
        .page(TRAVEL_2, listing(&[tile("T3", "Â£30.00", "Five")], None))
        .page(MYSTERY, listing(&[tile("M1", "£5.50", "Zero")], None));

    let records = crawl_catalog(&config(), &fixtures).await.unwrap();

    assert_eq!(
        titles(&records),
        vec!["Travel/T1", "Travel/T2", "Travel/T3", "Mystery/M1"]
    );
    assert_eq!(records[2].price, 30.0);
    assert_eq!(records[2].star_rating, StarRating::Five);
    assert_eq!(records[3].star_rating, StarRating::Unrated);
    assert_eq!(records[3].availability, "In stock");
    assert_eq!(fixtures.requests(), vec![ROOT, TRAVEL, TRAVEL_2, MYSTERY]);
}

#[tokio::test]
async fn reserved_labels_are_not_crawled() {
    let fixtures = Fixtures::default()
        .page(
            ROOT,
            root(&[
                ("  Category  ", "catalogue/category/header/index.html"),
                ("Travel", "catalogue/category/books/travel_2/index.html"),
            ]),
        )
        .page(TRAVEL, listing(&[tile("T1", "£10.00", "One")], None));

    let records = crawl_catalog(&config(), &fixtures).await.unwrap();

    assert_eq!(titles(&records), vec!["Travel/T1"]);
    assert_eq!(fixtures.requests(), vec![ROOT, TRAVEL]);
}

#[tokio::test]
async fn root_fetch_failure_yields_fetch_error() {
    let fixtures = Fixtures::default();

    let err = crawl_catalog(&config(), &fixtures).await.unwrap_err();

    assert!(matches!(
        err,
        CrawlError::Root(FetchError::Status { status: 404, .. })
    ));
    assert!(err.fetch_error().is_some());
    assert_eq!(fixtures.requests(), vec![ROOT]);
}

#[tokio::test]
async fn invalid_root_url_is_a_root_failure() {
    let config = CrawlerConfig {
        root_url: "not a url".into(),
        ..config()
    };

    let err = crawl_catalog(&config, &Fixtures::default()).await.unwrap_err();

    assert!(matches!(err, CrawlError::Root(FetchError::InvalidUrl { .. })));
}

#[tokio::test]
async fn missing_navigation_yields_no_records() {
    let fixtures = Fixtures::default().page(ROOT, "<html><body><p>Moved</p></body></html>".into());

    let records = crawl_catalog(&config(), &fixtures).await.unwrap();

    assert!(records.is_empty());
    assert_eq!(fixtures.requests(), vec![ROOT]);
}

#[tokio::test]
async fn failing_category_does_not_stop_siblings() {
    let fixtures = Fixtures::default()
        .page(ROOT, catalog_root())
        .page(MYSTERY, listing(&[tile("M1", "£5.50", "Four")], None));

    let records = crawl_catalog(&config(), &fixtures).await.unwrap();

    assert_eq!(titles(&records), vec!["Mystery/M1"]);
    assert_eq!(fixtures.requests(), vec![ROOT, TRAVEL, MYSTERY]);
}

#[tokio::test]
async fn failing_category_aborts_with_fail_policy() {
    let fixtures = Fixtures::default()
        .page(ROOT, catalog_root())
        .page(MYSTERY, listing(&[tile("M1", "£5.50", "Four")], None));
    let config = CrawlerConfig {
        on_dl_error: OnError::Fail,
        ..config()
    };

    let err = crawl_catalog(&config, &fixtures).await.unwrap_err();

    assert!(matches!(err, CrawlError::Category { ref category, .. } if category == "Travel"));
    assert_eq!(fixtures.requests(), vec![ROOT, TRAVEL]);
}

#[tokio::test]
async fn empty_first_page_yields_nothing_for_that_category() {
    let fixtures = Fixtures::default()
        .page(ROOT, catalog_root())
        .page(TRAVEL, listing(&[], Some("page-2.html")))
        .page(MYSTERY, listing(&[tile("M1", "£5.50", "Four")], None));

    let records = crawl_catalog(&config(), &fixtures).await.unwrap();

    assert_eq!(titles(&records), vec!["Mystery/M1"]);
    assert_eq!(fixtures.requests(), vec![ROOT, TRAVEL, MYSTERY]);
}

#[tokio::test]
async fn empty_following_page_stops_pagination() {
    let fixtures = Fixtures::default()
        .page(ROOT, catalog_root())
        .page(
            TRAVEL,
            listing(&[tile("T1", "£10.00", "One")], Some("page-2.html")),
        )
        .page(TRAVEL_2, listing(&[], Some("page-3.html")))
        .page(TRAVEL_3, listing(&[tile("T3", "£10.00", "One")], None))
        .page(MYSTERY, listing(&[], None));

    let records = crawl_catalog(&config(), &fixtures).await.unwrap();

    assert_eq!(titles(&records), vec!["Travel/T1"]);
    assert_eq!(fixtures.requests(), vec![ROOT, TRAVEL, TRAVEL_2, MYSTERY]);
}

#[tokio::test]
async fn unparseable_price_is_left_out() {
    let fixtures = Fixtures::default()
        .page(ROOT, catalog_root())
        .page(
            TRAVEL,
            listing(
                &[
                    tile("T1", "£10.00", "One"),
                    tile("Broken", "£call us", "One"),
                    tile("T2", "£12.00", "Two"),
                ],
                None,
            ),
        )
        .page(MYSTERY, listing(&[], None));

    let records = crawl_catalog(&config(), &fixtures).await.unwrap();

    assert_eq!(titles(&records), vec!["Travel/T1", "Travel/T2"]);
}

#[tokio::test]
async fn unparseable_price_aborts_with_fail_policy() {
    let fixtures = Fixtures::default()
        .page(ROOT, catalog_root())
        .page(TRAVEL, listing(&[tile("Broken", "£call us", "One")], None));
    let config = CrawlerConfig {
        on_scrap_error: OnError::Fail,
        ..config()
    };

    let err = crawl_catalog(&config, &fixtures).await.unwrap_err();

    match err {
        CrawlError::Scrap {
            category,
            page,
            skip,
        } => {
            assert_eq!(category, "Travel");
            assert_eq!(page, 1);
            assert_eq!(skip.reason, StructureError::InvalidPrice("£call us".into()));
            assert!(skip.fragment.contains("Broken"));
        }
        e => panic!("unexpected error: {e}"),
    }
}

#[tokio::test]
async fn pagination_is_lazy_and_restartable() {
    let fixtures = Fixtures::default()
        .page(
            TRAVEL,
            listing(&[tile("T1", "£10.00", "One")], Some("page-2.html")),
        )
        .page(TRAVEL_2, listing(&[tile("T2", "£10.00", "One")], None));
    let first = Url::parse(TRAVEL).unwrap();

    let pages = paginate(&fixtures, None, "Travel", first.clone());
    assert!(fixtures.requests().is_empty());
    let pages = pages.collect::<Vec<_>>().await;

    let numbers = pages
        .iter()
        .map(|page| page.as_ref().unwrap().number)
        .collect::<Vec<_>>();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(
        pages[0].as_ref().unwrap().next.as_ref().map(Url::as_str),
        Some(TRAVEL_2)
    );

    let again = paginate(&fixtures, None, "Travel", first).collect::<Vec<_>>().await;
    assert_eq!(again.len(), 2);
    assert_eq!(fixtures.requests(), vec![TRAVEL, TRAVEL_2, TRAVEL, TRAVEL_2]);
}

#[tokio::test]
async fn pagination_ends_after_fetch_failure() {
    let fixtures = Fixtures::default().page(
        TRAVEL,
        listing(&[tile("T1", "£10.00", "One")], Some("page-2.html")),
    );

    let pages = paginate(&fixtures, None, "Travel", Url::parse(TRAVEL).unwrap())
        .collect::<Vec<_>>()
        .await;

    assert_eq!(pages.len(), 2);
    assert!(pages[0].is_ok());
    assert!(matches!(pages[1], Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test(start_paused = true)]
async fn throttle_pauses_only_between_pages_of_a_category() {
    let config = CrawlerConfig {
        throttle: Some(Throttle::Delay(0.3)),
        ..config()
    };
    let single_pages = Fixtures::default()
        .page(ROOT, catalog_root())
        .page(TRAVEL, listing(&[tile("T1", "£10.00", "One")], None))
        .page(MYSTERY, listing(&[tile("M1", "£5.50", "Four")], None));

    let start = Instant::now();
    let records = crawl_catalog(&config, &single_pages).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(start.elapsed(), Duration::ZERO);

    let two_pages = Fixtures::default()
        .page(ROOT, catalog_root())
        .page(
            TRAVEL,
            listing(&[tile("T1", "£10.00", "One")], Some("page-2.html")),
        )
        .page(TRAVEL_2, listing(&[tile("T2", "£10.00", "One")], None))
        .page(MYSTERY, listing(&[tile("M1", "£5.50", "Four")], None));

    let start = Instant::now();
    let records = crawl_catalog(&config, &two_pages).await.unwrap();

    assert_eq!(records.len(), 3);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(600), "{elapsed:?}");
}
