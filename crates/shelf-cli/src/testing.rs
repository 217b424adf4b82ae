use std::collections::HashMap;

use shelf_crawler::{CrawlerConfig, FetchError, Fetcher};
use url::Url;

use crate::config::AppConfig;

pub const ROOT: &str = "http://books.test/";

pub fn config() -> AppConfig {
    AppConfig {
        crawler: CrawlerConfig {
            root_url: ROOT.into(),
            throttle: None,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Serves canned pages, anything else answers 404.
#[derive(Default)]
pub struct Site {
    pages: HashMap<String, String>,
}

impl Site {
    /// A catalog with a single `Travel` category of one page.
    pub fn catalog(tiles: &[(&str, &str)]) -> Self {
        let root = r#"<div class="side_categories"><ul class="nav nav-list"><li>
            <a href="catalogue/category/books_1/index.html">Books</a>
            <ul><li><a href="catalogue/category/books/travel_2/index.html">Travel</a></li></ul>
            </li></ul></div>"#;
        let tiles = tiles
            .iter()
            .map(|(title, price)| {
                format!(
                    r#"<article class="product_pod">
                        <p class="star-rating Three"></p>
                        <h3><a title="{title}">{title}</a></h3>
                        <p class="price_color">{price}</p>
                        <p class="instock availability">In stock</p>
                    </article>"#
                )
            })
            .collect::<String>();

        let mut pages = HashMap::new();
        pages.insert(ROOT.to_string(), root.to_string());
        pages.insert(
            format!("{ROOT}catalogue/category/books/travel_2/index.html"),
            format!("<html><body>{tiles}</body></html>"),
        );
        Self { pages }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }
}

impl Fetcher for Site {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
