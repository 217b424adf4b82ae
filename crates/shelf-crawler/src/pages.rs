use futures::{stream, Stream};
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use url::Url;

use crate::catalog::resolve_href;
use crate::config::Throttle;
use crate::error::FetchError;
use crate::extract::{extract, Extraction};
use crate::fetch::Fetcher;

lazy_static! {
    static ref TILES: Selector = Selector::parse("article.product_pod").unwrap();
    static ref NEXT: Selector = Selector::parse("li.next a").unwrap();
}

/// A fetched and parsed listing page of one category.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub url: Url,
    /// 1-based position within the category
    pub number: usize,
    pub tiles: Vec<Extraction>,
    pub next: Option<Url>,
}

impl ListingPage {
    pub fn parse(url: Url, number: usize, page: &str, category: &str) -> Self {
        let document = Html::parse_document(page);

        let tiles = document
            .select(&TILES)
            .map(|tile| extract(tile, category))
            .collect();

        let next = document
            .select(&NEXT)
            .next()
            .and_then(|link| match resolve_href(link, &url) {
                Ok(next) => Some(next),
                Err(e) => {
                    log::warn!("Ignoring next link of {url}: {e}");
                    None
                }
            });

        Self {
            url,
            number,
            tiles,
            next,
        }
    }
}

struct Cursor {
    url: Url,
    number: usize,
}

/// Lazily walks the listing pages of a category starting at `first`.
///
/// Nothing is downloaded until the stream is polled, and the stream ends
/// after a download failure or after a page without a next link. Calling it
/// again with the same `first` url restarts the walk.
pub fn paginate<'a, F>(
    fetcher: &'a F,
    throttle: Option<Throttle>,
    category: &'a str,
    first: Url,
) -> impl Stream<Item = Result<ListingPage, FetchError>> + 'a
where
    F: Fetcher,
{
    let start = Cursor {
        url: first,
        number: 1,
    };

    stream::unfold(Some(start), move |cursor| async move {
        let Cursor { url, number } = cursor?;

        if number > 1 {
            if let Some(throttle) = throttle {
                tokio::time::sleep(throttle.pause()).await;
            }
        }

        log::info!("Fetching page {number} for '{category}' from {url}");
        match fetcher.fetch(&url).await {
            Ok(body) => {
                let page = ListingPage::parse(url, number, &body, category);
                let cursor = page.next.clone().map(|url| Cursor {
                    url,
                    number: number + 1,
                });
                Some((Ok(page), cursor))
            }
            Err(e) => Some((Err(e), None)),
        }
    })
}
