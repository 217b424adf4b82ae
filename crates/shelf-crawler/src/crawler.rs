use futures::{pin_mut, StreamExt};
use shelf_dataset::Record;
use url::Url;

use crate::catalog::{category_links, CatalogLink};
use crate::config::{CrawlerConfig, OnError};
use crate::error::{CrawlError, FetchError};
use crate::fetch::Fetcher;
use crate::pages::paginate;

/// Crawls every category of the catalog found at `config.root_url`.
///
/// Records come back in category, page, then tile order. Only a failure to
/// get the root page aborts the crawl by default; failing categories and
/// items are logged and skipped according to `config.on_dl_error` and
/// `config.on_scrap_error`.
pub async fn crawl_catalog<F>(
    config: &CrawlerConfig,
    fetcher: &F,
) -> Result<Vec<Record>, CrawlError>
where
    F: Fetcher,
{
    let root = Url::parse(&config.root_url).map_err(|source| {
        CrawlError::Root(FetchError::InvalidUrl {
            url: config.root_url.clone(),
            source,
        })
    })?;

    log::info!("Starting crawl of {root}");
    let page = match fetcher.fetch(&root).await {
        Ok(page) => page,
        Err(e) => {
            log::error!("Failed to fetch root page {root}: {e}");
            return Err(CrawlError::Root(e));
        }
    };

    let links = category_links(&page, &root);
    if links.is_empty() {
        log::warn!("No category links found on {root}, check the category selector");
        return Ok(vec![]);
    }
    log::info!("Found {} potential category links", links.len());

    let mut records = vec![];
    for link in &links {
        if link.is_reserved() {
            log::debug!("Skipping reserved label '{}'", link.name);
            continue;
        }
        crawl_category(config, fetcher, link, &mut records).await?;
    }

    log::info!("Crawl completed, total records: {}", records.len());
    Ok(records)
}

async fn crawl_category<F>(
    config: &CrawlerConfig,
    fetcher: &F,
    link: &CatalogLink,
    records: &mut Vec<Record>,
) -> Result<(), CrawlError>
where
    F: Fetcher,
{
    log::info!("Crawling category '{}' from {}", link.name, link.url);

    let pages = paginate(fetcher, config.throttle, &link.name, link.url.clone());
    pin_mut!(pages);

    while let Some(page) = pages.next().await {
        let page = match page {
            Ok(page) => page,
            Err(e) => match config.on_dl_error {
                OnError::SkipAndLog => {
                    log::error!("Stopping category '{}': {e}", link.name);
                    return Ok(());
                }
                OnError::Fail => {
                    return Err(CrawlError::Category {
                        category: link.name.clone(),
                        source: e,
                    })
                }
            },
        };

        if page.tiles.is_empty() {
            log::info!("No items found on page {} for '{}'", page.number, link.name);
            return Ok(());
        }

        for tile in page.tiles {
            match tile {
                Ok(record) => records.push(record),
                Err(skip) => match config.on_scrap_error {
                    OnError::SkipAndLog => {
                        log::error!(
                            "Skipping an item in '{}' (page {}): {}. Item HTML: {}",
                            link.name,
                            page.number,
                            skip.reason,
                            skip.fragment
                        );
                    }
                    OnError::Fail => {
                        return Err(CrawlError::Scrap {
                            category: link.name.clone(),
                            page: page.number,
                            skip,
                        })
                    }
                },
            }
        }

        if page.next.is_none() {
            log::info!("No more pages for category '{}'", link.name);
        }
    }

    Ok(())
}
