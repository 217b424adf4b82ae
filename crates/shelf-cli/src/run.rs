use shelf_crawler::{crawl_catalog, CrawlError, CrawlerConfig, Fetcher};
use shelf_dataset::{encode_records, Record, Store};

use crate::config::AppConfig;

pub const NO_DATA: &str = "No data was scraped. Check selectors or website availability.";
pub const CLEAN_OK: &str = "Data cleaning successful!";

/// Status and body of a finished run, shared by the local and triggered entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    pub fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body,
        }
    }
}

/// Crawls the catalog. A root page that can't be fetched means there is
/// nothing to scrap, not a failure of the run.
pub async fn scrape_records<F>(
    config: &CrawlerConfig,
    fetcher: &F,
) -> Result<Vec<Record>, CrawlError>
where
    F: Fetcher,
{
    match crawl_catalog(config, fetcher).await {
        Err(CrawlError::Root(e)) => {
            log::warn!("Nothing scraped, the catalog root is unreachable: {e}");
            Ok(vec![])
        }
        res => res,
    }
}

/// Crawls and writes the raw dataset as `name` in `store`. Nothing is written
/// and `None` is returned when no record was scraped.
pub async fn scrape_to_store<F, S>(
    config: &AppConfig,
    fetcher: &F,
    store: &S,
    name: &str,
) -> anyhow::Result<Option<Vec<Record>>>
where
    F: Fetcher,
    S: Store,
{
    let records = scrape_records(&config.crawler, fetcher).await?;
    if records.is_empty() {
        return Ok(None);
    }

    let data = encode_records(&records, &config.csv)?;
    store.put(name, data, "text/csv").await?;
    log::info!(
        "Successfully scraped {} records and saved them to {}",
        records.len(),
        store.locate(name)
    );

    Ok(Some(records))
}
