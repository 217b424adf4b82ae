use shelf_crawler::Fetcher;
use shelf_dataset::{clean_stored, Buckets, Store};

use crate::config::{AppConfig, CleanParams, CleanTarget};
use crate::run::{scrape_to_store, Reply, CLEAN_OK, NO_DATA};

pub const MISSING_PARAMS: &str = "Missing required parameters: 'bucket_name', 'source_file_name', \
    and 'cleaned_file_name' must be provided in the request body or query parameters.";

/// Crawls the catalog and uploads the raw dataset to `store`.
///
/// Replies 200 with the records as json, 204 when nothing was scraped and 500
/// on any other failure.
pub async fn scrape<F, S>(config: &AppConfig, fetcher: &F, store: &S) -> Reply
where
    F: Fetcher,
    S: Store,
{
    log::info!("Received HTTP request to trigger catalog scraping.");

    let res = scrape_to_store(config, fetcher, store, &config.storage.raw_object)
        .await
        .and_then(|records| {
            records
                .map(|records| serde_json::to_string(&records))
                .transpose()
                .map_err(anyhow::Error::from)
        });

    match res {
        Ok(Some(json)) => Reply::json(json),
        Ok(None) => {
            log::warn!("No data was scraped.");
            Reply::text(204, NO_DATA)
        }
        Err(e) => {
            log::error!("An error occurred during scraping or upload: {e:#}");
            Reply::text(500, format!("An internal server error occurred: {e}"))
        }
    }
}

/// Cleans a dataset of a request-supplied bucket.
///
/// Each parameter is taken from the json `body`, then the `query` string,
/// then the configured defaults.
pub async fn clean<B>(
    config: &AppConfig,
    buckets: &B,
    body: CleanParams,
    query: CleanParams,
) -> Reply
where
    B: Buckets,
{
    log::info!("Starting data cleaning process for stored files...");

    let params = body.or(query).or(config.storage.clean.clone());
    let Some(CleanTarget {
        bucket_name,
        source_file_name,
        cleaned_file_name,
    }) = params.resolve()
    else {
        log::error!("Error: {MISSING_PARAMS}");
        return Reply::text(400, MISSING_PARAMS);
    };

    log::info!("Processing file '{source_file_name}' from bucket '{bucket_name}'...");
    let store = buckets.bucket(&bucket_name);
    match clean_stored(&store, &source_file_name, &cleaned_file_name, &config.csv).await {
        Ok(_) => Reply::text(200, CLEAN_OK),
        Err(e) => {
            log::error!("An error occurred during data cleaning or storage: {e}");
            Reply::text(500, format!("Data cleaning failed: {e}"))
        }
    }
}
