use shelf_crawler::Fetcher;
use shelf_dataset::{clean_stored, DatasetError, LocalStore};

use crate::config::{AppConfig, LocalConfig};
use crate::run::{scrape_to_store, Reply, CLEAN_OK, NO_DATA};

/// Crawls the catalog into the raw dataset file.
pub async fn crawl_local<F>(
    config: &AppConfig,
    fetcher: &F,
    store: &LocalStore,
) -> anyhow::Result<()>
where
    F: Fetcher,
{
    let raw_file = &config.local.raw_file;
    if scrape_to_store(config, fetcher, store, raw_file).await?.is_none() {
        log::warn!("{NO_DATA}");
    }
    Ok(())
}

/// Cleans the raw dataset file into the cleaned one.
pub async fn clean_local(config: &AppConfig, store: &LocalStore) -> Reply {
    log::info!("Starting data cleaning process...");
    let LocalConfig {
        raw_file,
        cleaned_file,
    } = &config.local;

    match clean_stored(store, raw_file, cleaned_file, &config.csv).await {
        Ok(_) => Reply::text(200, CLEAN_OK),
        Err(e @ DatasetError::SourceNotFound(_)) => {
            log::error!("{e}");
            Reply::text(404, format!("Data cleaning failed: {e}"))
        }
        Err(e) => {
            log::error!("An error occurred during data cleaning: {e}");
            Reply::text(500, format!("Data cleaning failed: {e}"))
        }
    }
}
