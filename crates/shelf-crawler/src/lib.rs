mod catalog;
mod config;
mod crawler;
mod error;
mod extract;
mod fetch;
mod pages;

pub use catalog::{category_links, CatalogLink, RESERVED_LABELS};
pub use config::{CrawlerConfig, OnError, Throttle};
pub use crawler::crawl_catalog;
pub use error::{CrawlError, FetchError, Skip, StructureError};
pub use extract::{extract, parse_price, Extraction};
pub use fetch::{Fetcher, HttpFetcher};
pub use pages::{paginate, ListingPage};

pub use shelf_dataset::{Record, StarRating};
