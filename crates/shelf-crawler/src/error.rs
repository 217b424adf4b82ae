use thiserror::Error;

/// Network or HTTP failure while downloading a page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("couldn't build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Expected markup that isn't there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("missing element `{0}`")]
    MissingElement(&'static str),
    #[error("missing attribute `{attribute}` on `{element}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("invalid price {0:?}")]
    InvalidPrice(String),
    #[error("invalid link {href:?}: {reason}")]
    InvalidLink { href: String, reason: String },
}

/// An item tile that didn't produce a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct Skip {
    pub reason: StructureError,
    /// Markup of the tile
    pub fragment: String,
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("couldn't fetch catalog root: {0}")]
    Root(#[source] FetchError),
    #[error("couldn't fetch category '{category}': {source}")]
    Category {
        category: String,
        #[source]
        source: FetchError,
    },
    #[error("couldn't scrap item in '{category}' (page {page}): {skip}")]
    Scrap {
        category: String,
        page: usize,
        skip: Skip,
    },
}

impl CrawlError {
    /// The download failure behind this error, if any.
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            Self::Root(e) | Self::Category { source: e, .. } => Some(e),
            Self::Scrap { .. } => None,
        }
    }
}
