use std::future::Future;
use std::io;
use std::path::PathBuf;

use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response, StatusCode};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("couldn't access {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },
    #[error("request for {location} failed: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{location} answered {status}: {message}")]
    Status {
        location: String,
        status: u16,
        message: String,
    },
    #[error("invalid storage endpoint {0:?}")]
    Endpoint(String),
}

/// Named-object storage holding the raw and cleaned datasets.
pub trait Store {
    fn get(&self, name: &str) -> impl Future<Output = Result<Vec<u8>, StoreError>>;

    /// Writes `data` under `name`, replacing any previous content.
    fn put(
        &self,
        name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), StoreError>>;

    /// Human readable location of `name`, used in logs and error messages.
    fn locate(&self, name: &str) -> String;
}

/// Opens a [`Store`] from a bucket name given at request time.
pub trait Buckets {
    type Store: Store;

    fn bucket(&self, name: &str) -> Self::Store;
}

////////////////////////////////////////////////////////////////////////////////////////

/// Files relative to a root directory. The default root is the working directory.
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn io_error(&self, name: &str, e: io::Error) -> StoreError {
        let location = self.locate(name);
        match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(location),
            _ => StoreError::Io {
                location,
                source: e,
            },
        }
    }
}

impl Store for LocalStore {
    async fn get(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        fs_err::read(self.path(name)).map_err(|e| self.io_error(name, e))
    }

    async fn put(&self, name: &str, data: Vec<u8>, _content_type: &str) -> Result<(), StoreError> {
        let path = self.path(name);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent).map_err(|e| self.io_error(name, e))?;
        }
        fs_err::write(&path, data).map_err(|e| self.io_error(name, e))
    }

    fn locate(&self, name: &str) -> String {
        self.path(name).display().to_string()
    }
}

/// One sub-directory per bucket, mirrors a bucket layout on local disk.
#[derive(Debug, Clone)]
pub struct DirBuckets {
    root: PathBuf,
}

impl DirBuckets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Buckets for DirBuckets {
    type Store = LocalStore;

    fn bucket(&self, name: &str) -> LocalStore {
        LocalStore::new(self.root.join(name))
    }
}

////////////////////////////////////////////////////////////////////////////////////////

/// Google Cloud Storage through its JSON API.
#[derive(Debug, Clone)]
pub struct GcsBuckets {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl GcsBuckets {
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self, StoreError> {
        let endpoint = Url::parse(endpoint)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| StoreError::Endpoint(endpoint.to_string()))?;
        let client = reqwest::ClientBuilder::new()
            .gzip(true)
            .build()
            .map_err(|source| StoreError::Http {
                location: endpoint.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            endpoint,
            token,
        })
    }
}

impl Buckets for GcsBuckets {
    type Store = GcsStore;

    fn bucket(&self, name: &str) -> GcsStore {
        GcsStore {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            bucket: name.to_string(),
            token: self.token.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GcsStore {
    client: reqwest::Client,
    endpoint: Url,
    bucket: String,
    token: Option<String>,
}

impl GcsStore {
    fn api_url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn download_url(&self, name: &str) -> Url {
        let mut url = self.api_url(&["storage", "v1", "b", &self.bucket, "o", name]);
        url.query_pairs_mut().append_pair("alt", "media");
        url
    }

    pub fn upload_url(&self, name: &str) -> Url {
        let mut url = self.api_url(&["upload", "storage", "v1", "b", &self.bucket, "o"]);
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", name);
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, name: &str) -> Result<Response, StoreError> {
        let location = self.locate(name);
        let resp = self
            .authorize(request)
            .send()
            .await
            .map_err(|source| StoreError::Http {
                location: location.clone(),
                source,
            })?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(location)),
            status if !status.is_success() => Err(StoreError::Status {
                location,
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            }),
            _ => Ok(resp),
        }
    }
}

impl Store for GcsStore {
    async fn get(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let resp = self
            .send(self.client.get(self.download_url(name)), name)
            .await?;
        let data = resp.bytes().await.map_err(|source| StoreError::Http {
            location: self.locate(name),
            source,
        })?;
        Ok(data.to_vec())
    }

    async fn put(&self, name: &str, data: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        let request = self
            .client
            .post(self.upload_url(name))
            .header(CONTENT_TYPE, content_type)
            .body(data);
        self.send(request, name).await?;
        log::info!("Uploaded {}", self.locate(name));
        Ok(())
    }

    fn locate(&self, name: &str) -> String {
        format!("gs://{}/{}", self.bucket, name)
    }
}
