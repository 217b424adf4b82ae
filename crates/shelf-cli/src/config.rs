use std::path::Path;

use serde::{Deserialize, Serialize};
use shelf_crawler::CrawlerConfig;
use shelf_dataset::CsvConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub csv: CsvConfig,

    #[serde(default)]
    pub local: LocalConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Reads the yaml file at `path`, or the defaults when there is none.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let file = fs_err::File::open(path)?;
                Ok(serde_yaml::from_reader(file)?)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Files used by the local runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalConfig {
    #[serde(default = "default_raw_file")]
    pub raw_file: String,

    #[serde(default = "default_cleaned_file")]
    pub cleaned_file: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            raw_file: default_raw_file(),
            cleaned_file: default_cleaned_file(),
        }
    }
}

fn default_raw_file() -> String {
    String::from("raw_data.csv")
}

fn default_cleaned_file() -> String {
    String::from("cleaned_data.csv")
}

/// Object storage used by the triggered runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bucket receiving the raw dataset of triggered crawls
    #[serde(default)]
    pub bucket: Option<String>,

    #[serde(default = "default_raw_file")]
    pub raw_object: String,

    /// Bearer token sent to the storage API
    #[serde(default)]
    pub token: Option<String>,

    /// Fallback for the parameters of triggered cleanings
    #[serde(default)]
    pub clean: CleanParams,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            bucket: None,
            raw_object: default_raw_file(),
            token: None,
            clean: CleanParams::default(),
        }
    }
}

fn default_endpoint() -> String {
    String::from("https://storage.googleapis.com")
}

////////////////////////////////////////////////////////////////////////////////////////

/// Parameters of a triggered cleaning, each of them may come from the request
/// body, its query string or the configuration. Empty values count as missing.
///
/// Keys are the snake_case names of the request parameters, the camelCase
/// spelling of the configuration file is accepted too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanParams {
    #[serde(default, alias = "bucketName")]
    pub bucket_name: Option<String>,
    #[serde(default, alias = "sourceFileName")]
    pub source_file_name: Option<String>,
    #[serde(default, alias = "cleanedFileName")]
    pub cleaned_file_name: Option<String>,
}

/// Fully resolved [`CleanParams`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanTarget {
    pub bucket_name: String,
    pub source_file_name: String,
    pub cleaned_file_name: String,
}

impl CleanParams {
    /// Takes from `fallback` every field missing here.
    pub fn or(self, fallback: CleanParams) -> CleanParams {
        CleanParams {
            bucket_name: present(self.bucket_name).or_else(|| present(fallback.bucket_name)),
            source_file_name: present(self.source_file_name)
                .or_else(|| present(fallback.source_file_name)),
            cleaned_file_name: present(self.cleaned_file_name)
                .or_else(|| present(fallback.cleaned_file_name)),
        }
    }

    pub fn resolve(self) -> Option<CleanTarget> {
        Some(CleanTarget {
            bucket_name: present(self.bucket_name)?,
            source_file_name: present(self.source_file_name)?,
            cleaned_file_name: present(self.cleaned_file_name)?,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
