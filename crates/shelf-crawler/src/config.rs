use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    #[serde(default = "default_root_url")]
    pub root_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds, transport default when unset
    #[serde(default)]
    pub timeout: Option<f32>,

    #[serde(default = "default_throttle")]
    pub throttle: Option<Throttle>,

    #[serde(default = "default_on_dl_error")]
    pub on_dl_error: OnError,

    #[serde(default = "default_on_scrap_error")]
    pub on_scrap_error: OnError,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            user_agent: default_user_agent(),
            timeout: None,
            throttle: default_throttle(),
            on_dl_error: default_on_dl_error(),
            on_scrap_error: default_on_scrap_error(),
        }
    }
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout
            .and_then(|secs| Duration::try_from_secs_f32(secs).ok())
    }
}

fn default_root_url() -> String {
    String::from("http://books.toscrape.com/")
}

fn default_user_agent() -> String {
    String::from("SHELFbot")
}

fn default_throttle() -> Option<Throttle> {
    Some(Throttle::default())
}

fn default_on_dl_error() -> OnError {
    OnError::SkipAndLog
}

fn default_on_scrap_error() -> OnError {
    OnError::SkipAndLog
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OnError {
    Fail,
    SkipAndLog,
}

/// Pause between two successive pages of the same category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Throttle {
    /// The number of pages per second
    PerSecond(NonZeroUsize),
    /// The delay in seconds between pages
    Delay(f32),
}

impl Default for Throttle {
    fn default() -> Self {
        Self::Delay(0.5)
    }
}

impl Throttle {
    pub fn pause(&self) -> Duration {
        match self {
            Self::PerSecond(n) => Duration::from_secs_f64(1.0 / n.get() as f64),
            Self::Delay(secs) => Duration::try_from_secs_f32(*secs).unwrap_or_default(),
        }
    }
}
