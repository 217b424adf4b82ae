mod config;
mod local;
mod run;
mod server;
#[cfg(test)]
mod testing;
mod trigger;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use shelf_crawler::{CrawlerConfig, Fetcher, HttpFetcher, ListingPage, OnError, Throttle};
use shelf_dataset::{encode_records, LocalStore};
use tokio::runtime;
use url::Url;

use crate::config::AppConfig;

const LOG_FILTER: &str = "shelf=info,shelf_crawler=info,shelf_dataset=info";

/// Books catalog crawler and dataset cleaner
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    Crawl(CrawlArgs),
    Clean(CleanArgs),
    Extract(ExtractArgs),
    Serve(ServeArgs),
    #[command(hide = true)]
    Completion,
}

#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Optional yaml configuration file
    #[arg(env = "SHELF_CONFIG", long)]
    pub config: Option<PathBuf>,
    /// When quiet no logs are outputted
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Debug, clap::Args)]
pub struct CrawlerArgs {
    /// Override crawler's catalog root url
    #[arg(long)]
    pub root_url: Option<String>,
    /// Override crawler's user agent
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Override crawler's request timeout in seconds
    #[arg(long)]
    pub timeout: Option<f32>,
    /// Override crawler's delay in seconds between two pages of a category, 0 disables it
    #[arg(long)]
    pub delay: Option<f32>,
    /// Override crawler's download error handling strategy
    #[arg(value_enum, long)]
    pub on_dl_error: Option<OnError>,
    /// Override crawler's scrap error handling strategy
    #[arg(value_enum, long)]
    pub on_scrap_error: Option<OnError>,
}

impl CrawlerArgs {
    fn apply(&self, conf: &mut CrawlerConfig) {
        if let Some(root_url) = &self.root_url {
            conf.root_url = root_url.to_string();
        }
        if let Some(user_agent) = &self.user_agent {
            conf.user_agent = user_agent.to_string();
        }
        if let Some(timeout) = self.timeout {
            conf.timeout = Some(timeout);
        }
        if let Some(delay) = self.delay {
            conf.throttle = (delay > 0.0).then_some(Throttle::Delay(delay));
        }
        if let Some(on_dl_error) = self.on_dl_error {
            conf.on_dl_error = on_dl_error;
        }
        if let Some(on_scrap_error) = self.on_scrap_error {
            conf.on_scrap_error = on_scrap_error;
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////

/// Crawl the catalog into the raw dataset file
#[derive(Debug, clap::Args)]
pub struct CrawlArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    #[command(flatten)]
    pub crawler: CrawlerArgs,
    /// Override the raw dataset file
    #[arg(long, short)]
    pub output: Option<String>,
}

impl TryFrom<&CrawlArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CrawlArgs) -> Result<Self, Self::Error> {
        let mut conf = AppConfig::load(args.config.config.as_deref())?;
        args.crawler.apply(&mut conf.crawler);
        if let Some(output) = &args.output {
            conf.local.raw_file = output.to_string();
        }
        Ok(conf)
    }
}

pub fn crawl(args: CrawlArgs) -> anyhow::Result<()> {
    let conf = AppConfig::try_from(&args)?;
    let fetcher = HttpFetcher::new(&conf.crawler)?;
    let rt = runtime::Builder::new_current_thread().enable_all().build()?;
    rt.block_on(local::crawl_local(&conf, &fetcher, &LocalStore::default()))
}

/// Clean the raw dataset file into the cleaned dataset file
#[derive(Debug, clap::Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Override the raw dataset file
    #[arg(long, short)]
    pub source: Option<String>,
    /// Override the cleaned dataset file
    #[arg(long, short)]
    pub output: Option<String>,
}

impl TryFrom<&CleanArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CleanArgs) -> Result<Self, Self::Error> {
        let mut conf = AppConfig::load(args.config.config.as_deref())?;
        if let Some(source) = &args.source {
            conf.local.raw_file = source.to_string();
        }
        if let Some(output) = &args.output {
            conf.local.cleaned_file = output.to_string();
        }
        Ok(conf)
    }
}

pub fn clean(args: CleanArgs) -> anyhow::Result<()> {
    let conf = AppConfig::try_from(&args)?;
    let rt = runtime::Builder::new_current_thread().enable_all().build()?;
    let reply = rt.block_on(local::clean_local(&conf, &LocalStore::default()));
    println!(
        "Local execution result: {} (Status Code: {})",
        reply.body, reply.status
    );
    if reply.status != 200 {
        process::exit(1);
    }
    Ok(())
}

/// Extract the items of a single listing page and print them as csv to stdout
#[derive(Debug, clap::Args)]
#[command(group = clap::ArgGroup::new("page").required(true))]
pub struct ExtractArgs {
    /// A local html page to extract
    #[arg(group = "page", long)]
    pub file: Option<PathBuf>,
    /// A distant html page to extract
    #[arg(group = "page", long)]
    pub url: Option<String>,
    /// Category given to the extracted records
    #[arg(long, default_value = "Unknown")]
    pub category: String,
    /// Custom user agent to download the page
    #[arg(long, conflicts_with = "file")]
    pub ua: Option<String>,
}

pub fn extract(args: ExtractArgs) -> anyhow::Result<()> {
    let (page, url) = if let Some(url) = args.url {
        let url = Url::parse(&url)?;
        let mut conf = CrawlerConfig::default();
        if let Some(ua) = args.ua {
            conf.user_agent = ua;
        }
        let fetcher = HttpFetcher::new(&conf)?;
        let rt = runtime::Builder::new_current_thread().enable_all().build()?;
        let page = rt.block_on(fetcher.fetch(&url))?;
        (page, url)
    } else if let Some(path) = args.file {
        let page = fs_err::read_to_string(&path)?;
        let path = fs_err::canonicalize(&path)?;
        let url = Url::from_file_path(&path)
            .map_err(|_| anyhow::anyhow!("Invalid page path {}", path.display()))?;
        (page, url)
    } else {
        anyhow::bail!("Missing `url` or `file`");
    };

    let page = ListingPage::parse(url, 1, &page, &args.category);
    let records = page
        .tiles
        .into_iter()
        .filter_map(|tile| match tile {
            Ok(record) => Some(record),
            Err(skip) => {
                log::warn!("Skipping an item: {}. Item HTML: {}", skip.reason, skip.fragment);
                None
            }
        })
        .collect::<Vec<_>>();
    if let Some(next) = &page.next {
        log::info!("Next page: {next}");
    }

    let csv = encode_records(&records, &Default::default())?;
    io::stdout().write_all(&csv)?;
    Ok(())
}

/// Serve the crawl and clean runs over http
#[derive(Debug, clap::Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    #[command(flatten)]
    pub crawler: CrawlerArgs,
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: String,
    /// Override the bucket receiving the raw dataset
    #[arg(long)]
    pub bucket: Option<String>,
    /// Override the storage api endpoint
    #[arg(long)]
    pub storage_endpoint: Option<String>,
    /// Bearer token for the storage api
    #[arg(env = "SHELF_GCS_TOKEN", hide_env_values = true, long)]
    pub gcs_token: Option<String>,
}

impl TryFrom<&ServeArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: &ServeArgs) -> Result<Self, Self::Error> {
        let mut conf = AppConfig::load(args.config.config.as_deref())?;
        args.crawler.apply(&mut conf.crawler);
        if let Some(bucket) = &args.bucket {
            conf.storage.bucket = Some(bucket.to_string());
        }
        if let Some(endpoint) = &args.storage_endpoint {
            conf.storage.endpoint = endpoint.to_string();
        }
        if let Some(token) = &args.gcs_token {
            conf.storage.token = Some(token.to_string());
        }
        Ok(conf)
    }
}

pub fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let conf = AppConfig::try_from(&args)?;
    server::serve(conf, &args.bind)
}

fn init_logger(quiet: bool, filter: &str) {
    if !quiet {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.cmd {
        SubCommand::Crawl(args) => {
            init_logger(args.config.quiet, LOG_FILTER);
            crawl(args)
        }
        SubCommand::Clean(args) => {
            init_logger(args.config.quiet, LOG_FILTER);
            clean(args)
        }
        SubCommand::Extract(args) => {
            init_logger(false, "shelf=info,shelf_crawler=warn");
            extract(args)
        }
        SubCommand::Serve(args) => {
            init_logger(args.config.quiet, LOG_FILTER);
            serve(args)
        }
        SubCommand::Completion => {
            generate(Shell::Bash, &mut Args::command(), "shelf", &mut io::stdout());
            Ok(())
        }
    }
}
