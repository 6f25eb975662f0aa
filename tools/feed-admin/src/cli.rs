//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use feed_aggregation::{Address, EntryFilter, FeedConfig, FeedError, DEFAULT_CACHE_SIZE};

/// Feed-Admin: page a feed out of a post ledger
#[derive(Parser, Debug, Clone)]
#[command(name = "feed-admin")]
#[command(about = "Page a feed out of a post ledger and a metadata store")]
pub struct Args {
    /// Ledger file (JSON array of entries)
    #[arg(short, long, env = "FEED_LEDGER")]
    pub ledger: PathBuf,

    /// Directory of `<content id>.json` metadata files
    #[arg(
        short,
        long,
        env = "FEED_STORE",
        conflicts_with = "gateway",
        required_unless_present = "gateway"
    )]
    pub store: Option<PathBuf>,

    /// HTTP content gateway base URL
    #[arg(short, long, env = "FEED_GATEWAY")]
    pub gateway: Option<String>,

    /// Only show posts by this address (0x-prefixed hex)
    #[arg(short, long)]
    pub author: Option<String>,

    /// Maximum number of pages to load (0 = until the end of data)
    #[arg(short, long, default_value_t = 0)]
    pub pages: u32,

    /// Entries per page (overrides the config file)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Feed config file (JSON)
    #[arg(short, long, env = "FEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print items as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Resolved records kept in memory
    #[arg(long, default_value_t = DEFAULT_CACHE_SIZE)]
    pub cache_size: usize,

    /// Dump Prometheus metrics to stderr when done
    #[arg(long)]
    pub metrics: bool,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Where metadata records are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Local directory.
    Store(PathBuf),
    /// HTTP gateway.
    Gateway(String),
}

impl Args {
    /// Session filter selected by `--author`.
    pub fn filter(&self) -> Result<EntryFilter, FeedError> {
        match &self.author {
            Some(author) => Ok(EntryFilter::Author(Address::from_hex(author)?)),
            None => Ok(EntryFilter::All),
        }
    }

    /// Feed config: file (or defaults) with command-line overrides applied.
    pub fn feed_config(&self) -> Result<FeedConfig, FeedError> {
        let mut config = match &self.config {
            Some(path) => FeedConfig::from_json_file(path)?,
            None => FeedConfig::default(),
        };
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        config.validate()?;
        Ok(config)
    }

    /// Selected content source.
    pub fn content_source(&self) -> ContentSource {
        match (&self.store, &self.gateway) {
            (Some(store), _) => ContentSource::Store(store.clone()),
            (None, Some(gateway)) => ContentSource::Gateway(gateway.clone()),
            // clap requires one of the two
            (None, None) => ContentSource::Store(PathBuf::from(".")),
        }
    }
}
