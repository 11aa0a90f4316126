// src/config/cli.rs
use clap::Parser;
use std::path::PathBuf;

/// Command line flags. Every flag can also come from the environment; unset
/// values fall through to the config file and then to built-in defaults.
#[derive(Debug, Default, Parser)]
#[command(
    name = "quiet-news",
    version,
    about = "Serve a quiet front page of top stories"
)]
pub struct Cli {
    /// The port to start the web server on
    #[arg(long, env = "QUIET_NEWS_PORT")]
    pub port: Option<u16>,

    /// The number of top stories to display
    #[arg(long = "num_stories", visible_alias = "num-stories", env = "QUIET_NEWS_NUM_STORIES")]
    pub num_stories: Option<usize>,

    /// Seconds between cache refreshes
    #[arg(long, env = "QUIET_NEWS_REFRESH_SECS")]
    pub refresh_secs: Option<u64>,

    /// Maximum concurrent item lookups per batch
    #[arg(long, env = "QUIET_NEWS_MAX_IN_FLIGHT")]
    pub max_in_flight: Option<usize>,

    /// Base url of the item feed API
    #[arg(long, env = "QUIET_NEWS_API_BASE")]
    pub api_base: Option<String>,

    /// Path to a TOML config file
    #[arg(long, env = "QUIET_NEWS_CONFIG")]
    pub config: Option<PathBuf>,
}
