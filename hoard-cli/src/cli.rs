use std::path::PathBuf;

use clap::Parser;
use hoard_engine::ProxyType;
use hoard_engine::hls::DEFAULT_MAX_NESTING_DEPTH;

#[derive(Parser, Debug)]
#[command(author, version, about = "Download an HLS stream into a self-contained local playlist", long_about = None)]
pub struct Args {
    /// Master or media manifest URL
    pub url: String,

    /// Directory the session folder is created in
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Session folder name (defaults to `hoard-<timestamp>`)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Extra request header, `Name: Value` (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Segments downloaded at once
    #[arg(short, long, default_value_t = 1)]
    pub concurrency: usize,

    /// Rendition hops followed before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_NESTING_DEPTH)]
    pub max_depth: usize,

    /// Retries per segment on transient failures
    #[arg(short, long, default_value_t = 0)]
    pub retries: u32,

    /// Read timeout in seconds (0 disables it)
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    #[arg(long, env = "HOARD_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Proxy URL
    #[arg(long)]
    pub proxy: Option<String>,

    #[arg(long, value_enum, default_value = "http", requires = "proxy")]
    pub proxy_type: ProxyType,

    #[arg(long, requires = "proxy")]
    pub proxy_username: Option<String>,

    #[arg(long, requires = "proxy_username")]
    pub proxy_password: Option<String>,

    /// Ignore HTTP(S)_PROXY and related environment variables
    #[arg(long)]
    pub no_system_proxy: bool,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Keep downloaded files when the download fails
    #[arg(long)]
    pub keep_partial: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}
