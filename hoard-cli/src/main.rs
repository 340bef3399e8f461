mod cli;
mod error;
mod utils;

use std::process;
use std::time::Duration;

use clap::Parser;
use hoard_engine::{
    DownloadOptions, DownloadResult, DownloaderConfig, HlsConfig, HlsDownloader, ProxyConfig,
    RetryPolicy,
};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::cli::Args;
use crate::error::{AppError, Result};
use crate::utils::parse_headers;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let json = args.json;

    if let Err(e) = init_logging(args.verbose, args.quiet) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    if let Err(e) = run(args).await {
        if json {
            let error_json = serde_json::json!({
                "status": "error",
                "message": e.to_string(),
            });
            println!("{error_json}");
        } else {
            error!("Download failed: {e}");
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let downloader = HlsDownloader::new(build_config(&args))?;

    let session_name = args
        .name
        .clone()
        .unwrap_or_else(|| format!("hoard-{}", chrono::Local::now().format("%Y%m%d-%H%M%S")));

    let token = CancellationToken::new();
    let progress = progress_bar(args.json || args.quiet);
    let bar = progress.clone();

    let options = DownloadOptions::new(&args.url, &args.output_dir, &session_name)
        .with_headers(parse_headers(&args.headers)?)
        .with_cancellation(token.clone())
        .with_progress(move |completed, total| {
            bar.set_length(total as u64);
            bar.set_position(completed as u64);
        });

    info!(url = %args.url, directory = %options.session_directory().display(), "Starting download");

    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling download");
            ctrl_c_token.cancel();
        }
    });

    let result = downloader.download(options).await;
    match &result {
        Ok(_) => progress.finish_with_message("done"),
        Err(_) => progress.abandon(),
    }
    print_result(&result?, args.json)
}

fn build_config(args: &Args) -> HlsConfig {
    let mut http = DownloaderConfig::builder()
        .with_read_timeout(Duration::from_secs(args.timeout))
        .with_system_proxy(!args.no_system_proxy)
        .with_danger_accept_invalid_certs(args.insecure);

    if let Some(user_agent) = &args.user_agent {
        http = http.with_user_agent(user_agent);
    }

    if let Some(url) = &args.proxy {
        let mut proxy = ProxyConfig::new(url, args.proxy_type);
        if let Some(username) = &args.proxy_username {
            proxy = proxy.with_auth(username, args.proxy_password.as_deref().unwrap_or_default());
        }
        http = http.with_proxy(proxy);
    }

    HlsConfig {
        base: http.build(),
        ..HlsConfig::default()
    }
    .with_max_nesting_depth(args.max_depth)
    .with_download_concurrency(args.concurrency)
    .with_segment_retry(RetryPolicy::default().with_max_retries(args.retries))
    .with_cleanup_on_failure(!args.keep_partial)
}

fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.yellow} [{elapsed_precise}] [{bar:30.yellow/white}] {pos}/{len} segments {msg}",
    ) {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn print_result(result: &DownloadResult, json: bool) -> Result<()> {
    if json {
        let output = serde_json::json!({
            "status": "ok",
            "result": result,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Playlist: {}", result.playlist_path.display());
        println!("Segments: {}", result.segment_count);
        println!("Size:     {} bytes", result.total_bytes);
    }
    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(verbose)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| AppError::InvalidInput(format!("Failed to initialize logging: {e}")))?;
    Ok(())
}
