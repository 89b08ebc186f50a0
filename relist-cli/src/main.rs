//! Relist command-line tool
//!
//! Reorders a YouTube playlist into a target order with as few deletes and
//! inserts as possible, keeping every existing entry that can be kept.
//!
//! Usage:
//!   relist playlists [--channel CHANNEL_ID]
//!   relist list PLAYLIST_ID
//!   relist plan PLAYLIST_ID --target id1,id2,id3
//!   relist apply PLAYLIST_ID --target-file order.txt
//!
//! The access token comes from `--access-token` or `RELIST_ACCESS_TOKEN`.

use anyhow::{Context, Result};
use clap::Parser;
use relist_cli::{exit_code, run, Args, CliConfig};
use relist_sync::YouTubeStore;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match execute(args).await {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn execute(args: Args) -> Result<String> {
    let config = CliConfig::load(args.config.as_deref())?;

    let store = YouTubeStore::new(config.youtube.clone()).context("Failed to create YouTube client")?;
    let token = args
        .access_token
        .context("No access token: pass --access-token or set RELIST_ACCESS_TOKEN")?;
    store.set_access_token(token).await;

    info!("Relist using {}", config.youtube.api_base_url);
    run(&args.command, Arc::new(store), config.reconcile).await
}
