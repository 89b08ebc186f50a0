//! Command-line front end for Relist.
//!
//! Argument parsing, configuration loading and target parsing live here so
//! the `relist` binary stays a thin wrapper.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use relist_plan::PlanError;
use relist_sync::{ContainerStore, ContainerSummary, ReconcileConfig, ReconcileError, Reconciler, YouTubeConfig};
use relist_types::{ContainerId, Sequence, TargetOrder};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Exit code for internal invariant violations.
pub const EXIT_INVARIANT: u8 = 2;
/// Exit code for every other failure.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "relist")]
#[command(about = "Reorder a remote playlist into a target order")]
pub struct Args {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// OAuth access token for the YouTube Data API
    #[arg(long, env = "RELIST_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub access_token: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the playlists of a channel, or of the authenticated account
    Playlists {
        /// Channel id; defaults to the account the token belongs to
        #[arg(long)]
        channel: Option<String>,
    },

    /// Print the playlist in its current order
    List {
        /// Playlist id
        playlist: String,
    },

    /// Print the operations needed to reach the target, changing nothing
    Plan {
        /// Playlist id
        playlist: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reorder the playlist into the target order
    Apply {
        /// Playlist id
        playlist: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Skip re-listing the playlist after the commit
        #[arg(long)]
        no_verify: bool,

        /// Plan and simulate only
        #[arg(long)]
        dry_run: bool,
    },
}

/// Where the target order comes from.
#[derive(ClapArgs, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Comma-separated content ids, in target order
    #[arg(long)]
    pub target: Option<String>,

    /// File with one content id per line
    #[arg(long)]
    pub target_file: Option<PathBuf>,
}

impl TargetArgs {
    /// Reads the target order from the flag or the file.
    pub fn load(&self) -> Result<TargetOrder> {
        match (&self.target, &self.target_file) {
            (Some(inline), _) => Ok(parse_target(inline)),
            (None, Some(path)) => load_target_file(path),
            (None, None) => anyhow::bail!("no target given: pass --target or --target-file"),
        }
    }
}

/// Parses a target order.
///
/// Content ids are separated by newlines or commas. Everything after a `#`
/// on a line is a comment; blank entries are skipped.
pub fn parse_target(text: &str) -> TargetOrder {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect()
}

/// Reads and parses a target file.
pub fn load_target_file(path: &Path) -> Result<TargetOrder> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read target file {}", path.display()))?;
    let target = parse_target(&text);
    debug!("Loaded {} target id(s) from {:?}", target.len(), path);
    Ok(target)
}

/// Settings read from the `--config` file. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub youtube: YouTubeConfig,
    pub reconcile: ReconcileConfig,
}

impl CliConfig {
    /// Loads the configuration file, or the defaults when none is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        info!("Loading configuration from {:?}", path);
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Runs one command against `store` and returns what should be printed.
pub async fn run(
    command: &Command,
    store: Arc<dyn ContainerStore>,
    config: ReconcileConfig,
) -> Result<String> {
    match command {
        Command::Playlists { channel } => {
            let summaries = store.containers(channel.as_deref()).await?;
            Ok(render_playlists(&summaries))
        }
        Command::List { playlist } => {
            let reconciler = Reconciler::new(store, config);
            let current = reconciler.fetch(&ContainerId::from(playlist.as_str())).await?;
            Ok(render_listing(&current))
        }
        Command::Plan {
            playlist,
            target,
            json,
        } => {
            let target = target.load()?;
            let reconciler = Reconciler::new(store, config);
            let (_, plan) = reconciler
                .plan(&ContainerId::from(playlist.as_str()), &target)
                .await?;
            if *json {
                let mut out = serde_json::to_string_pretty(&plan)?;
                out.push('\n');
                Ok(out)
            } else {
                Ok(plan.to_string())
            }
        }
        Command::Apply {
            playlist,
            target,
            no_verify,
            dry_run,
        } => {
            let target = target.load()?;
            let config = ReconcileConfig {
                dry_run: config.dry_run || *dry_run,
                verify: config.verify && !*no_verify,
            };
            let outcome = Reconciler::new(store, config)
                .reconcile(&ContainerId::from(playlist.as_str()), &target)
                .await?;

            let mut out = outcome.plan.to_string();
            match &outcome.committed {
                None => writeln!(out, "dry run: no changes made")?,
                Some(report) => writeln!(
                    out,
                    "applied {} delete(s), {} insert(s), {} move(s)",
                    report.deleted, report.inserted, report.moved
                )?,
            }
            if outcome.verified {
                writeln!(out, "verified: {} item(s) in target order", outcome.final_order.len())?;
            }
            Ok(out)
        }
    }
}

/// One line per entry: position, content id, slot id and title.
pub fn render_listing(current: &Sequence) -> String {
    current
        .entries()
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            format!(
                "{position}\t{}\t{}\t{}\n",
                entry.content_id, entry.slot_id, entry.title
            )
        })
        .collect()
}

/// One line per playlist: id, item count and title.
pub fn render_playlists(summaries: &[ContainerSummary]) -> String {
    summaries
        .iter()
        .map(|s| format!("{}\t{}\t{}\n", s.container_id, s.item_count, s.title))
        .collect()
}

/// Maps a failure to the process exit code.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let invariant = err
        .downcast_ref::<ReconcileError>()
        .map(ReconcileError::is_invariant_violation)
        .or_else(|| err.downcast_ref::<PlanError>().map(PlanError::is_invariant_violation))
        .unwrap_or(false);
    if invariant { EXIT_INVARIANT } else { EXIT_FAILURE }
}
