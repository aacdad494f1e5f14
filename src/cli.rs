use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{GlobalConfig, UserConfig};
use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "test-results-analyzer",
    version,
    about = "Per-build test result matrix for a job: cached JSON tree or CSV export",
    long_about = None
)]
pub struct Cli {
  /// Directory holding one subdirectory per job
  #[arg(long, default_value = ".", global = true)]
  pub jobs_root: PathBuf,

  /// Job name (a subdirectory of --jobs-root containing builds.json)
  #[arg(long, global = true)]
  pub job: Option<String>,

  /// Global settings file (JSON); defaults apply when omitted
  #[arg(long, global = true)]
  pub config: Option<PathBuf>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
  /// Print the JSON tree, recomputing and caching it when the job has a newer build
  Data(Selection),
  /// Recompute the JSON tree and replace the cache
  Recompute(Selection),
  /// Delete the job's cache file
  ClearCache,
  /// Export the matrix as CSV
  ExportCsv {
    #[command(flatten)]
    selection: Selection,
    /// Cells hold durations in seconds instead of statuses
    #[arg(long)]
    time_based: bool,
  },
  /// Print the resolved build ids as a JSON array
  Builds(Selection),
  /// Report whether a cache exists and whether it is stale
  CacheStatus,
}

#[derive(Args, Debug, Clone, Default)]
pub struct Selection {
  /// Number of most recent builds to include; non-numeric or <= 0 means all
  #[arg(long, allow_hyphen_values = true)]
  pub builds: Option<String>,

  /// Build filter, e.g. "1-10,!5,12"
  #[arg(long, default_value = "")]
  pub filter: String,

  /// Leave configuration methods (setUp/tearDown/...) out of the JSON tree
  #[arg(long)]
  pub hide_config_methods: bool,

  /// Output file path (default stdout "-")
  #[arg(long, default_value = "-")]
  pub out: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
  Data,
  Recompute,
  ClearCache,
  ExportCsv,
  Builds,
  CacheStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub jobs_root: String, // absolute path for stability
  pub job: String,
  pub action: Action,
  pub user: UserConfig,
  pub time_based: bool,
  pub out: String,
}

pub fn normalize(cli: Cli, global: &GlobalConfig) -> Result<EffectiveConfig> {
  let Some(job) = cli.job.clone() else {
    bail!("Provide --job <name>");
  };
  let Some(command) = cli.command else {
    bail!("Provide a subcommand: data | recompute | clear-cache | export-csv | builds | cache-status");
  };

  let (action, selection, time_based) = match command {
    Command::Data(s) => (Action::Data, s, false),
    Command::Recompute(s) => (Action::Recompute, s, false),
    Command::Builds(s) => (Action::Builds, s, false),
    Command::ExportCsv { selection, time_based } => (Action::ExportCsv, selection, time_based),
    Command::ClearCache => (Action::ClearCache, Selection::default(), false),
    Command::CacheStatus => (Action::CacheStatus, Selection::default(), false),
  };

  let mut user = UserConfig::from_global(global);
  if let Some(builds) = selection.builds {
    user.no_of_builds_needed = builds;
  }
  user.hide_config_methods |= selection.hide_config_methods;
  user.build_filter = selection.filter;

  Ok(EffectiveConfig {
    jobs_root: util::canonicalize_lossy(&cli.jobs_root),
    job,
    action,
    user,
    time_based,
    out: if selection.out.is_empty() { "-".into() } else { selection.out },
  })
}
