use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::info_span;
use tracing_subscriber::EnvFilter;

use test_results_analyzer::cli::{normalize, Action, Cli, EffectiveConfig};
use test_results_analyzer::{util, Analyzer, BuildSource, Cache, GlobalConfig, JobDirectory};

/// Log filter directives, e.g. `TRA_LOG=test_results_analyzer=debug`.
const LOG_ENV: &str = "TRA_LOG";

fn init_tracing() {
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .try_init();
}

fn main() -> Result<()> {
  init_tracing();
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: settings + CLI normalization
  let global = GlobalConfig::load(cli.config.as_deref())?;
  let cfg = normalize(cli, &global)?;

  // Phase 2: bind the job directory and its cache
  let job = JobDirectory::new(Path::new(&cfg.jobs_root), &cfg.job)?;
  let _span = info_span!("job", job = %job.name()).entered();
  let cache = Cache::for_job(job.dir());
  let mut analyzer = Analyzer::new(job, cache, global);

  // Phase 3: run the requested operation
  run(&cfg, &mut analyzer)
}

fn run<S: BuildSource>(cfg: &EffectiveConfig, analyzer: &mut Analyzer<S>) -> Result<()> {
  match cfg.action {
    Action::Data => {
      let doc = analyzer.cached_or_computed(&cfg.user)?;
      emit(&cfg.out, &doc)
    }
    Action::Recompute => {
      let doc = analyzer.force_recompute(&cfg.user)?;
      emit(&cfg.out, &doc)
    }
    Action::ClearCache => analyzer.clear_cache(),
    Action::ExportCsv => {
      let csv = analyzer.export_csv(cfg.time_based, &cfg.user.no_of_builds_needed, &cfg.user)?;
      emit(&cfg.out, &csv)
    }
    Action::Builds => {
      let ids = analyzer.resolve_build_ids(&cfg.user.no_of_builds_needed, &cfg.user.build_filter)?;
      emit(&cfg.out, &serde_json::to_string(&ids)?)
    }
    Action::CacheStatus => {
      let status = analyzer.cache_status()?;
      emit(&cfg.out, &serde_json::to_string_pretty(&status)?)
    }
  }
}

/// Print to stdout for "-", otherwise write the payload to `out` (creating parents).
fn emit(out: &str, payload: &str) -> Result<()> {
  if out == "-" {
    if payload.ends_with('\n') {
      print!("{}", payload);
    } else {
      println!("{}", payload);
    }
    return Ok(());
  }
  let out_path = Path::new(out);
  if let Some(parent) = out_path.parent() {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(out_path, payload).with_context(|| format!("writing {}", out_path.display()))?;
  tracing::info!(path = %out_path.display(), bytes = payload.len(), "output written");
  Ok(())
}
