// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Per-job entry points: cached-or-computed JSON tree, forced recompute, cache clear, CSV export, build id resolution
// role: processing/orchestrator
// inputs: BuildSource (host), Cache, GlobalConfig; per-call UserConfig
// outputs: JSON tree text, CSV text, ordered build ids, cache status
// side_effects: Writes/removes the job's cache file; enumerates builds from the host
// invariants:
// - a cache hit returns the stored bytes without aggregating
// - a malformed cache is treated as stale; cache I/O errors surface
// - the known-build window only grows through refetch (override count) and is replaced wholesale on reload
// - the cached document's lastBuild is the newest finished build number (0 when none has finished)
// - the refetch override never exceeds what the largest request needed and never overflows
// errors: Host enumeration and cache I/O errors propagate with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::ResultAggregator;
use crate::cache::Cache;
use crate::config::{GlobalConfig, UserConfig};
use crate::error::CacheError;
use crate::export::{csv, json_tree};
use crate::model::{BuildNumber, ResultInfo};
use crate::selector::{self, parse_build_count};
use crate::source::BuildSource;

/// What `cache-status` reports about the stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
  pub path: String,
  pub present: bool,
  /// Newest finished build; the stored `lastBuild` is compared against it.
  pub latest_build: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_build: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub generated_at: Option<String>,
  /// `None` when there is nothing (parseable) to compare.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stale: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHeader {
  last_build: Option<i64>,
  generated_at: Option<String>,
}

pub struct Analyzer<S: BuildSource> {
  source: S,
  cache: Cache,
  global: GlobalConfig,
  info: Option<ResultInfo>,
  builds: Vec<BuildNumber>,
  override_fetch: usize,
}

impl<S: BuildSource> Analyzer<S> {
  pub fn new(source: S, cache: Cache, global: GlobalConfig) -> Self {
    Self { source, cache, global, info: None, builds: Vec::new(), override_fetch: 0 }
  }

  pub fn cache(&self) -> &Cache {
    &self.cache
  }

  pub fn global(&self) -> &GlobalConfig {
    &self.global
  }

  /// Finished builds currently aggregated, most-recent-first.
  pub fn known_builds(&self) -> &[BuildNumber] {
    &self.builds
  }

  /// JSON tree for `user`, served from the cache while it matches the newest finished build.
  pub fn cached_or_computed(&mut self, user: &UserConfig) -> Result<String> {
    let latest = self.latest_stamp()?;
    if !self.cache_is_fresh(latest)? {
      info!(latest, "updating cache");
      let tree = self.document(user, latest)?;
      self.cache.write(&tree)?;
    }
    debug!(path = %self.cache.path().display(), "loading cache");
    Ok(self.cache.read()?)
  }

  /// Re-aggregate from the host regardless of cache state, then replace the cache.
  pub fn force_recompute(&mut self, user: &UserConfig) -> Result<String> {
    self.load()?;
    let latest = self.latest_stamp()?;
    let tree = self.document(user, latest)?;
    self.cache.write(&tree)?;
    serde_json::to_string(&tree).context("serializing result tree")
  }

  pub fn clear_cache(&self) -> Result<()> {
    self.cache.clear()?;
    Ok(())
  }

  /// CSV over the builds selected by `no_of_builds_needed` and the user's filter.
  pub fn export_csv(&mut self, time_based: bool, no_of_builds_needed: &str, user: &UserConfig) -> Result<String> {
    let builds = self.resolve_build_ids(no_of_builds_needed, &user.build_filter)?;
    let empty = ResultInfo::new();
    let info = self.info.as_ref().unwrap_or(&empty);
    Ok(csv::export(&builds, info, time_based, &self.global.status_labels()))
  }

  /// Ordered build ids for a lenient count string and a filter expression.
  pub fn resolve_build_ids(&mut self, no_of_builds_needed: &str, build_filter: &str) -> Result<Vec<BuildNumber>> {
    self.ensure_loaded()?;
    let requested = parse_build_count(no_of_builds_needed);
    debug!(requested, filter = build_filter, known = self.builds.len(), "resolving build ids");
    let known = self.builds.clone();
    selector::resolve(requested, build_filter, &known, || self.refetch(requested))
  }

  pub fn cache_status(&self) -> Result<CacheStatus> {
    let latest = self.latest_stamp()?;
    let mut status = CacheStatus {
      path: self.cache.path().display().to_string(),
      present: !self.cache.is_empty(),
      latest_build: latest,
      last_build: None,
      generated_at: None,
      stale: None,
    };
    if status.present {
      let raw = self.cache.read()?;
      match serde_json::from_str::<StoredHeader>(&raw) {
        Ok(header) => {
          status.stale = header.last_build.map(|b| b != latest);
          status.last_build = header.last_build;
          status.generated_at = header.generated_at;
        }
        Err(e) => warn!(error = %e, "cache payload is malformed"),
      }
    }
    Ok(status)
  }

  /// Replace the aggregated state with a fresh pass over the host's builds.
  pub fn load(&mut self) -> Result<()> {
    let limit = self.runs_to_fetch();
    let records = self.source.enumerate_builds(limit).context("enumerating builds")?;
    info!(fetched = records.len(), ?limit, "builds fetched");
    let (info, builds) = ResultAggregator::from_builds(&records).into_parts();
    self.info = Some(info);
    self.builds = builds;
    Ok(())
  }

  fn ensure_loaded(&mut self) -> Result<()> {
    let outdated = match self.source.latest_finished_build_number()? {
      Some(latest) => !self.builds.contains(&latest),
      None => false,
    };
    if self.info.is_none() || outdated {
      self.load()?;
    }
    Ok(())
  }

  fn refetch(&mut self, requested: i64) -> Result<Vec<BuildNumber>> {
    let configured = self.global.no_of_runs_to_fetch;
    if configured > 0 {
      let needed = usize::try_from(requested).unwrap_or(usize::MAX).saturating_sub(configured);
      self.override_fetch = self.override_fetch.max(needed);
    }
    info!(override_fetch = self.override_fetch, "refetching builds");
    self.load()?;
    Ok(self.builds.clone())
  }

  /// `None` means every build; the override only grows a configured window.
  fn runs_to_fetch(&self) -> Option<usize> {
    match self.global.no_of_runs_to_fetch {
      0 => None,
      n => Some(n.saturating_add(self.override_fetch)),
    }
  }

  /// Builds still running contribute nothing, so only a newly finished build moves the stamp.
  fn latest_stamp(&self) -> Result<i64> {
    Ok(self.source.latest_finished_build_number()?.map_or(0, i64::from))
  }

  fn cache_is_fresh(&self, latest: i64) -> Result<bool, CacheError> {
    if self.cache.is_empty() {
      return Ok(false);
    }
    match self.cache.is_stale(latest) {
      Ok(stale) => Ok(!stale),
      Err(e) if e.is_malformed() => {
        warn!(error = %e, "discarding malformed cache");
        Ok(false)
      }
      Err(e) => Err(e),
    }
  }

  fn document(&mut self, user: &UserConfig, latest: i64) -> Result<json_tree::JsonTree> {
    let builds = self.resolve_build_ids(&user.no_of_builds_needed, &user.build_filter)?;
    let opts = json_tree::TreeOptions {
      hide_config_methods: user.hide_config_methods,
      thresholds: self.global.runtime_thresholds(),
    };
    let empty = ResultInfo::new();
    let mut tree = json_tree::export(&builds, self.info.as_ref().unwrap_or(&empty), &opts);
    tree.last_build = Some(latest);
    tree.generated_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    Ok(tree)
  }
}
