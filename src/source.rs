// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Host collaborator seam: latest build number and build/test-result enumeration for one job
// role: io/source
// inputs: jobs root + job name (file-backed) or an in-memory record list
// outputs: BuildRecord lists, most-recent-first, optionally truncated
// side_effects: Reads <jobs_root>/<job>/builds.json
// invariants:
// - enumeration is ordered by descending build number with duplicates removed
// - latest_build_number includes builds still running; latest_finished_build_number does not
// - a job without builds.json has no builds
// errors: unreadable or malformed builds.json surfaces with the file path
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::model::{BuildNumber, BuildRecord};

pub const BUILDS_FILE: &str = "builds.json";

pub trait BuildSource {
  /// Number of the newest build, finished or not.
  fn latest_build_number(&self) -> Result<Option<BuildNumber>>;

  /// Number of the newest build that is no longer running.
  fn latest_finished_build_number(&self) -> Result<Option<BuildNumber>>;

  /// Builds most-recent-first; `limit` caps how many are returned.
  fn enumerate_builds(&self, limit: Option<usize>) -> Result<Vec<BuildRecord>>;
}

fn most_recent_first(mut records: Vec<BuildRecord>, limit: Option<usize>) -> Vec<BuildRecord> {
  records.sort_by(|a, b| b.number.cmp(&a.number));
  records.dedup_by_key(|r| r.number);
  if let Some(n) = limit {
    records.truncate(n);
  }
  records
}

/// A job stored on disk as `<jobs_root>/<job>/builds.json`.
#[derive(Debug, Clone)]
pub struct JobDirectory {
  name: String,
  dir: PathBuf,
}

impl JobDirectory {
  pub fn new(jobs_root: &Path, job: &str) -> Result<Self> {
    if job.is_empty() || job == "." || job == ".." || job.contains(['/', '\\']) {
      bail!("invalid job name {job:?}");
    }
    Ok(Self { name: job.to_string(), dir: jobs_root.join(job) })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn load(&self) -> Result<Vec<BuildRecord>> {
    let path = self.dir.join(BUILDS_FILE);
    if !path.exists() {
      return Ok(Vec::new());
    }
    let raw = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path.display()))
  }
}

impl BuildSource for JobDirectory {
  fn latest_build_number(&self) -> Result<Option<BuildNumber>> {
    Ok(self.load()?.iter().map(|r| r.number).max())
  }

  fn latest_finished_build_number(&self) -> Result<Option<BuildNumber>> {
    Ok(self.load()?.iter().filter(|r| !r.building).map(|r| r.number).max())
  }

  fn enumerate_builds(&self, limit: Option<usize>) -> Result<Vec<BuildRecord>> {
    Ok(most_recent_first(self.load()?, limit))
  }
}

/// Fixed, in-memory build history.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
  records: Vec<BuildRecord>,
}

impl StaticSource {
  pub fn new(records: Vec<BuildRecord>) -> Self {
    Self { records }
  }

  pub fn push(&mut self, record: BuildRecord) {
    self.records.push(record);
  }

  /// Mark build `number` as no longer running.
  pub fn finish(&mut self, number: BuildNumber) {
    for record in self.records.iter_mut().filter(|r| r.number == number) {
      record.building = false;
    }
  }
}

impl BuildSource for StaticSource {
  fn latest_build_number(&self) -> Result<Option<BuildNumber>> {
    Ok(self.records.iter().map(|r| r.number).max())
  }

  fn latest_finished_build_number(&self) -> Result<Option<BuildNumber>> {
    Ok(self.records.iter().filter(|r| !r.building).map(|r| r.number).max())
  }

  fn enumerate_builds(&self, limit: Option<usize>) -> Result<Vec<BuildRecord>> {
    Ok(most_recent_first(self.records.clone(), limit))
  }
}
