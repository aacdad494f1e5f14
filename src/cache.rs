// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Single-slot, per-job cache of the serialized result tree, valid until a newer build appears
// role: persistence/cache
// inputs: cache file path; latest known build number; serializable document carrying `lastBuild`
// outputs: stored bytes verbatim; staleness verdict
// side_effects: Creates the parent directory; replaces or removes the cache file
// invariants:
// - zero-length or missing file means "no cache"
// - is_stale(n) is true iff the stored lastBuild != n
// - write is one temp-file-then-rename, so readers never see a partial document
// errors: CacheError::Io surfaced with path; CacheError::Parse when the stored payload lacks an integer lastBuild
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::CacheError;

pub const CACHE_FILE: &str = "cache.json";

/// The only field of the stored document the cache itself interprets.
#[derive(Debug, Deserialize)]
struct Stamp {
  #[serde(rename = "lastBuild")]
  last_build: i64,
}

#[derive(Debug, Clone)]
pub struct Cache {
  path: PathBuf,
}

impl Cache {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Cache living at `<job_dir>/cache.json`.
  pub fn for_job(job_dir: &Path) -> Self {
    Self::new(job_dir.join(CACHE_FILE))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Missing or zero-length. Any other metadata failure reports a non-empty cache so the
  /// following `is_stale`/`read` surfaces the I/O error instead of silently recomputing.
  pub fn is_empty(&self) -> bool {
    match fs::metadata(&self.path) {
      Ok(meta) => meta.len() == 0,
      Err(e) => e.kind() == ErrorKind::NotFound,
    }
  }

  /// The `lastBuild` recorded in the stored document.
  pub fn stored_last_build(&self) -> Result<i64, CacheError> {
    let bytes = self.read_bytes()?;
    let stamp: Stamp =
      serde_json::from_slice(&bytes).map_err(|source| CacheError::Parse { path: self.path.clone(), source })?;
    Ok(stamp.last_build)
  }

  /// True when the stored document was computed against a build other than `latest`.
  ///
  /// Callers check `is_empty()` first; an empty file does not parse and yields `CacheError::Parse`.
  pub fn is_stale(&self, latest: i64) -> Result<bool, CacheError> {
    let stored = self.stored_last_build()?;
    debug!(path = %self.path.display(), stored, latest, "cache staleness check");
    Ok(stored != latest)
  }

  /// Stored payload, verbatim.
  pub fn read(&self) -> Result<String, CacheError> {
    fs::read_to_string(&self.path).map_err(|source| CacheError::Io { path: self.path.clone(), source })
  }

  /// Replace the stored document in one step (temp file in the same directory, then rename).
  pub fn write<T: Serialize + ?Sized>(&self, document: &T) -> Result<(), CacheError> {
    let bytes = serde_json::to_vec(document).map_err(CacheError::Serialize)?;
    let dir = match self.path.parent() {
      Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
      _ => PathBuf::from("."),
    };
    let io_err = |source| CacheError::Io { path: self.path.clone(), source };

    fs::create_dir_all(&dir).map_err(io_err)?;
    let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
    tmp.write_all(&bytes).map_err(io_err)?;
    tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

    debug!(path = %self.path.display(), bytes = bytes.len(), "cache written");
    Ok(())
  }

  /// Remove the backing file. Clearing an absent cache is not an error.
  pub fn clear(&self) -> Result<(), CacheError> {
    match fs::remove_file(&self.path) {
      Ok(()) => {
        info!(path = %self.path.display(), "cache was deleted");
        Ok(())
      }
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(source) => Err(CacheError::Io { path: self.path.clone(), source }),
    }
  }

  fn read_bytes(&self) -> Result<Vec<u8>, CacheError> {
    fs::read(&self.path).map_err(|source| CacheError::Io { path: self.path.clone(), source })
  }
}
