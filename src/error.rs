// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed errors for the cache layer (I/O vs malformed stored payload)
// role: errors
// outputs: CacheError with the offending path attached
// invariants: Io is transient and surfaced; Parse means the stored payload cannot be trusted (callers treat as stale)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
  /// Reading, writing or removing the cache file failed.
  #[error("cache I/O error at {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The stored payload is not a JSON object carrying an integer `lastBuild`.
  #[error("malformed cache payload at {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  /// The document handed to `write` could not be serialized.
  #[error("failed to serialize cache payload: {0}")]
  Serialize(#[source] serde_json::Error),
}

impl CacheError {
  /// True for payload corruption, which callers recover from by recomputing.
  pub fn is_malformed(&self) -> bool {
    matches!(self, CacheError::Parse { .. })
  }
}
