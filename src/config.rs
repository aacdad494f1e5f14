// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Global (per-installation) settings and per-call user settings passed explicitly into every operation
// role: config/types
// inputs: optional JSON settings file; CLI-provided per-call values
// outputs: GlobalConfig, UserConfig, StatusLabels, RuntimeThresholds
// invariants:
// - every GlobalConfig field has a default; a missing file means all defaults
// - status labels are the raw enum names unless useCustomStatusNames is set
// - runtime thresholds apply only when both parse as seconds and low <= high
// errors: unreadable or invalid settings files are reported with the file path
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::ResultStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalConfig {
  /// Default window size offered when the caller does not ask for one.
  pub no_of_builds: String,
  /// Builds to enumerate from the host per load; 0 means all.
  pub no_of_runs_to_fetch: usize,
  pub show_all_builds: bool,
  pub hide_configuration_methods: bool,
  pub use_custom_status_names: bool,
  pub passed_representation: String,
  pub failed_representation: String,
  pub skipped_representation: String,
  pub na_representation: String,
  pub run_time_low_threshold: String,
  pub run_time_high_threshold: String,
}

impl Default for GlobalConfig {
  fn default() -> Self {
    Self {
      no_of_builds: "10".into(),
      no_of_runs_to_fetch: 0,
      show_all_builds: false,
      hide_configuration_methods: false,
      use_custom_status_names: false,
      passed_representation: "PASSED".into(),
      failed_representation: "FAILED".into(),
      skipped_representation: "SKIPPED".into(),
      na_representation: "NA".into(),
      run_time_low_threshold: String::new(),
      run_time_high_threshold: String::new(),
    }
  }
}

impl GlobalConfig {
  /// Load settings from a JSON file; `None` yields defaults.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let Some(path) = path else {
      return Ok(Self::default());
    };
    let raw = std::fs::read(path).with_context(|| format!("reading settings {}", path.display()))?;
    let cfg: Self = serde_json::from_slice(&raw).with_context(|| format!("parsing settings {}", path.display()))?;
    cfg.validate().with_context(|| format!("validating settings {}", path.display()))?;
    Ok(cfg)
  }

  pub fn validate(&self) -> Result<()> {
    if let (Some(low), Some(high)) = (parse_seconds(&self.run_time_low_threshold), parse_seconds(&self.run_time_high_threshold)) {
      if low > high {
        bail!("runTimeLowThreshold ({low}) exceeds runTimeHighThreshold ({high})");
      }
    }
    Ok(())
  }

  pub fn status_labels(&self) -> StatusLabels {
    if !self.use_custom_status_names {
      return StatusLabels::default();
    }
    StatusLabels {
      passed: self.passed_representation.clone(),
      failed: self.failed_representation.clone(),
      skipped: self.skipped_representation.clone(),
      na: self.na_representation.clone(),
    }
  }

  pub fn runtime_thresholds(&self) -> Option<RuntimeThresholds> {
    let low = parse_seconds(&self.run_time_low_threshold)?;
    let high = parse_seconds(&self.run_time_high_threshold)?;
    (low <= high).then_some(RuntimeThresholds { low, high })
  }

  /// Window size used when the caller leaves it unspecified.
  pub fn default_builds_needed(&self) -> String {
    if self.show_all_builds {
      "-1".into()
    } else {
      self.no_of_builds.clone()
    }
  }
}

fn parse_seconds(raw: &str) -> Option<f64> {
  raw.trim().parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Display strings substituted for each status on export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLabels {
  pub passed: String,
  pub failed: String,
  pub skipped: String,
  pub na: String,
}

impl Default for StatusLabels {
  fn default() -> Self {
    Self {
      passed: ResultStatus::Passed.as_str().into(),
      failed: ResultStatus::Failed.as_str().into(),
      skipped: ResultStatus::Skipped.as_str().into(),
      na: ResultStatus::Na.as_str().into(),
    }
  }
}

impl StatusLabels {
  pub fn label(&self, status: ResultStatus) -> &str {
    match status {
      ResultStatus::Passed => &self.passed,
      ResultStatus::Failed => &self.failed,
      ResultStatus::Skipped => &self.skipped,
      ResultStatus::Na => &self.na,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeBand {
  Low,
  Normal,
  High,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeThresholds {
  pub low: f64,
  pub high: f64,
}

impl RuntimeThresholds {
  pub fn band(&self, seconds: f64) -> RuntimeBand {
    if seconds < self.low {
      RuntimeBand::Low
    } else if seconds > self.high {
      RuntimeBand::High
    } else {
      RuntimeBand::Normal
    }
  }
}

/// Per-call settings chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
  pub no_of_builds_needed: String,
  pub hide_config_methods: bool,
  #[serde(default)]
  pub build_filter: String,
}

impl UserConfig {
  pub fn new(no_of_builds_needed: impl Into<String>, hide_config_methods: bool, build_filter: impl Into<String>) -> Self {
    Self {
      no_of_builds_needed: no_of_builds_needed.into(),
      hide_config_methods,
      build_filter: build_filter.into(),
    }
  }

  /// User settings that fall back to the global defaults.
  pub fn from_global(global: &GlobalConfig) -> Self {
    Self::new(global.default_builds_needed(), global.hide_configuration_methods, "")
  }
}
