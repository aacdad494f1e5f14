// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the aggregated result tree (package -> class -> test -> per-build data) and the host's build/test-result input shapes
// role: model/types
// outputs: Serializable structs with stable field names; BTreeMap ordering for deterministic export
// invariants: package/class/test names are the identity across builds; absence of a build in per_build means "no result" (rendered NA at export)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type BuildNumber = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultStatus {
  Passed,
  Failed,
  Skipped,
  Na,
}

impl ResultStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ResultStatus::Passed => "PASSED",
      ResultStatus::Failed => "FAILED",
      ResultStatus::Skipped => "SKIPPED",
      ResultStatus::Na => "NA",
    }
  }
}

impl std::fmt::Display for ResultStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One build's outcome for one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultData {
  pub status: ResultStatus,
  pub duration_seconds: f64,
  pub source_url: String,
  /// Normalized label of the (sub-)run that produced this entry, e.g. `run:jdk=11`.
  pub run: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCaseInfo {
  pub name: String,
  /// Setup/teardown style method; hidden from the JSON tree on request.
  pub config: bool,
  pub per_build: BTreeMap<BuildNumber, ResultData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassInfo {
  pub name: String,
  pub tests: BTreeMap<String, TestCaseInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageInfo {
  pub name: String,
  pub classes: BTreeMap<String, ClassInfo>,
}

/// Cross-build summary keyed by package name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultInfo {
  pub packages: BTreeMap<String, PackageInfo>,
}

impl ResultInfo {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.packages.is_empty()
  }

  /// Upsert the entry for `(package, class, test)` at `build`; a later write for the same build wins.
  pub fn record(&mut self, package: &str, class: &str, test: &str, build: BuildNumber, config: bool, data: ResultData) {
    let pkg = self
      .packages
      .entry(package.to_string())
      .or_insert_with(|| PackageInfo { name: package.to_string(), ..Default::default() });
    let cls = pkg
      .classes
      .entry(class.to_string())
      .or_insert_with(|| ClassInfo { name: class.to_string(), ..Default::default() });
    let case = cls
      .tests
      .entry(test.to_string())
      .or_insert_with(|| TestCaseInfo { name: test.to_string(), ..Default::default() });
    case.config |= config;
    case.per_build.insert(build, data);
  }

  pub fn test(&self, package: &str, class: &str, test: &str) -> Option<&TestCaseInfo> {
    self.packages.get(package)?.classes.get(class)?.tests.get(test)
  }

  /// Iterate every `(package, class, test)` triple in key order.
  pub fn iter_tests(&self) -> impl Iterator<Item = (&PackageInfo, &ClassInfo, &TestCaseInfo)> {
    self.packages.values().flat_map(|p| {
      p.classes
        .values()
        .flat_map(move |c| c.tests.values().map(move |t| (p, c, t)))
    })
  }
}

// --- Host input shapes (builds.json) ---

/// A node of a host test-result tree. Nodes with `children` are tabulated (package/class level);
/// leaves carry the case outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultNode {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub children: Option<Vec<ResultNode>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<ResultStatus>,
  #[serde(default)]
  pub duration: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub config: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildReport {
  pub label: String,
  #[serde(default)]
  pub url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub result: Option<ResultNode>,
}

/// A test-result action attached to a build: either one tree or one tree per sub-run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TestResultAction {
  Simple { result: ResultNode },
  Aggregated { children: Vec<ChildReport> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
  pub number: BuildNumber,
  #[serde(default)]
  pub label: String,
  #[serde(default)]
  pub url: String,
  #[serde(default)]
  pub building: bool,
  #[serde(default)]
  pub results: Vec<TestResultAction>,
}
