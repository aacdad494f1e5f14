// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Project ResultInfo into the nested package/class/test JSON tree consumed by the interactive view
// role: export/json
// inputs: ordered build list, ResultInfo, TreeOptions (hide configuration methods, runtime thresholds)
// outputs: JsonTree with one buildStatuses entry per requested build on every node
// invariants:
// - buildStatuses order equals the requested build order at every level
// - a build missing from a test's data renders as status NA with no duration
// - hidden configuration methods are excluded from roll-ups; classes/packages left empty are dropped
// - lastBuild/generatedAt are stamped by the caller that persists the document
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

use crate::config::{RuntimeBand, RuntimeThresholds};
use crate::model::{BuildNumber, ClassInfo, PackageInfo, ResultInfo, ResultStatus, TestCaseInfo};

#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
  pub hide_config_methods: bool,
  pub thresholds: Option<RuntimeThresholds>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonTree {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_build: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub generated_at: Option<String>,
  pub builds: Vec<BuildNumber>,
  pub results: Vec<TreeNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
  Package,
  Class,
  Test,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
  pub text: String,
  #[serde(rename = "type")]
  pub kind: NodeKind,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub config: bool,
  pub build_statuses: Vec<BuildStatus>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
  pub build_number: BuildNumber,
  pub status: ResultStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub total_time_taken: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub total_tests: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub total_passed: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub total_failed: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub total_skipped: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub run: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub runtime_band: Option<RuntimeBand>,
}

impl BuildStatus {
  fn missing(build_number: BuildNumber) -> Self {
    Self {
      build_number,
      status: ResultStatus::Na,
      total_time_taken: None,
      total_tests: None,
      total_passed: None,
      total_failed: None,
      total_skipped: None,
      url: None,
      run: None,
      runtime_band: None,
    }
  }
}

/// Per-build counters over a set of test leaves.
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
  tests: u32,
  passed: u32,
  failed: u32,
  skipped: u32,
  seconds: f64,
}

impl Tally {
  fn add(&mut self, status: ResultStatus, seconds: f64) {
    self.tests += 1;
    self.seconds += seconds;
    match status {
      ResultStatus::Passed => self.passed += 1,
      ResultStatus::Failed => self.failed += 1,
      ResultStatus::Skipped => self.skipped += 1,
      ResultStatus::Na => {}
    }
  }

  fn merge(&mut self, other: &Tally) {
    self.tests += other.tests;
    self.passed += other.passed;
    self.failed += other.failed;
    self.skipped += other.skipped;
    self.seconds += other.seconds;
  }

  fn status(&self) -> ResultStatus {
    if self.failed > 0 {
      ResultStatus::Failed
    } else if self.passed > 0 {
      ResultStatus::Passed
    } else if self.skipped > 0 {
      ResultStatus::Skipped
    } else {
      ResultStatus::Na
    }
  }

  fn to_status(self, build_number: BuildNumber) -> BuildStatus {
    if self.tests == 0 {
      return BuildStatus::missing(build_number);
    }
    BuildStatus {
      status: self.status(),
      total_time_taken: Some(self.seconds),
      total_tests: Some(self.tests),
      total_passed: Some(self.passed),
      total_failed: Some(self.failed),
      total_skipped: Some(self.skipped),
      ..BuildStatus::missing(build_number)
    }
  }
}

/// Build the JSON tree for `builds` (column order) over `info`.
pub fn export(builds: &[BuildNumber], info: &ResultInfo, opts: &TreeOptions) -> JsonTree {
  let results = info
    .packages
    .values()
    .filter_map(|p| package_node(builds, p, opts).map(|(node, _)| node))
    .collect();
  JsonTree { last_build: None, generated_at: None, builds: builds.to_vec(), results }
}

fn package_node(builds: &[BuildNumber], package: &PackageInfo, opts: &TreeOptions) -> Option<(TreeNode, Vec<Tally>)> {
  let mut tallies = vec![Tally::default(); builds.len()];
  let mut children = Vec::new();
  for class in package.classes.values() {
    if let Some((node, class_tallies)) = class_node(builds, class, opts) {
      for (acc, t) in tallies.iter_mut().zip(&class_tallies) {
        acc.merge(t);
      }
      children.push(node);
    }
  }
  if children.is_empty() {
    return None;
  }
  let node = TreeNode {
    text: package.name.clone(),
    kind: NodeKind::Package,
    config: false,
    build_statuses: roll_up(builds, &tallies),
    children,
  };
  Some((node, tallies))
}

fn class_node(builds: &[BuildNumber], class: &ClassInfo, opts: &TreeOptions) -> Option<(TreeNode, Vec<Tally>)> {
  let mut tallies = vec![Tally::default(); builds.len()];
  let mut children = Vec::new();
  for case in class.tests.values() {
    if opts.hide_config_methods && case.config {
      continue;
    }
    for (acc, build) in tallies.iter_mut().zip(builds) {
      if let Some(data) = case.per_build.get(build) {
        acc.add(data.status, data.duration_seconds);
      }
    }
    children.push(test_node(builds, case, opts));
  }
  if children.is_empty() {
    return None;
  }
  let node = TreeNode {
    text: class.name.clone(),
    kind: NodeKind::Class,
    config: false,
    build_statuses: roll_up(builds, &tallies),
    children,
  };
  Some((node, tallies))
}

fn test_node(builds: &[BuildNumber], case: &TestCaseInfo, opts: &TreeOptions) -> TreeNode {
  let build_statuses = builds
    .iter()
    .map(|&build| match case.per_build.get(&build) {
      Some(data) => BuildStatus {
        status: data.status,
        total_time_taken: Some(data.duration_seconds),
        url: (!data.source_url.is_empty()).then(|| data.source_url.clone()),
        run: (!data.run.is_empty()).then(|| data.run.clone()),
        runtime_band: opts.thresholds.map(|t| t.band(data.duration_seconds)),
        ..BuildStatus::missing(build)
      },
      None => BuildStatus::missing(build),
    })
    .collect();
  TreeNode {
    text: case.name.clone(),
    kind: NodeKind::Test,
    config: case.config,
    build_statuses,
    children: Vec::new(),
  }
}

fn roll_up(builds: &[BuildNumber], tallies: &[Tally]) -> Vec<BuildStatus> {
  builds.iter().zip(tallies).map(|(&b, t)| t.to_status(b)).collect()
}
