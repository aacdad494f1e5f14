// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fold per-build host test-result trees into one cross-build ResultInfo keyed package -> class -> test
// role: processing/aggregation
// inputs: BuildRecord list (most-recent-first) or individual (build, label, tree, url) ingestions
// outputs: ResultInfo plus the ordered list of finished build numbers that were ingested
// invariants:
// - builds still running contribute nothing and are not listed
// - a top-level result without package structure is skipped; the rest of the build still ingests
// - the same (package, class, test) across builds is one TestCaseInfo; same build twice is last-write-wins
// - the aggregator is populated after the first tabulated tree, even one without packages
// errors: None escape ingestion; unsupported shapes are classified, logged and skipped
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use tracing::{debug, info};

use crate::model::{BuildNumber, BuildRecord, ResultData, ResultInfo, ResultNode, ResultStatus, TestResultAction};
use crate::util::{is_config_method, join_url, normalize_run_label};

/// A top-level result that has no package/class structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("result {name:?} is not a tabulated test result")]
pub struct UnsupportedShape {
  pub name: String,
}

/// Classification of a top-level host result.
#[derive(Debug)]
pub enum Shape<'a> {
  Tabulated { packages: &'a [ResultNode] },
  Unsupported(UnsupportedShape),
}

pub fn classify(node: &ResultNode) -> Shape<'_> {
  match node.children.as_deref() {
    Some(packages) => Shape::Tabulated { packages },
    None => Shape::Unsupported(UnsupportedShape { name: node.name.clone() }),
  }
}

#[derive(Debug, Default)]
pub struct ResultAggregator {
  info: ResultInfo,
  builds: Vec<BuildNumber>,
  populated: bool,
}

impl ResultAggregator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Aggregate every finished build of `records`, keeping their order.
  pub fn from_builds(records: &[BuildRecord]) -> Self {
    let mut agg = Self::new();
    for record in records {
      agg.ingest_build(record);
    }
    agg
  }

  /// True until one `ingest` has succeeded, even if that tree held no tests.
  pub fn is_empty(&self) -> bool {
    !self.populated
  }

  pub fn result_info(&self) -> &ResultInfo {
    &self.info
  }

  /// Finished builds seen so far, in ingestion order.
  pub fn builds(&self) -> &[BuildNumber] {
    &self.builds
  }

  pub fn into_parts(self) -> (ResultInfo, Vec<BuildNumber>) {
    (self.info, self.builds)
  }

  /// Ingest all test-result actions of one build. Returns false when the build was skipped.
  pub fn ingest_build(&mut self, record: &BuildRecord) -> bool {
    if record.building {
      debug!(build = record.number, "skipping build in progress");
      return false;
    }
    if !self.builds.contains(&record.number) {
      self.builds.push(record.number);
    }
    for action in &record.results {
      self.ingest_action(record.number, &record.label, &record.url, action);
    }
    true
  }

  /// Ingest one action; aggregated actions contribute each child run under the same build number.
  pub fn ingest_action(&mut self, build: BuildNumber, label: &str, url: &str, action: &TestResultAction) {
    match action {
      TestResultAction::Simple { result } => self.ingest_or_skip(build, label, result, url),
      TestResultAction::Aggregated { children } => {
        info!(build, reports = children.len(), "processing aggregated test results");
        for child in children {
          match &child.result {
            Some(result) => {
              debug!(build, child = %child.label, "child report");
              self.ingest_or_skip(build, &child.label, result, &child.url);
            }
            None => debug!(build, child = %child.label, "child report has no result"),
          }
        }
      }
    }
  }

  /// Walk one top-level tree and upsert every test case at `build`. Returns the number of cases recorded.
  pub fn ingest(&mut self, build: BuildNumber, label: &str, tree: &ResultNode, url: &str) -> Result<usize, UnsupportedShape> {
    let packages = match classify(tree) {
      Shape::Tabulated { packages } => packages,
      Shape::Unsupported(e) => return Err(e),
    };
    self.populated = true;
    let run = normalize_run_label(label);
    let mut recorded = 0;

    for package in packages {
      let Some(classes) = package.children.as_deref() else {
        debug!(build, package = %package.name, "package without classes");
        continue;
      };
      for class in classes {
        let Some(cases) = class.children.as_deref() else {
          debug!(build, package = %package.name, class = %class.name, "class without test cases");
          continue;
        };
        for case in cases {
          let config = case.config.unwrap_or_else(|| is_config_method(&case.name));
          let data = ResultData {
            status: case.status.unwrap_or(ResultStatus::Na),
            duration_seconds: case.duration,
            source_url: case.url.as_deref().map_or_else(|| url.to_string(), |u| join_url(url, u)),
            run: run.clone(),
          };
          self.info.record(&package.name, &class.name, &case.name, build, config, data);
          recorded += 1;
        }
      }
    }
    Ok(recorded)
  }

  fn ingest_or_skip(&mut self, build: BuildNumber, label: &str, tree: &ResultNode, url: &str) {
    if let Err(e) = self.ingest(build, label, tree, url) {
      info!(build, error = %e, "ignoring result; only tabulated test results are processed");
    }
  }
}
