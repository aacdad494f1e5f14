// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Parse the build filter mini-language and resolve a requested window into an ordered list of build numbers
// role: selection/filter
// inputs: requested count (lenient string or integer), filter expression, known builds (most-recent-first), refetch callback
// outputs: Ordered, duplicate-free Vec<BuildNumber> preserving the known order
// invariants:
// - terms apply left-to-right; `!N` removes N only from what earlier terms added
// - a malformed term is dropped with a warning; the rest of the expression still applies
// - refetch runs at most once, and only when more builds are requested than are known
// - an empty filter set means "no filter"
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use tracing::{debug, warn};

use crate::model::BuildNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTerm {
  Single(BuildNumber),
  Range(BuildNumber, BuildNumber),
  Exclude(BuildNumber),
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FilterTermError {
  #[error("invalid build number {0:?}")]
  InvalidNumber(String),
}

fn parse_number(raw: &str) -> Result<BuildNumber, FilterTermError> {
  raw
    .trim()
    .parse::<BuildNumber>()
    .map_err(|_| FilterTermError::InvalidNumber(raw.trim().to_string()))
}

/// Parse one comma-separated term: `N`, `A-B` or `!N`.
pub fn parse_term(raw: &str) -> Result<FilterTerm, FilterTermError> {
  let term = raw.trim();
  if let Some(rest) = term.strip_prefix('!') {
    return parse_number(rest).map(FilterTerm::Exclude);
  }
  if let Some((lo, hi)) = term.split_once('-') {
    return Ok(FilterTerm::Range(parse_number(lo)?, parse_number(hi)?));
  }
  parse_number(term).map(FilterTerm::Single)
}

/// The set of build numbers an expression selects, after negations.
///
/// Held as sorted, disjoint, non-adjacent inclusive intervals, so a range costs
/// the same no matter how many builds it spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildFilter {
  spans: Vec<(BuildNumber, BuildNumber)>,
}

impl BuildFilter {
  /// Lenient parse: malformed terms are logged and skipped.
  pub fn parse(expr: &str) -> Self {
    let mut filter = Self::default();
    if expr.trim().is_empty() {
      return filter;
    }
    for raw in expr.split(',') {
      if raw.trim().is_empty() {
        continue;
      }
      match parse_term(raw) {
        Ok(term) => {
          debug!(term = raw.trim(), ?term, "build filter term");
          filter.apply(term);
        }
        Err(e) => warn!(term = raw.trim(), error = %e, "skipping malformed build filter term"),
      }
    }
    debug!(spans = ?filter.spans, "build filter resolved");
    filter
  }

  pub fn apply(&mut self, term: FilterTerm) {
    match term {
      FilterTerm::Single(n) => self.insert(n, n),
      FilterTerm::Range(lo, hi) => {
        if lo <= hi {
          self.insert(lo, hi);
        }
      }
      FilterTerm::Exclude(n) => self.remove(n),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.spans.is_empty()
  }

  pub fn contains(&self, build: BuildNumber) -> bool {
    let i = self.spans.partition_point(|&(_, hi)| hi < build);
    self.spans.get(i).is_some_and(|&(lo, _)| lo <= build)
  }

  /// Union `[lo, hi]` into the set, merging overlapping or adjacent spans.
  fn insert(&mut self, lo: BuildNumber, hi: BuildNumber) {
    let (mut lo, mut hi) = (lo, hi);
    let mut kept = Vec::with_capacity(self.spans.len() + 1);
    for &(a, b) in &self.spans {
      if u64::from(b) + 1 < u64::from(lo) || u64::from(hi) + 1 < u64::from(a) {
        kept.push((a, b));
      } else {
        lo = lo.min(a);
        hi = hi.max(b);
      }
    }
    let at = kept.partition_point(|&(a, _)| a < lo);
    kept.insert(at, (lo, hi));
    self.spans = kept;
  }

  /// Remove a single build, splitting the span that holds it.
  fn remove(&mut self, n: BuildNumber) {
    let i = self.spans.partition_point(|&(_, hi)| hi < n);
    let Some(&(lo, hi)) = self.spans.get(i) else {
      return;
    };
    if n < lo {
      return;
    }
    self.spans.remove(i);
    if n < hi {
      self.spans.insert(i, (n + 1, hi));
    }
    if lo < n {
      self.spans.insert(i, (lo, n - 1));
    }
  }

  /// Keep `build` when there is no filter or the filter selects it.
  pub fn admits(&self, build: BuildNumber) -> bool {
    self.is_empty() || self.contains(build)
  }
}

/// Lenient count parse: anything that is not an integer means "all" (`-1`).
pub fn parse_build_count(raw: &str) -> i64 {
  raw.trim().parse::<i64>().unwrap_or(-1)
}

/// Take the first `requested` known builds (all when `requested <= 0`) that the filter admits.
pub fn select(requested: i64, filter: &BuildFilter, known: &[BuildNumber]) -> Vec<BuildNumber> {
  let count = match usize::try_from(requested) {
    Ok(n) if n > 0 => n.min(known.len()),
    _ => known.len(),
  };
  known
    .iter()
    .take(count)
    .copied()
    .filter(|b| filter.admits(*b))
    .collect()
}

/// Resolve a requested window and filter expression against the known builds.
///
/// `refetch` is invoked once when `requested` exceeds the number of known builds; its result
/// replaces `known` for this resolution. The caller owns whatever state the refetch updates.
pub fn resolve<F, E>(requested: i64, filter_expr: &str, known: &[BuildNumber], refetch: F) -> Result<Vec<BuildNumber>, E>
where
  F: FnOnce() -> Result<Vec<BuildNumber>, E>,
{
  let filter = BuildFilter::parse(filter_expr);

  let refetched;
  let mut window = known;
  if requested > 0 && requested as u64 > window.len() as u64 {
    debug!(requested, known = window.len(), "requested more builds than known; refetching");
    refetched = refetch()?;
    window = &refetched;
  } else if requested <= 0 && filter.is_empty() {
    return Ok(window.to_vec());
  }

  Ok(select(requested, &filter, window))
}
