// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Flatten ResultInfo into a quoted CSV table, one row per test and one column per build
// role: export/csv
// inputs: ordered build list, ResultInfo, time_based flag, StatusLabels
// outputs: CSV text with header "Package","Class","Test",<builds...>
// invariants:
// - every field is double-quoted; embedded quotes are doubled
// - status cells use the configured labels; missing builds use the NA label in both modes
// - durations are rounded up to at most 3 decimal places, trailing zeros dropped (`0.7`, `2`, `1.235`)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::config::StatusLabels;
use crate::model::{BuildNumber, ResultInfo};

fn quote(field: &str) -> String {
  format!("\"{}\"", field.replace('"', "\"\""))
}

/// Seconds rounded up to the next millisecond, without trailing zeros (`1.23451` -> `1.235`, `2.0` -> `2`).
pub fn format_duration_ceil(seconds: f64) -> String {
  // Snap sub-nanosecond float noise so exact millisecond values do not round up.
  let millis = ((seconds * 1000.0) * 1e6).round() / 1e6;
  let fixed = format!("{:.3}", millis.ceil() / 1000.0);
  fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn export(builds: &[BuildNumber], info: &ResultInfo, time_based: bool, labels: &StatusLabels) -> String {
  let mut out = String::new();

  let mut header = vec![quote("Package"), quote("Class"), quote("Test")];
  header.extend(builds.iter().map(|b| quote(&b.to_string())));
  out.push_str(&header.join(","));
  out.push('\n');

  for (package, class, case) in info.iter_tests() {
    let mut row = vec![quote(&package.name), quote(&class.name), quote(&case.name)];
    for build in builds {
      let cell = match case.per_build.get(build) {
        Some(data) if time_based => format_duration_ceil(data.duration_seconds),
        Some(data) => labels.label(data.status).to_string(),
        None => labels.na.clone(),
      };
      row.push(quote(&cell));
    }
    out.push_str(&row.join(","));
    out.push('\n');
  }
  out
}
