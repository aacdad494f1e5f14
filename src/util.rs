// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for paths, run labels, test naming conventions, URL joining and man page rendering
// role: utilities/helpers
// inputs: Various primitives; paths; clap CommandFactory
// outputs: Canonicalized paths, normalized labels, joined URLs, man page text
// side_effects: None
// invariants:
// - normalize_run_label rewrites only the first `#<digits><space>` occurrence
// - is_config_method is a case-insensitive prefix match on setup/teardown/before/after
// errors: render_man_page surfaces clap_mangen IO errors
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use clap::CommandFactory;
use once_cell::sync::Lazy;
use regex::Regex;

static RUN_NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\d*\s)").expect("valid run label regex"));

/// Method-name prefixes treated as setup/teardown (configuration) methods.
const CONFIG_METHOD_PREFIXES: &[&str] = &["setup", "teardown", "before", "after"];

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

/// Turn a run display name like `#12 jdk=11` into `run:jdk=11`.
pub fn normalize_run_label(label: &str) -> String {
  RUN_NUMBER_PREFIX.replace(label, "run:").into_owned()
}

/// Whether a test name follows the setup/teardown naming convention.
pub fn is_config_method(name: &str) -> bool {
  let lower = name.to_ascii_lowercase();
  CONFIG_METHOD_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Join a run URL and a relative case URL with exactly one `/` between them.
pub fn join_url(base: &str, rel: &str) -> String {
  if base.is_empty() || rel.starts_with("http://") || rel.starts_with("https://") {
    return rel.to_string();
  }
  format!("{}/{}", base.trim_end_matches('/'), rel.trim_start_matches('/'))
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
