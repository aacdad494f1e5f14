//! test-support: helpers for robust, nextest-friendly tests.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support", features = ["serde"] }
//! ```
//!
//! Then in tests:
//! ```rust,ignore
//! use test_support::{init_tracing, JobFixture};
//!
//! #[test]
//! fn example() {
//!     init_tracing();
//!     let job = JobFixture::from_fixture("demo", "builds.json");
//!     let _dir = job.job_dir();
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::{env, path::{Path, PathBuf}};

/// Binary target exercised by the CLI tests.
pub const BIN: &str = "test-results-analyzer";

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn,test=info"))
            .unwrap();
        // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Initialize insta snapshot settings once per test process.
///
/// - Centralizes snapshot files in `tests/snapshots` (relative to the test binary's CWD)
/// - Omits `Expression:` in snapshot headers for cleaner diffs
pub fn init_insta() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let mut settings = insta::Settings::clone_current();
        settings.set_snapshot_path("../snapshots");
        settings.set_omit_expression(true);
        // Bind settings to the thread for the remainder of the test process by leaking the guard
        let guard = settings.bind_to_scope();
        std::mem::forget(guard);
    });
    Lazy::force(&INIT);
}

/// Return the path to the repository's `tests/fixtures` directory.
///
/// Uses the package directory (where `Cargo.toml` lives), so it's stable regardless
/// of the runner's working directory (cargo vs nextest).
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(|tests| tests.join("fixtures"))
        .expect("tests/support has a parent directory")
}

/// Read a UTF-8 text fixture into a string.
pub fn read_fixture_text<P: AsRef<Path>>(rel_path: P) -> String {
    let path = fixtures_dir().join(rel_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

/// Deserialize a JSON fixture into `T` (enable `serde` feature).
#[cfg(feature = "serde")]
pub fn read_fixture_json<T, P>(rel_path: P) -> T
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = fixtures_dir().join(rel_path);
    let file = std::fs::File::open(&path)
        .unwrap_or_else(|e| panic!("failed to open fixture {}: {e}", path.display()));
    serde_json::from_reader::<_, T>(file)
        .unwrap_or_else(|e| panic!("failed to parse JSON fixture {}: {e}", path.display()))
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
    init_tracing();
    assert_cmd::Command::cargo_bin(bin).expect("binary target not found")
}

/// A temporary jobs root holding one job directory with a `builds.json`.
pub struct JobFixture {
    root: tempfile::TempDir,
    name: String,
}

impl JobFixture {
    /// An empty job (no `builds.json` yet).
    pub fn empty(name: &str) -> Self {
        let root = tempdir();
        std::fs::create_dir_all(root.path().join(name)).expect("create job dir");
        Self { root, name: name.to_string() }
    }

    /// A job whose `builds.json` is a copy of `tests/fixtures/<fixture>`.
    pub fn from_fixture(name: &str, fixture: &str) -> Self {
        let job = Self::empty(name);
        job.write_builds(&read_fixture_text(fixture));
        job
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn jobs_root(&self) -> &Path {
        self.root.path()
    }

    pub fn job_dir(&self) -> PathBuf {
        self.root.path().join(&self.name)
    }

    pub fn builds_path(&self) -> PathBuf {
        self.job_dir().join("builds.json")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.job_dir().join("cache.json")
    }

    /// Replace the job's `builds.json` with raw JSON text.
    pub fn write_builds(&self, json: &str) {
        std::fs::write(self.builds_path(), json).expect("write builds.json");
    }

    /// Append one build record to `builds.json` (enable `serde` feature).
    #[cfg(feature = "serde")]
    pub fn push_build(&self, record: serde_json::Value) {
        let mut builds: Vec<serde_json::Value> = match std::fs::read(self.builds_path()) {
            Ok(raw) => serde_json::from_slice(&raw).expect("builds.json is an array"),
            Err(_) => Vec::new(),
        };
        builds.push(record);
        self.write_builds(&serde_json::to_string_pretty(&builds).expect("serialize builds"));
    }

    /// Flip build `number` in `builds.json` from running to finished (enable `serde` feature).
    #[cfg(feature = "serde")]
    pub fn finish_build(&self, number: u64) {
        let raw = std::fs::read(self.builds_path()).expect("read builds.json");
        let mut builds: Vec<serde_json::Value> = serde_json::from_slice(&raw).expect("builds.json is an array");
        for build in builds.iter_mut().filter(|b| b["number"] == number) {
            build["building"] = serde_json::Value::Bool(false);
        }
        self.write_builds(&serde_json::to_string_pretty(&builds).expect("serialize builds"));
    }

    /// The binary with `--jobs-root` and `--job` already pointing at this fixture.
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = cmd_bin(BIN);
        cmd.arg("--jobs-root").arg(self.jobs_root()).arg("--job").arg(&self.name);
        cmd
    }
}
