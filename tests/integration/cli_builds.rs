use predicates::prelude::*;
use test_support::{cmd_bin, JobFixture, BIN};

fn builds(job: &JobFixture, args: &[&str]) -> Vec<u32> {
  let out = job.cmd().arg("builds").args(args).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn running_build_is_not_selectable() {
  let job = JobFixture::from_fixture("demo", "builds.json");
  assert_eq!(builds(&job, &["--builds", "-1"]), vec![4, 3, 2, 1]);
  assert_eq!(builds(&job, &["--builds", "2"]), vec![4, 3]);
}

#[test]
fn default_window_comes_from_settings() {
  let job = JobFixture::from_fixture("demo", "builds.json");
  let settings = job.jobs_root().join("settings.json");
  std::fs::write(&settings, r#"{"noOfBuilds": "3"}"#).unwrap();
  let out = job.cmd().arg("--config").arg(&settings).arg("builds").output().unwrap();
  assert!(out.status.success());
  let ids: Vec<u32> = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(ids, vec![4, 3, 2]);
}

#[test]
fn filter_terms_apply_left_to_right() {
  let job = JobFixture::from_fixture("demo", "builds.json");
  assert_eq!(builds(&job, &["--builds", "all", "--filter", "1-4,!3"]), vec![4, 2, 1]);
  assert_eq!(builds(&job, &["--builds", "-1", "--filter", "!3,1-4"]), vec![4, 3, 2, 1]);
  // Malformed terms are skipped.
  assert_eq!(builds(&job, &["--builds", "-1", "--filter", "x,2"]), vec![2]);
  // The count limits the window before filtering.
  assert_eq!(builds(&job, &["--builds", "2", "--filter", "1-2"]), Vec::<u32>::new());
}

#[test]
fn empty_job_has_no_builds() {
  let job = JobFixture::empty("fresh");
  assert_eq!(builds(&job, &["--builds", "-1"]), Vec::<u32>::new());
}

#[test]
fn job_flag_is_required() {
  cmd_bin(BIN)
    .args(["builds"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--job"));
}

#[test]
fn job_name_cannot_leave_jobs_root() {
  let job = JobFixture::empty("demo");
  cmd_bin(BIN)
    .arg("--jobs-root")
    .arg(job.jobs_root())
    .args(["--job", "../demo", "builds"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid job name"));
}

#[test]
fn malformed_builds_file_is_reported() {
  let job = JobFixture::empty("demo");
  job.write_builds("[{\"number\": ");
  job
    .cmd()
    .arg("builds")
    .assert()
    .failure()
    .stderr(predicate::str::contains("builds.json"));
}
