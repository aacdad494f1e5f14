use test_support::{init_insta, JobFixture};

fn export(job: &JobFixture, args: &[&str]) -> String {
  let out = job.cmd().arg("export-csv").args(args).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  String::from_utf8(out.stdout).unwrap()
}

#[test]
fn status_matrix_snapshot() {
  init_insta();
  let job = JobFixture::from_fixture("demo", "builds.json");
  let csv = export(&job, &["--builds", "-1"]);
  insta::assert_snapshot!(csv, @r#"
  "Package","Class","Test","4","3","2","1"
  "com.acme","CalcTest","setUp","NA","PASSED","NA","NA"
  "com.acme","CalcTest","testAdd","PASSED","FAILED","PASSED","NA"
  "com.acme","CalcTest","testDiv","NA","SKIPPED","PASSED","NA"
  "com.acme.io","FileTest","testRead","FAILED","PASSED","NA","NA"
  "#);
}

#[test]
fn time_matrix_snapshot() {
  init_insta();
  let job = JobFixture::from_fixture("demo", "builds.json");
  let csv = export(&job, &["--builds", "-1", "--time-based"]);
  insta::assert_snapshot!(csv, @r#"
  "Package","Class","Test","4","3","2","1"
  "com.acme","CalcTest","setUp","NA","0.01","NA","NA"
  "com.acme","CalcTest","testAdd","0.3","1.235","0.5","NA"
  "com.acme","CalcTest","testDiv","NA","0","0.25","NA"
  "com.acme.io","FileTest","testRead","2.5","0.2","NA","NA"
  "#);
}

#[test]
fn custom_labels_and_filtered_columns() {
  let job = JobFixture::from_fixture("demo", "builds.json");
  let settings = job.jobs_root().join("settings.json");
  std::fs::write(
    &settings,
    r#"{"useCustomStatusNames": true, "passedRepresentation": "ok", "failedRepresentation": "KO", "naRepresentation": "-"}"#,
  )
  .unwrap();
  let out = job
    .cmd()
    .arg("--config")
    .arg(&settings)
    .args(["export-csv", "--builds", "-1", "--filter", "3-4"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let csv = String::from_utf8(out.stdout).unwrap();
  let lines: Vec<&str> = csv.lines().collect();
  assert_eq!(lines[0], r#""Package","Class","Test","4","3""#);
  assert_eq!(lines[2], r#""com.acme","CalcTest","testAdd","ok","KO""#);
  assert_eq!(lines[4], r#""com.acme.io","FileTest","testRead","KO","ok""#);
}

#[test]
fn csv_ends_with_newline_on_stdout() {
  let job = JobFixture::from_fixture("demo", "builds.json");
  let csv = export(&job, &["--builds", "1"]);
  assert!(csv.ends_with("\"testRead\",\"FAILED\"\n"));
  assert_eq!(csv.matches('\n').count(), 5);
}
