use jsonschema::validator_for;
use test_support::JobFixture;

fn compile_schema(name: &str) -> jsonschema::Validator {
  let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
  let path = manifest_dir.join("tests").join("schemas").join(name);
  let data = std::fs::read(&path).expect("schema file");
  let schema: serde_json::Value = serde_json::from_slice(&data).expect("valid schema JSON");
  validator_for(&schema).expect("compile schema")
}

fn tree(job: &JobFixture, args: &[&str]) -> serde_json::Value {
  let out = job.cmd().args(args).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn data_tree_conforms_to_schema() {
  let job = JobFixture::from_fixture("demo", "builds.json");
  let v = tree(&job, &["data", "--builds", "-1"]);
  let compiled = compile_schema("test-results-analyzer.tree.schema.json");
  compiled.validate(&v).expect("schema validation failed for JSON tree");

  // Roll-ups on the package node of build 3: setUp, testAdd, testDiv.
  let acme = &v["results"][0];
  assert_eq!(acme["type"], "package");
  let b3 = &acme["buildStatuses"][1];
  assert_eq!(b3["buildNumber"], 3);
  assert_eq!(b3["status"], "FAILED");
  assert_eq!(b3["totalTests"], 3);
  assert_eq!(b3["totalSkipped"], 1);
}

#[test]
fn sub_run_labels_and_urls_reach_test_cells() {
  let job = JobFixture::from_fixture("demo", "builds.json");
  let v = tree(&job, &["recompute", "--builds", "1"]);
  let test_add = &v["results"][0]["children"][0]["children"][1];
  assert_eq!(test_add["text"], "testAdd");
  let cell = &test_add["buildStatuses"][0];
  assert_eq!(cell["buildNumber"], 4);
  assert_eq!(cell["run"], "run:jdk=11");
  assert_eq!(cell["url"], "job/demo/jdk=11/4/testReport/com.acme/CalcTest/testAdd/");
}

#[test]
fn runtime_bands_conform_to_schema() {
  let job = JobFixture::from_fixture("demo", "builds.json");
  let settings = job.jobs_root().join("settings.json");
  std::fs::write(&settings, r#"{"runTimeLowThreshold": "0.1", "runTimeHighThreshold": "1"}"#).unwrap();
  let out = job
    .cmd()
    .arg("--config")
    .arg(&settings)
    .args(["recompute", "--builds", "-1"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  compile_schema("test-results-analyzer.tree.schema.json")
    .validate(&v)
    .expect("schema validation failed with runtime bands");

  let read = &v["results"][1]["children"][0]["children"][0];
  assert_eq!(read["text"], "testRead");
  assert_eq!(read["buildStatuses"][0]["runtimeBand"], "high");
  assert_eq!(read["buildStatuses"][1]["runtimeBand"], "normal");
}

#[test]
fn empty_job_tree_conforms_to_schema() {
  let job = JobFixture::empty("fresh");
  let v = tree(&job, &["data"]);
  assert_eq!(v["results"], serde_json::json!([]));
  compile_schema("test-results-analyzer.tree.schema.json")
    .validate(&v)
    .expect("schema validation failed for empty tree");
}
