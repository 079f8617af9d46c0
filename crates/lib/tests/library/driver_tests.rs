//! Integration tests for the orchestration driver, with a recording
//! compiler standing in for the external collaborator.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use polypack_lib::compiler::{CompileError, CompileRequest, Compiler};
use polypack_lib::consts;
use polypack_lib::driver::{self, Flags, RunOptions};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingCompiler {
  requests: Mutex<Vec<CompileRequest>>,
}

impl RecordingCompiler {
  fn requests(&self) -> Vec<CompileRequest> {
    self.requests.lock().unwrap().clone()
  }
}

#[async_trait]
impl Compiler for RecordingCompiler {
  async fn build(&self, request: CompileRequest) -> Result<(), CompileError> {
    self.requests.lock().unwrap().push(request);
    Ok(())
  }
}

struct FailingCompiler;

#[async_trait]
impl Compiler for FailingCompiler {
  async fn build(&self, _request: CompileRequest) -> Result<(), CompileError> {
    Err(CompileError::Other("synthetic failure".to_string()))
  }
}

const CONFIG: &str = r#"[
  {"entry": "./src/index.ts", "format": ["commonjs", "module"]},
  {"entry": {"extra": "./src/extra.ts"}, "format": "module"}
]"#;

const MANIFEST: &str = r#"{
  "name": "demo-pkg",
  "version": "1.2.3",
  "dependencies": {"preset-dep": "^1.0.0"}
}"#;

fn package(config: &str, manifest: &str) -> TempDir {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("build.config.json"), config).unwrap();
  std::fs::write(temp.path().join("package.json"), manifest).unwrap();
  temp
}

fn options(flags: Flags) -> RunOptions {
  RunOptions {
    flags,
    preset_externals: vec!["preset-dep".to_string()],
  }
}

#[tokio::test]
async fn tasks_run_before_the_two_fixed_bundles() {
  let temp = package(CONFIG, MANIFEST);
  let compiler = Arc::new(RecordingCompiler::default());

  let summary = driver::run(temp.path(), compiler.clone(), &options(Flags::default()))
    .await
    .unwrap();
  assert_eq!(summary.tasks_built, 2);

  let requests = compiler.requests();
  assert_eq!(requests.len(), 4);
  // The two descriptor builds come first (in either order), then the
  // globals bundle, then the preset bundle.
  assert!(requests[..2].iter().all(|r| matches!(r, CompileRequest::Task { .. })));
  match &requests[2] {
    CompileRequest::Bundle(bundle) => {
      assert_eq!(bundle.entry_points.len(), 3);
      assert!(bundle.external.is_empty());
    }
    other => panic!("expected globals bundle, got {other:?}"),
  }
  match &requests[3] {
    CompileRequest::Bundle(bundle) => {
      assert_eq!(bundle.entry_points, vec![consts::PRESET_ENTRY.to_string()]);
      assert_eq!(bundle.external, vec!["preset-dep".to_string()]);
    }
    other => panic!("expected preset bundle, got {other:?}"),
  }
}

#[tokio::test]
async fn task_options_are_layered_and_versioned() {
  let temp = package(CONFIG, MANIFEST);
  let compiler = Arc::new(RecordingCompiler::default());
  driver::run(temp.path(), compiler.clone(), &options(Flags::default()))
    .await
    .unwrap();

  for request in &compiler.requests()[..2] {
    let CompileRequest::Task { options } = request else {
      panic!("expected task request");
    };
    assert_eq!(options.out_dir(), Some("./dist"));
    assert!(!options.watch());
    assert_eq!(options.get("clean"), Some(&serde_json::json!(true)));
    assert_eq!(options.get("minify"), Some(&serde_json::json!(false)));
    // The package version is threaded into the nested defines additively.
    assert_eq!(
      options.get("define"),
      Some(&serde_json::json!({"__VERSION__": "\"1.2.3\""}))
    );
  }
}

#[tokio::test]
async fn watch_flag_always_wins_the_merge() {
  let config = r#"{"entry": "./src/index.ts", "format": "cjs", "watch": false, "clean": true}"#;
  let temp = package(config, MANIFEST);
  let compiler = Arc::new(RecordingCompiler::default());

  let flags = Flags::parse(["--watch"]);
  driver::run(temp.path(), compiler.clone(), &options(flags)).await.unwrap();

  let CompileRequest::Task { options } = compiler.requests()[0].clone() else {
    panic!("expected task request");
  };
  assert!(options.watch());
  assert_eq!(options.get("clean"), Some(&serde_json::json!(false)));
}

#[tokio::test]
async fn stubs_and_exports_are_generated() {
  let temp = package(CONFIG, MANIFEST);
  let compiler = Arc::new(RecordingCompiler::default());
  let summary = driver::run(temp.path(), compiler, &options(Flags::default()))
    .await
    .unwrap();

  assert_eq!(summary.stubs_written, 2);
  assert!(summary.manifest_written);

  let stub = std::fs::read_to_string(temp.path().join("dist").join("index.d.ts")).unwrap();
  assert_eq!(stub, "// Generated by polypack, do not edit.\nexport * from '../src/index'\n");
  assert!(temp.path().join("dist").join("extra.d.ts").exists());

  let manifest: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(temp.path().join("package.json")).unwrap()).unwrap();
  let exports = manifest.get("exports").unwrap().as_object().unwrap();
  // Two user subpaths, three runtime-globals subpaths, plus the pin.
  assert_eq!(exports.len(), 6);
  assert_eq!(
    exports.get("./dist/globals/console"),
    Some(&serde_json::json!({
      "types": "./dist/globals/console.d.ts",
      "module": "./dist/globals/console.mjs",
    }))
  );
}

#[tokio::test]
async fn optimized_mode_skips_stubs_but_not_the_manifest() {
  let temp = package(CONFIG, MANIFEST);
  let compiler = Arc::new(RecordingCompiler::default());
  let flags = Flags::parse(["--optimized"]);
  let summary = driver::run(temp.path(), compiler.clone(), &options(flags)).await.unwrap();

  assert_eq!(summary.stubs_written, 0);
  assert!(summary.manifest_written);
  assert!(!temp.path().join("dist").join("index.d.ts").exists());

  let CompileRequest::Task { options } = compiler.requests()[0].clone() else {
    panic!("expected task request");
  };
  assert_eq!(options.get("minify"), Some(&serde_json::json!(true)));
}

#[tokio::test]
async fn reset_empties_the_output_directory_first() {
  let temp = package(CONFIG, MANIFEST);
  let stale = temp.path().join("dist").join("stale.js");
  std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
  std::fs::write(&stale, "leftover").unwrap();

  let compiler = Arc::new(RecordingCompiler::default());
  let flags = Flags::parse(["--reset"]);
  driver::run(temp.path(), compiler, &options(flags)).await.unwrap();

  assert!(!stale.exists());
  assert!(temp.path().join("dist").join("index.d.ts").exists());
}

#[tokio::test]
async fn incompatible_exports_shape_is_a_quiet_no_op() {
  let manifest = r#"{"name": "demo-pkg", "version": "1.2.3", "exports": "./index.js"}"#;
  let temp = package(CONFIG, manifest);
  let compiler = Arc::new(RecordingCompiler::default());
  let summary = driver::run(temp.path(), compiler, &options(Flags::default()))
    .await
    .unwrap();

  assert!(!summary.manifest_written);
  assert_eq!(
    std::fs::read_to_string(temp.path().join("package.json")).unwrap(),
    manifest
  );
}

#[tokio::test]
async fn compile_failure_aborts_before_post_stages() {
  let temp = package(CONFIG, MANIFEST);
  let result = driver::run(temp.path(), Arc::new(FailingCompiler), &options(Flags::default())).await;
  assert!(result.is_err());

  // Neither stubs nor the manifest were touched.
  assert!(!temp.path().join("dist").join("index.d.ts").exists());
  let manifest: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(temp.path().join("package.json")).unwrap()).unwrap();
  assert!(manifest.get("exports").is_none());
}

#[tokio::test]
async fn string_config_aborts_with_no_configuration() {
  let temp = package(r#""not a config""#, MANIFEST);
  let err = driver::run(temp.path(), Arc::new(RecordingCompiler::default()), &options(Flags::default()))
    .await
    .unwrap_err();
  assert!(err.to_string().contains("no build configuration found"));
}
