//! Integration tests for manifest synthesis against real files.

use polypack_lib::format::FormatTag;
use polypack_lib::manifest::{PackageManifest, SynthesisOutcome, synthesize_exports};
use polypack_lib::resolve::{Entry, resolve_entries};
use tempfile::TempDir;

fn package_with_manifest(manifest: &str) -> TempDir {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("package.json"), manifest).unwrap();
  temp
}

async fn synthesize_and_save(temp: &TempDir, entries: &[Entry]) -> SynthesisOutcome {
  let mut manifest = PackageManifest::load(temp.path()).await.unwrap();
  let outcome = synthesize_exports(&mut manifest, entries);
  if outcome == SynthesisOutcome::Written {
    manifest.save().await.unwrap();
  }
  outcome
}

fn read_manifest(temp: &TempDir) -> String {
  std::fs::read_to_string(temp.path().join("package.json")).unwrap()
}

#[tokio::test]
async fn two_descriptors_yield_three_export_keys() {
  // One descriptor with both formats, one with a mapping-form entry: the
  // mapping's output name is irrelevant, only the source path matters.
  let descriptors: Vec<polypack_lib::config::BuildDescriptor> =
    serde_json::from_value(serde_json::json!([
      {"entry": "./src/index.ts", "format": ["commonjs", "module"]},
      {"entry": {"extra": "./src/extra.ts"}, "format": "module"},
    ]))
    .unwrap();
  let entries = resolve_entries(&descriptors);

  let temp = package_with_manifest(r#"{"name": "demo", "version": "1.0.0"}"#);
  assert_eq!(synthesize_and_save(&temp, &entries).await, SynthesisOutcome::Written);

  let written: serde_json::Value = serde_json::from_str(&read_manifest(&temp)).unwrap();
  let exports = written.get("exports").unwrap().as_object().unwrap();
  let keys: Vec<&str> = exports.keys().map(String::as_str).collect();
  assert_eq!(keys, vec!["./package.json", "./dist/index", "./dist/extra"]);

  assert_eq!(
    exports.get("./dist/index").unwrap(),
    &serde_json::json!({
      "types": "./dist/index.d.ts",
      "require": "./dist/index.js",
      "module": "./dist/index.mjs",
    })
  );
  assert_eq!(
    exports.get("./dist/extra").unwrap(),
    &serde_json::json!({
      "types": "./dist/extra.d.ts",
      "module": "./dist/extra.mjs",
    })
  );
}

#[tokio::test]
async fn output_is_pretty_printed_with_one_trailing_newline() {
  let temp = package_with_manifest(r#"{"name":"demo","version":"1.0.0"}"#);
  let entries = vec![Entry::new("./src/index.ts", FormatTag::Cjs)];
  synthesize_and_save(&temp, &entries).await;

  let text = read_manifest(&temp);
  assert!(text.ends_with('\n'));
  assert!(!text.ends_with("\n\n"));
  // 2-space indentation.
  assert!(text.contains("\n  \"name\": \"demo\""));
}

#[tokio::test]
async fn rerunning_is_byte_identical() {
  let temp = package_with_manifest(
    r#"{"scripts": {"test": "vitest"}, "version": "1.0.0", "name": "demo", "custom": true}"#,
  );
  let entries = vec![
    Entry::new("./src/index.ts", FormatTag::Cjs),
    Entry::new("./src/index.ts", FormatTag::Esm),
  ];

  synthesize_and_save(&temp, &entries).await;
  let first = read_manifest(&temp);

  synthesize_and_save(&temp, &entries).await;
  let second = read_manifest(&temp);

  assert_eq!(first, second);
}

#[tokio::test]
async fn keys_are_canonically_ordered() {
  let temp = package_with_manifest(
    r#"{"scripts": {}, "version": "1.0.0", "dependencies": {}, "name": "demo", "custom": 1}"#,
  );
  let entries = vec![Entry::new("./src/index.ts", FormatTag::Cjs)];
  synthesize_and_save(&temp, &entries).await;

  let written: serde_json::Value = serde_json::from_str(&read_manifest(&temp)).unwrap();
  let keys: Vec<&str> = written.as_object().unwrap().keys().map(String::as_str).collect();
  assert_eq!(
    keys,
    vec!["name", "version", "exports", "scripts", "dependencies", "custom"]
  );
}

#[tokio::test]
async fn save_leaves_no_temp_file_behind() {
  let temp = package_with_manifest(r#"{"name": "demo", "version": "1.0.0"}"#);
  let entries = vec![Entry::new("./src/index.ts", FormatTag::Esm)];

  assert_eq!(synthesize_and_save(&temp, &entries).await, SynthesisOutcome::Written);
  assert!(temp.path().join("package.json").exists());
  assert!(!temp.path().join("package.json.tmp").exists());
}

#[tokio::test]
async fn string_exports_leave_the_file_untouched() {
  let original = r#"{"name": "demo", "exports": "./index.js"}"#;
  let temp = package_with_manifest(original);
  let entries = vec![Entry::new("./src/index.ts", FormatTag::Cjs)];

  assert_eq!(synthesize_and_save(&temp, &entries).await, SynthesisOutcome::Skipped);
  assert_eq!(read_manifest(&temp), original);
}

#[tokio::test]
async fn array_exports_leave_the_file_untouched() {
  let original = r#"{"name": "demo", "exports": ["./a.js"]}"#;
  let temp = package_with_manifest(original);
  let entries = vec![Entry::new("./src/index.ts", FormatTag::Esm)];

  assert_eq!(synthesize_and_save(&temp, &entries).await, SynthesisOutcome::Skipped);
  assert_eq!(read_manifest(&temp), original);
}
