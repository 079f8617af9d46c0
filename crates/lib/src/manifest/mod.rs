//! Package manifest reading, export-map synthesis, and atomic write-back.
//!
//! The manifest is read once per invocation, mutated in memory as an
//! explicit value, and written back at most once as a whole-file overwrite
//! (temp file plus rename, so the old or the new manifest is on disk, never
//! a partial write). Only the `exports` field and top-level key ordering are
//! mutated by this module.

mod exports;
mod order;

use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, info};

use crate::consts;
use crate::resolve::Entry;

pub use exports::{ExportGroup, export_groups};

/// Errors that can occur while reading or writing the manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse manifest {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("manifest {path} is not a JSON object")]
  NotAnObject { path: PathBuf },

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("failed to write manifest {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Outcome of a synthesis attempt.
///
/// `Skipped` is not an error: an existing `exports` field using conditional
/// shorthand (a string or an array) is a legitimate pre-existing state that
/// this core refuses to clobber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisOutcome {
  Written,
  Skipped,
}

/// The package's own manifest, held as raw JSON so fields this core does not
/// know about survive the round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageManifest {
  path: PathBuf,
  fields: Map<String, Value>,
}

impl PackageManifest {
  /// Read and parse `package.json` from the package root.
  pub async fn load(root: &Path) -> Result<Self, ManifestError> {
    let path = root.join(consts::MANIFEST_FILENAME);
    let text = tokio::fs::read_to_string(&path)
      .await
      .map_err(|source| ManifestError::Read { path: path.clone(), source })?;
    let value: Value =
      serde_json::from_str(&text).map_err(|source| ManifestError::Parse { path: path.clone(), source })?;
    match value {
      Value::Object(fields) => Ok(Self { path, fields }),
      _ => Err(ManifestError::NotAnObject { path }),
    }
  }

  /// The package version, if declared.
  pub fn version(&self) -> Option<&str> {
    self.fields.get("version").and_then(Value::as_str)
  }

  /// Names of runtime dependencies, in manifest order.
  pub fn dependency_names(&self) -> Vec<String> {
    match self.fields.get("dependencies") {
      Some(Value::Object(dependencies)) => dependencies.keys().cloned().collect(),
      _ => Vec::new(),
    }
  }

  pub fn fields(&self) -> &Map<String, Value> {
    &self.fields
  }

  /// Serialize with canonical key ordering: pretty-printed 2-space JSON
  /// terminated by exactly one trailing newline.
  pub fn to_pretty_string(&self) -> Result<String, ManifestError> {
    let ordered = order::canonical_order(&self.fields);
    let mut text = serde_json::to_string_pretty(&Value::Object(ordered))?;
    text.push('\n');
    Ok(text)
  }

  /// Write the manifest back as a single whole-file overwrite.
  ///
  /// Goes through a sibling temp file and a rename, so a crash mid-write
  /// leaves the previous manifest intact. Concurrent external edits during
  /// the run are unsafe by design.
  pub async fn save(&self) -> Result<(), ManifestError> {
    let text = self.to_pretty_string()?;
    let temp_path = self.path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &text)
      .await
      .map_err(|source| ManifestError::Write { path: temp_path.clone(), source })?;
    tokio::fs::rename(&temp_path, &self.path)
      .await
      .map_err(|source| ManifestError::Write { path: self.path.clone(), source })?;
    debug!(path = %self.path.display(), "wrote manifest");
    Ok(())
  }
}

/// Synthesize the manifest `exports` map from the resolved entry list.
///
/// Mutation proceeds only when the existing `exports` field is absent or a
/// plain object; a string, array, or any other shape returns
/// [`SynthesisOutcome::Skipped`] and leaves the manifest untouched.
///
/// On success `exports` is *replaced* (not merged) by
/// `{ "./package.json": "./package.json", ...groups }` with the pin always
/// first. Hand-authored subpaths other than `./package.json` are dropped;
/// the precondition gate is the only protection against that.
pub fn synthesize_exports(manifest: &mut PackageManifest, entries: &[Entry]) -> SynthesisOutcome {
  match manifest.fields.get("exports") {
    None | Some(Value::Object(_)) => {}
    Some(_) => {
      info!("existing exports field is not a plain object, leaving manifest untouched");
      return SynthesisOutcome::Skipped;
    }
  }

  let mut map = Map::new();
  map.insert("./package.json".to_string(), json!("./package.json"));
  for (output_key, group) in export_groups(entries) {
    map.insert(output_key.clone(), group.to_value(&output_key));
  }

  let count = map.len() - 1;
  manifest.fields.insert("exports".to_string(), Value::Object(map));
  info!(subpaths = count, "synthesized manifest exports");
  SynthesisOutcome::Written
}
