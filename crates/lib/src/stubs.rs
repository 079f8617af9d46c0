//! Type-declaration stub generation.
//!
//! Every resolved entry gets a small re-export file inside the output tree
//! that forwards type information back to the original source file, so
//! development-mode consumers can resolve types without a compiled artifact.
//! The driver skips this step entirely in optimized mode.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts;
use crate::paths;
use crate::resolve;

/// Errors that can occur while writing a stub file.
#[derive(Debug, Error)]
pub enum StubError {
  #[error("failed to create directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write stub {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Render the stub body for an entry file.
///
/// One generated-file comment plus one re-export whose specifier is the
/// relative path from the stub's directory back to the source file,
/// forward-slash joined regardless of host platform. Deterministic:
/// re-running produces byte-identical output.
pub fn stub_contents(entry_file: &str) -> String {
  let output_key = resolve::output_key(entry_file);
  let source = paths::strip_extension(entry_file);
  let to_source_dir = paths::relative(&paths::parent(&output_key), &paths::parent(&source));
  let specifier = format!("{}/{}", to_source_dir, paths::file_stem(&source));
  format!("// Generated by polypack, do not edit.\nexport * from '{specifier}'\n")
}

/// On-disk location of the stub for an entry file, under the package root.
pub fn stub_path(root: &Path, entry_file: &str) -> PathBuf {
  let logical = format!("{}{}", resolve::output_key(entry_file), consts::DECLARATION_EXT);
  paths::to_native(root, &logical)
}

/// Write (or overwrite) the stub for one entry file, creating the
/// destination directory chain as needed.
pub async fn write_stub(root: &Path, entry_file: &str) -> Result<(), StubError> {
  let path = stub_path(root, entry_file);
  if let Some(parent) = path.parent() {
    tokio::fs::create_dir_all(parent)
      .await
      .map_err(|source| StubError::CreateDir { path: parent.to_path_buf(), source })?;
  }
  tokio::fs::write(&path, stub_contents(entry_file))
    .await
    .map_err(|source| StubError::Write { path: path.clone(), source })?;
  debug!(path = %path.display(), "wrote type stub");
  Ok(())
}
