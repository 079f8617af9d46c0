//! Entry and artifact resolution.
//!
//! Expands each descriptor's entries against its formats into a flat list of
//! (source file, format) pairs, and maps each pair to its output location
//! and manifest condition through the static format table.

use serde::{Deserialize, Serialize};

use crate::config::{BuildDescriptor, FormatSpec};
use crate::consts;
use crate::format::{Condition, FormatTag};
use crate::paths;

/// A (source file, output format) pair slated for compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
  /// Logical source path, forward-slash form.
  pub file: String,
  pub format: FormatTag,
}

impl Entry {
  pub fn new(file: impl AsRef<str>, format: FormatTag) -> Self {
    Self {
      file: paths::normalize(file.as_ref()),
      format,
    }
  }
}

/// Flatten every descriptor's entries against every one of its formats.
///
/// Mapping-form entries contribute their values (the output-name keys are
/// discarded); descriptors without an entry are skipped; a scalar format is
/// coerced to a one-element list.
pub fn resolve_entries(descriptors: &[BuildDescriptor]) -> Vec<Entry> {
  let mut entries = Vec::new();
  for descriptor in descriptors {
    let Some(spec) = &descriptor.entry else { continue };
    let formats = descriptor.format.as_ref().map(FormatSpec::tags).unwrap_or_default();
    for file in spec.files() {
      for format in &formats {
        entries.push(Entry::new(&file, format.clone()));
      }
    }
  }
  entries
}

/// Output coordinates for one entry whose format participates in the
/// manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
  /// Logical output path without extension, e.g. `./dist/foo/bar`.
  pub output_key: String,
  pub extension: &'static str,
  pub condition: Condition,
}

/// Logical output key for a source file: the source root rewritten to the
/// output root, extension dropped. Computed from forward-slash segments so
/// the result is identical on every host platform.
pub fn output_key(file: &str) -> String {
  let rebased = paths::rebase(file, consts::SOURCE_ROOT, consts::OUTPUT_ROOT)
    .unwrap_or_else(|| paths::normalize(file));
  paths::strip_extension(&rebased)
}

/// Map an entry to its artifact coordinates via the static format table.
///
/// `None` for unknown format tags: they are still built by the compiler but
/// contribute nothing to the manifest.
pub fn artifact(entry: &Entry) -> Option<Artifact> {
  Some(Artifact {
    output_key: output_key(&entry.file),
    extension: entry.format.extension()?,
    condition: entry.format.condition()?,
  })
}
