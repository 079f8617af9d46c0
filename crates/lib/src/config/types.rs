//! Build descriptor types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::format::FormatTag;

/// One build task as authored in the configuration source.
///
/// Only `entry` and `format` are interpreted by this core; every other field
/// is an opaque compiler option carried through the merge untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildDescriptor {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub entry: Option<EntrySpec>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub format: Option<FormatSpec>,

  /// Arbitrary compiler-specific options.
  #[serde(flatten)]
  pub options: Map<String, Value>,
}

/// The `entry` field: one path, a list of paths, or output-name -> path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntrySpec {
  One(String),
  Many(Vec<String>),
  Named(BTreeMap<String, String>),
}

impl EntrySpec {
  /// Source files of this entry spec.
  ///
  /// For the mapping form only the values matter; the output-name keys are
  /// discarded.
  pub fn files(&self) -> Vec<String> {
    match self {
      EntrySpec::One(file) => vec![file.clone()],
      EntrySpec::Many(files) => files.clone(),
      EntrySpec::Named(named) => named.values().cloned().collect(),
    }
  }
}

/// The `format` field: a single tag or a list of tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormatSpec {
  One(FormatTag),
  Many(Vec<FormatTag>),
}

impl FormatSpec {
  /// Formats coerced to a list even when given as a scalar.
  pub fn tags(&self) -> Vec<FormatTag> {
    match self {
      FormatSpec::One(tag) => vec![tag.clone()],
      FormatSpec::Many(tags) => tags.clone(),
    }
  }
}
