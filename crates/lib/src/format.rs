//! Module format tags and their static artifact table.
//!
//! Each tag maps to exactly one output extension and one manifest condition.
//! The table is fixed: descriptors cannot override it. Unknown tags are kept
//! verbatim so the compiler still sees them, but they contribute nothing to
//! the manifest.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Manifest condition name a format registers under.
///
/// Two tags may share a condition (an IIFE bundle and an ESM bundle both
/// register under `module`); the last entry processed wins that condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
  Require,
  Module,
}

impl Condition {
  /// Key used inside a manifest export group.
  pub fn key(self) -> &'static str {
    match self {
      Condition::Require => "require",
      Condition::Module => "module",
    }
  }
}

/// A module packaging convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FormatTag {
  /// CommonJS (`require`).
  Cjs,
  /// ECMAScript module (`import`).
  Esm,
  /// Immediately-invoked script for direct browser inclusion.
  Iife,
  /// A tag this core does not know; forwarded to the compiler untouched.
  Other(String),
}

impl From<String> for FormatTag {
  fn from(tag: String) -> Self {
    match tag.as_str() {
      "cjs" | "commonjs" => FormatTag::Cjs,
      "esm" | "module" => FormatTag::Esm,
      "iife" | "immediately-invoked" => FormatTag::Iife,
      _ => FormatTag::Other(tag),
    }
  }
}

impl From<FormatTag> for String {
  fn from(tag: FormatTag) -> Self {
    tag.to_string()
  }
}

impl fmt::Display for FormatTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FormatTag::Cjs => f.write_str("cjs"),
      FormatTag::Esm => f.write_str("esm"),
      FormatTag::Iife => f.write_str("iife"),
      FormatTag::Other(tag) => f.write_str(tag),
    }
  }
}

impl FormatTag {
  /// Output file extension, or `None` for unknown tags.
  pub fn extension(&self) -> Option<&'static str> {
    match self {
      FormatTag::Cjs => Some(".js"),
      FormatTag::Esm => Some(".mjs"),
      FormatTag::Iife => Some(".global.js"),
      FormatTag::Other(_) => None,
    }
  }

  /// Manifest condition, or `None` for unknown tags.
  pub fn condition(&self) -> Option<Condition> {
    match self {
      FormatTag::Cjs => Some(Condition::Require),
      FormatTag::Esm | FormatTag::Iife => Some(Condition::Module),
      FormatTag::Other(_) => None,
    }
  }
}
