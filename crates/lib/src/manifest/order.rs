//! Canonical manifest key ordering.

use serde_json::{Map, Value};

/// Well-known top-level manifest keys, in the conventional ecosystem order.
/// Keys not listed here keep their prior relative order after the known
/// ones.
const KEY_ORDER: [&str; 30] = [
  "name",
  "version",
  "private",
  "description",
  "keywords",
  "homepage",
  "bugs",
  "repository",
  "funding",
  "license",
  "author",
  "contributors",
  "type",
  "sideEffects",
  "exports",
  "main",
  "module",
  "browser",
  "types",
  "typings",
  "bin",
  "files",
  "engines",
  "scripts",
  "peerDependencies",
  "peerDependenciesMeta",
  "dependencies",
  "optionalDependencies",
  "devDependencies",
  "publishConfig",
];

/// Reorder top-level manifest keys into the canonical ordering.
///
/// Only the top level is reordered; nested objects (scripts, dependency
/// tables, export groups) keep their authored key order.
///
/// Stable and deterministic: applying it to its own output is a no-op.
pub fn canonical_order(fields: &Map<String, Value>) -> Map<String, Value> {
  let mut ordered = Map::new();
  for key in KEY_ORDER {
    if let Some(value) = fields.get(key) {
      ordered.insert(key.to_string(), value.clone());
    }
  }
  for (key, value) in fields {
    if !KEY_ORDER.contains(&key.as_str()) {
      ordered.insert(key.clone(), value.clone());
    }
  }
  ordered
}
