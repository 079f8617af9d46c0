//! Option layer merging.
//!
//! The effective options for one build task are a strict shallow merge of
//! `{...defaults, ...descriptor, ...overrides}`: later layers replace entire
//! field values. The single sanctioned exception is [`merge_nested`], which
//! a caller can thread explicitly to add keys inside one nested object
//! without replacing it wholesale.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts;

use super::types::BuildDescriptor;

/// Settings supplied below the user's descriptor.
///
/// Always carries the output directory, tree-shaking, and minification
/// policy, so every task has them even when the descriptor is silent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Defaults {
  #[serde(rename = "outDir")]
  pub out_dir: String,
  pub treeshake: bool,
  pub minify: bool,
}

impl Defaults {
  pub fn new(optimized: bool) -> Self {
    Self {
      out_dir: consts::OUTPUT_ROOT.to_string(),
      treeshake: true,
      minify: optimized,
    }
  }
}

/// Settings that always win over the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Overrides {
  pub watch: bool,
  pub clean: bool,
}

impl Overrides {
  /// Watch mode never cleans the output directory between rebuilds.
  pub fn new(watch: bool) -> Self {
    Self { watch, clean: !watch }
  }
}

/// The fully merged option set handed to the compiler for one build task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectiveOptions(pub Map<String, Value>);

impl EffectiveOptions {
  pub fn get(&self, field: &str) -> Option<&Value> {
    self.0.get(field)
  }

  pub fn watch(&self) -> bool {
    matches!(self.0.get("watch"), Some(Value::Bool(true)))
  }

  pub fn out_dir(&self) -> Option<&str> {
    self.0.get("outDir").and_then(Value::as_str)
  }
}

/// Shallow three-layer merge; later layers replace whole field values.
pub fn merge_layers(
  defaults: &Defaults,
  descriptor: &BuildDescriptor,
  overrides: &Overrides,
) -> EffectiveOptions {
  let mut merged = to_map(defaults);
  for (field, value) in to_map(descriptor) {
    merged.insert(field, value);
  }
  for (field, value) in to_map(overrides) {
    merged.insert(field, value);
  }
  EffectiveOptions(merged)
}

/// Additively merge keys into one nested object field.
///
/// Existing sibling keys inside `field` survive; keys present in
/// `additions` win. A non-object value under `field` is replaced.
pub fn merge_nested(options: &mut EffectiveOptions, field: &str, additions: &Map<String, Value>) {
  if additions.is_empty() {
    return;
  }
  let slot = options
    .0
    .entry(field.to_string())
    .or_insert_with(|| Value::Object(Map::new()));
  if let Value::Object(existing) = slot {
    for (key, value) in additions {
      existing.insert(key.clone(), value.clone());
    }
  } else {
    *slot = Value::Object(additions.clone());
  }
}

fn to_map<T: Serialize>(layer: &T) -> Map<String, Value> {
  match serde_json::to_value(layer) {
    Ok(Value::Object(map)) => map,
    _ => Map::new(),
  }
}
