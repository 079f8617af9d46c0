//! Export-map grouping.

use std::collections::HashMap;

use serde_json::{Map, Value, json};

use crate::consts;
use crate::format::Condition;
use crate::resolve::{self, Entry};

/// One `exports` subpath group.
///
/// `types` is always derived from the output key; `require`/`module` are
/// populated only for conditions actually contributed by built formats.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportGroup {
  pub require: Option<String>,
  pub module: Option<String>,
}

impl ExportGroup {
  /// Manifest value for this group under `output_key`.
  pub fn to_value(&self, output_key: &str) -> Value {
    let mut group = Map::new();
    group.insert(
      "types".to_string(),
      json!(format!("{}{}", output_key, consts::DECLARATION_EXT)),
    );
    if let Some(require) = &self.require {
      group.insert(Condition::Require.key().to_string(), json!(require));
    }
    if let Some(module) = &self.module {
      group.insert(Condition::Module.key().to_string(), json!(module));
    }
    Value::Object(group)
  }
}

/// Group entries by output key, in first-seen order.
///
/// Within a group the last entry processed wins its condition. Entries with
/// unknown formats contribute nothing and never create a group by
/// themselves.
pub fn export_groups(entries: &[Entry]) -> Vec<(String, ExportGroup)> {
  let mut order: Vec<String> = Vec::new();
  let mut groups: HashMap<String, ExportGroup> = HashMap::new();

  for entry in entries {
    let Some(artifact) = resolve::artifact(entry) else { continue };
    let target = format!("{}{}", artifact.output_key, artifact.extension);
    let group = groups.entry(artifact.output_key.clone()).or_insert_with(|| {
      order.push(artifact.output_key.clone());
      ExportGroup::default()
    });
    match artifact.condition {
      Condition::Require => group.require = Some(target),
      Condition::Module => group.module = Some(target),
    }
  }

  order
    .into_iter()
    .map(|key| {
      let group = groups.remove(&key).unwrap_or_default();
      (key, group)
    })
    .collect()
}
