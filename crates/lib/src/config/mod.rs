//! Build configuration loading and option merging.
//!
//! The configuration source may be authored as a single descriptor, a list
//! of descriptors, or a factory producing either. [`load_descriptors`]
//! resolves any of these through one explicit normalization step into an
//! ordered descriptor list; an empty result is fatal before any build task
//! starts.

mod merge;
mod types;

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::consts;

pub use merge::{Defaults, EffectiveOptions, Overrides, merge_layers, merge_nested};
pub use types::{BuildDescriptor, EntrySpec, FormatSpec};

/// Errors that can occur while loading build configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The normalized descriptor list came out empty.
  #[error("no build configuration found")]
  NoConfiguration,

  /// The config file could not be read.
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The config file is not valid JSON, or a descriptor has a bad shape.
  #[error("failed to parse config: {0}")]
  Parse(#[from] serde_json::Error),
}

/// Empty context handed to factory config sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactoryContext {}

/// A config source already narrowed to a concrete descriptor shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigShape {
  Single(BuildDescriptor),
  List(Vec<BuildDescriptor>),
}

impl From<BuildDescriptor> for ConfigShape {
  fn from(descriptor: BuildDescriptor) -> Self {
    ConfigShape::Single(descriptor)
  }
}

impl From<Vec<BuildDescriptor>> for ConfigShape {
  fn from(descriptors: Vec<BuildDescriptor>) -> Self {
    ConfigShape::List(descriptors)
  }
}

type FactoryFuture = Pin<Box<dyn Future<Output = ConfigShape> + Send>>;

/// A descriptor-producing function, sync or async.
pub type DescriptorFactory = Box<dyn FnOnce(FactoryContext) -> FactoryFuture + Send>;

/// The configuration source, as a tagged variant instead of runtime shape
/// inspection.
pub enum ConfigSource {
  Single(BuildDescriptor),
  List(Vec<BuildDescriptor>),
  Factory(DescriptorFactory),
}

impl ConfigSource {
  /// Load the conventional config file relative to the package root.
  pub async fn from_file(root: &Path) -> Result<Self, ConfigError> {
    let path = root.join(consts::CONFIG_FILENAME);
    let text = tokio::fs::read_to_string(&path)
      .await
      .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
    let value: Value = serde_json::from_str(&text)?;
    debug!(path = %path.display(), "loaded config file");
    Self::from_value(value)
  }

  /// Narrow a raw JSON value: an object is a single descriptor, an array a
  /// list, and any other shape an empty list.
  pub fn from_value(value: Value) -> Result<Self, ConfigError> {
    match value {
      Value::Object(_) => Ok(ConfigSource::Single(serde_json::from_value(value)?)),
      Value::Array(_) => Ok(ConfigSource::List(serde_json::from_value(value)?)),
      _ => Ok(ConfigSource::List(Vec::new())),
    }
  }

  /// Wrap a descriptor-producing closure, for embedders that compute their
  /// configuration instead of authoring a file.
  pub fn factory<F, Fut, S>(factory: F) -> Self
  where
    F: FnOnce(FactoryContext) -> Fut + Send + 'static,
    Fut: Future<Output = S> + Send + 'static,
    S: Into<ConfigShape>,
  {
    ConfigSource::Factory(Box::new(move |context| {
      Box::pin(async move { factory(context).await.into() })
    }))
  }
}

/// Normalize a configuration source into an ordered descriptor list.
///
/// Factories are invoked with an empty context and awaited; their result is
/// coerced the same way a file export would be. An empty list is
/// [`ConfigError::NoConfiguration`], which aborts the run before any
/// artifact is produced.
pub async fn load_descriptors(source: ConfigSource) -> Result<Vec<BuildDescriptor>, ConfigError> {
  let descriptors = match source {
    ConfigSource::Single(descriptor) => vec![descriptor],
    ConfigSource::List(descriptors) => descriptors,
    ConfigSource::Factory(factory) => match factory(FactoryContext::default()).await {
      ConfigShape::Single(descriptor) => vec![descriptor],
      ConfigShape::List(descriptors) => descriptors,
    },
  };

  if descriptors.is_empty() {
    return Err(ConfigError::NoConfiguration);
  }

  debug!(count = descriptors.len(), "loaded build descriptors");
  Ok(descriptors)
}
