//! Orchestration driver.
//!
//! A single-shot batch job, linear with parallel sub-stages:
//!
//! 1. RESET: optionally empty the output directory (strictly before any
//!    build, so it cannot race a write from this invocation)
//! 2. LOAD: config source -> descriptors, manifest read
//! 3. BUILD: every merged descriptor through the compiler concurrently,
//!    joined as a wait-for-all barrier
//! 4. POST: type stubs and manifest synthesis, concurrently; both need the
//!    complete entry list so they start only after the barrier
//! 5. EXTRA BUILDS: two fixed-shape bundle builds, sequential and
//!    unconditional
//!
//! Every failure anywhere is fatal to the whole run; there is no
//! partial-success or retry model.

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, json};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::compiler::{BundleSpec, CompileError, CompileRequest, Compiler};
use crate::config::{self, ConfigError, ConfigSource, Defaults, Overrides};
use crate::consts;
use crate::format::FormatTag;
use crate::manifest::{self, ManifestError, PackageManifest, SynthesisOutcome};
use crate::paths;
use crate::resolve::{self, Entry};
use crate::stubs::{self, StubError};

/// Flags recognized on the invocation arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
  pub watch: bool,
  pub optimized: bool,
  pub reset: bool,
}

impl Flags {
  /// Scan raw arguments. Flags are detected by prefix match, not exact
  /// match; all other tokens are ignored.
  pub fn parse<I, S>(args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut flags = Self::default();
    for arg in args {
      let arg = arg.as_ref();
      if arg.starts_with("--watch") {
        flags.watch = true;
      } else if arg.starts_with("--optimized") {
        flags.optimized = true;
      } else if arg.starts_with("--reset") {
        flags.reset = true;
      }
    }
    flags
  }
}

/// Per-invocation options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
  pub flags: Flags,
  /// External-package exclusion list for the preset bundle.
  pub preset_externals: Vec<String>,
}

/// What one invocation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
  pub tasks_built: usize,
  pub stubs_written: usize,
  pub manifest_written: bool,
}

/// Errors that can occur during a run.
#[derive(Debug, Error)]
pub enum DriverError {
  #[error("configuration error: {0}")]
  Config(#[from] ConfigError),

  #[error("compile error: {0}")]
  Compile(#[from] CompileError),

  #[error("manifest error: {0}")]
  Manifest(#[from] ManifestError),

  #[error("stub error: {0}")]
  Stub(#[from] StubError),

  #[error("failed to reset output directory {path}: {source}")]
  Reset {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("build task panicked: {0}")]
  Join(#[from] tokio::task::JoinError),
}

/// Run the whole build for the package rooted at `root`.
pub async fn run(
  root: &Path,
  compiler: Arc<dyn Compiler>,
  options: &RunOptions,
) -> Result<RunSummary, DriverError> {
  let flags = options.flags;

  if flags.reset {
    reset_output_dir(root).await?;
  }

  let source = ConfigSource::from_file(root).await?;
  let descriptors = config::load_descriptors(source).await?;
  let mut manifest = PackageManifest::load(root).await?;

  // Build-time substitutions threaded additively into each task's nested
  // `define`, on top of whatever the descriptor authored there.
  let mut build_defines = Map::new();
  if let Some(version) = manifest.version() {
    build_defines.insert("__VERSION__".to_string(), json!(format!("\"{version}\"")));
  }

  // BUILD: all tasks concurrently, no ordering guarantee among them.
  let defaults = Defaults::new(flags.optimized);
  let overrides = Overrides::new(flags.watch);
  let mut tasks = JoinSet::new();
  for descriptor in &descriptors {
    let mut task_options = config::merge_layers(&defaults, descriptor, &overrides);
    config::merge_nested(&mut task_options, "define", &build_defines);
    let compiler = Arc::clone(&compiler);
    let request = CompileRequest::Task { options: task_options };
    tasks.spawn(async move { compiler.build(request).await });
  }
  let tasks_built = descriptors.len();
  while let Some(joined) = tasks.join_next().await {
    joined??;
  }
  info!(count = tasks_built, "all build tasks complete");

  // The entry list is complete only after the barrier above; the manifest
  // additionally carries the fixed runtime-globals bundles.
  let entries = resolve::resolve_entries(&descriptors);
  let mut manifest_entries = entries.clone();
  for file in consts::RUNTIME_GLOBAL_ENTRIES {
    manifest_entries.push(Entry::new(file, FormatTag::Esm));
  }

  let stub_stage = async {
    if flags.optimized {
      debug!("optimized build, skipping type stubs");
      return Ok::<usize, DriverError>(0);
    }
    let mut written = 0usize;
    let mut seen: HashSet<&str> = HashSet::new();
    for entry in &entries {
      if seen.insert(entry.file.as_str()) {
        stubs::write_stub(root, &entry.file).await?;
        written += 1;
      }
    }
    Ok(written)
  };

  let manifest_stage = async {
    let outcome = manifest::synthesize_exports(&mut manifest, &manifest_entries);
    if outcome == SynthesisOutcome::Written {
      manifest.save().await?;
    }
    Ok::<SynthesisOutcome, DriverError>(outcome)
  };

  let (stubs_written, outcome) = tokio::try_join!(stub_stage, manifest_stage)?;

  // EXTRA BUILDS: fixed shapes outside the descriptor pipeline, in order.
  compiler.build(CompileRequest::Bundle(runtime_globals_bundle())).await?;
  compiler
    .build(CompileRequest::Bundle(preset_bundle(&options.preset_externals)))
    .await?;
  info!("extra bundle builds complete");

  Ok(RunSummary {
    tasks_built,
    stubs_written,
    manifest_written: outcome == SynthesisOutcome::Written,
  })
}

/// Recursively empty the output directory.
async fn reset_output_dir(root: &Path) -> Result<(), DriverError> {
  let dir = paths::to_native(root, consts::OUTPUT_ROOT);
  match tokio::fs::remove_dir_all(&dir).await {
    Ok(()) => {}
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(source) => return Err(DriverError::Reset { path: dir, source }),
  }
  tokio::fs::create_dir_all(&dir)
    .await
    .map_err(|source| DriverError::Reset { path: dir.clone(), source })?;
  info!(path = %dir.display(), "reset output directory");
  Ok(())
}

fn browser_policy() -> (Vec<String>, BTreeMap<String, String>, BTreeMap<String, String>) {
  let targets = consts::BROWSER_TARGETS.iter().map(|t| t.to_string()).collect();
  let alias = consts::GLOBAL_ALIASES
    .iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect();
  let define = consts::PRODUCTION_DEFINES
    .iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();
  (targets, alias, define)
}

/// ESM bundles of the runtime-globals entry points.
fn runtime_globals_bundle() -> BundleSpec {
  let (targets, alias, define) = browser_policy();
  BundleSpec {
    entry_points: consts::RUNTIME_GLOBAL_ENTRIES.iter().map(|e| e.to_string()).collect(),
    format: FormatTag::Esm,
    targets,
    alias,
    define,
    external: Vec::new(),
  }
}

/// ESM bundle of the common manager preset, with caller-supplied externals.
fn preset_bundle(externals: &[String]) -> BundleSpec {
  let (targets, alias, define) = browser_policy();
  BundleSpec {
    entry_points: vec![consts::PRESET_ENTRY.to_string()],
    format: FormatTag::Esm,
    targets,
    alias,
    define,
    external: externals.to_vec(),
  }
}
