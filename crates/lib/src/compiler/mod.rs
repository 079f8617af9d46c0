//! The external compiler seam.
//!
//! Compilation is an opaque collaborator: `build(request)` leaves artifacts
//! on disk and this core never inspects them. Descriptor builds and the two
//! fixed bundle builds go through the same trait so orchestration stays free
//! of one-off branching.

mod command;

use std::collections::BTreeMap;
use std::io;
use std::process::ExitStatus;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EffectiveOptions;
use crate::format::FormatTag;

pub use command::CommandCompiler;

/// Errors from a compiler invocation. Always fatal to the run; there is no
/// retry and no partial-artifact cleanup.
#[derive(Debug, Error)]
pub enum CompileError {
  #[error("failed to encode compile request: {0}")]
  Encode(#[from] serde_json::Error),

  #[error("failed to spawn compiler `{program}`: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to hand request to compiler: {0}")]
  Handoff(#[source] io::Error),

  #[error("compiler exited with {status}: {stderr}")]
  Failed { status: ExitStatus, stderr: String },

  /// For embedders implementing [`Compiler`] directly.
  #[error("compile failed: {0}")]
  Other(String),
}

/// One unit of work handed to the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompileRequest {
  /// A descriptor build with fully merged options.
  Task { options: EffectiveOptions },
  /// One of the fixed bundle builds outside the descriptor pipeline.
  Bundle(BundleSpec),
}

/// A fixed-shape bundle build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleSpec {
  pub entry_points: Vec<String>,
  pub format: FormatTag,
  /// Browser target list.
  pub targets: Vec<String>,
  /// Platform globals aliased to browser-compatible shims.
  pub alias: BTreeMap<String, String>,
  /// Substitutions baked into the output.
  pub define: BTreeMap<String, String>,
  /// Packages excluded from the bundle.
  pub external: Vec<String>,
}

/// The opaque `build(request) -> artifacts on disk` collaborator.
#[async_trait]
pub trait Compiler: Send + Sync {
  async fn build(&self, request: CompileRequest) -> Result<(), CompileError>;
}
