//! polypack-lib: engine for the polypack build orchestrator.
//!
//! Given one or more build-configuration descriptors this crate produces
//! compiled artifacts in several module formats through an external
//! compiler, generates type-declaration stub files for unbundled
//! development, and synthesizes the package manifest's `exports` map.
//!
//! - `config`: descriptor loading and option-layer merging
//! - `format`: the static format tag -> extension/condition table
//! - `resolve`: entry x format expansion and artifact mapping
//! - `stubs`: type-declaration stub generation
//! - `manifest`: export-map synthesis and atomic manifest write-back
//! - `compiler`: the opaque compiler seam
//! - `driver`: staged orchestration

pub mod compiler;
pub mod config;
pub mod consts;
pub mod driver;
pub mod format;
pub mod manifest;
pub mod paths;
pub mod resolve;
pub mod stubs;
