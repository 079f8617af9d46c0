//! polypack: multi-target build orchestrator for a library package.
//!
//! One-shot batch job: it loads the package's build descriptors, runs every
//! build task through the external compiler, generates type stubs,
//! synthesizes the manifest export map, and finishes with the two fixed
//! bundle builds. Exit status 0 on full success, 1 on any failure.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use polypack_lib::compiler::CommandCompiler;
use polypack_lib::consts;
use polypack_lib::driver::{self, Flags, RunOptions, RunSummary};
use polypack_lib::manifest::PackageManifest;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  match run() {
    Ok(summary) => {
      report(&summary);
      ExitCode::SUCCESS
    }
    Err(err) => {
      // Best effort; a failure while printing must not change the exit
      // status back to success.
      let _ = writeln!(std::io::stderr(), "{} {:?}", "error:".red().bold(), err);
      ExitCode::FAILURE
    }
  }
}

fn run() -> Result<RunSummary> {
  let flags = Flags::parse(std::env::args().skip(1));
  let cwd = std::env::current_dir().context("failed to determine working directory")?;
  let root = dunce::canonicalize(&cwd).unwrap_or(cwd);
  debug!(root = %root.display(), ?flags, "starting build");

  let runtime = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
  runtime.block_on(async {
    // The preset bundle externalizes the package's own runtime dependencies.
    let preset_externals = match PackageManifest::load(&root).await {
      Ok(manifest) => manifest.dependency_names(),
      Err(_) => Vec::new(),
    };

    let compiler = Arc::new(CommandCompiler::from_env());
    let options = RunOptions { flags, preset_externals };
    driver::run(&root, compiler, &options).await.map_err(anyhow::Error::from)
  })
}

fn report(summary: &RunSummary) {
  // CI suppresses the success line; behavior is otherwise unchanged.
  if std::env::var_os(consts::CI_ENV).is_some() {
    return;
  }
  let exports = if summary.manifest_written {
    ", exports updated"
  } else {
    ""
  };
  println!(
    "{} build complete ({} tasks, {} stubs{exports})",
    "✓".green(),
    summary.tasks_built,
    summary.stubs_written,
  );
}
