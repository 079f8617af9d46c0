//! Subprocess-backed compiler.
//!
//! Contract with the external program: the request is serialized as one JSON
//! document on stdin, artifacts land on disk, and the exit status is the
//! verdict. Stdout is discarded; stderr is captured for the failure report.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::consts;

use super::{CompileError, CompileRequest, Compiler};

/// Runs an external compiler program for every request.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
  program: String,
}

impl CommandCompiler {
  pub fn new(program: impl Into<String>) -> Self {
    Self { program: program.into() }
  }

  /// Program named by `POLYPACK_COMPILER`, falling back to the default.
  pub fn from_env() -> Self {
    let program =
      std::env::var(consts::COMPILER_ENV).unwrap_or_else(|_| consts::DEFAULT_COMPILER.to_string());
    Self::new(program)
  }

  pub fn program(&self) -> &str {
    &self.program
  }
}

#[async_trait]
impl Compiler for CommandCompiler {
  async fn build(&self, request: CompileRequest) -> Result<(), CompileError> {
    let payload = serde_json::to_string(&request)?;
    debug!(program = %self.program, "invoking compiler");

    let mut child = Command::new(&self.program)
      .stdin(Stdio::piped())
      .stdout(Stdio::null())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(|source| CompileError::Spawn { program: self.program.clone(), source })?;

    if let Some(mut stdin) = child.stdin.take() {
      // A compiler that exits before draining stdin reports through its
      // status, not through the broken pipe.
      match stdin.write_all(payload.as_bytes()).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
        Err(e) => return Err(CompileError::Handoff(e)),
      }
    }

    let output = child.wait_with_output().await.map_err(CompileError::Handoff)?;
    if !output.status.success() {
      return Err(CompileError::Failed {
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      });
    }
    Ok(())
  }
}
