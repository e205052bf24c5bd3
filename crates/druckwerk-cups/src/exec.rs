// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process runner: spawn an external command, capture stdout, and report
// non-zero exits and spawn failures through a single error channel.
//
// The trait seam exists so the directory and submission logic can be tested
// against a spy runner; `SystemRunner` is the production implementation.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use druckwerk_core::error::ExecError;

/// Runs external commands and captures their output.
///
/// All three methods share one contract: success means exit status zero and
/// the captured stdout is returned as UTF-8 text (lossily converted);
/// anything else — non-zero exit, spawn failure, broken pipe — surfaces as
/// an [`ExecError`]. No retries, no timeouts: a hung command hangs the
/// caller.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` and block until it exits.
    fn run(&self, command: &str, args: &[String]) -> Result<String, ExecError>;

    /// Run `command` without blocking the current task.
    async fn run_async(&self, command: &str, args: &[String]) -> Result<String, ExecError>;

    /// Run `command`, stream `input` into its stdin, close it, then capture
    /// output as with [`run_async`](Self::run_async).
    async fn run_with_input(
        &self,
        command: &str,
        input: &[u8],
        args: &[String],
    ) -> Result<String, ExecError>;
}

/// Production runner backed by `std::process` / `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    fn run(&self, command: &str, args: &[String]) -> Result<String, ExecError> {
        debug!(command, ?args, "running command (blocking)");
        let output = std::process::Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ExecError::new(command, args, format!("spawn failed: {e}")))?;
        check_output(command, args, output.status, &output.stdout, &output.stderr)
    }

    async fn run_async(&self, command: &str, args: &[String]) -> Result<String, ExecError> {
        debug!(command, ?args, "running command");
        let output = tokio::process::Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExecError::new(command, args, format!("spawn failed: {e}")))?;
        check_output(command, args, output.status, &output.stdout, &output.stderr)
    }

    async fn run_with_input(
        &self,
        command: &str,
        input: &[u8],
        args: &[String],
    ) -> Result<String, ExecError> {
        debug!(command, ?args, bytes = input.len(), "running command with piped input");
        let mut child = tokio::process::Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecError::new(command, args, format!("spawn failed: {e}")))?;

        // Take stdin out of the child so dropping it closes the pipe and
        // the command sees end-of-input.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExecError::new(command, args, "child stdin unavailable"))?;
        stdin
            .write_all(input)
            .await
            .map_err(|e| ExecError::new(command, args, format!("write to stdin: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExecError::new(command, args, format!("wait: {e}")))?;
        check_output(command, args, output.status, &output.stdout, &output.stderr)
    }
}

/// Map a finished process to text-or-error per the runner contract.
fn check_output(
    command: &str,
    args: &[String],
    status: std::process::ExitStatus,
    stdout: &[u8],
    stderr: &[u8],
) -> Result<String, ExecError> {
    if status.success() {
        Ok(String::from_utf8_lossy(stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(stderr);
        let detail = if stderr.trim().is_empty() {
            status.to_string()
        } else {
            stderr.trim().to_owned()
        };
        Err(ExecError::new(command, args, detail))
    }
}
