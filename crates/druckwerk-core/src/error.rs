// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Druckwerk.

use thiserror::Error;

/// Failure of an external command invocation.
///
/// Produced both when the command exits non-zero and when it cannot be
/// spawned at all (e.g. `lpstat` not installed) — both travel through the
/// same channel. `detail` carries the captured stderr when there is one,
/// otherwise a description of the exit status or spawn failure.
#[derive(Debug, Clone, Error)]
#[error("command `{command} {}` failed: {detail}", args.join(" "))]
pub struct ExecError {
    /// The command that was invoked.
    pub command: String,
    /// The arguments it was invoked with.
    pub args: Vec<String>,
    /// Captured stderr, or a status/spawn-failure description.
    pub detail: String,
}

impl ExecError {
    pub fn new(command: &str, args: &[String], detail: impl Into<String>) -> Self {
        Self {
            command: command.to_owned(),
            args: args.to_vec(),
            detail: detail.into(),
        }
    }
}

/// Top-level error type for all Druckwerk operations.
#[derive(Debug, Error)]
pub enum DruckError {
    /// An external command failed, outside any wrapping operation.
    #[error(transparent)]
    Execution(#[from] ExecError),

    /// The caller omitted a required field of a print request.
    #[error("invalid print request: {0}")]
    Validation(String),

    /// The referenced printer is absent from the current cache.
    #[error("printer `{0}` not found")]
    PrinterNotFound(String),

    /// A status query failed while building a printer snapshot.
    #[error("status snapshot failed: {0}")]
    Snapshot(#[source] ExecError),

    /// The submission command failed while sending a job.
    #[error("job submission failed: {0}")]
    Submission(#[source] ExecError),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DruckError>;
