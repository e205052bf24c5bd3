// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Driver configuration.

use serde::{Deserialize, Serialize};

/// Names of the external print-subsystem commands.
///
/// The defaults match a stock CUPS install; tests and exotic setups can
/// point them at wrappers or fixtures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CupsConfig {
    /// Status-query command (printer list, default, addresses...).
    pub status_command: String,
    /// Job-submission command.
    pub submit_command: String,
}

impl Default for CupsConfig {
    fn default() -> Self {
        Self {
            status_command: "lpstat".into(),
            submit_command: "lp".into(),
        }
    }
}
