// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk — Core types, errors, and configuration shared across crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::CupsConfig;
pub use error::{DruckError, ExecError};
pub use types::*;
