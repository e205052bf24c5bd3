// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk CUPS — drives a local CUPS install entirely through its
// command-line tools (`lpstat` for status, `lp` for submission), with no
// compiled native bindings. This crate bridges between the domain types in
// `druckwerk-core` and the print subsystem's textual CLI.

pub mod directory;
pub mod exec;
pub mod submit;

mod extract;
mod snapshot;

pub use directory::PrinterDirectory;
pub use exec::{CommandRunner, SystemRunner};
