// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Status snapshot builder: issues the fixed set of `lpstat` queries and
// collects their raw text outputs. The snapshot is consumed immediately by
// the extractor and never exposed to callers.

use tracing::debug;

use druckwerk_core::config::CupsConfig;
use druckwerk_core::error::{DruckError, Result};

use crate::exec::CommandRunner;

/// The fixed query set, name → flags, all against the status command.
const QUERIES: [(&str, &[&str]); 5] = [
    ("printers", &["-p"]),
    ("accepting", &["-a"]),
    ("addresses", &["-s"]),
    ("default", &["-d"]),
    ("details", &["-l", "-p"]),
];

/// One coherent set of raw status-query responses.
///
/// All five queries must succeed; there is no partial snapshot.
#[derive(Debug, Clone, Default)]
pub(crate) struct StatusSnapshot {
    /// `lpstat -p` — printer list with per-printer state header lines.
    pub printers: String,
    /// `lpstat -a` — which printers currently accept jobs.
    pub accepting: String,
    /// `lpstat -s` — device URIs/sockets per printer.
    pub addresses: String,
    /// `lpstat -d` — name of the default destination.
    pub default: String,
    /// `lpstat -l -p` — long-form per-printer descriptive blocks.
    pub details: String,
}

impl StatusSnapshot {
    fn store(&mut self, query: &str, text: String) {
        match query {
            "printers" => self.printers = text,
            "accepting" => self.accepting = text,
            "addresses" => self.addresses = text,
            "default" => self.default = text,
            "details" => self.details = text,
            other => unreachable!("unknown status query `{other}`"),
        }
    }
}

fn owned_args(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|s| s.to_string()).collect()
}

/// Collect a snapshot by running the five queries one after another,
/// blocking on each. Used for the cold load.
pub(crate) fn collect_blocking(
    runner: &dyn CommandRunner,
    config: &CupsConfig,
) -> Result<StatusSnapshot> {
    let mut snapshot = StatusSnapshot::default();
    for (query, flags) in QUERIES {
        let text = runner
            .run(&config.status_command, &owned_args(flags))
            .map_err(DruckError::Snapshot)?;
        debug!(query, bytes = text.len(), "status query answered");
        snapshot.store(query, text);
    }
    Ok(snapshot)
}

/// Collect a snapshot by running the five queries concurrently and awaiting
/// them all. Used for background refreshes.
pub(crate) async fn collect(
    runner: &dyn CommandRunner,
    config: &CupsConfig,
) -> Result<StatusSnapshot> {
    let cmd = &config.status_command;
    let flags: Vec<Vec<String>> = QUERIES.iter().map(|(_, f)| owned_args(f)).collect();

    let (printers, accepting, addresses, default, details) = tokio::try_join!(
        runner.run_async(cmd, &flags[0]),
        runner.run_async(cmd, &flags[1]),
        runner.run_async(cmd, &flags[2]),
        runner.run_async(cmd, &flags[3]),
        runner.run_async(cmd, &flags[4]),
    )
    .map_err(DruckError::Snapshot)?;

    debug!("concurrent status snapshot collected");
    Ok(StatusSnapshot {
        printers,
        accepting,
        addresses,
        default,
        details,
    })
}
