// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer record extractor: cross-references the raw status-query texts by
// printer name and assembles one normalized record per printer.
//
// The parsing is deliberately heuristic — `lpstat` output is human-readable
// text with no machine contract — so a name missing from any one query
// yields an empty/false/absent field rather than an error.

use tracing::debug;

use druckwerk_core::types::{
    OPT_ACCEPTING_JOBS, OPT_DEVICE_URI, OPT_INFO, OPT_LOCATION, PrinterRecord,
};

use crate::snapshot::StatusSnapshot;

/// Token that starts a new per-printer header line in `lpstat -p` output
/// and a new block in `lpstat -l -p` output.
const PRINTER_TOKEN: &str = "printer";

/// Label prefixes recognised inside a long-form details block, paired with
/// the option key their remainder is stored under.
const DETAIL_LABELS: [(&str, &str); 2] = [
    ("Description: ", OPT_INFO),
    ("Location: ", OPT_LOCATION),
];

/// Parse the snapshot into printer records, in the order names first appear
/// in the `printers` listing.
pub(crate) fn extract_printers(snapshot: &StatusSnapshot) -> Vec<PrinterRecord> {
    let mut records = Vec::new();

    for line in snapshot.printers.lines() {
        if !line.starts_with(PRINTER_TOKEN) {
            // Continuation lines (status text, reason codes) belong to the
            // preceding printer and are not currently modeled.
            continue;
        }
        let Some(name) = line.split_whitespace().nth(1) else {
            continue;
        };

        let mut record = PrinterRecord::new(name);
        record.is_default = snapshot.default.contains(name);
        record.options.insert(
            OPT_DEVICE_URI.into(),
            device_uri(&snapshot.addresses, name).into(),
        );
        record.options.insert(
            OPT_ACCEPTING_JOBS.into(),
            accepting(&snapshot.accepting, name).to_string(),
        );
        apply_details(&mut record, &snapshot.details, name);

        records.push(record);
    }

    debug!(count = records.len(), "extracted printer records");
    records
}

/// Device URI for `name`: the last whitespace-separated token of the
/// `addresses` line containing `"<name>: "`, else empty.
fn device_uri<'a>(addresses: &'a str, name: &str) -> &'a str {
    let marker = format!("{name}: ");
    addresses
        .lines()
        .find(|line| line.contains(&marker))
        .and_then(|line| line.split_whitespace().next_back())
        .unwrap_or("")
}

/// Whether any `accepting` line reports `"<name> accepting"`.
///
/// A disabled queue reads `"<name> not accepting ..."`, which does not
/// contain the marker.
fn accepting(accepting: &str, name: &str) -> bool {
    let marker = format!("{name} accepting");
    accepting.lines().any(|line| line.contains(&marker))
}

/// Scan the long-form details text for this printer's block and capture any
/// recognised label lines into the record's options.
fn apply_details(record: &mut PrinterRecord, details: &str, name: &str) {
    let marker = format!("{name} ");
    let Some(block) = details
        .split(PRINTER_TOKEN)
        .find(|block| block.contains(&marker))
    else {
        return;
    };

    for line in block.lines() {
        let line = line.trim();
        for (label, key) in DETAIL_LABELS {
            if let Some(value) = line.strip_prefix(label) {
                record.options.insert(key.into(), value.to_owned());
            }
        }
    }
}
