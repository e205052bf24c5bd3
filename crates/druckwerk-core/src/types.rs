// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Druckwerk CUPS driver.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Option key: whether the printer currently accepts jobs ("true"/"false").
pub const OPT_ACCEPTING_JOBS: &str = "printer-is-accepting-jobs";

/// Option key: the device URI/socket the printer is attached to.
pub const OPT_DEVICE_URI: &str = "device-uri";

/// Option key: human-readable printer description.
pub const OPT_INFO: &str = "printer-info";

/// Option key: physical printer location.
pub const OPT_LOCATION: &str = "printer-location";

/// A printer as reported by the local print subsystem.
///
/// Assembled by cross-referencing several `lpstat` query outputs; every
/// field reflects the last status snapshot, not live state. Keys in
/// `options` are stable lowercase-hyphenated identifiers; data the
/// subsystem did not report yields an empty string value, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterRecord {
    /// Queue name, unique within a snapshot.
    pub name: String,
    /// Whether this is the system default destination.
    pub is_default: bool,
    /// Attribute map keyed by CUPS attribute name.
    pub options: BTreeMap<String, String>,
}

impl PrinterRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_default: false,
            options: BTreeMap::new(),
        }
    }

    /// Device URI the printer is attached to, empty if unreported.
    pub fn device_uri(&self) -> &str {
        self.options.get(OPT_DEVICE_URI).map_or("", String::as_str)
    }

    /// Whether the printer was accepting jobs at snapshot time.
    pub fn accepting_jobs(&self) -> bool {
        self.options
            .get(OPT_ACCEPTING_JOBS)
            .is_some_and(|v| v == "true")
    }

    /// Human-readable description, if the subsystem reported one.
    pub fn description(&self) -> Option<&str> {
        self.options.get(OPT_INFO).map(String::as_str)
    }

    /// Physical location, if the subsystem reported one.
    pub fn location(&self) -> Option<&str> {
        self.options.get(OPT_LOCATION).map(String::as_str)
    }
}

/// Document formats accepted for submission.
///
/// Serialized to the `lp -o <format>` flag value; `Raw` is the default and
/// hands the payload to the device untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    #[default]
    Raw,
    Text,
    Pdf,
    Jpeg,
    Postscript,
    Command,
    Auto,
}

impl DocumentFormat {
    /// Value passed to the submission command's format option.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Jpeg => "jpeg",
            Self::Postscript => "postscript",
            Self::Command => "command",
            Self::Auto => "auto",
        }
    }
}

/// Print quality levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrintQuality {
    Draft,
    Normal,
    High,
}

impl PrintQuality {
    /// IPP `print-quality` enum value (RFC 8011 §5.2.13) as passed to
    /// `-o print-quality=`.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Draft => "3",
            Self::Normal => "4",
            Self::High => "5",
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
    ReversePortrait,
    ReverseLandscape,
}

impl Orientation {
    /// IPP `orientation-requested` enum value (RFC 8011 §5.2.10) as passed
    /// to `-o orientation-requested=`.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Portrait => "3",
            Self::Landscape => "4",
            Self::ReversePortrait => "5",
            Self::ReverseLandscape => "6",
        }
    }
}

/// A structured print request, translated into one `lp` invocation.
///
/// Exactly one of `data` and `file` must be supplied; every optional field
/// independently toggles inclusion of its command flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrintRequest {
    /// Target printer name (required, non-empty).
    pub printer: String,
    /// Raw payload streamed into the command's stdin.
    pub data: Option<Vec<u8>>,
    /// Path of a file to submit instead of an inline payload.
    pub file: Option<PathBuf>,
    /// Document format; ignored when `file` is set (the subsystem sniffs
    /// file submissions itself).
    pub format: DocumentFormat,
    /// Remote print server host.
    pub host: Option<String>,
    /// Remote print server port, only meaningful together with `host`.
    pub port: Option<u16>,
    /// Username presented to the print server.
    pub username: Option<String>,
    /// Job title shown in the queue.
    pub title: Option<String>,
    pub quality: Option<PrintQuality>,
    pub orientation: Option<Orientation>,
    /// Number of copies, positive.
    pub copies: Option<u32>,
    /// Request an encrypted connection to the server.
    pub encryption: bool,
    /// Extra raw arguments appended before the trailing file path.
    pub extra_args: Vec<String>,
}

impl PrintRequest {
    /// New request targeting `printer` with all options at their defaults.
    pub fn new(printer: impl Into<String>) -> Self {
        Self {
            printer: printer.into(),
            ..Self::default()
        }
    }
}

/// Opaque identifier extracted from a submission confirmation line.
///
/// CUPS confirmations look like `request id is Office-42 (1 file(s))`; the
/// handle keeps the whole request-id token. The format is command-specific
/// free text and not guaranteed numeric — when the message shape differs
/// by version or locale the whole trimmed response becomes the handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    raw: String,
}

impl JobHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The handle exactly as extracted from the confirmation text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric job id, where the `<queue>-<number>` convention holds.
    pub fn numeric_id(&self) -> Option<u64> {
        self.raw.rsplit('-').next()?.parse().ok()
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_defaults_are_empty_and_false() {
        let record = PrinterRecord::new("Office");
        assert_eq!(record.device_uri(), "");
        assert!(!record.accepting_jobs());
        assert!(record.description().is_none());
        assert!(record.location().is_none());
    }

    #[test]
    fn record_accessors_read_options() {
        let mut record = PrinterRecord::new("Office");
        record
            .options
            .insert(OPT_ACCEPTING_JOBS.into(), "true".into());
        record
            .options
            .insert(OPT_DEVICE_URI.into(), "ipp://192.168.1.50:631/ipp/print".into());
        record.options.insert(OPT_INFO.into(), "Main laser".into());

        assert!(record.accepting_jobs());
        assert_eq!(record.device_uri(), "ipp://192.168.1.50:631/ipp/print");
        assert_eq!(record.description(), Some("Main laser"));
    }

    #[test]
    fn record_round_trips_through_json() {
        let mut record = PrinterRecord::new("Office");
        record.is_default = true;
        record
            .options
            .insert(OPT_LOCATION.into(), "Room 2".into());

        let json = serde_json::to_string(&record).expect("serialize");
        let back: PrinterRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, record);
    }

    #[test]
    fn format_flags_are_lowercased_names() {
        assert_eq!(DocumentFormat::Raw.flag(), "raw");
        assert_eq!(DocumentFormat::Postscript.flag(), "postscript");
        assert_eq!(DocumentFormat::default(), DocumentFormat::Raw);
    }

    #[test]
    fn orientation_flags_follow_ipp_enum() {
        assert_eq!(Orientation::Portrait.flag(), "3");
        assert_eq!(Orientation::ReverseLandscape.flag(), "6");
    }

    #[test]
    fn job_handle_numeric_suffix() {
        let handle = JobHandle::new("ZPL-PRINTER-92");
        assert_eq!(handle.as_str(), "ZPL-PRINTER-92");
        assert_eq!(handle.numeric_id(), Some(92));
    }

    #[test]
    fn job_handle_without_numeric_suffix() {
        let handle = JobHandle::new("accepted");
        assert_eq!(handle.numeric_id(), None);
    }
}
