// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job submission translator: turns a structured print request into the
// exact `lp` argument sequence, executes it (piped or file-based), and
// extracts the job identifier from the confirmation text.

use tracing::{debug, info, instrument};

use druckwerk_core::config::CupsConfig;
use druckwerk_core::error::{DruckError, Result};
use druckwerk_core::types::{JobHandle, PrintRequest};

use crate::exec::CommandRunner;

/// Check caller-supplied fields before any process is spawned.
///
/// Fails fast and synchronously: an invalid request must never reach the
/// runner.
pub fn validate(request: &PrintRequest) -> Result<()> {
    if request.printer.is_empty() {
        return Err(DruckError::Validation("no printer".into()));
    }
    match (&request.data, &request.file) {
        (None, None) => Err(DruckError::Validation("no data or file".into())),
        (Some(_), Some(_)) => Err(DruckError::Validation(
            "both data and file supplied".into(),
        )),
        _ => Ok(()),
    }
}

/// Build the ordered argument list for the submission command.
///
/// Flag order follows the underlying CLI's conventions; only the trailing
/// `-- <file>` pair is positionally significant.
pub fn build_args(request: &PrintRequest) -> Vec<String> {
    let mut args = Vec::new();

    if request.file.is_none() {
        args.push("-o".into());
        args.push(request.format.flag().into());
    }
    if let Some(copies) = request.copies {
        args.push("-n".into());
        args.push(copies.to_string());
    }
    args.push("-d".into());
    args.push(request.printer.clone());
    if let Some(host) = &request.host {
        args.push("-h".into());
        args.push(match request.port {
            Some(port) => format!("{host}:{port}"),
            None => host.clone(),
        });
    }
    if let Some(username) = &request.username {
        args.push("-U".into());
        args.push(username.clone());
    }
    if let Some(title) = &request.title {
        args.push("-T".into());
        args.push(title.clone());
    }
    if let Some(quality) = request.quality {
        args.push("-o".into());
        args.push(format!("print-quality={}", quality.flag()));
    }
    if let Some(orientation) = request.orientation {
        args.push("-o".into());
        args.push(format!("orientation-requested={}", orientation.flag()));
    }
    if request.encryption {
        args.push("-E".into());
    }
    args.extend(request.extra_args.iter().cloned());
    if let Some(file) = &request.file {
        args.push("--".into());
        args.push(file.display().to_string());
    }

    args
}

/// Submit a print job and return its handle.
///
/// File requests run the command directly; inline payloads are streamed
/// into its stdin. Any execution failure propagates as
/// [`DruckError::Submission`].
#[instrument(skip(runner, request), fields(printer = %request.printer))]
pub async fn submit(
    runner: &dyn CommandRunner,
    config: &CupsConfig,
    request: &PrintRequest,
) -> Result<JobHandle> {
    validate(request)?;
    let args = build_args(request);
    debug!(?args, "submitting print job");

    let output = match &request.data {
        Some(data) => runner
            .run_with_input(&config.submit_command, data, &args)
            .await,
        None => runner.run_async(&config.submit_command, &args).await,
    }
    .map_err(DruckError::Submission)?;

    let handle = parse_job_handle(&output);
    info!(handle = %handle, "print job submitted");
    Ok(handle)
}

/// Extract the job handle from the submission confirmation text.
///
/// CUPS confirms with `request id is <queue>-<n> (<k> file(s))`: split on
/// whitespace and take the third-from-last token. Shorter or differently
/// shaped responses return the whole trimmed text verbatim — the phrase
/// shape is version- and locale-dependent, so no stricter contract is
/// assumed.
fn parse_job_handle(output: &str) -> JobHandle {
    let tokens: Vec<&str> = output.split_whitespace().collect();
    if tokens.len() > 3 {
        JobHandle::new(tokens[tokens.len() - 3])
    } else {
        JobHandle::new(output.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::tests_support::SpyRunner;
    use druckwerk_core::types::{DocumentFormat, Orientation, PrintQuality};
    use std::io::Write;

    fn data_request() -> PrintRequest {
        let mut request = PrintRequest::new("P1");
        request.data = Some(b"hello".to_vec());
        request
    }

    /// Index of `needle` in `haystack` as a consecutive subsequence.
    fn position_of(args: &[String], needle: &[&str]) -> usize {
        args.windows(needle.len())
            .position(|w| w.iter().map(String::as_str).eq(needle.iter().copied()))
            .unwrap_or_else(|| panic!("{needle:?} not found in {args:?}"))
    }

    #[test]
    fn minimal_data_request_args_in_relative_order() {
        let mut request = data_request();
        request.copies = Some(2);

        let args = build_args(&request);
        let format = position_of(&args, &["-o", "raw"]);
        let copies = position_of(&args, &["-n", "2"]);
        let dest = position_of(&args, &["-d", "P1"]);
        assert!(format < copies && copies < dest);

        for flag in ["-h", "-U", "-T", "-E", "--"] {
            assert!(!args.contains(&flag.to_string()), "unexpected {flag}");
        }
        assert!(!args.iter().any(|a| a.starts_with("print-quality=")));
        assert!(!args.iter().any(|a| a.starts_with("orientation-requested=")));
    }

    #[test]
    fn all_options_emit_their_flags() {
        let mut request = data_request();
        request.format = DocumentFormat::Pdf;
        request.host = Some("cups.example".into());
        request.port = Some(6310);
        request.username = Some("jo".into());
        request.title = Some("Quarterly".into());
        request.quality = Some(PrintQuality::High);
        request.orientation = Some(Orientation::Landscape);
        request.encryption = true;
        request.extra_args = vec!["-o".into(), "media=a4".into()];

        let args = build_args(&request);
        position_of(&args, &["-o", "pdf"]);
        position_of(&args, &["-h", "cups.example:6310"]);
        position_of(&args, &["-U", "jo"]);
        position_of(&args, &["-T", "Quarterly"]);
        position_of(&args, &["-o", "print-quality=5"]);
        position_of(&args, &["-o", "orientation-requested=4"]);
        position_of(&args, &["-o", "media=a4"]);
        assert!(args.contains(&"-E".to_string()));
    }

    #[test]
    fn host_without_port_is_emitted_bare() {
        let mut request = data_request();
        request.host = Some("cups.example".into());
        let args = build_args(&request);
        position_of(&args, &["-h", "cups.example"]);
    }

    #[test]
    fn file_request_skips_format_and_ends_with_separator_and_path() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file.as_file(), "payload").expect("write");

        let mut request = PrintRequest::new("P1");
        request.file = Some(file.path().to_path_buf());

        let args = build_args(&request);
        assert!(!args.contains(&"raw".to_string()));
        assert_eq!(args[args.len() - 2], "--");
        assert_eq!(args[args.len() - 1], file.path().display().to_string());
    }

    #[tokio::test]
    async fn missing_payload_fails_before_any_spawn() {
        let runner = SpyRunner::default();
        let request = PrintRequest::new("P1");

        let err = submit(&runner, &CupsConfig::default(), &request)
            .await
            .expect_err("no payload");
        assert!(matches!(err, DruckError::Validation(ref m) if m == "no data or file"));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_printer_fails_before_any_spawn() {
        let runner = SpyRunner::default();
        let mut request = PrintRequest::new("");
        request.data = Some(b"x".to_vec());

        let err = submit(&runner, &CupsConfig::default(), &request)
            .await
            .expect_err("no printer");
        assert!(matches!(err, DruckError::Validation(ref m) if m == "no printer"));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn both_data_and_file_is_rejected() {
        let runner = SpyRunner::default();
        let mut request = data_request();
        request.file = Some("/tmp/x".into());

        let err = submit(&runner, &CupsConfig::default(), &request)
            .await
            .expect_err("ambiguous payload");
        assert!(matches!(err, DruckError::Validation(_)));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn data_request_streams_payload_into_stdin() {
        let runner = SpyRunner::default();
        runner.respond_to("lp", "request id is P1-7 (0 file(s))\n");

        let handle = submit(&runner, &CupsConfig::default(), &data_request())
            .await
            .expect("submit");
        assert_eq!(handle.as_str(), "P1-7");
        assert_eq!(handle.numeric_id(), Some(7));

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command, "lp");
        assert_eq!(calls[0].input.as_deref(), Some(b"hello".as_slice()));
    }

    #[tokio::test]
    async fn execution_failure_becomes_submission_error() {
        let runner = SpyRunner::default();
        runner.fail_on("lp", "lp: The printer or class does not exist.");

        let err = submit(&runner, &CupsConfig::default(), &data_request())
            .await
            .expect_err("lp failed");
        match err {
            DruckError::Submission(exec) => {
                assert!(exec.detail.contains("does not exist"));
            }
            other => panic!("expected Submission error, got {other:?}"),
        }
    }

    #[test]
    fn handle_is_third_from_last_token() {
        let handle = parse_job_handle("request id is ZPL-PRINTER-92 (0 file(s))");
        assert_eq!(handle.as_str(), "ZPL-PRINTER-92");
        assert_eq!(handle.numeric_id(), Some(92));
    }

    #[test]
    fn short_response_is_returned_verbatim() {
        let handle = parse_job_handle("  accepted\n");
        assert_eq!(handle.as_str(), "accepted");
    }
}
