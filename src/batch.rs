//! Batch driver: convert several PDFs into one output directory.
//!
//! Inputs are processed one at a time, in the order given. Each document's
//! result is recorded in a [`BatchReport`]; what happens after a failure is
//! decided by [`BatchPolicy`].

use crate::config::{BatchPolicy, ConversionConfig};
use crate::convert::convert;
use crate::error::ConvertError;
use crate::output::{BatchReport, ConversionRequest, DocumentOutcome};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Extension of every produced document.
pub const OUTPUT_EXTENSION: &str = "docx";

/// `<out_dir>/<input stem>.docx`. Inputs without a usable stem become
/// `document.docx`.
pub fn output_path_for(input: &Path, out_dir: &Path) -> PathBuf {
    let mut name: OsString = input
        .file_stem()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("document"));
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    out_dir.join(name)
}

/// Convert every path in `inputs`, writing results into `out_dir`.
///
/// `out_dir` is created (with parents) before the first document. Inputs
/// sharing a stem map to the same output file; the later one wins.
///
/// # Errors
/// Only [`ConvertError::OutputDirFailed`]. Per-document failures are
/// reported in the returned [`BatchReport`].
pub async fn run_batch(
    inputs: &[PathBuf],
    out_dir: &Path,
    config: &ConversionConfig,
    policy: BatchPolicy,
) -> Result<BatchReport, ConvertError> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|source| ConvertError::OutputDirFailed {
            path: out_dir.to_path_buf(),
            source,
        })?;

    let mut report = BatchReport::default();

    for (idx, input) in inputs.iter().enumerate() {
        let request = ConversionRequest::new(input.clone(), output_path_for(input, out_dir));
        let result = convert(&request, config).await;

        // Input and save failures were already logged by `convert`.
        let pipeline_failure = match result {
            Err(ref e) if !e.is_document_scoped() => {
                error!("Failed to convert {}: {}", input.display(), e);
                true
            }
            _ => false,
        };

        report.outcomes.push(DocumentOutcome {
            source: request.source,
            output: request.output,
            result,
        });

        if pipeline_failure && policy == BatchPolicy::HaltOnPipelineFailure {
            report.halted = true;
            report.skipped = inputs[idx + 1..].to_vec();
            warn!(
                "Stopping batch: {} remaining input(s) not attempted",
                report.skipped.len()
            );
            break;
        }
    }

    info!(
        "Finished processing all PDFs: {} converted, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(report)
}

/// Synchronous wrapper around [`run_batch`].
pub fn run_batch_sync(
    inputs: &[PathBuf],
    out_dir: &Path,
    config: &ConversionConfig,
    policy: BatchPolicy,
) -> Result<BatchReport, ConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run_batch(inputs, out_dir, config, policy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_uses_stem() {
        let out = Path::new("/out");
        assert_eq!(
            output_path_for(Path::new("/scans/report.pdf"), out),
            PathBuf::from("/out/report.docx")
        );
        assert_eq!(
            output_path_for(Path::new("archive.v2.PDF"), out),
            PathBuf::from("/out/archive.v2.docx")
        );
        assert_eq!(
            output_path_for(Path::new("noext"), out),
            PathBuf::from("/out/noext.docx")
        );
    }

    #[test]
    fn output_path_falls_back_without_stem() {
        assert_eq!(
            output_path_for(Path::new("/"), Path::new("out")),
            PathBuf::from("out/document.docx")
        );
        assert_eq!(
            output_path_for(Path::new(".."), Path::new("out")),
            PathBuf::from("out/document.docx")
        );
    }

    #[tokio::test]
    async fn output_dir_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let err = run_batch(
            &[PathBuf::from("a.pdf")],
            &blocker.join("out"),
            &ConversionConfig::default(),
            BatchPolicy::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ConvertError::OutputDirFailed { .. }));
    }

    #[tokio::test]
    async fn creates_nested_output_dir_even_when_inputs_fail() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("x/y/z");

        let report = run_batch(
            &[dir.path().join("missing.pdf")],
            &out,
            &ConversionConfig::default(),
            BatchPolicy::default(),
        )
        .await
        .unwrap();

        assert!(out.is_dir());
        assert_eq!(report.failed(), 1);
        assert!(!out.join("missing.docx").exists());
    }
}
