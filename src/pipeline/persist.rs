//! Persister: write an [`OutputDocument`] to disk as .docx.
//!
//! Atomic write: the package is written to `<name>.docx.tmp` next to the
//! target and renamed over it, so a failed write never leaves a truncated
//! document behind. An existing file at the target path is replaced.

use crate::docx::to_docx_bytes;
use crate::error::ConvertError;
use crate::output::OutputDocument;
use std::path::Path;
use tracing::debug;

/// Serialise `doc` and write it to `path`. Returns the number of bytes written.
pub async fn save(doc: &OutputDocument, path: &Path) -> Result<u64, ConvertError> {
    let write_err = |source: std::io::Error| ConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let bytes = to_docx_bytes(doc).map_err(write_err)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("docx.tmp");
    tokio::fs::write(&tmp_path, &bytes).await.map_err(write_err)?;

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(bytes.len() as u64)
}
