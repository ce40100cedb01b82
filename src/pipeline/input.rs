//! Input resolution: confirm the source PDF exists and is readable.
//!
//! We check the `%PDF` magic bytes before handing the path to the rasteriser
//! so a mistyped argument (a `.docx`, a text file) is reported as an input
//! problem for that one document rather than as a rasterisation failure.

use crate::error::ConvertError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve a local file path, validating existence and PDF magic bytes.
pub fn resolve_input(path: &Path) -> Result<PathBuf, ConvertError> {
    let path = path.to_path_buf();

    if !path.is_file() {
        return Err(ConvertError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            // Files shorter than four bytes are left for the rasteriser to reject.
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(ConvertError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ConvertError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ConvertError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_input(Path::new("/definitely/not/a/real/file.pdf")).unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_input(dir.path()).unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let mut f = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        f.write_all(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n").unwrap();
        let resolved = resolve_input(f.path()).unwrap();
        assert_eq!(resolved, f.path());
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut f = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        f.write_all(b"PK\x03\x04 not a pdf").unwrap();
        match resolve_input(f.path()).unwrap_err() {
            ConvertError::NotAPdf { magic, .. } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
