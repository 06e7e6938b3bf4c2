//! Media type detection from file headers.
//!
//! Signature matching is delegated to `infer`. Files without a known
//! signature fall back to `text/plain` or `application/octet-stream`, and
//! unreadable files get [`UNKNOWN_MIME`] instead of an error.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Bytes inspected from the start of the file
pub const SNIFF_LEN: usize = 8192;

/// Label used when the file cannot be read at all
pub const UNKNOWN_MIME: &str = "unknown";

/// Label for zero-length files
pub const EMPTY_MIME: &str = "inode/x-empty";

/// Label for text without a known signature
pub const TEXT_MIME: &str = "text/plain";

/// Label for binary data without a known signature
pub const BINARY_MIME: &str = "application/octet-stream";

/// Detect the MIME type of the file at `path`
///
/// Never fails; read errors are logged and reported as [`UNKNOWN_MIME`].
#[must_use]
pub fn detect_mime<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    match read_head(path) {
        Ok(head) => {
            let mime = detect_mime_from_bytes(&head);
            debug!("Sniffed {} as {}", path.display(), mime);
            mime
        }
        Err(err) => {
            warn!("Cannot sniff {}: {}", path.display(), err);
            UNKNOWN_MIME.to_string()
        }
    }
}

/// Detect the MIME type of a file header already in memory
#[must_use]
pub fn detect_mime_from_bytes(head: &[u8]) -> String {
    if head.is_empty() {
        return EMPTY_MIME.to_string();
    }
    if let Some(kind) = infer::get(head) {
        return kind.mime_type().to_string();
    }
    if looks_like_text(head) {
        TEXT_MIME.to_string()
    } else {
        BINARY_MIME.to_string()
    }
}

fn read_head(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut head)?;
    Ok(head)
}

// A header cut in the middle of a multi-byte sequence still counts as text.
fn looks_like_text(head: &[u8]) -> bool {
    if head.contains(&0) {
        return false;
    }
    match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(err) => err.error_len().is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_png_signature() {
        let head = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
        assert_eq!(detect_mime_from_bytes(&head), "image/png");
    }

    #[test]
    fn test_empty_and_text_fallbacks() {
        assert_eq!(detect_mime_from_bytes(b""), EMPTY_MIME);
        assert_eq!(detect_mime_from_bytes(b"hello, world\n"), TEXT_MIME);
        assert_eq!(detect_mime_from_bytes("héllo".as_bytes()), TEXT_MIME);
    }

    #[test]
    fn test_binary_fallback() {
        assert_eq!(
            detect_mime_from_bytes(&[0x13, 0x37, 0x00, 0x42, 0x99]),
            BINARY_MIME
        );
    }

    #[test]
    fn test_truncated_utf8_counts_as_text() {
        let mut head = b"abc ".to_vec();
        head.extend_from_slice(&"é".as_bytes()[..1]);
        assert!(looks_like_text(&head));
    }

    #[test]
    fn test_detect_from_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"%PDF-1.7\n").unwrap();
        temp.flush().unwrap();
        assert_eq!(detect_mime(temp.path()), "application/pdf");
    }

    #[test]
    fn test_unreadable_file_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(detect_mime(dir.path().join("absent")), UNKNOWN_MIME);
    }
}
