//! Response payload decoding.
//!
//! Report downloads arrive compressed; listings and token answers arrive as
//! plain text. The decoder sniffs the framing and takes exactly one branch:
//!
//! - **Zip archive** - must hold exactly one file entry
//! - **Gzip stream** - must hold exactly one member
//! - **Plain text** - must be UTF-8 without NUL bytes
//!
//! Anything else is a [`ReporterError::MalformedResponse`]; a payload that
//! cannot be read is never turned into an empty report.

use flate2::bufread::GzDecoder;
use reporter_core::ReporterError;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

use crate::transport::HttpResponse;

/// Local file header signature of a zip archive.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// End-of-central-directory signature; an archive with no entries starts here.
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";

/// Gzip member signature.
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// UTF-8 byte order mark, dropped from decoded text.
const UTF8_BOM: char = '\u{feff}';

// ============================================================================
// Framing
// ============================================================================

/// Payload framing detected by [`sniff_framing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Zip archive.
    Zip,
    /// Gzip stream.
    Gzip,
    /// Not a recognized archive; may be plain text.
    Unframed,
}

/// Detects the framing of a payload from its leading bytes.
pub fn sniff_framing(body: &[u8]) -> Framing {
    if body.starts_with(ZIP_MAGIC) || body.starts_with(ZIP_EMPTY_MAGIC) {
        Framing::Zip
    } else if body.starts_with(GZIP_MAGIC) {
        Framing::Gzip
    } else {
        Framing::Unframed
    }
}

/// Returns true if a content type announces a compressed payload.
fn announces_archive(content_type: &str) -> bool {
    let ct = content_type.to_ascii_lowercase();
    ct.contains("gzip") || ct.contains("zip")
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes a raw response into tabular text.
///
/// # Errors
///
/// Returns `ReporterError::MalformedResponse` when the payload is empty, an
/// archive does not hold exactly one entry, decompression fails, the
/// content type announces an archive the bytes do not contain, or the text
/// is not valid UTF-8.
pub fn decode(response: &HttpResponse) -> Result<String, ReporterError> {
    decode_bytes(response.content_type(), &response.body)
}

/// Decodes a payload given an optional content-type hint.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_bytes(content_type: Option<&str>, body: &[u8]) -> Result<String, ReporterError> {
    if body.is_empty() {
        return Err(ReporterError::malformed("empty payload"));
    }

    let framing = sniff_framing(body);
    let text = match framing {
        Framing::Zip => unzip_single(body)?,
        Framing::Gzip => gunzip_single(body)?,
        Framing::Unframed => {
            if let Some(ct) = content_type.filter(|ct| announces_archive(ct)) {
                return Err(ReporterError::malformed(format!(
                    "content type '{ct}' announces an archive but the payload is not one"
                )));
            }
            into_text(body.to_vec())?
        }
    };

    debug!(?framing, bytes = body.len(), chars = text.len(), "Decoded payload");
    Ok(text)
}

fn unzip_single(body: &[u8]) -> Result<String, ReporterError> {
    let mut archive = ZipArchive::new(Cursor::new(body))
        .map_err(|e| ReporterError::malformed(format!("failed to open zip archive: {e}")))?;

    if archive.len() != 1 {
        return Err(ReporterError::malformed(format!(
            "expected 1 entry in zip archive, found {}",
            archive.len()
        )));
    }

    let mut entry = archive
        .by_index(0)
        .map_err(|e| ReporterError::malformed(format!("failed to read zip entry: {e}")))?;

    if entry.is_dir() {
        return Err(ReporterError::malformed("zip archive holds only a directory"));
    }

    let mut content = Vec::new();
    entry
        .read_to_end(&mut content)
        .map_err(|e| ReporterError::malformed(format!("failed to decompress zip entry: {e}")))?;

    into_text(content)
}

fn gunzip_single(body: &[u8]) -> Result<String, ReporterError> {
    let mut decoder = GzDecoder::new(body);
    let mut content = Vec::new();
    decoder
        .read_to_end(&mut content)
        .map_err(|e| ReporterError::malformed(format!("failed to decompress gzip stream: {e}")))?;

    let rest = decoder.into_inner();
    if rest.starts_with(GZIP_MAGIC) {
        return Err(ReporterError::malformed("gzip stream holds more than one member"));
    }
    if !rest.is_empty() {
        return Err(ReporterError::malformed(format!(
            "{} trailing bytes after gzip stream",
            rest.len()
        )));
    }

    into_text(content)
}

fn into_text(bytes: Vec<u8>) -> Result<String, ReporterError> {
    let text = String::from_utf8(bytes)
        .map_err(|e| ReporterError::malformed(format!("payload is not UTF-8 text: {e}")))?;

    if text.contains('\0') {
        return Err(ReporterError::malformed("payload contains NUL bytes"));
    }

    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const TSV: &str = "col1\tcol2\na\t1\nb\t2\n";

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn gzip(content: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_single_entry_zip_decodes() {
        let body = zip_with(&[("S_D_85000000_20240101.txt", TSV)]);
        assert_eq!(sniff_framing(&body), Framing::Zip);
        assert_eq!(decode_bytes(Some("application/zip"), &body).unwrap(), TSV);
    }

    #[test]
    fn test_empty_zip_is_malformed() {
        let body = zip_with(&[]);
        assert!(matches!(
            decode_bytes(None, &body),
            Err(ReporterError::MalformedResponse(ref m)) if m.contains("found 0")
        ));
    }

    #[test]
    fn test_multi_entry_zip_is_malformed() {
        let body = zip_with(&[("a.txt", TSV), ("b.txt", TSV)]);
        assert!(matches!(
            decode_bytes(None, &body),
            Err(ReporterError::MalformedResponse(ref m)) if m.contains("found 2")
        ));
    }

    #[test]
    fn test_gzip_decodes() {
        let body = gzip(TSV);
        assert_eq!(sniff_framing(&body), Framing::Gzip);
        assert_eq!(decode_bytes(Some("application/a-gzip"), &body).unwrap(), TSV);
    }

    #[test]
    fn test_multi_member_gzip_is_malformed() {
        let mut body = gzip(TSV);
        body.extend(gzip(TSV));
        assert!(matches!(
            decode_bytes(None, &body),
            Err(ReporterError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_truncated_gzip_is_malformed() {
        let body = gzip(TSV);
        let truncated = &body[..body.len() / 2];
        assert!(matches!(
            decode_bytes(None, truncated),
            Err(ReporterError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(decode_bytes(Some("text/plain"), TSV.as_bytes()).unwrap(), TSV);
        assert_eq!(decode_bytes(None, "\u{feff}a\tb\n".as_bytes()).unwrap(), "a\tb\n");
    }

    #[test]
    fn test_binary_garbage_is_malformed() {
        assert!(decode_bytes(None, &[0xff, 0xfe, 0xfd]).is_err());
        assert!(decode_bytes(None, b"a\0b").is_err());
        assert!(decode_bytes(None, b"").is_err());
    }

    #[test]
    fn test_archive_content_type_without_archive_is_malformed() {
        let result = decode_bytes(Some("application/a-gzip"), TSV.as_bytes());
        assert!(matches!(
            result,
            Err(ReporterError::MalformedResponse(ref m)) if m.contains("announces")
        ));
    }

    #[test]
    fn test_decode_uses_response_content_type() {
        let response =
            HttpResponse::ok(gzip(TSV)).with_header("Content-Type", "application/a-gzip");
        assert_eq!(decode(&response).unwrap(), TSV);
    }
}
