//! Input reading: encoding detection, decoding, and row extraction.
//!
//! Uploaded files come from spreadsheets and legacy exports, so the reader
//! detects the encoding with chardet, decodes with encoding_rs, strips a
//! UTF-8 BOM when present, and only then splits rows with the configured
//! separator. Cell values are passed through as-is; sanitization is the
//! storage layer's concern.
//!
//! The file handle is scoped to [`read_rows`]: it is opened, read fully,
//! and closed before any row is processed, on every exit path.

use std::path::Path;

use crate::error::{ParseError, ParseResult};

/// One data row: an ordered sequence of string cells. Length may vary
/// row-to-row.
pub type RawRow = Vec<String>;

/// UTF-8 BOM bytes.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the specified encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> ParseResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).to_string())),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        // Fallback: UTF-8 with lossy conversion
        _ => Ok(String::from_utf8_lossy(bytes).to_string()),
    }
}

/// Strip a UTF-8 BOM from the beginning of the data if present.
fn strip_utf8_bom(bytes: &[u8]) -> &[u8] {
    if bytes.starts_with(UTF8_BOM) {
        &bytes[UTF8_BOM.len()..]
    } else {
        bytes
    }
}

/// Read a delimited file into rows, header row included at index 0.
///
/// An empty file produces an empty vector, not an error; the pipeline
/// reports "no users imported" in that case.
pub fn read_rows(path: impl AsRef<Path>, delimiter: u8) -> ParseResult<Vec<RawRow>> {
    let bytes = std::fs::read(path.as_ref())?;
    read_rows_from_bytes(&bytes, delimiter)
}

/// Read delimited bytes into rows, header row included at index 0.
pub fn read_rows_from_bytes(bytes: &[u8], delimiter: u8) -> ParseResult<Vec<RawRow>> {
    let bytes = strip_utf8_bom(bytes);
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ParseError::Row {
            row: idx,
            message: e.to_string(),
        })?;
        rows.push(record.iter().map(ToString::to_string).collect());
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_rows_comma() {
        let rows = read_rows_from_bytes(b"name,mail\nalice,alice@x.com\n", b',').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["name", "mail"]);
        assert_eq!(rows[1], vec!["alice", "alice@x.com"]);
    }

    #[test]
    fn test_read_rows_semicolon() {
        let rows = read_rows_from_bytes(b"name;mail\nbob;bob@x.com", b';').unwrap();
        assert_eq!(rows[1], vec!["bob", "bob@x.com"]);
    }

    #[test]
    fn test_variable_row_lengths_allowed() {
        let rows = read_rows_from_bytes(b"a,b,c\n1,2\n1,2,3,4\n", b',').unwrap();
        assert_eq!(rows[1].len(), 2);
        assert_eq!(rows[2].len(), 4);
    }

    #[test]
    fn test_wrong_delimiter_yields_single_cell_rows() {
        // Comma-separated content read with ';' stays one cell per row.
        let rows = read_rows_from_bytes(b"name,mail\nalice,alice@x.com\n", b';').unwrap();
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[1].len(), 1);
    }

    #[test]
    fn test_empty_input_yields_no_rows() {
        let rows = read_rows_from_bytes(b"", b',').unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_bom_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"name,mail\nalice,alice@x.com");
        let rows = read_rows_from_bytes(&bytes, b',').unwrap();
        assert_eq!(rows[0][0], "name");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert!(decoded.contains("Soci"));
    }

    #[test]
    fn test_detect_encoding_utf8() {
        assert_eq!(detect_encoding(b"plain ascii text"), "utf-8");
    }

    #[test]
    fn test_read_rows_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "name,mail\ncarol,carol@x.com\n").unwrap();

        let rows = read_rows(file.path(), b',').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "carol");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_rows("/nonexistent/upload.csv", b',').unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }
}
