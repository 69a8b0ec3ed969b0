//! File I/O for plain-text and JSONL document sets.
//!
//! Plain-text input holds one document per line. JSONL input holds one JSON
//! object per line with the text in a configurable field.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Document representation for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: u64,
    /// Document text content.
    pub text: String,
    /// Original line number in the input file (1-based).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
}

impl Document {
    /// Create a new document.
    #[must_use]
    pub fn new(id: u64, text: String) -> Self {
        Self {
            id,
            text,
            line_number: None,
        }
    }

    /// Create a document with line number tracking.
    #[must_use]
    pub fn with_line_number(id: u64, text: String, line_number: usize) -> Self {
        Self {
            id,
            text,
            line_number: Some(line_number),
        }
    }
}

/// Errors that can occur during I/O operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Underlying filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSONL line is not valid JSON. `line` is one-based.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The text field is absent or not a string.
    #[error("Field '{field}' not found or not a string at line {line}")]
    MissingField { field: String, line: usize },

    /// A document could not be serialized.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, IoError>;

/// Input file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// One document per line.
    Lines,
    /// JSON Lines, text in a named field.
    Jsonl,
}

impl InputFormat {
    /// Detect format from file path extension. Unknown extensions are plain text.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match ext.as_deref() {
            Some("jsonl" | "ndjson") => Self::Jsonl,
            _ => Self::Lines,
        }
    }
}

/// Parse one JSONL line. `line_num` is zero-based.
fn parse_jsonl_line(line: &str, line_num: usize, text_field: &str) -> Result<Document> {
    let json: serde_json::Value = serde_json::from_str(line).map_err(|e| IoError::Parse {
        line: line_num + 1,
        message: e.to_string(),
    })?;

    let text = json
        .get(text_field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| IoError::MissingField {
            field: text_field.to_string(),
            line: line_num + 1,
        })?;

    // Try to get ID from JSON, otherwise use line number
    let id = json
        .get("id")
        .and_then(|v| v.as_u64())
        .unwrap_or(line_num as u64);

    Ok(Document::with_line_number(id, text.to_string(), line_num + 1))
}

/// Read documents from a JSONL file, preserving the original JSON lines.
///
/// Blank lines are skipped. The document ID is taken from an `"id"` field if
/// present, otherwise the zero-based line number is used.
pub fn read_jsonl_with_original<P: AsRef<Path>>(
    path: P,
    text_field: &str,
) -> Result<Vec<(Document, String)>> {
    let reader = BufReader::new(File::open(path)?);
    let mut documents = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let doc = parse_jsonl_line(&line, line_num, text_field)?;
        documents.push((doc, line));
    }

    Ok(documents)
}

/// Read documents from a JSONL file.
pub fn read_jsonl<P: AsRef<Path>>(path: P, text_field: &str) -> Result<Vec<Document>> {
    Ok(read_jsonl_with_original(path, text_field)?
        .into_iter()
        .map(|(doc, _)| doc)
        .collect())
}

/// Read one document per non-blank line of a text file.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let reader = BufReader::new(File::open(path)?);
    let mut documents = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        documents.push(Document::with_line_number(line_num as u64, line, line_num + 1));
    }

    Ok(documents)
}

/// Read documents in either format, paired with the line to echo on output.
pub fn read_documents<P: AsRef<Path>>(
    path: P,
    format: InputFormat,
    text_field: &str,
) -> Result<Vec<(Document, String)>> {
    match format {
        InputFormat::Jsonl => read_jsonl_with_original(path, text_field),
        InputFormat::Lines => Ok(read_lines(path)?
            .into_iter()
            .map(|doc| {
                let line = doc.text.clone();
                (doc, line)
            })
            .collect()),
    }
}

/// Write documents to a JSONL file as `{"id": .., "text": ..}` objects.
pub fn write_jsonl<P: AsRef<Path>>(path: P, docs: &[Document]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    for doc in docs {
        let json = serde_json::json!({
            "id": doc.id,
            "text": doc.text
        });
        writeln!(writer, "{}", serde_json::to_string(&json)?)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write lines verbatim (original JSONL records or plain-text documents).
pub fn write_lines<P: AsRef<Path>, S: AsRef<str>>(path: P, lines: &[S]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    for line in lines {
        writeln!(writer, "{}", line.as_ref())?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_detection() {
        assert_eq!(InputFormat::from_path("data.jsonl"), InputFormat::Jsonl);
        assert_eq!(InputFormat::from_path("data.NDJSON"), InputFormat::Jsonl);
        assert_eq!(InputFormat::from_path("data.txt"), InputFormat::Lines);
        assert_eq!(InputFormat::from_path("data.json"), InputFormat::Lines);
        assert_eq!(InputFormat::from_path("data"), InputFormat::Lines);
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.jsonl");
        let docs = vec![
            Document::new(7, "first document".to_string()),
            Document::new(9, "second document".to_string()),
        ];

        write_jsonl(&path, &docs).unwrap();
        let loaded = read_jsonl(&path, "text").unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, 7);
        assert_eq!(loaded[1].text, "second document");
        assert_eq!(loaded[1].line_number, Some(2));
    }

    #[test]
    fn test_jsonl_id_fallback_and_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.jsonl");
        std::fs::write(&path, "{\"text\": \"a\"}\n\n{\"text\": \"b\"}\n").unwrap();

        let loaded = read_jsonl(&path, "text").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, 0);
        assert_eq!(loaded[1].id, 2);
    }

    #[test]
    fn test_jsonl_missing_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.jsonl");
        std::fs::write(&path, "{\"body\": \"a\"}\n").unwrap();

        let err = read_jsonl(&path, "text").unwrap_err();
        assert!(matches!(err, IoError::MissingField { line: 1, .. }));
    }

    #[test]
    fn test_jsonl_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.jsonl");
        std::fs::write(&path, "{\"text\": \"a\"}\nnot json\n").unwrap();

        let err = read_jsonl(&path, "text").unwrap_err();
        assert!(matches!(err, IoError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_read_lines_keeps_original() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.txt");
        write_lines(&path, &["one two", "", "three four"]).unwrap();

        let loaded = read_documents(&path, InputFormat::Lines, "text").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].0.text, "three four");
        assert_eq!(loaded[1].1, "three four");
        assert_eq!(loaded[1].0.line_number, Some(3));
    }
}
