pub mod processor;

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::SpecError;

pub use processor::{
    ChecksumPair, ProcessOutcome, ProcessedSpec, canonicalize, current_checksums, process,
    process_content, processed_checksum_of, raw_checksum_of, stamp_checksums,
};

/// Explicit dialect URL; takes priority over `openapi`/`swagger`.
pub const EXT_DIALECT: &str = "x-openapi-dialect";
/// Stored raw-file checksum.
pub const EXT_CONTENT_SHA: &str = "x-spec-content-sha";
/// Prior raw checksum read back by [`process`].
pub const EXT_CHECKSUM: &str = "x-spec-checksum";
/// Stored canonical-content checksum.
pub const EXT_PROCESSED_CHECKSUM: &str = "x-spec-processed-checksum";

/// Extensions excluded from both checksums, since the spec stores them about itself.
pub const CHECKSUM_EXTENSIONS: [&str; 3] = [EXT_CONTENT_SHA, EXT_CHECKSUM, EXT_PROCESSED_CHECKSUM];

/// Read a spec file as text.
pub fn read_spec_text(path: &Path) -> Result<String, SpecError> {
    fs::read_to_string(path).map_err(|source| SpecError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse spec text read from `path`. The root must be a JSON object.
pub fn parse_spec(path: &Path, text: &str) -> Result<Value, SpecError> {
    let doc: Value = serde_json::from_str(text).map_err(|source| SpecError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if !doc.is_object() {
        return Err(SpecError::NotAnObject(path.to_path_buf()));
    }
    Ok(doc)
}

/// Read and parse a spec file.
pub fn read_spec(path: &Path) -> Result<Value, SpecError> {
    let text = read_spec_text(path)?;
    parse_spec(path, &text)
}

/// Serialize a document the way specgen writes spec files: 2-space indent, trailing newline.
pub fn to_spec_text(doc: &Value) -> String {
    let mut text = serde_json::to_string_pretty(doc).expect("JSON values always serialize");
    text.push('\n');
    text
}

pub(crate) fn write_spec_text(path: &Path, text: &str) -> Result<(), SpecError> {
    fs::write(path, text).map_err(|source| SpecError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// A top-level string extension, if present.
pub fn string_extension(doc: &Value, key: &str) -> Option<String> {
    doc.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_object_root() {
        let err = parse_spec(Path::new("spec.json"), "[1, 2]").unwrap_err();
        assert!(matches!(err, SpecError::NotAnObject(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_spec(Path::new("spec.json"), "{ openapi: ").unwrap_err();
        assert!(matches!(err, SpecError::Json { .. }));
        assert!(err.to_string().contains("spec.json"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = read_spec(Path::new("/nonexistent/spec.json")).unwrap_err();
        assert!(matches!(err, SpecError::Read { .. }));
    }

    #[test]
    fn spec_text_uses_two_space_indent() {
        let doc: Value = serde_json::from_str(r#"{"openapi":"3.0.3","info":{"title":"T"}}"#).unwrap();
        let text = to_spec_text(&doc);
        assert!(text.starts_with("{\n  \"openapi\": \"3.0.3\",\n  \"info\": {\n    \"title\""));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn string_extension_ignores_non_strings() {
        let doc: Value = serde_json::from_str(r#"{"x-spec-checksum": 12}"#).unwrap();
        assert_eq!(string_extension(&doc, EXT_CHECKSUM), None);
    }
}
