use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{
    CHECKSUM_EXTENSIONS, EXT_CHECKSUM, EXT_CONTENT_SHA, EXT_PROCESSED_CHECKSUM, parse_spec,
    read_spec_text, string_extension, to_spec_text, write_spec_text,
};
use crate::checksum::checksum;
use crate::error::SpecError;

/// One line holding a checksum extension member, as written by [`to_spec_text`].
static CHECKSUM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*"x-spec-(?:content-sha|checksum|processed-checksum)"[ \t]*:[ \t]*"[^"\n]*"[ \t]*,?[ \t]*\r?\n?"#,
    )
    .expect("checksum line pattern is valid")
});

/// Canonical content of a spec and its checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedSpec {
    pub content: String,
    pub checksum: String,
}

/// Result of [`process`]: the prior raw checksum found in the file and the processed
/// checksum that was written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub prior_raw_checksum: Option<String>,
    pub processed_checksum: String,
}

/// Raw-file and canonical-content checksums of one spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecksumPair {
    pub raw_checksum: String,
    pub processed_checksum: String,
}

/// Canonical text of a spec document.
///
/// Checksum extensions are dropped, object keys are sorted recursively and the result is
/// pretty-printed with a 2-space indent. `$ref` flattening would slot in here.
pub fn canonicalize(doc: &Value) -> String {
    let mut canonical = sorted(doc);
    if let Value::Object(map) = &mut canonical {
        for key in CHECKSUM_EXTENSIONS {
            map.remove(key);
        }
    }
    serde_json::to_string_pretty(&canonical).expect("JSON values always serialize")
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), sorted(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

/// Checksum of the canonical form of `doc`.
pub fn processed_checksum_of(doc: &Value) -> String {
    checksum(&canonicalize(doc))
}

/// Checksum of the literal file text, minus the lines holding checksum extensions.
pub fn raw_checksum_of(text: &str) -> String {
    checksum(&CHECKSUM_LINE.replace_all(text, ""))
}

/// Read `path` and compute its canonical content and checksum. Does not touch the file.
pub fn process_content(path: &Path) -> Result<ProcessedSpec, SpecError> {
    let text = read_spec_text(path)?;
    let doc = parse_spec(path, &text)?;
    let content = canonicalize(&doc);
    let checksum = checksum(&content);
    Ok(ProcessedSpec { content, checksum })
}

/// Compute both checksums of the file as it currently is on disk.
pub fn current_checksums(path: &Path) -> Result<ChecksumPair, SpecError> {
    let text = read_spec_text(path)?;
    let doc = parse_spec(path, &text)?;
    Ok(ChecksumPair {
        raw_checksum: raw_checksum_of(&text),
        processed_checksum: processed_checksum_of(&doc),
    })
}

/// Read the prior raw checksum (`x-spec-checksum`), compute the processed checksum and
/// persist it as `x-spec-processed-checksum`.
pub fn process(path: &Path) -> Result<ProcessOutcome, SpecError> {
    let text = read_spec_text(path)?;
    let mut doc = parse_spec(path, &text)?;

    let prior_raw_checksum = string_extension(&doc, EXT_CHECKSUM);
    let processed_checksum = processed_checksum_of(&doc);

    set_extensions(&mut doc, &[(EXT_PROCESSED_CHECKSUM, &processed_checksum)]);
    write_spec_text(path, &to_spec_text(&doc))?;

    log::debug!(
        "processed {}: processed checksum {}",
        path.display(),
        processed_checksum
    );
    Ok(ProcessOutcome {
        prior_raw_checksum,
        processed_checksum,
    })
}

/// Compute both checksums and persist them as `x-spec-content-sha` and
/// `x-spec-processed-checksum`.
///
/// The file is re-serialized first, so the raw checksum describes the text that ends up
/// on disk.
pub fn stamp_checksums(path: &Path) -> Result<ChecksumPair, SpecError> {
    let text = read_spec_text(path)?;
    let mut doc = parse_spec(path, &text)?;

    let processed_checksum = processed_checksum_of(&doc);
    set_extensions(
        &mut doc,
        &[
            (EXT_CONTENT_SHA, ""),
            (EXT_PROCESSED_CHECKSUM, &processed_checksum),
        ],
    );
    // Checksum lines are stripped before hashing, so the placeholder does not matter.
    let raw_checksum = raw_checksum_of(&to_spec_text(&doc));
    set_extensions(&mut doc, &[(EXT_CONTENT_SHA, &raw_checksum)]);
    write_spec_text(path, &to_spec_text(&doc))?;

    log::debug!(
        "stamped {}: raw {} processed {}",
        path.display(),
        raw_checksum,
        processed_checksum
    );
    Ok(ChecksumPair {
        raw_checksum,
        processed_checksum,
    })
}

/// Set top-level string extensions. Existing keys keep their position; new keys go first.
fn set_extensions(doc: &mut Value, entries: &[(&str, &str)]) {
    let Value::Object(map) = doc else {
        return;
    };

    let mut missing = Vec::new();
    for (key, value) in entries {
        if map.contains_key(*key) {
            map.insert((*key).to_string(), Value::String((*value).to_string()));
        } else {
            missing.push((*key, *value));
        }
    }
    if missing.is_empty() {
        return;
    }

    let previous = std::mem::take(map);
    let mut rebuilt = Map::new();
    for (key, value) in missing {
        rebuilt.insert(key.to_string(), Value::String(value.to_string()));
    }
    rebuilt.extend(previous);
    *map = rebuilt;
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_temp(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openapi.json");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn canonical_form_ignores_key_order_and_whitespace() {
        let a: Value = serde_json::from_str(r#"{"openapi":"3.0.3","info":{"title":"A","version":"1"}}"#).unwrap();
        let b: Value = serde_json::from_str(
            "{\n    \"info\": {\"version\": \"1\", \"title\": \"A\"},\n    \"openapi\": \"3.0.3\"\n}",
        )
        .unwrap();
        assert_eq!(canonicalize(&a), canonicalize(&b));
        assert_eq!(processed_checksum_of(&a), processed_checksum_of(&b));
    }

    #[test]
    fn canonical_form_ignores_checksum_extensions() {
        let plain: Value = serde_json::from_str(r#"{"openapi":"3.0.3"}"#).unwrap();
        let stamped: Value = serde_json::from_str(
            r#"{"x-spec-processed-checksum":"abc","x-spec-content-sha":"def","openapi":"3.0.3"}"#,
        )
        .unwrap();
        assert_eq!(canonicalize(&plain), canonicalize(&stamped));
    }

    #[test]
    fn canonical_form_changes_with_content() {
        let a: Value = serde_json::from_str(r#"{"openapi":"3.0.3","paths":{}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"openapi":"3.0.3","paths":{"/x":{}}}"#).unwrap();
        assert_ne!(processed_checksum_of(&a), processed_checksum_of(&b));
    }

    #[test]
    fn canonical_form_is_two_space_indented_and_sorted() {
        let doc: Value = serde_json::from_str(r#"{"b":1,"a":{"d":2,"c":3}}"#).unwrap();
        assert_eq!(
            canonicalize(&doc),
            "{\n  \"a\": {\n    \"c\": 3,\n    \"d\": 2\n  },\n  \"b\": 1\n}"
        );
    }

    #[test]
    fn raw_checksum_strips_only_checksum_lines() {
        let plain = "{\n  \"openapi\": \"3.0.3\"\n}\n";
        let stamped = "{\n  \"x-spec-content-sha\": \"123\",\n  \"openapi\": \"3.0.3\"\n}\n";
        assert_eq!(raw_checksum_of(plain), raw_checksum_of(stamped));

        let reformatted = "{\n    \"openapi\": \"3.0.3\"\n}\n";
        assert_ne!(raw_checksum_of(plain), raw_checksum_of(reformatted));
    }

    #[test]
    fn process_content_does_not_modify_file() {
        let original = r#"{"openapi":"3.0.3","paths":{}}"#;
        let (_dir, path) = write_temp(original);
        let processed = process_content(&path).unwrap();
        assert_eq!(processed.checksum, checksum(&processed.content));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn process_reads_prior_checksum_and_persists_processed() {
        let (_dir, path) = write_temp(r#"{"x-spec-checksum":"prior","openapi":"3.0.3","paths":{}}"#);

        let outcome = process(&path).unwrap();
        assert_eq!(outcome.prior_raw_checksum.as_deref(), Some("prior"));

        let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            doc[EXT_PROCESSED_CHECKSUM].as_str(),
            Some(outcome.processed_checksum.as_str())
        );
        assert_eq!(doc[EXT_CHECKSUM].as_str(), Some("prior"));
    }

    #[test]
    fn process_is_idempotent() {
        let (_dir, path) = write_temp(r#"{"openapi":"3.1.0","paths":{}}"#);
        let first = process(&path).unwrap();
        let second = process(&path).unwrap();
        assert_eq!(first.processed_checksum, second.processed_checksum);
        assert_eq!(first.prior_raw_checksum, None);
    }

    #[test]
    fn stamp_writes_both_extensions_first_and_matches_current() {
        let (_dir, path) = write_temp(r#"{"openapi":"3.0.3","info":{"title":"T","version":"1"}}"#);

        let stamped = stamp_checksums(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"x-spec-content-sha\": "));

        let current = current_checksums(&path).unwrap();
        assert_eq!(stamped, current);

        let again = stamp_checksums(&path).unwrap();
        assert_eq!(stamped, again);
    }

    #[test]
    fn existing_extensions_keep_their_position() {
        let mut doc: Value =
            serde_json::from_str(r#"{"openapi":"3.0.3","x-spec-processed-checksum":"old"}"#).unwrap();
        set_extensions(&mut doc, &[(EXT_PROCESSED_CHECKSUM, "new")]);
        let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["openapi", "x-spec-processed-checksum"]);
        assert_eq!(doc[EXT_PROCESSED_CHECKSUM], "new");
    }
}
