use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::DriftError;
use crate::spec::{
    self, EXT_CHECKSUM, EXT_CONTENT_SHA, EXT_PROCESSED_CHECKSUM, processed_checksum_of,
    raw_checksum_of, stamp_checksums, string_extension,
};

/// Options for [`verify_spec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    pub fail_on_mismatch: bool,
    pub update_on_mismatch: bool,
    pub verify_raw_checksum: bool,
    pub verify_processed_checksum: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            fail_on_mismatch: true,
            update_on_mismatch: false,
            verify_raw_checksum: true,
            verify_processed_checksum: true,
        }
    }
}

/// Stored vs. current checksums of one spec file.
///
/// A `None` match means there was nothing stored to compare against (or the check was
/// disabled), which is different from `Some(false)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub spec_path: PathBuf,
    pub stored_raw_checksum: Option<String>,
    pub stored_processed_checksum: Option<String>,
    pub current_raw_checksum: String,
    pub current_processed_checksum: String,
    pub raw_checksum_matches: Option<bool>,
    pub processed_checksum_matches: Option<bool>,
    pub messages: Vec<String>,
}

impl VerificationResult {
    /// True when an enabled check found a mismatch.
    pub fn has_mismatch(&self) -> bool {
        self.raw_checksum_matches == Some(false) || self.processed_checksum_matches == Some(false)
    }
}

/// Recompute the checksums of `path` and compare them with the stored extensions.
pub fn verify_spec(path: &Path, options: &VerifyOptions) -> Result<VerificationResult, DriftError> {
    let text = spec::read_spec_text(path)?;
    let doc = spec::parse_spec(path, &text)?;

    let stored_raw_checksum =
        string_extension(&doc, EXT_CONTENT_SHA).or_else(|| string_extension(&doc, EXT_CHECKSUM));
    let stored_processed_checksum = string_extension(&doc, EXT_PROCESSED_CHECKSUM);
    let current_raw_checksum = raw_checksum_of(&text);
    let current_processed_checksum = processed_checksum_of(&doc);

    let raw_checksum_matches = compare(
        options.verify_raw_checksum,
        stored_raw_checksum.as_deref(),
        &current_raw_checksum,
    );
    let processed_checksum_matches = compare(
        options.verify_processed_checksum,
        stored_processed_checksum.as_deref(),
        &current_processed_checksum,
    );

    let mut result = VerificationResult {
        spec_path: path.to_path_buf(),
        stored_raw_checksum,
        stored_processed_checksum,
        current_raw_checksum,
        current_processed_checksum,
        raw_checksum_matches,
        processed_checksum_matches,
        messages: Vec::new(),
    };
    describe(&mut result, options);

    if !result.has_mismatch() {
        return Ok(result);
    }

    if options.update_on_mismatch {
        let stamped = stamp_checksums(path)?;
        result.messages.push(format!(
            "updated stored checksums in {} (raw {}, processed {})",
            path.display(),
            stamped.raw_checksum,
            stamped.processed_checksum
        ));
        return Ok(result);
    }

    if options.fail_on_mismatch {
        return Err(DriftError::Mismatch {
            spec_path: path.to_path_buf(),
            details: mismatch_details(&result),
        });
    }

    Ok(result)
}

fn compare(enabled: bool, stored: Option<&str>, current: &str) -> Option<bool> {
    if !enabled {
        return None;
    }
    stored.map(|stored| stored == current)
}

fn describe(result: &mut VerificationResult, options: &VerifyOptions) {
    let checks = [
        (
            "raw",
            options.verify_raw_checksum,
            result.raw_checksum_matches,
        ),
        (
            "processed",
            options.verify_processed_checksum,
            result.processed_checksum_matches,
        ),
    ];
    for (label, enabled, matches) in checks {
        let message = match (enabled, matches) {
            (false, _) => format!("{label} checksum: skipped"),
            (true, None) => format!("{label} checksum: no stored checksum to compare"),
            (true, Some(true)) => format!("{label} checksum: ok"),
            (true, Some(false)) => format!("{label} checksum: MISMATCH"),
        };
        result.messages.push(message);
    }
}

fn mismatch_details(result: &VerificationResult) -> String {
    let mut lines = Vec::new();
    if result.raw_checksum_matches == Some(false) {
        lines.push(format!(
            "  raw checksum:       stored {} / current {}",
            result.stored_raw_checksum.as_deref().unwrap_or("-"),
            result.current_raw_checksum
        ));
    }
    if result.processed_checksum_matches == Some(false) {
        lines.push(format!(
            "  processed checksum: stored {} / current {}",
            result.stored_processed_checksum.as_deref().unwrap_or("-"),
            result.current_processed_checksum
        ));
    }
    lines.join("\n")
}
