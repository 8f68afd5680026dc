use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::SpecError;
use crate::spec::{self, EXT_DIALECT};

/// Placeholder used when a document declares no version at all.
pub const UNKNOWN: &str = "unknown";

static DOTTED_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+(?:\.\d+)?").expect("version pattern is valid"));

/// OpenAPI dialect and version of a spec document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: String,
    pub major_version: u32,
    pub minor_version: u32,
    pub dialect: String,
}

impl VersionInfo {
    /// Build from a dotted version string; unparsable parts become 0.
    pub fn new(version: impl Into<String>, dialect: impl Into<String>) -> Self {
        let version = version.into();
        let (major_version, minor_version) = parse_major_minor(&version);
        Self {
            version,
            major_version,
            minor_version,
            dialect: dialect.into(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.version == UNKNOWN
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

/// Extract the dialect/version of a parsed spec document.
///
/// `x-openapi-dialect` wins over the `openapi` and `swagger` fields. Documents with none
/// of them yield version and dialect `"unknown"`.
pub fn extract_openapi_version(doc: &Value) -> VersionInfo {
    let declared = doc
        .get("openapi")
        .and_then(Value::as_str)
        .map(|v| (v, Family::OpenApi))
        .or_else(|| {
            doc.get("swagger")
                .and_then(Value::as_str)
                .map(|v| (v, Family::Swagger))
        });

    if let Some(dialect) = doc.get(EXT_DIALECT).and_then(Value::as_str) {
        let version = DOTTED_VERSION
            .find(dialect)
            .map(|m| m.as_str())
            .or(declared.map(|(v, _)| v))
            .unwrap_or(UNKNOWN);
        return VersionInfo::new(version, dialect);
    }

    match declared {
        Some((version, family)) => {
            let mut info = VersionInfo::new(version, "");
            info.dialect = family.dialect_url(info.major_version, info.minor_version);
            info
        }
        None => VersionInfo::new(UNKNOWN, UNKNOWN),
    }
}

/// Read a spec file and extract its version. Unreadable or malformed files are fatal.
pub fn detect_version(path: &Path) -> Result<VersionInfo, SpecError> {
    let doc = spec::read_spec(path)?;
    Ok(extract_openapi_version(&doc))
}

#[derive(Clone, Copy)]
enum Family {
    OpenApi,
    Swagger,
}

impl Family {
    fn dialect_url(self, major: u32, minor: u32) -> String {
        match self {
            Family::OpenApi => format!("https://spec.openapis.org/oas/{major}.{minor}/dialect/base"),
            Family::Swagger => format!("https://swagger.io/specification/v{major}/"),
        }
    }
}

fn parse_major_minor(version: &str) -> (u32, u32) {
    let mut parts = version.split('.');
    let major = parts.next().map(leading_int).unwrap_or(0);
    let minor = parts.next().map(leading_int).unwrap_or(0);
    (major, minor)
}

/// Leading decimal digits of `part`, or 0 when there are none.
fn leading_int(part: &str) -> u32 {
    let digits: String = part
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Leading `major[.minor]` of a version string as a float, e.g. `"3.0.3"` → `3.0`.
pub fn version_float(version: &str) -> Option<f64> {
    let trimmed = version.trim();
    let int_len = trimmed.chars().take_while(char::is_ascii_digit).count();
    if int_len == 0 {
        return None;
    }
    let rest = &trimmed[int_len..];
    let frac_len = rest
        .strip_prefix('.')
        .map(|r| r.chars().take_while(char::is_ascii_digit).count())
        .unwrap_or(0);
    let end = if frac_len > 0 { int_len + 1 + frac_len } else { int_len };
    trimmed[..end].parse().ok()
}
