use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable selecting the adapter fallback mode.
pub const ENV_ADAPTER_FALLBACK: &str = "OPENAPI_ADAPTER_FALLBACK";
/// Environment variable overriding the enum size limit.
pub const ENV_ENUM_LIMIT: &str = "CODEGEN_ENUM_LIMIT";
/// Environment variable overriding the large-enum output mode.
pub const ENV_ENUM_UNIONS: &str = "CODEGEN_ENUM_UNIONS";

/// Default member count at which the size-gated enum transform kicks in.
pub const DEFAULT_ENUM_LIMIT: usize = 45;

/// Top-level project configuration loaded from `.specgen.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpecgenConfig {
    pub input: String,
    pub output: String,
    pub fallback: FallbackMode,
    /// Directory with custom templates and a `manifest.yaml`; built-ins are used when unset.
    pub template_dir: Option<String>,
    pub enums: EnumConfig,
    pub postprocess: PostprocessConfig,
    pub checksums: ChecksumConfig,
}

impl Default for SpecgenConfig {
    fn default() -> Self {
        Self {
            input: "openapi.json".to_string(),
            output: "src/generated".to_string(),
            fallback: FallbackMode::default(),
            template_dir: None,
            enums: EnumConfig::default(),
            postprocess: PostprocessConfig::default(),
            checksums: ChecksumConfig::default(),
        }
    }
}

/// What to do when no adapter explicitly supports the detected version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// Fail with `NoAdapterForVersion`.
    Strict,
    /// Fall back to the closest adapter and warn.
    #[default]
    Warn,
    /// Fall back silently.
    Auto,
}

impl FallbackMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FallbackMode::Strict => "strict",
            FallbackMode::Warn => "warn",
            FallbackMode::Auto => "auto",
        }
    }

    /// Pick the mode: explicit value first, then the environment value, then `warn`.
    pub fn resolve(explicit: Option<FallbackMode>, env_value: Option<&str>) -> FallbackMode {
        if let Some(mode) = explicit {
            return mode;
        }
        match env_value.map(str::parse::<FallbackMode>) {
            Some(Ok(mode)) => mode,
            Some(Err(bad)) => {
                log::warn!("{ENV_ADAPTER_FALLBACK}: {bad}, using \"warn\"");
                FallbackMode::Warn
            }
            None => FallbackMode::Warn,
        }
    }
}

impl fmt::Display for FallbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FallbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(FallbackMode::Strict),
            "warn" => Ok(FallbackMode::Warn),
            "auto" => Ok(FallbackMode::Auto),
            other => Err(format!(
                "invalid fallback mode {other:?} (expected strict, warn or auto)"
            )),
        }
    }
}

/// How large enums are rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumUnionMode {
    /// Branded only when the member count exceeds the limit, union otherwise.
    #[default]
    Auto,
    /// Always a string-literal union.
    Union,
    /// Always a branded string.
    Branded,
}

impl EnumUnionMode {
    /// Parse a mode, warning and falling back to `auto` on invalid input.
    pub fn parse_or_default(value: &str) -> EnumUnionMode {
        value.parse().unwrap_or_else(|bad| {
            log::warn!("{ENV_ENUM_UNIONS}: {bad}, using \"auto\"");
            EnumUnionMode::Auto
        })
    }
}

impl FromStr for EnumUnionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(EnumUnionMode::Auto),
            "union" => Ok(EnumUnionMode::Union),
            "branded" => Ok(EnumUnionMode::Branded),
            other => Err(format!(
                "invalid enum mode {other:?} (expected auto, union or branded)"
            )),
        }
    }
}

/// Enum postprocessing settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnumConfig {
    pub limit: usize,
    pub unions: EnumUnionMode,
}

impl Default for EnumConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_ENUM_LIMIT,
            unions: EnumUnionMode::Auto,
        }
    }
}

/// Postprocessing settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostprocessConfig {
    pub enabled: bool,
    /// File extensions the transforms run over.
    pub extensions: Vec<String>,
    /// Formatter command run once over the output directory; empty disables it.
    pub formatter: Vec<String>,
    /// Run `tsc --noEmit` after postprocessing.
    pub typecheck: bool,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            extensions: vec!["ts".to_string()],
            formatter: vec![
                "npx".to_string(),
                "@biomejs/biome".to_string(),
                "format".to_string(),
                "--write".to_string(),
                ".".to_string(),
            ],
            typecheck: false,
        }
    }
}

/// Checksum stamping settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChecksumConfig {
    /// Stamp `x-spec-content-sha` / `x-spec-processed-checksum` before generating.
    pub stamp: bool,
}

impl Default for ChecksumConfig {
    fn default() -> Self {
        Self { stamp: true }
    }
}

impl SpecgenConfig {
    /// Apply environment overrides. `lookup` is usually `|k| std::env::var(k).ok()`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_ADAPTER_FALLBACK) {
            self.fallback = FallbackMode::resolve(None, Some(&value));
        }
        if let Some(value) = lookup(ENV_ENUM_LIMIT) {
            match value.trim().parse::<usize>() {
                Ok(limit) => self.enums.limit = limit,
                Err(_) => log::warn!(
                    "{ENV_ENUM_LIMIT}: invalid limit {value:?}, keeping {}",
                    self.enums.limit
                ),
            }
        }
        if let Some(value) = lookup(ENV_ENUM_UNIONS) {
            self.enums.unions = EnumUnionMode::parse_or_default(&value);
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".specgen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<SpecgenConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: SpecgenConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# specgen configuration
input: openapi.json
output: src/generated
fallback: warn          # strict | warn | auto (OPENAPI_ADAPTER_FALLBACK overrides)
# template_dir: templates

enums:
  limit: 45             # CODEGEN_ENUM_LIMIT overrides
  unions: auto          # auto | union | branded (CODEGEN_ENUM_UNIONS overrides)

postprocess:
  enabled: true
  extensions: [ts]
  formatter: ["npx", "@biomejs/biome", "format", "--write", "."]
  typecheck: false

checksums:
  stamp: true
"#
}
