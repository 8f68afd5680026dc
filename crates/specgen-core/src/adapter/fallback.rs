use super::GeneratorAdapter;
use crate::config::FallbackMode;
use crate::error::SelectionError;
use crate::version::VersionInfo;

/// Adapter picked for a version no registered adapter supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackResolution {
    pub adapter: GeneratorAdapter,
    /// Operator-facing warning; only set in `warn` mode.
    pub warning: Option<String>,
}

/// Resolve an adapter for an unsupported version under `mode`.
///
/// `strict` fails; `warn` and `auto` pick the same adapter, but only `warn` logs and
/// records a warning.
pub fn resolve_fallback(
    version: &VersionInfo,
    mode: FallbackMode,
) -> Result<FallbackResolution, SelectionError> {
    if mode == FallbackMode::Strict {
        return Err(SelectionError::NoAdapterForVersion {
            version: version.version.clone(),
        });
    }

    let (adapter, message) = closest_adapter(version);
    match mode {
        FallbackMode::Warn => {
            log::warn!("{message}");
            Ok(FallbackResolution {
                adapter,
                warning: Some(message),
            })
        }
        _ => {
            log::debug!("auto fallback: {message}");
            Ok(FallbackResolution {
                adapter,
                warning: None,
            })
        }
    }
}

/// Version-bracket heuristic: everything lands on the legacy generator, with the warning
/// tuned to how far off the version is.
fn closest_adapter(version: &VersionInfo) -> (GeneratorAdapter, String) {
    let adapter = GeneratorAdapter::Legacy30;
    let v = &version.version;
    let message = match version.major_version {
        3 => format!(
            "OpenAPI {v} is not explicitly supported; falling back to the {adapter} adapter. \
             Newer 3.x features may be ignored."
        ),
        4 => format!(
            "OpenAPI {v} is a major version ahead of every installed adapter; falling back to \
             the {adapter} adapter. Generated code is likely incomplete, review it carefully."
        ),
        _ => format!(
            "Could not match OpenAPI version {v:?} to an adapter; falling back to the {adapter} \
             adapter. Verify your spec declares a valid `openapi` version."
        ),
    };
    (adapter, message)
}
