//! Plan definition files.

use std::path::Path;

use tracing::debug;

use crate::error::{PublishError, Result};
use crate::model::Plan;

/// Read a `.json` or `.toml` plan definition.
///
/// Key and oid syntax is checked while parsing; call [`Plan::validate`] for
/// the structural checks.
pub fn load_plan_file(path: &Path) -> Result<Plan> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let content = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), "Loading plan definition");

    match extension.as_deref() {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("toml") => toml::from_str(&content)
            .map_err(|e| PublishError::Config(format!("{}: {}", path.display(), e))),
        _ => Err(PublishError::Config(format!(
            "{}: unsupported definition format (expected .json or .toml)",
            path.display()
        ))),
    }
}

/// Render a plan as TOML, the inverse of [`load_plan_file`] for `.toml`.
pub fn to_toml(plan: &Plan) -> Result<String> {
    toml::to_string_pretty(plan).map_err(|e| PublishError::Config(e.to_string()))
}
