//! Config file loading.

use crate::config::schema::AuditConfig;
use crate::error::{AuditError, Result};
use std::fs;
use std::path::Path;

/// Load and parse a config file.
///
/// A missing file is [`AuditError::ConfigNotFound`]; any other read failure
/// is passed through as IO.
pub fn load_config_file(path: &Path) -> Result<AuditConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AuditError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            AuditError::Io(e)
        }
    })?;

    tracing::debug!(path = %path.display(), "loaded config file");
    parse_config(&content, path)
}

/// Parse YAML content into [`AuditConfig`].
///
/// `source_path` is only used for error reporting. Blank content is the
/// default config.
pub fn parse_config(content: &str, source_path: &Path) -> Result<AuditConfig> {
    if content.trim().is_empty() {
        return Ok(AuditConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| AuditError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}
