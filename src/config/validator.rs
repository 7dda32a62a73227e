//! Configuration validation rules.
//!
//! - Tool names and commands must be non-empty
//! - Timeouts must be non-zero

use crate::config::schema::AuditConfig;
use crate::error::{AuditError, Result};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &AuditConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.probe_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "zero-timeout",
            "probe_timeout_secs must be greater than zero",
        ));
    }
    if config.cluster_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "zero-timeout",
            "cluster_timeout_secs must be greater than zero",
        ));
    }

    for (index, tool) in config.tools.iter().enumerate() {
        if tool.name.trim().is_empty() {
            errors.push(ValidationError::new(
                "missing-name",
                format!("Tool #{} has an empty name", index + 1),
            ));
        }
        if tool.command.iter().all(|part| part.trim().is_empty()) {
            errors.push(ValidationError::new(
                "missing-command",
                format!("Tool '{}' must have a non-empty command", tool.name),
            ));
        }
    }

    errors
}

/// Validate and convert errors to a single [`AuditError`].
pub fn validate(config: &AuditConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(AuditError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
