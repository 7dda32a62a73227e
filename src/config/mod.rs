//! Optional YAML configuration.
//!
//! - Schema definitions in [`schema`]
//! - File loading in [`loader`]
//! - Validation in [`validator`]
//!
//! The config only adjusts data: timeouts and the catalog tables. It is
//! resolved once at startup into a [`Catalog`] and [`Timeouts`] that are
//! passed to every section runner.
//!
//! ```yaml
//! probe_timeout_secs: 10
//! cluster_timeout_secs: 15
//! ports:
//!   8081: Internal dashboard
//! install_dirs:
//!   - /var/lib/rancher/k3s
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{load_config_file, parse_config};
pub use schema::AuditConfig;
pub use validator::{validate, validate_config, ValidationError};

use std::path::Path;
use std::time::Duration;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::probe::Timeouts;

/// Load and validate the config at `path`, or the defaults when `None`.
pub fn load(path: Option<&Path>) -> Result<AuditConfig> {
    let config = match path {
        Some(path) => load_config_file(path)?,
        None => AuditConfig::default(),
    };
    validate(&config)?;
    Ok(config)
}

impl AuditConfig {
    /// The built-in catalog with this config's overrides applied.
    pub fn catalog(&self) -> Catalog {
        let mut catalog = Catalog::builtin();
        if !self.tools.is_empty() {
            catalog.tools = self.tools.clone();
        }
        catalog
            .ports
            .extend(self.ports.iter().map(|(port, purpose)| (*port, purpose.clone())));
        if !self.install_dirs.is_empty() {
            catalog.install_dirs = self.install_dirs.clone();
        }
        catalog
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            tool: Duration::from_secs(self.probe_timeout_secs),
            cluster: Duration::from_secs(self.cluster_timeout_secs),
        }
    }
}
