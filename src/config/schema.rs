//! Configuration schema for the audit config file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::catalog::ToolSpec;

fn default_probe_timeout() -> u64 {
    10
}

fn default_cluster_timeout() -> u64 {
    15
}

/// Root structure of the YAML config file.
///
/// Every field is optional; an empty file yields the built-in catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Timeout for tool and listener probes, in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Timeout for cluster API queries, in seconds.
    #[serde(default = "default_cluster_timeout")]
    pub cluster_timeout_secs: u64,

    /// Replaces the built-in tool list when non-empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,

    /// Merged over the built-in port list.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ports: BTreeMap<u16, String>,

    /// Replaces the runtime install directories when non-empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub install_dirs: Vec<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: default_probe_timeout(),
            cluster_timeout_secs: default_cluster_timeout(),
            tools: Vec::new(),
            ports: BTreeMap::new(),
            install_dirs: Vec::new(),
        }
    }
}
