//! Static reference data that decides which checks exist.
//!
//! A [`Catalog`] is built once at startup (built-in defaults, optionally
//! overridden by the config file) and passed by reference to every section
//! runner. Runners never reach for global tables, so tests can hand them a
//! reduced catalog.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An external tool whose presence and version are checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Check name, also the binary looked up on PATH.
    pub name: String,
    /// Invocation used to query the tool (program first).
    pub command: Vec<String>,
}

impl ToolSpec {
    pub fn new(name: &str, command: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            command: command.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The program the invocation runs.
    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or(&self.name)
    }
}

/// A network plugin recognized from system pod names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPlugin {
    /// Substring searched for in the pod listing; also the reported name.
    pub marker: String,
    /// Whether the plugin enforces NetworkPolicy objects.
    pub enforces_policy: bool,
}

impl NetworkPlugin {
    pub fn new(marker: &str, enforces_policy: bool) -> Self {
        Self {
            marker: marker.to_string(),
            enforces_policy,
        }
    }
}

/// All reference tables used by the section runners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    /// Tools to probe, in report order.
    pub tools: Vec<ToolSpec>,
    /// Known ports and their purpose. Iterates in ascending port order.
    pub ports: BTreeMap<u16, String>,
    /// Listening-socket probes, most preferred first.
    pub listeners: Vec<Vec<String>>,
    /// Install directories of the lightweight cluster runtime.
    pub install_dirs: Vec<PathBuf>,
    /// Network plugins in match priority order; first match wins.
    pub network_plugins: Vec<NetworkPlugin>,
}

impl Catalog {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self {
            tools: builtin_tools(),
            ports: builtin_ports(),
            listeners: builtin_listeners(),
            install_dirs: builtin_install_dirs(),
            network_plugins: builtin_network_plugins(),
        }
    }

    /// Detect the network plugin from a pod listing.
    ///
    /// Plugins are tried in catalog order and the first marker found wins.
    pub fn detect_network_plugin(&self, pods: &str) -> Option<&NetworkPlugin> {
        self.network_plugins
            .iter()
            .find(|plugin| pods.contains(plugin.marker.as_str()))
    }

    /// The primary install directory of the lightweight runtime, if any.
    pub fn runtime_data_dir(&self) -> Option<&PathBuf> {
        self.install_dirs.first()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_tools() -> Vec<ToolSpec> {
    vec![
        // core platform & k8s
        ToolSpec::new("kubectl", &["kubectl", "version", "--client", "--output=yaml"]),
        ToolSpec::new("helm", &["helm", "version", "--short"]),
        ToolSpec::new("k3s", &["k3s", "--version"]),
        ToolSpec::new("docker", &["docker", "--version"]),
        ToolSpec::new("nerdctl", &["nerdctl", "--version"]),
        ToolSpec::new("ctr", &["ctr", "version"]),
        // IaC / ops
        ToolSpec::new("pulumi", &["pulumi", "version"]),
        ToolSpec::new("ansible", &["ansible", "--version"]),
        ToolSpec::new("argocd", &["argocd", "version", "--client"]),
        // secrets / supply chain
        ToolSpec::new("vault", &["vault", "version"]),
        ToolSpec::new("sops", &["sops", "--version"]),
        ToolSpec::new("age", &["age", "--version"]),
        ToolSpec::new("cosign", &["cosign", "version"]),
        ToolSpec::new("syft", &["syft", "version"]),
        ToolSpec::new("trivy", &["trivy", "--version"]),
        // dev tooling
        ToolSpec::new("git", &["git", "--version"]),
        ToolSpec::new("node", &["node", "-v"]),
        ToolSpec::new("pnpm", &["pnpm", "-v"]),
        ToolSpec::new("python3", &["python3", "--version"]),
        ToolSpec::new("uv", &["uv", "--version"]),
        // desktop runtime
        ToolSpec::new("rdctl", &["rdctl", "version"]),
        ToolSpec::new("redis-cli", &["redis-cli", "--version"]),
    ]
}

fn builtin_ports() -> BTreeMap<u16, String> {
    [
        (6443, "Kubernetes API (k3s/rancher)"),
        (9345, "k3s supervisor (join API)"),
        (80, "Traefik HTTP ingress"),
        (443, "Traefik HTTPS ingress"),
        (8080, "ArgoCD local pf / Guacamole alt web"),
        (8200, "Vault API/UI"),
        (8201, "Vault cluster"),
        (3000, "Grafana / Homepage / Semaphore (via Ingress)"),
        (15672, "RabbitMQ Management (should not be public)"),
        (15692, "RabbitMQ Prometheus metrics"),
        (5672, "RabbitMQ AMQP"),
        (19999, "Netdata"),
        (4317, "OTel collector gRPC"),
        (4318, "OTel collector HTTP"),
        (8000, "Kong (Supabase edge)"),
        (8443, "Kong TLS (Supabase edge) / Guacamole alt"),
        (4000, "Supabase Realtime (internal)"),
        (5000, "Supabase Storage (internal)"),
        (9999, "Supabase GoTrue (internal)"),
        (4822, "guacd (internal)"),
        (4444, "Ory Hydra public"),
        (4445, "Ory Hydra admin (keep private)"),
        (4433, "Ory Kratos public"),
        (4434, "Ory Kratos admin (keep private)"),
        (5678, "n8n"),
    ]
    .into_iter()
    .map(|(port, purpose)| (port, purpose.to_string()))
    .collect()
}

fn builtin_listeners() -> Vec<Vec<String>> {
    let probes: [&[&str]; 4] = [
        &["ss", "-lntp"],
        &["ss", "-lnt"],
        &["netstat", "-ano"],
        &["lsof", "-iTCP", "-sTCP:LISTEN", "-n", "-P"],
    ];
    probes
        .iter()
        .map(|cmd| cmd.iter().map(|s| s.to_string()).collect())
        .collect()
}

fn builtin_install_dirs() -> Vec<PathBuf> {
    ["/var/lib/rancher/k3s", "/etc/rancher/k3s", "/var/lib/kubelet"]
        .into_iter()
        .map(PathBuf::from)
        .collect()
}

fn builtin_network_plugins() -> Vec<NetworkPlugin> {
    vec![
        NetworkPlugin::new("cilium", true),
        NetworkPlugin::new("calico", true),
        NetworkPlugin::new("flannel", false),
    ]
}
