//! Kubernetes section.
//!
//! Probes run in dependency order: reachability, a node sample, network
//! plugin identification, then one presence check per platform component.
//! Every query is independent, so a failed reachability probe does not hide
//! the component entries; each one reports its own failure.

use std::cell::OnceCell;

use super::{dry_run_skip, AuditContext, SectionRunner};
use crate::probe::ProbeResult;
use crate::status::{CheckEntry, Outcome};

const RANCHER_IMAGE_JSONPATH: &str = "jsonpath={.spec.template.spec.containers[0].image}";

/// How a component's presence is recognized.
#[derive(Debug, Clone, Copy)]
enum Detection {
    /// `kubectl get ns <name>` succeeds.
    Namespace(&'static str),
    /// Any of these CRD names appears in `kubectl get crd`.
    CrdAny(&'static [&'static str]),
    /// Any marker appears in the lowercased namespace listing.
    NamespaceListing(&'static [&'static str]),
    /// A service listing in `namespace` mentions `marker`.
    Service {
        namespace: &'static str,
        marker: &'static str,
    },
}

struct Component {
    check: &'static str,
    detection: Detection,
    found: &'static str,
    missing: &'static str,
    fix: &'static str,
}

const COMPONENTS: &[Component] = &[
    Component {
        check: "traefik",
        detection: Detection::Service {
            namespace: "kube-system",
            marker: "traefik",
        },
        found: "Traefik service detected",
        missing: "Traefik service not found",
        fix: "Enable the bundled Traefik ingress or install it with Helm",
    },
    Component {
        check: "metallb",
        detection: Detection::Namespace("metallb-system"),
        found: "metallb-system namespace present",
        missing: "not installed",
        fix: "Install MetalLB and configure IPAddressPool + L2Advertisement",
    },
    Component {
        check: "argocd",
        detection: Detection::Namespace("argocd"),
        found: "argocd namespace present",
        missing: "not installed",
        fix: "Install Argo CD (GitOps)",
    },
    Component {
        check: "external-secrets",
        detection: Detection::CrdAny(&[
            "externalsecrets.external-secrets.io",
            "clustersecretstores.external-secrets.io",
        ]),
        found: "ESO CRDs found",
        missing: "ESO not detected",
        fix: "Install External Secrets Operator and configure Vault ClusterSecretStore",
    },
    Component {
        check: "vault",
        detection: Detection::Namespace("vault"),
        found: "vault namespace present",
        missing: "not installed",
        fix: "Deploy Vault with Raft + TLS; enable k8s auth",
    },
    Component {
        check: "ory",
        detection: Detection::Namespace("ory"),
        found: "ory namespace present",
        missing: "not installed",
        fix: "Deploy Kratos + Hydra and consent UI",
    },
    Component {
        check: "supabase",
        detection: Detection::NamespaceListing(&["supabase", "data"]),
        found: "namespace present",
        missing: "not detected",
        fix: "Deploy Supabase; expose only Kong (8000/8443)",
    },
    Component {
        check: "rabbitmq",
        detection: Detection::Namespace("rabbitmq"),
        found: "rabbitmq namespace present",
        missing: "not installed",
        fix: "Deploy RabbitMQ; mgmt internal; metrics 15692",
    },
    Component {
        check: "observability",
        detection: Detection::NamespaceListing(&["lgtm", "observability", "grafana"]),
        found: "observability ns present",
        missing: "not detected",
        fix: "Deploy docker-otel-lgtm (Grafana/Tempo/Loki/Mimir)",
    },
];

const RANCHER_MARKERS: &[&str] = &["cattle-system", "rancher"];

/// Cluster reachability, network plugin and platform components.
pub struct ClusterRunner;

impl SectionRunner for ClusterRunner {
    fn name(&self) -> &'static str {
        "Kubernetes"
    }

    fn run(&self, ctx: &AuditContext<'_>) -> Vec<CheckEntry> {
        if ctx.probe.which("kubectl").is_none() {
            return vec![CheckEntry::new(
                "kubectl",
                Outcome::fail(
                    "kubectl not installed",
                    "Install kubectl and ensure it is on PATH",
                ),
            )];
        }

        let kubectl = Kubectl::new(ctx);
        let mut entries = vec![
            CheckEntry::new("cluster", check_reachability(&kubectl)),
            CheckEntry::new("node-sample", check_node_sample(&kubectl)),
        ];
        entries.extend(check_network(ctx, &kubectl));
        entries.extend(
            COMPONENTS
                .iter()
                .map(|component| CheckEntry::new(component.check, detect(component, &kubectl))),
        );
        entries.extend(check_rancher(ctx, &kubectl));
        if ctx.probe.which("rdctl").is_some() {
            entries.extend(check_desktop_runtime(ctx));
        }
        entries
    }
}

/// Cluster CLI bound to one audit run.
///
/// Queries return `None` in dry-run mode. The namespace listing is fetched
/// at most once and shared by every check that scans it.
struct Kubectl<'c, 'a> {
    ctx: &'c AuditContext<'a>,
    namespaces: OnceCell<Option<ProbeResult>>,
}

impl<'c, 'a> Kubectl<'c, 'a> {
    fn new(ctx: &'c AuditContext<'a>) -> Self {
        Self {
            ctx,
            namespaces: OnceCell::new(),
        }
    }

    fn query(&self, args: &[&str]) -> Option<ProbeResult> {
        if self.ctx.is_dry_run() {
            return None;
        }
        let mut command = Vec::with_capacity(args.len() + 1);
        command.push("kubectl");
        command.extend_from_slice(args);
        Some(self.ctx.probe.run(&command, self.ctx.timeouts.cluster))
    }

    fn namespaces(&self) -> Option<&ProbeResult> {
        self.namespaces
            .get_or_init(|| self.query(&["get", "ns"]))
            .as_ref()
    }

    /// Whether the namespace listing succeeded and mentions any marker.
    fn namespaces_mention(&self, markers: &[&str]) -> Option<bool> {
        self.namespaces()
            .map(|result| output_mentions(result, markers))
    }
}

fn output_mentions(result: &ProbeResult, markers: &[&str]) -> bool {
    result.success_output().is_some_and(|out| {
        let out = out.to_lowercase();
        markers.iter().any(|m| out.contains(m))
    })
}

fn check_reachability(kubectl: &Kubectl<'_, '_>) -> Outcome {
    let Some(result) = kubectl.query(&["cluster-info"]) else {
        return dry_run_skip();
    };
    let message = if result.is_success() {
        "cluster reachable"
    } else {
        result.first_line().unwrap_or("cluster unreachable")
    };
    Outcome::check(
        result.is_success(),
        message,
        "Ensure kubeconfig / KUBECONFIG and k3s/rancher are running",
    )
}

fn check_node_sample(kubectl: &Kubectl<'_, '_>) -> Outcome {
    let Some(result) = kubectl.query(&["get", "nodes", "-o", "wide"]) else {
        return dry_run_skip();
    };
    match result.success_output().and_then(sample_row) {
        Some(row) => Outcome::pass(row),
        None => Outcome::warn(
            format!(
                "node listing failed: {}",
                result.first_line().unwrap_or("no nodes returned")
            ),
            "Check that the node is registered and Ready",
        ),
    }
}

/// The first data row of a table, or its only line when there is no header.
fn sample_row(table: &str) -> Option<&str> {
    let mut lines = table.lines();
    let first = lines.next()?;
    Some(lines.next().unwrap_or(first))
}

/// `cni` and `networkpolicy` entries.
fn check_network(ctx: &AuditContext<'_>, kubectl: &Kubectl<'_, '_>) -> [CheckEntry; 2] {
    let Some(pods) = kubectl.query(&["-n", "kube-system", "get", "pods", "-o", "name"]) else {
        return [
            CheckEntry::new("cni", dry_run_skip()),
            CheckEntry::new("networkpolicy", dry_run_skip()),
        ];
    };

    let plugin = pods
        .success_output()
        .and_then(|out| ctx.catalog.detect_network_plugin(out));

    let (cni, policy) = match plugin {
        Some(plugin) if plugin.enforces_policy => (
            Outcome::pass(plugin.marker.clone()),
            Outcome::pass(format!("{} enforces NetworkPolicies", plugin.marker)),
        ),
        Some(plugin) => (
            Outcome::pass(plugin.marker.clone()),
            Outcome::warn(
                format!("{} does not enforce NetworkPolicies", plugin.marker),
                "Switch to Cilium or Calico for policy support",
            ),
        ),
        None => (
            Outcome::pass("unknown"),
            Outcome::skip("network plugin unknown"),
        ),
    };
    tracing::debug!(plugin = ?plugin.map(|p| &p.marker), "network plugin detection");

    [
        CheckEntry::new("cni", cni),
        CheckEntry::new("networkpolicy", policy),
    ]
}

fn detect(component: &Component, kubectl: &Kubectl<'_, '_>) -> Outcome {
    let found = match component.detection {
        Detection::Namespace(name) => kubectl
            .query(&["get", "ns", name])
            .map(|r| r.is_success()),
        Detection::CrdAny(crds) => kubectl
            .query(&["get", "crd"])
            .map(|r| output_mentions(&r, crds)),
        Detection::NamespaceListing(markers) => kubectl.namespaces_mention(markers),
        Detection::Service { namespace, marker } => kubectl
            .query(&["-n", namespace, "get", "svc", "-o", "wide"])
            .map(|r| output_mentions(&r, &[marker])),
    };

    match found {
        None => dry_run_skip(),
        Some(found) => Outcome::check(
            found,
            if found {
                component.found
            } else {
                component.missing
            },
            component.fix,
        ),
    }
}

/// `rancher` and `rancher-version` entries.
///
/// The management UI is PASS when its namespace exists. When it is absent
/// but the lightweight runtime is installed (binary on PATH or data
/// directory present) the result is only a WARN.
fn check_rancher(ctx: &AuditContext<'_>, kubectl: &Kubectl<'_, '_>) -> [CheckEntry; 2] {
    let Some(present) = kubectl.namespaces_mention(RANCHER_MARKERS) else {
        return [
            CheckEntry::new("rancher", dry_run_skip()),
            CheckEntry::new("rancher-version", dry_run_skip()),
        ];
    };

    if !present {
        let rancher = if runtime_present(ctx) {
            Outcome::warn(
                "k3s present, Rancher not detected",
                "Install Rancher for multi-cluster management or ignore if single cluster",
            )
        } else {
            Outcome::fail(
                "not detected",
                "Deploy Rancher (cattle-system) if centralized mgmt desired",
            )
        };
        return [
            CheckEntry::new("rancher", rancher),
            CheckEntry::new("rancher-version", Outcome::skip("Rancher not detected")),
        ];
    }

    let version = kubectl
        .query(&[
            "-n",
            "cattle-system",
            "get",
            "deploy",
            "rancher",
            "-o",
            RANCHER_IMAGE_JSONPATH,
        ])
        .map(|result| match result.success_output() {
            Some(image) if !image.is_empty() => Outcome::pass(image),
            _ => Outcome::warn(
                format!(
                    "could not read Rancher image: {}",
                    result.first_line().unwrap_or("empty output")
                ),
                "",
            ),
        })
        .unwrap_or_else(dry_run_skip);

    [
        CheckEntry::new("rancher", Outcome::pass("rancher/cattle-system ns present")),
        CheckEntry::new("rancher-version", version),
    ]
}

fn runtime_present(ctx: &AuditContext<'_>) -> bool {
    ctx.probe.which("k3s").is_some()
        || ctx
            .catalog
            .runtime_data_dir()
            .is_some_and(|dir| ctx.probe.exists(dir))
}

/// `rdctl` and `rdctl-node` entries for the desktop runtime CLI.
fn check_desktop_runtime(ctx: &AuditContext<'_>) -> [CheckEntry; 2] {
    if ctx.is_dry_run() {
        return [
            CheckEntry::new("rdctl", dry_run_skip()),
            CheckEntry::new("rdctl-node", dry_run_skip()),
        ];
    }

    let version = ctx.probe.run(&["rdctl", "version"], ctx.timeouts.tool);
    let rdctl = Outcome::check(
        version.is_success(),
        version.first_line().unwrap_or("installed"),
        "",
    );

    let nodes = ctx.probe.run(
        &["rdctl", "shell", "kubectl", "get", "nodes", "-o", "wide"],
        ctx.timeouts.cluster,
    );
    let node = match nodes.success_output().and_then(|out| out.lines().nth(1)) {
        Some(row) => Outcome::pass(row),
        None => Outcome::warn(
            "no node row from rdctl shell",
            "Start Rancher Desktop with Kubernetes enabled",
        ),
    };

    [
        CheckEntry::new("rdctl", rdctl),
        CheckEntry::new("rdctl-node", node),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::probe::testing::FakeSystem;
    use crate::probe::{Probe, Timeouts, DRY_RUN_SENTINEL};
    use crate::status::Level;

    const PODS: &str = "kubectl -n kube-system get pods -o name";
    const NAMESPACES: &str = "kubectl get ns";

    fn run(system: &FakeSystem, dry_run: bool) -> Vec<CheckEntry> {
        let catalog = Catalog::builtin();
        let ctx = AuditContext::new(Probe::new(system, dry_run), &catalog, Timeouts::default());
        ClusterRunner.run(&ctx)
    }

    fn entry<'e>(entries: &'e [CheckEntry], name: &str) -> &'e Outcome {
        &entries
            .iter()
            .find(|e| e.name == name)
            .unwrap_or_else(|| panic!("missing entry {name}"))
            .outcome
    }

    fn names(entries: &[CheckEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn missing_kubectl_is_single_fail() {
        for dry_run in [false, true] {
            let entries = run(&FakeSystem::new(), dry_run);
            assert_eq!(names(&entries), vec!["kubectl"]);
            assert_eq!(entries[0].outcome.level(), Level::Fail);
            assert_eq!(entries[0].outcome.message(), "kubectl not installed");
        }
    }

    #[test]
    fn dry_run_and_live_share_shape() {
        let live = run(&FakeSystem::new().install("kubectl").install("rdctl"), false);
        let system = FakeSystem::new().install("kubectl").install("rdctl");
        let dry = run(&system, true);

        assert_eq!(names(&live), names(&dry));
        assert!(dry.iter().all(|e| e.outcome.level() == Level::Skip));
        assert!(dry
            .iter()
            .all(|e| e.outcome.message() == DRY_RUN_SENTINEL));
        assert!(system.executed().is_empty());
    }

    #[test]
    fn entry_order() {
        let entries = run(&FakeSystem::new().install("kubectl"), false);
        assert_eq!(
            names(&entries),
            vec![
                "cluster",
                "node-sample",
                "cni",
                "networkpolicy",
                "traefik",
                "metallb",
                "argocd",
                "external-secrets",
                "vault",
                "ory",
                "supabase",
                "rabbitmq",
                "observability",
                "rancher",
                "rancher-version",
            ]
        );
    }

    #[test]
    fn unreachable_cluster_reports_first_line() {
        let system = FakeSystem::new().install("kubectl").respond(
            "kubectl cluster-info",
            ProbeResult::failure(1, "The connection to the server was refused\nmore"),
        );
        let cluster = entry(&run(&system, false), "cluster").clone();
        assert_eq!(cluster.level(), Level::Fail);
        assert_eq!(cluster.message(), "The connection to the server was refused");
        assert!(!cluster.fix().is_empty());
    }

    #[test]
    fn reachable_cluster_and_node_sample() {
        let system = FakeSystem::new()
            .install("kubectl")
            .succeed("kubectl cluster-info", "Kubernetes control plane is running")
            .succeed(
                "kubectl get nodes -o wide",
                "NAME STATUS ROLES\nhomelab Ready control-plane",
            );
        let entries = run(&system, false);
        assert_eq!(entry(&entries, "cluster").message(), "cluster reachable");
        assert_eq!(entry(&entries, "node-sample").message(), "homelab Ready control-plane");
    }

    #[test]
    fn first_listed_plugin_wins_and_enforces_policy() {
        let system = FakeSystem::new().install("kubectl").succeed(
            PODS,
            "pod/kube-flannel-ds-x\npod/cilium-operator-1\npod/coredns-2",
        );
        let entries = run(&system, false);
        assert_eq!(entry(&entries, "cni").message(), "cilium");
        assert_ne!(entry(&entries, "networkpolicy").level(), Level::Warn);
    }

    #[test]
    fn flannel_alone_warns_about_policy() {
        let system = FakeSystem::new()
            .install("kubectl")
            .succeed(PODS, "pod/kube-flannel-ds-x");
        let entries = run(&system, false);
        assert_eq!(entry(&entries, "cni").message(), "flannel");
        let policy = entry(&entries, "networkpolicy");
        assert_eq!(policy.level(), Level::Warn);
        assert_eq!(policy.fix(), "Switch to Cilium or Calico for policy support");
    }

    #[test]
    fn unknown_plugin_skips_policy() {
        let entries = run(&FakeSystem::new().install("kubectl"), false);
        let cni = entry(&entries, "cni");
        assert_eq!(cni.level(), Level::Pass);
        assert_eq!(cni.message(), "unknown");
        assert_eq!(cni.fix(), "");
        assert_eq!(entry(&entries, "networkpolicy").level(), Level::Skip);
    }

    #[test]
    fn unrecognised_pods_report_unknown_plugin() {
        let system = FakeSystem::new()
            .install("kubectl")
            .succeed(PODS, "pod/coredns-1\npod/traefik-2");
        let entries = run(&system, false);
        let cni = entry(&entries, "cni");
        assert_eq!(cni.level(), Level::Pass);
        assert_eq!(cni.message(), "unknown");
        assert_eq!(entry(&entries, "networkpolicy").level(), Level::Skip);
    }

    #[test]
    fn cattle_system_passes_rancher_without_fix() {
        let system = FakeSystem::new()
            .install("kubectl")
            .succeed(NAMESPACES, "NAME STATUS\ncattle-system Active\ndefault Active")
            .succeed(
                &format!("kubectl -n cattle-system get deploy rancher -o {RANCHER_IMAGE_JSONPATH}"),
                "rancher/rancher:v2.9.2",
            );
        let entries = run(&system, false);
        let rancher = entry(&entries, "rancher");
        assert_eq!(rancher.level(), Level::Pass);
        assert_eq!(rancher.fix(), "");
        assert_eq!(entry(&entries, "rancher-version").message(), "rancher/rancher:v2.9.2");
    }

    #[test]
    fn runtime_without_rancher_warns() {
        let system = FakeSystem::new()
            .install("kubectl")
            .with_path("/var/lib/rancher/k3s")
            .succeed(NAMESPACES, "default Active\nkube-system Active");
        let entries = run(&system, false);
        assert_eq!(entry(&entries, "rancher").level(), Level::Warn);
        assert_eq!(entry(&entries, "rancher-version").level(), Level::Skip);
    }

    #[test]
    fn neither_rancher_nor_runtime_fails_with_hint() {
        let system = FakeSystem::new()
            .install("kubectl")
            .succeed(NAMESPACES, "default Active\nkube-system Active");
        let rancher = entry(&run(&system, false), "rancher").clone();
        assert_eq!(rancher.level(), Level::Fail);
        assert!(!rancher.fix().is_empty());
    }

    #[test]
    fn namespace_listing_fetched_once() {
        let system = FakeSystem::new()
            .install("kubectl")
            .succeed(NAMESPACES, "supabase Active\nlgtm Active");
        let entries = run(&system, false);
        assert_eq!(entry(&entries, "supabase").level(), Level::Pass);
        assert_eq!(entry(&entries, "observability").level(), Level::Pass);
        let listings = system
            .executed()
            .iter()
            .filter(|c| c.as_str() == NAMESPACES)
            .count();
        assert_eq!(listings, 1);
    }

    #[test]
    fn namespace_component_presence() {
        let system = FakeSystem::new()
            .install("kubectl")
            .succeed("kubectl get ns vault", "vault Active");
        let entries = run(&system, false);
        assert_eq!(entry(&entries, "vault").message(), "vault namespace present");
        let metallb = entry(&entries, "metallb");
        assert_eq!(metallb.level(), Level::Fail);
        assert_eq!(metallb.message(), "not installed");
        assert!(metallb.fix().contains("MetalLB"));
    }

    #[test]
    fn either_eso_crd_counts() {
        let system = FakeSystem::new().install("kubectl").succeed(
            "kubectl get crd",
            "clustersecretstores.external-secrets.io 2024-01-01",
        );
        assert_eq!(
            entry(&run(&system, false), "external-secrets").level(),
            Level::Pass
        );
    }

    #[test]
    fn traefik_from_service_listing() {
        let system = FakeSystem::new().install("kubectl").succeed(
            "kubectl -n kube-system get svc -o wide",
            "NAME TYPE\ntraefik LoadBalancer",
        );
        assert_eq!(entry(&run(&system, false), "traefik").level(), Level::Pass);
    }

    #[test]
    fn desktop_runtime_entries() {
        let system = FakeSystem::new()
            .install("kubectl")
            .install("rdctl")
            .succeed("rdctl version", "rdctl client version: 1.16.0")
            .succeed(
                "rdctl shell kubectl get nodes -o wide",
                "NAME STATUS\nlima-rancher-desktop Ready",
            );
        let entries = run(&system, false);
        assert_eq!(entry(&entries, "rdctl").message(), "rdctl client version: 1.16.0");
        assert_eq!(entry(&entries, "rdctl-node").message(), "lima-rancher-desktop Ready");
    }

    #[test]
    fn sample_row_prefers_second_line() {
        assert_eq!(sample_row("HEADER\nrow"), Some("row"));
        assert_eq!(sample_row("only"), Some("only"));
        assert_eq!(sample_row(""), None);
    }
}
