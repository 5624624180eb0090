// STRIDE checks over a component graph
//
// Each pass is a pure function of the graph. They are run in this order by
// `StrideAnalyzer`: components, flows, architecture.

use crate::knowledge::KnowledgeBase;
use crate::model::{ComponentKind, Graph, Node};
use crate::threat::{Severity, StrideCategory, ThreatAnalysis};
use crate::topology::FlowTopology;
use std::collections::HashMap;

/// One finding per knowledge-base rule for every node whose kind has rules.
///
/// Detection confidence stands in for how sure we are the component exists:
/// below `low_confidence_threshold` the finding is reported as Low and says so.
pub fn analyze_components(
    graph: &Graph,
    knowledge_base: &KnowledgeBase,
    low_confidence_threshold: f64,
) -> Vec<ThreatAnalysis> {
    let mut findings = Vec::new();

    for node in &graph.nodes {
        let uncertain = node.confidence < low_confidence_threshold;

        for rule in knowledge_base.rules_for(node.kind) {
            let mut description = format!(
                "{} ({}): {}",
                node.kind.display_name(),
                node.id,
                rule.description
            );
            let severity = if uncertain {
                description.push_str(&format!(
                    " [low detection confidence {:.2}; verify this component manually]",
                    node.confidence
                ));
                Severity::Low
            } else {
                rule.severity
            };

            findings.push(ThreatAnalysis::new(
                rule.category,
                severity,
                vec![node.id.clone()],
                description,
                rule.recommendation.clone(),
            ));
        }
    }

    findings
}

/// Contextual rules per edge. Several may fire on the same edge.
pub fn analyze_flows(graph: &Graph) -> Vec<ThreatAnalysis> {
    let mut findings = Vec::new();
    let nodes: HashMap<&str, &Node> = graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    for edge in &graph.edges {
        let (Some(source), Some(target)) =
            (nodes.get(edge.source.as_str()), nodes.get(edge.target.as_str()))
        else {
            continue;
        };

        let pair = || vec![source.id.clone(), target.id.clone()];
        let crosses_boundary = edge.cross_boundary() || source.parent_id != target.parent_id;

        if crosses_boundary {
            if source.kind.is_public_origin() && !target.kind.is_gated() {
                findings.push(ThreatAnalysis::new(
                    StrideCategory::ElevationOfPrivilege,
                    Severity::Critical,
                    pair(),
                    format!(
                        "{} ({}) reaches {} ({}) across a trust boundary without passing a load balancer or security control",
                        source.kind.display_name(),
                        source.id,
                        target.kind.display_name(),
                        target.id
                    ),
                    "Route ingress through a gateway, WAF or load balancer that authenticates and authorizes requests",
                ));
            }

            findings.push(ThreatAnalysis::new(
                StrideCategory::Tampering,
                Severity::High,
                pair(),
                format!(
                    "Data flowing from {} to {} crosses a trust boundary and may be altered in transit",
                    source.id, target.id
                ),
                "Encrypt traffic across the boundary and validate message integrity on both sides",
            ));
        }

        match (source.kind, target.kind) {
            (ComponentKind::User, ComponentKind::Database) => {
                findings.push(ThreatAnalysis::new(
                    StrideCategory::Spoofing,
                    Severity::Critical,
                    pair(),
                    format!(
                        "User ({}) accesses database ({}) directly: unauthenticated database exposure",
                        source.id, target.id
                    ),
                    "Place an authenticated service layer between users and the database",
                ));
                findings.push(ThreatAnalysis::new(
                    StrideCategory::InformationDisclosure,
                    Severity::High,
                    pair(),
                    format!(
                        "Records from database ({}) may be exposed to user ({}) without filtering",
                        target.id, source.id
                    ),
                    "Expose data through an API that filters sensitive fields",
                ));
            }
            (ComponentKind::Service, ComponentKind::Database) => {
                findings.push(ThreatAnalysis::new(
                    StrideCategory::Tampering,
                    Severity::High,
                    pair(),
                    format!(
                        "Service ({}) writes to database ({}): unparameterized queries open a SQL injection surface",
                        source.id, target.id
                    ),
                    "Use parameterized queries or an ORM and grant the service least-privilege credentials",
                ));
            }
            _ => {}
        }

        if target.kind == ComponentKind::ExternalService {
            findings.push(ThreatAnalysis::new(
                StrideCategory::Spoofing,
                Severity::High,
                pair(),
                format!(
                    "Calls to external service ({}) may reach an impostor if its identity is not validated",
                    target.id
                ),
                "Pin or validate certificates and authenticate the external peer",
            ));
        }

        if source.kind == ComponentKind::ExternalService {
            findings.push(ThreatAnalysis::new(
                StrideCategory::Tampering,
                Severity::High,
                pair(),
                format!(
                    "Data received from external service ({}) may be compromised",
                    source.id
                ),
                "Validate and sanitize all inbound third-party data",
            ));
        }

        if target.kind == ComponentKind::Monitoring {
            findings.push(ThreatAnalysis::new(
                StrideCategory::InformationDisclosure,
                Severity::Medium,
                pair(),
                format!(
                    "Telemetry sent from {} to monitoring ({}) may leak sensitive payload data",
                    source.id, target.id
                ),
                "Redact secrets and personal data before emitting logs or metrics",
            ));
        }
    }

    findings
}

/// Whole-graph structural checks. Findings with no affected components apply
/// to the architecture as a whole.
pub fn analyze_architecture(graph: &Graph, fan_in_threshold: usize) -> Vec<ThreatAnalysis> {
    let mut findings = Vec::new();

    if graph.nodes.is_empty() {
        return findings;
    }

    if !graph.has_kind(ComponentKind::Security) && graph.has_kind(ComponentKind::User) {
        findings.push(ThreatAnalysis::new(
            StrideCategory::ElevationOfPrivilege,
            Severity::High,
            Vec::new(),
            "Users interact with the architecture but no dedicated security component enforces authentication or authorization",
            "Add a security component (API gateway, identity provider, WAF) in front of user-facing services",
        ));
    }

    if !graph.has_kind(ComponentKind::Monitoring) {
        findings.push(ThreatAnalysis::new(
            StrideCategory::Repudiation,
            Severity::Medium,
            Vec::new(),
            "The architecture has no monitoring component, so actions cannot be audited",
            "Add centralized logging, monitoring and alerting",
        ));
    }

    let topology = FlowTopology::from_graph(graph);
    for node in graph
        .nodes
        .iter()
        .filter(|n| matches!(n.kind, ComponentKind::Service | ComponentKind::Database))
    {
        let in_degree = topology.in_degree(&node.id);
        if in_degree > fan_in_threshold {
            findings.push(ThreatAnalysis::new(
                StrideCategory::DenialOfService,
                Severity::High,
                vec![node.id.clone()],
                format!(
                    "{} ({}) receives {} incoming flows: a single point of failure and load hotspot",
                    node.kind.display_name(),
                    node.id,
                    in_degree
                ),
                "Add redundancy, replicas or failover and spread load across instances",
            ));
        }
    }

    if graph.has_kind(ComponentKind::Database) && !graph.has_kind(ComponentKind::Cache) {
        findings.push(ThreatAnalysis::new(
            StrideCategory::DenialOfService,
            Severity::Medium,
            ids_of_kind(graph, ComponentKind::Database),
            "Databases without a cache layer absorb the full read load and may be overwhelmed",
            "Add a cache layer (e.g. Redis, Memcached) in front of read-heavy paths",
        ));
    }

    if graph.count_kind(ComponentKind::Service) > 1 && !graph.has_kind(ComponentKind::LoadBalancer) {
        findings.push(ThreatAnalysis::new(
            StrideCategory::DenialOfService,
            Severity::Medium,
            ids_of_kind(graph, ComponentKind::Service),
            "Multiple services without a load balancer may receive uneven load",
            "Add a load balancer to distribute traffic across services",
        ));
    }

    findings
}

fn ids_of_kind(graph: &Graph, kind: ComponentKind) -> Vec<String> {
    graph.nodes_of_kind(kind).map(|n| n.id.clone()).collect()
}
