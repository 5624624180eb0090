// Per-component threat rules

use crate::model::ComponentKind;
use crate::threat::{Severity, StrideCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatRule {
    pub category: StrideCategory,
    pub severity: Severity,
    pub description: String,
    pub recommendation: String,
}

impl ThreatRule {
    pub fn new(
        category: StrideCategory,
        severity: Severity,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            description: description.into(),
            recommendation: recommendation.into(),
        }
    }
}

/// Rules keyed by component kind. Kinds without an entry produce no
/// component-level findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeBase {
    rules: BTreeMap<ComponentKind, Vec<ThreatRule>>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KnowledgeBase {
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    pub fn with_rule(mut self, kind: ComponentKind, rule: ThreatRule) -> Self {
        self.rules.entry(kind).or_default().push(rule);
        self
    }

    pub fn rules_for(&self, kind: ComponentKind) -> &[ThreatRule] {
        self.rules.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.rules.keys().copied()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn builtin() -> Self {
        use ComponentKind as K;
        use Severity::*;
        use StrideCategory::*;

        let table: Vec<(ComponentKind, StrideCategory, Severity, &str, &str)> = vec![
            (
                K::User,
                Spoofing,
                High,
                "User identities may be spoofed without robust authentication",
                "Enforce multi-factor authentication and strong credential policies",
            ),
            (
                K::User,
                Repudiation,
                Medium,
                "User actions may not be recorded adequately",
                "Record user actions in a tamper-evident audit log",
            ),
            (
                K::Database,
                Tampering,
                High,
                "Stored data may be altered through injection attacks",
                "Use parameterized queries, strict input validation and least-privilege database accounts",
            ),
            (
                K::Database,
                InformationDisclosure,
                High,
                "Sensitive records may be exposed without adequate encryption",
                "Encrypt data at rest and require TLS for every database connection",
            ),
            (
                K::Database,
                DenialOfService,
                Medium,
                "Expensive queries or connection exhaustion may make the database unavailable",
                "Apply connection pooling, query timeouts and read replicas",
            ),
            (
                K::Cache,
                InformationDisclosure,
                Medium,
                "Cached data may be readable without encryption",
                "Encrypt sensitive cache entries and set appropriate TTLs",
            ),
            (
                K::Cache,
                Tampering,
                Medium,
                "Cached data may be poisoned or altered",
                "Validate the integrity of cached values before use",
            ),
            (
                K::ExternalService,
                Spoofing,
                High,
                "The origin of an external service may not be validated",
                "Validate TLS certificates and use mutual authentication",
            ),
            (
                K::ExternalService,
                InformationDisclosure,
                Medium,
                "Data may be intercepted while exchanged with an external party",
                "Use TLS for all external communication",
            ),
            (
                K::ExternalService,
                DenialOfService,
                Medium,
                "Dependency on an external service may cause unavailability",
                "Add circuit breakers, timeouts and fallback strategies",
            ),
            (
                K::LoadBalancer,
                DenialOfService,
                High,
                "The load balancer may be overwhelmed, making the system unavailable",
                "Apply rate limiting, a WAF and DDoS protection",
            ),
            (
                K::LoadBalancer,
                Tampering,
                Medium,
                "Traffic passing through the load balancer may be intercepted or modified",
                "Terminate TLS correctly and validate request integrity",
            ),
            (
                K::Monitoring,
                InformationDisclosure,
                Low,
                "Logs may contain sensitive information",
                "Sanitize log payloads and restrict access to telemetry",
            ),
            (
                K::Monitoring,
                Tampering,
                Low,
                "Logs may be altered to hide malicious activity",
                "Use append-only storage and sign log records",
            ),
            (
                K::Security,
                ElevationOfPrivilege,
                High,
                "Vulnerabilities in security controls may allow them to be bypassed",
                "Run regular penetration tests and keep security components patched",
            ),
            (
                K::Security,
                Tampering,
                High,
                "Security controls may be disabled or reconfigured",
                "Enforce configuration integrity and alert on control changes",
            ),
            (
                K::Service,
                Spoofing,
                Medium,
                "The service may not validate the identity of its callers",
                "Authenticate service-to-service calls (mTLS, signed tokens)",
            ),
            (
                K::Service,
                Tampering,
                Medium,
                "Data processed by the service may be altered",
                "Validate input and sign critical payloads",
            ),
            (
                K::Service,
                InformationDisclosure,
                Medium,
                "The service may expose sensitive information",
                "Apply access control and encrypt sensitive data",
            ),
            (
                K::Service,
                DenialOfService,
                Medium,
                "The service may be overloaded",
                "Add rate limiting, circuit breakers and autoscaling",
            ),
            (
                K::Boundary,
                Tampering,
                High,
                "Data crossing this trust boundary may be tampered with",
                "Validate and sanitize all data entering or leaving the boundary",
            ),
            (
                K::Boundary,
                InformationDisclosure,
                High,
                "Sensitive data may leak across this trust boundary",
                "Encrypt traffic and enforce access control at the boundary",
            ),
        ];

        table.into_iter().fold(
            Self::empty(),
            |kb, (kind, category, severity, description, recommendation)| {
                kb.with_rule(
                    kind,
                    ThreatRule::new(category, severity, description, recommendation),
                )
            },
        )
    }
}
