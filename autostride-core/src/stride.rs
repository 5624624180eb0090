use crate::config::AnalyzerConfig;
use crate::model::Graph;
use crate::security::{analyze_architecture, analyze_components, analyze_flows};
use crate::threat::{StrideAnalysis, StrideCategory, ThreatAnalysis, ThreatSummary};
use std::collections::HashSet;
use tracing::{debug, info};

/// Drop findings that repeat an earlier (category, affected components) pair.
///
/// The first finding for a key is kept even if a later one is more severe.
/// Running this on its own output changes nothing.
pub fn deduplicate(threats: Vec<ThreatAnalysis>) -> Vec<ThreatAnalysis> {
    let mut seen: HashSet<(StrideCategory, Vec<String>)> = HashSet::new();

    threats
        .into_iter()
        .filter(|threat| {
            let mut components = threat.affected_components.clone();
            components.sort();
            seen.insert((threat.category, components))
        })
        .collect()
}

pub fn summarize(threats: &[ThreatAnalysis]) -> ThreatSummary {
    let mut summary = ThreatSummary::zeroed();
    summary.total_threats = threats.len();

    for threat in threats {
        *summary.by_severity.entry(threat.severity).or_insert(0) += 1;
        *summary.by_category.entry(threat.category).or_insert(0) += 1;
    }

    summary
}

/// Runs the component, flow and architecture passes and merges their output.
#[derive(Debug, Clone, Default)]
pub struct StrideAnalyzer {
    config: AnalyzerConfig,
}

impl StrideAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, graph: &Graph) -> StrideAnalysis {
        let component = analyze_components(
            graph,
            &self.config.knowledge_base,
            self.config.low_confidence_threshold,
        );
        let flow = analyze_flows(graph);
        let architecture = analyze_architecture(graph, self.config.fan_in_threshold);

        debug!(
            "Raw findings: {} component, {} flow, {} architecture",
            component.len(),
            flow.len(),
            architecture.len()
        );

        let raw: Vec<ThreatAnalysis> = component
            .into_iter()
            .chain(flow)
            .chain(architecture)
            .collect();
        let raw_count = raw.len();

        let threats = deduplicate(raw);
        let summary = summarize(&threats);

        info!(
            "STRIDE analysis found {} threats ({} duplicates removed)",
            summary.total_threats,
            raw_count - threats.len()
        );

        StrideAnalysis { threats, summary }
    }
}
