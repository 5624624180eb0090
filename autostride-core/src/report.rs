// Report generation from an analysis run

use crate::model::Graph;
use crate::threat::{Severity, StrideAnalysis, StrideCategory, ThreatAnalysis};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";
const THIN_RULE: &str = "────────────────────────────────────────────────────────────────────────────────\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Markdown => "md",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub run_id: String,
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub processing_time_ms: f64,
    pub total_detections: usize,
    pub confidence_threshold: f64,
}

impl ReportMetadata {
    pub fn new(
        source: Option<String>,
        processing_time_ms: f64,
        total_detections: usize,
        confidence_threshold: f64,
    ) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            source,
            processing_time_ms,
            total_detections,
            confidence_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphOverview {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub cross_boundary_edges: usize,
    pub top_level_nodes: usize,
}

impl GraphOverview {
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            total_nodes: graph.nodes.len(),
            total_edges: graph.edges.len(),
            cross_boundary_edges: graph.edges.iter().filter(|e| e.cross_boundary()).count(),
            top_level_nodes: graph.nodes.iter().filter(|n| n.parent_id.is_none()).count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub metadata: ReportMetadata,
    pub overview: GraphOverview,
    pub analysis: StrideAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<Graph>,
}

impl ReportData {
    pub fn new(metadata: ReportMetadata, graph: &Graph, analysis: StrideAnalysis, include_graph: bool) -> Self {
        Self {
            metadata,
            overview: GraphOverview::from_graph(graph),
            analysis,
            graph: include_graph.then(|| graph.clone()),
        }
    }

    /// Most severe first; equal severities keep generation order.
    pub fn sorted_threats(&self) -> Vec<&ThreatAnalysis> {
        let mut threats: Vec<&ThreatAnalysis> = self.analysis.threats.iter().collect();
        threats.sort_by(|a, b| b.severity.cmp(&a.severity));
        threats
    }

    fn source_name(&self) -> &str {
        self.metadata.source.as_deref().unwrap_or("(unnamed)")
    }
}

pub fn generate_report(data: &ReportData, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(data)),
        ReportFormat::Json => generate_json_report(data),
        ReportFormat::Csv => Ok(generate_csv_report(data)),
        ReportFormat::Markdown => Ok(generate_markdown_report(data)),
    }
}

pub fn generate_text_report(data: &ReportData) -> String {
    let mut report = String::new();
    let summary = &data.analysis.summary;

    report.push_str(RULE);
    report.push_str("                       AUTOSTRIDE THREAT MODEL REPORT\n");
    report.push_str(RULE);
    report.push('\n');

    report.push_str(&format!("Run ID:       {}\n", data.metadata.run_id));
    report.push_str(&format!("Source:       {}\n", data.source_name()));
    report.push_str(&format!("Generated:    {}\n", data.metadata.generated_at));
    report.push_str(&format!("Detections:   {}\n", data.metadata.total_detections));
    report.push_str(&format!("Components:   {}\n", data.overview.total_nodes));
    report.push_str(&format!(
        "Data Flows:   {} ({} crossing a trust boundary)\n",
        data.overview.total_edges, data.overview.cross_boundary_edges
    ));
    report.push_str(&format!(
        "Processing:   {:.2} ms (confidence >= {:.2})\n",
        data.metadata.processing_time_ms, data.metadata.confidence_threshold
    ));
    report.push('\n');

    if let Some(ref graph) = data.graph {
        report.push_str(RULE);
        report.push_str("COMPONENTS\n");
        report.push_str(RULE);
        report.push('\n');
        report.push_str(&generate_component_tree(graph));
        report.push('\n');
    }

    report.push_str(RULE);
    report.push_str("EXECUTIVE SUMMARY\n");
    report.push_str(RULE);
    report.push('\n');

    report.push_str(&format!("Total Threats: {}\n\n", summary.total_threats));

    for severity in Severity::ALL.iter().rev() {
        let count = summary.severity_count(*severity);
        if count > 0 {
            report.push_str(&format!(
                "  {:<11}{}  ({})\n",
                format!("[{}]", severity.as_str().to_uppercase()),
                count,
                severity_hint(*severity)
            ));
        }
    }
    report.push('\n');

    report.push_str("By STRIDE category:\n");
    for category in StrideCategory::ALL {
        report.push_str(&format!(
            "  {:<24}{}\n",
            category.to_string(),
            summary.category_count(category)
        ));
    }
    report.push('\n');

    let threats = data.sorted_threats();
    if !threats.is_empty() {
        report.push_str(RULE);
        report.push_str("DETAILED THREATS\n");
        report.push_str(RULE);
        report.push('\n');

        for (idx, threat) in threats.iter().enumerate() {
            report.push_str(&format!("[{}] {}\n", idx + 1, threat.category));
            report.push_str(&format!("Severity:     {}\n", threat.severity.as_str().to_uppercase()));
            report.push_str(&format!("Components:   {}\n", format_components(threat)));

            report.push_str("\nDescription:\n");
            report.push_str(&wrap_text(&threat.description, 80, "  "));
            report.push('\n');

            report.push_str("Recommendation:\n");
            report.push_str(&wrap_text(&threat.recommendation, 80, "  "));
            report.push('\n');

            report.push_str(THIN_RULE);
            report.push('\n');
        }
    }

    report.push_str(RULE);
    report.push_str("                          End of Report\n");
    report.push_str(RULE);
    report.push_str("\nGenerated by AutoStride - architecture diagram threat modeling\n");
    report.push_str("Findings are inferred from diagram structure; validate them against the real system.\n\n");

    report
}

pub fn generate_json_report(data: &ReportData) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "AutoStride",
                "version": env!("CARGO_PKG_VERSION"),
                "run_id": data.metadata.run_id,
                "generated_at": data.metadata.generated_at,
                "source": data.metadata.source,
                "processing_time_ms": data.metadata.processing_time_ms,
                "total_detections": data.metadata.total_detections,
                "confidence_threshold": data.metadata.confidence_threshold,
                "format": "json"
            },
            "overview": data.overview,
            "stride_analysis": {
                "threats": data.sorted_threats(),
                "summary": data.analysis.summary
            },
            "graph": data.graph
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_markdown_report(data: &ReportData) -> String {
    let mut report = String::new();
    let summary = &data.analysis.summary;

    report.push_str("# AutoStride Threat Model Report\n\n");
    report.push_str(&format!("- **Source:** {}\n", data.source_name()));
    report.push_str(&format!("- **Run ID:** `{}`\n", data.metadata.run_id));
    report.push_str(&format!("- **Generated:** {}\n", data.metadata.generated_at));
    report.push_str(&format!(
        "- **Components:** {} ({} flows, {} crossing a trust boundary)\n\n",
        data.overview.total_nodes, data.overview.total_edges, data.overview.cross_boundary_edges
    ));

    report.push_str("## Summary\n\n");
    report.push_str(&format!("Total threats: **{}**\n\n", summary.total_threats));
    report.push_str("| Severity | Count |\n|---|---|\n");
    for severity in Severity::ALL.iter().rev() {
        report.push_str(&format!("| {} | {} |\n", severity, summary.severity_count(*severity)));
    }
    report.push_str("\n| STRIDE category | Count |\n|---|---|\n");
    for category in StrideCategory::ALL {
        report.push_str(&format!("| {} | {} |\n", category, summary.category_count(category)));
    }
    report.push('\n');

    if let Some(ref graph) = data.graph {
        report.push_str("## Components\n\n```\n");
        report.push_str(&generate_component_tree(graph));
        report.push_str("```\n\n");
    }

    let threats = data.sorted_threats();
    if !threats.is_empty() {
        report.push_str("## Threats\n\n");
        for (idx, threat) in threats.iter().enumerate() {
            report.push_str(&format!(
                "### {}. {} ({})\n\n",
                idx + 1,
                threat.category,
                threat.severity
            ));
            report.push_str(&format!("**Components:** {}\n\n", format_components(threat)));
            report.push_str(&format!("{}\n\n", threat.description));
            report.push_str(&format!("> **Recommendation:** {}\n\n", threat.recommendation));
        }
    }

    report
}

pub fn generate_csv_report(data: &ReportData) -> String {
    let mut report = String::from("severity,category,affected_components,description,recommendation\n");

    for threat in data.sorted_threats() {
        let row = [
            threat.severity.to_string(),
            threat.category.to_string(),
            threat.affected_components.join(";"),
            threat.description.clone(),
            threat.recommendation.clone(),
        ];
        let escaped: Vec<String> = row.iter().map(|field| escape_csv(field)).collect();
        report.push_str(&escaped.join(","));
        report.push('\n');
    }

    report
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn severity_hint(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Immediate action required",
        Severity::High => "High priority",
        Severity::Medium => "Should be addressed",
        Severity::Low => "Minor or unconfirmed",
    }
}

fn format_components(threat: &ThreatAnalysis) -> String {
    if threat.is_architecture_wide() {
        "(architecture-wide)".to_string()
    } else {
        threat.affected_components.join(", ")
    }
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.len() + word.len() + 1 > width - indent.len() && !current_line.is_empty() {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
            current_line.clear();
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(indent);
        result.push_str(&current_line);
        result.push('\n');
    }

    result
}

/// Indented containment tree, top-level nodes first in graph order. Each node
/// is printed at most once, even when a loaded graph lists children in a loop.
fn generate_component_tree(graph: &Graph) -> String {
    if graph.nodes.is_empty() {
        return "  (empty)\n".to_string();
    }

    let mut result = String::new();
    let roots: Vec<&str> = graph
        .nodes
        .iter()
        .filter(|n| n.parent_id.is_none())
        .map(|n| n.id.as_str())
        .collect();

    let mut visited = HashSet::new();
    for (i, root) in roots.iter().enumerate() {
        push_tree_line(graph, root, "", i == roots.len() - 1, &mut visited, &mut result);
    }

    result
}

fn push_tree_line<'a>(
    graph: &'a Graph,
    node_id: &str,
    prefix: &str,
    is_last: bool,
    visited: &mut HashSet<&'a str>,
    out: &mut String,
) {
    let Some(node) = graph.node(node_id) else {
        return;
    };
    if !visited.insert(node.id.as_str()) {
        return;
    }

    let branch = if is_last { "└── " } else { "├── " };
    out.push_str(&format!(
        "{}{}{} [{}] ({:.2})\n",
        prefix,
        branch,
        node.id,
        node.kind,
        node.confidence
    ));

    let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
    for (i, child) in node.children.iter().enumerate() {
        push_tree_line(
            graph,
            child,
            &child_prefix,
            i == node.children.len() - 1,
            visited,
            out,
        );
    }
}
