pub mod builder;
pub mod config;
pub mod edges;
pub mod error;
pub mod hierarchy;
pub mod knowledge;
pub mod model;
pub mod nodes;
pub mod report;
pub mod security;
pub mod stride;
pub mod threat;
pub mod topology;

use colored::Colorize;

pub use autostride_detection::{Detection, DetectionSet, Keypoint};
pub use builder::GraphBuilder;
pub use config::{AnalyzerConfig, AutoStrideConfig, BuilderConfig, ClassMap};
pub use error::ConfigError;
pub use knowledge::{KnowledgeBase, ThreatRule};
pub use model::{BoundingBox, ComponentKind, Edge, Graph, Node, Position};
pub use stride::StrideAnalyzer;
pub use threat::{Severity, StrideAnalysis, StrideCategory, ThreatAnalysis, ThreatSummary};

/// Build a component graph from detections.
pub fn build_graph(detections: &DetectionSet, config: &BuilderConfig) -> Graph {
    GraphBuilder::new(config.clone()).build(detections)
}

/// STRIDE analysis with the built-in knowledge base and default thresholds.
pub fn analyze(graph: &Graph) -> StrideAnalysis {
    StrideAnalyzer::default().analyze(graph)
}

pub fn print_banner() {
    let banner = r#"
    _         _        ____  _        _     _
   / \  _   _| |_ ___ / ___|| |_ _ __(_) __| | ___
  / _ \| | | | __/ _ \\___ \| __| '__| |/ _` |/ _ \
 / ___ \ |_| | || (_) |___) | |_| |  | | (_| |  __/
/_/   \_\__,_|\__\___/____/ \__|_|  |_|\__,_|\___|
"#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "    {} {}\n",
        "threat modeling from architecture diagrams".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
