use crate::config::BuilderConfig;
use crate::edges::resolve_edges;
use crate::hierarchy::build_hierarchy;
use crate::model::Graph;
use crate::nodes::extract_nodes;
use crate::topology::containment_is_forest;
use autostride_detection::DetectionSet;
use tracing::{info, warn};

/// Builds a hierarchical component graph from one diagram's detections.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: BuilderConfig,
}

impl GraphBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// Extract nodes, settle containment, then resolve arrows. Malformed
    /// detections are dropped rather than reported.
    pub fn build(&self, detections: &DetectionSet) -> Graph {
        let mut nodes = extract_nodes(detections, &self.config);

        // Edges read parent assignments, so containment must be final first
        build_hierarchy(&mut nodes, self.config.containment_threshold);

        let edges = resolve_edges(detections, &nodes, &self.config);
        let graph = Graph::new(nodes, edges);

        if !containment_is_forest(&graph) {
            warn!("Containment hierarchy is not a forest");
        }

        info!(
            "Built graph with {} nodes and {} edges from {} detections",
            graph.nodes.len(),
            graph.edges.len(),
            detections.len()
        );

        graph
    }
}
