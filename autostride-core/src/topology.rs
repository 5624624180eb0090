// petgraph views over a component graph

use crate::model::Graph;
use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Directed flow graph keyed by node id. Edges naming unknown nodes are left out.
pub struct FlowTopology<'g> {
    graph: DiGraph<&'g str, &'g str>,
    index: HashMap<&'g str, NodeIndex>,
}

impl<'g> FlowTopology<'g> {
    pub fn from_graph(graph: &'g Graph) -> Self {
        let mut flow = DiGraph::new();
        let mut index = HashMap::new();

        for node in &graph.nodes {
            index.insert(node.id.as_str(), flow.add_node(node.id.as_str()));
        }

        for edge in &graph.edges {
            if let (Some(&source), Some(&target)) =
                (index.get(edge.source.as_str()), index.get(edge.target.as_str()))
            {
                flow.add_edge(source, target, edge.id.as_str());
            }
        }

        Self { graph: flow, index }
    }

    /// Number of incoming flows; parallel edges each count.
    pub fn in_degree(&self, node_id: &str) -> usize {
        self.degree(node_id, Direction::Incoming)
    }

    pub fn out_degree(&self, node_id: &str) -> usize {
        self.degree(node_id, Direction::Outgoing)
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn degree(&self, node_id: &str, direction: Direction) -> usize {
        self.index
            .get(node_id)
            .map(|&idx| self.graph.edges_directed(idx, direction).count())
            .unwrap_or(0)
    }
}

/// Checks the containment invariants: every parent exists, is a container,
/// is not the node itself, lists the node among its children, and following
/// parents always terminates.
pub fn containment_is_forest(graph: &Graph) -> bool {
    let mut tree: DiGraph<&str, ()> = DiGraph::new();
    let mut index = HashMap::new();

    for node in &graph.nodes {
        index.insert(node.id.as_str(), tree.add_node(node.id.as_str()));
    }

    for node in &graph.nodes {
        let Some(parent_id) = node.parent_id.as_deref() else {
            continue;
        };

        if parent_id == node.id {
            return false;
        }

        let Some(parent) = graph.node(parent_id) else {
            return false;
        };

        if !parent.kind.is_container() || !parent.children.contains(&node.id) {
            return false;
        }

        tree.add_edge(index[node.id.as_str()], index[parent_id], ());
    }

    !is_cyclic_directed(&tree)
}
