// Containment between detected shapes

use crate::model::{BoundingBox, Node};
use tracing::debug;

/// True when at least `threshold` of the inner box's area lies inside `outer`.
pub fn is_contained(inner: &BoundingBox, outer: &BoundingBox, threshold: f64) -> bool {
    inner.overlap_ratio(outer) >= threshold
}

/// Attach every node to the smallest container that encloses it.
///
/// Containers are scanned smallest first, so a node inside nested zones lands
/// in the innermost one. A candidate is skipped when its own parent chain
/// already leads back to the node, which keeps the relation acyclic when two
/// similar boxes pass the test in both directions.
pub fn build_hierarchy(nodes: &mut [Node], threshold: f64) {
    let mut containers: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.kind.is_container())
        .map(|(idx, _)| idx)
        .collect();

    if containers.is_empty() {
        return;
    }

    containers.sort_by(|&a, &b| nodes[a].area.total_cmp(&nodes[b].area));

    let mut parents: Vec<Option<usize>> = vec![None; nodes.len()];

    for idx in 0..nodes.len() {
        let parent = containers.iter().copied().find(|&c| {
            c != idx
                && is_contained(&nodes[idx].bbox, &nodes[c].bbox, threshold)
                && !chain_reaches(&parents, c, idx)
        });
        parents[idx] = parent;
    }

    for (child, parent) in parents.into_iter().enumerate() {
        let Some(parent) = parent else {
            continue;
        };
        let parent_id = nodes[parent].id.clone();
        let child_id = nodes[child].id.clone();
        debug!("{} is contained in {}", child_id, parent_id);

        nodes[child].parent_id = Some(parent_id);
        nodes[parent].children.push(child_id);
    }
}

// Assignments are made one node at a time and never close a loop, so the walk ends.
fn chain_reaches(parents: &[Option<usize>], start: usize, target: usize) -> bool {
    let mut current = Some(start);
    while let Some(idx) = current {
        if idx == target {
            return true;
        }
        current = parents[idx];
    }
    false
}
