// Arrow detections to directed edges

use crate::config::BuilderConfig;
use crate::model::{Edge, Node, Position};
use autostride_detection::DetectionSet;
use tracing::debug;

/// Find the node an arrow endpoint belongs to.
///
/// Nodes whose padded box holds the point are candidates; leaf components win
/// over containers and the smallest area wins among those. With no candidate
/// the nearest center strictly within `max_snap_distance` is used instead.
pub fn find_node_at<'a>(
    point: &Position,
    nodes: &'a [Node],
    padding: f64,
    max_snap_distance: f64,
) -> Option<&'a Node> {
    let candidates: Vec<&Node> = nodes
        .iter()
        .filter(|node| node.bbox.padded(padding).contains_point(point))
        .collect();

    if candidates.is_empty() {
        return find_nearest_node(point, nodes, max_snap_distance);
    }

    let has_leaf = candidates.iter().any(|node| !node.kind.is_container());

    candidates
        .into_iter()
        .filter(|node| !has_leaf || !node.kind.is_container())
        .min_by(|a, b| a.area.total_cmp(&b.area))
}

/// Nearest node by center distance, ignoring anything at or beyond `threshold`.
/// Leaf components win ties against containers.
pub fn find_nearest_node<'a>(point: &Position, nodes: &'a [Node], threshold: f64) -> Option<&'a Node> {
    nodes
        .iter()
        .map(|node| (node, node.position.distance_to(point)))
        .filter(|(_, distance)| *distance < threshold)
        .min_by(|(a, da), (b, db)| {
            da.total_cmp(db)
                .then_with(|| a.kind.is_container().cmp(&b.kind.is_container()))
        })
        .map(|(node, _)| node)
}

/// Resolve every arrow detection into an edge between two distinct nodes.
///
/// Arrows with fewer than two keypoints, a keypoint below the visibility
/// floor, an unresolved endpoint, or both ends on the same node are dropped.
/// `nodes` must already carry their final parent assignments.
pub fn resolve_edges(detections: &DetectionSet, nodes: &[Node], config: &BuilderConfig) -> Vec<Edge> {
    let mut edges = Vec::new();

    for (idx, detection) in detections.iter().enumerate() {
        if !config.classes.is_arrow(detection.class_id) {
            continue;
        }

        let (start, end) = match detection.keypoints.as_slice() {
            [start, end, ..] => (*start, *end),
            _ => {
                debug!("Dropping arrow {}: missing keypoints", idx);
                continue;
            }
        };

        let floor = config.keypoint_visibility_floor;
        if !(start.visibility >= floor && end.visibility >= floor) {
            debug!("Dropping arrow {}: endpoint visibility below {}", idx, floor);
            continue;
        }

        let start = Position::new(start.x, start.y);
        let end = Position::new(end.x, end.y);

        let source = find_node_at(&start, nodes, config.endpoint_padding, config.max_snap_distance);
        let target = find_node_at(&end, nodes, config.endpoint_padding, config.max_snap_distance);

        match (source, target) {
            (Some(source), Some(target)) if source.id != target.id => {
                let edge = Edge::new(format!("edge_{}", edges.len()), source, target, start, end);
                debug!(
                    "{}: {} -> {} (cross_boundary: {})",
                    edge.id,
                    edge.source,
                    edge.target,
                    edge.cross_boundary()
                );
                edges.push(edge);
            }
            (Some(_), Some(_)) => debug!("Dropping arrow {}: both ends on the same node", idx),
            _ => debug!("Dropping arrow {}: unresolved endpoint", idx),
        }
    }

    edges
}
