// Component detections to typed nodes

use crate::config::BuilderConfig;
use crate::model::{BoundingBox, Node};
use autostride_detection::DetectionSet;
use tracing::debug;

/// Turn component detections into nodes, in detection order.
///
/// A detection is dropped when its confidence is below the floor, its class
/// is not a component class (arrows included), or its box is degenerate.
/// Ids are `node_{i}` with `i` the detection's index in the input set.
pub fn extract_nodes(detections: &DetectionSet, config: &BuilderConfig) -> Vec<Node> {
    let mut nodes = Vec::new();

    for (idx, detection) in detections.iter().enumerate() {
        // Written this way round so NaN scores are rejected too
        if !(detection.confidence >= config.min_confidence) {
            debug!(
                "Dropping detection {}: confidence {} below {}",
                idx, detection.confidence, config.min_confidence
            );
            continue;
        }

        let Some(kind) = config.classes.kind_for(detection.class_id) else {
            continue;
        };

        let bbox = BoundingBox::from(detection.bbox);
        if bbox.is_degenerate() {
            debug!("Dropping detection {}: degenerate bbox {:?}", idx, detection.bbox);
            continue;
        }

        nodes.push(Node::new(
            format!("node_{}", idx),
            kind,
            detection.confidence,
            bbox,
        ));
    }

    nodes
}
