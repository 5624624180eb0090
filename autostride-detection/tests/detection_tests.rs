// Tests for detection document loading

use autostride_detection::{Detection, DetectionError, DetectionSet, Keypoint};
use std::io::Write;
use tempfile::NamedTempFile;

// ============================================================================
// JSON Parsing Tests
// ============================================================================

#[test]
fn test_parse_object_document() {
    let json = r#"{
        "source": "diagram.png",
        "detections": [
            {"class_id": 7, "confidence": 0.91, "bbox": [10, 10, 50, 50]},
            {"class_id": 9, "confidence": 0.8, "bbox": [50, 20, 90, 30],
             "keypoints": [[50, 25, 0.9], [90, 25, 0.7]]}
        ]
    }"#;

    let set = DetectionSet::from_json_str(json).unwrap();

    assert_eq!(set.source.as_deref(), Some("diagram.png"));
    assert_eq!(set.len(), 2);
    assert_eq!(set.detections[0].class_id, 7);
    assert!(set.detections[0].keypoints.is_empty());
    assert_eq!(set.detections[1].keypoints[1], Keypoint::new(90.0, 25.0, 0.7));
}

#[test]
fn test_parse_bare_array_document() {
    let json = r#"[{"class_id": 2, "confidence": 0.5, "bbox": [0, 0, 10, 10]}]"#;

    let set = DetectionSet::from_json_str(json).unwrap();

    assert!(set.source.is_none());
    assert_eq!(set.len(), 1);
    assert_eq!(set.detections[0].bbox, [0.0, 0.0, 10.0, 10.0]);
}

#[test]
fn test_parse_empty_document() {
    let set = DetectionSet::from_json_str(r#"{"detections": []}"#).unwrap();
    assert!(set.is_empty());
}

#[test]
fn test_parse_negative_class_id_is_accepted() {
    let json = r#"[{"class_id": -1, "confidence": 0.9, "bbox": [0, 0, 10, 10]}]"#;
    let set = DetectionSet::from_json_str(json).unwrap();
    assert_eq!(set.detections[0].class_id, -1);
}

#[test]
fn test_parse_malformed_json() {
    let result = DetectionSet::from_json_str("{not json");
    assert!(matches!(result, Err(DetectionError::Json(_))));
}

#[test]
fn test_parse_skips_malformed_detection() {
    let json = r#"{"detections": [
        {"class_id": 7, "confidence": 0.9, "bbox": [10, 10, 50, 50]},
        {"class_id": 9, "confidence": 0.8, "bbox": [50, 20, 90, 30],
         "keypoints": [[1, 2], [3, 4, 0.9]]},
        {"class_id": 2, "bbox": [0, 0, 5, 5]}
    ]}"#;

    let set = DetectionSet::from_json_str(json).unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(set.detections[0].class_id, 7);
}

#[test]
fn test_parse_rejects_wrong_document_shape() {
    assert!(matches!(
        DetectionSet::from_json_str("42"),
        Err(DetectionError::Shape(_))
    ));
    assert!(matches!(
        DetectionSet::from_json_str(r#"{"source": "a.png"}"#),
        Err(DetectionError::Shape(_))
    ));

    let err = DetectionSet::from_json_str(r#"{"detections": {"class_id": 1}}"#).unwrap_err();
    assert!(err.to_string().contains("`detections` must be an array"));
}

#[test]
fn test_with_source() {
    let set = DetectionSet::new(vec![Detection::new(0, 0.9, [0.0, 0.0, 1.0, 1.0])])
        .with_source("whiteboard.jpg");

    assert_eq!(set.source.as_deref(), Some("whiteboard.jpg"));
    assert_eq!(set.iter().count(), 1);
}

#[test]
fn test_keypoint_serializes_as_triple() {
    let detection = Detection::new(9, 0.9, [0.0, 0.0, 1.0, 1.0])
        .with_keypoints(vec![Keypoint::new(1.0, 2.0, 0.5)]);

    let json = serde_json::to_value(&detection).unwrap();

    assert_eq!(json["keypoints"], serde_json::json!([[1.0, 2.0, 0.5]]));
}

// ============================================================================
// File Loading Tests
// ============================================================================

#[test]
fn test_from_path_uses_file_stem_as_source() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = tempfile::Builder::new()
        .prefix("checkout-flow")
        .suffix(".json")
        .tempfile()?;
    writeln!(
        temp_file,
        r#"[{{"class_id": 8, "confidence": 0.7, "bbox": [0, 0, 20, 20]}}]"#
    )?;

    let set = DetectionSet::from_path(temp_file.path())?;

    let source = set.source.unwrap();
    assert!(source.starts_with("checkout-flow"));
    assert!(!source.ends_with(".json"));
    Ok(())
}

#[test]
fn test_from_path_keeps_embedded_source() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(
        temp_file,
        r#"{{"source": "arch.png", "detections": []}}"#
    )?;

    let set = DetectionSet::from_path(temp_file.path())?;

    assert_eq!(set.source.as_deref(), Some("arch.png"));
    Ok(())
}

#[test]
fn test_from_path_missing_file() {
    let result = DetectionSet::from_path(std::path::Path::new("/nonexistent/detections.json"));
    assert!(matches!(result, Err(DetectionError::Io { .. })));
}
