use autostride::handlers::*;
use autostride_core::report::ReportFormat;
use autostride_core::{ComponentKind, KnowledgeBase, StrideCategory};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

const DIAGRAM: &str = r#"{
    "source": "shop.png",
    "detections": [
        {"class_id": 0, "confidence": 0.95, "bbox": [0, 0, 300, 300]},
        {"class_id": 7, "confidence": 0.9, "bbox": [50, 50, 120, 120]},
        {"class_id": 2, "confidence": 0.9, "bbox": [180, 50, 250, 120]},
        {"class_id": 8, "confidence": 0.4, "bbox": [400, 50, 440, 90]},
        {"class_id": 9, "confidence": 0.8, "bbox": [120, 70, 180, 100],
         "keypoints": [[110, 85, 0.9], [190, 85, 0.9]]}
    ]
}"#;

fn write_diagram(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_config_defaults_without_path() {
    let config = load_config(None).unwrap();
    assert_eq!(config, autostride_core::AutoStrideConfig::default());
}

#[test]
fn test_load_config_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, r#"{{"analyzer": {{"fan_in_threshold": 7}}}}"#)?;

    let path = temp_file.path().to_string_lossy().into_owned();
    let config = load_config(Some(path.as_str()))?;

    assert_eq!(config.analyzer.fan_in_threshold, 7);
    Ok(())
}

#[test]
fn test_load_config_missing_file() {
    let err = load_config(Some("/nonexistent/autostride.json")).unwrap_err();
    assert!(format!("{:#}", err).contains("/nonexistent/autostride.json"));
}

#[test]
fn test_apply_overrides() {
    let config = load_config(None).unwrap();

    let overridden = apply_overrides(config.clone(), Some(0.3)).unwrap();
    assert_eq!(overridden.builder.min_confidence, 0.3);

    let unchanged = apply_overrides(config.clone(), None).unwrap();
    assert_eq!(unchanged, config);

    assert!(apply_overrides(config, Some(2.0)).is_err());
}

#[test]
fn test_analyze_file() {
    let dir = TempDir::new().unwrap();
    let path = write_diagram(&dir, "shop.json", DIAGRAM);
    let config = load_config(None).unwrap();

    let data = analyze_file(&path, &config, true).unwrap();

    assert_eq!(data.metadata.source.as_deref(), Some("shop.png"));
    assert_eq!(data.metadata.total_detections, 5);
    // The user falls below the default confidence floor
    assert_eq!(data.overview.total_nodes, 3);
    assert_eq!(data.overview.total_edges, 1);
    assert_eq!(data.overview.top_level_nodes, 1);

    let graph = data.graph.as_ref().unwrap();
    assert_eq!(graph.edges[0].source, "node_1");
    assert_eq!(graph.edges[0].target, "node_2");
    assert!(data.analysis.threats.iter().any(|t| t.category == StrideCategory::Tampering
        && t.affected_components == ["node_1", "node_2"]));
}

#[test]
fn test_analyze_file_respects_conf_threshold() {
    let dir = TempDir::new().unwrap();
    let path = write_diagram(&dir, "shop.json", DIAGRAM);
    let config = apply_overrides(load_config(None).unwrap(), Some(0.3)).unwrap();

    let data = analyze_file(&path, &config, false).unwrap();

    assert_eq!(data.overview.total_nodes, 4);
    assert_eq!(data.metadata.confidence_threshold, 0.3);
    assert!(data.graph.is_none());
}

#[test]
fn test_analyze_file_uses_stem_without_source() {
    let dir = TempDir::new().unwrap();
    let path = write_diagram(&dir, "empty_diagram.json", "[]");
    let config = load_config(None).unwrap();

    let data = analyze_file(&path, &config, false).unwrap();

    assert_eq!(data.metadata.source.as_deref(), Some("empty_diagram"));
    assert_eq!(data.analysis.summary.total_threats, 0);
}

#[test]
fn test_analyze_file_malformed() {
    let dir = TempDir::new().unwrap();
    let path = write_diagram(&dir, "broken.json", "{not json");
    let config = load_config(None).unwrap();

    let err = analyze_file(&path, &config, false).unwrap_err();

    assert!(format!("{:#}", err).contains("broken.json"));
}

#[test]
fn test_output_path_single_input() {
    let path = output_path_for(
        Path::new("out/report.md"),
        Path::new("diagrams/a.json"),
        ReportFormat::Markdown,
        false,
    );
    assert_eq!(path, PathBuf::from("out/report.md"));
}

#[test]
fn test_output_path_batch() {
    let path = output_path_for(
        Path::new("out/report.md"),
        Path::new("diagrams/a.json"),
        ReportFormat::Markdown,
        true,
    );
    assert_eq!(path, PathBuf::from("out/report_a.md"));
}

#[test]
fn test_output_path_batch_uses_format_extension() {
    let path = output_path_for(
        Path::new("out/report"),
        Path::new("b.json"),
        ReportFormat::Csv,
        true,
    );
    assert_eq!(path, PathBuf::from("out/report_b.csv"));
}

#[test]
fn test_render_classes() {
    let config = load_config(None).unwrap();

    let table = render_classes(&config.builder.classes);

    assert!(table.contains("0       boundary"));
    assert!(table.contains("8       user"));
    assert!(table.contains("9       (flow arrow)"));
}

#[test]
fn test_render_rules_filtered() {
    let kb = KnowledgeBase::builtin();

    let all = render_rules(&kb, None);
    let cache_only = render_rules(&kb, Some(ComponentKind::Cache));

    assert!(all.contains("Database"));
    assert!(cache_only.contains("Cache"));
    assert!(!cache_only.contains("Database"));
}

#[test]
fn test_render_rules_empty() {
    assert_eq!(render_rules(&KnowledgeBase::empty(), None), "No rules defined\n");
}
