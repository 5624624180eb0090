// Configuration for graph building and threat analysis

use crate::error::{ConfigError, Result};
use crate::knowledge::KnowledgeBase;
use crate::model::ComponentKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_CONTAINMENT_THRESHOLD: f64 = 0.8;
pub const DEFAULT_KEYPOINT_VISIBILITY_FLOOR: f64 = 0.5;
pub const DEFAULT_ENDPOINT_PADDING: f64 = 15.0;
pub const DEFAULT_MAX_SNAP_DISTANCE: f64 = 100.0;
pub const DEFAULT_LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;
pub const DEFAULT_FAN_IN_THRESHOLD: usize = 3;
pub const DEFAULT_ARROW_CLASS: i64 = 9;

/// Maps detector class ids to component kinds, plus the one class id that
/// marks flow arrows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassMap {
    pub components: BTreeMap<i64, ComponentKind>,
    pub arrow_class: i64,
}

impl Default for ClassMap {
    fn default() -> Self {
        let components = ComponentKind::ALL
            .into_iter()
            .enumerate()
            .map(|(class_id, kind)| (class_id as i64, kind))
            .collect();

        Self {
            components,
            arrow_class: DEFAULT_ARROW_CLASS,
        }
    }
}

impl ClassMap {
    pub fn kind_for(&self, class_id: i64) -> Option<ComponentKind> {
        self.components.get(&class_id).copied()
    }

    pub fn is_arrow(&self, class_id: i64) -> bool {
        class_id == self.arrow_class
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Detections scoring below this are dropped. Equal scores are kept.
    pub min_confidence: f64,
    /// Minimum intersection-over-inner-area for a container to own a node.
    pub containment_threshold: f64,
    pub keypoint_visibility_floor: f64,
    /// Margin added around node boxes when attaching arrow endpoints.
    pub endpoint_padding: f64,
    /// Upper bound (exclusive) for the nearest-center fallback.
    pub max_snap_distance: f64,
    pub classes: ClassMap,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            containment_threshold: DEFAULT_CONTAINMENT_THRESHOLD,
            keypoint_visibility_floor: DEFAULT_KEYPOINT_VISIBILITY_FLOOR,
            endpoint_padding: DEFAULT_ENDPOINT_PADDING,
            max_snap_distance: DEFAULT_MAX_SNAP_DISTANCE,
            classes: ClassMap::default(),
        }
    }
}

impl BuilderConfig {
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_unit_interval("builder.min_confidence", self.min_confidence)?;
        check_unit_interval("builder.keypoint_visibility_floor", self.keypoint_visibility_floor)?;

        if !(self.containment_threshold > 0.0 && self.containment_threshold <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "builder.containment_threshold",
                message: format!("{} is outside (0, 1]", self.containment_threshold),
            });
        }

        check_non_negative("builder.endpoint_padding", self.endpoint_padding)?;
        check_non_negative("builder.max_snap_distance", self.max_snap_distance)?;

        if self.classes.components.contains_key(&self.classes.arrow_class) {
            return Err(ConfigError::Invalid {
                field: "builder.classes.arrow_class",
                message: format!(
                    "class {} is also mapped to a component kind",
                    self.classes.arrow_class
                ),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Component findings for nodes detected below this confidence are
    /// reported as Low.
    pub low_confidence_threshold: f64,
    /// Service or database nodes with more incoming flows than this are hotspots.
    pub fan_in_threshold: usize,
    pub knowledge_base: KnowledgeBase,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
            fan_in_threshold: DEFAULT_FAN_IN_THRESHOLD,
            knowledge_base: KnowledgeBase::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("analyzer.low_confidence_threshold", self.low_confidence_threshold)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoStrideConfig {
    pub builder: BuilderConfig,
    pub analyzer: AnalyzerConfig,
}

impl AutoStrideConfig {
    /// Parse a (possibly partial) JSON configuration. Missing fields keep
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AutoStrideConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loading configuration from {}", path.display());
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.builder.validate()?;
        self.analyzer.validate()
    }
}

fn check_unit_interval(field: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            message: format!("{} is outside [0, 1]", value),
        })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            message: format!("{} must be a finite, non-negative number", value),
        })
    }
}
