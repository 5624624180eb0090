use crate::error::{DetectionError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// A detected point with its visibility score. Serialized as `[x, y, visibility]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    pub visibility: f64,
}

impl Keypoint {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }
}

impl From<[f64; 3]> for Keypoint {
    fn from([x, y, visibility]: [f64; 3]) -> Self {
        Self { x, y, visibility }
    }
}

impl From<Keypoint> for [f64; 3] {
    fn from(kp: Keypoint) -> Self {
        [kp.x, kp.y, kp.visibility]
    }
}

/// One raw detector output: a class, a score, a box and (for arrows) endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: i64,
    pub confidence: f64,
    /// `[x1, y1, x2, y2]`
    pub bbox: [f64; 4],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keypoints: Vec<Keypoint>,
}

impl Detection {
    pub fn new(class_id: i64, confidence: f64, bbox: [f64; 4]) -> Self {
        Self {
            class_id,
            confidence,
            bbox,
            keypoints: Vec::new(),
        }
    }

    pub fn with_keypoints(mut self, keypoints: Vec<Keypoint>) -> Self {
        self.keypoints = keypoints;
        self
    }
}

/// Ordered detections for a single diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub detections: Vec<Detection>,
}

impl DetectionSet {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            source: None,
            detections,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }

    /// Parse either `{"source": ..., "detections": [...]}` or a bare array.
    /// A detection that does not decode is logged and skipped.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let (source, items) = match serde_json::from_str::<Value>(json)? {
            Value::Array(items) => (None, items),
            Value::Object(mut document) => {
                let source = match document.remove("source") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(source)) => Some(source),
                    Some(_) => return Err(DetectionError::Shape("`source` must be a string")),
                };
                let items = match document.remove("detections") {
                    Some(Value::Array(items)) => items,
                    Some(_) => return Err(DetectionError::Shape("`detections` must be an array")),
                    None => return Err(DetectionError::Shape("missing `detections` array")),
                };
                (source, items)
            }
            _ => return Err(DetectionError::Shape("expected an object or an array")),
        };

        let total = items.len();
        let mut detections = Vec::with_capacity(total);
        for (idx, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<Detection>(item) {
                Ok(detection) => detections.push(detection),
                Err(e) => warn!("Skipping detection {}: {}", idx, e),
            }
        }

        let mut set = DetectionSet::new(detections);
        if let Some(source) = source {
            set = set.with_source(source);
        }
        debug!("Parsed {} of {} detections", set.len(), total);
        Ok(set)
    }

    /// Load a detection document from disk. The file stem becomes the source
    /// name when the document does not carry one.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| DetectionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let set = Self::from_json_str(&content)?;
        if set.source.is_some() {
            return Ok(set);
        }
        match path.file_stem() {
            Some(stem) => Ok(set.with_source(stem.to_string_lossy())),
            None => Ok(set),
        }
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}
