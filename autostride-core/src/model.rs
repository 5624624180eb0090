// Component graph reconstructed from a diagram

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Boundary,
    Cache,
    Database,
    ExternalService,
    LoadBalancer,
    Monitoring,
    Security,
    Service,
    User,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 9] = [
        ComponentKind::Boundary,
        ComponentKind::Cache,
        ComponentKind::Database,
        ComponentKind::ExternalService,
        ComponentKind::LoadBalancer,
        ComponentKind::Monitoring,
        ComponentKind::Security,
        ComponentKind::Service,
        ComponentKind::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Boundary => "boundary",
            ComponentKind::Cache => "cache",
            ComponentKind::Database => "database",
            ComponentKind::ExternalService => "external_service",
            ComponentKind::LoadBalancer => "load_balancer",
            ComponentKind::Monitoring => "monitoring",
            ComponentKind::Security => "security",
            ComponentKind::Service => "service",
            ComponentKind::User => "user",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ComponentKind::Boundary => "Boundary",
            ComponentKind::Cache => "Cache",
            ComponentKind::Database => "Database",
            ComponentKind::ExternalService => "External Service",
            ComponentKind::LoadBalancer => "Load Balancer",
            ComponentKind::Monitoring => "Monitoring",
            ComponentKind::Security => "Security",
            ComponentKind::Service => "Service",
            ComponentKind::User => "User",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        ComponentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
    }

    /// Trust zones and groupings that may own child components.
    pub fn is_container(&self) -> bool {
        matches!(self, ComponentKind::Boundary)
    }

    /// Kinds whose traffic originates outside the system.
    pub fn is_public_origin(&self) -> bool {
        matches!(self, ComponentKind::User | ComponentKind::ExternalService)
    }

    /// Kinds that mediate ingress traffic.
    pub fn is_gated(&self) -> bool {
        matches!(self, ComponentKind::LoadBalancer | ComponentKind::Security)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle, serialized as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl From<[f64; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f64; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Non-finite coordinates or a non-positive extent on either axis.
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite());
        !finite || self.width() <= 0.0 || self.height() <= 0.0
    }

    pub fn intersection_area(&self, other: &BoundingBox) -> f64 {
        let w = self.x2.min(other.x2) - self.x1.max(other.x1);
        let h = self.y2.min(other.y2) - self.y1.max(other.y1);
        if w <= 0.0 || h <= 0.0 { 0.0 } else { w * h }
    }

    /// Intersection over inner area: how much of `self` lies inside `outer`.
    pub fn overlap_ratio(&self, outer: &BoundingBox) -> f64 {
        let inner_area = self.area();
        if inner_area <= 0.0 {
            return 0.0;
        }
        self.intersection_area(outer) / inner_area
    }

    pub fn padded(&self, margin: f64) -> BoundingBox {
        BoundingBox::new(
            self.x1 - margin,
            self.y1 - margin,
            self.x2 + margin,
            self.y2 + margin,
        )
    }

    pub fn contains_point(&self, point: &Position) -> bool {
        self.x1 <= point.x && point.x <= self.x2 && self.y1 <= point.y && point.y <= self.y2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub position: Position,
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub width: f64,
    pub height: f64,
    pub area: f64,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
}

impl Node {
    /// Derives center and extent from the box. The node starts without a
    /// parent or children.
    pub fn new(id: impl Into<String>, kind: ComponentKind, confidence: f64, bbox: BoundingBox) -> Self {
        Self {
            id: id.into(),
            kind,
            position: bbox.center(),
            confidence,
            bbox,
            width: bbox.width(),
            height: bbox.height(),
            area: bbox.area(),
            parent_id: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// `[[start_x, start_y], [end_x, end_y]]`
    pub keypoints: [[f64; 2]; 2],
    cross_boundary: bool,
}

impl Edge {
    /// Connects two resolved nodes. The boundary-crossing flag follows from
    /// their parent assignments.
    pub fn new(id: impl Into<String>, source: &Node, target: &Node, start: Position, end: Position) -> Self {
        Self {
            id: id.into(),
            source: source.id.clone(),
            target: target.id.clone(),
            keypoints: [[start.x, start.y], [end.x, end.y]],
            cross_boundary: source.parent_id != target.parent_id,
        }
    }

    pub fn cross_boundary(&self) -> bool {
        self.cross_boundary
    }

    pub fn start(&self) -> Position {
        Position::new(self.keypoints[0][0], self.keypoints[0][1])
    }

    pub fn end(&self) -> Position {
        Position::new(self.keypoints[1][0], self.keypoints[1][1])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn nodes_of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn has_kind(&self, kind: ComponentKind) -> bool {
        self.nodes.iter().any(|n| n.kind == kind)
    }

    pub fn count_kind(&self, kind: ComponentKind) -> usize {
        self.nodes_of_kind(kind).count()
    }
}
