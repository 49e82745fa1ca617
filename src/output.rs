//! Output types for the presentation layer.
//!
//! These structs are serialized to JSON and handed to whatever draws the
//! diagram. All coordinates are in the frame's logical canvas space.

use serde::Serialize;

use crate::layout::{DiagramFrame, PointF, RelationLink};
use crate::matrix::AxisId;

/// One zone wedge with everything needed to draw it.
#[derive(Debug, Clone, Serialize)]
pub struct SectorOutput {
    pub zone: String,
    pub color: String,
    pub start: f64,
    pub end: f64,
    pub center: f64,
    pub span: f64,
    /// SVG path of the whole wedge between the center circle and outer circle.
    pub path: String,
    /// SVG paths of the wedge clipped to each rank band, innermost first.
    pub band_paths: Vec<String>,
    /// Divider line along the wedge's leading edge, or along the seam of a
    /// full-circle wedge.
    pub divider: (PointF, PointF),
    pub label: String,
    pub label_pos: PointF,
}

/// One rank ring.
#[derive(Debug, Clone, Serialize)]
pub struct RingOutput {
    pub rank: u32,
    /// Radius bubbles of this rank are placed on.
    pub radius: f64,
    pub inner: f64,
    pub outer: f64,
    /// Where the rank numeral goes (on the ring, straight up).
    pub numeral_pos: PointF,
}

/// A draggable space bubble.
#[derive(Debug, Clone, Serialize)]
pub struct BubbleOutput {
    pub id: AxisId,
    pub name: String,
    /// Short upper-case text drawn inside the bubble.
    pub label: String,
    /// Rank badge, e.g. "R2".
    pub badge: String,
    pub zone: String,
    pub color: String,
    pub rank: u32,
    pub sum: i64,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    /// Whether the position came from a saved offset.
    pub pinned: bool,
}

/// Names sharing one rank, for the side list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankGroup {
    pub rank: u32,
    pub names: Vec<String>,
}

/// The whole diagram.
#[derive(Debug, Clone, Serialize)]
pub struct DiagramScene {
    pub frame: DiagramFrame,
    pub bubble_radius: f64,
    pub sectors: Vec<SectorOutput>,
    pub rings: Vec<RingOutput>,
    pub bubbles: Vec<BubbleOutput>,
    pub links: Vec<RelationLink>,
    pub ranking: Vec<RankGroup>,
}

/// Boundary error information.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub message: String,
}

/// The combined output sent across the JSON boundary.
#[derive(Debug, Clone, Serialize)]
pub struct DiagramOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<DiagramScene>,
    /// True when there are fewer than 2 spaces and nothing should be drawn.
    pub not_enough_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl DiagramOutput {
    pub fn ready(scene: DiagramScene) -> Self {
        Self { scene: Some(scene), not_enough_data: false, error: None }
    }

    pub fn not_enough_data() -> Self {
        Self { scene: None, not_enough_data: true, error: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            scene: None,
            not_enough_data: false,
            error: Some(ErrorInfo { message: message.into() }),
        }
    }
}
