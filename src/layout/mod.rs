// Radial adjacency diagram layout.
//
// Pipeline:
//   relation store -> ranking -> sector partition -> radial placement -> scene
//
// Goals:
// - Pure: every stage is a function of its inputs, no ambient state
// - Deterministic: same matrix + offsets always give the same scene
// - One implementation shared by every caller (diagram, matrix view, export)
//
// Submodules:
// - ranking: per-axis sums and dense ranks
// - sectors: zone wedges and angle clamping
// - radial_placement: ring radii, canvas frame, bubble positions
// - adjacency: relation lines between placed bubbles

use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::matrix::{order_axes, AxisId, Matrix, RelationStore, ZonePalette};
use crate::output::{BubbleOutput, DiagramScene, RankGroup, RingOutput, SectorOutput};

mod adjacency;
mod radial_placement;
mod ranking;
mod sectors;

pub use adjacency::{relation_links, RelationLink};
pub use radial_placement::{
    offsets_from_positions, place_spaces, positions_from_offsets, DiagramFrame, OffsetMap,
    Placement, PointF,
};
pub use ranking::{compute_spaces, max_rank, rank_axes, rank_summary, Ranking, Space};
pub use sectors::{partition_sectors, Sector, START_ANGLE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    /// Radius of the empty center circle.
    pub center_radius: f64,
    /// Radius of each space bubble.
    pub bubble_radius: f64,
    /// Distance from the outer circle to the zone labels.
    pub label_pad: f64,
    /// Extra room around the labels before the canvas edge.
    pub canvas_padding: f64,
    /// Minimum width of one rank band.
    pub ring_spacing: f64,
    /// Outer circle radius is never smaller than this.
    pub min_outer_radius: f64,
    /// Share of a wedge used to fan out spaces sharing zone and rank.
    pub spread_fraction: f64,
    /// Angular gap (radians) kept between a bubble and its wedge boundaries.
    pub drag_margin: f64,
    /// Characters of the space name shown inside a bubble.
    pub label_chars: usize,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            center_radius: 26.0,
            bubble_radius: 26.0,
            label_pad: 36.0,
            canvas_padding: 30.0,
            ring_spacing: 64.0,
            min_outer_radius: 180.0,
            spread_fraction: 0.7,
            drag_margin: 0.04,
            label_chars: 7,
        }
    }
}

impl DiagramConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("center_radius", self.center_radius),
            ("bubble_radius", self.bubble_radius),
            ("ring_spacing", self.ring_spacing),
            ("min_outer_radius", self.min_outer_radius),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if !(self.label_pad >= 0.0) {
            return Err(ConfigError::NonPositive { field: "label_pad", value: self.label_pad });
        }
        if !(self.canvas_padding >= 0.0) {
            return Err(ConfigError::NonPositive { field: "canvas_padding", value: self.canvas_padding });
        }
        if !(self.drag_margin > 0.0 && self.drag_margin < PI / 4.0) {
            return Err(ConfigError::DragMargin(self.drag_margin));
        }
        if !(self.spread_fraction > 0.0 && self.spread_fraction <= 1.0) {
            return Err(ConfigError::SpreadFraction(self.spread_fraction));
        }
        Ok(())
    }
}

/// Ranked spaces, their wedges and the canvas frame for one matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramModel {
    pub spaces: Vec<Space>,
    pub sectors: Vec<Sector>,
    pub frame: DiagramFrame,
}

impl DiagramModel {
    /// Rank and partition `matrix`. Returns None when there are fewer than 2
    /// axes: the diagram is not meaningful yet.
    pub fn build(matrix: &Matrix, palette: &ZonePalette, cfg: &DiagramConfig) -> Option<Self> {
        if matrix.axes.len() < 2 {
            tracing::debug!(axes = matrix.axes.len(), "not enough axes for a diagram");
            return None;
        }
        let axes = order_axes(&matrix.axes, palette);
        let spaces = compute_spaces(&axes, &matrix.relations, palette);
        let sectors = partition_sectors(&spaces, palette);
        let frame = DiagramFrame::for_spaces(&spaces, cfg);
        Some(Self { spaces, sectors, frame })
    }

    pub fn space(&self, id: AxisId) -> Option<&Space> {
        self.spaces.iter().find(|s| s.id == id)
    }

    /// The wedge that owns space `id`.
    pub fn sector_for(&self, id: AxisId) -> Option<&Sector> {
        let space = self.space(id)?;
        self.sectors.iter().find(|s| s.zone == space.zone)
    }

    pub fn place(&self, offsets: &OffsetMap, cfg: &DiagramConfig) -> BTreeMap<AxisId, Placement> {
        place_spaces(&self.spaces, &self.sectors, offsets, cfg)
    }

    /// Everything the presentation layer needs to draw the diagram.
    pub fn scene(
        &self,
        relations: &RelationStore,
        offsets: &OffsetMap,
        palette: &ZonePalette,
        cfg: &DiagramConfig,
    ) -> DiagramScene {
        let frame = self.frame;
        let placements = self.place(offsets, cfg);

        let sectors = self
            .sectors
            .iter()
            .map(|s| SectorOutput {
                zone: s.zone.clone(),
                color: s.color.clone(),
                start: s.start,
                end: s.end,
                center: s.center,
                span: s.span,
                path: sector_path(&frame, s.start, s.end, frame.center_radius, frame.outer_radius),
                band_paths: (1..=frame.n_ranks)
                    .map(|rank| {
                        let (inner, outer) = frame.band(rank);
                        sector_path(&frame, s.start, s.end, inner, outer)
                    })
                    .collect(),
                divider: (
                    frame.point_at(frame.center_radius, s.bounds().0),
                    frame.point_at(frame.outer_radius, s.bounds().0),
                ),
                label: palette
                    .get(&s.zone)
                    .map(|z| z.label())
                    .unwrap_or_else(|| s.zone.to_uppercase()),
                label_pos: frame.point_at(frame.outer_radius + cfg.label_pad, s.center),
            })
            .collect();

        let rings = (1..=frame.n_ranks)
            .map(|rank| {
                let (inner, outer) = frame.band(rank);
                let radius = frame.ring_radius(rank);
                RingOutput {
                    rank,
                    radius,
                    inner,
                    outer,
                    numeral_pos: frame.point_at(radius, START_ANGLE),
                }
            })
            .collect();

        let bubbles = self
            .spaces
            .iter()
            .filter_map(|s| {
                let p = placements.get(&s.id)?;
                let color = self
                    .sectors
                    .iter()
                    .find(|sec| sec.zone == s.zone)
                    .map(|sec| sec.color.clone())?;
                Some(BubbleOutput {
                    id: s.id,
                    name: s.name.clone(),
                    label: s.name.chars().take(cfg.label_chars).collect::<String>().to_uppercase(),
                    badge: format!("R{}", s.rank),
                    zone: s.zone.clone(),
                    color,
                    rank: s.rank,
                    sum: s.sum,
                    x: p.x,
                    y: p.y,
                    angle: p.angle,
                    pinned: p.pinned,
                })
            })
            .collect();

        let links = relation_links(&self.spaces, relations, &placements);
        let ranking = rank_summary(&self.spaces)
            .into_iter()
            .map(|(rank, names)| RankGroup { rank, names })
            .collect();

        DiagramScene {
            frame,
            bubble_radius: cfg.bubble_radius,
            sectors,
            rings,
            bubbles,
            links,
            ranking,
        }
    }
}

/// Build the full scene for `matrix`, or None when it has fewer than 2 axes.
pub fn layout_diagram(
    matrix: &Matrix,
    offsets: &OffsetMap,
    palette: &ZonePalette,
    cfg: &DiagramConfig,
) -> Option<DiagramScene> {
    let model = DiagramModel::build(matrix, palette, cfg)?;
    Some(model.scene(&matrix.relations, offsets, palette, cfg))
}

/// SVG path of the ring slice between radii `inner..outer` and angles
/// `start..end`. A full turn is drawn as two half slices since a single arc
/// with coincident endpoints renders nothing.
pub fn sector_path(frame: &DiagramFrame, start: f64, end: f64, inner: f64, outer: f64) -> String {
    if end - start >= TAU - 1e-9 {
        let mid = start + PI;
        return format!(
            "{} {}",
            sector_path(frame, start, mid, inner, outer),
            sector_path(frame, mid, end, inner, outer)
        );
    }
    let large = if end - start > PI { 1 } else { 0 };
    let i1 = frame.point_at(inner, start);
    let i2 = frame.point_at(inner, end);
    let o1 = frame.point_at(outer, start);
    let o2 = frame.point_at(outer, end);
    format!(
        "M {} {} A {inner} {inner} 0 {large} 1 {} {} L {} {} A {outer} {outer} 0 {large} 0 {} {} Z",
        i1.x, i1.y, i2.x, i2.y, o2.x, o2.y, o1.x, o1.y
    )
}
