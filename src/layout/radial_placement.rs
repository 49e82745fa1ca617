// Radial placement ("rings and wedges" layout).
//
// Places every ranked space on a ring chosen by its rank, inside the wedge
// of its zone:
// 1. The annulus between the center circle and the outer circle is split
//    into one equal band per rank; a space sits on its band's midpoint
// 2. A saved offset puts the space at `sector.center + offset`, clamped a
//    margin away from the wedge boundaries
// 3. Without a saved offset, spaces sharing (zone, rank) fan out evenly over
//    a fraction of the wedge, ordered by axis id; a lone one sits at center
//
// Properties:
// - Pure and deterministic
// - Outer radius grows with the rank count so bands never get narrower than
//   the configured ring spacing
// - Degenerate input (no spaces) yields an empty placement

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::DiagramConfig;
use super::ranking::{max_rank, Space};
use super::sectors::Sector;
use crate::matrix::{AxisId, Position};

/// Saved angle offsets by axis.
pub type OffsetMap = HashMap<AxisId, f64>;

pub fn offsets_from_positions(positions: &[Position]) -> OffsetMap {
    positions.iter().map(|p| (p.axis_id, p.angle_offset)).collect()
}

/// Offsets as storage records, ordered by axis id.
pub fn positions_from_offsets(offsets: &OffsetMap) -> Vec<Position> {
    let mut out: Vec<Position> = offsets
        .iter()
        .map(|(&axis_id, &angle_offset)| Position { axis_id, angle_offset })
        .collect();
    out.sort_by_key(|p| p.axis_id);
    out
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

/// Fixed geometry of one diagram: canvas size, center and ring radii.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct DiagramFrame {
    pub n_ranks: u32,
    pub center_radius: f64,
    pub outer_radius: f64,
    /// Width and height of the square logical canvas.
    pub size: f64,
    pub cx: f64,
    pub cy: f64,
}

impl DiagramFrame {
    /// Frame for `n_ranks` rings. Zero ranks is treated as one.
    pub fn new(n_ranks: u32, cfg: &DiagramConfig) -> Self {
        let n_ranks = n_ranks.max(1);
        let outer_radius = cfg
            .min_outer_radius
            .max(cfg.center_radius + n_ranks as f64 * cfg.ring_spacing);
        let size = (2.0 * (outer_radius + cfg.label_pad + cfg.canvas_padding)).round();
        Self {
            n_ranks,
            center_radius: cfg.center_radius,
            outer_radius,
            size,
            cx: size / 2.0,
            cy: size / 2.0,
        }
    }

    pub fn for_spaces(spaces: &[Space], cfg: &DiagramConfig) -> Self {
        Self::new(max_rank(spaces), cfg)
    }

    pub fn band_width(&self) -> f64 {
        (self.outer_radius - self.center_radius) / self.n_ranks as f64
    }

    /// Inner and outer edge of the band for `rank` (1-based).
    pub fn band(&self, rank: u32) -> (f64, f64) {
        let i = rank.clamp(1, self.n_ranks) - 1;
        let inner = self.center_radius + i as f64 * self.band_width();
        (inner, inner + self.band_width())
    }

    /// Placement radius for `rank`: the midpoint of its band.
    pub fn ring_radius(&self, rank: u32) -> f64 {
        let (inner, outer) = self.band(rank);
        (inner + outer) / 2.0
    }

    pub fn point_at(&self, radius: f64, angle: f64) -> PointF {
        PointF {
            x: self.cx + radius * angle.cos(),
            y: self.cy + radius * angle.sin(),
        }
    }
}

/// Where one space ended up.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub angle: f64,
    pub radius: f64,
    pub x: f64,
    pub y: f64,
    /// Whether the angle came from a saved offset rather than auto-spread.
    pub pinned: bool,
}

/// Angle for a space without a saved offset.
fn spread_angle(space: &Space, spaces: &[Space], sector: &Sector, fraction: f64) -> f64 {
    let mut group: Vec<AxisId> = spaces
        .iter()
        .filter(|s| s.zone == space.zone && s.rank == space.rank)
        .map(|s| s.id)
        .collect();
    group.sort();
    let n = group.len();
    if n <= 1 {
        return sector.center;
    }
    let idx = group.iter().position(|&id| id == space.id).unwrap_or(0);
    let spread = sector.span * fraction;
    let step = spread / (n - 1) as f64;
    sector.center - spread / 2.0 + idx as f64 * step
}

/// Position every space whose zone has a sector.
pub fn place_spaces(
    spaces: &[Space],
    sectors: &[Sector],
    offsets: &OffsetMap,
    cfg: &DiagramConfig,
) -> BTreeMap<AxisId, Placement> {
    let mut placements: BTreeMap<AxisId, Placement> = BTreeMap::new();
    if spaces.is_empty() {
        return placements;
    }
    let frame = DiagramFrame::for_spaces(spaces, cfg);

    for space in spaces {
        let Some(sector) = sectors.iter().find(|s| s.zone == space.zone) else {
            tracing::warn!(axis = %space.id, zone = %space.zone, "no sector for space, skipping");
            continue;
        };

        let (angle, pinned) = match offsets.get(&space.id) {
            Some(&offset) => {
                let clamped = sector.clamp_offset(offset, cfg.drag_margin);
                if clamped != offset {
                    tracing::warn!(axis = %space.id, offset, clamped, "saved offset outside its sector");
                }
                (sector.center + clamped, true)
            }
            None => (spread_angle(space, spaces, sector, cfg.spread_fraction), false),
        };

        let radius = frame.ring_radius(space.rank);
        let p = frame.point_at(radius, angle);
        placements.insert(space.id, Placement { angle, radius, x: p.x, y: p.y, pinned });
    }

    placements
}
