// Sector partitioner.
//
// Splits the full circle into one contiguous wedge per zone, in palette
// priority order, starting straight up. Each wedge's span is proportional to
// the number of spaces in its zone. Zones without spaces get no wedge.
//
// Also hosts the angle helpers used by placement and dragging: wrapping a raw
// angle into a sector, and keeping offsets a margin away from the boundaries.

use std::f64::consts::{PI, TAU};

use serde::Serialize;

use super::ranking::Space;
use crate::matrix::ZonePalette;

/// Angle of the first sector's leading edge: straight up in screen space.
pub const START_ANGLE: f64 = -PI / 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sector {
    pub zone: String,
    pub color: String,
    pub start: f64,
    pub end: f64,
    pub center: f64,
    pub span: f64,
    /// Number of spaces in this zone.
    pub count: usize,
}

impl Sector {
    pub fn is_full_circle(&self) -> bool {
        self.span >= TAU - 1e-9
    }

    /// Angular range bubbles may occupy. A full-circle wedge has no real
    /// boundary, so its seam sits opposite the center.
    pub fn bounds(&self) -> (f64, f64) {
        if self.is_full_circle() {
            (self.center - PI, self.center + PI)
        } else {
            (self.start, self.end)
        }
    }

    /// Clamp a raw angle (any winding) into `bounds()`. Angles outside
    /// snap to whichever boundary is nearer going around the circle.
    pub fn clamp_angle(&self, theta: f64) -> f64 {
        let (lo, hi) = self.bounds();
        let a = lo + (theta - lo).rem_euclid(TAU);
        if a <= hi {
            return a;
        }
        let dist_end = a - hi;
        let dist_start = lo + TAU - a;
        if dist_end < dist_start { hi } else { lo }
    }

    /// Clamp an offset from `center` into the open range that stays `margin`
    /// away from both boundaries. A sector narrower than two margins pins
    /// every offset to its center.
    pub fn clamp_offset(&self, offset: f64, margin: f64) -> f64 {
        let (start, end) = self.bounds();
        let lo = start - self.center + margin;
        let hi = end - self.center - margin;
        if lo >= hi {
            return 0.0;
        }
        offset.clamp(lo, hi)
    }

    /// Offset from `center` for a raw pointer angle, clamped into the sector
    /// and kept `margin` away from its boundaries.
    pub fn offset_for_angle(&self, theta: f64, margin: f64) -> f64 {
        let clamped = self.clamp_angle(theta);
        self.clamp_offset(clamped - self.center, margin)
    }
}

/// Partition the circle among the zones present in `spaces`.
///
/// Spaces whose zone is not in the palette are left out of the count; they
/// get no sector and placement skips them.
pub fn partition_sectors(spaces: &[Space], palette: &ZonePalette) -> Vec<Sector> {
    let counts: Vec<usize> = palette
        .zones()
        .iter()
        .map(|z| spaces.iter().filter(|s| s.zone == z.name).count())
        .collect();
    let total: usize = counts.iter().sum();

    let stray = spaces.len() - total;
    if stray > 0 {
        tracing::warn!(stray, "spaces with zones outside the palette get no sector");
    }
    if total == 0 {
        return Vec::new();
    }

    let mut sectors: Vec<Sector> = Vec::new();
    let mut cursor = START_ANGLE;
    for (zone, &count) in palette.zones().iter().zip(counts.iter()) {
        if count == 0 {
            continue;
        }
        let span = count as f64 / total as f64 * TAU;
        sectors.push(Sector {
            zone: zone.name.clone(),
            color: zone.color.clone(),
            start: cursor,
            end: cursor + span,
            center: cursor + span / 2.0,
            span,
            count,
        });
        cursor += span;
    }

    // Close the circle exactly; accumulated rounding lands on the last wedge.
    if let Some(last) = sectors.last_mut() {
        last.end = START_ANGLE + TAU;
        last.span = last.end - last.start;
        last.center = last.start + last.span / 2.0;
    }

    // A wedge covering the whole circle faces north like the first wedge of
    // any diagram; its seam then falls due south (see `Sector::bounds`).
    if let [only] = sectors.as_mut_slice() {
        only.center = only.start;
    }

    sectors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::AxisId;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn space(id: u64, zone: &str) -> Space {
        Space { id: AxisId(id), name: format!("S{id}"), zone: zone.to_string(), sum: 0, rank: 1 }
    }

    fn sector(start: f64, end: f64) -> Sector {
        Sector {
            zone: "Social".into(),
            color: "#000".into(),
            start,
            end,
            center: (start + end) / 2.0,
            span: end - start,
            count: 1,
        }
    }

    #[test]
    fn test_single_zone_spans_full_circle() {
        let sectors = partition_sectors(&[space(1, "Social")], &ZonePalette::default());
        assert_eq!(sectors.len(), 1);
        assert!((sectors[0].span - TAU).abs() < EPS);
        assert!((sectors[0].start - START_ANGLE).abs() < EPS);
        assert!((sectors[0].center - START_ANGLE).abs() < EPS);

        // Offsets range symmetrically around north, up to the southern seam.
        let s = &sectors[0];
        assert!(s.is_full_circle());
        assert_eq!(s.clamp_offset(0.0, 0.04), 0.0);
        assert_eq!(s.clamp_offset(-1.0, 0.04), -1.0);
        assert!((s.clamp_offset(10.0, 0.04) - (PI - 0.04)).abs() < EPS);
        assert!((s.clamp_offset(-10.0, 0.04) - (-PI + 0.04)).abs() < EPS);
        let (lo, hi) = s.bounds();
        assert!((lo - (START_ANGLE - PI)).abs() < EPS);
        assert!((hi - (START_ANGLE + PI)).abs() < EPS);
    }

    #[test]
    fn test_full_circle_pointer_angles_wrap_around_north() {
        let sectors = partition_sectors(&[space(1, "Social")], &ZonePalette::default());
        let s = &sectors[0];
        // Straight up, slightly west of north, and due south.
        assert!(s.offset_for_angle(-PI / 2.0, 0.04).abs() < EPS);
        assert!((s.offset_for_angle(-PI / 2.0 - 0.3, 0.04) + 0.3).abs() < EPS);
        assert!((s.offset_for_angle(PI / 2.0 - 0.01, 0.04) - (PI - 0.04)).abs() < EPS);
    }

    #[test]
    fn test_sectors_follow_priority_and_skip_empty_zones() {
        let spaces = vec![
            space(1, "Privada"),
            space(2, "Social"),
            space(3, "Social"),
            space(4, "Privada"),
        ];
        let sectors = partition_sectors(&spaces, &ZonePalette::default());
        let zones: Vec<&str> = sectors.iter().map(|s| s.zone.as_str()).collect();
        assert_eq!(zones, vec!["Social", "Privada"]);
        assert!((sectors[0].span - PI).abs() < EPS);
        assert!((sectors[0].end - sectors[1].start).abs() < EPS);
        assert_eq!(sectors[1].color, "#ef4444");
    }

    #[test]
    fn test_unknown_zones_get_no_sector() {
        let spaces = vec![space(1, "Social"), space(2, "Jardín")];
        let sectors = partition_sectors(&spaces, &ZonePalette::default());
        assert_eq!(sectors.len(), 1);
        assert!((sectors[0].span - TAU).abs() < EPS);
        assert!(partition_sectors(&[space(3, "Jardín")], &ZonePalette::default()).is_empty());
        assert!(partition_sectors(&[], &ZonePalette::default()).is_empty());
    }

    #[test]
    fn test_clamp_angle_inside_and_wrapped() {
        let s = sector(0.0, PI / 2.0);
        assert!((s.clamp_angle(0.5) - 0.5).abs() < EPS);
        // Same direction, different winding.
        assert!((s.clamp_angle(0.5 - TAU) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_clamp_angle_snaps_to_nearer_boundary() {
        let s = sector(0.0, PI / 2.0);
        // Just past the end.
        assert_eq!(s.clamp_angle(PI / 2.0 + 0.2), PI / 2.0);
        // Just before the start (wraps to near TAU).
        assert_eq!(s.clamp_angle(-0.2), 0.0);
    }

    #[test]
    fn test_offset_for_angle_respects_margin() {
        let s = sector(0.0, PI / 2.0);
        let margin = 0.04;
        let off = s.offset_for_angle(PI, margin);
        assert!((s.center + off - (PI / 2.0 - margin)).abs() < EPS);
        let off = s.offset_for_angle(-0.1, margin);
        assert!((s.center + off - margin).abs() < EPS);
    }

    #[test]
    fn test_narrow_sector_pins_to_center() {
        let s = sector(0.0, 0.05);
        assert_eq!(s.clamp_offset(0.02, 0.04), 0.0);
    }

    proptest! {
        #[test]
        fn spans_cover_the_circle(zones in proptest::collection::vec(0usize..5, 1..30)) {
            let names = ["Social", "Semisocial", "Servicio", "Privada", "Jardín"];
            let spaces: Vec<Space> = zones.iter().enumerate().map(|(i, &z)| space(i as u64, names[z])).collect();
            let sectors = partition_sectors(&spaces, &ZonePalette::default());
            let known = zones.iter().filter(|&&z| z < 4).count();
            if known == 0 {
                prop_assert!(sectors.is_empty());
            } else {
                let total: f64 = sectors.iter().map(|s| s.span).sum();
                prop_assert!((total - TAU).abs() < 1e-9);
                for w in sectors.windows(2) {
                    prop_assert!((w[0].end - w[1].start).abs() < 1e-12);
                }
                prop_assert!(sectors.iter().all(|s| s.count > 0 && s.span > 0.0));
            }
        }

        #[test]
        fn clamped_offsets_stay_strictly_inside(
            start in -PI..PI,
            span in 0.1f64..TAU,
            theta in -10.0f64..10.0,
        ) {
            let s = sector(start, start + span);
            let angle = s.center + s.offset_for_angle(theta, 0.04);
            let (lo, hi) = s.bounds();
            prop_assert!(angle > lo && angle < hi);
        }
    }
}
