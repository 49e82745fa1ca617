// Relation links between placed spaces.
//
// Every pair of placed spaces with a non-zero relation becomes a straight
// line in the diagram. Necessary relations are drawn solid and heavier,
// desired ones dashed.

use std::collections::BTreeMap;

use serde::Serialize;

use super::radial_placement::Placement;
use super::ranking::Space;
use crate::matrix::{AxisId, RelationStore, RelationValue};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationLink {
    pub from: AxisId,
    pub to: AxisId,
    pub value: RelationValue,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke_width: f64,
    /// SVG dash pattern, None for solid lines.
    pub dash: Option<String>,
}

fn link_style(value: RelationValue) -> (f64, Option<String>) {
    match value {
        RelationValue::Necessary => (2.2, None),
        _ => (1.5, Some("7 5".to_string())),
    }
}

/// Links for every related pair, in space order. Pairs where either end was
/// not placed are skipped.
pub fn relation_links(
    spaces: &[Space],
    relations: &RelationStore,
    placements: &BTreeMap<AxisId, Placement>,
) -> Vec<RelationLink> {
    let mut links = Vec::new();
    for (i, a) in spaces.iter().enumerate() {
        for b in &spaces[i + 1..] {
            let value = relations.get(a.id, b.id);
            if value.is_none() {
                continue;
            }
            let (Some(pa), Some(pb)) = (placements.get(&a.id), placements.get(&b.id)) else {
                continue;
            };
            let (stroke_width, dash) = link_style(value);
            links.push(RelationLink {
                from: a.id,
                to: b.id,
                value,
                x1: pa.x,
                y1: pa.y,
                x2: pb.x,
                y2: pb.y,
                stroke_width,
                dash,
            });
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(id: u64) -> Space {
        Space { id: AxisId(id), name: format!("S{id}"), zone: "Social".into(), sum: 0, rank: 1 }
    }

    fn placed(x: f64, y: f64) -> Placement {
        Placement { angle: 0.0, radius: 0.0, x, y, pinned: false }
    }

    #[test]
    fn test_links_carry_style_per_value() {
        let spaces = vec![space(1), space(2), space(3)];
        let mut relations = RelationStore::new();
        relations.set(AxisId(1), AxisId(2), RelationValue::Necessary).unwrap();
        relations.set(AxisId(3), AxisId(1), RelationValue::Desired).unwrap();
        let mut placements = BTreeMap::new();
        placements.insert(AxisId(1), placed(0.0, 0.0));
        placements.insert(AxisId(2), placed(10.0, 0.0));
        placements.insert(AxisId(3), placed(0.0, 10.0));

        let links = relation_links(&spaces, &relations, &placements);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].to, AxisId(2));
        assert_eq!(links[0].stroke_width, 2.2);
        assert!(links[0].dash.is_none());
        assert_eq!(links[1].from, AxisId(1));
        assert_eq!(links[1].to, AxisId(3));
        assert_eq!(links[1].dash.as_deref(), Some("7 5"));
    }

    #[test]
    fn test_unplaced_ends_are_skipped() {
        let spaces = vec![space(1), space(2)];
        let mut relations = RelationStore::new();
        relations.set(AxisId(1), AxisId(2), RelationValue::Necessary).unwrap();
        let mut placements = BTreeMap::new();
        placements.insert(AxisId(1), placed(0.0, 0.0));
        assert!(relation_links(&spaces, &relations, &placements).is_empty());
    }
}
