//! Axis ordering and component-list edits.
//!
//! When the user edits the list of components, the axis set is replaced
//! wholesale. Relation values survive the replacement when both component
//! names survive, matched by unordered name pair.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::store::RelationStore;
use super::types::{Axis, AxisId, RelationValue};
use super::zone::ZonePalette;
use crate::error::MatrixError;

/// One row of the component editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub zone: String,
    pub name: String,
}

/// A project's axes together with their relation store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    pub axes: Vec<Axis>,
    pub relations: RelationStore,
}

/// Sort axes by zone priority (zones outside the palette last), then by
/// declared order. The sort is stable, so equal keys keep storage order.
pub fn order_axes(axes: &[Axis], palette: &ZonePalette) -> Vec<Axis> {
    let mut out = axes.to_vec();
    out.sort_by_key(|a| {
        let zone = palette.normalize(&a.zone);
        (palette.priority(&zone).unwrap_or(usize::MAX), a.order)
    });
    out
}

fn name_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl Matrix {
    pub fn component_list(&self) -> Vec<Component> {
        self.axes
            .iter()
            .map(|a| Component { zone: a.zone.clone(), name: a.name.clone() })
            .collect()
    }

    /// Replace the axis set with `components`.
    ///
    /// Zones and names are trimmed, blank rows dropped, and duplicates by
    /// `(zone, name)` removed keeping the first occurrence. New axes get ids
    /// `first_id, first_id + 1, ...` and orders `0, 1, ...`.
    pub fn replace_components(
        &self,
        components: &[Component],
        first_id: AxisId,
    ) -> Result<Matrix, MatrixError> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut unique: Vec<Component> = Vec::new();
        for c in components {
            let zone = c.zone.trim();
            let name = c.name.trim();
            if zone.is_empty() || name.is_empty() {
                continue;
            }
            if seen.insert((zone.to_string(), name.to_string())) {
                unique.push(Component { zone: zone.to_string(), name: name.to_string() });
            }
        }
        if unique.len() < 2 {
            return Err(MatrixError::NotEnoughComponents { found: unique.len() });
        }

        // Old values keyed by component names.
        let names: HashMap<AxisId, &str> =
            self.axes.iter().map(|a| (a.id, a.name.as_str())).collect();
        let mut by_names: HashMap<(String, String), RelationValue> = HashMap::new();
        for entry in self.relations.entries() {
            let (Some(a), Some(b)) = (names.get(&entry.axis_a), names.get(&entry.axis_b)) else {
                continue;
            };
            by_names.insert(name_pair(a, b), entry.value);
        }

        let axes: Vec<Axis> = unique
            .iter()
            .enumerate()
            .map(|(i, c)| Axis {
                id: AxisId(first_id.0 + i as u64),
                name: c.name.clone(),
                zone: c.zone.clone(),
                order: i as i64,
            })
            .collect();

        let mut relations = RelationStore::new();
        for (i, a) in axes.iter().enumerate() {
            for b in &axes[i + 1..] {
                // Same-named components in different zones have no name pair.
                if a.name == b.name {
                    continue;
                }
                if let Some(&value) = by_names.get(&name_pair(&a.name, &b.name)) {
                    relations.set(a.id, b.id, value)?;
                }
            }
        }

        tracing::debug!(
            axes = axes.len(),
            carried = relations.len(),
            "replaced component list"
        );
        Ok(Matrix { axes, relations })
    }
}
