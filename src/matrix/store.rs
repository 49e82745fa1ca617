// Relation store: pairwise adjacency weights between axes.
//
// Pairs are stored under a normalized (low, high) key so that lookups are
// symmetric by construction. Absent pairs read as `RelationValue::None`.

use std::collections::HashMap;

use super::types::{AxisId, RelationEntry, RelationValue};
use crate::error::MatrixError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationStore {
    values: HashMap<(AxisId, AxisId), RelationValue>,
}

fn pair_key(a: AxisId, b: AxisId) -> (AxisId, AxisId) {
    if a <= b { (a, b) } else { (b, a) }
}

impl RelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from storage entries. Later entries for the same pair
    /// win, whichever orientation they were written in. Self-pairs are
    /// dropped since an axis is never related to itself.
    pub fn from_entries(entries: &[RelationEntry]) -> Self {
        let mut store = Self::new();
        for entry in entries {
            if let Err(e) = store.set(entry.axis_a, entry.axis_b, entry.value) {
                tracing::warn!(error = %e, "skipping relation entry");
            }
        }
        store
    }

    /// Set the value for an unordered pair. Setting `None` removes the pair.
    pub fn set(&mut self, a: AxisId, b: AxisId, value: RelationValue) -> Result<(), MatrixError> {
        if a == b {
            return Err(MatrixError::SelfRelation(a));
        }
        let key = pair_key(a, b);
        if value.is_none() {
            self.values.remove(&key);
        } else {
            self.values.insert(key, value);
        }
        Ok(())
    }

    pub fn get(&self, a: AxisId, b: AxisId) -> RelationValue {
        self.values.get(&pair_key(a, b)).copied().unwrap_or_default()
    }

    /// Number of non-zero pairs.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-zero pairs in a deterministic (low id, high id) order.
    pub fn entries(&self) -> Vec<RelationEntry> {
        let mut out: Vec<RelationEntry> = self
            .values
            .iter()
            .map(|(&(axis_a, axis_b), &value)| RelationEntry { axis_a, axis_b, value })
            .collect();
        out.sort_by_key(|e| (e.axis_a, e.axis_b));
        out
    }
}
