use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MatrixError;

/// Identifier of one axis (one architectural space) as issued by storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxisId(pub u64);

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

/// One architectural space being compared. Owned by storage; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub id: AxisId,
    pub name: String,
    /// Zone as entered by the user; normalized against the palette later.
    pub zone: String,
    /// Declaration order within the project.
    pub order: i64,
}

/// Weight of the need for two spaces to be adjacent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum RelationValue {
    #[default]
    None,
    Desired,
    Necessary,
}

impl RelationValue {
    pub fn weight(self) -> i64 {
        match self {
            RelationValue::None => 0,
            RelationValue::Desired => 2,
            RelationValue::Necessary => 4,
        }
    }

    pub fn is_none(self) -> bool {
        self == RelationValue::None
    }
}

impl TryFrom<i64> for RelationValue {
    type Error = MatrixError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RelationValue::None),
            2 => Ok(RelationValue::Desired),
            4 => Ok(RelationValue::Necessary),
            other => Err(MatrixError::InvalidRelationValue(other)),
        }
    }
}

impl From<RelationValue> for i64 {
    fn from(value: RelationValue) -> Self {
        value.weight()
    }
}

/// A relation as it travels to and from storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEntry {
    pub axis_a: AxisId,
    pub axis_b: AxisId,
    pub value: RelationValue,
}

/// Saved angular displacement of a bubble from its sector's center (radians).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub axis_id: AxisId,
    pub angle_offset: f64,
}

/// Everything `loadMatrix` returns for one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixData {
    #[serde(default)]
    pub axes: Vec<Axis>,
    #[serde(default)]
    pub relations: Vec<RelationEntry>,
}
