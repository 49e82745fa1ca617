//! Error types for the ponder core.
//!
//! The geometry pipeline itself never fails: degenerate input yields empty
//! output. Errors only arise at the data boundary (bad relation values, bad
//! component lists), from configuration, from the drag controller's state
//! machine, and from the storage collaborator.

use thiserror::Error;

use crate::matrix::AxisId;

/// Errors raised while building or editing a relation matrix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("Invalid relation value {0}: expected 0, 2 or 4")]
    InvalidRelationValue(i64),

    #[error("Axis {0} cannot be related to itself")]
    SelfRelation(AxisId),

    #[error("At least 2 distinct components are required, found {found}")]
    NotEnoughComponents { found: usize },
}

/// Errors raised by `DiagramConfig::validate`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("drag_margin must lie in (0, π/4), got {0}")]
    DragMargin(f64),

    #[error("spread_fraction must lie in (0, 1], got {0}")]
    SpreadFraction(f64),
}

/// Errors raised by the drag controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    #[error("Cannot reload the diagram while a drag is in progress")]
    ReloadWhileDragging,

    #[error("Cannot edit relations while a drag is in progress")]
    EditWhileDragging,
}

/// Errors reported by the storage collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Session is not authorized")]
    Unauthorized,

    #[error("Project {0} not found")]
    NotFound(u64),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Errors raised by a diagram session, which combines loading, editing and
/// dragging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error(transparent)]
    Drag(#[from] DragError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
