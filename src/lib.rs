//! Ponder core: relation matrix ranking and radial adjacency diagrams.
//!
//! A project's spaces are ranked by how strongly they relate to the others,
//! then drawn as bubbles on concentric rank rings, each inside the wedge of
//! its functional zone. Bubbles can be dragged along their ring within the
//! wedge and the resulting angle offsets are persisted per project.

pub mod error;
pub mod interaction;
pub mod layout;
pub mod matrix;
pub mod output;
pub mod persistence;
mod wasm;

pub use error::{ConfigError, DragError, MatrixError, SessionError, StoreError};
pub use interaction::{DiagramSession, DragController, DragEvent, DragPhase, DragState, PointerSample, Viewport};
pub use layout::{
    compute_spaces, layout_diagram, partition_sectors, place_spaces, DiagramConfig, DiagramFrame,
    DiagramModel, OffsetMap, Placement, Sector, Space,
};
pub use matrix::{Axis, AxisId, Matrix, MatrixData, Position, ProjectId, RelationStore, RelationValue, ZonePalette};
pub use output::DiagramOutput;
pub use persistence::{DiagramStore, MemoryStore, SessionContext};
pub use wasm::*;
