mod drag;
mod session;

pub use drag::{DragController, DragEvent, DragListener, DragPhase, DragState, PointerSample, Viewport};
pub use session::DiagramSession;
