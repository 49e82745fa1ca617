// Diagram session.
//
// Binds one project's matrix, palette and drag controller together so that
// loading, cell edits and drags always leave the matrix and the ranked model
// in agreement:
// - Reloads and cell edits are refused while a drag is active, before
//   anything is mutated or persisted
// - The matrix is swapped only once the controller accepted the new model
//
// Event delivery: events raised while a session call is running are queued
// and handed out by `take_events`, so a sink never runs while the session is
// mid-call. Events raised outside a call (a save completing later) go to the
// sink directly.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::drag::{DragController, DragEvent, DragListener, PointerSample, Viewport};
use crate::error::{DragError, SessionError};
use crate::layout::{DiagramConfig, DiagramModel, OffsetMap};
use crate::matrix::{AxisId, Matrix, ProjectId, ZonePalette};
use crate::output::DiagramScene;
use crate::persistence::{edit_cell, load_diagram, DiagramStore, SaveCallback, SessionContext};

pub struct DiagramSession<S: DiagramStore> {
    controller: DragController<S>,
    matrix: Matrix,
    palette: ZonePalette,
    busy: Rc<Cell<bool>>,
    queue: Rc<RefCell<Vec<DragEvent>>>,
}

impl<S: DiagramStore> DiagramSession<S> {
    pub fn new(
        store: S,
        ctx: SessionContext,
        project: ProjectId,
        cfg: DiagramConfig,
        palette: ZonePalette,
        mut sink: DragListener,
    ) -> Self {
        let mut controller = DragController::new(store, ctx, project, cfg);
        let busy = Rc::new(Cell::new(false));
        let queue = Rc::new(RefCell::new(Vec::new()));

        let (in_call, pending) = (busy.clone(), queue.clone());
        controller.subscribe(Box::new(move |event: &DragEvent| {
            if in_call.get() {
                pending.borrow_mut().push(event.clone());
            } else {
                sink(event);
            }
        }));

        Self { controller, matrix: Matrix::default(), palette, busy, queue }
    }

    pub fn controller(&self) -> &DragController<S> {
        &self.controller
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Events raised during earlier calls, oldest first.
    pub fn take_events(&mut self) -> Vec<DragEvent> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    /// Load matrix and positions from the store.
    pub fn load(&mut self) -> Result<(), SessionError> {
        if self.controller.is_dragging() {
            return Err(DragError::ReloadWhileDragging.into());
        }
        let controller = &self.controller;
        let (matrix, offsets) = load_diagram(controller.store(), controller.context(), controller.project())?;
        self.reload(matrix, offsets)?;
        Ok(())
    }

    /// Replace the matrix and offsets, re-ranking from scratch.
    pub fn reload(&mut self, matrix: Matrix, offsets: OffsetMap) -> Result<(), DragError> {
        if self.controller.is_dragging() {
            return Err(DragError::ReloadWhileDragging);
        }
        let model = DiagramModel::build(&matrix, &self.palette, self.controller.config());
        self.controller.reload(model, offsets)?;
        self.matrix = matrix;
        Ok(())
    }

    /// Set one relation cell from raw input, persist it and re-rank.
    pub fn edit_cell(
        &mut self,
        axis_a: AxisId,
        axis_b: AxisId,
        raw_value: i64,
        done: SaveCallback,
    ) -> Result<(), SessionError> {
        if self.controller.is_dragging() {
            return Err(DragError::EditWhileDragging.into());
        }
        let mut matrix = self.matrix.clone();
        let controller = &self.controller;
        edit_cell(
            controller.store(),
            controller.context(),
            controller.project(),
            &mut matrix,
            axis_a,
            axis_b,
            raw_value,
            done,
        )?;
        let offsets = self.controller.offsets().clone();
        self.reload(matrix, offsets)?;
        Ok(())
    }

    /// The current scene, or None when there is not enough data to draw.
    pub fn scene(&self) -> Option<DiagramScene> {
        let model = self.controller.model()?;
        Some(model.scene(&self.matrix.relations, self.controller.offsets(), &self.palette, self.controller.config()))
    }

    pub fn pointer_down(&mut self, axis: AxisId) -> bool {
        self.in_call(|c| c.on_pointer_down(axis))
    }

    pub fn pointer_move(&mut self, pointer: PointerSample, viewport: Viewport) -> Option<f64> {
        self.in_call(|c| c.on_pointer_move(pointer, viewport))
    }

    pub fn pointer_up(&mut self) -> bool {
        self.in_call(|c| c.on_pointer_up())
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.in_call(|c| c.on_pointer_leave())
    }

    pub fn flush(&mut self) {
        self.in_call(|c| c.flush())
    }

    fn in_call<R>(&mut self, f: impl FnOnce(&mut DragController<S>) -> R) -> R {
        self.busy.set(true);
        let out = f(&mut self.controller);
        self.busy.set(false);
        out
    }
}
