// Drag controller.
//
// Turns pointer events on a bubble into angle offsets that keep the bubble on
// its rank ring and inside its zone's wedge.
//
// States:
// - Idle: waiting for a pointer-down on a bubble
// - Dragging: one axis follows the pointer; its sector is captured at start
// - Committing: the new offsets are being handed to storage
//
// Pointer-up and pointer-leave both end a drag. The whole offset map is
// persisted on every commit, fire-and-forget; a failed save is reported to
// subscribers and the in-memory offsets are kept. Only one drag is active at
// a time: a second pointer-down while dragging is ignored.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{DragError, StoreError};
use crate::layout::{positions_from_offsets, DiagramConfig, DiagramModel, OffsetMap, Placement, Sector};
use crate::matrix::{AxisId, ProjectId};
use crate::persistence::{DiagramStore, SessionContext};

/// On-screen rectangle of the rendered canvas, in client pixels.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Pointer position in client pixels.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub client_x: f64,
    pub client_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { axis: AxisId, sector: Sector },
    Committing { axis: AxisId },
}

/// Coarse view of `DragState` for callers that only need the phase.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Idle,
    Dragging,
    Committing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragEvent {
    Moved { axis: AxisId, offset: f64 },
    Committed { axis: AxisId, offset: f64 },
    Saved,
    SaveFailed { message: String },
}

pub type DragListener = Box<dyn FnMut(&DragEvent)>;

#[derive(Default)]
struct Listeners {
    next_id: usize,
    entries: Vec<(usize, DragListener)>,
}

fn emit(listeners: &Rc<RefCell<Listeners>>, event: &DragEvent) {
    for (_, listener) in listeners.borrow_mut().entries.iter_mut() {
        listener(event);
    }
}

pub struct DragController<S: DiagramStore> {
    store: S,
    ctx: SessionContext,
    project: ProjectId,
    cfg: DiagramConfig,
    model: Option<DiagramModel>,
    offsets: OffsetMap,
    state: DragState,
    listeners: Rc<RefCell<Listeners>>,
}

impl<S: DiagramStore> DragController<S> {
    pub fn new(store: S, ctx: SessionContext, project: ProjectId, cfg: DiagramConfig) -> Self {
        Self {
            store,
            ctx,
            project,
            cfg,
            model: None,
            offsets: OffsetMap::new(),
            state: DragState::Idle,
            listeners: Rc::new(RefCell::new(Listeners::default())),
        }
    }

    /// Swap in freshly loaded data. `None` means there is nothing to drag.
    /// Refused while a drag is in progress.
    pub fn reload(&mut self, model: Option<DiagramModel>, offsets: OffsetMap) -> Result<(), DragError> {
        if self.is_dragging() {
            return Err(DragError::ReloadWhileDragging);
        }
        self.model = model;
        self.offsets = offsets;
        self.state = DragState::Idle;
        Ok(())
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn phase(&self) -> DragPhase {
        match self.state {
            DragState::Idle => DragPhase::Idle,
            DragState::Dragging { .. } => DragPhase::Dragging,
            DragState::Committing { .. } => DragPhase::Committing,
        }
    }

    pub fn model(&self) -> Option<&DiagramModel> {
        self.model.as_ref()
    }

    pub fn offsets(&self) -> &OffsetMap {
        &self.offsets
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.cfg
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Current placement of every space, with in-progress offsets applied.
    pub fn placements(&self) -> BTreeMap<AxisId, Placement> {
        self.model
            .as_ref()
            .map(|m| m.place(&self.offsets, &self.cfg))
            .unwrap_or_default()
    }

    /// Register a listener for drag events. Returns a handle for `unsubscribe`.
    pub fn subscribe(&mut self, listener: DragListener) -> usize {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: usize) {
        self.listeners.borrow_mut().entries.retain(|(i, _)| *i != id);
    }

    /// Start dragging `axis`. Returns false when the press is ignored: a drag
    /// is already active, or the axis has no placed bubble.
    pub fn on_pointer_down(&mut self, axis: AxisId) -> bool {
        if !matches!(self.state, DragState::Idle) {
            return false;
        }
        let Some(sector) = self.model.as_ref().and_then(|m| m.sector_for(axis)) else {
            tracing::debug!(%axis, "pointer down on an axis without a sector");
            return false;
        };
        self.state = DragState::Dragging { axis, sector: sector.clone() };
        true
    }

    /// Follow the pointer. Returns the new offset, or None when not dragging
    /// or the viewport is degenerate.
    pub fn on_pointer_move(&mut self, pointer: PointerSample, viewport: Viewport) -> Option<f64> {
        let DragState::Dragging { axis, sector } = &self.state else {
            return None;
        };
        let frame = self.model.as_ref()?.frame;
        if !(viewport.width > 0.0 && viewport.height > 0.0) {
            return None;
        }

        // Client pixels to logical canvas units relative to the center.
        let mx = (pointer.client_x - viewport.left) * (frame.size / viewport.width) - frame.cx;
        let my = (pointer.client_y - viewport.top) * (frame.size / viewport.height) - frame.cy;
        let theta = my.atan2(mx);
        let offset = sector.offset_for_angle(theta, self.cfg.drag_margin);

        let axis = *axis;
        self.offsets.insert(axis, offset);
        emit(&self.listeners, &DragEvent::Moved { axis, offset });
        Some(offset)
    }

    /// End the drag and persist. Returns false when nothing was being dragged.
    pub fn on_pointer_up(&mut self) -> bool {
        let DragState::Dragging { axis, ref sector } = self.state else {
            return false;
        };
        let sector = sector.clone();
        self.commit(axis, &sector);
        true
    }

    pub fn on_pointer_leave(&mut self) -> bool {
        self.on_pointer_up()
    }

    /// Persist everything now, e.g. when the view goes away. An active drag
    /// is committed first.
    pub fn flush(&mut self) {
        if self.on_pointer_up() {
            return;
        }
        if self.offsets.is_empty() {
            return;
        }
        self.save_all();
    }

    fn commit(&mut self, axis: AxisId, sector: &Sector) {
        // A press without movement pins the bubble where it currently sits.
        let offset = match self.offsets.get(&axis) {
            Some(&offset) => offset,
            None => self
                .placements()
                .get(&axis)
                .map(|p| sector.offset_for_angle(p.angle, self.cfg.drag_margin))
                .unwrap_or(0.0),
        };
        self.state = DragState::Committing { axis };
        self.offsets.insert(axis, offset);
        tracing::debug!(%axis, offset, "drag committed");
        emit(&self.listeners, &DragEvent::Committed { axis, offset });
        self.save_all();
        self.state = DragState::Idle;
    }

    fn save_all(&self) {
        let positions = positions_from_offsets(&self.offsets);
        let listeners = self.listeners.clone();
        let project = self.project;
        self.store.save_positions(
            &self.ctx,
            project,
            positions,
            Box::new(move |result: Result<(), StoreError>| {
                let event = match result {
                    Ok(()) => DragEvent::Saved,
                    Err(e) => {
                        tracing::warn!(error = %e, project = project.0, "saving positions failed");
                        DragEvent::SaveFailed { message: e.to_string() }
                    }
                };
                emit(&listeners, &event);
            }),
        );
    }
}
