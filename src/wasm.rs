//! WASM bindings for the ponder-core library.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.
//! Data crosses the boundary as JSON strings. Storage stays on the JS side:
//! the host object passed to `DragSession` implements the load and save
//! calls and reports save completion through a callback.
//!
//! Drag events reach the host in two ways. Events raised while a
//! `DragSession` method is running are queued and returned by
//! `take_events`. Events raised afterwards (a save completing) are passed to
//! the host's `onDragEvent`, which may call back into the session.

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

use crate::error::StoreError;
use crate::interaction::{DiagramSession, DragEvent, PointerSample, Viewport};
use crate::layout::{layout_diagram, offsets_from_positions, DiagramConfig};
use crate::matrix::{AxisId, Component, Matrix, MatrixData, Position, ProjectId, RelationValue, ZonePalette};
use crate::output::DiagramOutput;
use crate::persistence::{DiagramStore, SaveCallback, SessionContext};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);

    /// Host object bridging to the backend.
    pub type DiagramHost;

    #[wasm_bindgen(method, js_name = loadMatrix)]
    fn host_load_matrix(this: &DiagramHost, token: Option<String>, project: f64) -> Option<String>;

    #[wasm_bindgen(method, js_name = loadPositions)]
    fn host_load_positions(this: &DiagramHost, token: Option<String>, project: f64) -> Option<String>;

    #[wasm_bindgen(method, js_name = savePositions)]
    fn host_save_positions(this: &DiagramHost, token: Option<String>, project: f64, positions: String, done: JsValue);

    #[wasm_bindgen(method, js_name = saveCell)]
    fn host_save_cell(
        this: &DiagramHost,
        token: Option<String>,
        project: f64,
        axis_a: f64,
        axis_b: f64,
        value: i32,
        done: JsValue,
    );

    #[wasm_bindgen(method, js_name = onDragEvent)]
    fn host_on_drag_event(this: &DiagramHost, event: String);
}

fn parse_json<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {what}: {e}"))
}

/// Empty input means "use the defaults".
fn parse_or_default<T: DeserializeOwned + Default>(json: &str, what: &str) -> Result<T, String> {
    if json.trim().is_empty() {
        return Ok(T::default());
    }
    parse_json(json, what)
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        console_error(&format!("Error serializing output: {e}"));
        "{\"error\": {\"message\": \"Serialization error\"}}".to_string()
    })
}

fn error_json(message: String) -> String {
    console_error(&message);
    to_json(&DiagramOutput::error(message))
}

fn load_config(config_json: &str) -> Result<DiagramConfig, String> {
    let cfg: DiagramConfig = parse_or_default(config_json, "config")?;
    cfg.validate().map_err(|e| e.to_string())?;
    Ok(cfg)
}

fn done_callback(done: SaveCallback) -> JsValue {
    Closure::once_into_js(move |error: Option<String>| {
        done(match error {
            None => Ok(()),
            Some(message) => Err(StoreError::Transport(message)),
        })
    })
}

fn load_from_host<T: DeserializeOwned>(json: Option<String>, project: ProjectId, what: &str) -> Result<T, StoreError> {
    let json = json.ok_or(StoreError::NotFound(project.0))?;
    parse_json(&json, what).map_err(StoreError::Rejected)
}

impl DiagramStore for DiagramHost {
    fn load_matrix(&self, ctx: &SessionContext, project: ProjectId) -> Result<MatrixData, StoreError> {
        load_from_host(self.host_load_matrix(ctx.token.clone(), project.0 as f64), project, "matrix")
    }

    fn load_positions(&self, ctx: &SessionContext, project: ProjectId) -> Result<Vec<Position>, StoreError> {
        load_from_host(self.host_load_positions(ctx.token.clone(), project.0 as f64), project, "positions")
    }

    fn save_positions(&self, ctx: &SessionContext, project: ProjectId, positions: Vec<Position>, done: SaveCallback) {
        self.host_save_positions(ctx.token.clone(), project.0 as f64, to_json(&positions), done_callback(done));
    }

    fn save_cell(
        &self,
        ctx: &SessionContext,
        project: ProjectId,
        axis_a: AxisId,
        axis_b: AxisId,
        value: RelationValue,
        done: SaveCallback,
    ) {
        self.host_save_cell(
            ctx.token.clone(),
            project.0 as f64,
            axis_a.0 as f64,
            axis_b.0 as f64,
            value.weight() as i32,
            done_callback(done),
        );
    }
}

/// Lay out a matrix. `positions_json` and `config_json` may be empty.
#[wasm_bindgen]
pub fn compute_diagram(matrix_json: &str, positions_json: &str, config_json: &str) -> String {
    let data: MatrixData = match parse_json(matrix_json, "matrix") {
        Ok(data) => data,
        Err(e) => return error_json(e),
    };
    let positions: Vec<Position> = match parse_or_default(positions_json, "positions") {
        Ok(positions) => positions,
        Err(e) => return error_json(e),
    };
    let cfg = match load_config(config_json) {
        Ok(cfg) => cfg,
        Err(e) => return error_json(e),
    };

    let matrix = Matrix::from(data);
    let offsets = offsets_from_positions(&positions);
    match layout_diagram(&matrix, &offsets, &ZonePalette::default(), &cfg) {
        Some(scene) => to_json(&DiagramOutput::ready(scene)),
        None => to_json(&DiagramOutput::not_enough_data()),
    }
}

/// Canonical zone name for free-text input.
#[wasm_bindgen]
pub fn normalize_zone(raw: &str) -> String {
    ZonePalette::default().normalize(raw)
}

/// Replace a matrix's components and return the new matrix as JSON.
/// On failure returns `{"error": {"message": ...}}`.
#[wasm_bindgen]
pub fn replace_components(matrix_json: &str, components_json: &str, first_id: f64) -> String {
    let data: MatrixData = match parse_json(matrix_json, "matrix") {
        Ok(data) => data,
        Err(e) => return error_json(e),
    };
    let components: Vec<Component> = match parse_json(components_json, "components") {
        Ok(components) => components,
        Err(e) => return error_json(e),
    };
    match Matrix::from(data).replace_components(&components, AxisId(first_id as u64)) {
        Ok(matrix) => to_json(&MatrixData::from(&matrix)),
        Err(e) => error_json(e.to_string()),
    }
}

/// A diagram with drag support, bound to one project.
#[wasm_bindgen]
pub struct DragSession {
    session: DiagramSession<Rc<DiagramHost>>,
}

#[wasm_bindgen]
impl DragSession {
    /// Bad config falls back to the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(host: DiagramHost, token: Option<String>, project: f64, config_json: &str) -> DragSession {
        let cfg = load_config(config_json).unwrap_or_else(|e| {
            console_error(&format!("{e}; using default config"));
            DiagramConfig::default()
        });
        let host = Rc::new(host);
        let listener_host = host.clone();
        let session = DiagramSession::new(
            host,
            SessionContext { token },
            ProjectId(project as u64),
            cfg,
            ZonePalette::default(),
            Box::new(move |event: &DragEvent| {
                report_save_failure(event);
                listener_host.host_on_drag_event(to_json(event));
            }),
        );
        DragSession { session }
    }

    /// Swap in new matrix and positions JSON. Returns the scene output.
    pub fn reload(&mut self, matrix_json: &str, positions_json: &str) -> String {
        let data: MatrixData = match parse_json(matrix_json, "matrix") {
            Ok(data) => data,
            Err(e) => return error_json(e),
        };
        let positions: Vec<Position> = match parse_or_default(positions_json, "positions") {
            Ok(positions) => positions,
            Err(e) => return error_json(e),
        };
        match self.session.reload(Matrix::from(data), offsets_from_positions(&positions)) {
            Ok(()) => self.scene(),
            Err(e) => error_json(e.to_string()),
        }
    }

    /// Load matrix and positions through the host. Returns the scene output.
    pub fn load(&mut self) -> String {
        match self.session.load() {
            Ok(()) => self.scene(),
            Err(e) => error_json(format!("Error loading diagram: {e}")),
        }
    }

    pub fn scene(&self) -> String {
        match self.session.scene() {
            Some(scene) => to_json(&DiagramOutput::ready(scene)),
            None => to_json(&DiagramOutput::not_enough_data()),
        }
    }

    /// Events raised during earlier calls, as a JSON array.
    pub fn take_events(&mut self) -> String {
        let events = self.session.take_events();
        events.iter().for_each(report_save_failure);
        to_json(&events)
    }

    pub fn pointer_down(&mut self, axis: f64) -> bool {
        self.session.pointer_down(AxisId(axis as u64))
    }

    /// Returns the updated scene, or None when nothing moved.
    pub fn pointer_move(
        &mut self,
        client_x: f64,
        client_y: f64,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Option<String> {
        let pointer = PointerSample { client_x, client_y };
        let viewport = Viewport { left, top, width, height };
        self.session.pointer_move(pointer, viewport)?;
        Some(self.scene())
    }

    pub fn pointer_up(&mut self) -> bool {
        self.session.pointer_up()
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.session.pointer_leave()
    }

    /// Set one relation cell (0, 2 or 4) and persist it. Returns the
    /// re-ranked scene output. Refused while a drag is active.
    pub fn edit_cell(&mut self, axis_a: f64, axis_b: f64, value: i32) -> String {
        let done: SaveCallback = Box::new(|result: Result<(), StoreError>| {
            if let Err(e) = result {
                console_error(&format!("Error saving cell: {e}"));
            }
        });
        let (a, b) = (AxisId(axis_a as u64), AxisId(axis_b as u64));
        match self.session.edit_cell(a, b, value as i64, done) {
            Ok(()) => self.scene(),
            Err(e) => error_json(e.to_string()),
        }
    }

    /// Persist pending offsets; call when the view is torn down.
    pub fn flush(&mut self) {
        self.session.flush();
    }
}

fn report_save_failure(event: &DragEvent) {
    if let DragEvent::SaveFailed { message } = event {
        console_error(&format!("Error saving positions: {message}"));
    }
}
