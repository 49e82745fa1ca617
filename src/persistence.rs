//! Storage collaborator contracts.
//!
//! The core never persists anything itself. Loads are plain request/response
//! calls made before the pipeline runs. Saves are fire-and-forget: the caller
//! hands over the data plus a completion callback and carries on, and the
//! callback later reports success or failure. Nothing here retries.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{MatrixError, StoreError};
use crate::layout::{offsets_from_positions, OffsetMap};
use crate::matrix::{AxisId, Matrix, MatrixData, Position, ProjectId, RelationEntry, RelationValue};

/// Explicit session passed to every collaborator call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub token: Option<String>,
}

impl SessionContext {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()) }
    }
}

/// Completion callback of a fire-and-forget save.
pub type SaveCallback = Box<dyn FnOnce(Result<(), StoreError>)>;

pub trait DiagramStore {
    fn load_matrix(&self, ctx: &SessionContext, project: ProjectId) -> Result<MatrixData, StoreError>;

    fn load_positions(&self, ctx: &SessionContext, project: ProjectId) -> Result<Vec<Position>, StoreError>;

    fn save_positions(
        &self,
        ctx: &SessionContext,
        project: ProjectId,
        positions: Vec<Position>,
        done: SaveCallback,
    );

    fn save_cell(
        &self,
        ctx: &SessionContext,
        project: ProjectId,
        axis_a: AxisId,
        axis_b: AxisId,
        value: RelationValue,
        done: SaveCallback,
    );
}

impl<T: DiagramStore + ?Sized> DiagramStore for Rc<T> {
    fn load_matrix(&self, ctx: &SessionContext, project: ProjectId) -> Result<MatrixData, StoreError> {
        (**self).load_matrix(ctx, project)
    }

    fn load_positions(&self, ctx: &SessionContext, project: ProjectId) -> Result<Vec<Position>, StoreError> {
        (**self).load_positions(ctx, project)
    }

    fn save_positions(&self, ctx: &SessionContext, project: ProjectId, positions: Vec<Position>, done: SaveCallback) {
        (**self).save_positions(ctx, project, positions, done)
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
        (**self).save_cell(ctx, project, axis_a, axis_b, value, done)
    }
}

/// Load a project's matrix and saved offsets together.
pub fn load_diagram<S: DiagramStore + ?Sized>(
    store: &S,
    ctx: &SessionContext,
    project: ProjectId,
) -> Result<(Matrix, OffsetMap), StoreError> {
    let matrix = Matrix::from(store.load_matrix(ctx, project)?);
    let positions = store.load_positions(ctx, project)?;
    tracing::debug!(
        project = project.0,
        axes = matrix.axes.len(),
        relations = matrix.relations.len(),
        positions = positions.len(),
        "loaded diagram"
    );
    Ok((matrix, offsets_from_positions(&positions)))
}

/// Edit one relation cell from raw user input.
///
/// Values outside {0, 2, 4} are rejected before touching anything. A valid
/// value updates `matrix` immediately and is then handed to the store; the
/// outcome arrives through `done`.
#[allow(clippy::too_many_arguments)]
pub fn edit_cell<S: DiagramStore + ?Sized>(
    store: &S,
    ctx: &SessionContext,
    project: ProjectId,
    matrix: &mut Matrix,
    axis_a: AxisId,
    axis_b: AxisId,
    raw_value: i64,
    done: SaveCallback,
) -> Result<(), MatrixError> {
    let value = RelationValue::try_from(raw_value)?;
    matrix.relations.set(axis_a, axis_b, value)?;
    store.save_cell(ctx, project, axis_a, axis_b, value, Box::new(move |result: Result<(), StoreError>| {
        if let Err(e) = &result {
            tracing::warn!(error = %e, %axis_a, %axis_b, "saving relation cell failed");
        }
        done(result);
    }));
    Ok(())
}

#[derive(Debug, Default)]
struct MemoryProject {
    data: MatrixData,
    positions: Vec<Position>,
}

/// In-process store for headless use and tests. Completions run
/// synchronously. Set `fail_saves` to make every save report failure.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: RefCell<HashMap<ProjectId, MemoryProject>>,
    token: Option<String>,
    pub fail_saves: Cell<bool>,
    saves: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require this token on every call.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()), ..Self::default() }
    }

    pub fn insert_project(&self, project: ProjectId, data: MatrixData) {
        self.projects
            .borrow_mut()
            .insert(project, MemoryProject { data, positions: Vec::new() });
    }

    pub fn positions(&self, project: ProjectId) -> Vec<Position> {
        self.projects
            .borrow()
            .get(&project)
            .map(|p| p.positions.clone())
            .unwrap_or_default()
    }

    pub fn relations(&self, project: ProjectId) -> Vec<RelationEntry> {
        self.projects
            .borrow()
            .get(&project)
            .map(|p| p.data.relations.clone())
            .unwrap_or_default()
    }

    /// Number of save requests received, failed ones included.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    fn authorize(&self, ctx: &SessionContext) -> Result<(), StoreError> {
        match &self.token {
            Some(expected) if ctx.token.as_ref() != Some(expected) => Err(StoreError::Unauthorized),
            _ => Ok(()),
        }
    }

    fn write<F>(&self, ctx: &SessionContext, project: ProjectId, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut MemoryProject),
    {
        self.saves.set(self.saves.get() + 1);
        self.authorize(ctx)?;
        if self.fail_saves.get() {
            return Err(StoreError::Transport("save failed".to_string()));
        }
        let mut projects = self.projects.borrow_mut();
        let entry = projects.get_mut(&project).ok_or(StoreError::NotFound(project.0))?;
        f(entry);
        Ok(())
    }
}

impl DiagramStore for MemoryStore {
    fn load_matrix(&self, ctx: &SessionContext, project: ProjectId) -> Result<MatrixData, StoreError> {
        self.authorize(ctx)?;
        self.projects
            .borrow()
            .get(&project)
            .map(|p| p.data.clone())
            .ok_or(StoreError::NotFound(project.0))
    }

    fn load_positions(&self, ctx: &SessionContext, project: ProjectId) -> Result<Vec<Position>, StoreError> {
        self.authorize(ctx)?;
        self.projects
            .borrow()
            .get(&project)
            .map(|p| p.positions.clone())
            .ok_or(StoreError::NotFound(project.0))
    }

    fn save_positions(&self, ctx: &SessionContext, project: ProjectId, positions: Vec<Position>, done: SaveCallback) {
        let result = self.write(ctx, project, |p| {
            // Upsert by axis id.
            for pos in positions {
                match p.positions.iter_mut().find(|q| q.axis_id == pos.axis_id) {
                    Some(existing) => existing.angle_offset = pos.angle_offset,
                    None => p.positions.push(pos),
                }
            }
        });
        done(result);
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
        let result = self.write(ctx, project, |p| {
            p.data.relations.retain(|e| {
                !((e.axis_a == axis_a && e.axis_b == axis_b) || (e.axis_a == axis_b && e.axis_b == axis_a))
            });
            p.data.relations.push(RelationEntry { axis_a, axis_b, value });
        });
        done(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Axis;

    fn sample() -> MatrixData {
        MatrixData {
            axes: vec![
                Axis { id: AxisId(1), name: "Sala".into(), zone: "Social".into(), order: 0 },
                Axis { id: AxisId(2), name: "Cocina".into(), zone: "Servicio".into(), order: 1 },
            ],
            relations: vec![RelationEntry { axis_a: AxisId(1), axis_b: AxisId(2), value: RelationValue::Desired }],
        }
    }

    fn capture() -> (Rc<RefCell<Vec<Result<(), StoreError>>>>, impl Fn() -> SaveCallback) {
        let results = Rc::new(RefCell::new(Vec::new()));
        let sink = results.clone();
        let make = move || -> SaveCallback {
            let sink = sink.clone();
            Box::new(move |r: Result<(), StoreError>| sink.borrow_mut().push(r))
        };
        (results, make)
    }

    #[test]
    fn test_load_diagram() {
        let store = MemoryStore::new();
        store.insert_project(ProjectId(7), sample());
        let ctx = SessionContext::default();
        let (matrix, offsets) = load_diagram(&store, &ctx, ProjectId(7)).unwrap();
        assert_eq!(matrix.axes.len(), 2);
        assert_eq!(matrix.relations.get(AxisId(2), AxisId(1)), RelationValue::Desired);
        assert!(offsets.is_empty());
        assert_eq!(load_diagram(&store, &ctx, ProjectId(8)).unwrap_err(), StoreError::NotFound(8));
    }

    #[test]
    fn test_token_is_checked() {
        let store = MemoryStore::with_token("secret");
        store.insert_project(ProjectId(1), sample());
        assert_eq!(
            store.load_matrix(&SessionContext::default(), ProjectId(1)).unwrap_err(),
            StoreError::Unauthorized
        );
        assert!(store.load_matrix(&SessionContext::with_token("secret"), ProjectId(1)).is_ok());
    }

    #[test]
    fn test_edit_cell_rejects_invalid_values_before_saving() {
        let store = MemoryStore::new();
        store.insert_project(ProjectId(1), sample());
        let mut matrix = Matrix::from(sample());
        let (results, make) = capture();

        let err = edit_cell(&store, &SessionContext::default(), ProjectId(1), &mut matrix, AxisId(1), AxisId(2), 3, make())
            .unwrap_err();
        assert_eq!(err, MatrixError::InvalidRelationValue(3));
        assert_eq!(store.save_count(), 0);
        assert!(results.borrow().is_empty());
        assert_eq!(matrix.relations.get(AxisId(1), AxisId(2)), RelationValue::Desired);
    }

    #[test]
    fn test_edit_cell_updates_memory_then_store() {
        let store = MemoryStore::new();
        store.insert_project(ProjectId(1), sample());
        let mut matrix = Matrix::from(sample());
        let (results, make) = capture();

        edit_cell(&store, &SessionContext::default(), ProjectId(1), &mut matrix, AxisId(2), AxisId(1), 4, make()).unwrap();
        assert_eq!(matrix.relations.get(AxisId(1), AxisId(2)), RelationValue::Necessary);
        assert_eq!(results.borrow().as_slice(), &[Ok(())]);
        let saved = store.relations(ProjectId(1));
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].value, RelationValue::Necessary);
    }

    #[test]
    fn test_failed_save_keeps_memory_state_and_reports() {
        let store = MemoryStore::new();
        store.insert_project(ProjectId(1), sample());
        store.fail_saves.set(true);
        let mut matrix = Matrix::from(sample());
        let (results, make) = capture();

        edit_cell(&store, &SessionContext::default(), ProjectId(1), &mut matrix, AxisId(1), AxisId(2), 0, make()).unwrap();
        assert_eq!(matrix.relations.get(AxisId(1), AxisId(2)), RelationValue::None);
        assert!(matches!(results.borrow()[0], Err(StoreError::Transport(_))));
        assert_eq!(store.relations(ProjectId(1))[0].value, RelationValue::Desired);
    }

    #[test]
    fn test_save_positions_upserts() {
        let store = MemoryStore::new();
        store.insert_project(ProjectId(1), sample());
        let ctx = SessionContext::default();
        let (_, make) = capture();
        store.save_positions(&ctx, ProjectId(1), vec![Position { axis_id: AxisId(1), angle_offset: 0.1 }], make());
        store.save_positions(
            &ctx,
            ProjectId(1),
            vec![
                Position { axis_id: AxisId(1), angle_offset: 0.2 },
                Position { axis_id: AxisId(2), angle_offset: -0.2 },
            ],
            make(),
        );
        let saved = store.positions(ProjectId(1));
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].angle_offset, 0.2);
    }
}
