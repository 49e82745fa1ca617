mod types;
mod store;
mod zone;
mod components;

pub use types::*;
pub use store::RelationStore;
pub use zone::{ZonePalette, ZoneSpec};
pub use components::{order_axes, Component, Matrix};

impl From<MatrixData> for Matrix {
    fn from(data: MatrixData) -> Self {
        Matrix {
            relations: RelationStore::from_entries(&data.relations),
            axes: data.axes,
        }
    }
}

impl From<&Matrix> for MatrixData {
    fn from(matrix: &Matrix) -> Self {
        MatrixData {
            axes: matrix.axes.clone(),
            relations: matrix.relations.entries(),
        }
    }
}
