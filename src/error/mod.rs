use crate::canvas::CanvasError;
use crate::editor::EditorError;
use crate::generation::GenerationError;
use crate::storage::StorageError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
