use thiserror::Error;

use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::crop::{CropError, Handle, PointerResponse};
use crate::pipeline::PipelineError;
use crate::storage::StorageError;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Crop(#[from] CropError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{handle:?} gesture stopped before reaching its target: {response:?}")]
    Gesture {
        handle: Handle,
        response: PointerResponse,
    },
}
