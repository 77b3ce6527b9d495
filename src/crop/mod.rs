//! Interactive crop rectangle: geometry, hit testing, constraints and the
//! pointer gesture session that ties them together.

mod constraint;
mod handle;
mod metrics;
mod output;
mod rect;
mod session;

use thiserror::Error;

use crate::codec::CodecError;

pub use constraint::{apply_handle, GestureRejection};
pub use handle::{classify, Handle};
pub use metrics::{CropMetrics, DEFAULT_DENSITY_DPI, INITIAL_SIZE_DIVISOR};
pub use output::{crop_raster, crop_to, pixel_crop_rect};
pub use rect::CropRect;
pub use session::{
    image_bounds_for, ContentTransform, CropSession, FixedTransform, PointerResponse,
};

pub type CropResult<T> = std::result::Result<T, CropError>;

#[derive(Debug, Error)]
pub enum CropError {
    #[error("invalid view size {width}x{height}")]
    InvalidViewSize { width: i32, height: i32 },
    #[error("view {width}x{height} cannot fit the minimum crop size {min_size}")]
    ViewTooSmall {
        width: i32,
        height: i32,
        min_size: i32,
    },
    #[error("crop rectangle has not been initialized")]
    NoRectangle,
    #[error("source raster is empty")]
    EmptySource,
    #[error("crop rectangle does not overlap the source raster")]
    EmptyCropRegion,
    #[error(transparent)]
    Codec(#[from] CodecError),
}
