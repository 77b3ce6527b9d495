use crate::geometry::{ViewPoint, ViewSize};

use super::metrics::INITIAL_SIZE_DIVISOR;
use super::{CropError, CropResult};

/// Crop rectangle in view coordinates.
///
/// A `CropRect` can only be built through [`CropRect::from_corners`] or
/// [`CropRect::centered_in`], both of which enforce `left_top < right_bottom` on
/// each axis and a side length of at least `min_size`. The center is derived on
/// construction, so every committed rectangle carries a matching center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    left_top: ViewPoint,
    right_bottom: ViewPoint,
    center: ViewPoint,
}

impl CropRect {
    pub fn from_corners(
        left_top: ViewPoint,
        right_bottom: ViewPoint,
        min_size: i32,
    ) -> Option<Self> {
        let width = right_bottom.x.checked_sub(left_top.x)?;
        let height = right_bottom.y.checked_sub(left_top.y)?;
        if width <= 0 || height <= 0 || width < min_size || height < min_size {
            return None;
        }
        Some(Self {
            left_top,
            right_bottom,
            center: ViewPoint::midpoint(left_top, right_bottom),
        })
    }

    /// Default box centered on the view, a quarter of the view on each axis and
    /// never smaller than `min_size`.
    pub fn centered_in(view: ViewSize, min_size: i32) -> CropResult<Self> {
        if view.width <= 0 || view.height <= 0 {
            return Err(CropError::InvalidViewSize {
                width: view.width,
                height: view.height,
            });
        }
        if view.width < min_size || view.height < min_size {
            return Err(CropError::ViewTooSmall {
                width: view.width,
                height: view.height,
                min_size,
            });
        }

        let width = (view.width / INITIAL_SIZE_DIVISOR).max(min_size).max(1);
        let height = (view.height / INITIAL_SIZE_DIVISOR).max(min_size).max(1);
        let left_top = ViewPoint::new((view.width - width) / 2, (view.height - height) / 2);
        let right_bottom = ViewPoint::new(left_top.x + width, left_top.y + height);

        Self::from_corners(left_top, right_bottom, min_size).ok_or(CropError::ViewTooSmall {
            width: view.width,
            height: view.height,
            min_size,
        })
    }

    pub const fn corners(&self) -> (ViewPoint, ViewPoint) {
        (self.left_top, self.right_bottom)
    }

    pub const fn left_top(&self) -> ViewPoint {
        self.left_top
    }

    pub const fn right_bottom(&self) -> ViewPoint {
        self.right_bottom
    }

    pub const fn center(&self) -> ViewPoint {
        self.center
    }

    pub const fn width(&self) -> i32 {
        self.right_bottom.x - self.left_top.x
    }

    pub const fn height(&self) -> i32 {
        self.right_bottom.y - self.left_top.y
    }

    /// True when `point` lies within the rectangle grown by `margin` on every side.
    pub const fn contains_with_margin(&self, point: ViewPoint, margin: i32) -> bool {
        point.x >= self.left_top.x - margin
            && point.x <= self.right_bottom.x + margin
            && point.y >= self.left_top.y - margin
            && point.y <= self.right_bottom.y + margin
    }
}
