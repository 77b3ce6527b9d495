use thiserror::Error;

use crate::geometry::{ImageBounds, PointerDelta, ViewPoint};

use super::handle::Handle;
use super::rect::CropRect;

/// Why a gesture step was not committed. Rejections are a normal part of
/// dragging against a limit; callers treat them as a no-op for that sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GestureRejection {
    #[error("corner {corner:?} would leave the image bounds {bounds:?}")]
    OutOfBounds {
        corner: ViewPoint,
        bounds: ImageBounds,
    },
    #[error("resulting size {width}x{height} is below the minimum of {min_size}")]
    BelowMinimumSize {
        width: i32,
        height: i32,
        min_size: i32,
    },
}

/// Moves only the coordinates owned by `handle`.
///
/// `TopRight` and `BottomLeft` own one axis of each stored corner: `TopRight`
/// moves `right_bottom.x` and `left_top.y`, `BottomLeft` moves `left_top.x` and
/// `right_bottom.y`.
fn tentative_corners(
    left_top: ViewPoint,
    right_bottom: ViewPoint,
    handle: Handle,
    delta: PointerDelta,
) -> (ViewPoint, ViewPoint) {
    let PointerDelta { dx, dy } = delta;
    let x_only = PointerDelta::new(dx, 0);
    let y_only = PointerDelta::new(0, dy);
    match handle {
        Handle::LeftEdge => (left_top.offset(x_only), right_bottom),
        Handle::RightEdge => (left_top, right_bottom.offset(x_only)),
        Handle::TopEdge => (left_top.offset(y_only), right_bottom),
        Handle::BottomEdge => (left_top, right_bottom.offset(y_only)),
        Handle::TopLeft => (left_top.offset(delta), right_bottom),
        Handle::BottomRight => (left_top, right_bottom.offset(delta)),
        Handle::TopRight => (left_top.offset(y_only), right_bottom.offset(x_only)),
        Handle::BottomLeft => (left_top.offset(x_only), right_bottom.offset(y_only)),
        Handle::Drag => (left_top.offset(delta), right_bottom.offset(delta)),
    }
}

/// Computes the rectangle that results from dragging `handle` by `delta`.
///
/// Validation runs bounds first, then minimum size, and stops at the first
/// failure. The input rectangle is never modified; on success the caller
/// commits the returned rectangle as a whole.
pub fn apply_handle(
    rect: &CropRect,
    handle: Handle,
    delta: PointerDelta,
    bounds: &ImageBounds,
    min_size: i32,
) -> Result<CropRect, GestureRejection> {
    let (left_top, right_bottom) = tentative_corners(
        rect.left_top(),
        rect.right_bottom(),
        handle,
        delta,
    );

    let corners = [
        left_top,
        ViewPoint::new(right_bottom.x, left_top.y),
        right_bottom,
        ViewPoint::new(left_top.x, right_bottom.y),
    ];
    if let Some(corner) = corners.into_iter().find(|corner| !bounds.contains(*corner)) {
        return Err(GestureRejection::OutOfBounds {
            corner,
            bounds: *bounds,
        });
    }

    CropRect::from_corners(left_top, right_bottom, min_size).ok_or(
        GestureRejection::BelowMinimumSize {
            width: right_bottom.x - left_top.x,
            height: right_bottom.y - left_top.y,
            min_size,
        },
    )
}
