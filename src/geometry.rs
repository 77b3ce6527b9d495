//! Shared geometric primitives used by the crop engine and the raster pipeline.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewPoint {
    pub x: i32,
    pub y: i32,
}

impl ViewPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Truncates pointer coordinates the way view events are sampled.
    pub fn from_pointer(x: f32, y: f32) -> Self {
        Self::new(x as i32, y as i32)
    }

    pub const fn offset(self, delta: PointerDelta) -> Self {
        Self::new(self.x.saturating_add(delta.dx), self.y.saturating_add(delta.dy))
    }

    pub const fn midpoint(a: Self, b: Self) -> Self {
        Self::new((a.x + b.x) / 2, (a.y + b.y) / 2)
    }
}

/// Pointer displacement between two sampled points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerDelta {
    pub dx: i32,
    pub dy: i32,
}

impl PointerDelta {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub const fn between(from: ViewPoint, to: ViewPoint) -> Self {
        Self::new(to.x.saturating_sub(from.x), to.y.saturating_sub(from.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSize {
    pub width: i32,
    pub height: i32,
}

impl ViewSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub const fn center(self) -> ViewPoint {
        ViewPoint::new(self.width / 2, self.height / 2)
    }
}

/// Visible extent of the displayed image inside the view, inclusive on every side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ImageBounds {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Centers a `scaled_width` x `scaled_height` image on `view_center`.
    pub const fn centered(view_center: ViewPoint, scaled_width: i32, scaled_height: i32) -> Self {
        let half_width = scaled_width / 2;
        let half_height = scaled_height / 2;
        Self::new(
            view_center.x - half_width,
            view_center.y - half_height,
            view_center.x + half_width,
            view_center.y + half_height,
        )
    }

    pub const fn contains(&self, point: ViewPoint) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}

/// Crop region in source raster pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }
}
