use crate::geometry::ViewPoint;

use super::rect::CropRect;

/// Grab point of the crop rectangle targeted by a pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Drag,
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
    LeftEdge,
    RightEdge,
    TopEdge,
    BottomEdge,
}

impl Handle {
    pub const ALL: [Handle; 9] = [
        Self::Drag,
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
        Self::LeftEdge,
        Self::RightEdge,
        Self::TopEdge,
        Self::BottomEdge,
    ];

    pub const fn is_corner(self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopRight | Self::BottomRight | Self::BottomLeft
        )
    }

    pub const fn is_edge(self) -> bool {
        matches!(
            self,
            Self::LeftEdge | Self::RightEdge | Self::TopEdge | Self::BottomEdge
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Drag => "drag",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
            Self::LeftEdge => "left edge",
            Self::RightEdge => "right edge",
            Self::TopEdge => "top edge",
            Self::BottomEdge => "bottom edge",
        }
    }
}

const fn strictly_between(value: i32, low: i32, high: i32) -> bool {
    low < value && value < high
}

const fn near(value: i32, anchor: i32, buffer: i32) -> bool {
    strictly_between(value, anchor - buffer, anchor + buffer)
}

fn in_drag_zone(rect: &CropRect, point: ViewPoint, buffer: i32) -> bool {
    let center = rect.center();
    let half = buffer / 2;
    // The y band reaches a full buffer below center but only half above it.
    strictly_between(point.x, center.x - half, center.x + half)
        && strictly_between(point.y, center.y - half, center.y + buffer)
}

fn edge_at(rect: &CropRect, point: ViewPoint, buffer: i32) -> Option<Handle> {
    let (lt, rb) = rect.corners();
    let within_x_span = strictly_between(point.x, lt.x + buffer, rb.x - buffer);
    let within_y_span = strictly_between(point.y, lt.y + buffer, rb.y - buffer);

    if near(point.y, lt.y, buffer) && within_x_span {
        return Some(Handle::TopEdge);
    }
    if near(point.x, rb.x, buffer) && within_y_span {
        return Some(Handle::RightEdge);
    }
    if near(point.y, rb.y, buffer) && within_x_span {
        return Some(Handle::BottomEdge);
    }
    if near(point.x, lt.x, buffer) && within_y_span {
        return Some(Handle::LeftEdge);
    }
    None
}

fn corner_at(rect: &CropRect, point: ViewPoint, buffer: i32) -> Option<Handle> {
    let (lt, rb) = rect.corners();
    let corners = [
        (Handle::TopLeft, lt.x, lt.y),
        (Handle::TopRight, rb.x, lt.y),
        (Handle::BottomRight, rb.x, rb.y),
        (Handle::BottomLeft, lt.x, rb.y),
    ];
    corners
        .into_iter()
        .find(|&(_, x, y)| near(point.x, x, buffer) && near(point.y, y, buffer))
        .map(|(handle, _, _)| handle)
}

/// Resolves a pointer coordinate to exactly one handle.
///
/// The center drag zone wins over edges, edges win over corners, and anything
/// else falls back to [`Handle::Drag`].
pub fn classify(rect: &CropRect, point: ViewPoint, touch_buffer: i32) -> Handle {
    if in_drag_zone(rect, point, touch_buffer) {
        return Handle::Drag;
    }
    edge_at(rect, point, touch_buffer)
        .or_else(|| corner_at(rect, point, touch_buffer))
        .unwrap_or(Handle::Drag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BUFFER: i32 = 30;

    fn rect(left: i32, top: i32, right: i32, bottom: i32) -> CropRect {
        CropRect::from_corners(ViewPoint::new(left, top), ViewPoint::new(right, bottom), 1)
            .expect("valid rect")
    }

    fn classify_at(rect: &CropRect, x: i32, y: i32) -> Handle {
        classify(rect, ViewPoint::new(x, y), BUFFER)
    }

    #[test]
    fn classify_resolves_each_edge_midpoint() {
        let r = rect(100, 100, 400, 400);
        assert_eq!(classify_at(&r, 250, 100), Handle::TopEdge);
        assert_eq!(classify_at(&r, 400, 250), Handle::RightEdge);
        assert_eq!(classify_at(&r, 250, 400), Handle::BottomEdge);
        assert_eq!(classify_at(&r, 100, 250), Handle::LeftEdge);
    }

    #[test]
    fn classify_resolves_each_corner() {
        let r = rect(100, 100, 400, 400);
        assert_eq!(classify_at(&r, 105, 95), Handle::TopLeft);
        assert_eq!(classify_at(&r, 395, 105), Handle::TopRight);
        assert_eq!(classify_at(&r, 410, 410), Handle::BottomRight);
        assert_eq!(classify_at(&r, 90, 405), Handle::BottomLeft);
    }

    #[test]
    fn classify_excludes_corner_zone_from_edges() {
        let r = rect(100, 100, 400, 400);
        // x == left + buffer is outside both the edge span and the corner band.
        assert_eq!(classify_at(&r, 129, 100), Handle::TopLeft);
        assert_eq!(classify_at(&r, 130, 100), Handle::Drag);
        assert_eq!(classify_at(&r, 131, 100), Handle::TopEdge);
    }

    #[test]
    fn classify_prefers_drag_over_top_edge() {
        let r = rect(100, 100, 300, 200);
        let point = ViewPoint::new(200, 136);
        assert_eq!(edge_at(&r, point, 80), Some(Handle::TopEdge));
        assert!(in_drag_zone(&r, point, 80));
        assert_eq!(classify(&r, point, 80), Handle::Drag);
    }

    #[test]
    fn drag_zone_band_is_asymmetric_on_y() {
        let r = rect(100, 100, 300, 300);
        // center (200, 200); band is (185, 230) exclusive.
        assert!(in_drag_zone(&r, ViewPoint::new(200, 229), BUFFER));
        assert!(!in_drag_zone(&r, ViewPoint::new(200, 230), BUFFER));
        assert!(in_drag_zone(&r, ViewPoint::new(200, 186), BUFFER));
        assert!(!in_drag_zone(&r, ViewPoint::new(200, 185), BUFFER));
    }

    #[test]
    fn classify_falls_back_to_drag_far_from_every_handle() {
        let r = rect(100, 100, 400, 400);
        assert_eq!(classify_at(&r, 160, 330), Handle::Drag);
        assert_eq!(classify_at(&r, -500, 9000), Handle::Drag);
    }

    #[test]
    fn handle_all_partitions_into_drag_corners_and_edges() {
        let corners = Handle::ALL.iter().filter(|h| h.is_corner()).count();
        let edges = Handle::ALL.iter().filter(|h| h.is_edge()).count();
        assert_eq!(corners, 4);
        assert_eq!(edges, 4);
        assert!(!Handle::Drag.is_corner() && !Handle::Drag.is_edge());
    }

    proptest! {
        #[test]
        fn classify_always_returns_a_known_handle(
            left in -500i32..500,
            top in -500i32..500,
            width in 1i32..600,
            height in 1i32..600,
            x in -2000i32..2000,
            y in -2000i32..2000,
            buffer in 0i32..200,
        ) {
            let r = rect(left, top, left + width, top + height);
            let handle = classify(&r, ViewPoint::new(x, y), buffer);
            prop_assert!(Handle::ALL.contains(&handle));
        }

        #[test]
        fn points_in_drag_zone_always_classify_as_drag(
            width in 2i32..400,
            height in 2i32..400,
            buffer in 2i32..200,
            offset_x in -100i32..100,
            offset_y in -100i32..200,
        ) {
            let r = rect(0, 0, width, height);
            let point = ViewPoint::new(r.center().x + offset_x, r.center().y + offset_y);
            if in_drag_zone(&r, point, buffer) {
                prop_assert_eq!(classify(&r, point, buffer), Handle::Drag);
            }
        }
    }
}
