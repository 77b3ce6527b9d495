use image::RgbaImage;

use crate::geometry::{ImageBounds, PointerDelta, ViewPoint, ViewSize};

use super::constraint::{apply_handle, GestureRejection};
use super::handle::{classify, Handle};
use super::metrics::CropMetrics;
use super::output;
use super::rect::CropRect;
use super::{CropError, CropResult};

/// Live content-to-view transform of the displayed image.
///
/// Queried on every gesture step; the scale can change whenever the view is
/// resized, so it must not be cached by callers.
pub trait ContentTransform {
    /// Intrinsic size of the displayed content in content pixels.
    fn content_size(&self) -> (u32, u32);
    /// Current content-to-view scale factors `(x, y)`.
    fn scale(&self) -> (f32, f32);
}

/// Transform with explicitly stored scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTransform {
    pub content_width: u32,
    pub content_height: u32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl FixedTransform {
    pub const fn new(content_width: u32, content_height: u32, scale_x: f32, scale_y: f32) -> Self {
        Self {
            content_width,
            content_height,
            scale_x,
            scale_y,
        }
    }

    /// Uniform scale that fits the content inside `view`, as a centered image view does.
    pub fn fit_center(content_width: u32, content_height: u32, view: ViewSize) -> Self {
        let sx = view.width.max(1) as f32 / content_width.max(1) as f32;
        let sy = view.height.max(1) as f32 / content_height.max(1) as f32;
        let scale = sx.min(sy);
        Self::new(content_width, content_height, scale, scale)
    }
}

impl ContentTransform for FixedTransform {
    fn content_size(&self) -> (u32, u32) {
        (self.content_width, self.content_height)
    }

    fn scale(&self) -> (f32, f32) {
        (self.scale_x, self.scale_y)
    }
}

/// Visible image extent for `transform`, centered on the view.
pub fn image_bounds_for(view: ViewSize, transform: &impl ContentTransform) -> ImageBounds {
    let (content_width, content_height) = transform.content_size();
    let (scale_x, scale_y) = transform.scale();
    let scaled_width = (content_width as f32 * scale_x).round() as i32;
    let scaled_height = (content_height as f32 * scale_y).round() as i32;
    ImageBounds::centered(view.center(), scaled_width, scaled_height)
}

/// Result of feeding one pointer sample to a [`CropSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerResponse {
    /// Reference point recorded; nothing changed.
    Pressed,
    /// The step committed and a redraw was requested.
    Committed(Handle),
    /// The step was evaluated and rejected; the rectangle is unchanged.
    Rejected(Handle, GestureRejection),
    /// The sample was outside the touch area, arrived without a press, or no
    /// rectangle exists yet.
    Ignored,
    Released,
}

type RedrawHandler = Box<dyn FnMut(&CropRect)>;

/// Single-threaded crop gesture state: owns the rectangle and mutates it only
/// through [`apply_handle`].
pub struct CropSession<T> {
    metrics: CropMetrics,
    transform: T,
    view: Option<ViewSize>,
    rect: Option<CropRect>,
    previous: Option<ViewPoint>,
    on_redraw: Option<RedrawHandler>,
}

impl<T: ContentTransform> CropSession<T> {
    pub fn new(metrics: CropMetrics, transform: T) -> Self {
        Self {
            metrics,
            transform,
            view: None,
            rect: None,
            previous: None,
            on_redraw: None,
        }
    }

    pub fn set_redraw_handler(&mut self, handler: impl FnMut(&CropRect) + 'static) {
        self.on_redraw = Some(Box::new(handler));
    }

    pub const fn metrics(&self) -> CropMetrics {
        self.metrics
    }

    pub const fn rect(&self) -> Option<&CropRect> {
        self.rect.as_ref()
    }

    pub const fn view(&self) -> Option<ViewSize> {
        self.view
    }

    pub fn transform_mut(&mut self) -> &mut T {
        &mut self.transform
    }

    pub fn image_bounds(&self) -> Option<ImageBounds> {
        self.view.map(|view| image_bounds_for(view, &self.transform))
    }

    /// (Re)initializes the rectangle centered on a view of the given size.
    pub fn reset_rectangle(&mut self, view_width: i32, view_height: i32) -> CropResult<()> {
        let view = ViewSize::new(view_width, view_height);
        let rect = CropRect::centered_in(view, self.metrics.min_size)?;
        tracing::debug!(
            ?view,
            left_top = ?rect.left_top(),
            right_bottom = ?rect.right_bottom(),
            "crop rectangle reset"
        );
        self.view = Some(view);
        self.rect = Some(rect);
        self.previous = None;
        self.request_redraw();
        Ok(())
    }

    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> PointerResponse {
        self.previous = Some(ViewPoint::from_pointer(x, y));
        PointerResponse::Pressed
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> PointerResponse {
        let (Some(rect), Some(previous), Some(bounds)) =
            (self.rect, self.previous, self.image_bounds())
        else {
            return PointerResponse::Ignored;
        };

        let point = ViewPoint::from_pointer(x, y);
        let touch_buffer = self.metrics.touch_buffer;
        if !rect.contains_with_margin(point, touch_buffer) {
            return PointerResponse::Ignored;
        }

        let handle = classify(&rect, point, touch_buffer);
        let delta = PointerDelta::between(previous, point);
        self.previous = Some(point);

        match apply_handle(&rect, handle, delta, &bounds, self.metrics.min_size) {
            Ok(next) => {
                tracing::debug!(handle = handle.label(), ?delta, "gesture step committed");
                self.rect = Some(next);
                self.request_redraw();
                PointerResponse::Committed(handle)
            }
            Err(rejection) => {
                tracing::debug!(
                    handle = handle.label(),
                    ?delta,
                    %rejection,
                    "gesture step rejected"
                );
                PointerResponse::Rejected(handle, rejection)
            }
        }
    }

    pub fn handle_pointer_up(&mut self, _x: f32, _y: f32) -> PointerResponse {
        self.previous = None;
        PointerResponse::Released
    }

    /// Crops `source` to the current rectangle, mapped from the view size
    /// `view_width` x `view_height`, and returns encoded JPEG bytes.
    pub fn crop_to(
        &self,
        source: &RgbaImage,
        view_width: i32,
        view_height: i32,
        quality: u8,
    ) -> CropResult<Vec<u8>> {
        let rect = self.rect.ok_or(CropError::NoRectangle)?;
        output::crop_to(source, &rect, ViewSize::new(view_width, view_height), quality)
    }

    fn request_redraw(&mut self) {
        if let (Some(handler), Some(rect)) = (self.on_redraw.as_mut(), self.rect.as_ref()) {
            handler(rect);
        }
    }
}
