pub mod codec;
pub mod config;
pub mod crop;
pub mod enhance;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod pipeline;
pub mod storage;

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

pub use error::{AppError, AppResult};

use config::AppConfig;
use crop::{CropRect, CropSession, FixedTransform, Handle, PointerResponse};
use geometry::{ImageBounds, ViewPoint, ViewSize};
use pipeline::{run_enhancement_pipeline, EnhancementPipeline};
use storage::{cropped_path_for, JpegFileSink};

/// One crop-and-enhance run over a photo on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropRequest {
    pub source: PathBuf,
    /// View the photo is displayed in; defaults to the photo's own size.
    pub view: Option<ViewSize>,
    /// Target rectangle `[left, top, right, bottom]` in view coordinates,
    /// clamped to the displayed image. Defaults to the whole image.
    pub rect: Option<[i32; 4]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub output: PathBuf,
    pub rect: CropRect,
    pub final_size: (u32, u32),
}

/// Entrypoint used by the CLI binding.
///
/// The crop rectangle is positioned with the same pointer gestures a user
/// would make, the crop is written to `<stem>_cropped.jpg`, and the enhanced
/// result then overwrites that file.
pub fn run(request: &CropRequest, config: &AppConfig) -> AppResult<RunReport> {
    let source = codec::open_raster(&request.source)?;
    let view = request.view.unwrap_or_else(|| {
        ViewSize::new(
            i32::try_from(source.width()).unwrap_or(i32::MAX),
            i32::try_from(source.height()).unwrap_or(i32::MAX),
        )
    });
    tracing::info!(
        source = %request.source.display(),
        width = source.width(),
        height = source.height(),
        ?view,
        "cropping photo"
    );

    let transform = FixedTransform::fit_center(source.width(), source.height(), view);
    let mut session = CropSession::new(config.crop_metrics(), transform);
    session.reset_rectangle(view.width, view.height)?;
    let rect = position_rectangle(&mut session, request.rect)?;

    let bytes = session.crop_to(&source, view.width, view.height, config.jpeg_quality)?;
    drop(source);
    let output = cropped_path_for(&request.source);
    let sink = JpegFileSink::new(output.clone(), config.jpeg_quality);
    sink.write_encoded(&bytes)?;
    let cropped = codec::decode_raster(&bytes)?;

    let pipeline = EnhancementPipeline::new(config.pipeline_config(), Arc::new(sink))?;
    let final_size = Rc::new(Cell::new((0, 0)));
    let final_size_slot = Rc::clone(&final_size);
    run_enhancement_pipeline(
        cropped,
        &pipeline,
        |progress| tracing::info!(?progress, "{}", progress.message()),
        move |final_raster| final_size_slot.set(final_raster.dimensions()),
    )
    .wait()?;

    tracing::info!(output = %output.display(), "enhanced crop saved");
    Ok(RunReport {
        output,
        rect,
        final_size: final_size.get(),
    })
}

/// Opens the rectangle to the full image, then pulls the top-left and
/// bottom-right corners onto `target`.
fn position_rectangle(
    session: &mut CropSession<FixedTransform>,
    target: Option<[i32; 4]>,
) -> AppResult<CropRect> {
    if let Some(bounds) = session.image_bounds() {
        drag_corner(session, Handle::TopLeft, ViewPoint::new(bounds.left, bounds.top))?;
        drag_corner(session, Handle::BottomRight, ViewPoint::new(bounds.right, bounds.bottom))?;

        if let Some([left, top, right, bottom]) = target {
            let left_top = clamp_to(&bounds, ViewPoint::new(left, top));
            let right_bottom = clamp_to(&bounds, ViewPoint::new(right, bottom));
            drag_corner(session, Handle::TopLeft, left_top)?;
            drag_corner(session, Handle::BottomRight, right_bottom)?;
        }
    }
    session.rect().copied().ok_or(AppError::Crop(crop::CropError::NoRectangle))
}

fn clamp_to(bounds: &ImageBounds, point: ViewPoint) -> ViewPoint {
    ViewPoint::new(
        point.x.clamp(bounds.left, bounds.right),
        point.y.clamp(bounds.top, bounds.bottom),
    )
}

fn drag_corner(
    session: &mut CropSession<FixedTransform>,
    handle: Handle,
    target: ViewPoint,
) -> AppResult<()> {
    let anchor = session.rect().map(|rect| match handle {
        Handle::TopLeft => rect.left_top(),
        _ => rect.right_bottom(),
    });
    let Some(mut at) = anchor else {
        return Err(AppError::Crop(crop::CropError::NoRectangle));
    };
    let step = (session.metrics().touch_buffer / 2).max(1);

    session.handle_pointer_down(at.x as f32, at.y as f32);
    while at != target {
        let next = ViewPoint::new(
            step_toward(at.x, target.x, step),
            step_toward(at.y, target.y, step),
        );
        let response = session.handle_pointer_move(next.x as f32, next.y as f32);
        if response != PointerResponse::Committed(handle) {
            session.handle_pointer_up(next.x as f32, next.y as f32);
            return Err(AppError::Gesture { handle, response });
        }
        at = next;
    }
    session.handle_pointer_up(at.x as f32, at.y as f32);
    Ok(())
}

fn step_toward(from: i32, to: i32, step: i32) -> i32 {
    if from < to {
        from.saturating_add(step).min(to)
    } else {
        from.saturating_sub(step).max(to)
    }
}
