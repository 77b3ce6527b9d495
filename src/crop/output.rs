use image::{imageops, RgbaImage};

use crate::codec;
use crate::geometry::{PixelRect, ViewSize};

use super::rect::CropRect;
use super::{CropError, CropResult};

/// Maps a view-space rectangle onto source raster pixels.
///
/// Each corner is scaled by `source / view` per axis and truncated, then
/// clamped to the raster.
pub fn pixel_crop_rect(
    rect: &CropRect,
    view: ViewSize,
    source_width: u32,
    source_height: u32,
) -> CropResult<PixelRect> {
    if view.width <= 0 || view.height <= 0 {
        return Err(CropError::InvalidViewSize {
            width: view.width,
            height: view.height,
        });
    }
    if source_width == 0 || source_height == 0 {
        return Err(CropError::EmptySource);
    }

    let scale_x = source_width as f32 / view.width as f32;
    let scale_y = source_height as f32 / view.height as f32;
    let scale = |value: i32, factor: f32, limit: u32| -> u32 {
        let scaled = (value as f32 * factor) as i64;
        scaled.clamp(0, i64::from(limit)) as u32
    };

    let (lt, rb) = rect.corners();
    let left = scale(lt.x, scale_x, source_width);
    let top = scale(lt.y, scale_y, source_height);
    let right = scale(rb.x, scale_x, source_width);
    let bottom = scale(rb.y, scale_y, source_height);
    if right <= left || bottom <= top {
        return Err(CropError::EmptyCropRegion);
    }

    Ok(PixelRect::new(left, top, right - left, bottom - top))
}

pub fn crop_raster(source: &RgbaImage, rect: &CropRect, view: ViewSize) -> CropResult<RgbaImage> {
    let region = pixel_crop_rect(rect, view, source.width(), source.height())?;
    tracing::debug!(
        x = region.x,
        y = region.y,
        width = region.width,
        height = region.height,
        "crop region resolved in source pixels"
    );
    Ok(imageops::crop_imm(source, region.x, region.y, region.width, region.height).to_image())
}

/// Crops `source` to the view-space rectangle and returns the encoded JPEG bytes.
pub fn crop_to(
    source: &RgbaImage,
    rect: &CropRect,
    view: ViewSize,
    quality: u8,
) -> CropResult<Vec<u8>> {
    let cropped = crop_raster(source, rect, view)?;
    Ok(codec::encode_jpeg(&cropped, quality)?)
}
