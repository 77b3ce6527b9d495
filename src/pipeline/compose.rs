use image::{imageops, RgbaImage};

use super::{PipelineError, PipelineResult};

/// Reassembles strips top to bottom in slice order.
///
/// The composite height is the exact sum of the strip heights. Every strip must
/// share the width of the first one.
pub fn compose_strips(strips: &[RgbaImage]) -> PipelineResult<RgbaImage> {
    let Some(first) = strips.first() else {
        return Err(PipelineError::MalformedRaster {
            width: 0,
            height: 0,
        });
    };
    let width = first.width();
    if let Some((index, strip)) = strips
        .iter()
        .enumerate()
        .find(|(_, strip)| strip.width() != width)
    {
        return Err(PipelineError::StripWidthMismatch {
            index,
            expected: width,
            actual: strip.width(),
        });
    }

    let height: u32 = strips.iter().map(RgbaImage::height).sum();
    let mut composite = RgbaImage::new(width, height);
    let mut offset = 0_u32;
    for strip in strips {
        imageops::replace(&mut composite, strip, 0, i64::from(offset));
        offset += strip.height();
    }
    Ok(composite)
}
