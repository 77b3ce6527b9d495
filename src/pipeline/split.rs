use image::{imageops, RgbaImage};

use super::{PipelineError, PipelineResult};

/// Row height shared by every strip, `height / strip_count` rounded down.
pub fn strip_height(height: u32, strip_count: usize) -> u32 {
    match u32::try_from(strip_count) {
        Ok(0) | Err(_) => 0,
        Ok(count) => height / count,
    }
}

/// Partitions `source` into `strip_count` horizontal strips of equal height.
///
/// Strip `i` starts at row `i * strip_height`. When the height does not divide
/// evenly the trailing `height % strip_count` rows are not part of any strip.
pub fn split_into_strips(source: &RgbaImage, strip_count: usize) -> PipelineResult<Vec<RgbaImage>> {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(PipelineError::MalformedRaster { width, height });
    }
    let strip_height = strip_height(height, strip_count);
    if strip_height == 0 {
        return Err(PipelineError::ZeroHeightStrips {
            height,
            strips: strip_count,
        });
    }

    let dropped_rows = height - strip_height * strip_count as u32;
    if dropped_rows > 0 {
        tracing::debug!(
            height,
            strips = strip_count,
            strip_height,
            dropped_rows,
            "trailing rows fall outside the last strip"
        );
    }

    Ok((0..strip_count as u32)
        .map(|index| {
            imageops::crop_imm(source, 0, index * strip_height, width, strip_height).to_image()
        })
        .collect())
}
