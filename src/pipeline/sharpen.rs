use image::RgbaImage;
use rayon::prelude::*;

use crate::enhance::SharpenConfig;

const CHANNELS: usize = 4;

/// Sharpens with a 3x3 kernel (`1 + 4a` center, `-a` on the four neighbours).
///
/// Border pixels reuse their nearest in-bounds neighbour, so dimensions never
/// change. Rows are convolved in parallel on the current rayon pool.
pub fn sharpen(composite: &RgbaImage, config: &SharpenConfig) -> RgbaImage {
    let mut current = composite.clone();
    if config.amount == 0.0 {
        return current;
    }
    for _ in 0..config.passes {
        current = sharpen_pass(&current, config.amount);
    }
    current
}

fn sharpen_pass(source: &RgbaImage, amount: f32) -> RgbaImage {
    let (width, height) = source.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return source.clone();
    }

    let stride = w * CHANNELS;
    let src = source.as_raw();
    let center_weight = 1.0 + 4.0 * amount;
    let sample = |x: usize, y: usize, c: usize| f32::from(src[y * stride + x * CHANNELS + c]);
    let mut out = vec![0_u8; src.len()];

    out.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let up = y.saturating_sub(1);
            let down = (y + 1).min(h - 1);
            for x in 0..w {
                let left = x.saturating_sub(1);
                let right = (x + 1).min(w - 1);
                let base = x * CHANNELS;
                for c in 0..3 {
                    let neighbours = sample(left, y, c)
                        + sample(right, y, c)
                        + sample(x, up, c)
                        + sample(x, down, c);
                    let value = center_weight * sample(x, y, c) - amount * neighbours;
                    row_out[base + c] = value.round().clamp(0.0, 255.0) as u8;
                }
                // alpha
                row_out[base + 3] = src[y * stride + base + 3];
            }
        });

    RgbaImage::from_raw(width, height, out).unwrap_or_else(|| source.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn sharpen_leaves_flat_regions_unchanged() {
        let flat = RgbaImage::from_pixel(9, 7, Rgba([90, 140, 33, 255]));
        let sharpened = sharpen(&flat, &SharpenConfig::default());
        assert_eq!(sharpened, flat);
    }

    #[test]
    fn sharpen_increases_local_contrast_at_an_edge() {
        let mut raster = RgbaImage::from_pixel(6, 3, Rgba([100, 100, 100, 255]));
        for y in 0..3 {
            for x in 3..6 {
                raster.put_pixel(x, y, Rgba([160, 160, 160, 255]));
            }
        }
        let config = SharpenConfig {
            amount: 0.5,
            passes: 1,
        };
        let sharpened = sharpen(&raster, &config);
        // 3*100 - 0.5*(100 + 160 + 100 + 100)
        assert_eq!(sharpened.get_pixel(2, 1)[0], 70);
        // 3*160 - 0.5*(100 + 160 + 160 + 160)
        assert_eq!(sharpened.get_pixel(3, 1)[0], 190);
        assert_eq!(sharpened.get_pixel(0, 1)[0], 100);
        assert_eq!(sharpened.get_pixel(3, 1)[3], 255);
    }

    #[test]
    fn sharpen_preserves_dimensions_and_alpha() {
        let mut raster = RgbaImage::from_pixel(5, 11, Rgba([20, 40, 60, 128]));
        raster.put_pixel(2, 5, Rgba([250, 250, 250, 128]));
        let sharpened = sharpen(&raster, &SharpenConfig::default());
        assert_eq!(sharpened.dimensions(), (5, 11));
        assert!(sharpened.pixels().all(|pixel| pixel[3] == 128));
    }

    #[test]
    fn sharpen_with_zero_amount_is_a_copy() {
        let mut raster = RgbaImage::new(3, 3);
        raster.put_pixel(1, 1, Rgba([255, 0, 0, 255]));
        let config = SharpenConfig {
            amount: 0.0,
            passes: 4,
        };
        assert_eq!(sharpen(&raster, &config), raster);
    }

    #[test]
    fn single_row_and_column_rasters_are_handled() {
        let row = RgbaImage::from_pixel(7, 1, Rgba([9, 9, 9, 255]));
        assert_eq!(sharpen(&row, &SharpenConfig::default()), row);
        let column = RgbaImage::from_pixel(1, 7, Rgba([9, 9, 9, 255]));
        assert_eq!(sharpen(&column, &SharpenConfig::default()), column);
    }
}
