//! Enhancement parameters and the local tone/contrast pass applied per strip.

use image::{imageops, RgbaImage};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Added to every color channel, clamped to `0..=255`.
    pub brightness: i32,
    /// Contrast delta in percent; positive values increase contrast.
    pub contrast: f32,
    pub iterations: u32,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            brightness: 0,
            contrast: 3.0,
            iterations: 1,
        }
    }
}

impl EnhanceConfig {
    pub fn is_identity(&self) -> bool {
        self.iterations == 0 || (self.brightness == 0 && self.contrast == 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SharpenConfig {
    /// Weight of the 4-neighbour laplacian subtracted from each pixel.
    pub amount: f32,
    pub passes: u32,
}

impl Default for SharpenConfig {
    fn default() -> Self {
        Self {
            amount: 0.25,
            passes: 3,
        }
    }
}

/// Applies brightness then contrast, `iterations` times. Alpha is untouched.
pub fn enhance_strip(strip: RgbaImage, config: &EnhanceConfig) -> RgbaImage {
    if config.is_identity() {
        return strip;
    }
    let mut current = strip;
    for _ in 0..config.iterations {
        if config.brightness != 0 {
            current = imageops::brighten(&current, config.brightness);
        }
        if config.contrast != 0.0 {
            current = imageops::contrast(&current, config.contrast);
        }
    }
    current
}
