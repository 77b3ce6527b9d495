pub const DEFAULT_DENSITY_DPI: u32 = 160;

/// Initial box is this fraction (1/n) of the view on each axis.
pub const INITIAL_SIZE_DIVISOR: i32 = 4;

/// Density-scaled sizes that drive hit testing and the minimum crop size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropMetrics {
    pub min_size: i32,
    pub touch_buffer: i32,
}

impl CropMetrics {
    pub const fn new(min_size: i32, touch_buffer: i32) -> Self {
        Self {
            min_size,
            touch_buffer,
        }
    }

    pub fn from_density(density_dpi: u32) -> Self {
        let dpi = i32::try_from(density_dpi.max(1)).unwrap_or(i32::MAX);
        Self::new(dpi, dpi / 3)
    }
}

impl Default for CropMetrics {
    fn default() -> Self {
        Self::from_density(DEFAULT_DENSITY_DPI)
    }
}
