//! Raster decode/encode used at the persistence boundary.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use thiserror::Error;

/// Quality used for every persisted JPEG unless the config overrides it.
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

pub type CodecResult<T> = std::result::Result<T, CodecError>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to decode image")]
    Decode(#[source] image::ImageError),
    #[error("failed to open image: {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode jpeg at quality {quality}")]
    Encode {
        quality: u8,
        #[source]
        source: image::ImageError,
    },
}

pub fn decode_raster(bytes: &[u8]) -> CodecResult<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|image| image.to_rgba8())
        .map_err(CodecError::Decode)
}

pub fn open_raster(path: &Path) -> CodecResult<RgbaImage> {
    image::open(path)
        .map(|image| image.to_rgba8())
        .map_err(|source| CodecError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Encodes `raster` as JPEG. Alpha is dropped; JPEG has no alpha channel.
pub fn encode_jpeg(raster: &RgbaImage, quality: u8) -> CodecResult<Vec<u8>> {
    let quality = quality.clamp(1, 100);
    let rgb = DynamicImage::ImageRgba8(raster.clone()).to_rgb8();
    let mut bytes = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&rgb)
        .map_err(|source| CodecError::Encode { quality, source })?;
    Ok(bytes.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_preserves_dimensions() {
        let raster = RgbaImage::from_pixel(37, 21, image::Rgba([200, 120, 40, 255]));
        let bytes = encode_jpeg(&raster, DEFAULT_JPEG_QUALITY).expect("encode");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = decode_raster(&bytes).expect("decode");
        assert_eq!(decoded.dimensions(), (37, 21));
        let pixel = decoded.get_pixel(18, 10);
        assert!(pixel[0].abs_diff(200) <= 4);
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode_raster(b"not an image"),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn open_reports_missing_path() {
        let path = Path::new("/nonexistent/scancrop/missing.jpg");
        let err = open_raster(path).expect_err("missing file");
        assert!(matches!(err, CodecError::Open { path: ref p, .. } if p == path));
    }
}
