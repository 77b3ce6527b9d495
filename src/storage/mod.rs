use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

use crate::codec::{self, CodecError};

const CROPPED_SUFFIX: &str = "_cropped";
const CROPPED_EXTENSION: &str = "jpg";
const DEFAULT_STEM: &str = "image";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Persistence collaborator handed the final raster of a pipeline run.
pub trait RasterSink: Send + Sync {
    fn persist(&self, raster: &RgbaImage) -> StorageResult<()>;
}

/// Writes rasters as JPEG to one fixed path, replacing the previous contents.
#[derive(Debug, Clone)]
pub struct JpegFileSink {
    path: PathBuf,
    quality: u8,
}

impl JpegFileSink {
    pub const fn new(path: PathBuf, quality: u8) -> Self {
        Self { path, quality }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn quality(&self) -> u8 {
        self.quality
    }

    /// Writes already-encoded bytes to the sink's path.
    pub fn write_encoded(&self, bytes: &[u8]) -> StorageResult<()> {
        save_overwrite(&self.path, bytes)?;
        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "raster persisted");
        Ok(())
    }
}

impl RasterSink for JpegFileSink {
    fn persist(&self, raster: &RgbaImage) -> StorageResult<()> {
        let bytes = codec::encode_jpeg(raster, self.quality)?;
        self.write_encoded(&bytes)
    }
}

/// `<dir>/<stem>_cropped.jpg` next to `source`.
pub fn cropped_path_for(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(DEFAULT_STEM);
    source.with_file_name(format!("{stem}{CROPPED_SUFFIX}.{CROPPED_EXTENSION}"))
}

fn save_overwrite(destination: &Path, bytes: &[u8]) -> StorageResult<()> {
    let io_error = |source| StorageError::Io {
        path: destination.to_path_buf(),
        source,
    };

    if let Some(parent) = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    fs::write(destination, bytes).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("scancrop-storage-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn cropped_path_keeps_directory_and_replaces_extension() {
        assert_eq!(
            cropped_path_for(Path::new("/home/test/Pictures/receipt.png")),
            PathBuf::from("/home/test/Pictures/receipt_cropped.jpg")
        );
        assert_eq!(
            cropped_path_for(Path::new("scan.tar.jpeg")),
            PathBuf::from("scan.tar_cropped.jpg")
        );
    }

    #[test]
    fn cropped_path_without_stem_uses_placeholder() {
        assert_eq!(
            cropped_path_for(Path::new("/")),
            PathBuf::from("/image_cropped.jpg")
        );
    }

    #[test]
    fn jpeg_sink_creates_parent_dirs_and_overwrites() {
        let dir = scratch_dir("overwrite");
        let path = dir.join("nested").join("page_cropped.jpg");
        let sink = JpegFileSink::new(path.clone(), 90);

        sink.persist(&RgbaImage::from_pixel(8, 4, image::Rgba([1, 2, 3, 255])))
            .expect("first write");
        sink.persist(&RgbaImage::from_pixel(3, 5, image::Rgba([9, 9, 9, 255])))
            .expect("second write");

        let decoded = codec::open_raster(&path).expect("readable jpeg");
        assert_eq!(decoded.dimensions(), (3, 5));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_failure_reports_the_target_path() {
        let dir = scratch_dir("blocked");
        fs::create_dir_all(&dir).expect("scratch dir");
        let blocker = dir.join("not-a-dir");
        fs::write(&blocker, b"file").expect("blocker file");

        let sink = JpegFileSink::new(blocker.join("out.jpg"), 90);
        let err = sink
            .persist(&RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255])))
            .expect_err("parent is a file");
        assert!(matches!(err, StorageError::Io { ref path, .. } if path == &blocker.join("out.jpg")));
        let _ = fs::remove_dir_all(&dir);
    }
}
