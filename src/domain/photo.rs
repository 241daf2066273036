//! Product photo validation and normalization.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat};
use thiserror::Error;

use crate::config::{MAX_PHOTO_BYTES, PHOTO_EXTENSIONS, PHOTO_MAX_HEIGHT, PHOTO_MAX_WIDTH};

/// Raw uploaded file
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PhotoUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoUpload")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Reasons an upload is refused. Shown inline on the photo field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhotoError {
    #[error("Photo size must not exceed 5MB")]
    TooLarge,

    #[error("Only JPG, PNG and GIF formats are supported")]
    UnsupportedFormat,

    #[error("Upload a valid image. The file is either not an image or corrupted")]
    Undecodable,
}

/// Encoding used for the stored photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoFormat {
    Png,
    Jpeg,
}

impl PhotoFormat {
    /// PNG uploads stay PNG, everything else is stored as JPEG.
    pub fn for_filename(filename: &str) -> Self {
        if filename.to_lowercase().ends_with(".png") {
            PhotoFormat::Png
        } else {
            PhotoFormat::Jpeg
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            PhotoFormat::Png => "png",
            PhotoFormat::Jpeg => "jpg",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            PhotoFormat::Png => ImageFormat::Png,
            PhotoFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Photo ready to be written to storage
#[derive(Debug, Clone)]
pub struct NormalizedPhoto {
    pub bytes: Vec<u8>,
    pub format: PhotoFormat,
    pub width: u32,
    pub height: u32,
}

impl PhotoUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Lowercased text after the last dot (the whole name if there is none).
    pub fn extension(&self) -> String {
        self.filename
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Size and extension checks, in that order.
    pub fn validate(&self) -> Result<(), PhotoError> {
        if self.bytes.len() > MAX_PHOTO_BYTES {
            return Err(PhotoError::TooLarge);
        }
        if !PHOTO_EXTENSIONS.contains(&self.extension().as_str()) {
            return Err(PhotoError::UnsupportedFormat);
        }
        Ok(())
    }

    /// Shrink to fit the stored photo box and re-encode.
    ///
    /// CPU bound; callers on the async runtime should run it on the blocking pool.
    pub fn normalize(&self) -> Result<NormalizedPhoto, PhotoError> {
        let image = image::load_from_memory(&self.bytes).map_err(|_| PhotoError::Undecodable)?;
        let image = fit_within(image, PHOTO_MAX_WIDTH, PHOTO_MAX_HEIGHT);

        let format = PhotoFormat::for_filename(&self.filename);
        let encoded = match format {
            PhotoFormat::Png => image,
            // JPEG has no alpha channel
            PhotoFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        };

        let mut buffer = Cursor::new(Vec::new());
        encoded
            .write_to(&mut buffer, format.image_format())
            .map_err(|e| {
                tracing::warn!("Photo re-encoding failed: {}", e);
                PhotoError::Undecodable
            })?;

        Ok(NormalizedPhoto {
            bytes: buffer.into_inner(),
            format,
            width: encoded.width(),
            height: encoded.height(),
        })
    }
}

/// Aspect-preserving shrink; images already inside the box are untouched.
fn fit_within(image: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if image.width() <= max_width && image.height() <= max_height {
        return image;
    }
    image.resize(max_width, max_height, FilterType::Lanczos3)
}
