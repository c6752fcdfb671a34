//! Thumbnail generation and upload type sniffing.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use pantry_core::constants::{THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH};
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("failed to read image: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode thumbnail: {0}")]
    Encode(#[source] image::ImageError),
}

/// Image formats accepted for catalog items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
        }
    }
}

/// Sniff the image type from its leading bytes. Only JPEG and PNG are recognised.
pub fn detect_image_type(data: &[u8]) -> Option<ImageKind> {
    match image::guess_format(data) {
        Ok(ImageFormat::Jpeg) => Some(ImageKind::Jpeg),
        Ok(ImageFormat::Png) => Some(ImageKind::Png),
        _ => None,
    }
}

/// Decode `data` with format auto-detection and resize it to exactly the thumbnail
/// dimensions, ignoring aspect ratio.
pub fn resize_to_thumbnail(data: &[u8]) -> Result<DynamicImage, ThumbnailError> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()
        .map_err(ThumbnailError::Decode)?;

    Ok(img.resize_exact(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, FilterType::Lanczos3))
}

/// Encode as baseline JPEG. Alpha is dropped.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ThumbnailError> {
    let mut buffer = Vec::new();
    let rgb = img.to_rgb8();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(&rgb)
        .map_err(ThumbnailError::Encode)?;
    Ok(buffer)
}
