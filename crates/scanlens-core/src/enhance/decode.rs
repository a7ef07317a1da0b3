//! Encoded-input decoding with content-based format detection and size limits.

use std::io::Cursor;

use image::{GenericImageView, ImageFormat};

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::frame::Frame;

/// Decoder for encoded captures (JPEG, PNG, WebP, BMP, TIFF, GIF).
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an in-memory capture into a frame.
    ///
    /// The format is detected from the content, never from a file name.
    pub fn decode(&self, bytes: &[u8]) -> Result<Frame, PipelineError> {
        if !has_image_signature(bytes) {
            return Err(PipelineError::invalid_input(
                "Unrecognized image format (invalid magic bytes)",
            ));
        }

        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::invalid_input(format!("Cannot detect image format: {e}")))?;
        let format = reader.format();
        let image = reader
            .decode()
            .map_err(|e| PipelineError::invalid_input(format!("Cannot decode image: {e}")))?;

        let (width, height) = image.dimensions();
        tracing::trace!(
            "Decoded {}x{} {}",
            width,
            height,
            format.map(format_to_string).unwrap_or("unknown")
        );

        let frame = Frame::from_dynamic(image);
        self.check_limits(&frame)?;
        Ok(frame)
    }

    /// Reject frames with no pixels or with a side over the configured maximum.
    pub fn check_limits(&self, frame: &Frame) -> Result<(), PipelineError> {
        if frame.is_empty() {
            return Err(PipelineError::invalid_input(format!(
                "frame has no pixels ({})",
                frame.size()
            )));
        }
        let max_dim = self.limits.max_image_dimension;
        if frame.width() > max_dim || frame.height() > max_dim {
            return Err(PipelineError::ImageTooLarge {
                width: frame.width(),
                height: frame.height(),
                max_dim,
            });
        }
        Ok(())
    }
}

/// Check if the header bytes match a supported image format.
fn has_image_signature(header: &[u8]) -> bool {
    if header.len() < 4 {
        return false;
    }

    // JPEG: FF D8 FF
    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return true;
    }

    // PNG: 89 50 4E 47
    if header.starts_with(&[0x89, b'P', b'N', b'G']) {
        return true;
    }

    // GIF: GIF8
    if header.starts_with(b"GIF8") {
        return true;
    }

    // WebP: RIFF....WEBP
    if header.starts_with(b"RIFF") {
        return header.len() >= 12 && &header[8..12] == b"WEBP";
    }

    // BMP: BM
    if header.starts_with(b"BM") {
        return true;
    }

    // TIFF: II*\0 (little-endian) or MM\0* (big-endian)
    header.starts_with(&[b'I', b'I', 0x2A, 0x00]) || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([1, 2, 3])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn decoder() -> ImageDecoder {
        ImageDecoder::new(LimitsConfig::default())
    }

    #[test]
    fn test_decodes_png() {
        let frame = decoder().decode(&png_bytes(7, 5)).unwrap();
        assert_eq!((frame.width(), frame.height()), (7, 5));
        assert!(!frame.is_single_channel());
    }

    #[test]
    fn test_rejects_garbage() {
        let err = decoder().decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));
        assert!(err.to_string().contains("magic bytes"));
    }

    #[test]
    fn test_rejects_truncated_png() {
        let bytes = png_bytes(16, 16);
        let err = decoder().decode(&bytes[..20]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));
    }

    #[test]
    fn test_rejects_oversized() {
        let decoder = ImageDecoder::new(LimitsConfig {
            max_image_dimension: 8,
            ..LimitsConfig::default()
        });
        let err = decoder.decode(&png_bytes(9, 4)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ImageTooLarge {
                width: 9,
                height: 4,
                max_dim: 8
            }
        ));
    }

    #[test]
    fn test_rejects_empty_frame() {
        let frame = Frame::from_dynamic(DynamicImage::new_luma8(0, 10));
        let err = decoder().check_limits(&frame).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));
    }

    #[test]
    fn test_signatures() {
        assert!(has_image_signature(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(has_image_signature(b"BM\0\0\0\0"));
        assert!(has_image_signature(b"II*\0rest"));
        assert!(has_image_signature(b"RIFF\0\0\0\0WEBP"));
        assert!(!has_image_signature(b"RIFF\0\0\0\0WAVE"));
        assert!(!has_image_signature(b"BM"));
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }
}
