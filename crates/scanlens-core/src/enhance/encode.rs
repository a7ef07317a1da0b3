//! Bitmap encoding for the submission collaborator.

use std::io::Cursor;

use image::{DynamicImage, GrayImage};

use crate::config::ImageEncoding;
use crate::error::PipelineError;

/// Encode the processed single-channel image.
pub fn encode(image: GrayImage, encoding: ImageEncoding) -> Result<Vec<u8>, PipelineError> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image)
        .write_to(&mut buffer, encoding.format())
        .map_err(|e| {
            PipelineError::invalid_input(format!("failed to encode {}: {e}", encoding.extension()))
        })?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_png_signature_and_roundtrip() {
        let img = GrayImage::from_fn(6, 4, |x, y| Luma([(x * 40 + y) as u8]));
        let bytes = encode(img.clone(), ImageEncoding::Png).unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);

        let decoded = image::load_from_memory(&bytes).unwrap().to_luma8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_bmp_signature() {
        let bytes = encode(GrayImage::new(3, 3), ImageEncoding::Bmp).unwrap();
        assert_eq!(&bytes[..2], b"BM");
    }
}
