use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("No image data provided")]
    Empty,

    #[error("Unreadable image: {0}")]
    InvalidImage(#[from] image::ImageError),
}

/// An uploaded image on its way to the vision model
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Bytes sent as uploaded, whatever their format
    Raw(Vec<u8>),
    /// Bytes decoded and re-encoded as JPEG first
    Normalized(Vec<u8>),
    /// Text the client already base64-encoded
    Base64(String),
}

/// Produce the base64 payload embedded in the `data:image/jpeg;base64,` URI
pub fn encode(input: ImageInput) -> Result<String, EncodeError> {
    match input {
        ImageInput::Raw(bytes) => {
            if bytes.is_empty() {
                return Err(EncodeError::Empty);
            }
            Ok(general_purpose::STANDARD.encode(bytes))
        }
        ImageInput::Normalized(bytes) => {
            if bytes.is_empty() {
                return Err(EncodeError::Empty);
            }
            let jpeg = to_jpeg(&bytes)?;
            Ok(general_purpose::STANDARD.encode(jpeg))
        }
        ImageInput::Base64(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(EncodeError::Empty);
            }
            Ok(text.to_string())
        }
    }
}

/// Decode any supported format and re-encode it as baseline JPEG.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut out = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 4, Rgba([200, 120, 40, 128]));
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_raw_is_plain_base64() {
        assert_eq!(encode(ImageInput::Raw(b"hello".to_vec())).unwrap(), "aGVsbG8=");
    }

    #[test]
    fn test_normalized_png_becomes_jpeg() {
        let encoded = encode(ImageInput::Normalized(png_bytes())).unwrap();
        let bytes = general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_normalized_rejects_garbage() {
        let result = encode(ImageInput::Normalized(b"not an image".to_vec()));
        assert!(matches!(result, Err(EncodeError::InvalidImage(_))));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(matches!(encode(ImageInput::Raw(vec![])), Err(EncodeError::Empty)));
        assert!(matches!(encode(ImageInput::Normalized(vec![])), Err(EncodeError::Empty)));
        assert!(matches!(encode(ImageInput::Base64("  \n".into())), Err(EncodeError::Empty)));
    }

    #[test]
    fn test_base64_passthrough_is_trimmed() {
        assert_eq!(encode(ImageInput::Base64(" QUJD\n".into())).unwrap(), "QUJD");
    }
}
