use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Result, XlrenderError};

/// Decoded RGBA pixels. Serializes as a base64 PNG string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageData {
    pixels: RgbaImage,
}

impl ImageData {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Decode PNG (or any enabled format) bytes.
    ///
    /// # Errors
    /// Returns [`XlrenderError::Image`] if the bytes are not a decodable image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self {
            pixels: decoded.to_rgba8(),
        })
    }

    /// Decode a base64 string holding image bytes.
    ///
    /// # Errors
    /// Returns [`XlrenderError::Other`] for invalid base64 and
    /// [`XlrenderError::Image`] for undecodable image data.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| XlrenderError::Other(format!("Invalid base64 image: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Encode as PNG bytes.
    ///
    /// # Errors
    /// Returns [`XlrenderError::Image`] if encoding fails.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.pixels.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    /// Encode as base64 PNG.
    ///
    /// # Errors
    /// Returns [`XlrenderError::Image`] if encoding fails.
    pub fn to_base64_png(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_png_bytes()?))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl TryFrom<String> for ImageData {
    type Error = XlrenderError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_base64(&s)
    }
}

impl From<ImageData> for String {
    fn from(img: ImageData) -> Self {
        // PNG encoding of an in-memory RGBA buffer only fails on allocation errors.
        img.to_base64_png().unwrap_or_default()
    }
}

/// An image anchored at a cell's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetImage {
    pub row: u32,
    pub col: u32,
    pub image: ImageData,
    /// Drawn size in points; the pixel size when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_base64_png_roundtrip() {
        let pixels = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let img = ImageData::new(pixels);
        let encoded = img.to_base64_png().unwrap();
        let back = ImageData::from_base64(&encoded).unwrap();
        assert_eq!(back, img);
        assert_eq!((back.width(), back.height()), (3, 2));
    }

    #[test]
    fn test_invalid_base64_is_an_error() {
        assert!(ImageData::from_base64("!!!").is_err());
        assert!(ImageData::from_base64("aGVsbG8=").is_err());
    }
}
