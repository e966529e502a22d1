//! Canvas flattening
//!
//! The drawing surface delivers RGBA pixels with a transparent background.
//! JPEG has no alpha channel, so the buffer is composited over opaque white
//! before encoding, using alpha as the blend mask.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::{Error, Result};

/// JPEG quality used for all stored drawings
pub const JPEG_QUALITY: u8 = 95;

/// Raw RGBA8 pixel buffer from the drawing surface (row-major)
#[derive(Debug, Clone)]
pub struct RgbaCanvas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaCanvas {
    /// Create a canvas, validating buffer length against the dimensions
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::Image(format!(
                "Pixel buffer length {} does not match {}x{} RGBA ({} bytes expected)",
                pixels.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// True when nothing was ever drawn: no buffer, or every pixel fully
    /// transparent. Callers reject blank submissions before flattening.
    pub fn is_blank(&self) -> bool {
        self.pixels.is_empty() || self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// Composite the canvas over opaque white and encode as JPEG.
///
/// Per-channel blend: `out = (src * a + 255 * (255 - a)) / 255`, rounded.
/// Fully transparent pixels become pure white; partially transparent pixels
/// blend proportionally to alpha.
pub fn flatten_to_jpeg(canvas: &RgbaCanvas) -> Result<Vec<u8>> {
    let mut rgb = Vec::with_capacity(canvas.width as usize * canvas.height as usize * 3);

    for px in canvas.pixels.chunks_exact(4) {
        let a = px[3] as u32;
        for c in 0..3 {
            let blended = (px[c] as u32 * a + 255 * (255 - a) + 127) / 255;
            rgb.push(blended as u8);
        }
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode(&rgb, canvas.width, canvas.height, ExtendedColorType::Rgb8)
        .map_err(|e| Error::Image(format!("JPEG encode failed: {}", e)))?;

    Ok(jpeg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn solid_canvas(width: u32, height: u32, rgba: [u8; 4]) -> RgbaCanvas {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        RgbaCanvas::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_buffer_length_mismatch_rejected() {
        let result = RgbaCanvas::new(400, 400, vec![0u8; 16]);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_detection() {
        let transparent = solid_canvas(8, 8, [0, 0, 0, 0]);
        assert!(transparent.is_blank());

        let drawn = solid_canvas(8, 8, [0, 0, 0, 255]);
        assert!(!drawn.is_blank());
    }

    #[test]
    fn test_opaque_black_flattens_to_black_jpeg() {
        let canvas = solid_canvas(400, 400, [0, 0, 0, 255]);
        let jpeg = flatten_to_jpeg(&canvas).unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (400, 400));

        // JPEG is lossy; allow a small tolerance around pure black
        let px = decoded.get_pixel(200, 200);
        assert!(px[0] < 8 && px[1] < 8 && px[2] < 8, "not black: {:?}", px);
    }

    #[test]
    fn test_all_transparent_flattens_to_white() {
        let canvas = solid_canvas(400, 400, [0, 0, 0, 0]);
        let jpeg = flatten_to_jpeg(&canvas).unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (400, 400));

        let px = decoded.get_pixel(200, 200);
        assert!(
            px[0] > 247 && px[1] > 247 && px[2] > 247,
            "not white: {:?}",
            px
        );
    }

    #[test]
    fn test_partial_alpha_blends_toward_white() {
        // 50% alpha black over white lands near mid-gray
        let canvas = solid_canvas(16, 16, [0, 0, 0, 128]);
        let jpeg = flatten_to_jpeg(&canvas).unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap();
        let px = decoded.get_pixel(8, 8);
        assert!(px[0] > 110 && px[0] < 145, "unexpected blend: {:?}", px);
    }
}
