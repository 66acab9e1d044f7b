//! 2-D drawing surface used to compose the wallpaper.
//!
//! [`RasterCanvas`] draws straight into an RGBA buffer. Text uses the 8x8
//! bitmap glyphs from `font8x8`, scaled to the requested pixel size, so
//! composition needs no font files on the host.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{imageops, Rgba, RgbaImage};

use crate::error::{Result, WallpaperError};
use crate::geometry::ScreenGeometry;
use crate::layout::{Color, TextStyle, Weight};

const GLYPH_CELL: f32 = 8.0;
const FALLBACK_GLYPH: char = '?';

/// The finished pixel buffer handed to the wallpaper service.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedWallpaper {
    pixels: RgbaImage,
}

impl ComposedWallpaper {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Encode as PNG, for hosts that take a file or byte stream.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut out = std::io::Cursor::new(Vec::new());
        self.pixels
            .write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| WallpaperError::unexpected(format!("failed to encode wallpaper: {e}")))?;
        Ok(out.into_inner())
    }
}

/// Drawing operations the composition pipeline needs.
pub trait Canvas: Send {
    fn fill(&mut self, color: Color);
    /// Draw `image` with its top-left corner at (`left`, `top`), clipped to the surface.
    fn draw_image(&mut self, image: &RgbaImage, left: i64, top: i64);
    /// Draw `text` horizontally centred on `center_x` with its baseline at `baseline_y`.
    fn draw_text(&mut self, text: &str, center_x: f32, baseline_y: f32, style: &TextStyle);
    fn finish(self: Box<Self>) -> ComposedWallpaper;
}

/// Allocates a canvas covering the whole screen.
pub trait CanvasFactory: Send + Sync {
    fn allocate(&self, geometry: &ScreenGeometry) -> Result<Box<dyn Canvas>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RasterCanvasFactory;

impl CanvasFactory for RasterCanvasFactory {
    fn allocate(&self, geometry: &ScreenGeometry) -> Result<Box<dyn Canvas>> {
        Ok(Box::new(RasterCanvas::new(geometry.width_px, geometry.height_px)?))
    }
}

pub struct RasterCanvas {
    buffer: RgbaImage,
}

impl RasterCanvas {
    /// Allocate a transparent buffer, reporting allocation failure instead of aborting.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(4))
            .ok_or_else(|| {
                WallpaperError::unexpected(format!("wallpaper buffer {width}x{height} is too large"))
            })?;

        let mut raw: Vec<u8> = Vec::new();
        raw.try_reserve_exact(len).map_err(|e| {
            WallpaperError::unexpected(format!(
                "failed to allocate {width}x{height} wallpaper buffer: {e}"
            ))
        })?;
        raw.resize(len, 0);

        let buffer = RgbaImage::from_raw(width, height, raw).ok_or_else(|| {
            WallpaperError::unexpected("wallpaper buffer does not match its dimensions")
        })?;
        Ok(Self { buffer })
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        if x < 0 || y < 0 || x >= self.buffer.width() as i64 || y >= self.buffer.height() as i64 {
            return;
        }
        self.buffer.put_pixel(x as u32, y as u32, color);
    }

    fn draw_glyph(&mut self, rows: &[u8; 8], left: f32, top: f32, scale: f32, color: Rgba<u8>) {
        let x0 = left.floor() as i64;
        let y0 = top.floor() as i64;
        let x1 = (left + GLYPH_CELL * scale).ceil() as i64;
        let y1 = (top + GLYPH_CELL * scale).ceil() as i64;

        for py in y0..y1 {
            let gy = ((py as f32 + 0.5 - top) / scale).floor();
            if !(0.0..GLYPH_CELL).contains(&gy) {
                continue;
            }
            let row = rows[gy as usize];
            for px in x0..x1 {
                let gx = ((px as f32 + 0.5 - left) / scale).floor();
                if !(0.0..GLYPH_CELL).contains(&gx) {
                    continue;
                }
                // bit 0 is the leftmost column
                if row & (1 << gx as u32) != 0 {
                    self.put(px, py, color);
                }
            }
        }
    }
}

/// Width in pixels `text` occupies at `size`.
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size
}

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get(FALLBACK_GLYPH))
        .unwrap_or([0; 8])
}

impl Canvas for RasterCanvas {
    fn fill(&mut self, color: Color) {
        let rgba = color.rgba();
        for pixel in self.buffer.pixels_mut() {
            *pixel = rgba;
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, left: i64, top: i64) {
        imageops::overlay(&mut self.buffer, image, left, top);
    }

    fn draw_text(&mut self, text: &str, center_x: f32, baseline_y: f32, style: &TextStyle) {
        if text.is_empty() || style.size <= 0.0 {
            return;
        }
        let scale = style.size / GLYPH_CELL;
        let color = style.color.rgba();
        let mut left = center_x - text_width(text, style.size) / 2.0;
        let top = baseline_y - style.size;
        // double strike for bold
        let strike = match style.weight {
            Weight::Regular => 0.0,
            Weight::Bold => (scale / 2.0).max(1.0),
        };

        for c in text.chars() {
            let rows = glyph(c);
            self.draw_glyph(&rows, left, top, scale, color);
            if strike > 0.0 {
                self.draw_glyph(&rows, left + strike, top, scale, color);
            }
            left += style.size;
        }
    }

    fn finish(self: Box<Self>) -> ComposedWallpaper {
        ComposedWallpaper::new(self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(size: f32, weight: Weight) -> TextStyle {
        TextStyle { color: Color::rgb(0, 0, 0), size, weight }
    }

    fn count(image: &RgbaImage, color: Rgba<u8>) -> usize {
        image.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn fill_covers_every_pixel() {
        let mut canvas = Box::new(RasterCanvas::new(10, 6).unwrap());
        canvas.fill(Color::rgb(1, 2, 3));
        let out = canvas.finish();
        assert_eq!(out.dimensions(), (10, 6));
        assert_eq!(count(out.pixels(), Rgba([1, 2, 3, 255])), 60);
    }

    #[test]
    fn oversized_buffers_fail_cleanly() {
        let err = RasterCanvas::new(u32::MAX, u32::MAX).err().unwrap();
        assert_eq!(err.code(), "ERROR");
    }

    #[test]
    fn image_is_drawn_at_offset_and_clipped() {
        let mut canvas = Box::new(RasterCanvas::new(8, 8).unwrap());
        canvas.fill(Color::rgb(255, 255, 255));
        let red = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        canvas.draw_image(&red, 6, -2);
        let out = canvas.finish();
        assert_eq!(out.pixels().get_pixel(6, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.pixels().get_pixel(7, 1), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.pixels().get_pixel(5, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(count(out.pixels(), Rgba([255, 0, 0, 255])), 4);
    }

    #[test]
    fn text_stays_above_baseline_and_centered() {
        let mut canvas = Box::new(RasterCanvas::new(200, 100).unwrap());
        canvas.fill(Color::rgb(255, 255, 255));
        canvas.draw_text("HI", 100.0, 60.0, &style(16.0, Weight::Regular));
        let out = canvas.finish();

        let black = Rgba([0, 0, 0, 255]);
        let inked: Vec<(u32, u32)> = out
            .pixels()
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == black)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|&(x, y)| (44..60).contains(&y) && (84..116).contains(&x)));
    }

    #[test]
    fn bold_inks_more_than_regular() {
        let render = |weight| {
            let mut canvas = Box::new(RasterCanvas::new(300, 80).unwrap());
            canvas.fill(Color::rgb(255, 255, 255));
            canvas.draw_text("Network", 150.0, 60.0, &style(24.0, weight));
            count(canvas.finish().pixels(), Rgba([0, 0, 0, 255]))
        };
        assert!(render(Weight::Bold) > render(Weight::Regular));
    }

    #[test]
    fn overflowing_text_is_clipped() {
        let mut canvas = Box::new(RasterCanvas::new(20, 20).unwrap());
        canvas.draw_text(&"W".repeat(500), 10.0, 15.0, &style(12.0, Weight::Bold));
        assert_eq!(canvas.finish().dimensions(), (20, 20));
    }

    #[test]
    fn unknown_glyphs_fall_back() {
        assert_eq!(glyph('\u{1F600}'), glyph('?'));
        assert_ne!(glyph('é'), [0; 8]);
    }

    #[test]
    fn png_encoding_round_trips_dimensions() {
        let mut canvas = Box::new(RasterCanvas::new(12, 7).unwrap());
        canvas.fill(Color::rgb(9, 9, 9));
        let png = canvas.finish().to_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 7));
    }
}
