use serde::{Deserialize, Serialize};

use crate::error::{Result, WallpaperError};
use crate::layout::LayoutConfig;

/// Baseline density Android scales density-independent pixels against.
pub const BASELINE_DPI: u32 = 160;

/// Physical screen metrics, read fresh for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenGeometry {
    pub width_px: u32,
    pub height_px: u32,
    pub density_dpi: u32,
}

impl ScreenGeometry {
    pub fn new(width_px: u32, height_px: u32, density_dpi: u32) -> Self {
        Self { width_px, height_px, density_dpi }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width_px == 0 || self.height_px == 0 {
            return Err(WallpaperError::unexpected(format!(
                "invalid screen geometry {}x{}",
                self.width_px, self.height_px
            )));
        }
        Ok(())
    }

    /// One physical inch in pixels. `(dpi / 160) * 160` collapses to the dpi itself.
    pub fn one_inch_px(&self) -> f32 {
        (self.density_dpi as f32 / BASELINE_DPI as f32) * BASELINE_DPI as f32
    }

    pub fn center_x(&self) -> f32 {
        (self.width_px / 2) as f32
    }
}

impl Default for ScreenGeometry {
    /// Common portrait phone resolution, used when the host cannot report one.
    fn default() -> Self {
        Self::new(1080, 1920, 420)
    }
}

/// Square region the fetched image is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub left: i64,
    pub top: i64,
    pub size: u32,
}

impl Placement {
    /// Centre the square image on the screen.
    ///
    /// The side is `image_width_ratio` of the screen width, at least one
    /// pixel. On screens shorter than the image `top` goes negative and the
    /// image is clipped.
    pub fn centered(geometry: &ScreenGeometry, layout: &LayoutConfig) -> Self {
        let size = ((geometry.width_px as f64 * layout.image_width_ratio) as u32).max(1);
        let left = (geometry.width_px as i64 - size as i64) / 2;
        let top = (geometry.height_px as i64 - size as i64) / 2;
        Self { left, top, size }
    }

    pub fn bottom(&self) -> i64 {
        self.top + self.size as i64
    }

    /// Baseline of the label drawn above the image.
    pub fn primary_baseline(&self, layout: &LayoutConfig) -> f32 {
        self.top as f32 - layout.primary_offset_above
    }

    /// Baseline of the label drawn below the image.
    pub fn secondary_baseline(&self, layout: &LayoutConfig) -> f32 {
        self.bottom() as f32 + layout.secondary_offset_below
    }

    pub fn caption_baseline(&self, layout: &LayoutConfig) -> f32 {
        self.secondary_baseline(layout) + layout.caption_gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_is_sixty_percent_of_width() {
        let placement = Placement::centered(&ScreenGeometry::new(1080, 2340, 440), &LayoutConfig::default());
        assert_eq!(placement.size, 648);
        assert_eq!(placement.left, 216);
        assert_eq!(placement.top, 846);
    }

    #[test]
    fn placement_is_centered_for_many_screens() {
        let layout = LayoutConfig::default();
        for (w, h) in [(1080, 1920), (720, 1280), (1441, 3119), (3, 5), (1, 1), (2000, 900)] {
            let geometry = ScreenGeometry::new(w, h, 320);
            let p = Placement::centered(&geometry, &layout);
            let cx = p.left as f64 + p.size as f64 / 2.0;
            let cy = p.top as f64 + p.size as f64 / 2.0;
            assert!((cx - w as f64 / 2.0).abs() <= 1.0, "{w}x{h}: cx={cx}");
            assert!((cy - h as f64 / 2.0).abs() <= 1.0, "{w}x{h}: cy={cy}");
        }
    }

    #[test]
    fn labels_sit_around_the_image() {
        let layout = LayoutConfig::default();
        let p = Placement { left: 100, top: 500, size: 600 };
        assert_eq!(p.primary_baseline(&layout), 440.0);
        assert_eq!(p.secondary_baseline(&layout), 1180.0);
        assert_eq!(p.caption_baseline(&layout), 1240.0);
    }

    #[test]
    fn zero_sized_screens_are_rejected() {
        assert!(ScreenGeometry::new(0, 100, 160).validate().is_err());
        assert!(ScreenGeometry::new(100, 0, 160).validate().is_err());
        assert!(ScreenGeometry::new(1, 1, 160).validate().is_ok());
    }

    #[test]
    fn one_inch_equals_density() {
        assert_eq!(ScreenGeometry::new(1080, 1920, 480).one_inch_px(), 480.0);
    }
}
