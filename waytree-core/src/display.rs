use log::debug;

use crate::error::Result;
use crate::geometry::ScreenGeometry;

/// Reports the current physical screen metrics.
pub trait DisplayMetrics: Send + Sync {
    fn screen_geometry(&self) -> Result<ScreenGeometry>;
}

/// A display whose metrics are known up front: a configured desktop
/// override, or a host that cannot query its screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDisplay {
    geometry: ScreenGeometry,
}

impl FixedDisplay {
    pub fn new(geometry: ScreenGeometry) -> Self {
        Self { geometry }
    }
}

impl DisplayMetrics for FixedDisplay {
    fn screen_geometry(&self) -> Result<ScreenGeometry> {
        debug!(
            "Using fixed screen geometry {}x{} @ {} dpi",
            self.geometry.width_px, self.geometry.height_px, self.geometry.density_dpi
        );
        Ok(self.geometry)
    }
}
