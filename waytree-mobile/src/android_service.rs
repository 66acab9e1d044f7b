use waytree_core::{
    ComposedWallpaper, DisplayMetrics, ScreenGeometry, WallpaperApplier, WallpaperError, WallpaperTarget,
};

use crate::android_screensize::get_screen_geometry;
use crate::android_wallpaper::{sdk_int, set_wallpaper_bitmap, SCOPED_PLACEMENT_MIN_SDK};

/// Display metrics and wallpaper application backed by the Android framework.
pub struct AndroidWallpaperService;

impl DisplayMetrics for AndroidWallpaperService {
    fn screen_geometry(&self) -> Result<ScreenGeometry, WallpaperError> {
        get_screen_geometry()
    }
}

impl WallpaperApplier for AndroidWallpaperService {
    fn supports_scoped_placement(&self) -> bool {
        match sdk_int() {
            Ok(sdk) => sdk >= SCOPED_PLACEMENT_MIN_SDK,
            Err(e) => {
                log::warn!("Could not read SDK version, using legacy wallpaper call: {}", e);
                false
            }
        }
    }

    fn apply(&self, wallpaper: &ComposedWallpaper, target: WallpaperTarget) -> Result<(), WallpaperError> {
        let flags = match target {
            WallpaperTarget::Scoped(scope) => Some(scope.android_flags()),
            WallpaperTarget::Device => None,
        };
        set_wallpaper_bitmap(wallpaper, flags)
    }
}
