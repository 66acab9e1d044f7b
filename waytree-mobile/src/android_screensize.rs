use waytree_core::{ScreenGeometry, WallpaperError};

#[cfg(target_os = "android")]
use jni::objects::JValue;

#[cfg(target_os = "android")]
use crate::jni_env::with_activity;

/// Real screen size and density from `Display.getRealMetrics`, which,
/// unlike `getMetrics`, includes the system bars.
#[cfg(target_os = "android")]
pub fn get_screen_geometry() -> Result<ScreenGeometry, WallpaperError> {
    let (width, height, dpi) = with_activity("read display metrics", |env, activity| {
        let window_manager = env
            .call_method(activity, "getWindowManager", "()Landroid/view/WindowManager;", &[])?
            .l()?;
        let display = env
            .call_method(&window_manager, "getDefaultDisplay", "()Landroid/view/Display;", &[])?
            .l()?;
        let metrics = env.new_object("android/util/DisplayMetrics", "()V", &[])?;
        env.call_method(
            &display,
            "getRealMetrics",
            "(Landroid/util/DisplayMetrics;)V",
            &[JValue::Object(&metrics)],
        )?;

        let width = env.get_field(&metrics, "widthPixels", "I")?.i()?;
        let height = env.get_field(&metrics, "heightPixels", "I")?.i()?;
        let dpi = env.get_field(&metrics, "densityDpi", "I")?.i()?;
        Ok((width, height, dpi))
    })?;

    log::info!("Android screen detected: {}x{} pixels @ {} dpi", width, height, dpi);

    let to_px = |v: i32, name: &str| {
        u32::try_from(v)
            .map_err(|_| WallpaperError::unexpected(format!("display reported negative {name}: {v}")))
    };
    Ok(ScreenGeometry::new(to_px(width, "width")?, to_px(height, "height")?, to_px(dpi, "density")?))
}

/// Non-Android hosts have no display metrics service; report the default phone geometry.
#[cfg(not(target_os = "android"))]
pub fn get_screen_geometry() -> Result<ScreenGeometry, WallpaperError> {
    log::warn!("Android screen metrics not available on this platform, returning default values");
    Ok(ScreenGeometry::default())
}
