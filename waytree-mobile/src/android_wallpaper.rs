use waytree_core::{ComposedWallpaper, WallpaperError};

#[cfg(target_os = "android")]
use jni::objects::{JObject, JValue};

#[cfg(target_os = "android")]
use crate::jni_env::with_activity;

/// `Build.VERSION_CODES.N`, the first release with `WallpaperManager.FLAG_LOCK`.
pub const SCOPED_PLACEMENT_MIN_SDK: i32 = 24;

/// Pack RGBA pixels into the `0xAARRGGBB` ints `Bitmap.createBitmap` expects.
pub fn argb_pixels(wallpaper: &ComposedWallpaper) -> Vec<i32> {
    wallpaper
        .pixels()
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            i32::from_be_bytes([a, r, g, b])
        })
        .collect()
}

/// Outcome of `setBitmap` followed by `recycle`. A manager failure wins over a
/// recycle failure.
#[cfg_attr(not(target_os = "android"), allow(dead_code))]
fn settle<E>(applied: Result<(), E>, recycled: Result<(), E>) -> Result<(), E> {
    if applied.is_err() && recycled.is_err() {
        log::warn!("Bitmap recycle also failed after setBitmap error");
    }
    applied.and(recycled)
}

#[cfg(target_os = "android")]
pub fn sdk_int() -> Result<i32, WallpaperError> {
    with_activity("read SDK version", |env, _activity| {
        env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")?.i()
    })
}

#[cfg(not(target_os = "android"))]
pub fn sdk_int() -> Result<i32, WallpaperError> {
    Err(WallpaperError::unexpected("Android SDK version not available on this platform"))
}

/// Hand the composed buffer to `WallpaperManager`.
///
/// With `flags` the scoped `setBitmap(bitmap, null, false, flags)` call is
/// used, otherwise the legacy whole-device `setBitmap(bitmap)`.
#[cfg(target_os = "android")]
pub fn set_wallpaper_bitmap(wallpaper: &ComposedWallpaper, flags: Option<i32>) -> Result<(), WallpaperError> {
    let (width, height) = wallpaper.dimensions();
    let width = i32::try_from(width).map_err(|_| WallpaperError::unexpected("wallpaper too wide"))?;
    let height = i32::try_from(height).map_err(|_| WallpaperError::unexpected("wallpaper too tall"))?;
    let pixels = argb_pixels(wallpaper);
    let len = i32::try_from(pixels.len()).map_err(|_| WallpaperError::unexpected("wallpaper too large"))?;

    log::info!("Setting {}x{} wallpaper through WallpaperManager (flags: {:?})", width, height, flags);

    with_activity("set wallpaper", |env, activity| {
        let colors = env.new_int_array(len)?;
        env.set_int_array_region(&colors, 0, &pixels)?;

        let config = env
            .get_static_field(
                "android/graphics/Bitmap$Config",
                "ARGB_8888",
                "Landroid/graphics/Bitmap$Config;",
            )?
            .l()?;
        let bitmap = env
            .call_static_method(
                "android/graphics/Bitmap",
                "createBitmap",
                "([IIILandroid/graphics/Bitmap$Config;)Landroid/graphics/Bitmap;",
                &[
                    JValue::Object(&colors),
                    JValue::Int(width),
                    JValue::Int(height),
                    JValue::Object(&config),
                ],
            )?
            .l()?;

        let manager = env
            .call_static_method(
                "android/app/WallpaperManager",
                "getInstance",
                "(Landroid/content/Context;)Landroid/app/WallpaperManager;",
                &[JValue::Object(activity)],
            )?
            .l()?;

        let applied = match flags {
            Some(flags) => env
                .call_method(
                    &manager,
                    "setBitmap",
                    "(Landroid/graphics/Bitmap;Landroid/graphics/Rect;ZI)I",
                    &[
                        JValue::Object(&bitmap),
                        JValue::Object(&JObject::null()),
                        JValue::Bool(0),
                        JValue::Int(flags),
                    ],
                )
                .and_then(|id| id.i())
                .map(|id| log::debug!("WallpaperManager returned wallpaper id {}", id)),
            None => env
                .call_method(&manager, "setBitmap", "(Landroid/graphics/Bitmap;)V", &[JValue::Object(&bitmap)])
                .map(|_| ()),
        };

        // no JNI call may run with the manager's exception still pending
        if applied.is_err() && env.exception_check().unwrap_or(false) {
            let _ = env.exception_describe();
            let _ = env.exception_clear();
        }
        let recycled = env.call_method(&bitmap, "recycle", "()V", &[]).map(|_| ());
        settle(applied, recycled)
    })?;

    log::info!("WallpaperManager accepted the wallpaper");
    Ok(())
}

#[cfg(not(target_os = "android"))]
pub fn set_wallpaper_bitmap(_wallpaper: &ComposedWallpaper, _flags: Option<i32>) -> Result<(), WallpaperError> {
    log::error!("Android wallpaper setting not available on this platform");
    Err(WallpaperError::unexpected("Android wallpaper setting not available on this platform"))
}
