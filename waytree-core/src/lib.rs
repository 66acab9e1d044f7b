//! Compose a wallpaper from a remote image and two labels, and install it as
//! the device wallpaper.
//!
//! The host supplies its capabilities (screen metrics, image fetching,
//! drawing, wallpaper application, callback dispatch) through the traits in
//! this crate; [`WallpaperChannel`] exposes the whole thing as the
//! `setWallpaper` method.

pub mod canvas;
pub mod channel;
pub mod conf;
pub mod display;
pub mod error;
pub mod fetch;
pub mod geometry;
pub mod layout;
pub mod request;
pub mod setter;
pub mod wallpaper;
pub mod worker;

pub use canvas::{Canvas, CanvasFactory, ComposedWallpaper, RasterCanvas, RasterCanvasFactory};
pub use channel::{MethodCall, Reply, WallpaperChannel, CHANNEL_NAME, METHOD_SET_WALLPAPER};
pub use conf::{Conf, Settings};
pub use display::{DisplayMetrics, FixedDisplay};
pub use error::WallpaperError;
pub use fetch::{FetchSettings, HttpImageFetcher, ImageFetcher};
pub use geometry::{Placement, ScreenGeometry};
pub use layout::{Color, LayoutConfig, TextStyle, Weight};
pub use request::WallpaperRequest;
pub use setter::{Services, WallpaperSetter};
pub use wallpaper::{WallpaperApplier, WallpaperScope, WallpaperTarget};
pub use worker::{ui_channel, Dispatcher, InlineDispatcher, UiHandle, UiLoop};

#[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
pub use wallpaper::DesktopWallpaperApplier;

/// Desktop services: configured (or default) screen, HTTP fetcher, and the
/// `wallpaper` crate writing into the conf output directory.
#[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
pub fn desktop_services(conf: &Conf, settings: &Settings) -> Services {
    use std::sync::Arc;

    Services::new(
        Arc::new(FixedDisplay::new(settings.screen.unwrap_or_default())),
        Arc::new(HttpImageFetcher::new(settings.fetch.clone())),
        Arc::new(DesktopWallpaperApplier::new(conf.output_dir.clone())),
    )
}
