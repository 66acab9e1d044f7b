//! Android host for the `setWallpaper` bridge.
//!
//! The UI thread owns a [`WallpaperBridge`], forwards method calls to it and
//! calls [`WallpaperBridge::pump`] from its event loop; replies are only ever
//! delivered from inside `pump`, on that thread. On Android the bridge is
//! reached through the `WallpaperPlugin` native methods in `jni_exports`,
//! which wrap it in a [`HostBridge`].

use std::sync::Arc;

use waytree_core::{
    ui_channel, Conf, HttpImageFetcher, MethodCall, Reply, Services, Settings, UiLoop, WallpaperChannel,
    WallpaperSetter,
};

mod android_screensize;
mod android_service;
mod android_wallpaper;
mod host;
#[cfg(target_os = "android")]
mod jni_env;
#[cfg(target_os = "android")]
mod jni_exports;

pub use android_screensize::get_screen_geometry;
pub use android_service::AndroidWallpaperService;
pub use android_wallpaper::{argb_pixels, set_wallpaper_bitmap};
pub use host::HostBridge;

pub const LOG_TAG: &str = "WaytreeWallpaper";

/// Route `log` output to logcat and log panics before they unwind.
#[cfg(target_os = "android")]
pub fn init_logging() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Info)
            .with_tag(LOG_TAG),
    );

    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("PANIC OCCURRED: {}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic location: {}:{}", location.file(), location.line());
        }
    }));

    log::info!("Android logger initialized");
}

#[cfg(not(target_os = "android"))]
pub fn init_logging() {}

/// Android services: framework display metrics and `WallpaperManager`,
/// HTTP fetching per `settings`.
pub fn android_services(settings: &Settings) -> Services {
    let service = Arc::new(AndroidWallpaperService);
    Services::new(service.clone(), Arc::new(HttpImageFetcher::new(settings.fetch.clone())), service)
}

pub struct WallpaperBridge {
    channel: WallpaperChannel,
    ui: UiLoop,
}

impl WallpaperBridge {
    /// Load settings from the app's private storage and wire the Android services.
    pub fn new() -> anyhow::Result<Self> {
        let settings = Conf::new()?.load_settings()?;
        let services = android_services(&settings);
        Ok(Self::with_services(services, settings))
    }

    pub fn with_services(services: Services, settings: Settings) -> Self {
        let (handle, ui) = ui_channel();
        let setter = WallpaperSetter::new(services, settings.layout, settings.scope);
        Self { channel: WallpaperChannel::new(setter, Arc::new(handle)), ui }
    }

    pub fn handle<R>(&self, call: MethodCall, reply: R)
    where
        R: FnOnce(Reply) + Send + 'static,
    {
        self.channel.handle(call, reply);
    }

    pub fn handle_json<R>(&self, json: &str, reply: R)
    where
        R: FnOnce(String) + Send + 'static,
    {
        self.channel.handle_json(json, reply);
    }

    /// Deliver every finished request's reply. Call from the UI thread.
    pub fn pump(&self) -> usize {
        self.ui.run_pending()
    }

    /// Wait up to `timeout` for one reply and deliver it.
    pub fn pump_wait(&self, timeout: std::time::Duration) -> bool {
        self.ui.run_next(timeout)
    }
}
