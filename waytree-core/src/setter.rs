//! The `setWallpaper` pipeline: read the screen, compose, apply.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use log::{debug, error, info};

use crate::canvas::{CanvasFactory, ComposedWallpaper, RasterCanvasFactory};
use crate::display::DisplayMetrics;
use crate::error::{Result, WallpaperError};
use crate::fetch::ImageFetcher;
use crate::geometry::Placement;
use crate::layout::LayoutConfig;
use crate::request::WallpaperRequest;
use crate::wallpaper::{WallpaperApplier, WallpaperScope};
use crate::worker::{run_on_worker, Dispatcher};

/// Host capabilities the pipeline runs against.
#[derive(Clone)]
pub struct Services {
    pub display: Arc<dyn DisplayMetrics>,
    pub fetcher: Arc<dyn ImageFetcher>,
    pub canvas: Arc<dyn CanvasFactory>,
    pub applier: Arc<dyn WallpaperApplier>,
}

impl Services {
    /// Services drawing with the built-in raster canvas.
    pub fn new(
        display: Arc<dyn DisplayMetrics>,
        fetcher: Arc<dyn ImageFetcher>,
        applier: Arc<dyn WallpaperApplier>,
    ) -> Self {
        Self { display, fetcher, canvas: Arc::new(RasterCanvasFactory), applier }
    }

    pub fn with_canvas(mut self, canvas: Arc<dyn CanvasFactory>) -> Self {
        self.canvas = canvas;
        self
    }
}

/// Composes the wallpaper and hands it to the host.
///
/// Cloning is cheap; every clone shares the same services and layout. Each
/// request allocates its own buffers, so concurrent requests never share
/// pixels. They do race on the single system wallpaper: whichever finishes
/// last is what the user sees.
#[derive(Clone)]
pub struct WallpaperSetter {
    services: Services,
    layout: Arc<LayoutConfig>,
    scope: WallpaperScope,
}

impl WallpaperSetter {
    pub fn new(services: Services, layout: LayoutConfig, scope: WallpaperScope) -> Self {
        Self { services, layout: Arc::new(layout), scope }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Build the wallpaper for `request` without applying it.
    pub fn compose(&self, request: &WallpaperRequest) -> Result<ComposedWallpaper> {
        let layout = &*self.layout;

        layout.validate()?;
        let geometry = self.services.display.screen_geometry()?;
        geometry.validate()?;
        let placement = Placement::centered(&geometry, layout);
        debug!(
            "Composing {}x{} wallpaper, image {}px at ({}, {})",
            geometry.width_px, geometry.height_px, placement.size, placement.left, placement.top
        );

        let mut canvas = self.services.canvas.allocate(&geometry)?;
        canvas.fill(layout.background);

        let fetched = self.services.fetcher.fetch(&request.image_url)?;
        debug!("Fetched {}x{} image from {}", fetched.width(), fetched.height(), request.image_url);
        let scaled = imageops::resize(&fetched, placement.size, placement.size, FilterType::Triangle);
        drop(fetched);

        canvas.draw_image(&scaled, placement.left, placement.top);
        drop(scaled);

        let center_x = geometry.center_x();
        canvas.draw_text(
            &request.primary_label,
            center_x,
            placement.primary_baseline(layout),
            &layout.primary,
        );
        canvas.draw_text(
            &layout.secondary_text(&request.secondary_label),
            center_x,
            placement.secondary_baseline(layout),
            &layout.secondary,
        );
        canvas.draw_text(
            &layout.caption_text,
            center_x,
            placement.caption_baseline(layout),
            &layout.caption,
        );

        let wallpaper = canvas.finish();
        if wallpaper.dimensions() != (geometry.width_px, geometry.height_px) {
            return Err(WallpaperError::unexpected(format!(
                "canvas produced {}x{} for a {}x{} screen",
                wallpaper.width(),
                wallpaper.height(),
                geometry.width_px,
                geometry.height_px
            )));
        }
        Ok(wallpaper)
    }

    /// Compose and apply on the calling thread.
    pub fn set_wallpaper_blocking(&self, request: &WallpaperRequest) -> Result<()> {
        let wallpaper = self.compose(request)?;
        let target = self.services.applier.target_for(self.scope);
        debug!("Applying wallpaper with target {:?}", target);
        self.services.applier.apply(&wallpaper, target)
    }

    /// Compose and apply on a background worker; `callback` runs on `dispatcher`.
    ///
    /// Exactly one outcome is delivered per call.
    pub fn set_wallpaper<C>(&self, request: WallpaperRequest, dispatcher: Arc<dyn Dispatcher>, callback: C)
    where
        C: FnOnce(Result<()>) + Send + 'static,
    {
        let setter = self.clone();
        info!("Setting wallpaper from {}", request.image_url);
        run_on_worker(
            "wallpaper",
            dispatcher,
            move || setter.set_wallpaper_blocking(&request),
            move |outcome| {
                let result = outcome.unwrap_or_else(|panic| Err(WallpaperError::unexpected(panic)));
                match &result {
                    Ok(()) => info!("Wallpaper applied"),
                    Err(e) => error!("Wallpaper request failed: {}", e),
                }
                callback(result);
            },
        );
    }
}
