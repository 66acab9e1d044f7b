#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use image::{DynamicImage, Rgba, RgbaImage};
use waytree_core::{
    Canvas, CanvasFactory, ComposedWallpaper, DisplayMetrics, ImageFetcher, RasterCanvasFactory, ScreenGeometry,
    Services, WallpaperApplier, WallpaperError, WallpaperTarget,
};

pub const QR_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

pub fn solid_image(size: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(size, size, QR_COLOR))
}

pub fn png_bytes(size: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    solid_image(size).write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

pub struct MockDisplay(pub ScreenGeometry);

impl DisplayMetrics for MockDisplay {
    fn screen_geometry(&self) -> Result<ScreenGeometry, WallpaperError> {
        Ok(self.0)
    }
}

/// Returns a fixed image, or a fetch error when built with `failing`.
pub struct MockFetcher {
    image: Option<DynamicImage>,
    pub calls: AtomicUsize,
}

impl MockFetcher {
    pub fn serving(size: u32) -> Self {
        Self { image: Some(solid_image(size)), calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { image: None, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageFetcher for MockFetcher {
    fn fetch(&self, url: &str) -> Result<DynamicImage, WallpaperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.image
            .clone()
            .ok_or_else(|| WallpaperError::fetch(format!("failed to open {url}: connection refused")))
    }
}

/// Raster canvas that counts allocations.
#[derive(Default)]
pub struct CountingCanvasFactory {
    pub allocations: AtomicUsize,
}

impl CountingCanvasFactory {
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }
}

impl CanvasFactory for CountingCanvasFactory {
    fn allocate(&self, geometry: &ScreenGeometry) -> Result<Box<dyn Canvas>, WallpaperError> {
        self.allocations.fetch_add(1, Ordering::SeqCst);
        RasterCanvasFactory.allocate(geometry)
    }
}

/// Keeps every wallpaper it is asked to apply.
pub struct RecordingApplier {
    scoped: bool,
    fail: bool,
    pub applied: Mutex<Vec<(ComposedWallpaper, WallpaperTarget)>>,
}

impl RecordingApplier {
    pub fn new(scoped: bool) -> Self {
        Self { scoped, fail: false, applied: Mutex::new(Vec::new()) }
    }

    pub fn rejecting() -> Self {
        Self { scoped: true, fail: true, applied: Mutex::new(Vec::new()) }
    }

    pub fn count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }

    pub fn take(&self) -> Vec<(ComposedWallpaper, WallpaperTarget)> {
        std::mem::take(&mut *self.applied.lock().unwrap())
    }
}

impl WallpaperApplier for RecordingApplier {
    fn supports_scoped_placement(&self) -> bool {
        self.scoped
    }

    fn apply(&self, wallpaper: &ComposedWallpaper, target: WallpaperTarget) -> Result<(), WallpaperError> {
        self.applied.lock().unwrap().push((wallpaper.clone(), target));
        if self.fail {
            return Err(WallpaperError::unexpected("wallpaper service rejected the bitmap"));
        }
        Ok(())
    }
}

pub struct Harness {
    pub fetcher: Arc<MockFetcher>,
    pub canvas: Arc<CountingCanvasFactory>,
    pub applier: Arc<RecordingApplier>,
    pub services: Services,
}

impl Harness {
    pub fn new(geometry: ScreenGeometry, fetcher: MockFetcher, applier: RecordingApplier) -> Self {
        let fetcher = Arc::new(fetcher);
        let canvas = Arc::new(CountingCanvasFactory::default());
        let applier = Arc::new(applier);
        let services = Services::new(Arc::new(MockDisplay(geometry)), fetcher.clone(), applier.clone())
            .with_canvas(canvas.clone());
        Self { fetcher, canvas, applier, services }
    }
}

/// Serve `body` with status 200 to every connection on a loopback port.
/// Returns the URL to fetch.
pub fn serve_png(body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(header.as_bytes());
            let _ = stream.write_all(&body);
        }
    });
    format!("http://{addr}/qr.png")
}

/// A loopback URL nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/qr.png")
}
