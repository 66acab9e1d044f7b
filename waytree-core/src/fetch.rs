use std::io::Cursor;
use std::time::Duration;

use image::{DynamicImage, ImageReader};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WallpaperError};

/// Downloads and decodes the image shown in the middle of the wallpaper.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<DynamicImage>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// `None` waits forever, like the platform stream API.
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: None,
            read_timeout_secs: None,
            user_agent: format!("waytree/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Blocking HTTP(S) fetcher.
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
    settings: FetchSettings,
}

impl HttpImageFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let mut request = attohttpc::RequestBuilder::try_new(attohttpc::Method::GET, url)
            .and_then(|r| r.try_header("User-Agent", self.settings.user_agent.as_str()))
            .map_err(|e| WallpaperError::fetch(format!("invalid request for {url}: {e}")))?;
        if let Some(secs) = self.settings.connect_timeout_secs {
            request = request.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.settings.read_timeout_secs {
            request = request.read_timeout(Duration::from_secs(secs));
        }

        let response = request
            .send()
            .map_err(|e| WallpaperError::fetch(format!("failed to open {url}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(WallpaperError::fetch(format!("{url} returned HTTP {status}")));
        }
        response
            .bytes()
            .map_err(|e| WallpaperError::fetch(format!("failed to read {url}: {e}")))
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Result<DynamicImage> {
        let bytes = self.download(url)?;
        debug!("Downloaded {} bytes from {}", bytes.len(), url);
        decode_image(&bytes)
    }
}

/// Decode an image, sniffing the format from its leading bytes.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| WallpaperError::fetch(format!("failed to read image: {e}")))?
        .decode()
        .map_err(|e| WallpaperError::fetch(format!("failed to decode image: {e}")))
}
