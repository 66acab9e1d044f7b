use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
#[cfg(not(target_os = "android"))]
use directories::ProjectDirs;
use log::info;
use serde::{Deserialize, Serialize};

use crate::fetch::FetchSettings;
use crate::geometry::ScreenGeometry;
use crate::layout::LayoutConfig;
use crate::wallpaper::WallpaperScope;

pub const SETTINGS_FILE: &str = "settings.json";

/// Where the bridge keeps its settings and generated wallpapers.
#[derive(Debug, Clone)]
pub struct Conf {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// Composed wallpapers written for hosts that apply from a file.
    pub output_dir: PathBuf,
    pub settings_file: PathBuf,
}

impl Conf {
    pub fn new() -> Result<Self> {
        let (config_dir, cache_dir) = {
            #[cfg(target_os = "android")]
            {
                (
                    PathBuf::from("/data/data/com.waytree.app/files"),
                    PathBuf::from("/data/data/com.waytree.app/cache"),
                )
            }

            #[cfg(not(target_os = "android"))]
            {
                let proj_dirs = ProjectDirs::from("com", "waytree", "waytree")
                    .context("Failed to get project directories")?;
                (proj_dirs.config_dir().to_path_buf(), proj_dirs.cache_dir().to_path_buf())
            }
        };

        Self::with_dirs(config_dir, cache_dir)
    }

    /// Use explicit directories, creating them if they don't exist.
    pub fn with_dirs(config_dir: PathBuf, cache_dir: PathBuf) -> Result<Self> {
        let output_dir = cache_dir.join("wallpapers");
        let settings_file = config_dir.join(SETTINGS_FILE);

        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create {}", config_dir.display()))?;
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        Ok(Conf { config_dir, cache_dir, output_dir, settings_file })
    }

    pub fn load_settings(&self) -> Result<Settings> {
        Settings::load_or_create(&self.settings_file)
    }
}

/// Contents of `settings.json`. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub layout: LayoutConfig,
    pub fetch: FetchSettings,
    /// Screen geometry for hosts that cannot query one.
    pub screen: Option<ScreenGeometry>,
    /// Used only when the host supports scoped placement.
    pub scope: WallpaperScope,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings: Self =
            serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        settings
            .layout
            .validate()
            .with_context(|| format!("Invalid layout in {}", path.display()))?;
        Ok(settings)
    }

    /// Load `path`, writing the defaults there first if it doesn't exist.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save(path)?;
            info!("Wrote default settings to {}", path.display());
            return Ok(settings);
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json + "\n").with_context(|| format!("Failed to write {}", path.display()))
    }
}
