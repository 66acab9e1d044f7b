use serde::{Deserialize, Serialize};

use crate::canvas::ComposedWallpaper;
use crate::error::Result;

/// Which wallpaper to replace when the host can target them separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WallpaperScope {
    #[default]
    Lock,
    Home,
    Both,
}

impl WallpaperScope {
    /// `WallpaperManager.FLAG_SYSTEM` / `FLAG_LOCK` bit set.
    pub fn android_flags(self) -> i32 {
        const FLAG_SYSTEM: i32 = 1;
        const FLAG_LOCK: i32 = 2;
        match self {
            Self::Lock => FLAG_LOCK,
            Self::Home => FLAG_SYSTEM,
            Self::Both => FLAG_SYSTEM | FLAG_LOCK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallpaperTarget {
    /// Scoped placement, for hosts that support it.
    Scoped(WallpaperScope),
    /// Legacy whole-device call.
    Device,
}

/// Installs a composed buffer as the system wallpaper.
pub trait WallpaperApplier: Send + Sync {
    /// Whether the host can set lock and home screen wallpapers independently.
    fn supports_scoped_placement(&self) -> bool;

    fn apply(&self, wallpaper: &ComposedWallpaper, target: WallpaperTarget) -> Result<()>;

    /// Pick the target for this host given the preferred scope.
    fn target_for(&self, scope: WallpaperScope) -> WallpaperTarget {
        if self.supports_scoped_placement() {
            WallpaperTarget::Scoped(scope)
        } else {
            WallpaperTarget::Device
        }
    }
}

#[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
pub use desktop::DesktopWallpaperApplier;

#[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
mod desktop {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process::Command;

    use chrono::Local;
    use log::{debug, info, warn};

    use super::{WallpaperApplier, WallpaperTarget};
    use crate::canvas::ComposedWallpaper;
    use crate::error::{Result, WallpaperError};

    const FILE_PREFIX: &str = "wallpaper-";

    /// Desktops the gsettings fallback can drive: `gnome`, `unity`, `cinnamon`
    /// or `mate`.
    fn gsettings_desktop() -> Option<&'static str> {
        classify_session(
            std::env::var("DESKTOP_SESSION").ok().as_deref(),
            std::env::var("GNOME_DESKTOP_SESSION_ID").is_ok(),
        )
    }

    fn classify_session(desktop_session: Option<&str>, gnome_session_id: bool) -> Option<&'static str> {
        let session = desktop_session.map(str::to_lowercase).unwrap_or_default();
        match session.as_str() {
            "gnome" => Some("gnome"),
            "unity" => Some("unity"),
            "cinnamon" => Some("cinnamon"),
            "mate" => Some("mate"),
            s if s.starts_with("ubuntu") && !s.starts_with("ubuntustudio") => Some("gnome"),
            _ if gnome_session_id => Some("gnome"),
            _ => None,
        }
    }

    /// Writes the buffer as a PNG into `output_dir` and points the desktop at it.
    ///
    /// Every call gets a fresh file name; several desktops ignore a change
    /// when the path stays the same.
    #[derive(Debug, Clone)]
    pub struct DesktopWallpaperApplier {
        output_dir: PathBuf,
    }

    impl DesktopWallpaperApplier {
        pub fn new(output_dir: impl Into<PathBuf>) -> Self {
            Self { output_dir: output_dir.into() }
        }

        fn write_png(&self, wallpaper: &ComposedWallpaper) -> Result<PathBuf> {
            fs::create_dir_all(&self.output_dir)?;
            let name = format!("{FILE_PREFIX}{}.png", Local::now().format("%Y%m%d-%H%M%S%.3f"));
            let path = self.output_dir.join(name);
            fs::write(&path, wallpaper.to_png()?)?;
            Ok(path)
        }

        fn prune_previous(&self, keep: &Path) {
            let Ok(entries) = fs::read_dir(&self.output_dir) else {
                return;
            };
            for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
                let ours = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(FILE_PREFIX) && n.ends_with(".png"));
                if ours && path != keep {
                    if let Err(e) = fs::remove_file(&path) {
                        debug!("Could not remove old wallpaper {}: {}", path.display(), e);
                    }
                }
            }
        }
    }

    impl WallpaperApplier for DesktopWallpaperApplier {
        fn supports_scoped_placement(&self) -> bool {
            false
        }

        fn apply(&self, wallpaper: &ComposedWallpaper, _target: WallpaperTarget) -> Result<()> {
            let path = self.write_png(wallpaper)?;
            let file_loc = path.to_string_lossy().into_owned();

            match ::wallpaper::set_from_path(&file_loc) {
                Ok(()) => info!("Wallpaper set successfully to: {}", file_loc),
                Err(e) => {
                    warn!("Failed to set wallpaper: {}, trying desktop fallback", e);
                    set_wallpaper_fallback(&file_loc)?;
                }
            }
            self.prune_previous(&path);
            Ok(())
        }
    }

    fn set_wallpaper_fallback(file_loc: &str) -> Result<()> {
        let Some(desktop_env) = gsettings_desktop() else {
            return Err(WallpaperError::unexpected(
                "no gsettings fallback for this desktop session",
            ));
        };
        let output = if desktop_env == "mate" {
            Command::new("gsettings")
                .args(["set", "org.mate.background", "picture-filename", file_loc])
                .output()?
        } else {
            let uri = format!("file://{file_loc}");
            Command::new("gsettings")
                .args(["set", "org.gnome.desktop.background", "picture-uri", &uri])
                .output()?
        };

        if output.status.success() {
            info!("Wallpaper set through {} settings: {}", desktop_env, file_loc);
            Ok(())
        } else {
            Err(WallpaperError::unexpected(format!(
                "gsettings rejected wallpaper: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_maps_to_android_flags() {
        assert_eq!(WallpaperScope::Lock.android_flags(), 2);
        assert_eq!(WallpaperScope::Home.android_flags(), 1);
        assert_eq!(WallpaperScope::Both.android_flags(), 3);
    }

    #[test]
    fn scope_deserializes_lowercase() {
        let scope: WallpaperScope = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(scope, WallpaperScope::Both);
    }
}
