//! Error taxonomy for the wallpaper bridge.
//!
//! Every failure of a `setWallpaper` request ends up as exactly one of these
//! variants. The channel layer turns them into a short wire code plus a
//! human-readable message for the calling application.

use serde::Serialize;
use thiserror::Error;

/// Failure categories reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum WallpaperError {
    /// The caller left out a required argument. Nothing was fetched or drawn.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The image could not be downloaded or decoded.
    #[error("fetch error: {0}")]
    FetchError(String),
    /// Anything else: allocation, geometry, wallpaper service, worker panic.
    #[error("unexpected error: {0}")]
    UnexpectedError(String),
}

impl WallpaperError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::FetchError(msg.into())
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedError(msg.into())
    }

    /// Machine-readable code sent over the method channel.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::FetchError(_) => "IO_ERROR",
            Self::UnexpectedError(_) => "ERROR",
        }
    }

    /// Fixed summary shown to the user, independent of the underlying cause.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "URL, network name, and code ID are required",
            Self::FetchError(_) => "Failed to load image or set wallpaper",
            Self::UnexpectedError(_) => "An unexpected error occurred",
        }
    }

    /// The underlying cause, carried as the reply details.
    pub fn detail(&self) -> &str {
        match self {
            Self::InvalidArgument(msg) | Self::FetchError(msg) | Self::UnexpectedError(msg) => msg,
        }
    }
}

impl From<std::io::Error> for WallpaperError {
    fn from(err: std::io::Error) -> Self {
        Self::UnexpectedError(err.to_string())
    }
}

pub type Result<T, E = WallpaperError> = std::result::Result<T, E>;
