use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, WallpaperError};

pub const ARG_URL: &str = "url";
pub const ARG_NETWORK_NAME: &str = "networkName";
pub const ARG_CODE_ID: &str = "codeId";

/// A validated `setWallpaper` request. All three fields are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallpaperRequest {
    pub image_url: String,
    /// Drawn above the image (the network name).
    pub primary_label: String,
    /// Drawn below the image, after the code prefix.
    pub secondary_label: String,
}

impl WallpaperRequest {
    pub fn new(
        image_url: impl Into<String>,
        primary_label: impl Into<String>,
        secondary_label: impl Into<String>,
    ) -> Self {
        Self {
            image_url: image_url.into(),
            primary_label: primary_label.into(),
            secondary_label: secondary_label.into(),
        }
    }

    /// Build a request from method-channel arguments.
    ///
    /// Absent, null or non-string values count as missing. Empty strings are
    /// accepted; they fail later, at fetch time, if at all.
    pub fn from_arguments(arguments: &Value) -> Result<Self> {
        let url = string_arg(arguments, ARG_URL);
        let network_name = string_arg(arguments, ARG_NETWORK_NAME);
        let code_id = string_arg(arguments, ARG_CODE_ID);

        match (url, network_name, code_id) {
            (Some(url), Some(network_name), Some(code_id)) => {
                Ok(Self::new(url, network_name, code_id))
            }
            (url, network_name, code_id) => {
                let missing: Vec<&str> = [
                    (ARG_URL, url.is_none()),
                    (ARG_NETWORK_NAME, network_name.is_none()),
                    (ARG_CODE_ID, code_id.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(WallpaperError::invalid_argument(format!(
                    "missing required argument(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

fn string_arg<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_complete_arguments() {
        let args = json!({"url": "https://example.com/qr.png", "networkName": "Home", "codeId": "42"});
        let request = WallpaperRequest::from_arguments(&args).unwrap();
        assert_eq!(request.image_url, "https://example.com/qr.png");
        assert_eq!(request.primary_label, "Home");
        assert_eq!(request.secondary_label, "42");
    }

    #[test]
    fn empty_strings_are_present() {
        let args = json!({"url": "", "networkName": "", "codeId": ""});
        assert!(WallpaperRequest::from_arguments(&args).is_ok());
    }

    #[test]
    fn reports_every_missing_argument() {
        let args = json!({"networkName": "Home"});
        let err = WallpaperRequest::from_arguments(&args).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
        assert!(err.detail().contains("url"));
        assert!(err.detail().contains("codeId"));
        assert!(!err.detail().contains("networkName"));
    }

    #[test]
    fn non_string_values_are_missing() {
        let args = json!({"url": 7, "networkName": null, "codeId": "x"});
        let err = WallpaperRequest::from_arguments(&args).unwrap_err();
        assert!(matches!(err, WallpaperError::InvalidArgument(_)));
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        assert!(WallpaperRequest::from_arguments(&Value::Null).is_err());
        assert!(WallpaperRequest::from_arguments(&json!(["a", "b", "c"])).is_err());
    }
}
