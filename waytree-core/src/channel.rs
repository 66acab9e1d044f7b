//! Method-channel surface the application layer calls into.
//!
//! A call names a method and carries a JSON argument map. The reply is
//! delivered exactly once: synchronously for unknown methods and missing
//! arguments, otherwise from the worker through the dispatcher.

use std::sync::Arc;

use log::{error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WallpaperError;
use crate::request::WallpaperRequest;
use crate::setter::WallpaperSetter;
use crate::worker::Dispatcher;

pub const CHANNEL_NAME: &str = "com.waytree.app/wallpaper";
pub const METHOD_SET_WALLPAPER: &str = "setWallpaper";

/// Sent in place of a reply that could not be serialised.
const UNSERIALISABLE_REPLY: &str =
    r#"{"status":"error","code":"ERROR","message":"An unexpected error occurred","details":"reply could not be serialised"}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self { method: method.into(), arguments }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    Success {
        result: Value,
    },
    Error {
        code: String,
        message: String,
        details: Option<String>,
    },
    NotImplemented,
}

impl Reply {
    pub fn success(result: Value) -> Self {
        Self::Success { result }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            error!("Failed to serialise reply: {}", e);
            UNSERIALISABLE_REPLY.to_string()
        })
    }
}

impl From<WallpaperError> for Reply {
    fn from(err: WallpaperError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.summary().to_string(),
            details: Some(err.detail().to_string()),
        }
    }
}

/// Routes method calls to the wallpaper setter.
#[derive(Clone)]
pub struct WallpaperChannel {
    setter: WallpaperSetter,
    dispatcher: Arc<dyn Dispatcher>,
}

impl WallpaperChannel {
    /// `dispatcher` is the context replies are delivered on.
    pub fn new(setter: WallpaperSetter, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self { setter, dispatcher }
    }

    pub fn name(&self) -> &'static str {
        CHANNEL_NAME
    }

    pub fn handle<R>(&self, call: MethodCall, reply: R)
    where
        R: FnOnce(Reply) + Send + 'static,
    {
        if call.method != METHOD_SET_WALLPAPER {
            warn!("Unknown method '{}' on {}", call.method, CHANNEL_NAME);
            reply(Reply::NotImplemented);
            return;
        }

        let request = match WallpaperRequest::from_arguments(&call.arguments) {
            Ok(request) => request,
            Err(err) => {
                warn!("Rejected {}: {}", METHOD_SET_WALLPAPER, err);
                reply(err.into());
                return;
            }
        };

        self.setter.set_wallpaper(request, Arc::clone(&self.dispatcher), move |result| {
            reply(match result {
                Ok(()) => Reply::success(Value::Bool(true)),
                Err(err) => err.into(),
            })
        });
    }

    /// Handle a JSON-encoded [`MethodCall`], replying with JSON.
    pub fn handle_json<R>(&self, json: &str, reply: R)
    where
        R: FnOnce(String) + Send + 'static,
    {
        match MethodCall::from_json(json) {
            Ok(call) => self.handle(call, move |r| reply(r.to_json())),
            Err(e) => {
                let err = WallpaperError::invalid_argument(format!("malformed method call: {e}"));
                reply(Reply::from(err).to_json());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_reply_carries_code_summary_and_detail() {
        let reply = Reply::from(WallpaperError::fetch("connection refused"));
        assert_eq!(
            reply,
            Reply::Error {
                code: "IO_ERROR".into(),
                message: "Failed to load image or set wallpaper".into(),
                details: Some("connection refused".into()),
            }
        );
    }

    #[test]
    fn reply_json_shape() {
        let json: Value = serde_json::from_str(&Reply::success(Value::Bool(true)).to_json()).unwrap();
        assert_eq!(json, json!({"status": "success", "result": true}));
        let json: Value = serde_json::from_str(&Reply::NotImplemented.to_json()).unwrap();
        assert_eq!(json, json!({"status": "not_implemented"}));
    }

    #[test]
    fn unserialisable_reply_is_a_generic_error() {
        let reply: Reply = serde_json::from_str(UNSERIALISABLE_REPLY).unwrap();
        assert_eq!(
            reply,
            Reply::Error {
                code: "ERROR".into(),
                message: WallpaperError::unexpected("").summary().into(),
                details: Some("reply could not be serialised".into()),
            }
        );
    }

    #[test]
    fn method_call_from_json() {
        let call = MethodCall::from_json(
            r#"{"method":"setWallpaper","arguments":{"url":"u","networkName":"n","codeId":"c"}}"#,
        )
        .unwrap();
        assert_eq!(call.method, METHOD_SET_WALLPAPER);
        assert_eq!(call.arguments["codeId"], "c");
    }

    #[test]
    fn method_call_without_arguments_defaults_to_null() {
        let call = MethodCall::from_json(r#"{"method":"setWallpaper"}"#).unwrap();
        assert!(call.arguments.is_null());
    }
}
