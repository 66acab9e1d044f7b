use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{json, Value};
use waytree_core::{MethodCall, Reply, WallpaperError};

use crate::WallpaperBridge;

type Outbox = Arc<Mutex<Vec<(i64, Reply)>>>;

/// A [`WallpaperBridge`] driven by id-tagged JSON calls.
///
/// The Java side posts `call(id, json)` and periodically calls `drain` from
/// its UI thread, which delivers finished work and returns every reply
/// collected so far as `[{"id": .., "reply": {..}}, ..]`.
pub struct HostBridge {
    bridge: WallpaperBridge,
    outbox: Outbox,
}

impl HostBridge {
    pub fn new(bridge: WallpaperBridge) -> Self {
        Self { bridge, outbox: Arc::default() }
    }

    pub fn call(&self, id: i64, json: &str) {
        let outbox = Arc::clone(&self.outbox);
        let post = move |reply: Reply| {
            outbox.lock().unwrap_or_else(PoisonError::into_inner).push((id, reply));
        };

        match MethodCall::from_json(json) {
            Ok(call) => {
                log::debug!("Call {} -> {}", id, call.method);
                self.bridge.handle(call, post);
            }
            Err(e) => {
                log::warn!("Call {} is not a method call: {}", id, e);
                post(WallpaperError::invalid_argument(format!("malformed method call: {e}")).into());
            }
        }
    }

    pub fn drain(&self) -> String {
        self.bridge.pump();
        let replies = std::mem::take(&mut *self.outbox.lock().unwrap_or_else(PoisonError::into_inner));
        Value::Array(
            replies
                .into_iter()
                .map(|(id, reply)| json!({ "id": id, "reply": reply }))
                .collect(),
        )
        .to_string()
    }
}

#[cfg(all(test, not(target_os = "android")))]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};
    use waytree_core::Settings;

    fn host() -> HostBridge {
        let settings = Settings::default();
        HostBridge::new(WallpaperBridge::with_services(crate::android_services(&settings), settings))
    }

    fn drain(host: &HostBridge) -> Vec<Value> {
        match serde_json::from_str(&host.drain()).unwrap() {
            Value::Array(replies) => replies,
            other => panic!("expected an array, got {other}"),
        }
    }

    #[test]
    fn nothing_pending_drains_empty_array() {
        assert_eq!(host().drain(), "[]");
    }

    #[test]
    fn synchronous_replies_keep_their_ids() {
        let host = host();
        host.call(1, r#"{"method":"getWallpaper"}"#);
        host.call(2, r#"{"method":"setWallpaper","arguments":{"url":"x"}}"#);
        host.call(3, "{oops");

        let replies = drain(&host);
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0], json!({ "id": 1, "reply": { "status": "not_implemented" } }));
        assert_eq!(replies[1]["id"], 2);
        assert_eq!(replies[1]["reply"]["code"], "INVALID_ARGUMENT");
        assert_eq!(replies[2]["id"], 3);
        assert_eq!(replies[2]["reply"]["code"], "INVALID_ARGUMENT");

        assert!(drain(&host).is_empty());
    }

    #[test]
    fn worker_replies_arrive_through_drain() {
        let host = host();
        host.call(
            7,
            r#"{"method":"setWallpaper","arguments":{"url":"http://127.0.0.1:9/qr.png","networkName":"Home","codeId":"7"}}"#,
        );

        let deadline = Instant::now() + Duration::from_secs(30);
        let replies = loop {
            let replies = drain(&host);
            if !replies.is_empty() || Instant::now() > deadline {
                break replies;
            }
            thread::sleep(Duration::from_millis(20));
        };

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["id"], 7);
        assert_eq!(replies[0]["reply"]["status"], "error");
        assert_eq!(replies[0]["reply"]["code"], "IO_ERROR");
    }
}
