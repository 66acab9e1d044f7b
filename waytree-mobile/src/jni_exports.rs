//! Native methods of `com.waytree.app.WallpaperPlugin`.
//!
//! ```java
//! static native boolean nativeInit(Activity activity);
//! static native void nativeCall(long id, String json);
//! static native String nativePump();
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, OnceLock, PoisonError};

use anyhow::Context;
use jni::objects::{GlobalRef, JClass, JObject, JString};
use jni::sys::{jboolean, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;

use crate::{HostBridge, WallpaperBridge};

/// Keeps the activity alive for `ndk_context`; set once per process.
static ACTIVITY: OnceLock<GlobalRef> = OnceLock::new();
static HOST: Mutex<Option<HostBridge>> = Mutex::new(None);

fn guarded<T>(what: &str, fallback: T, f: impl FnOnce() -> T) -> T {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        log::error!("{} panicked", what);
        fallback
    })
}

fn init(env: &mut JNIEnv, activity: &JObject) -> anyhow::Result<()> {
    let mut host = HOST.lock().unwrap_or_else(PoisonError::into_inner);
    if host.is_some() {
        return Ok(());
    }

    if ACTIVITY.get().is_none() {
        crate::init_logging();
        let vm = env.get_java_vm().context("Failed to get JavaVM")?;
        let activity = env.new_global_ref(activity).context("Failed to pin activity")?;
        unsafe {
            ndk_context::initialize_android_context(vm.get_java_vm_pointer().cast(), activity.as_obj().as_raw().cast());
        }
        let _ = ACTIVITY.set(activity);
    }

    *host = Some(HostBridge::new(WallpaperBridge::new()?));
    log::info!("Wallpaper bridge ready");
    Ok(())
}

#[no_mangle]
pub extern "system" fn Java_com_waytree_app_WallpaperPlugin_nativeInit(
    mut env: JNIEnv,
    _class: JClass,
    activity: JObject,
) -> jboolean {
    guarded("nativeInit", JNI_FALSE, || match init(&mut env, &activity) {
        Ok(()) => JNI_TRUE,
        Err(e) => {
            log::error!("Failed to initialise wallpaper bridge: {:#}", e);
            JNI_FALSE
        }
    })
}

#[no_mangle]
pub extern "system" fn Java_com_waytree_app_WallpaperPlugin_nativeCall(
    mut env: JNIEnv,
    _class: JClass,
    id: jlong,
    json: JString,
) {
    guarded("nativeCall", (), || {
        let json: String = match env.get_string(&json) {
            Ok(json) => json.into(),
            Err(e) => {
                log::error!("Call {} has an unreadable payload: {}", id, e);
                return;
            }
        };
        match HOST.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            Some(host) => host.call(id, &json),
            None => log::error!("Call {} before nativeInit", id),
        }
    })
}

#[no_mangle]
pub extern "system" fn Java_com_waytree_app_WallpaperPlugin_nativePump(mut env: JNIEnv, _class: JClass) -> jstring {
    guarded("nativePump", std::ptr::null_mut(), || {
        let replies = match HOST.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            Some(host) => host.drain(),
            None => "[]".to_string(),
        };
        match env.new_string(replies) {
            Ok(s) => s.into_raw(),
            Err(e) => {
                log::error!("Failed to return replies: {}", e);
                std::ptr::null_mut()
            }
        }
    })
}
