use jni::objects::JObject;
use jni::{JNIEnv, JavaVM};
use waytree_core::WallpaperError;

/// Attach the current thread to the JVM and run `f` with the hosting activity.
///
/// Works from worker threads: `ndk_context` hands out the VM and activity
/// pointers, and the thread is attached for the duration of the call. A Java
/// exception left pending by `f` is logged and cleared before returning.
pub(crate) fn with_activity<T, F>(what: &str, f: F) -> Result<T, WallpaperError>
where
    F: for<'local> FnOnce(&mut JNIEnv<'local>, &JObject<'local>) -> jni::errors::Result<T>,
{
    let ctx = ndk_context::android_context();
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }.map_err(|e| {
        WallpaperError::unexpected(format!("Expected to find JVM via ndk_context crate: {e}"))
    })?;
    let activity = unsafe { JObject::from_raw(ctx.context().cast()) };
    let mut env = vm
        .attach_current_thread()
        .map_err(|e| WallpaperError::unexpected(format!("Failed to attach current thread: {e}")))?;

    let result = f(&mut env, &activity);

    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
    result.map_err(|e| {
        log::error!("Failed to {}: {}", what, e);
        WallpaperError::unexpected(format!("Failed to {what}: {e}"))
    })
}
