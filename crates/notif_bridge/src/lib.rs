//! C-compatible entry points over the platform notification center.
//!
//! Every mutating call is fire-and-forget: failures are logged and never
//! reported back. The two queries block until the platform answers and hand
//! back a [`NotificationRequestList`] the caller must release with
//! [`notification_request_list_free`].

pub mod ffi;
mod logging;

use std::ffi::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use notif_core::{BridgeConfig, NotificationRequest, NotificationService};
use once_cell::sync::Lazy;

pub use crate::ffi::{NotificationRequestFfi, NotificationRequestList};
pub use notif_core::permission;

static SERVICE: Lazy<NotificationService> = Lazy::new(|| {
    let config = configure();
    tracing::debug!(?config, "notification bridge ready");
    NotificationService::from_config(&config)
});

/// Loads [`BridgeConfig`] from the environment and installs logging, then
/// reports whatever went wrong along the way through the new subscriber.
fn configure() -> BridgeConfig {
    let loaded = BridgeConfig::from_env();
    let log_filter = loaded
        .as_ref()
        .map(|config| config.log_filter.clone())
        .unwrap_or_else(|_| BridgeConfig::default().log_filter);
    if let Err(err) = logging::init(&log_filter) {
        tracing::warn!(%err, filter = %log_filter, "invalid log filter; using `info`");
    }
    loaded.unwrap_or_else(|err| {
        tracing::warn!(%err, "invalid bridge configuration; using defaults");
        BridgeConfig::default()
    })
}

pub fn service() -> &'static NotificationService {
    &SERVICE
}

// ====== Rust API ======

/// Requests every authorization option the platform offers.
pub fn request_permission_default() {
    service().request_permission_default()
}

/// Requests the options named by `options`; see [`permission`] for the bits.
pub fn request_permission(options: i32) {
    service().request_permission(options)
}

pub fn schedule(id: &str, title: &str, body: &str, seconds: i64) {
    service().schedule(id, title, body, seconds)
}

pub fn schedule_repeat(id: &str, title: &str, body: &str, seconds: i64) {
    service().schedule_repeating(id, title, body, seconds)
}

/// Schedules a one-shot notification with the bundled `<image>.png`, or
/// without it when the image cannot be resolved.
pub fn schedule_image(id: &str, title: &str, body: &str, image: &str, seconds: i64) {
    service().schedule_image(id, title, body, image, seconds)
}

pub fn clear_all_pending() {
    service().remove_all_pending()
}

pub fn clear_all_delivered() {
    service().remove_all_delivered()
}

pub fn remove_by_id(id: &str) {
    service().remove_by_id(id)
}

pub fn pending_notifications() -> Vec<NotificationRequest> {
    service().pending_notifications()
}

pub fn delivered_notifications() -> Vec<NotificationRequest> {
    service().delivered_notifications()
}

// ====== C ABI ======

fn guarded<T>(entry: &'static str, fallback: T, call: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(value) => value,
        Err(_) => {
            tracing::error!(entry, "panic inside notification bridge entry point");
            fallback
        }
    }
}

unsafe fn required_id(entry: &'static str, id: *const c_char) -> Option<String> {
    let id = ffi::borrowed_str(id);
    if id.is_none() {
        tracing::warn!(entry, "null notification identifier; ignoring call");
    }
    id
}

unsafe fn text(raw: *const c_char) -> String {
    ffi::borrowed_str(raw).unwrap_or_default()
}

/// Installs the bridge's log subscriber ahead of any other call. Optional:
/// the first notification call does the same. Safe to call repeatedly.
#[no_mangle]
pub extern "C" fn notification_bridge_init_logging() {
    guarded("notification_bridge_init_logging", (), || {
        configure();
    })
}

#[no_mangle]
pub extern "C" fn request_notification_permission_default() {
    guarded("request_notification_permission_default", (), request_permission_default)
}

#[no_mangle]
pub extern "C" fn request_notification_permission(options: i32) {
    guarded("request_notification_permission", (), || {
        request_permission(options)
    })
}

/// # Safety
///
/// Each string argument must be null or a valid NUL-terminated string for the
/// duration of the call. A null `id` makes the call a no-op.
#[no_mangle]
pub unsafe extern "C" fn schedule_notification(
    id: *const c_char,
    title: *const c_char,
    body: *const c_char,
    seconds: i64,
) {
    guarded("schedule_notification", (), || {
        let Some(id) = required_id("schedule_notification", id) else {
            return;
        };
        schedule(&id, &text(title), &text(body), seconds)
    })
}

/// # Safety
///
/// See [`schedule_notification`].
#[no_mangle]
pub unsafe extern "C" fn schedule_repeat_notification(
    id: *const c_char,
    title: *const c_char,
    body: *const c_char,
    seconds: i64,
) {
    guarded("schedule_repeat_notification", (), || {
        let Some(id) = required_id("schedule_repeat_notification", id) else {
            return;
        };
        schedule_repeat(&id, &text(title), &text(body), seconds)
    })
}

/// # Safety
///
/// See [`schedule_notification`]. A null `image` schedules without an
/// attachment.
#[no_mangle]
pub unsafe extern "C" fn schedule_image_notification(
    id: *const c_char,
    title: *const c_char,
    body: *const c_char,
    image: *const c_char,
    seconds: i64,
) {
    guarded("schedule_image_notification", (), || {
        let Some(id) = required_id("schedule_image_notification", id) else {
            return;
        };
        match ffi::borrowed_str(image) {
            Some(image) => schedule_image(&id, &text(title), &text(body), &image, seconds),
            None => schedule(&id, &text(title), &text(body), seconds),
        }
    })
}

#[no_mangle]
pub extern "C" fn remove_all_pending_notifications() {
    guarded("remove_all_pending_notifications", (), clear_all_pending)
}

#[no_mangle]
pub extern "C" fn remove_all_delivered_notifications() {
    guarded("remove_all_delivered_notifications", (), clear_all_delivered)
}

/// # Safety
///
/// `id` must be null or a valid NUL-terminated string for the duration of
/// the call.
#[no_mangle]
pub unsafe extern "C" fn remove_notification_by_id(id: *const c_char) {
    guarded("remove_notification_by_id", (), || {
        if let Some(id) = required_id("remove_notification_by_id", id) {
            remove_by_id(&id);
        }
    })
}

/// Blocks until the platform reports its pending requests. The returned list
/// belongs to the caller; release it with [`notification_request_list_free`].
#[no_mangle]
pub extern "C" fn get_pending_notifications() -> NotificationRequestList {
    guarded(
        "get_pending_notifications",
        NotificationRequestList::empty(),
        || NotificationRequestList::from_requests(pending_notifications()),
    )
}

/// Blocks until the platform reports its delivered notifications. The
/// returned list belongs to the caller; release it with
/// [`notification_request_list_free`].
#[no_mangle]
pub extern "C" fn get_delivered_notifications() -> NotificationRequestList {
    guarded(
        "get_delivered_notifications",
        NotificationRequestList::empty(),
        || NotificationRequestList::from_requests(delivered_notifications()),
    )
}

/// # Safety
///
/// `list` must have been returned by one of the query entry points and not
/// freed before.
#[no_mangle]
pub unsafe extern "C" fn notification_request_list_free(list: NotificationRequestList) {
    list.free()
}

/// JSON variant of [`get_pending_notifications`]: an array of
/// `{identifier, title, subtitle, body}` objects. Release the string with
/// [`notification_string_free`].
#[no_mangle]
pub extern "C" fn get_pending_notifications_json() -> *mut c_char {
    guarded("get_pending_notifications_json", std::ptr::null_mut(), || {
        requests_to_json(&pending_notifications())
    })
}

/// JSON variant of [`get_delivered_notifications`].
#[no_mangle]
pub extern "C" fn get_delivered_notifications_json() -> *mut c_char {
    guarded("get_delivered_notifications_json", std::ptr::null_mut(), || {
        requests_to_json(&delivered_notifications())
    })
}

/// # Safety
///
/// `value` must be null or a string returned by a `*_json` entry point that
/// has not been freed.
#[no_mangle]
pub unsafe extern "C" fn notification_string_free(value: *mut c_char) {
    ffi::free_c_string(value)
}

fn requests_to_json(requests: &[NotificationRequest]) -> *mut c_char {
    let json = serde_json::to_string(requests).unwrap_or_else(|err| {
        tracing::warn!(%err, "failed to serialize notification snapshot");
        "[]".to_string()
    });
    ffi::owned_c_string(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panicking_entry_point_returns_no_op_fallback() {
        let mut reached = false;
        guarded("panics", (), || {
            reached = true;
            panic!("platform call blew up");
        });
        assert!(reached);
    }

    #[test]
    fn panicking_query_returns_empty_list() {
        let list = guarded(
            "get_pending_notifications",
            NotificationRequestList::empty(),
            || -> NotificationRequestList { panic!("enumeration failed") },
        );
        assert!(list.items.is_null());
        assert_eq!(list.len, 0);
        unsafe { notification_request_list_free(list) };
    }

    #[test]
    fn panicking_json_query_returns_null() {
        let raw = guarded(
            "get_pending_notifications_json",
            std::ptr::null_mut(),
            || -> *mut c_char { panic!("serialization failed") },
        );
        assert!(raw.is_null());
    }
}
