//! C representations of bridge inputs and outputs.
//!
//! Strings handed to the bridge are borrowed for the duration of the call.
//! Everything the bridge returns is owned by the caller and must be released
//! with the matching `*_free` entry point exactly once.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use notif_core::NotificationRequest;

/// Copies a borrowed C string. Returns `None` for a null pointer; invalid
/// UTF-8 is replaced rather than rejected.
///
/// # Safety
///
/// `raw` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub unsafe fn borrowed_str(raw: *const c_char) -> Option<String> {
    if raw.is_null() {
        return None;
    }
    Some(CStr::from_ptr(raw).to_string_lossy().into_owned())
}

/// Allocates a caller-owned C string. Interior NULs are stripped.
pub fn owned_c_string(value: &str) -> *mut c_char {
    CString::new(value.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}

/// # Safety
///
/// `raw` must be null or a pointer obtained from [`owned_c_string`] that has
/// not been freed yet.
pub unsafe fn free_c_string(raw: *mut c_char) {
    if !raw.is_null() {
        drop(CString::from_raw(raw));
    }
}

#[repr(C)]
#[derive(Debug)]
pub struct NotificationRequestFfi {
    pub identifier: *mut c_char,
    pub title: *mut c_char,
    pub subtitle: *mut c_char,
    pub body: *mut c_char,
}

impl From<NotificationRequest> for NotificationRequestFfi {
    fn from(request: NotificationRequest) -> Self {
        Self {
            identifier: owned_c_string(&request.identifier),
            title: owned_c_string(&request.title),
            subtitle: owned_c_string(&request.subtitle),
            body: owned_c_string(&request.body),
        }
    }
}

impl NotificationRequestFfi {
    /// # Safety
    ///
    /// Every field must still hold a string allocated by the bridge.
    pub unsafe fn to_request(&self) -> NotificationRequest {
        NotificationRequest {
            identifier: borrowed_str(self.identifier).unwrap_or_default(),
            title: borrowed_str(self.title).unwrap_or_default(),
            subtitle: borrowed_str(self.subtitle).unwrap_or_default(),
            body: borrowed_str(self.body).unwrap_or_default(),
        }
    }

    unsafe fn release(&mut self) {
        for field in [
            &mut self.identifier,
            &mut self.title,
            &mut self.subtitle,
            &mut self.body,
        ] {
            free_c_string(*field);
            *field = ptr::null_mut();
        }
    }
}

/// A caller-owned array of notification records. An empty list has a null
/// `items` pointer and `len == 0`.
#[repr(C)]
#[derive(Debug)]
pub struct NotificationRequestList {
    pub items: *mut NotificationRequestFfi,
    pub len: usize,
}

impl NotificationRequestList {
    pub fn empty() -> Self {
        Self {
            items: ptr::null_mut(),
            len: 0,
        }
    }

    pub fn from_requests(requests: Vec<NotificationRequest>) -> Self {
        if requests.is_empty() {
            return Self::empty();
        }
        let items: Box<[NotificationRequestFfi]> =
            requests.into_iter().map(NotificationRequestFfi::from).collect();
        let len = items.len();
        Self {
            items: Box::into_raw(items) as *mut NotificationRequestFfi,
            len,
        }
    }

    /// # Safety
    ///
    /// The list must come from [`NotificationRequestList::from_requests`] and
    /// must not have been freed.
    pub unsafe fn as_slice(&self) -> &[NotificationRequestFfi] {
        if self.items.is_null() {
            return &[];
        }
        std::slice::from_raw_parts(self.items, self.len)
    }

    /// # Safety
    ///
    /// Same as [`NotificationRequestList::as_slice`]; the list is unusable
    /// afterwards.
    pub unsafe fn free(self) {
        if self.items.is_null() {
            return;
        }
        let mut items = Box::from_raw(ptr::slice_from_raw_parts_mut(self.items, self.len));
        for item in items.iter_mut() {
            item.release();
        }
    }
}
