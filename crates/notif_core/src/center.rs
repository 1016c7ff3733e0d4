use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::NotificationError;
use crate::model::{ImageAttachment, NotificationRequest, ScheduledNotification};
use crate::permission::Permissions;

/// Completion handler handed to the platform. It may run on any thread.
pub type Callback<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// The process-wide notification store owned by the operating system.
///
/// Implementations forward each call to the platform and return without
/// waiting; results arrive through the supplied callbacks.
pub trait NotificationCenter: Send + Sync {
    fn request_authorization(
        &self,
        options: Permissions,
        on_complete: Callback<Result<bool, NotificationError>>,
    );

    /// Adds a request, replacing any pending or delivered one with the same
    /// identifier.
    fn add(
        &self,
        request: ScheduledNotification,
        on_complete: Callback<Result<(), NotificationError>>,
    );

    fn remove_all_pending(&self);
    fn remove_all_delivered(&self);
    fn remove_pending(&self, identifiers: &[String]);
    fn remove_delivered(&self, identifiers: &[String]);

    fn pending(&self, on_complete: Callback<Vec<NotificationRequest>>);
    fn delivered(&self, on_complete: Callback<Vec<NotificationRequest>>);

    /// Looks up a bundled `<name>.png` resource.
    fn resolve_image(&self, name: &str) -> Result<ImageAttachment, NotificationError>;
}

/// Returns the notification center for the current target.
pub fn platform_center() -> Arc<dyn NotificationCenter> {
    #[cfg(target_vendor = "apple")]
    {
        Arc::new(crate::apple::AppleCenter::new())
    }
    #[cfg(not(target_vendor = "apple"))]
    {
        Arc::new(crate::memory::MemoryCenter::new())
    }
}

struct Slot<T> {
    value: Option<T>,
    fired: bool,
}

/// Single-use completion signal: one side calls [`Completion::complete`]
/// once, the other blocks in [`Completion::wait`] until it has.
pub struct Completion<T> {
    inner: Arc<(Mutex<Slot<T>>, Condvar)>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Completion<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Completion<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new((
                Mutex::new(Slot {
                    value: None,
                    fired: false,
                }),
                Condvar::new(),
            )),
        }
    }

    /// Stores the result and wakes the waiter. Returns `false` if the
    /// completion had already fired, in which case `value` is dropped.
    pub fn complete(&self, value: T) -> bool {
        let (lock, condvar) = &*self.inner;
        let mut slot = lock.lock();
        if slot.fired {
            return false;
        }
        slot.fired = true;
        slot.value = Some(value);
        condvar.notify_all();
        true
    }

    /// Blocks until the value arrives. There is no timeout.
    pub fn wait(self) -> T {
        let (lock, condvar) = &*self.inner;
        let mut slot = lock.lock();
        loop {
            if let Some(value) = slot.value.take() {
                return value;
            }
            condvar.wait(&mut slot);
        }
    }

    pub fn wait_timeout(self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let (lock, condvar) = &*self.inner;
        let mut slot = lock.lock();
        loop {
            if let Some(value) = slot.value.take() {
                return Some(value);
            }
            if condvar.wait_until(&mut slot, deadline).timed_out() {
                return slot.value.take();
            }
        }
    }

    /// Wraps the completion in a platform callback.
    pub fn callback(&self) -> Callback<T>
    where
        T: Send + 'static,
    {
        let completion = self.clone();
        Box::new(move |value: T| {
            if !completion.complete(value) {
                tracing::trace!("completion fired more than once; ignoring");
            }
        })
    }
}
