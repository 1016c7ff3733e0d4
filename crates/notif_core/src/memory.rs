//! In-process notification store used on targets without a system
//! notification center, and by the test suites.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::center::{Callback, NotificationCenter};
use crate::error::NotificationError;
use crate::model::{
    ImageAttachment, NotificationRequest, ScheduledNotification, IMAGE_ATTACHMENT_ID,
};
use crate::permission::Permissions;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthorizationPolicy {
    #[default]
    GrantAll,
    DenyAll,
}

#[derive(Debug, Clone)]
struct PendingEntry {
    request: ScheduledNotification,
    fire_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    pending: Vec<PendingEntry>,
    delivered: Vec<ScheduledNotification>,
    authorization_requests: Vec<Permissions>,
    granted: Permissions,
}

#[derive(Debug, Default)]
pub struct MemoryCenter {
    state: Mutex<MemoryState>,
    resource_dir: Option<PathBuf>,
    policy: AuthorizationPolicy,
}

impl MemoryCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.resource_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_policy(mut self, policy: AuthorizationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn add_at(&self, request: ScheduledNotification, now: DateTime<Utc>) {
        let fire_at = seconds_after(now, request.trigger.seconds());
        let mut state = self.state.lock();
        state
            .delivered
            .retain(|delivered| delivered.identifier != request.identifier);
        let entry = PendingEntry { request, fire_at };
        let existing = state
            .pending
            .iter()
            .position(|pending| pending.request.identifier == entry.request.identifier);
        match existing {
            Some(index) => state.pending[index] = entry,
            None => state.pending.push(entry),
        }
    }

    /// Fires every pending request due at or before `now` and returns the
    /// identifiers that were delivered. One-shot requests leave the pending
    /// set; repeating ones are re-armed one interval later.
    pub fn deliver_due(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut state = self.state.lock();
        let mut fired = Vec::new();
        let mut still_pending = Vec::with_capacity(state.pending.len());
        for mut entry in std::mem::take(&mut state.pending) {
            if entry.fire_at > now {
                still_pending.push(entry);
                continue;
            }
            fired.push(entry.request.clone());
            if entry.request.trigger.repeats() {
                let interval = entry.request.trigger.seconds();
                while entry.fire_at <= now {
                    entry.fire_at = seconds_after(entry.fire_at, interval);
                }
                still_pending.push(entry);
            }
        }
        state.pending = still_pending;

        let mut identifiers = Vec::with_capacity(fired.len());
        for request in fired {
            tracing::debug!(id = %request.identifier, "delivering notification");
            identifiers.push(request.identifier.clone());
            state
                .delivered
                .retain(|delivered| delivered.identifier != request.identifier);
            state.delivered.push(request);
        }
        identifiers
    }

    pub fn scheduled(&self, identifier: &str) -> Option<ScheduledNotification> {
        self.state
            .lock()
            .pending
            .iter()
            .find(|entry| entry.request.identifier == identifier)
            .map(|entry| entry.request.clone())
    }

    pub fn authorization_requests(&self) -> Vec<Permissions> {
        self.state.lock().authorization_requests.clone()
    }

    pub fn granted(&self) -> Permissions {
        self.state.lock().granted
    }

    fn resource_path(&self, name: &str) -> Result<PathBuf, NotificationError> {
        let dir = self
            .resource_dir
            .as_ref()
            .ok_or_else(|| NotificationError::attachment(name, "no resource bundle configured"))?;
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(NotificationError::attachment(name, "not a resource name"));
        }
        Ok(dir.join(format!("{name}.png")))
    }
}

impl NotificationCenter for MemoryCenter {
    fn request_authorization(
        &self,
        options: Permissions,
        on_complete: Callback<Result<bool, NotificationError>>,
    ) {
        let granted = {
            let mut state = self.state.lock();
            state.authorization_requests.push(options);
            match self.policy {
                AuthorizationPolicy::GrantAll => {
                    let previous = state.granted;
                    state.granted = options.iter().chain(previous.iter()).collect();
                    true
                }
                AuthorizationPolicy::DenyAll => false,
            }
        };
        dispatch(on_complete, Ok(granted));
    }

    fn add(
        &self,
        request: ScheduledNotification,
        on_complete: Callback<Result<(), NotificationError>>,
    ) {
        self.add_at(request, Utc::now());
        dispatch(on_complete, Ok(()));
    }

    fn remove_all_pending(&self) {
        self.state.lock().pending.clear();
    }

    fn remove_all_delivered(&self) {
        self.state.lock().delivered.clear();
    }

    fn remove_pending(&self, identifiers: &[String]) {
        self.state
            .lock()
            .pending
            .retain(|entry| !identifiers.contains(&entry.request.identifier));
    }

    fn remove_delivered(&self, identifiers: &[String]) {
        self.state
            .lock()
            .delivered
            .retain(|request| !identifiers.contains(&request.identifier));
    }

    fn pending(&self, on_complete: Callback<Vec<NotificationRequest>>) {
        let snapshot = self
            .state
            .lock()
            .pending
            .iter()
            .map(|entry| entry.request.snapshot())
            .collect();
        dispatch(on_complete, snapshot);
    }

    fn delivered(&self, on_complete: Callback<Vec<NotificationRequest>>) {
        let snapshot = self
            .state
            .lock()
            .delivered
            .iter()
            .map(ScheduledNotification::snapshot)
            .collect();
        dispatch(on_complete, snapshot);
    }

    fn resolve_image(&self, name: &str) -> Result<ImageAttachment, NotificationError> {
        let path = self.resource_path(name)?;
        let mut header = [0u8; 8];
        File::open(&path)
            .and_then(|mut file| file.read_exact(&mut header))
            .map_err(|err| NotificationError::attachment(name, err.to_string()))?;
        if header != PNG_SIGNATURE {
            return Err(NotificationError::attachment(name, "not a PNG image"));
        }
        Ok(ImageAttachment {
            identifier: IMAGE_ATTACHMENT_ID.to_string(),
            path,
        })
    }
}

/// Far-future delays saturate at the latest representable instant.
fn seconds_after(at: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    Duration::try_seconds(seconds)
        .and_then(|delay| at.checked_add_signed(delay))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Runs a completion handler off the caller's thread, the way the platform
/// delivers them on its own queue.
fn dispatch<T: Send + 'static>(callback: Callback<T>, value: T) {
    let job = Arc::new(Mutex::new(Some((callback, value))));
    let worker_job = Arc::clone(&job);
    let spawned = thread::Builder::new()
        .name("notification-callback".into())
        .spawn(move || {
            if let Some((callback, value)) = worker_job.lock().take() {
                callback(value);
            }
        });
    if let Err(err) = spawned {
        tracing::warn!(%err, "callback thread unavailable; completing inline");
        if let Some((callback, value)) = job.lock().take() {
            callback(value);
        }
    }
}
