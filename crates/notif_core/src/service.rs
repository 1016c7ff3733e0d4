use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::center::{platform_center, Callback, Completion, NotificationCenter};
use crate::config::BridgeConfig;
use crate::error::{ErrorKind, NotificationError};
use crate::model::{NotificationContent, NotificationRequest, ScheduledNotification, Trigger};
use crate::permission::Permissions;

/// Fire-and-forget facade over a [`NotificationCenter`].
///
/// Mutating calls hand work to the center and return immediately; failures
/// are logged and dropped. Queries block the calling thread until the center
/// reports back, or until the optional query timeout elapses.
pub struct NotificationService {
    center: Arc<dyn NotificationCenter>,
    query_timeout: Option<Duration>,
}

pub struct NotificationServiceBuilder {
    center: Option<Arc<dyn NotificationCenter>>,
    query_timeout: Option<Duration>,
}

impl NotificationServiceBuilder {
    pub fn new() -> Self {
        Self {
            center: None,
            query_timeout: None,
        }
    }

    pub fn with_center(mut self, center: Arc<dyn NotificationCenter>) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_config(mut self, config: &BridgeConfig) -> Self {
        self.query_timeout = config.query_timeout;
        if self.center.is_none() {
            self.center = configured_center(config);
        }
        self
    }

    pub fn build(self) -> NotificationService {
        NotificationService {
            center: self.center.unwrap_or_else(platform_center),
            query_timeout: self.query_timeout,
        }
    }
}

#[cfg(not(target_vendor = "apple"))]
fn configured_center(config: &BridgeConfig) -> Option<Arc<dyn NotificationCenter>> {
    let mut center = crate::memory::MemoryCenter::new();
    if let Some(dir) = &config.resource_dir {
        center = center.with_resource_dir(dir);
    }
    Some(Arc::new(center))
}

#[cfg(target_vendor = "apple")]
fn configured_center(_config: &BridgeConfig) -> Option<Arc<dyn NotificationCenter>> {
    None
}

impl Default for NotificationServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationService {
    pub fn builder() -> NotificationServiceBuilder {
        NotificationServiceBuilder::new()
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::builder().with_config(config).build()
    }

    pub fn center(&self) -> &Arc<dyn NotificationCenter> {
        &self.center
    }

    pub fn request_permission_default(&self) {
        self.request_permissions(Permissions::standard());
    }

    pub fn request_permission(&self, mask: i32) {
        let permissions = Permissions::from_bits(mask);
        if permissions.bits() != mask {
            tracing::debug!(mask, known = permissions.bits(), "ignoring unknown permission bits");
        }
        self.request_permissions(permissions);
    }

    pub fn request_permissions(&self, permissions: Permissions) {
        tracing::debug!(?permissions, "requesting notification authorization");
        self.center.request_authorization(
            permissions,
            Box::new(|result: Result<bool, NotificationError>| match result {
                Ok(true) => tracing::info!("notification authorization granted"),
                Ok(false) => log_dropped(&NotificationError::PermissionDenied, None),
                Err(err) => log_dropped(&err, None),
            }),
        );
    }

    #[instrument(skip(self, title, body))]
    pub fn schedule(&self, id: &str, title: &str, body: &str, seconds: i64) {
        self.schedule_content(id, NotificationContent::new(title, body), seconds, false);
    }

    #[instrument(skip(self, title, body))]
    pub fn schedule_repeating(&self, id: &str, title: &str, body: &str, seconds: i64) {
        self.schedule_content(id, NotificationContent::new(title, body), seconds, true);
    }

    /// Schedules a one-shot notification carrying the bundled `<image>.png`.
    /// When the image cannot be resolved the notification goes out without it.
    #[instrument(skip(self, title, body))]
    pub fn schedule_image(&self, id: &str, title: &str, body: &str, image: &str, seconds: i64) {
        let mut content = NotificationContent::new(title, body);
        match self.center.resolve_image(image) {
            Ok(attachment) => content = content.with_attachment(attachment),
            Err(err) => log_dropped(&err, Some(id)),
        }
        self.schedule_content(id, content, seconds, false);
    }

    pub fn schedule_content(
        &self,
        id: &str,
        content: NotificationContent,
        seconds: i64,
        repeats: bool,
    ) {
        let trigger = match Trigger::time_interval(seconds, repeats) {
            Ok(trigger) => trigger,
            Err(err) => {
                log_dropped(&err, Some(id));
                return;
            }
        };
        self.submit(ScheduledNotification {
            identifier: id.to_string(),
            content,
            trigger,
        });
    }

    pub fn submit(&self, request: ScheduledNotification) {
        let id = request.identifier.clone();
        self.center.add(
            request,
            Box::new(move |result: Result<(), NotificationError>| {
                if let Err(err) = result {
                    log_dropped(&err, Some(&id));
                }
            }),
        );
    }

    pub fn remove_all_pending(&self) {
        self.center.remove_all_pending();
    }

    pub fn remove_all_delivered(&self) {
        self.center.remove_all_delivered();
    }

    pub fn remove_by_id(&self, id: &str) {
        let identifiers = [id.to_string()];
        self.center.remove_pending(&identifiers);
        self.center.remove_delivered(&identifiers);
    }

    pub fn pending_notifications(&self) -> Vec<NotificationRequest> {
        self.query("pending", |callback| self.center.pending(callback))
    }

    pub fn delivered_notifications(&self) -> Vec<NotificationRequest> {
        self.query("delivered", |callback| self.center.delivered(callback))
    }

    fn query(
        &self,
        what: &'static str,
        start: impl FnOnce(Callback<Vec<NotificationRequest>>),
    ) -> Vec<NotificationRequest> {
        let completion = Completion::new();
        start(completion.callback());
        match self.query_timeout {
            None => completion.wait(),
            Some(timeout) => completion.wait_timeout(timeout).unwrap_or_else(|| {
                tracing::warn!(what, ?timeout, "notification query timed out");
                Vec::new()
            }),
        }
    }
}

/// Failures never reach the caller; this is where they end up.
fn log_dropped(err: &NotificationError, id: Option<&str>) {
    let kind = err.kind();
    let id = id.unwrap_or_default();
    match kind {
        ErrorKind::Permission => tracing::warn!(?kind, %err, "notifications may not be shown"),
        ErrorKind::Scheduling => tracing::warn!(id, ?kind, %err, "notification not scheduled"),
        ErrorKind::AttachmentResolution => {
            tracing::debug!(id, ?kind, %err, "scheduling without attachment")
        }
    }
}
