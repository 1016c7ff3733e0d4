use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::NotificationError;

/// Shortest interval the platform accepts for a repeating time-interval trigger.
pub const MIN_REPEAT_INTERVAL_SECS: i64 = 60;

/// Attachment identifier used for bundled images.
pub const IMAGE_ATTACHMENT_ID: &str = "image";

/// Snapshot of one pending or delivered notification, copied out of the
/// platform store at query time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationRequest {
    pub identifier: String,
    pub title: String,
    pub subtitle: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageAttachment {
    pub identifier: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub attachments: Vec<ImageAttachment>,
}

impl NotificationContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_attachment(mut self, attachment: ImageAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Trigger {
    TimeInterval { seconds: i64, repeats: bool },
}

impl Trigger {
    /// Builds a time-interval trigger, rejecting intervals the platform would
    /// refuse at construction time.
    pub fn time_interval(seconds: i64, repeats: bool) -> Result<Self, NotificationError> {
        if seconds <= 0 {
            return Err(NotificationError::InvalidTrigger(format!(
                "time interval must be positive, got {seconds}s"
            )));
        }
        if repeats && seconds < MIN_REPEAT_INTERVAL_SECS {
            return Err(NotificationError::InvalidTrigger(format!(
                "repeating interval must be at least {MIN_REPEAT_INTERVAL_SECS}s, got {seconds}s"
            )));
        }
        Ok(Self::TimeInterval { seconds, repeats })
    }

    pub fn seconds(&self) -> i64 {
        match self {
            Self::TimeInterval { seconds, .. } => *seconds,
        }
    }

    pub fn repeats(&self) -> bool {
        match self {
            Self::TimeInterval { repeats, .. } => *repeats,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledNotification {
    pub identifier: String,
    pub content: NotificationContent,
    pub trigger: Trigger,
}

impl ScheduledNotification {
    pub fn snapshot(&self) -> NotificationRequest {
        NotificationRequest {
            identifier: self.identifier.clone(),
            title: self.content.title.clone(),
            subtitle: self.content.subtitle.clone(),
            body: self.content.body.clone(),
        }
    }
}
