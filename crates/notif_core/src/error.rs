use thiserror::Error;

/// Failures raised while talking to the platform notification center.
///
/// None of these cross the C boundary; the service logs them and moves on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("notification permission request failed: {0}")]
    Permission(String),
    #[error("notification permission was not granted")]
    PermissionDenied,
    #[error("invalid trigger: {0}")]
    InvalidTrigger(String),
    #[error("scheduling notification `{id}` failed: {reason}")]
    Scheduling { id: String, reason: String },
    #[error("image `{name}` could not be attached: {reason}")]
    Attachment { name: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Permission,
    Scheduling,
    AttachmentResolution,
}

impl NotificationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Permission(_) | Self::PermissionDenied => ErrorKind::Permission,
            Self::InvalidTrigger(_) | Self::Scheduling { .. } => ErrorKind::Scheduling,
            Self::Attachment { .. } => ErrorKind::AttachmentResolution,
        }
    }

    pub fn attachment(name: &str, reason: impl Into<String>) -> Self {
        Self::Attachment {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_trigger_counts_as_scheduling_failure() {
        let err = NotificationError::InvalidTrigger("0s".into());
        assert_eq!(err.kind(), ErrorKind::Scheduling);
        assert_eq!(err.to_string(), "invalid trigger: 0s");
    }

    #[test]
    fn attachment_message_names_the_image() {
        let err = NotificationError::attachment("logo", "not found");
        assert_eq!(err.kind(), ErrorKind::AttachmentResolution);
        assert!(err.to_string().contains("`logo`"));
    }
}
