pub mod center;
pub mod config;
pub mod error;
pub mod memory;
pub mod model;
pub mod permission;
pub mod service;

#[cfg(target_vendor = "apple")]
pub mod apple;

pub use crate::center::{platform_center, Completion, NotificationCenter};
pub use crate::config::BridgeConfig;
pub use crate::error::NotificationError;
pub use crate::model::{
    ImageAttachment, NotificationContent, NotificationRequest, ScheduledNotification, Trigger,
};
pub use crate::permission::{Permission, Permissions};
pub use crate::service::{NotificationService, NotificationServiceBuilder};
