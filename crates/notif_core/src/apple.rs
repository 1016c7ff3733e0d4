//! `UNUserNotificationCenter` backend for iOS, macOS and visionOS.
//!
//! All Objective-C interop lives here. Completion handlers are wrapped in
//! `block2` blocks; each block forwards to its Rust callback at most once.

#![allow(unused_unsafe)]

use std::path::PathBuf;
use std::ptr::NonNull;

use block2::RcBlock;
use objc2::rc::Retained;
use objc2::runtime::Bool;
use objc2_foundation::{NSArray, NSBundle, NSError, NSString, NSURL};
use objc2_user_notifications::{
    UNAuthorizationOptions, UNMutableNotificationContent, UNNotification,
    UNNotificationAttachment, UNNotificationContent, UNNotificationRequest, UNNotificationSound,
    UNNotificationTrigger, UNTimeIntervalNotificationTrigger, UNUserNotificationCenter,
};
use parking_lot::Mutex;

use crate::center::{Callback, NotificationCenter};
use crate::error::NotificationError;
use crate::model::{
    ImageAttachment, NotificationRequest, ScheduledNotification, IMAGE_ATTACHMENT_ID,
};
use crate::permission::{Permission, Permissions};

#[derive(Debug, Default)]
pub struct AppleCenter {
    _private: (),
}

impl AppleCenter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn current() -> Retained<UNUserNotificationCenter> {
    unsafe { UNUserNotificationCenter::currentNotificationCenter() }
}

fn authorization_options(permissions: Permissions) -> UNAuthorizationOptions {
    permissions
        .iter()
        .fold(UNAuthorizationOptions::empty(), |options, permission| {
            options
                | match permission {
                    Permission::Alert => UNAuthorizationOptions::Alert,
                    Permission::Sound => UNAuthorizationOptions::Sound,
                    Permission::Badge => UNAuthorizationOptions::Badge,
                    Permission::CarPlay => UNAuthorizationOptions::CarPlay,
                    Permission::CriticalAlert => UNAuthorizationOptions::CriticalAlert,
                    Permission::Provisional => UNAuthorizationOptions::Provisional,
                }
        })
}

/// Adapts a one-shot callback to the `Fn` shape blocks require.
fn once<T>(callback: Callback<T>) -> impl Fn(T) {
    let slot = Mutex::new(Some(callback));
    move |value: T| {
        if let Some(callback) = slot.lock().take() {
            callback(value);
        }
    }
}

fn error_message(error: *mut NSError) -> Option<String> {
    // SAFETY: the framework passes either nil or a valid NSError that lives
    // for the duration of the completion handler.
    unsafe { error.as_ref() }.map(|error| unsafe { error.localizedDescription() }.to_string())
}

fn identifiers_array(identifiers: &[String]) -> Retained<NSArray<NSString>> {
    let strings: Vec<Retained<NSString>> = identifiers
        .iter()
        .map(|identifier| NSString::from_str(identifier))
        .collect();
    NSArray::from_retained_slice(&strings)
}

fn snapshot(request: &UNNotificationRequest) -> NotificationRequest {
    let content = unsafe { request.content() };
    NotificationRequest {
        identifier: unsafe { request.identifier() }.to_string(),
        title: unsafe { content.title() }.to_string(),
        subtitle: unsafe { content.subtitle() }.to_string(),
        body: unsafe { content.body() }.to_string(),
    }
}

fn build_attachment(image: &ImageAttachment) -> Option<Retained<UNNotificationAttachment>> {
    let path = NSString::from_str(&image.path.to_string_lossy());
    let url = unsafe { NSURL::fileURLWithPath(&path) };
    let identifier = NSString::from_str(&image.identifier);
    match unsafe {
        UNNotificationAttachment::attachmentWithIdentifier_URL_options_error(&identifier, &url, None)
    } {
        Ok(attachment) => Some(attachment),
        Err(error) => {
            let err = NotificationError::attachment(
                &image.identifier,
                unsafe { error.localizedDescription() }.to_string(),
            );
            tracing::debug!(%err, path = %image.path.display(), "dropping attachment");
            None
        }
    }
}

fn build_content(request: &ScheduledNotification) -> Retained<UNMutableNotificationContent> {
    let content = unsafe { UNMutableNotificationContent::new() };
    unsafe {
        content.setTitle(&NSString::from_str(&request.content.title));
        content.setSubtitle(&NSString::from_str(&request.content.subtitle));
        content.setBody(&NSString::from_str(&request.content.body));
        content.setSound(Some(&*UNNotificationSound::defaultSound()));
    }

    let attachments: Vec<Retained<UNNotificationAttachment>> = request
        .content
        .attachments
        .iter()
        .filter_map(build_attachment)
        .collect();
    if !attachments.is_empty() {
        unsafe { content.setAttachments(&NSArray::from_retained_slice(&attachments)) };
    }
    content
}

impl NotificationCenter for AppleCenter {
    fn request_authorization(
        &self,
        options: Permissions,
        on_complete: Callback<Result<bool, NotificationError>>,
    ) {
        let on_complete = once(on_complete);
        let block = RcBlock::new(move |granted: Bool, error: *mut NSError| {
            let result = match error_message(error) {
                Some(message) => Err(NotificationError::Permission(message)),
                None => Ok(granted.as_bool()),
            };
            on_complete(result);
        });
        unsafe {
            current().requestAuthorizationWithOptions_completionHandler(
                authorization_options(options),
                &block,
            )
        };
    }

    fn add(
        &self,
        request: ScheduledNotification,
        on_complete: Callback<Result<(), NotificationError>>,
    ) {
        let content = build_content(&request);
        let content: &UNNotificationContent = &content;
        let trigger = unsafe {
            UNTimeIntervalNotificationTrigger::triggerWithTimeInterval_repeats(
                request.trigger.seconds() as f64,
                request.trigger.repeats(),
            )
        };
        let trigger: &UNNotificationTrigger = &trigger;
        let platform_request = unsafe {
            UNNotificationRequest::requestWithIdentifier_content_trigger(
                &NSString::from_str(&request.identifier),
                content,
                Some(trigger),
            )
        };

        let id = request.identifier;
        let on_complete = once(on_complete);
        let block = RcBlock::new(move |error: *mut NSError| {
            let result = match error_message(error) {
                Some(reason) => Err(NotificationError::Scheduling {
                    id: id.clone(),
                    reason,
                }),
                None => Ok(()),
            };
            on_complete(result);
        });
        unsafe {
            current().addNotificationRequest_withCompletionHandler(&platform_request, Some(&*block))
        };
    }

    fn remove_all_pending(&self) {
        unsafe { current().removeAllPendingNotificationRequests() };
    }

    fn remove_all_delivered(&self) {
        unsafe { current().removeAllDeliveredNotifications() };
    }

    fn remove_pending(&self, identifiers: &[String]) {
        let identifiers = identifiers_array(identifiers);
        unsafe { current().removePendingNotificationRequestsWithIdentifiers(&identifiers) };
    }

    fn remove_delivered(&self, identifiers: &[String]) {
        let identifiers = identifiers_array(identifiers);
        unsafe { current().removeDeliveredNotificationsWithIdentifiers(&identifiers) };
    }

    fn pending(&self, on_complete: Callback<Vec<NotificationRequest>>) {
        let on_complete = once(on_complete);
        let block = RcBlock::new(move |requests: NonNull<NSArray<UNNotificationRequest>>| {
            // SAFETY: the framework hands over a valid array for the duration
            // of the completion handler.
            let requests = unsafe { requests.as_ref() };
            on_complete(requests.iter().map(|request| snapshot(&request)).collect());
        });
        unsafe { current().getPendingNotificationRequestsWithCompletionHandler(&block) };
    }

    fn delivered(&self, on_complete: Callback<Vec<NotificationRequest>>) {
        let on_complete = once(on_complete);
        let block = RcBlock::new(move |notifications: NonNull<NSArray<UNNotification>>| {
            // SAFETY: as above.
            let notifications = unsafe { notifications.as_ref() };
            on_complete(
                notifications
                    .iter()
                    .map(|notification| snapshot(&unsafe { notification.request() }))
                    .collect(),
            );
        });
        unsafe { current().getDeliveredNotificationsWithCompletionHandler(&block) };
    }

    fn resolve_image(&self, name: &str) -> Result<ImageAttachment, NotificationError> {
        let url = unsafe {
            NSBundle::mainBundle().URLForResource_withExtension(
                Some(&*NSString::from_str(name)),
                Some(&*NSString::from_str("png")),
            )
        }
        .ok_or_else(|| NotificationError::attachment(name, "not found in main bundle"))?;
        let path = unsafe { url.path() }
            .ok_or_else(|| NotificationError::attachment(name, "resource URL has no path"))?;
        Ok(ImageAttachment {
            identifier: IMAGE_ATTACHMENT_ID.to_string(),
            path: PathBuf::from(path.to_string()),
        })
    }
}
