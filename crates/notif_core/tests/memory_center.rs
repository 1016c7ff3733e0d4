use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Utc};
use notif_core::memory::MemoryCenter;
use notif_core::{NotificationContent, NotificationService, Permission};
use tempfile::tempdir;

const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn service_with(center: &Arc<MemoryCenter>) -> NotificationService {
    NotificationService::builder()
        .with_center(center.clone())
        .build()
}

fn write_png(dir: &Path, name: &str) {
    let mut bytes = PNG_HEADER.to_vec();
    bytes.extend_from_slice(b"\0\0\0\rIHDR");
    fs::write(dir.join(format!("{name}.png")), bytes).expect("write png fixture");
}

#[test]
fn schedule_then_query_returns_the_record() {
    let center = Arc::new(MemoryCenter::new());
    let service = service_with(&center);

    service.schedule("A", "Hi", "body", 5);
    let pending = service.pending_notifications();

    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].identifier, "A");
    assert_eq!(pending[0].title, "Hi");
    assert_eq!(pending[0].subtitle, "");
    assert_eq!(pending[0].body, "body");
}

#[test]
fn far_future_delays_are_still_scheduled() {
    let center = Arc::new(MemoryCenter::new());
    let service = service_with(&center);

    service.schedule("max", "t", "b", i64::MAX);
    service.schedule("big", "t", "b", 100_000_000_000_000);
    service.schedule_repeating("big-repeat", "t", "b", i64::MAX);

    let mut ids: Vec<_> = service
        .pending_notifications()
        .into_iter()
        .map(|request| request.identifier)
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["big", "big-repeat", "max"]);
}

#[test]
fn scheduling_same_id_twice_keeps_one_entry() {
    let center = Arc::new(MemoryCenter::new());
    let service = service_with(&center);

    service.schedule("dup", "first", "one", 30);
    service.schedule_repeating("dup", "second", "two", 120);

    let pending = service.pending_notifications();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].title, "second");
    let stored = center.scheduled("dup").expect("dup pending");
    assert!(stored.trigger.repeats());
}

#[test]
fn removing_unknown_id_is_a_no_op() {
    let center = Arc::new(MemoryCenter::new());
    let service = service_with(&center);
    service.schedule("keep", "t", "b", 1);
    center.deliver_due(Utc::now() + Duration::seconds(2));
    service.schedule("also-keep", "t", "b", 60);

    let pending_before = service.pending_notifications();
    let delivered_before = service.delivered_notifications();
    service.remove_by_id("nobody");

    assert_eq!(service.pending_notifications(), pending_before);
    assert_eq!(service.delivered_notifications(), delivered_before);
}

#[test]
fn remove_by_id_clears_pending_and_delivered() {
    let center = Arc::new(MemoryCenter::new());
    let service = service_with(&center);
    service.schedule("gone", "t", "b", 1);
    center.deliver_due(Utc::now() + Duration::seconds(2));
    assert_eq!(service.delivered_notifications().len(), 1);

    service.schedule("gone-too", "t", "b", 60);
    service.remove_by_id("gone");
    service.remove_by_id("gone-too");

    assert!(service.pending_notifications().is_empty());
    assert!(service.delivered_notifications().is_empty());
}

#[test]
fn remove_all_pending_empties_the_snapshot() {
    let center = Arc::new(MemoryCenter::new());
    let service = service_with(&center);
    for id in ["a", "b", "c"] {
        service.schedule(id, "t", "b", 10);
    }
    service.schedule_repeating("r", "t", "b", 3600);

    service.remove_all_pending();
    assert!(service.pending_notifications().is_empty());
}

#[test]
fn remove_all_delivered_leaves_pending_alone() {
    let center = Arc::new(MemoryCenter::new());
    let service = service_with(&center);
    service.schedule("soon", "t", "b", 1);
    service.schedule("later", "t", "b", 600);
    center.deliver_due(Utc::now() + Duration::seconds(5));

    service.remove_all_delivered();
    assert!(service.delivered_notifications().is_empty());
    let pending = service.pending_notifications();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].identifier, "later");
}

#[test]
fn delivered_notifications_leave_the_pending_set() {
    let center = Arc::new(MemoryCenter::new());
    let service = service_with(&center);
    service.schedule("fires", "t", "b", 2);
    service.schedule("waits", "t", "b", 300);

    let fired = center.deliver_due(Utc::now() + Duration::seconds(3));
    assert_eq!(fired, vec!["fires".to_string()]);

    let pending = service.pending_notifications();
    let delivered = service.delivered_notifications();
    assert!(delivered.iter().any(|request| request.identifier == "fires"));
    for request in &delivered {
        assert!(
            pending
                .iter()
                .all(|candidate| candidate.identifier != request.identifier),
            "{} is both pending and delivered",
            request.identifier
        );
    }
}

#[test]
fn missing_image_still_schedules_without_attachment() {
    let resources = tempdir().expect("tempdir");
    let center = Arc::new(MemoryCenter::new().with_resource_dir(resources.path()));
    let service = service_with(&center);

    service.schedule_image("B", "T", "B", "missing_image", 1);

    let pending = service.pending_notifications();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].identifier, "B");
    let stored = center.scheduled("B").expect("B pending");
    assert!(stored.content.attachments.is_empty());
}

#[test]
fn bundled_image_is_attached() {
    let resources = tempdir().expect("tempdir");
    write_png(resources.path(), "logo");
    fs::write(resources.path().join("fake.png"), b"GIF89a..").expect("write fake");
    let center = Arc::new(MemoryCenter::new().with_resource_dir(resources.path()));
    let service = service_with(&center);

    service.schedule_image("with-logo", "T", "B", "logo", 5);
    service.schedule_image("with-fake", "T", "B", "fake", 5);

    let attached = center.scheduled("with-logo").expect("with-logo pending");
    assert_eq!(attached.content.attachments.len(), 1);
    assert_eq!(attached.content.attachments[0].identifier, "image");
    assert_eq!(
        attached.content.attachments[0].path,
        resources.path().join("logo.png")
    );

    let fake = center.scheduled("with-fake").expect("with-fake pending");
    assert!(fake.content.attachments.is_empty());
}

#[test]
fn permission_mask_three_requests_alert_and_sound() {
    let center = Arc::new(MemoryCenter::new());
    let service = service_with(&center);

    service.request_permission(3);

    let requests = center.authorization_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].iter().collect::<Vec<_>>(),
        vec![Permission::Alert, Permission::Sound]
    );
}

#[test]
fn subtitle_flows_through_custom_content() {
    let center = Arc::new(MemoryCenter::new());
    let service = service_with(&center);
    service.schedule_content(
        "sub",
        NotificationContent::new("Title", "Body").with_subtitle("Subtitle"),
        45,
        false,
    );
    let pending = service.pending_notifications();
    assert_eq!(pending[0].subtitle, "Subtitle");
}
