use crate::Notification;

use chrono::{TimeZone, Utc};

#[test]
fn given_frame_body_with_read_flag_when_deserialized_then_not_read() {
    let json = r#"{"id":1,"title":"Hi","message":"Test","read":false}"#;

    let notification: Notification = serde_json::from_str(json).unwrap();

    assert_eq!(notification.id, 1);
    assert_eq!(notification.title, "Hi");
    assert_eq!(notification.message, "Test");
    assert!(!notification.is_read);
    assert_eq!(notification.created_at, None);
}

#[test]
fn given_camel_case_body_when_deserialized_then_all_fields_mapped() {
    let json = r#"{
        "id": 7,
        "title": "Order shipped",
        "message": "Order #991 is on its way",
        "type": "ORDER",
        "link": "/orders/991",
        "isRead": true,
        "createdAt": "2024-05-01T10:00:00"
    }"#;

    let notification: Notification = serde_json::from_str(json).unwrap();

    assert_eq!(notification.notification_type.as_deref(), Some("ORDER"));
    assert_eq!(notification.link.as_deref(), Some("/orders/991"));
    assert!(notification.is_read);
    assert_eq!(
        notification.created_at,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
    );
}

#[test]
fn given_unread_notification_when_marked_read_then_reports_change_once() {
    let mut notification = Notification::new(3, "Hi", "Test");

    assert!(notification.mark_read());
    assert!(!notification.mark_read());
    assert!(notification.is_read);
}

#[test]
fn given_body_without_id_when_deserialized_then_error() {
    let result = serde_json::from_str::<Notification>(r#"{"title":"Hi"}"#);

    assert!(result.is_err());
}

#[test]
fn given_both_read_and_is_read_when_deserialized_then_is_read_wins() {
    let json = r#"{"id":1,"title":"Hi","message":"Test","read":true,"isRead":false}"#;

    let notification: Notification = serde_json::from_str(json).unwrap();

    assert!(!notification.is_read);
}

#[test]
fn given_only_snake_case_created_at_when_deserialized_then_mapped() {
    let json = r#"{"id":2,"created_at":"2024-05-01T10:00:00"}"#;

    let notification: Notification = serde_json::from_str(json).unwrap();

    assert_eq!(
        notification.created_at,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
    );
}
