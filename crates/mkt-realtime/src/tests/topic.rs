use crate::Topic;

use googletest::prelude::*;

#[test]
fn given_each_topic_kind_when_destination_built_then_bit_exact() {
    assert_eq!(
        Topic::user_notifications("user@example.com").destination(),
        "/user/user@example.com/queue/notifications"
    );
    assert_eq!(
        Topic::conversation("42").destination(),
        "/topic/conversations/42"
    );
    assert_eq!(
        Topic::seller_notifications("17").destination(),
        "/topic/notifications/17"
    );
}

#[test]
fn given_known_destinations_when_parsed_then_classified() {
    assert_eq!(
        Topic::parse("/user/user@example.com/queue/notifications"),
        Topic::user_notifications("user@example.com")
    );
    assert_eq!(
        Topic::parse("/topic/conversations/42"),
        Topic::conversation("42")
    );
    assert_eq!(
        Topic::parse("/topic/notifications/17"),
        Topic::seller_notifications("17")
    );
}

#[test]
fn given_unknown_destination_when_parsed_then_custom() {
    assert_eq!(
        Topic::parse("/topic/orders/9"),
        Topic::Custom("/topic/orders/9".to_string())
    );
    assert_eq!(
        Topic::parse("/topic/conversations/"),
        Topic::Custom("/topic/conversations/".to_string())
    );
}

#[test]
fn given_notification_topics_when_checked_then_flagged() {
    assert!(Topic::user_notifications("a").is_notification());
    assert!(Topic::seller_notifications("a").is_notification());
    assert!(!Topic::conversation("a").is_notification());
    assert_that!(Topic::conversation("42").conversation_id(), some(eq("42")));
}

#[test]
fn given_topic_when_displayed_then_destination() {
    assert_eq!(
        Topic::conversation("conversation-42").to_string(),
        "/topic/conversations/conversation-42"
    );
}
