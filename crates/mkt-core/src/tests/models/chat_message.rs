use crate::{ChatMessage, ChatMessageDraft};

#[test]
fn given_numeric_ids_when_deserialized_then_stored_as_strings() {
    let json = r#"{
        "id": 10,
        "conversationId": 42,
        "senderId": 5,
        "receiverId": "seller-9",
        "content": "Is this still available?",
        "createdAt": 1714557600000
    }"#;

    let message: ChatMessage = serde_json::from_str(json).unwrap();

    assert_eq!(message.id, Some(10));
    assert_eq!(message.conversation_id.as_deref(), Some("42"));
    assert_eq!(message.sender_id.as_deref(), Some("5"));
    assert_eq!(message.receiver_id.as_deref(), Some("seller-9"));
    assert_eq!(
        message.created_at.map(|t| t.timestamp_millis()),
        Some(1_714_557_600_000)
    );
}

#[test]
fn given_minimal_body_when_deserialized_then_defaults_applied() {
    let message: ChatMessage = serde_json::from_str(r#"{"content":"hello"}"#).unwrap();

    assert_eq!(message.content, "hello");
    assert_eq!(message.conversation_id, None);
    assert_eq!(message.message_type, None);
}

#[test]
fn given_draft_when_serialized_then_uses_camel_case_and_type() {
    let draft = ChatMessageDraft::text("42", "user-1", "hi").with_receiver("seller-9");

    let json = serde_json::to_value(&draft).unwrap();

    assert_eq!(json["conversationId"], "42");
    assert_eq!(json["senderId"], "user-1");
    assert_eq!(json["receiverId"], "seller-9");
    assert_eq!(json["type"], "TEXT");
}

#[test]
fn given_blank_content_when_validated_then_error() {
    let draft = ChatMessageDraft::text("42", "user-1", "   ");

    assert!(draft.validate().is_err());
}

#[test]
fn given_every_timestamp_spelling_when_deserialized_then_created_at_wins() {
    let json = r#"{
        "content": "hello",
        "createdAt": 1714557600000,
        "created_at": 1600000000000,
        "timestamp": 1500000000000,
        "type": "TEXT",
        "messageType": "IMAGE"
    }"#;

    let message: ChatMessage = serde_json::from_str(json).unwrap();

    assert_eq!(
        message.created_at.map(|t| t.timestamp_millis()),
        Some(1_714_557_600_000)
    );
    assert_eq!(message.message_type.as_deref(), Some("TEXT"));
}
