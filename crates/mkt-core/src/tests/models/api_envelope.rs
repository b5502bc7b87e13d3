use crate::{ApiEnvelope, EnvelopeStatus};

#[test]
fn given_numeric_success_status_when_checked_then_success() {
    let envelope: ApiEnvelope<Vec<i64>> =
        serde_json::from_str(r#"{"status":200,"message":"OK","data":[1,2]}"#).unwrap();

    assert!(envelope.is_success());
    assert_eq!(envelope.into_data(), Some(vec![1, 2]));
}

#[test]
fn given_textual_error_status_when_checked_then_not_success() {
    let envelope: ApiEnvelope<()> =
        serde_json::from_str(r#"{"status":"error","message":"Token expired"}"#).unwrap();

    assert!(!envelope.is_success());
    assert_eq!(envelope.message.as_deref(), Some("Token expired"));
}

#[test]
fn given_missing_status_when_checked_then_success() {
    let envelope: ApiEnvelope<String> = serde_json::from_str(r#"{"data":"x"}"#).unwrap();

    assert!(envelope.is_success());
}

#[test]
fn given_status_codes_when_classified_then_only_2xx_succeed() {
    assert!(EnvelopeStatus::Code(201).is_success());
    assert!(!EnvelopeStatus::Code(404).is_success());
    assert!(EnvelopeStatus::Text("SUCCESS".to_string()).is_success());
}
