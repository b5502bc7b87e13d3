use serde_json::Value;

/// Best-effort human-readable message from a failed response body.
///
/// Looks at `message`, then `error.message`, then a plain `error` string.
/// Blank strings count as missing.
pub fn extract_error_message(body: &Value) -> Option<String> {
    let candidates = [
        body.get("message"),
        body.get("error").and_then(|error| error.get("message")),
        body.get("error"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(String::from)
}

/// `error.code` when the server sends one
pub(crate) fn extract_error_code(body: &Value) -> Option<String> {
    let code = body.get("error").and_then(|error| error.get("code"))?;
    match code {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
