use crate::{Credential, Decoded, FrameBuffer, StompCommand, StompFrame};

use googletest::prelude::*;

fn frames(decoded: Vec<Decoded>) -> Vec<StompFrame> {
    decoded
        .into_iter()
        .filter_map(|item| match item {
            Decoded::Frame(frame) => Some(frame),
            Decoded::Heartbeat => None,
        })
        .collect()
}

#[test]
fn given_subscribe_frame_when_encoded_then_matches_wire_format() {
    let encoded = StompFrame::subscribe("sub-1", "/topic/conversations/42").encode();

    assert_eq!(
        encoded,
        "SUBSCRIBE\nid:sub-1\ndestination:/topic/conversations/42\nack:auto\n\n\0"
    );
}

#[test]
fn given_send_frame_with_body_when_encoded_then_content_length_added() {
    let frame = StompFrame::send_json(
        "/app/notifications/read",
        r#"{"id":1}"#.to_string(),
        Some("read-1-1"),
    );

    assert_eq!(
        frame.encode(),
        "SEND\ndestination:/app/notifications/read\ncontent-type:application/json\nreceipt:read-1-1\ncontent-length:8\n\n{\"id\":1}\0"
    );
}

#[test]
fn given_connect_frame_when_encoded_then_carries_bearer_and_heartbeat() {
    let frame = StompFrame::connect("localhost", &Credential::new("abc123"), "10000,10000");

    assert_that!(frame.get_header("Authorization"), some(eq("Bearer abc123")));
    assert_that!(frame.get_header("heart-beat"), some(eq("10000,10000")));
    assert_that!(frame.get_header("accept-version"), some(eq("1.2,1.1,1.0")));
    assert!(frame.encode().starts_with("CONNECT\n"));
}

#[test]
fn given_header_value_with_colon_when_encoded_then_escaped() {
    let frame = StompFrame::new(StompCommand::Send).header("destination", "/a:b\\c");

    assert_eq!(frame.encode(), "SEND\ndestination:/a\\cb\\\\c\n\n\0");
}

#[test]
fn given_escaped_message_headers_when_decoded_then_unescaped() {
    let payload = "MESSAGE\ndestination:/a\\cb\nnote:line\\nbreak\n\nhi\0";

    let decoded = frames(StompFrame::decode_payload(payload).unwrap());

    assert_that!(decoded, len(eq(1)));
    assert_that!(decoded[0].get_header("destination"), some(eq("/a:b")));
    assert_that!(decoded[0].get_header("note"), some(eq("line\nbreak")));
    assert_eq!(decoded[0].body, "hi");
}

#[test]
fn given_connected_frame_when_decoded_then_headers_left_raw() {
    let payload = "CONNECTED\nversion:1.2\nheart-beat:0,0\nserver:a\\cb\n\n\0";

    let decoded = frames(StompFrame::decode_payload(payload).unwrap());

    assert_eq!(decoded[0].command, StompCommand::Connected);
    assert_that!(decoded[0].get_header("server"), some(eq("a\\cb")));
}

#[test]
fn given_payload_with_frames_and_heartbeats_when_decoded_then_all_returned_in_order() {
    let payload = "\nMESSAGE\ndestination:/x\n\nfirst\0\nMESSAGE\ndestination:/y\n\nsecond\0";

    let decoded = StompFrame::decode_payload(payload).unwrap();

    assert_that!(decoded, len(eq(4)));
    assert_eq!(decoded[0], Decoded::Heartbeat);
    assert_eq!(decoded[2], Decoded::Heartbeat);
    let frames = frames(decoded);
    assert_eq!(frames[0].body, "first");
    assert_eq!(frames[1].body, "second");
}

#[test]
fn given_bare_eol_when_decoded_then_single_heartbeat() {
    let decoded = StompFrame::decode_payload("\n").unwrap();

    assert_eq!(decoded, vec![Decoded::Heartbeat]);
}

#[test]
fn given_content_length_when_decoded_then_body_may_contain_nul() {
    let payload = "MESSAGE\ncontent-length:5\n\na\0bcd\0";

    let decoded = frames(StompFrame::decode_payload(payload).unwrap());

    assert_eq!(decoded[0].body, "a\0bcd");
}

#[test]
fn given_crlf_line_endings_when_decoded_then_accepted() {
    let payload = "MESSAGE\r\ndestination:/x\r\n\r\nhi\0";

    let decoded = frames(StompFrame::decode_payload(payload).unwrap());

    assert_that!(decoded[0].get_header("destination"), some(eq("/x")));
    assert_eq!(decoded[0].body, "hi");
}

#[test]
fn given_repeated_header_when_read_then_first_occurrence_wins() {
    let payload = "MESSAGE\nfoo:first\nfoo:second\n\n\0";

    let decoded = frames(StompFrame::decode_payload(payload).unwrap());

    assert_that!(decoded[0].get_header("foo"), some(eq("first")));
}

#[test]
fn given_frame_without_nul_when_decoded_then_error() {
    let result = StompFrame::decode_payload("MESSAGE\ndestination:/x\n\nhi");

    assert_that!(result, err(anything()));
}

#[test]
fn given_unknown_command_when_decoded_then_error() {
    let result = StompFrame::decode_payload("BOGUS\n\n\0");

    assert_that!(result, err(anything()));
}

#[test]
fn given_undefined_escape_when_decoded_then_error() {
    let result = StompFrame::decode_payload("MESSAGE\nfoo:bad\\t\n\n\0");

    assert_that!(result, err(anything()));
}

#[test]
fn given_content_length_past_body_when_decoded_then_error() {
    let result = StompFrame::decode_payload("MESSAGE\ncontent-length:50\n\nshort\0");

    assert_that!(result, err(anything()));
}

#[test]
fn given_frame_split_across_payloads_when_buffered_then_decoded_once_complete() {
    let mut buffer = FrameBuffer::new();

    let first = buffer.push("MESSAGE\ndestination:/x\n\nhel").unwrap();
    let second = buffer.push("lo\0").unwrap();

    assert_that!(first, is_empty());
    let decoded = frames(second);
    assert_that!(decoded, len(eq(1)));
    assert_eq!(decoded[0].body, "hello");
    assert_that!(buffer.pending_len(), eq(0));
}

#[test]
fn given_split_inside_header_block_when_buffered_then_headers_intact() {
    let mut buffer = FrameBuffer::new();

    assert_that!(buffer.push("MESSAGE\ndesti").unwrap(), is_empty());
    let decoded = frames(buffer.push("nation:/x\n\nhi\0").unwrap());

    assert_that!(decoded[0].get_header("destination"), some(eq("/x")));
}

#[test]
fn given_content_length_body_split_after_inner_nul_when_buffered_then_whole_body_kept() {
    let mut buffer = FrameBuffer::new();

    assert_that!(buffer.push("MESSAGE\ncontent-length:5\n\na\0b").unwrap(), is_empty());
    let decoded = frames(buffer.push("cd\0").unwrap());

    assert_eq!(decoded[0].body, "a\0bcd");
}

#[test]
fn given_complete_frame_followed_by_partial_when_buffered_then_first_returned_rest_held() {
    let mut buffer = FrameBuffer::new();

    let decoded = frames(
        buffer
            .push("MESSAGE\ndestination:/x\n\none\0MESSAGE\ndestination:/y\n\ntw")
            .unwrap(),
    );

    assert_that!(decoded, len(eq(1)));
    assert_eq!(decoded[0].body, "one");
    assert!(buffer.pending_len() > 0);

    let decoded = frames(buffer.push("o\0").unwrap());
    assert_eq!(decoded[0].body, "two");
    assert_that!(decoded[0].get_header("destination"), some(eq("/y")));
}

#[test]
fn given_heartbeat_between_partial_payloads_when_buffered_then_not_mistaken_for_frame_text() {
    let mut buffer = FrameBuffer::new();

    let decoded = buffer.push("\nMESSAGE\n").unwrap();
    assert_eq!(decoded, vec![Decoded::Heartbeat]);

    let decoded = frames(buffer.push("destination:/x\n\nhi\0").unwrap());
    assert_eq!(decoded[0].body, "hi");
}

#[test]
fn given_malformed_frame_when_buffered_then_error_and_buffer_reset() {
    let mut buffer = FrameBuffer::new();

    assert_that!(buffer.push("BOGUS\n\n\0"), err(anything()));
    assert_that!(buffer.pending_len(), eq(0));

    let decoded = frames(buffer.push("MESSAGE\n\nok\0").unwrap());
    assert_eq!(decoded[0].body, "ok");
}

#[test]
fn given_partial_frame_past_limit_when_buffered_then_error() {
    let mut buffer = FrameBuffer::new();
    let huge = format!("MESSAGE\n\n{}", "x".repeat(2 << 20));

    assert_that!(buffer.push(&huge), err(anything()));
    assert_that!(buffer.pending_len(), eq(0));
}
