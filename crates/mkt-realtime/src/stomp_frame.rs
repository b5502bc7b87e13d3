//! STOMP 1.2 frame encoding and decoding.
//!
//! A websocket text message may carry several frames back to back, and bare
//! EOLs between frames are heart-beats. One frame may also span several
//! messages; [`FrameBuffer`] stitches those back together.

use crate::{Credential, RealtimeError, Result as RealtimeErrorResult, StompCommand};

use std::fmt::Write as _;

pub const ACCEPT_VERSION: &str = "1.2,1.1,1.0";
pub const HEARTBEAT_EOL: &str = "\n";
const NUL: char = '\0';
const MAX_PARTIAL_FRAME_BYTES: usize = 1 << 20;

/// One decoded unit of an inbound payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Frame(StompFrame),
    Heartbeat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StompFrame {
    pub command: StompCommand,
    headers: Vec<(String, String)>,
    pub body: String,
}

impl StompFrame {
    pub fn new(command: StompCommand) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First occurrence wins, as STOMP 1.2 requires for repeated headers
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn connect(host: &str, credential: &Credential, heart_beat: &str) -> Self {
        Self::new(StompCommand::Connect)
            .header("accept-version", ACCEPT_VERSION)
            .header("host", host)
            .header("heart-beat", heart_beat)
            .header("Authorization", credential.bearer())
    }

    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::new(StompCommand::Subscribe)
            .header("id", id)
            .header("destination", destination)
            .header("ack", "auto")
    }

    pub fn unsubscribe(id: &str) -> Self {
        Self::new(StompCommand::Unsubscribe).header("id", id)
    }

    pub fn send_json(destination: &str, json: String, receipt: Option<&str>) -> Self {
        let mut frame = Self::new(StompCommand::Send)
            .header("destination", destination)
            .header("content-type", "application/json");
        if let Some(receipt) = receipt {
            frame = frame.header("receipt", receipt);
        }
        frame.body(json)
    }

    pub fn disconnect() -> Self {
        Self::new(StompCommand::Disconnect)
    }

    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(64 + self.body.len());

        out.push_str(self.command.as_str());
        out.push('\n');

        for (name, value) in &self.headers {
            if escape {
                let _ = write!(out, "{}:{}\n", escape_header(name), escape_header(value));
            } else {
                let _ = write!(out, "{name}:{value}\n");
            }
        }

        if !self.body.is_empty() && self.get_header("content-length").is_none() {
            let _ = write!(out, "content-length:{}\n", self.body.len());
        }

        out.push('\n');
        out.push_str(&self.body);
        out.push(NUL);
        out
    }

    /// Decode every frame and heart-beat in one transport payload.
    #[track_caller]
    pub fn decode_payload(payload: &str) -> RealtimeErrorResult<Vec<Decoded>> {
        let (decoded, _, missing) = Self::decode_prefix(payload)?;
        match missing {
            Some(reason) => Err(RealtimeError::invalid_frame(reason)),
            None => Ok(decoded),
        }
    }

    /// Decode the complete frames at the front of `input`. Also returns how
    /// many bytes were consumed and, when a frame is cut short, what is
    /// still missing from it.
    #[track_caller]
    fn decode_prefix(
        input: &str,
    ) -> RealtimeErrorResult<(Vec<Decoded>, usize, Option<&'static str>)> {
        let mut decoded = Vec::new();
        let mut rest = input;

        loop {
            let trimmed = rest.trim_start_matches(['\r', '\n']);
            if trimmed.len() != rest.len() {
                decoded.push(Decoded::Heartbeat);
            }
            rest = trimmed;

            if rest.is_empty() {
                return Ok((decoded, input.len(), None));
            }

            match Self::decode_one(rest)? {
                Step::Frame(frame, remaining) => {
                    decoded.push(Decoded::Frame(frame));
                    rest = remaining;
                }
                Step::Incomplete(reason) => {
                    return Ok((decoded, input.len() - rest.len(), Some(reason)));
                }
            }
        }
    }

    #[track_caller]
    fn decode_one(input: &str) -> RealtimeErrorResult<Step<'_>> {
        let Some((command_line, mut rest)) = split_line(input) else {
            return Ok(Step::Incomplete("frame has no command line"));
        };
        let command: StompCommand = command_line.parse()?;
        let escape = command.escapes_headers();

        let mut frame = Self::new(command);
        loop {
            let Some((line, remaining)) = split_line(rest) else {
                return Ok(Step::Incomplete("unterminated header block"));
            };
            rest = remaining;

            if line.is_empty() {
                break;
            }

            let (name, value) = line.split_once(':').ok_or_else(|| {
                RealtimeError::invalid_frame(format!("malformed header line '{line}'"))
            })?;

            if escape {
                frame
                    .headers
                    .push((unescape_header(name)?, unescape_header(value)?));
            } else {
                frame.headers.push((name.to_string(), value.to_string()));
            }
        }

        let body_len = match frame.get_header("content-length") {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|_| {
                RealtimeError::invalid_frame(format!("bad content-length '{raw}'"))
            })?),
            None => None,
        };

        let body_end = match body_len {
            Some(len) => {
                if rest.len() <= len {
                    return Ok(Step::Incomplete(
                        "body does not end with NUL at content-length",
                    ));
                }
                if rest.get(len..).is_none_or(|tail| !tail.starts_with(NUL)) {
                    return Err(RealtimeError::invalid_frame(
                        "body does not end with NUL at content-length",
                    ));
                }
                len
            }
            None => match rest.find(NUL) {
                Some(end) => end,
                None => return Ok(Step::Incomplete("frame is missing NUL terminator")),
            },
        };

        frame.body = rest[..body_end].to_string();
        Ok(Step::Frame(frame, &rest[body_end + NUL.len_utf8()..]))
    }
}

enum Step<'a> {
    Frame(StompFrame, &'a str),
    /// The input ends before the frame does
    Incomplete(&'static str),
}

/// Reassembles frames that arrive split across several transport payloads.
///
/// Text after the last complete frame is held until its NUL arrives.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    partial: String,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `payload` and decode every frame it completes.
    ///
    /// A malformed frame discards everything buffered so far.
    #[track_caller]
    pub fn push(&mut self, payload: &str) -> RealtimeErrorResult<Vec<Decoded>> {
        self.partial.push_str(payload);

        let (decoded, consumed, missing) = match StompFrame::decode_prefix(&self.partial) {
            Ok(result) => result,
            Err(e) => {
                self.partial.clear();
                return Err(e);
            }
        };
        self.partial.drain(..consumed);

        if missing.is_some() && self.partial.len() > MAX_PARTIAL_FRAME_BYTES {
            self.partial.clear();
            return Err(RealtimeError::invalid_frame(format!(
                "partial frame exceeds {MAX_PARTIAL_FRAME_BYTES} bytes"
            )));
        }

        Ok(decoded)
    }

    /// Bytes waiting for the rest of their frame
    pub fn pending_len(&self) -> usize {
        self.partial.len()
    }
}

/// Split off one line, accepting both LF and CRLF endings
fn split_line(input: &str) -> Option<(&str, &str)> {
    let newline = input.find('\n')?;
    let line = &input[..newline];
    let line = line.strip_suffix('\r').unwrap_or(line);
    Some((line, &input[newline + 1..]))
}

fn escape_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

#[track_caller]
fn unescape_header(raw: &str) -> RealtimeErrorResult<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            other => {
                return Err(RealtimeError::invalid_frame(format!(
                    "undefined escape sequence '\\{}'",
                    other.map(String::from).unwrap_or_default()
                )));
            }
        }
    }
    Ok(out)
}
