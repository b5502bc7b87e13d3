//! STOMP heart-beat negotiation.
//!
//! Each side advertises `<cx>,<cy>`: the shortest interval it can send at and
//! the interval it wants to receive at. Zero on either side disables that
//! direction.

use std::time::Duration;

/// Grace factor on the incoming interval before the peer counts as gone
pub const RECEIVE_GRACE_FACTOR: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Heartbeat {
    /// How often the client must write an EOL
    pub outgoing: Duration,
    /// How often the server promised to write
    pub incoming: Duration,
}

impl Heartbeat {
    /// The header value the client advertises on CONNECT
    pub fn header(outgoing: Duration, incoming: Duration) -> String {
        format!("{},{}", outgoing.as_millis(), incoming.as_millis())
    }

    /// Combine the client's offer with the server's `heart-beat` header.
    /// A missing or malformed header disables heart-beating.
    pub fn negotiate(client_out: Duration, client_in: Duration, server: Option<&str>) -> Self {
        let Some((sx, sy)) = server.and_then(parse_header) else {
            return Self::default();
        };

        Self {
            outgoing: combine(client_out, sy),
            incoming: combine(client_in, sx),
        }
    }

    /// Silence longer than this closes the connection; `None` when disabled
    pub fn receive_timeout(&self) -> Option<Duration> {
        (!self.incoming.is_zero()).then(|| self.incoming * RECEIVE_GRACE_FACTOR)
    }
}

fn combine(client: Duration, server: Duration) -> Duration {
    if client.is_zero() || server.is_zero() {
        Duration::ZERO
    } else {
        client.max(server)
    }
}

fn parse_header(raw: &str) -> Option<(Duration, Duration)> {
    let (x, y) = raw.split_once(',')?;
    let x = x.trim().parse::<u64>().ok()?;
    let y = y.trim().parse::<u64>().ok()?;
    Some((Duration::from_millis(x), Duration::from_millis(y)))
}
