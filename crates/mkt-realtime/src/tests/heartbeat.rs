use crate::Heartbeat;

use std::time::Duration;

const TEN_SECS: Duration = Duration::from_secs(10);

#[test]
fn given_client_offer_when_header_built_then_millis_pair() {
    assert_eq!(Heartbeat::header(TEN_SECS, Duration::ZERO), "10000,0");
}

#[test]
fn given_server_offer_when_negotiated_then_slower_side_wins() {
    let heartbeat = Heartbeat::negotiate(TEN_SECS, TEN_SECS, Some("5000,20000"));

    assert_eq!(heartbeat.outgoing, Duration::from_secs(20));
    assert_eq!(heartbeat.incoming, TEN_SECS);
    assert_eq!(heartbeat.receive_timeout(), Some(Duration::from_secs(20)));
}

#[test]
fn given_server_disables_heartbeats_when_negotiated_then_both_off() {
    let heartbeat = Heartbeat::negotiate(TEN_SECS, TEN_SECS, Some("0,0"));

    assert_eq!(heartbeat, Heartbeat::default());
    assert_eq!(heartbeat.receive_timeout(), None);
}

#[test]
fn given_client_disables_outgoing_when_negotiated_then_only_incoming() {
    let heartbeat = Heartbeat::negotiate(Duration::ZERO, TEN_SECS, Some("10000,10000"));

    assert_eq!(heartbeat.outgoing, Duration::ZERO);
    assert_eq!(heartbeat.incoming, TEN_SECS);
}

#[test]
fn given_missing_or_malformed_header_when_negotiated_then_disabled() {
    assert_eq!(
        Heartbeat::negotiate(TEN_SECS, TEN_SECS, None),
        Heartbeat::default()
    );
    assert_eq!(
        Heartbeat::negotiate(TEN_SECS, TEN_SECS, Some("fast")),
        Heartbeat::default()
    );
}
