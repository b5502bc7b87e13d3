use crate::parse_timestamp;

use chrono::{TimeZone, Utc};
use googletest::assert_that;
use googletest::prelude::{anything, err, ok};

#[test]
fn given_rfc3339_with_offset_when_parsed_then_converted_to_utc() {
    let parsed = parse_timestamp("2024-05-01T17:00:00+07:00").unwrap();

    assert_eq!(
        parsed,
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    );
}

#[test]
fn given_zoneless_datetime_when_parsed_then_read_as_utc() {
    let parsed = parse_timestamp("2024-05-01T10:00:00").unwrap();

    assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
}

#[test]
fn given_zoneless_datetime_with_fraction_when_parsed_then_keeps_millis() {
    let parsed = parse_timestamp("2024-05-01T10:00:00.250").unwrap();

    assert_eq!(parsed.timestamp_subsec_millis(), 250);
}

#[test]
fn given_epoch_millis_when_parsed_then_ok() {
    let parsed = parse_timestamp("1714557600000").unwrap();

    assert_eq!(parsed.timestamp_millis(), 1_714_557_600_000);
}

#[test]
fn given_padded_rfc3339_when_parsed_then_ok() {
    assert_that!(parse_timestamp("  2024-05-01T10:00:00Z "), ok(anything()));
}

#[test]
fn given_garbage_when_parsed_then_error() {
    assert_that!(parse_timestamp("yesterday-ish"), err(anything()));
}
