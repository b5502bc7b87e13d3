use crate::LogLevel;

use log::LevelFilter;

#[test]
fn given_known_level_names_when_parsed_then_mapped() {
    assert_eq!(LogLevel::parse_lenient("DEBUG").0, LevelFilter::Debug);
    assert_eq!(LogLevel::parse_lenient("warn").0, LevelFilter::Warn);
    assert_eq!(LogLevel::parse_lenient("off").0, LevelFilter::Off);
}

#[test]
fn given_unknown_level_when_parsed_then_defaults_to_info() {
    assert_eq!(LogLevel::parse_lenient("loud").0, LevelFilter::Info);
}

#[test]
fn given_toml_level_when_deserialized_then_wrapped() {
    #[derive(serde::Deserialize)]
    struct Holder {
        level: LogLevel,
    }

    let holder: Holder = toml::from_str("level = \"trace\"").unwrap();

    assert_eq!(*holder.level, LevelFilter::Trace);
}
