//! Configuration loading from files on disk.

use std::io::Write;

use order_engine::Algorithm;
use order_engine::config::{ConfigError, load_config};
use rust_decimal_macros::dec;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_file_and_builds_engine() {
    let file = write_config(
        r"
engine:
  starting_cash: 50000
  max_orders: 25
  market_on_close_buffer_minutes: 10
fills:
  partial_fill_volume_fraction: 0.05
fees:
  model: zero
",
    );
    let path = file.path().to_string_lossy().to_string();

    let config = match load_config(Some(&path)) {
        Ok(config) => config,
        Err(e) => panic!("should load config file: {e}"),
    };
    let algorithm = Algorithm::from_config(&config).unwrap();
    assert_eq!(algorithm.portfolio().cash(), dec!(50000));
    assert_eq!(algorithm.settings().max_orders(), 25);
    assert_eq!(
        algorithm.settings().market_on_close_buffer(),
        chrono::Duration::minutes(10)
    );
    assert_eq!(algorithm.settings().partial_fill_volume_fraction(), Some(dec!(0.05)));
}

#[test]
fn interpolates_defaults_from_file() {
    let file = write_config(
        r#"
api:
  user_id: "${ORDER_ENGINE_FILE_TEST_UNSET_USER:-7}"
  token: "${ORDER_ENGINE_FILE_TEST_UNSET_TOKEN}"
"#,
    );
    let path = file.path().to_string_lossy().to_string();

    let config = match load_config(Some(&path)) {
        Ok(config) => config,
        Err(e) => panic!("should load config file: {e}"),
    };
    assert_eq!(config.api.user_id, "7");
    assert!(config.api.token.is_empty());
    assert!(!config.api.has_credentials());
}

#[test]
fn invalid_yaml_is_a_parse_error() {
    let file = write_config("engine: [unterminated");
    let path = file.path().to_string_lossy().to_string();

    let Err(err) = load_config(Some(&path)) else {
        panic!("expected parse error");
    };
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn invalid_values_fail_validation() {
    let file = write_config("engine:\n  starting_cash: -1\n");
    let path = file.path().to_string_lossy().to_string();

    let Err(err) = load_config(Some(&path)) else {
        panic!("expected validation error");
    };
    assert!(matches!(err, ConfigError::ValidationError(_)));
    assert!(err.to_string().contains("starting_cash"));
}
