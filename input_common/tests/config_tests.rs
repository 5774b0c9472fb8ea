//! Configuration loading tests against real files.

use input_common::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
use input_common::fourcc::FourCC;
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug, Deserialize)]
struct ProbeConfig {
    shared: SharedConfig,
    device_format: FourCC,
    device_id: u32,
}

#[test]
fn load_missing_file() {
    let result = ProbeConfig::load(Path::new("/nonexistent/input/probe.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound)));
}

#[test]
fn load_invalid_toml() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "device_id = [").unwrap();

    let result = ProbeConfig::load(file.path());
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn load_invalid_fourcc() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"device_format = "GAMEPAD"
device_id = 3

[shared]
service_name = "probe"
"#
    )
    .unwrap();
    file.flush().unwrap();

    let result = ProbeConfig::load(file.path());
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn load_success_with_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"device_format = "GPAD"
device_id = 3

[shared]
service_name = "probe"
"#
    )
    .unwrap();
    file.flush().unwrap();

    let config = ProbeConfig::load(file.path()).unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Info);
    assert_eq!(config.shared.service_name, "probe");
    assert_eq!(config.device_format, FourCC::from_bytes(*b"GPAD"));
    assert_eq!(config.device_id, 3);
    assert!(config.shared.validate().is_ok());
}
