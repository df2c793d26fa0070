use provis_kernel::config::{load_config, load_config_str};
use serde::Deserialize;
use std::io::Write;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
struct Settings {
    level: Option<String>,
    features: Vec<String>,
}

#[test]
fn loads_partial_settings_from_a_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(file, "level = \"debug\"")?;
    writeln!(file, "features = [\"color\", \"timestamps\"]")?;

    let settings: Settings = load_config(file.path())?;
    assert_eq!(settings.level.as_deref(), Some("debug"));
    assert_eq!(settings.features, ["color", "timestamps"]);
    Ok(())
}

#[test]
fn missing_fields_stay_unset() {
    let settings: Settings = load_config_str("").expect("empty document is valid");
    assert_eq!(settings, Settings::default());
}

#[test]
fn missing_file_is_an_error() {
    let err = load_config::<Settings>("definitely/not/here.toml").unwrap_err();
    assert!(err.to_string().contains("Failed to build config"));
}
