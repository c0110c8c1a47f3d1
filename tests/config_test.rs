//! Integration tests for configuration loading

use cellflow::infra::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[tracker]
max_gap_secs = 1800

[sites]
file = "sites/test.toml"

[report]
output = "out/test_map.html"
top_segments = 7
center_lat = 51.5
center_lon = -0.12
zoom = 11
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.max_gap_secs(), 1800);
    assert_eq!(config.sites_file(), "sites/test.toml");
    assert_eq!(config.report_output(), "out/test_map.html");
    assert_eq!(config.top_segments(), 7);
    assert_eq!(config.center_lat(), Some(51.5));
    assert_eq!(config.center_lon(), Some(-0.12));
    assert_eq!(config.zoom(), 11);
}

#[test]
fn test_load_from_path_fallback() {
    let config = Config::load_from_path("/nonexistent/config.toml");
    assert_eq!(config.max_gap_secs(), 3600);
    assert_eq!(config.report_output(), "population_movement.html");
    assert_eq!(config.top_segments(), 10);
}

#[test]
fn test_invalid_toml_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[tracker\nmax_gap_secs = oops").unwrap();
    temp_file.flush().unwrap();

    assert!(Config::from_file(temp_file.path()).is_err());
}
