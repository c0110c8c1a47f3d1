//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. Default: config/dev.toml
//!
//! CLI flags override file values in `main`.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Maximum inactivity gap between visits before a session closes
    #[serde(default = "default_max_gap_secs")]
    pub max_gap_secs: u64,
}

fn default_max_gap_secs() -> u64 {
    3600
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { max_gap_secs: default_max_gap_secs() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SitesConfig {
    /// Path to the cell site directory (TOML)
    #[serde(default = "default_sites_file")]
    pub file: String,
}

fn default_sites_file() -> String {
    "config/cell_sites.toml".to_string()
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self { file: default_sites_file() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Output HTML file for the movement map
    #[serde(default = "default_report_output")]
    pub output: String,
    /// Number of segments shown in the top-segments table
    #[serde(default = "default_top_segments")]
    pub top_segments: usize,
    /// Map center latitude (auto-calculated from sites when absent)
    #[serde(default)]
    pub center_lat: Option<f64>,
    /// Map center longitude (auto-calculated from sites when absent)
    #[serde(default)]
    pub center_lon: Option<f64>,
    /// Initial map zoom level
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

fn default_report_output() -> String {
    "population_movement.html".to_string()
}

fn default_top_segments() -> usize {
    10
}

fn default_zoom() -> u8 {
    12
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_report_output(),
            top_segments: default_top_segments(),
            center_lat: None,
            center_lon: None,
            zoom: default_zoom(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct TomlConfig {
    #[serde(default)]
    tracker: TrackerConfig,
    #[serde(default)]
    sites: SitesConfig,
    #[serde(default)]
    report: ReportConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    max_gap_secs: u64,
    sites_file: String,
    report_output: String,
    top_segments: usize,
    center_lat: Option<f64>,
    center_lon: Option<f64>,
    zoom: u8,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default")
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: &str) -> Self {
        Self {
            max_gap_secs: toml_config.tracker.max_gap_secs,
            sites_file: toml_config.sites.file,
            report_output: toml_config.report.output,
            top_segments: toml_config.report.top_segments,
            center_lat: toml_config.report.center_lat,
            center_lon: toml_config.report.center_lon,
            zoom: toml_config.report.zoom,
            config_file: config_file.to_string(),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self::from_toml(toml_config, &path.display().to_string()))
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "config_load_failed_using_defaults");
                Self::default()
            }
        }
    }

    pub fn max_gap_secs(&self) -> u64 {
        self.max_gap_secs
    }

    pub fn sites_file(&self) -> &str {
        &self.sites_file
    }

    pub fn report_output(&self) -> &str {
        &self.report_output
    }

    pub fn top_segments(&self) -> usize {
        self.top_segments
    }

    pub fn center_lat(&self) -> Option<f64> {
        self.center_lat
    }

    pub fn center_lon(&self) -> Option<f64> {
        self.center_lon
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    // Overrides applied from CLI flags

    pub fn set_max_gap_secs(&mut self, secs: u64) {
        self.max_gap_secs = secs;
    }

    pub fn set_sites_file(&mut self, path: String) {
        self.sites_file = path;
    }

    pub fn set_report_output(&mut self, path: String) {
        self.report_output = path;
    }

    pub fn set_top_segments(&mut self, limit: usize) {
        self.top_segments = limit;
    }

    pub fn set_center(&mut self, lat: Option<f64>, lon: Option<f64>) {
        if lat.is_some() {
            self.center_lat = lat;
        }
        if lon.is_some() {
            self.center_lon = lon;
        }
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_gap_secs(), 3600);
        assert_eq!(config.sites_file(), "config/cell_sites.toml");
        assert_eq!(config.report_output(), "population_movement.html");
        assert_eq!(config.top_segments(), 10);
        assert_eq!(config.zoom(), 12);
        assert!(config.center_lat().is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [tracker]
            max_gap_secs = 1800

            [sites]
            file = "sites/london.toml"

            [report]
            output = "out/map.html"
            top_segments = 5
            center_lat = 51.5
            center_lon = -0.12
            zoom = 10
        "#;
        let toml_config: TomlConfig = toml::from_str(toml_str).unwrap();
        let config = Config::from_toml(toml_config, "test");

        assert_eq!(config.max_gap_secs(), 1800);
        assert_eq!(config.sites_file(), "sites/london.toml");
        assert_eq!(config.report_output(), "out/map.html");
        assert_eq!(config.top_segments(), 5);
        assert_eq!(config.center_lat(), Some(51.5));
        assert_eq!(config.center_lon(), Some(-0.12));
        assert_eq!(config.zoom(), 10);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_config: TomlConfig =
            toml::from_str("[tracker]\nmax_gap_secs = 600\n").unwrap();
        let config = Config::from_toml(toml_config, "test");

        assert_eq!(config.max_gap_secs(), 600);
        assert_eq!(config.top_segments(), 10);
        assert_eq!(config.report_output(), "population_movement.html");
    }

    #[test]
    fn test_load_from_missing_path_falls_back() {
        let config = Config::load_from_path("does/not/exist.toml");
        assert_eq!(config.max_gap_secs(), 3600);
        assert_eq!(config.config_file(), "default");
    }
}
