//! Cell site directory - maps cell identifiers to geographic coordinates
//!
//! Loaded from a TOML file with one `[[sites]]` table per cell. The
//! directory is a read-only collaborator: the core never depends on it,
//! only the report writer does.

use crate::domain::types::CellId;
use anyhow::Context;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// A single cell site record
#[derive(Debug, Clone, Deserialize)]
pub struct CellSite {
    pub cell_id: CellId,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub coverage_radius_m: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SitesFile {
    #[serde(default)]
    sites: Vec<CellSite>,
}

/// In-memory directory of cell site locations
pub struct CellSiteDirectory {
    sites: FxHashMap<CellId, CellSite>,
    /// File order, for stable iteration
    order: Vec<CellId>,
}

impl CellSiteDirectory {
    pub fn new() -> Self {
        Self { sites: FxHashMap::default(), order: Vec::new() }
    }

    /// Load a directory from a TOML sites file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read sites file {}", path.display()))?;
        let parsed: SitesFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse sites file {}", path.display()))?;

        let mut directory = Self::new();
        for site in parsed.sites {
            directory.insert(site);
        }

        info!(file = %path.display(), sites = %directory.len(), "cell_sites_loaded");
        Ok(directory)
    }

    /// Built-in sample directory (five London-area sites)
    pub fn sample() -> Self {
        let samples = [
            ("001001:0000001", 51.5074, -0.1278, "Central London Tower 1"),
            ("001001:0000002", 51.5155, -0.0922, "East London Tower 1"),
            ("001001:0000003", 51.5007, -0.1246, "Westminster Tower 1"),
            ("001001:0000004", 51.4816, -0.0481, "Greenwich Tower 1"),
            ("001001:0000005", 51.5234, -0.1466, "Paddington Tower 1"),
        ];

        let mut directory = Self::new();
        for (cell_id, latitude, longitude, name) in samples {
            directory.insert(CellSite {
                cell_id: CellId::from(cell_id),
                latitude,
                longitude,
                name: Some(name.to_string()),
                coverage_radius_m: Some(2000),
            });
        }
        directory
    }

    /// Add or replace a site
    pub fn insert(&mut self, site: CellSite) {
        if !self.sites.contains_key(&site.cell_id) {
            self.order.push(site.cell_id.clone());
        }
        self.sites.insert(site.cell_id.clone(), site);
    }

    /// Geographic coordinates for a cell, if known
    pub fn location(&self, cell_id: &CellId) -> Option<(f64, f64)> {
        self.sites.get(cell_id).map(|s| (s.latitude, s.longitude))
    }

    pub fn get(&self, cell_id: &CellId) -> Option<&CellSite> {
        self.sites.get(cell_id)
    }

    /// All sites in file order
    pub fn all(&self) -> Vec<&CellSite> {
        self.order.iter().filter_map(|id| self.sites.get(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl Default for CellSiteDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_sample_directory() {
        let directory = CellSiteDirectory::sample();
        assert_eq!(directory.len(), 5);

        let (lat, lon) = directory.location(&CellId::from("001001:0000001")).unwrap();
        assert!((lat - 51.5074).abs() < 1e-9);
        assert!((lon + 0.1278).abs() < 1e-9);

        assert!(directory.location(&CellId::from("999999:0000000")).is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sites.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[[sites]]
cell_id = "001001:0000001"
latitude = 51.5074
longitude = -0.1278
name = "Central London Tower 1"
coverage_radius_m = 2000

[[sites]]
cell_id = "001001:0000002"
latitude = 51.5155
longitude = -0.0922
"#
        )
        .unwrap();

        let directory = CellSiteDirectory::from_file(&path).unwrap();
        assert_eq!(directory.len(), 2);

        let site = directory.get(&CellId::from("001001:0000001")).unwrap();
        assert_eq!(site.name.as_deref(), Some("Central London Tower 1"));
        assert_eq!(site.coverage_radius_m, Some(2000));

        let site = directory.get(&CellId::from("001001:0000002")).unwrap();
        assert!(site.name.is_none());
    }

    #[test]
    fn test_insert_replaces_preserving_order() {
        let mut directory = CellSiteDirectory::new();
        directory.insert(CellSite {
            cell_id: CellId::from("A"),
            latitude: 1.0,
            longitude: 2.0,
            name: None,
            coverage_radius_m: None,
        });
        directory.insert(CellSite {
            cell_id: CellId::from("B"),
            latitude: 3.0,
            longitude: 4.0,
            name: None,
            coverage_radius_m: None,
        });
        directory.insert(CellSite {
            cell_id: CellId::from("A"),
            latitude: 9.0,
            longitude: 9.0,
            name: None,
            coverage_radius_m: None,
        });

        assert_eq!(directory.len(), 2);
        assert_eq!(directory.location(&CellId::from("A")), Some((9.0, 9.0)));
        let ids: Vec<&str> = directory.all().iter().map(|s| s.cell_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(CellSiteDirectory::from_file("no/such/sites.toml").is_err());
    }
}
