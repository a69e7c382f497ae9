//! # Location Resolver
//!
//! Maps a datacenter code (usually an IATA airport code such as `FRA`) to a
//! region and city. The table is loaded once and only read afterwards, so it
//! can be shared between tasks behind an `Arc` without locking.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::DatasetError;

/// One datacenter entry, as published in the location dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub iata: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    #[serde(default)]
    pub cca2: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    by_code: HashMap<String, Location>,
}

impl LocationTable {
    pub fn new(locations: impl IntoIterator<Item = Location>) -> Self {
        let by_code = locations
            .into_iter()
            .filter(|loc| !loc.iata.is_empty())
            .map(|loc| (loc.iata.clone(), loc))
            .collect();
        Self { by_code }
    }

    /// Parses a JSON array of location records.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let locations: Vec<Location> = serde_json::from_str(json)?;
        Ok(Self::new(locations))
    }

    /// Loads the table from a JSON file. An empty table is an error.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let json = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json(&json).map_err(|source| DatasetError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if table.is_empty() {
            return Err(DatasetError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(table)
    }

    /// Exact-match lookup by datacenter code.
    pub fn resolve(&self, code: &str) -> Option<&Location> {
        self.by_code.get(code)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
