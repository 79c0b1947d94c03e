//! Crop-disease knowledge catalog.
//!
//! Static lookup data keyed `crop → disease → guidance`, loaded once at
//! startup and shared immutably. A prediction the catalog doesn't know
//! gets generic guidance rather than an error; the report is always
//! complete.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Treatment and prevention guidance for one disease.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DiseaseGuidance {
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
    pub organic_methods: Vec<String>,
}

/// Error loading the catalog file at startup.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse catalog file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Immutable crop → disease → guidance lookup table.
#[derive(Debug, Clone, Default)]
pub struct DiseaseCatalog {
    entries: HashMap<String, HashMap<String, DiseaseGuidance>>,
}

impl DiseaseCatalog {
    /// Load the catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let entries = serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        let catalog = Self { entries };
        tracing::info!(
            path = %path.display(),
            crops = catalog.entries.len(),
            "Disease catalog loaded"
        );
        Ok(catalog)
    }

    /// Build a catalog from in-memory entries.
    pub fn from_entries(entries: HashMap<String, HashMap<String, DiseaseGuidance>>) -> Self {
        Self { entries }
    }

    /// Guidance for a crop/disease pair, falling back to generic advice
    /// when the pair is unknown.
    pub fn lookup(&self, crop: &str, disease: &str) -> DiseaseGuidance {
        match self.entries.get(crop).and_then(|c| c.get(disease)) {
            Some(guidance) => guidance.clone(),
            None => {
                tracing::debug!(crop, disease, "No catalog entry, using fallback guidance");
                fallback_guidance()
            }
        }
    }

    pub fn crop_count(&self) -> usize {
        self.entries.len()
    }
}

fn fallback_guidance() -> DiseaseGuidance {
    DiseaseGuidance {
        treatment: vec!["Consult local agricultural expert".to_string()],
        prevention: vec!["Maintain crop rotation and field hygiene".to_string()],
        organic_methods: vec!["Use neem oil spray or compost tea".to_string()],
    }
}
