//! In-memory lookup sources.
//!
//! [`StaticLookup`] serves fixed rows, either supplied directly or read from
//! a JSON file of the form `{"reasons": [...], "sites": [...]}`.
//! [`NoLookup`] stands in when no source is configured.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::record::{ReasonCode, SiteRecord};
use crate::traits::LookupSource;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StaticRows {
    #[serde(default)]
    reasons: Vec<ReasonCode>,
    #[serde(default)]
    sites: Vec<SiteRecord>,
}

/// A lookup source answering from rows held in memory.
#[derive(Debug, Clone)]
pub struct StaticLookup {
    name: String,
    rows: StaticRows,
}

impl StaticLookup {
    /// Create a static source with pre-populated rows.
    pub fn with_rows(name: &str, reasons: Vec<ReasonCode>, sites: Vec<SiteRecord>) -> Self {
        StaticLookup {
            name: name.to_string(),
            rows: StaticRows { reasons, sites },
        }
    }

    /// Load rows from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, LookupError> {
        let name = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| LookupError::Connect {
            source_name: name.clone(),
            message: e.to_string(),
        })?;
        let rows: StaticRows = serde_json::from_str(&text).map_err(|e| LookupError::Row {
            query: name.clone(),
            message: e.to_string(),
        })?;
        Ok(StaticLookup { name, rows })
    }
}

impl LookupSource for StaticLookup {
    fn name(&self) -> &str {
        &self.name
    }

    fn reason_codes(&mut self) -> Result<Vec<ReasonCode>, LookupError> {
        Ok(self.rows.reasons.clone())
    }

    fn sites(&mut self) -> Result<Vec<SiteRecord>, LookupError> {
        Ok(self.rows.sites.clone())
    }
}

/// A lookup source that is not configured; every query fails.
///
/// Compiling a document that never needs externally enumerated rows
/// succeeds with this source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl LookupSource for NoLookup {
    fn name(&self) -> &str {
        "none"
    }

    fn reason_codes(&mut self) -> Result<Vec<ReasonCode>, LookupError> {
        Err(LookupError::Config {
            message: "reason codes requested but no lookup source is configured".to_string(),
        })
    }

    fn sites(&mut self) -> Result<Vec<SiteRecord>, LookupError> {
        Err(LookupError::Config {
            message: "sites requested but no lookup source is configured".to_string(),
        })
    }
}
