//! Evaluation settings

use crate::export::DEFAULT_PRIVACY_MIN_HITS;
use crate::{CohortError, CohortResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default lifetime of cached template metadata
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Settings for cohort evaluation and export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortConfig {
    /// Consent identifier required on compositions that may not leave the EU
    pub consent_oid: Option<String>,
    /// Minimum cohort size before records are exported
    pub privacy_min_hits: usize,
    /// Lifetime of cached template metadata, in seconds
    pub cache_ttl_secs: u64,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            consent_oid: None,
            privacy_min_hits: DEFAULT_PRIVACY_MIN_HITS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl CohortConfig {
    /// Load settings from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> CohortResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CohortError::Io {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_json_str(&content).map_err(|e| match e {
            CohortError::Config { message } => CohortError::Config {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    pub fn from_json_str(content: &str) -> CohortResult<Self> {
        serde_json::from_str(content).map_err(|e| CohortError::Config {
            message: e.to_string(),
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
