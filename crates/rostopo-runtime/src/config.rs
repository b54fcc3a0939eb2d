//! Inspector configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default identity presented to peers
pub const DEFAULT_CALLER_ID: &str = "/rostopo";

/// Default bound on concurrent registry lookups
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Caller id must be a global name starting with '/': {0:?}")]
    InvalidCallerId(String),

    #[error("Lookup concurrency must be at least 1")]
    ZeroConcurrency,
}

/// Inspector configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Identity presented to peers when a client is opened
    pub caller_id: String,
    /// Maximum lookups in flight during one aggregation; 1 is sequential
    pub lookup_concurrency: usize,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        InspectorConfig {
            caller_id: DEFAULT_CALLER_ID.to_string(),
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
        }
    }
}

impl InspectorConfig {
    pub fn with_caller_id(mut self, caller_id: impl Into<String>) -> Self {
        self.caller_id = caller_id.into();
        self
    }

    pub fn with_lookup_concurrency(mut self, lookup_concurrency: usize) -> Self {
        self.lookup_concurrency = lookup_concurrency;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.caller_id.starts_with('/') || self.caller_id.len() < 2 {
            return Err(ConfigError::InvalidCallerId(self.caller_id.clone()));
        }
        if self.lookup_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}
