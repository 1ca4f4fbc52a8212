// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 servicehub contributors

//! Schema engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::policy::{ConsistencyPolicy, Permissive, Strict};

/// Deployment mode, fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Development: batches are full-set replaces, anything may change.
    Permissive,
    /// Production: append-only, persisted summaries seal their schemas.
    Strict,
}

impl Mode {
    /// Materialize the consistency policy this mode stands for.
    pub fn policy(self) -> Box<dyn ConsistencyPolicy> {
        match self {
            Mode::Permissive => Box::new(Permissive),
            Mode::Strict => Box::new(Strict),
        }
    }
}

/// Schema engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Deployment mode (default: permissive)
    #[serde(default = "default_mode")]
    pub mode: Mode,

    /// Maximum persisted schema documents per service
    #[serde(default = "default_schema_cap")]
    pub schema_cap: usize,
}

fn default_mode() -> Mode {
    Mode::Permissive
}

fn default_schema_cap() -> usize {
    100
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            schema_cap: default_schema_cap(),
        }
    }
}

impl SchemaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_cap == 0 {
            return Err(ConfigError::InvalidValue("schema_cap cannot be 0".into()));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}
