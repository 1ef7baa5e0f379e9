// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration file loading.
//!
//! Loads the server configuration from a YAML file. The signing secret can
//! also come from `CRAVE_TOKEN_SECRET`, which takes precedence over the file
//! so the secret never has to live on disk.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crave_api::ApiConfig;

/// Environment variable overriding the token signing secret.
pub const SECRET_ENV_VAR: &str = "CRAVE_TOKEN_SECRET";

// =============================================================================
// LoadError
// =============================================================================

/// Failure to load the configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file could not be parsed as YAML.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
}

// =============================================================================
// Loading
// =============================================================================

/// Loads the configuration from a YAML file, applying env overrides.
pub fn load_config(path: &Path) -> Result<ApiConfig, LoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut config: ApiConfig = serde_yaml::from_str(&raw).map_err(|source| LoadError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    apply_env_overrides(&mut config);

    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Applies environment variable overrides to a parsed configuration.
pub fn apply_env_overrides(config: &mut ApiConfig) {
    if let Ok(secret) = std::env::var(SECRET_ENV_VAR) {
        if !secret.is_empty() {
            config.token.secret = secret;
        }
    }

    if config.token.secret.is_empty() {
        warn!(
            "no token secret configured; set token.secret or {}",
            SECRET_ENV_VAR
        );
    }
}

// =============================================================================
// Tests
// =============================================================================
