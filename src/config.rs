//! Configuration types for the core
//!
//! Loaded from TOML. Every field has a default, so an empty file is valid.

use crate::assets::FIRST_LOCAL_ID;
use crate::codec::RenderOptions;
use crate::diff::DiffOptions;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Lowest id handed out to unpublished assets
    pub first_local_id: u32,
    /// Row pairing in the differencer
    pub diff: DiffOptions,
    /// Pseudocode rendering
    pub render: RenderOptions,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            first_local_id: FIRST_LOCAL_ID,
            diff: DiffOptions::default(),
            render: RenderOptions::default(),
        }
    }
}

impl CoreConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }
}
