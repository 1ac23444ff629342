use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, DEFAULT_ENCODING, DEFAULT_MAX_SIZE};

/// Settings a [`crate::DataHandle`] starts from and returns to on disposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Encoding label used for every text/byte conversion
    pub encoding: String,
    /// Largest file `bytes()` will pull into memory
    pub max_size: u64,
    /// Report encoding failures from `size()` instead of returning 0
    pub strict_size: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_owned(),
            max_size: DEFAULT_MAX_SIZE,
            strict_size: false,
        }
    }
}

impl DataConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read the config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        log::debug!("loading data config from {}", path.as_ref().display());
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
