use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::{
    club::client::normalize_base_url,
    constants::CLUB,
    storage::{self, FileSlotStore, MemorySlotStore, SlotStore},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API URL '{0}' (expected http:// or https://)")]
    InvalidApiUrl(String),
    #[error("data directory {0} is a file")]
    DataDirIsFile(PathBuf),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub api_url: String,
    pub timeout: Duration,
    pub ephemeral: bool,
}

impl Settings {
    pub fn resolve(
        data_dir: Option<PathBuf>,
        api_url: Option<String>,
        timeout_secs: Option<u64>,
        ephemeral: bool,
    ) -> Result<Self, ConfigError> {
        let data_dir = data_dir.unwrap_or_else(storage::get_data_dir);
        if data_dir.is_file() {
            return Err(ConfigError::DataDirIsFile(data_dir));
        }

        let raw_url = api_url.unwrap_or_else(|| CLUB.api_url.to_string());
        let api_url =
            normalize_base_url(&raw_url).map_err(|_| ConfigError::InvalidApiUrl(raw_url.clone()))?;

        Ok(Self {
            data_dir,
            api_url,
            timeout: Duration::from_secs(timeout_secs.unwrap_or(CLUB.timeout_secs).max(1)),
            ephemeral,
        })
    }

    pub fn slot_store(&self) -> Box<dyn SlotStore> {
        if self.ephemeral {
            Box::new(MemorySlotStore::new())
        } else {
            Box::new(FileSlotStore::new(self.data_dir.clone()))
        }
    }
}
