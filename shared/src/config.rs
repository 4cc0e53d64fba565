//! Runtime configuration handed over by the shell.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::capabilities::{RequestError, StorageError, StorageKey, ValidatedUrl};
use crate::{API_BASE_URL, DEV_IDENTITY_SEED, OWNER_ID_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base of every API path, including the `/api` segment.
    pub api_base_url: String,

    /// `localStorage` key holding the owner id.
    pub owner_id_key: String,

    /// Allows a synthetic owner id when the page is opened outside Telegram.
    pub dev_mode: bool,

    pub dev_identity_seed: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: API_BASE_URL.to_string(),
            owner_id_key: OWNER_ID_KEY.to_string(),
            dev_mode: false,
            dev_identity_seed: DEV_IDENTITY_SEED.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid api base url: {0}")]
    BaseUrl(#[from] RequestError),

    #[error("invalid owner id key: {0}")]
    OwnerIdKey(#[from] StorageError),

    #[error("dev identity seed cannot be empty")]
    EmptySeed,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        self.owner_id_key()?;

        if self.dev_mode && self.dev_identity_seed.trim().is_empty() {
            return Err(ConfigError::EmptySeed);
        }

        Ok(())
    }

    /// Validates `other` and returns it, or keeps `self` when it is rejected.
    pub fn merged(self, other: AppConfig) -> AppConfig {
        match other.validate() {
            Ok(()) => other,
            Err(e) => {
                warn!(error = %e, "rejecting shell configuration, keeping previous");
                self
            }
        }
    }

    pub fn base_url(&self) -> Result<ValidatedUrl, RequestError> {
        ValidatedUrl::new(self.api_base_url.as_str())
    }

    pub fn endpoint(&self, path: &str) -> Result<ValidatedUrl, RequestError> {
        self.base_url()?.with_path(path)
    }

    pub fn owner_id_key(&self) -> Result<StorageKey, StorageError> {
        StorageKey::new(self.owner_id_key.as_str())
    }
}
