//! String values in the shell's key-value store, through `crux_kv`.
//!
//! The web view backs `KeyValue` with `localStorage`, so values are UTF-8
//! text stored as bytes.

use std::fmt::Display;

use crux_kv::KeyValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_KEY_LENGTH: usize = 256;

/// Validated key into the shell's durable store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        Self::validate_key(&key)?;
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.trim().is_empty() {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
                reason: "key cannot be empty".to_string(),
            });
        }

        if key.len() > MAX_KEY_LENGTH {
            return Err(StorageError::InvalidKey {
                key: key.chars().take(50).collect::<String>() + "...",
                reason: format!("key exceeds maximum length of {MAX_KEY_LENGTH} bytes"),
            });
        }

        if key.chars().any(char::is_control) {
            return Err(StorageError::InvalidKey {
                key: key.escape_default().to_string(),
                reason: "key contains control characters".to_string(),
            });
        }

        Ok(())
    }
}

impl TryFrom<String> for StorageKey {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StorageKey> for String {
    fn from(key: StorageKey) -> Self {
        key.0
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("stored value is not UTF-8 text")]
    NotText,

    #[error("storage unavailable: {message}")]
    Unavailable { message: String },
}

/// The text under a key, `None` when nothing is stored.
pub type StorageResult = Result<Option<String>, StorageError>;

/// Outcome of a write or a removal.
pub type StorageWrite = Result<(), StorageError>;

fn unavailable(e: impl Display) -> StorageError {
    StorageError::Unavailable {
        message: e.to_string(),
    }
}

fn read_text<E: Display>(result: Result<Option<Vec<u8>>, E>) -> StorageResult {
    match result.map_err(unavailable)? {
        Some(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| StorageError::NotText),
        None => Ok(None),
    }
}

fn write_done<T, E: Display>(result: Result<T, E>) -> StorageWrite {
    result.map(|_| ()).map_err(unavailable)
}

pub fn get<Ev, F>(kv: &KeyValue<Ev>, key: &StorageKey, make_event: F)
where
    Ev: Send + 'static,
    F: FnOnce(StorageResult) -> Ev + Send + Sync + 'static,
{
    kv.get(key.as_str().to_string(), move |result| {
        make_event(read_text(result))
    });
}

pub fn set<Ev, F>(kv: &KeyValue<Ev>, key: &StorageKey, value: &str, make_event: F)
where
    Ev: Send + 'static,
    F: FnOnce(StorageWrite) -> Ev + Send + Sync + 'static,
{
    kv.set(
        key.as_str().to_string(),
        value.as_bytes().to_vec(),
        move |result| make_event(write_done(result)),
    );
}

pub fn remove<Ev, F>(kv: &KeyValue<Ev>, key: &StorageKey, make_event: F)
where
    Ev: Send + 'static,
    F: FnOnce(StorageWrite) -> Ev + Send + Sync + 'static,
{
    kv.delete(key.as_str().to_string(), move |result| {
        make_event(write_done(result))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_validation() {
        assert!(StorageKey::new("tg-wishlist-owner-id").is_ok());
        assert!(StorageKey::new("").is_err());
        assert!(StorageKey::new("   ").is_err());
        assert!(StorageKey::new("a\nb").is_err());
        assert!(StorageKey::new("k".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_key_deserialization_validates() {
        let ok: Result<StorageKey, _> = serde_json::from_str("\"user_birthdate\"");
        assert!(ok.is_ok());
        let bad: Result<StorageKey, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_read_text() {
        let stored: Result<Option<Vec<u8>>, String> = Ok(Some(b"42".to_vec()));
        assert_eq!(read_text(stored), Ok(Some("42".to_string())));

        let missing: Result<Option<Vec<u8>>, String> = Ok(None);
        assert_eq!(read_text(missing), Ok(None));

        let binary: Result<Option<Vec<u8>>, String> = Ok(Some(vec![0xff, 0xfe]));
        assert_eq!(read_text(binary), Err(StorageError::NotText));

        let failed: Result<Option<Vec<u8>>, String> = Err("quota".into());
        assert_eq!(
            read_text(failed),
            Err(StorageError::Unavailable {
                message: "quota".into()
            })
        );
    }

    #[test]
    fn test_write_done_discards_previous_value() {
        let written: Result<Option<Vec<u8>>, String> = Ok(Some(b"old".to_vec()));
        assert_eq!(write_done(written), Ok(()));
        let failed: Result<(), String> = Err("denied".into());
        assert!(write_done(failed).is_err());
    }
}
