//! Owner id resolution. Pure: callers persist the result when asked to.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::AppConfig;
use crate::model::{LaunchData, OwnerId};

pub const DEV_IDENTITY_PREFIX: &str = "dev-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentitySource {
    /// Read back from the stored owner id.
    Cached,
    /// `initDataUnsafe.user.id` of the embedding Telegram client.
    TelegramHost,
    /// Synthetic id for running the page outside Telegram.
    Development,
    /// Returned by the sign-in endpoint.
    SignIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub owner_id: OwnerId,
    pub source: IdentitySource,
}

impl Resolution {
    /// Ids not read from storage must be written back to it.
    pub fn needs_persist(&self) -> bool {
        self.source != IdentitySource::Cached
    }
}

/// Resolves in order: cached id, host user id, development identity.
///
/// `launch` is `None` when no host runtime is present at all; a host that
/// reports no user is still a host, so no development identity is made.
#[instrument(level = "debug", skip_all, fields(has_cached = cached.is_some(), has_host = launch.is_some()))]
pub fn resolve(
    cached: Option<&str>,
    launch: Option<&LaunchData>,
    config: &AppConfig,
) -> Option<Resolution> {
    if let Some(owner_id) = cached.and_then(OwnerId::parse) {
        return Some(Resolution {
            owner_id,
            source: IdentitySource::Cached,
        });
    }

    if let Some(user) = launch.and_then(|l| l.user.as_ref()) {
        if let Some(owner_id) = OwnerId::parse(user.id.to_string()) {
            debug!("owner id taken from host user payload");
            return Some(Resolution {
                owner_id,
                source: IdentitySource::TelegramHost,
            });
        }
    }

    if config.dev_mode && launch.is_none() {
        debug!("no host runtime, using development identity");
        return Some(Resolution {
            owner_id: development_identity(&config.dev_identity_seed)?,
            source: IdentitySource::Development,
        });
    }

    None
}

/// `dev-` followed by the first 16 hex chars of the seed's blake3 hash.
pub fn development_identity(seed: &str) -> Option<OwnerId> {
    let hash = blake3::hash(seed.as_bytes());
    OwnerId::parse(format!("{DEV_IDENTITY_PREFIX}{}", &hash.to_hex()[..16]))
}
