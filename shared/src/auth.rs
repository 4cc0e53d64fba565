//! Exchanges the host-signed Telegram identity for a durable owner id.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::capabilities::{HttpResult, JsonPost, RequestError};
use crate::config::AppConfig;
use crate::model::{LaunchData, OwnerId};
use crate::normalize::unwrap_data;
use crate::wishlist::post_json;

pub const SIGN_IN_PATH: &str = "/wishlist-auth/telegram/sign-in";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("already authenticated")]
    AlreadyAuthenticated,

    #[error("launch data is missing {field}")]
    MissingField { field: &'static str },

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("sign-in rejected with status {status}")]
    Rejected { status: u16 },

    #[error("sign-in response has no id")]
    MissingId,
}

/// Forwarded verbatim to the verification endpoint.
#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub id: i64,
    pub first_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<&'a str>,
    pub auth_date: i64,
    pub hash: &'a str,
}

pub fn sign_in_payload(launch: Option<&LaunchData>) -> Result<SignInRequest<'_>, AuthError> {
    let launch = launch.ok_or(AuthError::MissingField { field: "user" })?;
    let user = launch
        .user
        .as_ref()
        .ok_or(AuthError::MissingField { field: "user" })?;
    if user.first_name.is_empty() {
        return Err(AuthError::MissingField {
            field: "first_name",
        });
    }
    let auth_date = launch
        .auth_date
        .ok_or(AuthError::MissingField { field: "auth_date" })?;
    let hash = launch
        .hash
        .as_ref()
        .map(|h| h.expose())
        .filter(|h| !h.is_empty())
        .ok_or(AuthError::MissingField { field: "hash" })?;

    Ok(SignInRequest {
        id: user.id,
        first_name: &user.first_name,
        last_name: user.last_name.as_deref(),
        username: user.username.as_deref(),
        photo_url: user.photo_url.as_deref(),
        auth_date,
        hash,
    })
}

/// `Err(AlreadyAuthenticated)` means no network call is needed at all.
pub fn sign_in_request(
    config: &AppConfig,
    current: Option<&OwnerId>,
    launch: Option<&LaunchData>,
) -> Result<JsonPost, AuthError> {
    if current.is_some() {
        return Err(AuthError::AlreadyAuthenticated);
    }
    let payload = sign_in_payload(launch)?;
    Ok(post_json(config, SIGN_IN_PATH, &payload)?)
}

/// Reads `{id, telegram_id, first_name, ...}`, optionally wrapped in `data`.
pub fn parse_sign_in(result: HttpResult) -> Result<OwnerId, AuthError> {
    let reply = result?;
    if !reply.is_success() {
        return Err(AuthError::Rejected {
            status: reply.status(),
        });
    }
    let body: Value = reply.body_json()?;
    let id = match unwrap_data(&body).get("id") {
        Some(Value::String(s)) => OwnerId::parse(s),
        Some(Value::Number(n)) => OwnerId::parse(n.to_string()),
        _ => None,
    };
    id.ok_or(AuthError::MissingId)
}

/// Degrading wrapper: any failure means "remain unauthenticated".
#[instrument(level = "debug", skip(result))]
pub fn signed_in_owner(result: HttpResult) -> Option<OwnerId> {
    match parse_sign_in(result) {
        Ok(owner) => {
            debug!("sign-in returned an owner id");
            Some(owner)
        }
        Err(e) => {
            warn!(error = %e, "telegram sign-in failed");
            None
        }
    }
}
