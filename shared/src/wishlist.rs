//! Wishlist CRUD against the remote API.
//!
//! Request builders refuse to run without an owner id. Response readers come
//! in two layers: `parse_*` returns the precise [`ApiError`], and the
//! degrading wrappers (`list_items`, `created_item`, `updated_item`,
//! `deleted`) log the failure and fall back to an empty list, `None` or
//! `false`, which is all the UI ever looks at.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{instrument, warn};

use crate::capabilities::{HttpReply, HttpResult, JsonPost, RequestError};
use crate::config::AppConfig;
use crate::model::{CreateWishlistDto, ItemId, OwnerId, UpdateWishlistDto, WishlistItem};
use crate::normalize::{normalize_item, normalize_list, unwrap_data};

pub const LIST_PATH: &str = "/wishlist/list";
pub const CREATE_PATH: &str = "/wishlist/create";
pub const UPDATE_PATH: &str = "/wishlist/update";
pub const DELETE_PATH: &str = "/wishlist/delete";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("unexpected status {status}")]
    Status { status: u16 },

    #[error("malformed response: {reason}")]
    Malformed { reason: String },
}

#[derive(Serialize)]
struct OwnerBody<'a> {
    owner_id: &'a str,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    title: &'a str,
    imageurl: &'a str,
    producturl: &'a str,
    #[serde(rename = "imageUrl")]
    image_url: &'a str,
    #[serde(rename = "productUrl")]
    product_url: &'a str,
    owner_id: &'a str,
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    id: &'a str,
    owner_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    imageurl: Option<&'a str>,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    producturl: Option<&'a str>,
    #[serde(rename = "productUrl", skip_serializing_if = "Option::is_none")]
    product_url: Option<&'a str>,
}

#[derive(Serialize)]
struct DeleteBody<'a> {
    id: &'a str,
    owner_id: &'a str,
}

fn require_owner(owner: Option<&OwnerId>) -> Result<&OwnerId, ApiError> {
    owner.ok_or(ApiError::NotAuthenticated)
}

pub(crate) fn post_json<T: Serialize>(
    config: &AppConfig,
    path: &str,
    body: &T,
) -> Result<JsonPost, RequestError> {
    JsonPost::new(config.endpoint(path)?, body)
}

pub fn list_request(config: &AppConfig, owner: Option<&OwnerId>) -> Result<JsonPost, ApiError> {
    let owner = require_owner(owner)?;
    let body = OwnerBody {
        owner_id: owner.as_str(),
    };
    Ok(post_json(config, LIST_PATH, &body)?)
}

pub fn create_request(
    config: &AppConfig,
    owner: Option<&OwnerId>,
    dto: &CreateWishlistDto,
) -> Result<JsonPost, ApiError> {
    let owner = require_owner(owner)?;
    let body = CreateBody {
        title: &dto.title,
        imageurl: &dto.imageurl,
        producturl: &dto.producturl,
        image_url: &dto.imageurl,
        product_url: &dto.producturl,
        owner_id: owner.as_str(),
    };
    Ok(post_json(config, CREATE_PATH, &body)?)
}

pub fn update_request(
    config: &AppConfig,
    owner: Option<&OwnerId>,
    id: &ItemId,
    patch: &UpdateWishlistDto,
) -> Result<JsonPost, ApiError> {
    let owner = require_owner(owner)?;
    let body = UpdateBody {
        id: id.as_str(),
        owner_id: owner.as_str(),
        title: patch.title.as_deref(),
        imageurl: patch.imageurl.as_deref(),
        image_url: patch.imageurl.as_deref(),
        producturl: patch.producturl.as_deref(),
        product_url: patch.producturl.as_deref(),
    };
    Ok(post_json(config, UPDATE_PATH, &body)?)
}

pub fn delete_request(
    config: &AppConfig,
    owner: Option<&OwnerId>,
    id: &ItemId,
) -> Result<JsonPost, ApiError> {
    let owner = require_owner(owner)?;
    let body = DeleteBody {
        id: id.as_str(),
        owner_id: owner.as_str(),
    };
    Ok(post_json(config, DELETE_PATH, &body)?)
}

fn successful(result: HttpResult) -> Result<HttpReply, ApiError> {
    let reply = result?;
    if !reply.is_success() {
        return Err(ApiError::Status {
            status: reply.status(),
        });
    }
    Ok(reply)
}

fn json_body(reply: &HttpReply) -> Result<Value, ApiError> {
    reply
        .body_json::<Value>()
        .map_err(|e| ApiError::Malformed {
            reason: e.to_string(),
        })
}

pub fn parse_list(result: HttpResult) -> Result<Vec<WishlistItem>, ApiError> {
    let reply = successful(result)?;
    Ok(normalize_list(&json_body(&reply)?))
}

/// Create and update both answer with the item, optionally wrapped in `data`.
pub fn parse_item(result: HttpResult) -> Result<WishlistItem, ApiError> {
    let reply = successful(result)?;
    let body = json_body(&reply)?;
    Ok(normalize_item(unwrap_data(&body)))
}

/// Only the status matters; the success flag in the body is not inspected.
pub fn parse_delete(result: HttpResult) -> Result<(), ApiError> {
    successful(result).map(|_| ())
}

#[instrument(level = "debug", skip(result))]
pub fn list_items(result: HttpResult) -> Vec<WishlistItem> {
    parse_list(result).unwrap_or_else(|e| {
        warn!(error = %e, "failed to fetch wishlist items");
        Vec::new()
    })
}

#[instrument(level = "debug", skip(result))]
pub fn created_item(result: HttpResult) -> Option<WishlistItem> {
    parse_item(result)
        .map_err(|e| warn!(error = %e, "failed to create wishlist item"))
        .ok()
}

#[instrument(level = "debug", skip(result))]
pub fn updated_item(result: HttpResult) -> Option<WishlistItem> {
    parse_item(result)
        .map_err(|e| warn!(error = %e, "failed to update wishlist item"))
        .ok()
}

#[instrument(level = "debug", skip(result))]
pub fn deleted(result: HttpResult) -> bool {
    parse_delete(result)
        .map_err(|e| warn!(error = %e, "failed to delete wishlist item"))
        .is_ok()
}
