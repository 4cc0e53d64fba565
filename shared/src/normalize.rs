//! Reconciles the heterogeneous item shapes the wishlist API returns.

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::model::{ItemId, ItemSource, WishlistItem};

const ID_FIELDS: [&str; 4] = ["id", "_id", "ID", "slug"];
const IMAGE_FIELDS: [&str; 2] = ["imageurl", "imageUrl"];
const PRODUCT_FIELDS: [&str; 2] = ["producturl", "productUrl"];

/// `{ "data": x }` unwraps to `x`; anything else is returned as is.
pub fn unwrap_data(value: &Value) -> &Value {
    match value.get("data") {
        Some(inner) if !inner.is_null() => inner,
        _ => value,
    }
}

/// Accepts a bare array or one wrapped in `data`. Every other shape is an empty list.
pub fn normalize_list(value: &Value) -> Vec<WishlistItem> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(entries)) => entries,
            _ => {
                debug!("list response carries no item array");
                return Vec::new();
            }
        },
        _ => return Vec::new(),
    };

    entries.iter().map(normalize_item).collect()
}

/// Never fails: missing fields default to `""` and a missing id becomes a fresh UUID.
pub fn normalize_item(value: &Value) -> WishlistItem {
    let empty = Map::new();
    let record = value.as_object().unwrap_or(&empty);

    let id = ID_FIELDS
        .iter()
        .find_map(|field| record.get(*field).and_then(id_text))
        .and_then(ItemId::verbatim)
        .unwrap_or_else(fallback_id);

    WishlistItem {
        id,
        title: text_field(record, &["title"]),
        imageurl: text_field(record, &IMAGE_FIELDS),
        producturl: text_field(record, &PRODUCT_FIELDS),
        source: ItemSource::Api,
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

/// Integral floats print without a fraction (`1.0` is `"1"`), the way the
/// web client stringifies numbers.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{f:.0}")
            }
        }
        _ => n.to_string(),
    }
}

fn text_field(record: &Map<String, Value>, fields: &[&str]) -> String {
    fields
        .iter()
        .find_map(|field| match record.get(*field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(number_text(n)),
            _ => None,
        })
        .unwrap_or_default()
}

fn fallback_id() -> ItemId {
    let id = ItemId::generate();
    debug!(%id, "item without id, using fallback");
    id
}
