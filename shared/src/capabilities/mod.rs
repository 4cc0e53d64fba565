mod http;
pub mod storage;
mod telegram;

pub use self::http::{HttpReply, HttpResult, JsonPost, RequestError, ValidatedUrl};
pub use self::storage::{StorageError, StorageKey, StorageResult, StorageWrite};
pub use self::telegram::{Telegram, TelegramOperation, TelegramOutput};

/// View updates go through Crux's built-in render capability.
pub use crux_core::render::Render;
pub use crux_http::Http;
pub use crux_kv::KeyValue;

use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub kv: KeyValue<Event>,
    pub telegram: Telegram<Event>,
    pub render: Render<Event>,
}
