#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod auth;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod media;
pub mod model;
pub mod normalize;
pub mod view;
pub mod wishlist;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::AppConfig;
pub use crux_core::{render::Render, App as CruxApp};
pub use error::{AppError, ErrorKind, ErrorSeverity};
pub use event::Event;
pub use model::Model;
pub use view::ViewModel;

pub const API_BASE_URL: &str = "https://api.wetrippo.com/api";
pub const OWNER_ID_KEY: &str = "tg-wishlist-owner-id";
pub const BIRTHDATE_KEY: &str = "user_birthdate";
pub const DEV_IDENTITY_SEED: &str = "tg-wishlist-dev";
pub const MAX_DESCRIPTION_CHARS: usize = 170;
