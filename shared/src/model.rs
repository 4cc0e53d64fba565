use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

use crate::config::AppConfig;
use crate::error::ValidationError;
use crate::identity::IdentitySource;
use crate::MAX_DESCRIPTION_CHARS;

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Trims `s`; blank input is not an id.
            pub fn parse(s: impl AsRef<str>) -> Option<Self> {
                let s = s.as_ref().trim();
                if s.is_empty() {
                    None
                } else {
                    Some(Self(s.to_string()))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(OwnerId);
typed_id!(ItemId);

impl ItemId {
    /// Keeps a server-issued id byte for byte, since it is echoed back in
    /// update and delete bodies. Blank input is not an id.
    pub fn verbatim(s: impl Into<String>) -> Option<Self> {
        let s = s.into();
        if s.trim().is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Client-side stand-in for an id the server left out.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

// --- Wishlist items ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    Local,
    #[default]
    Api,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WishlistItem {
    pub id: ItemId,
    pub title: String,
    pub imageurl: String,
    pub producturl: String,
    pub source: ItemSource,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct CreateWishlistDto {
    pub title: String,
    pub imageurl: String,
    pub producturl: String,
}

/// Sparse patch: `None` fields are left out of the request entirely.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct UpdateWishlistDto {
    pub title: Option<String>,
    pub imageurl: Option<String>,
    pub producturl: Option<String>,
}

impl UpdateWishlistDto {
    /// Only the fields of `edited` that differ from `item`.
    pub fn changes(item: &WishlistItem, edited: &CreateWishlistDto) -> Self {
        let changed = |old: &str, new: &str| (old != new).then(|| new.to_string());
        Self {
            title: changed(&item.title, &edited.title),
            imageurl: changed(&item.imageurl, &edited.imageurl),
            producturl: changed(&item.producturl, &edited.producturl),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.imageurl.is_none() && self.producturl.is_none()
    }
}

// --- Telegram host payload ---

/// `initDataUnsafe.hash`. Redacted in debug output, zeroized on drop.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SignatureHash(String);

impl SignatureHash {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SignatureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SignatureHash {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Host-supplied profile. Display only, never persisted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

impl TelegramUser {
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref().filter(|s| !s.is_empty()) {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct LaunchData {
    #[serde(default)]
    pub user: Option<TelegramUser>,
    #[serde(default)]
    pub auth_date: Option<i64>,
    #[serde(default)]
    pub hash: Option<SignatureHash>,
    #[serde(default)]
    pub query_id: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

// --- Bounded text, counted in characters ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct BoundedText<const MAX: usize>(String);

impl<const MAX: usize> BoundedText<MAX> {
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        let len = s.chars().count();
        if len > MAX {
            return Err(ValidationError::TooLong { len, max: MAX });
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub const fn max_chars() -> usize {
        MAX
    }
}

pub type Description = BoundedText<MAX_DESCRIPTION_CHARS>;

/// Keeps ASCII digits and whitespace, drops everything else.
pub fn filter_price(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || c.is_whitespace())
        .collect()
}

// --- UI state ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    List,
    Add,
    Profile,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Current,
    Archive,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StartupPhase {
    #[default]
    NotStarted,
    ReadingStoredId,
    ReadingLaunchData,
    Ready,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AuthStatus {
    #[default]
    Idle,
    SigningIn,
    /// Sign-in ran and produced nothing. Not retried automatically.
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ModalMode {
    Create,
    Edit { item: WishlistItem },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ItemModal {
    pub mode: ModalMode,
    pub title: String,
    pub imageurl: String,
    pub producturl: String,
    pub is_submitting: bool,
}

impl ItemModal {
    pub fn create() -> Self {
        Self {
            mode: ModalMode::Create,
            title: String::new(),
            imageurl: String::new(),
            producturl: String::new(),
            is_submitting: false,
        }
    }

    pub fn edit(item: WishlistItem) -> Self {
        Self {
            title: item.title.clone(),
            imageurl: item.imageurl.clone(),
            producturl: item.producturl.clone(),
            mode: ModalMode::Edit { item },
            is_submitting: false,
        }
    }

    pub fn fields(&self) -> CreateWishlistDto {
        CreateWishlistDto {
            title: self.title.clone(),
            imageurl: self.imageurl.clone(),
            producturl: self.producturl.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PendingDelete {
    pub item: WishlistItem,
    pub is_deleting: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct AddForm {
    pub link: String,
    pub title: String,
    pub price: String,
    pub description: Description,
    /// `data:` URL of the picked image. Submitted as the item's image as is.
    pub image_preview: Option<String>,
    pub is_submitting: bool,
}

impl AddForm {
    pub fn can_submit(&self) -> bool {
        !self.is_submitting && !self.title.trim().is_empty()
    }

    pub fn to_dto(&self) -> CreateWishlistDto {
        CreateWishlistDto {
            title: self.title.trim().to_string(),
            imageurl: self.image_preview.clone().unwrap_or_default(),
            producturl: self.link.trim().to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Model {
    pub config: AppConfig,
    pub startup: StartupPhase,

    // Identity
    pub owner_id: Option<OwnerId>,
    pub identity_source: Option<IdentitySource>,
    pub launch: Option<LaunchData>,
    pub auth: AuthStatus,

    // List
    pub items: Vec<WishlistItem>,
    pub is_loading: bool,
    pub tab: Tab,

    // Navigation and overlays
    pub screen: Screen,
    pub add_menu_open: bool,
    pub modal: Option<ItemModal>,
    pub pending_delete: Option<PendingDelete>,

    pub add_form: AddForm,
    pub birthdate: Option<String>,

    pub back_button_visible: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            startup: StartupPhase::NotStarted,
            owner_id: None,
            identity_source: None,
            launch: None,
            auth: AuthStatus::Idle,
            items: Vec::new(),
            // The list shows its spinner until the first load settles.
            is_loading: true,
            tab: Tab::Current,
            screen: Screen::List,
            add_menu_open: false,
            modal: None,
            pending_delete: None,
            add_form: AddForm::default(),
            birthdate: None,
            back_button_visible: false,
        }
    }
}

impl Model {
    pub fn host_detected(&self) -> bool {
        self.launch.is_some()
    }

    pub fn telegram_user(&self) -> Option<&TelegramUser> {
        self.launch.as_ref().and_then(|l| l.user.as_ref())
    }

    pub fn has_overlay(&self) -> bool {
        self.pending_delete.is_some() || self.modal.is_some() || self.add_menu_open
    }

    /// Whether the host back button should be visible right now.
    pub fn wants_back_button(&self) -> bool {
        self.has_overlay() || self.screen != Screen::List
    }

    pub fn replace_item(&mut self, id: &ItemId, item: WishlistItem) -> bool {
        match self.items.iter_mut().find(|i| &i.id == id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, id: &ItemId) -> Option<WishlistItem> {
        let index = self.items.iter().position(|i| &i.id == id)?;
        Some(self.items.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(id: &str, title: &str) -> WishlistItem {
        WishlistItem {
            id: ItemId::parse(id).unwrap(),
            title: title.into(),
            imageurl: String::new(),
            producturl: "https://shop.example/kettle".into(),
            source: ItemSource::Api,
        }
    }

    #[test]
    fn typed_id_rejects_blank() {
        assert!(OwnerId::parse("").is_none());
        assert!(OwnerId::parse("   ").is_none());
        assert_eq!(OwnerId::parse(" 42 ").unwrap().as_str(), "42");
    }

    #[test]
    fn signature_hash_debug_is_redacted() {
        let hash = SignatureHash::new("c0ffee");
        assert_eq!(format!("{hash:?}"), "[REDACTED]");
        let launch = LaunchData {
            hash: Some(hash),
            ..LaunchData::default()
        };
        assert!(!format!("{launch:?}").contains("c0ffee"));
    }

    #[test]
    fn launch_data_tolerates_missing_fields() {
        let launch: LaunchData =
            serde_json::from_str(r#"{"user": {"id": 7, "username": "kate"}}"#).unwrap();
        let user = launch.user.unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.first_name, "");
        assert!(launch.hash.is_none());
    }

    #[test]
    fn full_name_joins_last_name() {
        let user = TelegramUser {
            id: 1,
            first_name: "Анна".into(),
            last_name: Some("Иванова".into()),
            username: None,
            photo_url: None,
            language_code: None,
        };
        assert_eq!(user.full_name(), "Анна Иванова");
    }

    #[test]
    fn description_counts_characters_not_bytes() {
        let cyrillic = "ж".repeat(170);
        assert!(Description::new(cyrillic.clone()).is_ok());
        assert!(Description::new(cyrillic + "ж").is_err());
    }

    #[test]
    fn changes_only_lists_differences() {
        let existing = item("1", "Kettle");
        let same = CreateWishlistDto {
            title: "Kettle".into(),
            imageurl: String::new(),
            producturl: "https://shop.example/kettle".into(),
        };
        assert!(UpdateWishlistDto::changes(&existing, &same).is_empty());

        let renamed = CreateWishlistDto {
            title: "Teapot".into(),
            ..same
        };
        let patch = UpdateWishlistDto::changes(&existing, &renamed);
        assert_eq!(patch.title.as_deref(), Some("Teapot"));
        assert!(patch.imageurl.is_none());
        assert!(patch.producturl.is_none());
    }

    #[test]
    fn back_button_follows_overlays_and_screens() {
        let mut model = Model::default();
        assert!(!model.wants_back_button());
        model.add_menu_open = true;
        assert!(model.wants_back_button());
        model.add_menu_open = false;
        model.screen = Screen::Profile;
        assert!(model.wants_back_button());
    }

    #[test]
    fn remove_item_by_id() {
        let mut model = Model::default();
        model.items = vec![item("1", "a"), item("2", "b")];
        let removed = model.remove_item(&ItemId::parse("1").unwrap());
        assert_eq!(removed.map(|i| i.title), Some("a".to_string()));
        assert_eq!(model.items.len(), 1);
        assert!(model.remove_item(&ItemId::parse("9").unwrap()).is_none());
    }

    proptest! {
        #[test]
        fn filtered_price_has_only_digits_and_spaces(input in ".*") {
            let price = filter_price(&input);
            prop_assert!(price.chars().all(|c| c.is_ascii_digit() || c.is_whitespace()));
        }

        #[test]
        fn filtered_price_keeps_clean_input(input in "[0-9 ]{0,20}") {
            prop_assert_eq!(filter_price(&input), input);
        }
    }
}
