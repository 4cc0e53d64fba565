use serde::{Deserialize, Serialize};

use crate::capabilities::{HttpResult, StorageResult, StorageWrite};
use crate::config::AppConfig;
use crate::model::{ItemId, LaunchData, Screen, Tab};

/// Which surface asked for a create; they react differently to the answer.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateOrigin {
    Modal,
    AddForm,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Lifecycle
    Configure { config: AppConfig },
    AppStarted,
    SignInRequested,
    SignOutRequested,
    RefreshRequested,

    // Navigation and host chrome
    NavigateTo { screen: Screen },
    BackPressed,
    CloseRequested,
    SettingsPressed,

    // List screen
    TabSelected { tab: Tab },
    AddMenuOpened,
    AddMenuClosed,
    AddWishChosen,
    OpenProductLink { id: ItemId },

    // Create/edit modal
    CreateModalOpened,
    EditRequested { id: ItemId },
    ModalTitleChanged { value: String },
    ModalImageUrlChanged { value: String },
    ModalProductUrlChanged { value: String },
    ModalSubmitted,
    ModalClosed,

    // Delete confirmation
    DeleteRequested { id: ItemId },
    DeleteConfirmed,
    DeleteCancelled,

    // Add form
    AddLinkChanged { value: String },
    AddTitleChanged { value: String },
    AddPriceChanged { value: String },
    AddDescriptionChanged { value: String },
    ImagePicked {
        mime: String,
        #[serde(with = "serde_bytes")]
        bytes: Vec<u8>,
    },
    AddSubmitted,

    // Capability responses (boxed to keep enum size small)
    #[serde(skip)]
    StoredOwnerIdLoaded(Box<StorageResult>),
    #[serde(skip)]
    LaunchDataLoaded(Option<Box<LaunchData>>),
    #[serde(skip)]
    OwnerIdStored(Box<StorageWrite>),
    #[serde(skip)]
    OwnerIdCleared(Box<StorageWrite>),
    #[serde(skip)]
    SignInCompleted(Box<HttpResult>),
    #[serde(skip)]
    WishlistLoaded(Box<HttpResult>),
    #[serde(skip)]
    ItemCreated {
        origin: CreateOrigin,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    ItemUpdated { id: ItemId, result: Box<HttpResult> },
    #[serde(skip)]
    ItemDeleted { id: ItemId, result: Box<HttpResult> },
    #[serde(skip)]
    BirthdateLoaded(Box<StorageResult>),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Configure { .. } => "configure",
            Event::AppStarted => "app_started",
            Event::SignInRequested => "sign_in_requested",
            Event::SignOutRequested => "sign_out_requested",
            Event::RefreshRequested => "refresh_requested",
            Event::NavigateTo { .. } => "navigate_to",
            Event::BackPressed => "back_pressed",
            Event::CloseRequested => "close_requested",
            Event::SettingsPressed => "settings_pressed",
            Event::TabSelected { .. } => "tab_selected",
            Event::AddMenuOpened => "add_menu_opened",
            Event::AddMenuClosed => "add_menu_closed",
            Event::AddWishChosen => "add_wish_chosen",
            Event::OpenProductLink { .. } => "open_product_link",
            Event::CreateModalOpened => "create_modal_opened",
            Event::EditRequested { .. } => "edit_requested",
            Event::ModalTitleChanged { .. } => "modal_title_changed",
            Event::ModalImageUrlChanged { .. } => "modal_image_url_changed",
            Event::ModalProductUrlChanged { .. } => "modal_product_url_changed",
            Event::ModalSubmitted => "modal_submitted",
            Event::ModalClosed => "modal_closed",
            Event::DeleteRequested { .. } => "delete_requested",
            Event::DeleteConfirmed => "delete_confirmed",
            Event::DeleteCancelled => "delete_cancelled",
            Event::AddLinkChanged { .. } => "add_link_changed",
            Event::AddTitleChanged { .. } => "add_title_changed",
            Event::AddPriceChanged { .. } => "add_price_changed",
            Event::AddDescriptionChanged { .. } => "add_description_changed",
            Event::ImagePicked { .. } => "image_picked",
            Event::AddSubmitted => "add_submitted",
            Event::StoredOwnerIdLoaded(_) => "stored_owner_id_loaded",
            Event::LaunchDataLoaded(_) => "launch_data_loaded",
            Event::OwnerIdStored(_) => "owner_id_stored",
            Event::OwnerIdCleared(_) => "owner_id_cleared",
            Event::SignInCompleted(_) => "sign_in_completed",
            Event::WishlistLoaded(_) => "wishlist_loaded",
            Event::ItemCreated { .. } => "item_created",
            Event::ItemUpdated { .. } => "item_updated",
            Event::ItemDeleted { .. } => "item_deleted",
            Event::BirthdateLoaded(_) => "birthdate_loaded",
        }
    }

    /// Events the shell sends on behalf of the user, as opposed to
    /// capability responses.
    pub fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Event::Configure { .. }
                | Event::AppStarted
                | Event::StoredOwnerIdLoaded(_)
                | Event::LaunchDataLoaded(_)
                | Event::OwnerIdStored(_)
                | Event::OwnerIdCleared(_)
                | Event::SignInCompleted(_)
                | Event::WishlistLoaded(_)
                | Event::ItemCreated { .. }
                | Event::ItemUpdated { .. }
                | Event::ItemDeleted { .. }
                | Event::BirthdateLoaded(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_events_roundtrip_through_json() {
        let event = Event::ImagePicked {
            mime: "image/png".into(),
            bytes: vec![1, 2, 3],
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn capability_responses_are_not_user_initiated() {
        assert!(Event::BackPressed.is_user_initiated());
        assert!(Event::AddSubmitted.is_user_initiated());
        assert!(!Event::LaunchDataLoaded(None).is_user_initiated());
        assert!(!Event::AppStarted.is_user_initiated());
    }

    #[test]
    fn event_size_is_reasonable() {
        let size = std::mem::size_of::<Event>();
        assert!(
            size <= 128,
            "Event enum is {} bytes, box more variants",
            size
        );
    }
}
