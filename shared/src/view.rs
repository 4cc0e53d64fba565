//! Projection of [`Model`] into what the shell draws. No state lives here.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::media::ACCEPTED_IMAGE_TYPES;
use crate::model::{
    AddForm, Description, ItemModal, ModalMode, Model, PendingDelete, Screen, StartupPhase, Tab,
    TelegramUser, WishlistItem,
};

mod text {
    pub const LIST_TITLE: &str = "Вишлисты";
    pub const TAB_CURRENT: &str = "Актуально";
    pub const TAB_ARCHIVE: &str = "Архив";
    pub const LOADING: &str = "Загрузка...";
    pub const MY_WISHES: &str = "Мои желания";
    pub const EMPTY_LIST: &str =
        "Здесь появятся ваши вишлисты, нажмите на +, чтобы добавить первый";
    pub const OPEN_LINK: &str = "Открыть";

    pub const ADD_MENU_TITLE: &str = "Добавить";
    pub const ADD_MENU_WISH: &str = "Желание";

    pub const MODAL_CREATE_TITLE: &str = "Добавить новое желание";
    pub const MODAL_EDIT_TITLE: &str = "Редактировать желание";
    pub const MODAL_CANCEL: &str = "Отмена";
    pub const MODAL_CREATE: &str = "Создать";
    pub const MODAL_SAVE: &str = "Сохранить";
    pub const MODAL_SAVING: &str = "Сохранение...";

    pub const DELETE_TITLE: &str = "Удалить желание?";
    pub const DELETE_CONFIRM: &str = "Удалить";

    pub const ADD_TITLE: &str = "Добавить желание";
    pub const ADD_IMAGE_HINT: &str =
        "Нажмите на +, чтобы вставить изображение в формате .jpeg, .webp, .svg, или .png";
    pub const ADD_SUBMIT: &str = "Добавить";
    pub const ADD_SUBMITTING: &str = "Добавление...";

    pub const PROFILE_TITLE: &str = "Профиль";
    pub const PROFILE_FALLBACK_NAME: &str = "Пользователь";

    pub const NAV_WISHLISTS: &str = "Вишлисты";
    pub const NAV_SEARCH: &str = "Поиск";
    pub const NAV_GIVING: &str = "Я дарю";
    pub const NAV_PROFILE: &str = "Профиль";

    pub const MOCK_BACK: &str = "Назад";
    pub const MOCK_CLOSE: &str = "Закрыть";
}

/// `"1 желание"`, `"3 желания"`, `"7 желаний"`.
///
/// Only the three-way split the list card has always used: 1, below 5,
/// everything else. So 21 reads "желаний".
pub fn wish_count_label(count: usize) -> String {
    let noun = match count {
        1 => "желание",
        n if n < 5 => "желания",
        _ => "желаний",
    };
    format!("{count} {noun}")
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TabView {
    pub tab: Tab,
    pub label: String,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserCardView {
    pub first_name: Option<String>,
    pub username: Option<String>,
}

impl UserCardView {
    fn from_user(user: &TelegramUser) -> Option<Self> {
        let first_name = Some(user.first_name.clone()).filter(|s| !s.is_empty());
        let username = user.username.clone().filter(|s| !s.is_empty());
        if first_name.is_none() && username.is_none() {
            return None;
        }
        Some(Self {
            first_name,
            username,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WishSummaryView {
    pub title: String,
    pub count_label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemCardView {
    pub id: String,
    pub title: String,
    pub image_url: Option<String>,
    pub product_url: String,
    pub open_label: String,
}

impl From<&WishlistItem> for ItemCardView {
    fn from(item: &WishlistItem) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            image_url: Some(item.imageurl.clone()).filter(|s| !s.is_empty()),
            product_url: item.producturl.clone(),
            open_label: text::OPEN_LINK.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddMenuView {
    pub title: String,
    pub wish_label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModalView {
    pub heading: String,
    pub is_edit: bool,
    pub title: String,
    pub image_url: String,
    pub product_url: String,
    pub can_submit: bool,
    pub is_submitting: bool,
    pub submit_label: String,
    pub cancel_label: String,
}

impl From<&ItemModal> for ModalView {
    fn from(modal: &ItemModal) -> Self {
        let is_edit = matches!(modal.mode, ModalMode::Edit { .. });
        let submit_label = match (modal.is_submitting, is_edit) {
            (true, _) => text::MODAL_SAVING,
            (false, true) => text::MODAL_SAVE,
            (false, false) => text::MODAL_CREATE,
        };
        Self {
            heading: if is_edit {
                text::MODAL_EDIT_TITLE
            } else {
                text::MODAL_CREATE_TITLE
            }
            .into(),
            is_edit,
            title: modal.title.clone(),
            image_url: modal.imageurl.clone(),
            product_url: modal.producturl.clone(),
            can_submit: !modal.is_submitting && !modal.title.trim().is_empty(),
            is_submitting: modal.is_submitting,
            submit_label: submit_label.into(),
            cancel_label: text::MODAL_CANCEL.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteConfirmView {
    pub heading: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub is_deleting: bool,
}

impl From<&PendingDelete> for DeleteConfirmView {
    fn from(pending: &PendingDelete) -> Self {
        Self {
            heading: text::DELETE_TITLE.into(),
            message: format!(
                "Вы уверены, что хотите удалить \"{}\"?",
                pending.item.title
            ),
            confirm_label: text::DELETE_CONFIRM.into(),
            cancel_label: text::MODAL_CANCEL.into(),
            is_deleting: pending.is_deleting,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddFormView {
    pub heading: String,
    pub link: String,
    pub title: String,
    pub price: String,
    pub description: String,
    /// `"42/170"`.
    pub description_counter: String,
    pub image_preview: Option<String>,
    pub image_hint: String,
    pub accepted_image_types: Vec<String>,
    pub can_submit: bool,
    pub is_submitting: bool,
    pub submit_label: String,
}

impl From<&AddForm> for AddFormView {
    fn from(form: &AddForm) -> Self {
        Self {
            heading: text::ADD_TITLE.into(),
            link: form.link.clone(),
            title: form.title.clone(),
            price: form.price.clone(),
            description: form.description.as_str().to_string(),
            description_counter: format!(
                "{}/{}",
                form.description.char_count(),
                Description::max_chars()
            ),
            image_preview: form.image_preview.clone(),
            image_hint: text::ADD_IMAGE_HINT.into(),
            accepted_image_types: ACCEPTED_IMAGE_TYPES.iter().map(|s| s.to_string()).collect(),
            can_submit: form.can_submit(),
            is_submitting: form.is_submitting,
            submit_label: if form.is_submitting {
                text::ADD_SUBMITTING
            } else {
                text::ADD_SUBMIT
            }
            .into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileMenuEntry {
    EditProfile,
    Notifications,
    Settings,
    EventCalendar,
    Support,
}

impl ProfileMenuEntry {
    pub const ALL: [ProfileMenuEntry; 5] = [
        Self::EditProfile,
        Self::Notifications,
        Self::Settings,
        Self::EventCalendar,
        Self::Support,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::EditProfile => "Редактировать профиль",
            Self::Notifications => "Уведомления",
            Self::Settings => "Настройки",
            Self::EventCalendar => "Календарь событий",
            Self::Support => "Поддержка",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileMenuItemView {
    pub entry: ProfileMenuEntry,
    pub label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileView {
    pub heading: String,
    pub full_name: String,
    pub username: Option<String>,
    pub photo_url: Option<String>,
    pub birthdate: Option<String>,
    pub menu: Vec<ProfileMenuItemView>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ListScreenView {
    pub title: String,
    pub tabs: Vec<TabView>,
    pub user: Option<UserCardView>,
    pub summary: Option<WishSummaryView>,
    pub items: Vec<ItemCardView>,
    pub is_loading: bool,
    pub loading_label: String,
    pub empty_message: Option<String>,
    pub add_menu: Option<AddMenuView>,
    pub modal: Option<ModalView>,
    pub delete_confirm: Option<DeleteConfirmView>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScreenView {
    List(Box<ListScreenView>),
    Add {
        form: AddFormView,
    },
    Profile {
        profile: ProfileView,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavItemView {
    pub screen: Option<Screen>,
    pub label: String,
    pub is_active: bool,
}

/// Host chrome. Outside Telegram the shell draws `mock_*` buttons itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChromeView {
    pub show_back: bool,
    pub show_mock_controls: bool,
    pub mock_back_label: String,
    pub mock_close_label: String,
    pub bottom_nav: Vec<NavItemView>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFacingError {
    pub message: String,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub screen: ScreenView,
    pub chrome: ChromeView,
    pub is_authenticated: bool,
    pub owner_id: Option<String>,
    /// Set while the owner id is unresolved after startup finished.
    pub auth_error: Option<UserFacingError>,
}

fn list_screen(model: &Model) -> ScreenView {
    let tabs = [(Tab::Current, text::TAB_CURRENT), (Tab::Archive, text::TAB_ARCHIVE)]
        .into_iter()
        .map(|(tab, label)| TabView {
            tab,
            label: label.into(),
            is_active: model.tab == tab,
        })
        .collect();

    // The archive tab has no server-side notion yet and shows every item.
    let items: Vec<ItemCardView> = if model.is_loading {
        Vec::new()
    } else {
        model.items.iter().map(ItemCardView::from).collect()
    };

    let summary = (!model.is_loading && model.owner_id.is_some()).then(|| WishSummaryView {
        title: text::MY_WISHES.into(),
        count_label: wish_count_label(model.items.len()),
    });

    let empty_message =
        (!model.is_loading && model.items.is_empty()).then(|| text::EMPTY_LIST.to_string());

    ScreenView::List(Box::new(ListScreenView {
        title: text::LIST_TITLE.into(),
        tabs,
        user: model.telegram_user().and_then(UserCardView::from_user),
        summary,
        items,
        is_loading: model.is_loading,
        loading_label: text::LOADING.into(),
        empty_message,
        add_menu: model.add_menu_open.then(|| AddMenuView {
            title: text::ADD_MENU_TITLE.into(),
            wish_label: text::ADD_MENU_WISH.into(),
        }),
        modal: model.modal.as_ref().map(ModalView::from),
        delete_confirm: model.pending_delete.as_ref().map(DeleteConfirmView::from),
    }))
}

fn profile_screen(model: &Model) -> ScreenView {
    let user = model.telegram_user();
    ScreenView::Profile {
        profile: ProfileView {
            heading: text::PROFILE_TITLE.into(),
            full_name: user
                .map(TelegramUser::full_name)
                .unwrap_or_else(|| text::PROFILE_FALLBACK_NAME.into()),
            username: user.and_then(|u| u.username.clone()),
            photo_url: user.and_then(|u| u.photo_url.clone()),
            birthdate: model.birthdate.clone(),
            menu: ProfileMenuEntry::ALL
                .into_iter()
                .map(|entry| ProfileMenuItemView {
                    entry,
                    label: entry.label().into(),
                })
                .collect(),
        },
    }
}

fn chrome(model: &Model) -> ChromeView {
    let nav = [
        (Some(Screen::List), text::NAV_WISHLISTS),
        (None, text::NAV_SEARCH),
        (None, text::NAV_GIVING),
        (Some(Screen::Profile), text::NAV_PROFILE),
    ];
    ChromeView {
        show_back: model.wants_back_button(),
        show_mock_controls: !model.host_detected(),
        mock_back_label: text::MOCK_BACK.into(),
        mock_close_label: text::MOCK_CLOSE.into(),
        bottom_nav: nav
            .into_iter()
            .map(|(screen, label)| NavItemView {
                screen,
                label: label.into(),
                is_active: screen == Some(model.screen),
            })
            .collect(),
    }
}

pub fn build(model: &Model) -> ViewModel {
    let screen = match model.screen {
        Screen::List => list_screen(model),
        Screen::Add => ScreenView::Add {
            form: AddFormView::from(&model.add_form),
        },
        Screen::Profile => profile_screen(model),
    };

    let auth_error = (model.owner_id.is_none() && model.startup == StartupPhase::Ready)
        .then(|| UserFacingError::from(&AppError::authorization_required()));

    ViewModel {
        screen,
        chrome: chrome(model),
        is_authenticated: model.owner_id.is_some(),
        owner_id: model.owner_id.as_ref().map(|o| o.to_string()),
        auth_error,
    }
}
