use tracing::{debug, info, warn};

use crate::auth::{self, AuthError};
use crate::capabilities::{storage, Capabilities, StorageKey, StorageResult};
use crate::error::AppError;
use crate::event::{CreateOrigin, Event};
use crate::identity::{self, IdentitySource, Resolution};
use crate::media;
use crate::model::{
    filter_price, AddForm, AuthStatus, Description, ItemId, ItemModal, ModalMode, Model, OwnerId,
    PendingDelete, Screen, StartupPhase, UpdateWishlistDto, WishlistItem,
};
use crate::view::{self, ViewModel};
use crate::wishlist::{self, ApiError};
use crate::BIRTHDATE_KEY;

#[derive(Default)]
pub struct App;

impl App {
    fn owner_key(model: &Model) -> Option<StorageKey> {
        model
            .config
            .owner_id_key()
            .map_err(|e| warn!(error = %e, "owner id key rejected"))
            .ok()
    }

    fn alert(caps: &Capabilities, error: AppError) {
        warn!(code = error.code(), message = %error.message, "alerting user");
        caps.telegram.show_alert(error.user_facing_message());
    }

    /// Shows or hides the host back button when the wanted state changes.
    fn sync_back_button(model: &mut Model, caps: &Capabilities) {
        let wanted = model.wants_back_button();
        if wanted != model.back_button_visible && model.host_detected() {
            caps.telegram.set_back_button(wanted);
        }
        model.back_button_visible = wanted;
    }

    fn persist_owner(model: &Model, caps: &Capabilities, owner: &OwnerId) {
        let Some(key) = Self::owner_key(model) else {
            return;
        };
        storage::set(&caps.kv, &key, owner.as_str(), |result| {
            Event::OwnerIdStored(Box::new(result))
        });
    }

    fn adopt_owner(model: &mut Model, caps: &Capabilities, resolution: Resolution) {
        info!(source = ?resolution.source, "owner id resolved");
        if resolution.needs_persist() {
            Self::persist_owner(model, caps, &resolution.owner_id);
        }
        model.owner_id = Some(resolution.owner_id);
        model.identity_source = Some(resolution.source);
        model.auth = AuthStatus::Idle;
    }

    fn authenticate(model: &mut Model, caps: &Capabilities) {
        if model.auth == AuthStatus::SigningIn {
            debug!("sign-in already in flight");
            return;
        }

        let sent = auth::sign_in_request(
            &model.config,
            model.owner_id.as_ref(),
            model.launch.as_ref(),
        )
        .and_then(|request| {
            request
                .send(&caps.http, |result| Event::SignInCompleted(Box::new(result)))
                .map_err(AuthError::from)
        });
        match sent {
            Ok(()) => model.auth = AuthStatus::SigningIn,
            Err(AuthError::AlreadyAuthenticated) => {
                debug!("owner id already resolved, sign-in skipped");
            }
            Err(e) => {
                debug!(error = %e, "sign-in not possible");
                model.auth = AuthStatus::Failed;
            }
        }
    }

    fn load_wishlist(model: &mut Model, caps: &Capabilities) {
        let sent = wishlist::list_request(&model.config, model.owner_id.as_ref())
            .and_then(|request| {
                request
                    .send(&caps.http, |result| Event::WishlistLoaded(Box::new(result)))
                    .map_err(ApiError::from)
            });
        match sent {
            Ok(()) => model.is_loading = true,
            Err(ApiError::NotAuthenticated) => {
                debug!("no owner id, showing an empty wishlist");
                model.items.clear();
                model.is_loading = false;
            }
            Err(e) => {
                warn!(error = %e, "failed to build list request");
                model.is_loading = false;
            }
        }
    }

    fn read_launch_data(model: &mut Model, caps: &Capabilities) {
        model.startup = StartupPhase::ReadingLaunchData;
        caps.telegram.launch_data(Event::LaunchDataLoaded);
    }

    fn stored_value(result: StorageResult, what: &str) -> Option<String> {
        match result {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, what, "storage read failed");
                None
            }
        }
    }

    fn navigate(model: &mut Model, caps: &Capabilities, screen: Screen) {
        model.add_menu_open = false;
        model.modal = None;
        model.pending_delete = None;
        model.screen = screen;

        match screen {
            Screen::Add => model.add_form = AddForm::default(),
            Screen::Profile => match StorageKey::new(BIRTHDATE_KEY) {
                Ok(key) => storage::get(&caps.kv, &key, |result| {
                    Event::BirthdateLoaded(Box::new(result))
                }),
                Err(e) => warn!(error = %e, "birthdate key rejected"),
            },
            Screen::List => {}
        }
    }

    fn go_back(model: &mut Model, caps: &Capabilities) {
        if model.pending_delete.is_some() {
            model.pending_delete = None;
        } else if model.modal.is_some() {
            model.modal = None;
        } else if model.add_menu_open {
            model.add_menu_open = false;
        } else if model.screen != Screen::List {
            model.screen = Screen::List;
        } else {
            info!("back pressed on the root screen, closing");
            caps.telegram.close();
        }
    }

    fn submit_modal(model: &mut Model, caps: &Capabilities) {
        let Some(modal) = model.modal.as_ref() else {
            return;
        };
        if modal.is_submitting {
            return;
        }
        if modal.title.trim().is_empty() {
            debug!("modal submitted without a title");
            return;
        }

        let fields = modal.fields();
        let sent = match &modal.mode {
            ModalMode::Create => {
                wishlist::create_request(&model.config, model.owner_id.as_ref(), &fields).and_then(
                    |request| {
                        request
                            .send(&caps.http, |result| Event::ItemCreated {
                                origin: CreateOrigin::Modal,
                                result: Box::new(result),
                            })
                            .map_err(ApiError::from)
                    },
                )
            }
            ModalMode::Edit { item } => {
                let patch = UpdateWishlistDto::changes(item, &fields);
                let id = item.id.clone();
                wishlist::update_request(&model.config, model.owner_id.as_ref(), &id, &patch)
                    .and_then(|request| {
                        request
                            .send(&caps.http, move |result| Event::ItemUpdated {
                                id,
                                result: Box::new(result),
                            })
                            .map_err(ApiError::from)
                    })
            }
        };

        match sent {
            Ok(()) => {
                if let Some(modal) = model.modal.as_mut() {
                    modal.is_submitting = true;
                }
            }
            Err(e) => {
                model.modal = None;
                Self::alert(caps, AppError::from(&e));
            }
        }
    }

    fn submit_add_form(model: &mut Model, caps: &Capabilities) {
        if model.owner_id.is_none() {
            Self::alert(caps, AppError::authorization_required());
            return;
        }
        if !model.add_form.can_submit() {
            debug!("add form not ready for submission");
            return;
        }

        let dto = model.add_form.to_dto();
        let sent = wishlist::create_request(&model.config, model.owner_id.as_ref(), &dto)
            .and_then(|request| {
                request
                    .send(&caps.http, |result| Event::ItemCreated {
                        origin: CreateOrigin::AddForm,
                        result: Box::new(result),
                    })
                    .map_err(ApiError::from)
            });
        match sent {
            Ok(()) => model.add_form.is_submitting = true,
            Err(e) => Self::alert(caps, AppError::from(&e)),
        }
    }

    fn confirm_delete(model: &mut Model, caps: &Capabilities) {
        let Some(pending) = model.pending_delete.as_ref() else {
            return;
        };
        if pending.is_deleting {
            return;
        }

        let id = pending.item.id.clone();
        let sent = wishlist::delete_request(&model.config, model.owner_id.as_ref(), &id)
            .and_then(|request| {
                request
                    .send(&caps.http, move |result| Event::ItemDeleted {
                        id,
                        result: Box::new(result),
                    })
                    .map_err(ApiError::from)
            });
        match sent {
            Ok(()) => {
                if let Some(pending) = model.pending_delete.as_mut() {
                    pending.is_deleting = true;
                }
            }
            Err(e) => Self::alert(caps, AppError::from(&e)),
        }
    }

    fn find_item<'a>(model: &'a Model, id: &ItemId) -> Option<&'a WishlistItem> {
        let item = model.items.iter().find(|i| &i.id == id);
        if item.is_none() {
            debug!(%id, "no such item");
        }
        item
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(
            event = event.name(),
            user = event.is_user_initiated(),
            "handling event"
        );

        match event {
            Event::Configure { config } => {
                model.config = model.config.clone().merged(config);
            }

            Event::AppStarted => {
                model.startup = StartupPhase::ReadingStoredId;
                model.is_loading = true;
                match Self::owner_key(model) {
                    Some(key) => storage::get(&caps.kv, &key, |result| {
                        Event::StoredOwnerIdLoaded(Box::new(result))
                    }),
                    None => Self::read_launch_data(model, caps),
                }
                caps.render.render();
            }

            Event::StoredOwnerIdLoaded(result) => {
                let stored = Self::stored_value(*result, "owner id");
                if let Some(owner) = stored.and_then(OwnerId::parse) {
                    model.owner_id = Some(owner);
                    model.identity_source = Some(IdentitySource::Cached);
                }
                Self::read_launch_data(model, caps);
            }

            Event::LaunchDataLoaded(data) => {
                model.launch = data.map(|d| *d);
                model.startup = StartupPhase::Ready;

                if model.host_detected() {
                    caps.telegram.ready();
                    caps.telegram.expand();
                    caps.telegram.set_settings_button(true);
                } else {
                    debug!("no host runtime, shell draws mock controls");
                }

                let cached = model.owner_id.as_ref().map(OwnerId::as_str);
                match identity::resolve(cached, model.launch.as_ref(), &model.config) {
                    Some(resolution) => Self::adopt_owner(model, caps, resolution),
                    None => Self::authenticate(model, caps),
                }

                Self::load_wishlist(model, caps);
                Self::sync_back_button(model, caps);
                caps.render.render();
            }

            Event::OwnerIdStored(result) => match *result {
                Ok(_) => debug!("owner id persisted"),
                Err(e) => warn!(error = %e, "failed to persist owner id"),
            },

            Event::SignInRequested => {
                Self::authenticate(model, caps);
                caps.render.render();
            }

            Event::SignInCompleted(result) => {
                match auth::signed_in_owner(*result) {
                    Some(owner) => {
                        let resolution = Resolution {
                            owner_id: owner,
                            source: IdentitySource::SignIn,
                        };
                        Self::adopt_owner(model, caps, resolution);
                        Self::load_wishlist(model, caps);
                    }
                    None => model.auth = AuthStatus::Failed,
                }
                caps.render.render();
            }

            Event::SignOutRequested => {
                model.owner_id = None;
                model.identity_source = None;
                model.auth = AuthStatus::Idle;
                model.items.clear();
                if let Some(key) = Self::owner_key(model) {
                    storage::remove(&caps.kv, &key, |result| {
                        Event::OwnerIdCleared(Box::new(result))
                    });
                }
                caps.render.render();
            }

            Event::OwnerIdCleared(result) => match *result {
                Ok(_) => info!("owner id cleared"),
                Err(e) => warn!(error = %e, "failed to clear owner id"),
            },

            Event::RefreshRequested => {
                Self::load_wishlist(model, caps);
                caps.render.render();
            }

            Event::WishlistLoaded(result) => {
                model.items = wishlist::list_items(*result);
                model.is_loading = false;
                caps.render.render();
            }

            Event::NavigateTo { screen } => {
                Self::navigate(model, caps, screen);
                Self::sync_back_button(model, caps);
                caps.render.render();
            }

            Event::BackPressed => {
                Self::go_back(model, caps);
                Self::sync_back_button(model, caps);
                caps.render.render();
            }

            Event::CloseRequested => caps.telegram.close(),

            Event::SettingsPressed => info!("settings pressed"),

            Event::TabSelected { tab } => {
                model.tab = tab;
                caps.render.render();
            }

            Event::AddMenuOpened => {
                model.add_menu_open = true;
                Self::sync_back_button(model, caps);
                caps.render.render();
            }

            Event::AddMenuClosed => {
                model.add_menu_open = false;
                Self::sync_back_button(model, caps);
                caps.render.render();
            }

            Event::AddWishChosen => {
                Self::navigate(model, caps, Screen::Add);
                Self::sync_back_button(model, caps);
                caps.render.render();
            }

            Event::OpenProductLink { id } => {
                if let Some(item) = Self::find_item(model, &id) {
                    if item.producturl.trim().is_empty() {
                        debug!(%id, "item has no product link");
                    } else {
                        caps.telegram.open_link(item.producturl.clone());
                    }
                }
            }

            Event::CreateModalOpened => {
                model.modal = Some(ItemModal::create());
                Self::sync_back_button(model, caps);
                caps.render.render();
            }

            Event::EditRequested { id } => {
                if let Some(item) = Self::find_item(model, &id).cloned() {
                    model.modal = Some(ItemModal::edit(item));
                    Self::sync_back_button(model, caps);
                    caps.render.render();
                }
            }

            Event::ModalTitleChanged { value } => {
                if let Some(modal) = model.modal.as_mut() {
                    modal.title = value;
                    caps.render.render();
                }
            }

            Event::ModalImageUrlChanged { value } => {
                if let Some(modal) = model.modal.as_mut() {
                    modal.imageurl = value;
                    caps.render.render();
                }
            }

            Event::ModalProductUrlChanged { value } => {
                if let Some(modal) = model.modal.as_mut() {
                    modal.producturl = value;
                    caps.render.render();
                }
            }

            Event::ModalSubmitted => {
                Self::submit_modal(model, caps);
                Self::sync_back_button(model, caps);
                caps.render.render();
            }

            Event::ModalClosed => {
                model.modal = None;
                Self::sync_back_button(model, caps);
                caps.render.render();
            }

            Event::ItemCreated { origin, result } => {
                let created = wishlist::created_item(*result);
                match origin {
                    CreateOrigin::Modal => {
                        if let Some(item) = created {
                            model.items.push(item);
                            model.add_menu_open = false;
                        }
                        if model.modal.as_ref().is_some_and(|m| m.is_submitting) {
                            model.modal = None;
                        }
                    }
                    CreateOrigin::AddForm => {
                        model.add_form = AddForm::default();
                        model.screen = Screen::List;
                        Self::load_wishlist(model, caps);
                    }
                }
                Self::sync_back_button(model, caps);
                caps.render.render();
            }

            Event::ItemUpdated { id, result } => {
                if let Some(item) = wishlist::updated_item(*result) {
                    if !model.replace_item(&id, item) {
                        debug!(%id, "updated item no longer in the list");
                    }
                }
                if model.modal.as_ref().is_some_and(|m| m.is_submitting) {
                    model.modal = None;
                }
                Self::sync_back_button(model, caps);
                caps.render.render();
            }

            Event::DeleteRequested { id } => {
                if let Some(item) = Self::find_item(model, &id).cloned() {
                    model.pending_delete = Some(PendingDelete {
                        item,
                        is_deleting: false,
                    });
                    Self::sync_back_button(model, caps);
                    caps.render.render();
                }
            }

            Event::DeleteConfirmed => {
                Self::confirm_delete(model, caps);
                caps.render.render();
            }

            Event::DeleteCancelled => {
                model.pending_delete = None;
                Self::sync_back_button(model, caps);
                caps.render.render();
            }

            Event::ItemDeleted { id, result } => {
                if wishlist::deleted(*result) {
                    model.remove_item(&id);
                    if model.pending_delete.as_ref().is_some_and(|p| p.item.id == id) {
                        model.pending_delete = None;
                    }
                } else if let Some(pending) = model.pending_delete.as_mut() {
                    pending.is_deleting = false;
                }
                Self::sync_back_button(model, caps);
                caps.render.render();
            }

            Event::AddLinkChanged { value } => {
                model.add_form.link = value;
                caps.render.render();
            }

            Event::AddTitleChanged { value } => {
                model.add_form.title = value;
                caps.render.render();
            }

            Event::AddPriceChanged { value } => {
                model.add_form.price = filter_price(&value);
                caps.render.render();
            }

            Event::AddDescriptionChanged { value } => match Description::new(value) {
                Ok(description) => {
                    model.add_form.description = description;
                    caps.render.render();
                }
                Err(e) => debug!(error = %e, "description input rejected"),
            },

            Event::ImagePicked { mime, bytes } => {
                match media::preview_data_url(&mime, &bytes) {
                    Ok(url) => {
                        model.add_form.image_preview = Some(url);
                        caps.render.render();
                    }
                    Err(e) => Self::alert(caps, e.into()),
                }
            }

            Event::AddSubmitted => {
                Self::submit_add_form(model, caps);
                caps.render.render();
            }

            Event::BirthdateLoaded(result) => {
                model.birthdate = Self::stored_value(*result, "birthdate");
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        view::build(model)
    }
}
