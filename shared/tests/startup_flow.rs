use crux_core::testing::AppTester;
use crux_core::Request;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use crux_kv::value::Value as StoredValue;
use crux_kv::{KeyValueOperation, KeyValueResponse, KeyValueResult};
use serde_json::json;
use wishlist_core::capabilities::{TelegramOperation, TelegramOutput};
use wishlist_core::identity::IdentitySource;
use wishlist_core::model::{AuthStatus, LaunchData, SignatureHash, StartupPhase, TelegramUser};
use wishlist_core::{App, AppConfig, Effect, Event, Model};

type Tester = AppTester<App, Effect>;

#[derive(Default)]
struct Effects {
    http: Vec<Request<HttpRequest>>,
    storage: Vec<Request<KeyValueOperation>>,
    telegram: Vec<Request<TelegramOperation>>,
    renders: usize,
}

impl Effects {
    fn collect(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Http(request) => self.http.push(request),
                Effect::KeyValue(request) => self.storage.push(request),
                Effect::Telegram(request) => self.telegram.push(request),
                Effect::Render(_) => self.renders += 1,
            }
        }
    }

    fn telegram_ops(&self) -> Vec<TelegramOperation> {
        self.telegram.iter().map(|r| r.operation.clone()).collect()
    }
}

fn dispatch(app: &Tester, model: &mut Model, event: Event) -> Effects {
    let mut effects = Effects::default();
    effects.collect(app.update(event, model).effects);
    effects
}

fn dispatch_all(app: &Tester, model: &mut Model, events: Vec<Event>) -> Effects {
    let mut effects = Effects::default();
    for event in events {
        effects.collect(app.update(event, model).effects);
    }
    effects
}

fn host_launch(user_id: i64) -> LaunchData {
    LaunchData {
        user: Some(TelegramUser {
            id: user_id,
            first_name: "Kate".into(),
            last_name: Some("Petrova".into()),
            username: Some("kate".into()),
            photo_url: None,
            language_code: Some("ru".into()),
        }),
        auth_date: Some(1_700_000_000),
        hash: Some(SignatureHash::new("abcdef")),
        query_id: None,
        platform: Some("android".into()),
    }
}

/// Drives startup up to the point where the identity is resolved.
fn start(
    app: &Tester,
    model: &mut Model,
    stored: Option<&str>,
    launch: Option<LaunchData>,
) -> Effects {
    let mut started = dispatch(app, model, Event::AppStarted);
    assert_eq!(model.startup, StartupPhase::ReadingStoredId);
    assert_eq!(started.storage.len(), 1);

    let mut read = started.storage.remove(0);
    assert!(matches!(
        &read.operation,
        KeyValueOperation::Get { key } if key == "tg-wishlist-owner-id"
    ));
    let value = match stored {
        Some(text) => StoredValue::Bytes(text.as_bytes().to_vec()),
        None => StoredValue::None,
    };
    let update = app
        .resolve(
            &mut read,
            KeyValueResult::Ok {
                response: KeyValueResponse::Get { value },
            },
        )
        .expect("storage read resolves");
    let mut loaded = dispatch_all(app, model, update.events);
    assert_eq!(model.startup, StartupPhase::ReadingLaunchData);
    assert_eq!(
        loaded.telegram_ops(),
        vec![TelegramOperation::LaunchData]
    );

    let mut launch_request = loaded.telegram.remove(0);
    let update = app
        .resolve(
            &mut launch_request,
            TelegramOutput::LaunchData(launch.map(Box::new)),
        )
        .expect("launch data resolves");
    let effects = dispatch_all(app, model, update.events);
    assert_eq!(model.startup, StartupPhase::Ready);
    effects
}

fn request_url(request: &Request<HttpRequest>) -> String {
    request.operation.url.clone()
}

fn request_body(request: &Request<HttpRequest>) -> serde_json::Value {
    assert_eq!(request.operation.method, "POST");
    serde_json::from_slice(&request.operation.body).expect("json body")
}

fn reply(status: u16, body: serde_json::Value) -> HttpResult {
    HttpResult::Ok(HttpResponse::status(status).body(body.to_string()).build())
}

fn stored_text(request: &Request<KeyValueOperation>) -> Option<(&str, &[u8])> {
    match &request.operation {
        KeyValueOperation::Set { key, value } => Some((key.as_str(), value.as_slice())),
        _ => None,
    }
}

#[test]
fn cached_owner_skips_sign_in_and_loads_list() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = start(&app, &mut model, Some("owner-7"), Some(host_launch(123)));

    assert_eq!(model.owner_id.as_ref().map(|o| o.as_str()), Some("owner-7"));
    assert_eq!(model.identity_source, Some(IdentitySource::Cached));
    assert!(effects.storage.is_empty(), "cached id is not written back");

    let ops = effects.telegram_ops();
    assert!(ops.contains(&TelegramOperation::Ready));
    assert!(ops.contains(&TelegramOperation::Expand));
    assert!(ops.contains(&TelegramOperation::SetSettingsButton { visible: true }));

    assert_eq!(effects.http.len(), 1);
    assert!(!request_url(&effects.http[0]).contains("sign-in"));
    assert_eq!(
        request_url(&effects.http[0]),
        "https://api.wetrippo.com/api/wishlist/list"
    );
    assert_eq!(request_body(&effects.http[0]), json!({"owner_id": "owner-7"}));
    assert!(model.is_loading);

    let mut list = effects.http.remove(0);
    let update = app
        .resolve(
            &mut list,
            reply(200, json!({"data": [{"_id": "5", "title": "Kettle"}]})),
        )
        .expect("list resolves");
    let loaded = dispatch_all(&app, &mut model, update.events);

    assert!(!model.is_loading);
    assert_eq!(model.items.len(), 1);
    let item = &model.items[0];
    assert_eq!(item.id.as_str(), "5");
    assert_eq!(item.title, "Kettle");
    assert_eq!(item.imageurl, "");
    assert_eq!(item.producturl, "");
    assert_eq!(
        serde_json::to_value(item).unwrap()["source"],
        json!("api")
    );
    assert!(loaded.renders > 0);
}

#[test]
fn host_user_id_is_persisted() {
    let app = Tester::default();
    let mut model = Model::default();

    let effects = start(&app, &mut model, None, Some(host_launch(123)));

    assert_eq!(model.owner_id.as_ref().map(|o| o.as_str()), Some("123"));
    assert_eq!(model.identity_source, Some(IdentitySource::TelegramHost));
    assert_eq!(effects.storage.len(), 1);
    assert_eq!(
        stored_text(&effects.storage[0]),
        Some(("tg-wishlist-owner-id", "123".as_bytes()))
    );
    assert_eq!(effects.http.len(), 1);
    assert_eq!(request_body(&effects.http[0]), json!({"owner_id": "123"}));
}

#[test]
fn development_identity_outside_host() {
    let app = Tester::default();
    let mut model = Model::default();

    let config = AppConfig {
        dev_mode: true,
        ..AppConfig::default()
    };
    dispatch(&app, &mut model, Event::Configure { config });
    assert!(model.config.dev_mode);

    let effects = start(&app, &mut model, None, None);

    assert_eq!(model.identity_source, Some(IdentitySource::Development));
    let owner = model.owner_id.clone().expect("dev identity");
    assert!(owner.as_str().starts_with("dev-"));
    assert_eq!(
        stored_text(&effects.storage[0]).map(|(_, value)| value),
        Some(owner.as_str().as_bytes())
    );
    assert!(
        !effects.telegram_ops().contains(&TelegramOperation::Ready),
        "no host to notify"
    );

    let view = app.view(&model);
    assert!(view.chrome.show_mock_controls);
}

#[test]
fn unresolved_identity_shows_empty_list() {
    let app = Tester::default();
    let mut model = Model::default();

    let userless_host = LaunchData::default();
    let effects = start(&app, &mut model, None, Some(userless_host));

    assert!(model.owner_id.is_none());
    assert_eq!(model.auth, AuthStatus::Failed);
    assert!(effects.http.is_empty());
    assert!(effects.storage.is_empty());
    assert!(model.items.is_empty());
    assert!(!model.is_loading);

    let view = app.view(&model);
    assert!(!view.is_authenticated);
    assert!(view.auth_error.is_some());
}

#[test]
fn failed_list_degrades_to_empty() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = start(&app, &mut model, Some("owner-7"), Some(host_launch(1)));
    let mut list = effects.http.remove(0);
    let update = app
        .resolve(&mut list, reply(500, json!({"error": "boom"})))
        .expect("list resolves");
    dispatch_all(&app, &mut model, update.events);

    assert!(model.items.is_empty());
    assert!(!model.is_loading);
}

#[test]
fn sign_in_after_sign_out() {
    let app = Tester::default();
    let mut model = Model::default();
    start(&app, &mut model, None, Some(host_launch(123)));

    let signed_out = dispatch(&app, &mut model, Event::SignOutRequested);
    assert!(model.owner_id.is_none());
    assert!(matches!(
        &signed_out.storage[0].operation,
        KeyValueOperation::Delete { key } if key == "tg-wishlist-owner-id"
    ));

    let mut signing_in = dispatch(&app, &mut model, Event::SignInRequested);
    assert_eq!(model.auth, AuthStatus::SigningIn);
    assert_eq!(signing_in.http.len(), 1);
    assert_eq!(
        request_url(&signing_in.http[0]),
        "https://api.wetrippo.com/api/wishlist-auth/telegram/sign-in"
    );
    assert_eq!(
        request_body(&signing_in.http[0]),
        json!({
            "id": 123,
            "first_name": "Kate",
            "last_name": "Petrova",
            "username": "kate",
            "auth_date": 1_700_000_000,
            "hash": "abcdef"
        })
    );

    let mut sign_in = signing_in.http.remove(0);
    let update = app
        .resolve(
            &mut sign_in,
            reply(200, json!({"id": "u-1", "telegram_id": 123})),
        )
        .expect("sign-in resolves");
    let completed = dispatch_all(&app, &mut model, update.events);

    assert_eq!(model.owner_id.as_ref().map(|o| o.as_str()), Some("u-1"));
    assert_eq!(model.identity_source, Some(IdentitySource::SignIn));
    assert_eq!(model.auth, AuthStatus::Idle);
    assert_eq!(
        stored_text(&completed.storage[0]).map(|(_, value)| value),
        Some("u-1".as_bytes())
    );
    assert_eq!(request_body(&completed.http[0]), json!({"owner_id": "u-1"}));
}

#[test]
fn sign_in_is_skipped_when_owner_known() {
    let app = Tester::default();
    let mut model = Model::default();
    start(&app, &mut model, Some("owner-7"), Some(host_launch(123)));

    let effects = dispatch(&app, &mut model, Event::SignInRequested);
    assert!(effects.http.is_empty());
    assert_eq!(model.auth, AuthStatus::Idle);
}

#[test]
fn sign_in_runs_once_while_pending() {
    let app = Tester::default();
    let mut model = Model {
        launch: Some(host_launch(123)),
        startup: StartupPhase::Ready,
        ..Model::default()
    };

    let first = dispatch(&app, &mut model, Event::SignInRequested);
    let second = dispatch(&app, &mut model, Event::SignInRequested);

    assert_eq!(first.http.len(), 1);
    assert!(second.http.is_empty());
    assert_eq!(model.auth, AuthStatus::SigningIn);
}
