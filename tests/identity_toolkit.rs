#![allow(clippy::unwrap_used)]

use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    Json, Router,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;
use tripcraft::{
    identity::{
        record_redirect_callback, AuthErrorCode, FederatedProvider, IdentityConfig,
        IdentityProvider, IdentityToolkit, Navigator, PendingRedirect, ProviderError,
        DEFAULT_CALLBACK_URL, IDENTITY_KEY,
    },
    session::{demo_session, DemoMode, SessionBridge, DEMO_EMAIL, DEMO_PASSWORD},
    storage::{KeyValueStore, MemoryStore},
};

const API_KEY: &str = "test-key";
const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth?state=xyz";

/// Stand-in for the Identity Toolkit REST API.
#[derive(Default)]
struct MockToolkit {
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolkit {
    fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(method, _)| method).collect()
    }
}

fn toolkit_error(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": {"code": 400, "message": message}})),
    )
}

fn account(local_id: &str, email: &str, display_name: Option<&str>, token: &str) -> Value {
    json!({
        "localId": local_id,
        "email": email,
        "displayName": display_name,
        "idToken": token,
        "refreshToken": format!("refresh-{token}"),
        "expiresIn": "3600",
    })
}

fn field<'a>(body: &'a Value, name: &str) -> &'a str {
    body.get(name).and_then(Value::as_str).unwrap_or_default()
}

async fn rpc(
    State(mock): State<Arc<MockToolkit>>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let method = uri
        .path()
        .strip_prefix("/v1/accounts:")
        .unwrap_or_default()
        .to_string();
    mock.calls.lock().unwrap().push((method.clone(), body.clone()));

    if query.get("key").map(String::as_str) != Some(API_KEY) {
        return toolkit_error("API key not valid. Please pass a valid API key.");
    }

    match method.as_str() {
        "signInWithPassword" => match (field(&body, "email"), field(&body, "password")) {
            ("traveler@trip.example.org", "s3cret!") => (
                StatusCode::OK,
                Json(account(
                    "uid-42",
                    "traveler@trip.example.org",
                    Some("Ada Traveler"),
                    "id-42",
                )),
            ),
            ("traveler@trip.example.org", _) => toolkit_error("INVALID_PASSWORD"),
            ("disabled@trip.example.org", _) => toolkit_error("USER_DISABLED"),
            _ => toolkit_error("EMAIL_NOT_FOUND"),
        },
        "signUp" => {
            if field(&body, "email") == "traveler@trip.example.org" {
                toolkit_error("EMAIL_EXISTS")
            } else if field(&body, "password").len() < 6 {
                toolkit_error("WEAK_PASSWORD : Password should be at least 6 characters")
            } else {
                (
                    StatusCode::OK,
                    Json(account("uid-new", field(&body, "email"), None, "id-new")),
                )
            }
        }
        "update" => {
            if field(&body, "idToken") == "id-new" {
                (
                    StatusCode::OK,
                    Json(json!({
                        "localId": "uid-new",
                        "email": "new@trip.example.org",
                        "displayName": field(&body, "displayName"),
                        "idToken": "id-new-2",
                        "refreshToken": "refresh-new-2",
                    })),
                )
            } else {
                toolkit_error("INVALID_ID_TOKEN")
            }
        }
        "createAuthUri" => (
            StatusCode::OK,
            Json(json!({
                "kind": "identitytoolkit#CreateAuthUriResponse",
                "authUri": AUTH_URI,
                "providerId": field(&body, "providerId"),
                "sessionId": "sess-1",
            })),
        ),
        "signInWithIdp" => {
            if field(&body, "sessionId") == "sess-1" && field(&body, "requestUri").contains("code=") {
                (
                    StatusCode::OK,
                    Json(json!({
                        "localId": "uid-g",
                        "email": "gee@gmail.com",
                        "displayName": "Gee",
                        "photoUrl": "https://img.example.org/gee.png",
                        "idToken": "id-g",
                        "refreshToken": "refresh-g",
                    })),
                )
            } else {
                toolkit_error("INVALID_IDP_RESPONSE : missing code")
            }
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": 404, "message": "NOT_FOUND"}})),
        ),
    }
}

async fn serve(mock: Arc<MockToolkit>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(rpc).with_state(mock);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

/// Records the URLs it is asked to open.
#[derive(Default)]
struct RecordingNavigator {
    opened: Mutex<Vec<String>>,
    blocked: bool,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) -> Result<(), ProviderError> {
        if self.blocked {
            return Err(ProviderError::new(AuthErrorCode::PopupBlocked, "blocked"));
        }
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

fn config(base_url: &str) -> IdentityConfig {
    IdentityConfig::new(base_url.to_string())
        .with_api_key(Some(SecretString::from(API_KEY.to_string())))
}

fn toolkit(base_url: &str, store: &Arc<MemoryStore>, navigator: &Arc<RecordingNavigator>) -> IdentityToolkit {
    IdentityToolkit::new(config(base_url), store.clone(), navigator.clone()).unwrap()
}

async fn setup() -> (Arc<MockToolkit>, String, Arc<MemoryStore>, Arc<RecordingNavigator>) {
    let mock = Arc::new(MockToolkit::default());
    let base_url = serve(mock.clone()).await;
    (
        mock,
        base_url,
        Arc::new(MemoryStore::new()),
        Arc::new(RecordingNavigator::default()),
    )
}

#[tokio::test]
async fn sign_in_adopts_and_persists_the_user() {
    let (mock, base_url, store, navigator) = setup().await;
    let provider = toolkit(&base_url, &store, &navigator);
    let auth_state = provider.auth_state();

    let user = provider
        .sign_in_with_password("traveler@trip.example.org", "s3cret!")
        .await
        .unwrap();

    assert_eq!(user.uid, "uid-42");
    assert_eq!(user.display_name.as_deref(), Some("Ada Traveler"));
    assert_eq!(auth_state.borrow().as_ref(), Some(&user));
    assert!(store.get(IDENTITY_KEY).unwrap().is_some());

    let (method, body) = mock.calls().remove(0);
    assert_eq!(method, "signInWithPassword");
    assert_eq!(body["returnSecureToken"], json!(true));

    // A later process starts out signed in.
    let restored = toolkit(&base_url, &store, &navigator);
    assert_eq!(restored.auth_state().borrow().as_ref(), Some(&user));
}

#[tokio::test]
async fn sign_in_errors_map_to_auth_codes() {
    let (_mock, base_url, store, navigator) = setup().await;
    let provider = toolkit(&base_url, &store, &navigator);

    let err = provider
        .sign_in_with_password("traveler@trip.example.org", "nope")
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::WrongPassword);

    let err = provider
        .sign_in_with_password("ghost@trip.example.org", "nope")
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::UserNotFound);

    let err = provider
        .sign_in_with_password("disabled@trip.example.org", "nope")
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::UserDisabled);
    assert_eq!(err.code.as_str(), "auth/user-disabled");

    assert_eq!(*provider.auth_state().borrow(), None);
    assert_eq!(store.get(IDENTITY_KEY).unwrap(), None);
}

#[tokio::test]
async fn rejected_api_key_maps_to_invalid_api_key() {
    let (_mock, base_url, store, navigator) = setup().await;
    let config = IdentityConfig::new(base_url)
        .with_api_key(Some(SecretString::from("wrong-key".to_string())));
    let provider = IdentityToolkit::new(config, store, navigator).unwrap();

    let err = provider
        .sign_in_with_password("traveler@trip.example.org", "s3cret!")
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::InvalidApiKey);
}

#[tokio::test]
async fn missing_api_key_fails_without_a_request() {
    let (mock, base_url, store, navigator) = setup().await;
    let provider =
        IdentityToolkit::new(IdentityConfig::new(base_url), store, navigator).unwrap();

    let err = provider
        .sign_in_with_password("traveler@trip.example.org", "s3cret!")
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::InvalidApiKey);
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = IdentityToolkit::new(
        config(&format!("http://{addr}")),
        Arc::new(MemoryStore::new()),
        Arc::new(RecordingNavigator::default()),
    )
    .unwrap();

    let err = provider
        .sign_in_with_password("traveler@trip.example.org", "s3cret!")
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::NetworkRequestFailed);
}

#[tokio::test]
async fn sign_up_then_update_profile_names_the_user() {
    let (mock, base_url, store, navigator) = setup().await;
    let provider = toolkit(&base_url, &store, &navigator);

    let user = provider
        .create_user("new@trip.example.org", "s3cret!")
        .await
        .unwrap();
    assert_eq!(user.uid, "uid-new");
    assert_eq!(user.display_name, None);

    let named = provider.update_profile(&user, "Ada").await.unwrap();
    assert_eq!(named.uid, "uid-new");
    assert_eq!(named.display_name.as_deref(), Some("Ada"));
    assert_eq!(provider.auth_state().borrow().as_ref(), Some(&named));

    assert_eq!(mock.methods(), vec!["signUp", "update"]);
    let (_, update) = mock.calls().remove(1);
    assert_eq!(update["idToken"], json!("id-new"));
    assert_eq!(update["displayName"], json!("Ada"));
}

#[tokio::test]
async fn sign_up_errors_map_to_auth_codes() {
    let (_mock, base_url, store, navigator) = setup().await;
    let provider = toolkit(&base_url, &store, &navigator);

    let err = provider
        .create_user("traveler@trip.example.org", "s3cret!")
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::EmailAlreadyInUse);

    let err = provider
        .create_user("new@trip.example.org", "123")
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::WeakPassword);
}

#[tokio::test]
async fn update_profile_requires_the_current_user() {
    let (mock, base_url, store, navigator) = setup().await;
    let provider = toolkit(&base_url, &store, &navigator);

    let stranger = tripcraft::identity::ProviderUser {
        uid: "uid-other".to_string(),
        email: None,
        display_name: None,
        photo_url: None,
    };
    let err = provider.update_profile(&stranger, "Ada").await.unwrap_err();

    assert_eq!(err.code, AuthErrorCode::NoCurrentUser);
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn redirect_sign_in_completes_in_a_later_process() {
    let (mock, base_url, store, navigator) = setup().await;

    // Phase one.
    let first = toolkit(&base_url, &store, &navigator);
    first
        .sign_in_with_redirect(FederatedProvider::Google)
        .await
        .unwrap();

    assert_eq!(*navigator.opened.lock().unwrap(), vec![AUTH_URI.to_string()]);
    let (_, create) = mock.calls().remove(0);
    assert_eq!(create["providerId"], json!("google.com"));
    assert_eq!(create["continueUri"], json!(DEFAULT_CALLBACK_URL));

    let pending = PendingRedirect::load(&*store).unwrap().unwrap();
    assert_eq!(pending.session_id, "sess-1");
    assert_eq!(pending.callback_uri, None);

    // Nothing to resolve until the browser comes back.
    assert_eq!(first.redirect_result().await.unwrap(), None);
    assert!(PendingRedirect::load(&*store).unwrap().is_some());

    assert!(record_redirect_callback(&*store, Some("state=xyz&code=abc")).unwrap());

    // Phase two.
    let second = toolkit(&base_url, &store, &navigator);
    let user = second.redirect_result().await.unwrap().unwrap();

    assert_eq!(user.uid, "uid-g");
    assert_eq!(user.photo_url.as_deref(), Some("https://img.example.org/gee.png"));
    assert_eq!(second.auth_state().borrow().as_ref(), Some(&user));
    assert_eq!(PendingRedirect::load(&*store).unwrap(), None);

    let (method, idp) = mock.calls().pop().unwrap();
    assert_eq!(method, "signInWithIdp");
    assert_eq!(
        idp["requestUri"],
        json!("http://localhost:8085/auth/callback?state=xyz&code=abc")
    );
    assert_eq!(idp["sessionId"], json!("sess-1"));
}

#[tokio::test]
async fn denied_redirect_is_cancelled_by_user() {
    let (mock, base_url, store, navigator) = setup().await;
    let provider = toolkit(&base_url, &store, &navigator);
    provider
        .sign_in_with_redirect(FederatedProvider::Google)
        .await
        .unwrap();

    record_redirect_callback(&*store, Some("error=access_denied&state=xyz")).unwrap();

    let err = provider.redirect_result().await.unwrap_err();
    assert_eq!(err.code, AuthErrorCode::RedirectCancelledByUser);
    assert_eq!(PendingRedirect::load(&*store).unwrap(), None);
    assert!(!mock.methods().contains(&"signInWithIdp".to_string()));
}

#[tokio::test]
async fn blocked_navigation_abandons_the_redirect() {
    let (_mock, base_url, store, _) = setup().await;
    let navigator = Arc::new(RecordingNavigator {
        opened: Mutex::new(Vec::new()),
        blocked: true,
    });
    let provider = toolkit(&base_url, &store, &navigator);

    let err = provider
        .sign_in_with_redirect(FederatedProvider::Google)
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::PopupBlocked);
    assert_eq!(PendingRedirect::load(&*store).unwrap(), None);
}

#[tokio::test]
async fn sign_out_forgets_the_persisted_identity() {
    let (_mock, base_url, store, navigator) = setup().await;
    let provider = toolkit(&base_url, &store, &navigator);
    provider
        .sign_in_with_password("traveler@trip.example.org", "s3cret!")
        .await
        .unwrap();

    provider.sign_out().await.unwrap();

    assert_eq!(*provider.auth_state().borrow(), None);
    assert_eq!(store.get(IDENTITY_KEY).unwrap(), None);
    assert_eq!(*toolkit(&base_url, &store, &navigator).auth_state().borrow(), None);
}

#[tokio::test]
async fn bridge_over_toolkit_signs_in_and_falls_back() {
    let (_mock, base_url, store, navigator) = setup().await;
    let provider = Arc::new(toolkit(&base_url, &store, &navigator));
    let bridge = SessionBridge::new(provider, store.clone(), DemoMode::Enabled);
    let _subscription = bridge.start().await;
    let mut handle = bridge.handle();
    handle.ready().await;

    assert!(bridge.login(DEMO_EMAIL, DEMO_PASSWORD).await);
    assert_eq!(handle.current(), Some(demo_session()));

    bridge.logout().await;
    assert_eq!(handle.current(), None);

    assert!(bridge.login("traveler@trip.example.org", "s3cret!").await);
    assert_eq!(handle.current().unwrap().name, "Ada Traveler");
}
