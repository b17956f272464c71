use super::{
    AuthErrorCode, FederatedProvider, IdentityConfig, IdentityProvider, Navigator,
    PendingRedirect, ProviderError, ProviderUser,
};
use crate::{storage::KeyValueStore, APP_USER_AGENT};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info_span, instrument, warn, Instrument};
use url::Url;

/// Provider-side key holding the signed-in user and its tokens.
pub const IDENTITY_KEY: &str = "tripcraft_identity";

#[derive(Serialize, Deserialize)]
struct StoredIdentity {
    user: ProviderUser,
    id_token: String,
    refresh_token: String,
}

struct Credentials {
    uid: String,
    id_token: SecretString,
    refresh_token: SecretString,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    id_token: Option<String>,
    refresh_token: Option<String>,
}

impl AccountResponse {
    fn user(&self) -> ProviderUser {
        ProviderUser {
            uid: self.local_id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAuthUriResponse {
    auth_uri: Option<String>,
    session_id: Option<String>,
}

fn toolkit_error_message(json_response: &Value) -> &str {
    json_response
        .get("error")
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// Identity Toolkit v1 REST client.
///
/// Restores the last signed-in user from the store at construction, so the
/// auth-state stream reports it immediately, like the hosted SDK does on page
/// load.
pub struct IdentityToolkit {
    config: IdentityConfig,
    client: Client,
    store: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    credentials: Mutex<Option<Credentials>>,
    state: watch::Sender<Option<ProviderUser>>,
}

impl IdentityToolkit {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: IdentityConfig,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(ProviderError::internal)?;

        let restored = restore_identity(store.as_ref());
        let (user, credentials) = match restored {
            Some(stored) => {
                let credentials = Credentials {
                    uid: stored.user.uid.clone(),
                    id_token: SecretString::from(stored.id_token),
                    refresh_token: SecretString::from(stored.refresh_token),
                };
                (Some(stored.user), Some(credentials))
            }
            None => (None, None),
        };

        let (state, _) = watch::channel(user);

        Ok(Self {
            config,
            client,
            store,
            navigator,
            credentials: Mutex::new(credentials),
            state,
        })
    }

    #[must_use]
    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    fn credentials(&self) -> MutexGuard<'_, Option<Credentials>> {
        self.credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn endpoint(&self, method: &str) -> Result<Url, ProviderError> {
        let Some(api_key) = self.config.api_key() else {
            return Err(ProviderError::new(
                AuthErrorCode::InvalidApiKey,
                "no API key configured",
            ));
        };

        let mut url = Url::parse(&format!(
            "{}/v1/accounts:{method}",
            self.config.identity_url()
        ))
        .map_err(ProviderError::internal)?;
        url.query_pairs_mut()
            .append_pair("key", api_key.expose_secret());

        Ok(url)
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(method)?;

        let span = info_span!(
            "identity.request",
            http.method = "POST",
            rpc.method = method
        );
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .instrument(span)
            .await
            .map_err(|err| ProviderError::network(&err))?;

        if !response.status().is_success() {
            let status = response.status();
            let json_response: Value = response.json().await.unwrap_or(Value::Null);
            let message = toolkit_error_message(&json_response);

            debug!("accounts:{method} - {status}, {message}");

            return Err(ProviderError::from_toolkit_message(message));
        }

        response.json::<R>().await.map_err(ProviderError::internal)
    }

    /// Makes `user` current, persists it and notifies subscribers.
    fn install(&self, user: ProviderUser, id_token: String, refresh_token: String) {
        let stored = StoredIdentity {
            user,
            id_token,
            refresh_token,
        };

        match serde_json::to_string(&stored) {
            Ok(raw) => {
                if let Err(err) = self.store.set(IDENTITY_KEY, &raw) {
                    warn!("failed to persist identity: {err}");
                }
            }
            Err(err) => warn!("failed to serialize identity: {err}"),
        }

        let StoredIdentity {
            user,
            id_token,
            refresh_token,
        } = stored;

        *self.credentials() = Some(Credentials {
            uid: user.uid.clone(),
            id_token: SecretString::from(id_token),
            refresh_token: SecretString::from(refresh_token),
        });

        self.state.send_replace(Some(user));
    }

    fn adopt(&self, account: AccountResponse) -> Result<ProviderUser, ProviderError> {
        let user = account.user();
        let (Some(id_token), Some(refresh_token)) = (account.id_token, account.refresh_token)
        else {
            return Err(ProviderError::internal("response carried no tokens"));
        };

        self.install(user.clone(), id_token, refresh_token);

        Ok(user)
    }

    fn clear_pending_redirect(&self) {
        if let Err(err) = PendingRedirect::clear(self.store.as_ref()) {
            warn!("failed to clear pending redirect: {err}");
        }
    }
}

fn restore_identity(store: &dyn KeyValueStore) -> Option<StoredIdentity> {
    let raw = match store.get(IDENTITY_KEY) {
        Ok(raw) => raw?,
        Err(err) => {
            warn!("failed to read persisted identity: {err}");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(stored) => Some(stored),
        Err(err) => {
            warn!("discarding unreadable persisted identity: {err}");
            if let Err(err) = store.remove(IDENTITY_KEY) {
                warn!("failed to remove persisted identity: {err}");
            }
            None
        }
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkit {
    #[instrument(skip_all)]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError> {
        let account: AccountResponse = self
            .call(
                "signInWithPassword",
                &json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        self.adopt(account)
    }

    #[instrument(skip_all)]
    async fn create_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError> {
        let account: AccountResponse = self
            .call(
                "signUp",
                &json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        self.adopt(account)
    }

    #[instrument(skip_all)]
    async fn update_profile(
        &self,
        user: &ProviderUser,
        display_name: &str,
    ) -> Result<ProviderUser, ProviderError> {
        let (id_token, refresh_token) = {
            let credentials = self.credentials();
            match credentials.as_ref() {
                Some(current) if current.uid == user.uid => (
                    current.id_token.expose_secret().to_string(),
                    current.refresh_token.expose_secret().to_string(),
                ),
                _ => {
                    return Err(ProviderError::new(
                        AuthErrorCode::NoCurrentUser,
                        "profile updates require the user to be signed in",
                    ))
                }
            }
        };

        let account: AccountResponse = self
            .call(
                "update",
                &json!({
                    "idToken": id_token,
                    "displayName": display_name,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        let updated = ProviderUser {
            uid: user.uid.clone(),
            email: account.email.clone().or_else(|| user.email.clone()),
            display_name: Some(display_name.to_string()),
            photo_url: account.photo_url.clone().or_else(|| user.photo_url.clone()),
        };

        self.install(
            updated.clone(),
            account.id_token.unwrap_or(id_token),
            account.refresh_token.unwrap_or(refresh_token),
        );

        Ok(updated)
    }

    #[instrument(skip_all, fields(provider = provider.provider_id()))]
    async fn sign_in_with_redirect(
        &self,
        provider: FederatedProvider,
    ) -> Result<(), ProviderError> {
        let response: CreateAuthUriResponse = self
            .call(
                "createAuthUri",
                &json!({
                    "providerId": provider.provider_id(),
                    "continueUri": self.config.callback_url(),
                }),
            )
            .await?;

        let (Some(auth_uri), Some(session_id)) = (response.auth_uri, response.session_id) else {
            return Err(ProviderError::internal(
                "createAuthUri returned no authUri or sessionId",
            ));
        };

        let pending = PendingRedirect {
            provider_id: provider.provider_id().to_string(),
            session_id,
            continue_uri: self.config.callback_url().to_string(),
            callback_uri: None,
        };
        pending
            .save(self.store.as_ref())
            .map_err(ProviderError::internal)?;

        if let Err(err) = self.navigator.navigate(&auth_uri) {
            self.clear_pending_redirect();
            return Err(err);
        }

        debug!("redirect sign-in initiated");

        Ok(())
    }

    #[instrument(skip_all)]
    async fn redirect_result(&self) -> Result<Option<ProviderUser>, ProviderError> {
        let Some(pending) =
            PendingRedirect::load(self.store.as_ref()).map_err(ProviderError::internal)?
        else {
            return Ok(None);
        };

        let Some(callback_uri) = pending.callback_uri.clone() else {
            debug!("redirect sign-in still waiting for the browser");
            return Ok(None);
        };

        self.clear_pending_redirect();

        if let Some(error) = pending.callback_error() {
            let code = if error == "access_denied" {
                AuthErrorCode::RedirectCancelledByUser
            } else {
                AuthErrorCode::Internal
            };
            return Err(ProviderError::new(
                code,
                format!("identity provider returned {error}"),
            ));
        }

        let account: AccountResponse = self
            .call(
                "signInWithIdp",
                &json!({
                    "requestUri": callback_uri,
                    "sessionId": pending.session_id,
                    "returnSecureToken": true,
                    "returnIdpCredential": true,
                }),
            )
            .await?;

        self.adopt(account).map(Some)
    }

    #[instrument(skip_all)]
    async fn sign_out(&self) -> Result<(), ProviderError> {
        *self.credentials() = None;
        self.state.send_replace(None);

        self.store
            .remove(IDENTITY_KEY)
            .map_err(ProviderError::internal)
    }

    fn auth_state(&self) -> watch::Receiver<Option<ProviderUser>> {
        self.state.subscribe()
    }
}
