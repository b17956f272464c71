//! Hosted identity provider seam.
//!
//! [`IdentityProvider`] is the surface the session bridge needs from the hosted
//! auth service. [`IdentityToolkit`] implements it over the provider's REST API
//! and keeps its own persisted state (current user, pending redirect) in a
//! [`KeyValueStore`](crate::storage::KeyValueStore), the way the hosted web SDK
//! keeps it in the browser.

mod config;
mod error;
mod navigator;
mod redirect;
mod toolkit;

pub use config::{
    IdentityConfig, DEFAULT_AUTH_DOMAIN, DEFAULT_CALLBACK_URL, DEFAULT_IDENTITY_URL,
    DEFAULT_PROJECT_ID,
};
pub use error::{AuthErrorCode, ProviderError};
pub use navigator::{Navigator, SystemBrowser};
pub use redirect::{record_redirect_callback, PendingRedirect, PENDING_REDIRECT_KEY};
pub use toolkit::{IdentityToolkit, IDENTITY_KEY};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The provider's view of a signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Third-party identity providers reachable through a redirect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FederatedProvider {
    Google,
}

impl FederatedProvider {
    #[must_use]
    pub const fn provider_id(self) -> &'static str {
        match self {
            Self::Google => "google.com",
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Password sign-in. Success makes the returned user current.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError>;

    /// Creates an account and signs it in.
    async fn create_user(&self, email: &str, password: &str)
        -> Result<ProviderUser, ProviderError>;

    /// Sets the display name of `user`, which must be the current user.
    async fn update_profile(
        &self,
        user: &ProviderUser,
        display_name: &str,
    ) -> Result<ProviderUser, ProviderError>;

    /// Starts a redirect sign-in and returns once the redirect is under way.
    async fn sign_in_with_redirect(&self, provider: FederatedProvider)
        -> Result<(), ProviderError>;

    /// Completes a redirect sign-in started by an earlier process, if any.
    async fn redirect_result(&self) -> Result<Option<ProviderUser>, ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Auth-state stream: holds the current user and changes on every
    /// sign-in and sign-out.
    fn auth_state(&self) -> watch::Receiver<Option<ProviderUser>>;
}
