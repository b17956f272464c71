use crate::identity::ProviderUser;
use serde::{Deserialize, Serialize};

const DEFAULT_DISPLAY_NAME: &str = "User";

/// The local representation of the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(
        rename = "photoURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<String>,
}

impl Session {
    /// Translates a provider user, filling the gaps the provider may leave.
    #[must_use]
    pub fn from_provider(user: &ProviderUser) -> Self {
        Self {
            id: user.uid.clone(),
            name: user
                .display_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            email: user.email.clone().unwrap_or_default(),
            photo_url: user.photo_url.clone().filter(|url| !url.is_empty()),
        }
    }
}

/// Snapshot of the shared session cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub session: Option<Session>,
    pub loading: bool,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session: None,
            loading: true,
        }
    }
}
