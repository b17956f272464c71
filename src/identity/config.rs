use secrecy::SecretString;

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_AUTH_DOMAIN: &str = "tripcraft-app.firebaseapp.com";
pub const DEFAULT_PROJECT_ID: &str = "tripcraft-app";
pub const DEFAULT_CALLBACK_URL: &str = "http://localhost:8085/auth/callback";

/// Connection settings for the hosted identity provider.
///
/// The web API key identifies the project rather than authorizing anything,
/// but it is still kept out of logs. Without a key every call fails with
/// `auth/invalid-api-key` before touching the network.
///
/// `auth_domain` and `project_id` name the hosted project. No request reads
/// them; they are carried so the configuration shows up whole in logs.
#[derive(Clone)]
pub struct IdentityConfig {
    identity_url: String,
    api_key: Option<SecretString>,
    auth_domain: String,
    project_id: String,
    callback_url: String,
}

impl IdentityConfig {
    #[must_use]
    pub fn new(identity_url: String) -> Self {
        Self {
            identity_url: identity_url.trim_end_matches('/').to_string(),
            api_key: None,
            auth_domain: DEFAULT_AUTH_DOMAIN.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            callback_url: DEFAULT_CALLBACK_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<SecretString>) -> Self {
        self.api_key = api_key;
        self
    }

    #[must_use]
    pub fn with_auth_domain(mut self, auth_domain: String) -> Self {
        self.auth_domain = auth_domain;
        self
    }

    #[must_use]
    pub fn with_project_id(mut self, project_id: String) -> Self {
        self.project_id = project_id;
        self
    }

    #[must_use]
    pub fn with_callback_url(mut self, callback_url: String) -> Self {
        self.callback_url = callback_url;
        self
    }

    #[must_use]
    pub fn identity_url(&self) -> &str {
        &self.identity_url
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref()
    }

    #[must_use]
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTITY_URL.to_string())
    }
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("identity_url", &self.identity_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("callback_url", &self.callback_url)
            .finish()
    }
}
