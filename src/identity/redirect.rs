use crate::storage::{KeyValueStore, StorageError};
use serde::{Deserialize, Serialize};

/// Provider-side key holding the redirect sign-in in flight.
pub const PENDING_REDIRECT_KEY: &str = "tripcraft_redirect";

/// A redirect sign-in started in one process and finished in a later one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRedirect {
    pub provider_id: String,
    pub session_id: String,
    pub continue_uri: String,
    /// Full URI the browser returned to, once captured.
    #[serde(default)]
    pub callback_uri: Option<String>,
}

impl PendingRedirect {
    /// Reads the pending record. Unreadable records count as absent.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn load(store: &dyn KeyValueStore) -> Result<Option<Self>, StorageError> {
        Ok(store
            .get(PENDING_REDIRECT_KEY)?
            .and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        store.set(PENDING_REDIRECT_KEY, &serde_json::to_string(self)?)
    }

    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn clear(store: &dyn KeyValueStore) -> Result<(), StorageError> {
        store.remove(PENDING_REDIRECT_KEY)
    }

    /// The `error` query parameter of the captured callback, if any.
    #[must_use]
    pub fn callback_error(&self) -> Option<String> {
        let uri = url::Url::parse(self.callback_uri.as_deref()?).ok()?;
        uri.query_pairs()
            .find(|(key, _)| key == "error")
            .map(|(_, value)| value.into_owned())
    }
}

/// Attaches the browser's return query to the pending redirect.
///
/// Returns `false` when no redirect is pending, in which case nothing is
/// written.
///
/// # Errors
/// Returns an error if the store cannot be read or written.
pub fn record_redirect_callback(
    store: &dyn KeyValueStore,
    query: Option<&str>,
) -> Result<bool, StorageError> {
    let Some(mut pending) = PendingRedirect::load(store)? else {
        return Ok(false);
    };

    let callback_uri = match query.filter(|query| !query.is_empty()) {
        Some(query) => format!("{}?{query}", pending.continue_uri),
        None => pending.continue_uri.clone(),
    };
    pending.callback_uri = Some(callback_uri);
    pending.save(store)?;

    Ok(true)
}
