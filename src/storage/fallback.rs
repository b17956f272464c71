use super::KeyValueStore;
use crate::session::Session;
use std::sync::Arc;
use tracing::{debug, warn};

/// Local-storage key holding the demo session.
pub const FALLBACK_USER_KEY: &str = "tripcraft_user";

/// The fallback session record kept in local storage.
///
/// Only the demo login path writes here. Read failures and unparsable records
/// both resolve to "no session"; an unparsable record is removed.
#[derive(Clone)]
pub struct FallbackStore {
    store: Arc<dyn KeyValueStore>,
}

impl FallbackStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn load(&self) -> Option<Session> {
        let raw = match self.store.get(FALLBACK_USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("failed to read fallback session: {err}");
                return None;
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => {
                debug!("fallback session loaded");
                Some(session)
            }
            Err(err) => {
                warn!("discarding unreadable fallback session: {err}");
                self.clear();
                None
            }
        }
    }

    pub fn save(&self, session: &Session) {
        let result = serde_json::to_string(session)
            .map_err(|err| err.to_string())
            .and_then(|raw| {
                self.store
                    .set(FALLBACK_USER_KEY, &raw)
                    .map_err(|err| err.to_string())
            });

        if let Err(err) = result {
            warn!("failed to persist fallback session: {err}");
        }
    }

    pub fn clear(&self) {
        if let Err(err) = self.store.remove(FALLBACK_USER_KEY) {
            warn!("failed to clear fallback session: {err}");
        }
    }
}

impl std::fmt::Debug for FallbackStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackStore")
            .field("key", &FALLBACK_USER_KEY)
            .finish()
    }
}
