use super::{demo_session, messages, DemoMode, Session, SessionState};
use crate::{
    identity::{FederatedProvider, IdentityProvider, ProviderUser},
    storage::{FallbackStore, KeyValueStore},
};
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, instrument, warn};

/// Outcome of [`SessionBridge::login_with_google`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoogleSignIn {
    pub success: bool,
    pub message: Option<String>,
}

/// Bridges the identity provider and the local session cell.
///
/// Cloning is cheap; clones share the same cell.
#[derive(Clone)]
pub struct SessionBridge {
    inner: Arc<Inner>,
}

struct Inner {
    provider: Arc<dyn IdentityProvider>,
    fallback: FallbackStore,
    demo_mode: DemoMode,
    state: watch::Sender<SessionState>,
}

impl SessionBridge {
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn KeyValueStore>,
        demo_mode: DemoMode,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());

        Self {
            inner: Arc::new(Inner {
                provider,
                fallback: FallbackStore::new(store),
                demo_mode,
                state,
            }),
        }
    }

    /// Read-only view of the session cell.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            state: self.inner.state.subscribe(),
        }
    }

    /// Subscribes to the provider's auth-state stream, then resolves any
    /// pending redirect sign-in once.
    ///
    /// The listener lives until the returned [`Subscription`] is dropped or
    /// unsubscribed.
    pub async fn start(&self) -> Subscription {
        let mut auth_state = self.inner.provider.auth_state();
        let bridge = self.clone();

        let task = tokio::spawn(async move {
            loop {
                let user = auth_state.borrow_and_update().clone();
                bridge.apply_auth_state(user);

                if auth_state.changed().await.is_err() {
                    debug!("auth-state stream closed");
                    break;
                }
            }
        });

        match self.inner.provider.redirect_result().await {
            Ok(Some(user)) => {
                debug!("redirect sign-in completed");
                self.finish(Some(Session::from_provider(&user)));
            }
            Ok(None) => {}
            Err(err) => error!("Redirect result error: {err}"),
        }

        Subscription { task }
    }

    /// Password sign-in with the demo fallback.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> bool {
        self.set_loading(true);

        match self
            .inner
            .provider
            .sign_in_with_password(email, password)
            .await
        {
            Ok(user) => {
                self.finish(Some(Session::from_provider(&user)));
                true
            }
            Err(err) if self.inner.demo_mode.accepts(email, password) => {
                debug!("provider rejected the demo pair ({}), using demo session", err.code);

                let session = demo_session();
                let fallback = &self.inner.fallback;
                self.inner.state.send_modify(|state| {
                    fallback.save(&session);
                    state.session = Some(session.clone());
                    state.loading = false;
                });

                true
            }
            Err(err) => {
                debug!("login failed: {}", err.code);
                self.set_loading(false);
                false
            }
        }
    }

    /// Creates an account, names it, and signs it in.
    #[instrument(skip_all)]
    pub async fn register(&self, email: &str, password: &str, name: &str) -> bool {
        self.set_loading(true);

        let provider = &self.inner.provider;
        let result = match provider.create_user(email, password).await {
            Ok(user) => provider.update_profile(&user, name).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(user) => {
                let mut session = Session::from_provider(&user);
                session.name = name.to_string();
                self.finish(Some(session));
                true
            }
            Err(err) => {
                error!("Registration error: {err}");
                self.set_loading(false);
                false
            }
        }
    }

    /// Starts the redirect-based Google sign-in.
    ///
    /// Success only means the redirect was initiated; the identity arrives on a
    /// later `start`, so loading stays set.
    #[instrument(skip_all)]
    pub async fn login_with_google(&self) -> GoogleSignIn {
        self.set_loading(true);

        match self
            .inner
            .provider
            .sign_in_with_redirect(FederatedProvider::Google)
            .await
        {
            Ok(()) => GoogleSignIn {
                success: true,
                message: None,
            },
            Err(err) => {
                error!("Google sign-in error: {err}");
                self.set_loading(false);
                GoogleSignIn {
                    success: false,
                    message: Some(messages::google_failure_message(err.code).to_string()),
                }
            }
        }
    }

    /// Signs out remotely if possible; always clears the local session and the
    /// fallback record.
    #[instrument(skip_all)]
    pub async fn logout(&self) {
        if let Err(err) = self.inner.provider.sign_out().await {
            warn!("remote sign-out failed: {err}");
        }

        let fallback = &self.inner.fallback;
        self.inner.state.send_modify(|state| {
            fallback.clear();
            state.session = None;
            state.loading = false;
        });
    }

    fn apply_auth_state(&self, user: Option<ProviderUser>) {
        let fallback = &self.inner.fallback;
        self.inner.state.send_modify(|state| {
            state.session = match &user {
                Some(user) => Some(Session::from_provider(user)),
                None => fallback.load(),
            };
            state.loading = false;
        });
    }

    fn finish(&self, session: Option<Session>) {
        self.inner.state.send_modify(|state| {
            state.session = session;
            state.loading = false;
        });
    }

    fn set_loading(&self, loading: bool) {
        self.inner.state.send_if_modified(|state| {
            if state.loading == loading {
                return false;
            }
            state.loading = loading;
            true
        });
    }
}

/// Read-only access to the session cell.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    state: watch::Receiver<SessionState>,
}

impl SessionHandle {
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Waits for the next change. `None` once the bridge is gone.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Waits until no session-affecting operation is in flight.
    pub async fn ready(&mut self) -> SessionState {
        if let Ok(state) = self.state.wait_for(|state| !state.loading).await {
            return state.clone();
        }
        self.state.borrow().clone()
    }
}

/// Registration on the provider's auth-state stream.
#[derive(Debug)]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
