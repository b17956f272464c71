//! Local listener for the return leg of redirect sign-in.
//!
//! The provider sends the browser back to `http://localhost:<port>/auth/callback`.
//! The listener records the query into the pending redirect and stops; the
//! redirect is resolved by the next [`SessionBridge::start`](crate::session::SessionBridge::start).

pub mod handlers;

use crate::storage::KeyValueStore;
use anyhow::Result;
use axum::{
    http::{HeaderName, HeaderValue},
    routing::get,
    Router,
};
use std::{sync::Arc, time::Duration};
use tokio::{
    net::TcpListener,
    sync::{mpsc, oneshot},
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, info};
use ulid::Ulid;

pub const CALLBACK_PATH: &str = "/auth/callback";

/// Callback URL for a listener on `port`.
#[must_use]
pub fn callback_url(port: u16) -> String {
    format!("http://localhost:{port}{CALLBACK_PATH}")
}

#[derive(Clone)]
pub struct CallbackState {
    store: Arc<dyn KeyValueStore>,
    captured: mpsc::Sender<()>,
}

impl CallbackState {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, captured: mpsc::Sender<()>) -> Self {
        Self { store, captured }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
    Received,
    TimedOut,
    Interrupted,
}

#[must_use]
pub fn router(state: CallbackState) -> Router {
    Router::new()
        .route(CALLBACK_PATH, get(handlers::redirect))
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

/// Serves the callback router until a redirect is recorded, `timeout`
/// elapses, or the process receives Ctrl-C.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn wait_for_callback(
    listener: TcpListener,
    store: Arc<dyn KeyValueStore>,
    timeout: Duration,
) -> Result<CallbackOutcome> {
    let (captured_tx, mut captured_rx) = mpsc::channel(1);
    let (outcome_tx, outcome_rx) = oneshot::channel();

    let app = router(CallbackState::new(store, captured_tx));

    info!("Listening for sign-in callback on {}", listener.local_addr()?);

    let shutdown = async move {
        let outcome = tokio::select! {
            received = captured_rx.recv() => match received {
                Some(()) => CallbackOutcome::Received,
                None => CallbackOutcome::Interrupted,
            },
            () = tokio::time::sleep(timeout) => CallbackOutcome::TimedOut,
            _ = tokio::signal::ctrl_c() => CallbackOutcome::Interrupted,
        };

        debug!("callback listener stopping: {:?}", outcome);

        let _ = outcome_tx.send(outcome);
    };

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(outcome_rx.await.unwrap_or(CallbackOutcome::Interrupted))
}
