use super::describe;
use crate::{
    callback::{wait_for_callback, CallbackOutcome},
    cli::globals::GlobalArgs,
    identity::{AuthErrorCode, Navigator, PendingRedirect, ProviderError, SystemBrowser},
    session::{messages, Session, SessionBridge},
    storage::KeyValueStore,
};
use anyhow::{anyhow, bail, Context, Result};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub open_browser: bool,
    pub timeout: Duration,
}

/// Prints the authorization URL for the user to open by hand.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, url: &str) -> Result<(), ProviderError> {
        println!("Open this URL in a browser to continue signing in:\n\n  {url}\n");
        Ok(())
    }
}

/// Google sign-in through the browser.
///
/// Phase one initiates the redirect and waits for the browser to come back to
/// the local callback listener. Phase two is a fresh bridge whose `start`
/// resolves the pending redirect.
///
/// # Errors
/// Returns an error if the sign-in cannot be started, is cancelled, or does not
/// produce a session.
pub async fn execute(args: Args) -> Result<()> {
    let store = args.globals.store();

    // Bound before the redirect starts so the browser can never arrive first.
    let listener = TcpListener::bind(("127.0.0.1", args.globals.callback_port))
        .await
        .with_context(|| {
            format!(
                "failed to listen for the sign-in callback on port {}",
                args.globals.callback_port
            )
        })?;

    let navigator: Arc<dyn Navigator> = if args.open_browser {
        Arc::new(SystemBrowser)
    } else {
        Arc::new(ConsoleNavigator)
    };

    {
        let bridge = args.globals.bridge(store.clone(), navigator)?;
        let _subscription = bridge.start().await;
        bridge.handle().ready().await;

        let started = bridge.login_with_google().await;
        if !started.success {
            bail!(started
                .message
                .unwrap_or_else(|| messages::GOOGLE_SIGN_IN_FAILED.to_string()));
        }
    }

    let outcome = wait_for_callback(listener, store.clone(), args.timeout).await?;
    debug!("callback listener finished: {:?}", outcome);

    let session = finish(outcome, store, |store| {
        args.globals.bridge(store, Arc::new(SystemBrowser))
    })
    .await?;
    println!("Signed in with Google as {}", describe(&session));

    Ok(())
}

/// Phase two: resolves the redirect once the callback listener has returned.
///
/// An abandoned wait never reaches the provider. Otherwise `connect` builds the
/// bridge whose `start` exchanges the captured callback for a session. The
/// pending record is gone on every path.
async fn finish<F>(
    outcome: CallbackOutcome,
    store: Arc<dyn KeyValueStore>,
    connect: F,
) -> Result<Session>
where
    F: FnOnce(Arc<dyn KeyValueStore>) -> Result<SessionBridge>,
{
    let abandoned = match outcome {
        CallbackOutcome::Received => None,
        CallbackOutcome::TimedOut => Some(AuthErrorCode::CancelledPopupRequest),
        CallbackOutcome::Interrupted => Some(AuthErrorCode::PopupClosedByUser),
    };
    if let Some(code) = abandoned {
        clear_pending(store.as_ref());
        bail!(messages::google_failure_message(code));
    }

    let callback_error = PendingRedirect::load(store.as_ref())
        .ok()
        .flatten()
        .and_then(|pending| pending.callback_error());

    let bridge = connect(store.clone())?;
    let _subscription = bridge.start().await;
    let state = bridge.handle().ready().await;

    // The callback is consumed whether or not the provider accepted it.
    clear_pending(store.as_ref());

    if let Some(error) = callback_error {
        let code = if error == "access_denied" {
            AuthErrorCode::PopupClosedByUser
        } else {
            AuthErrorCode::Internal
        };
        bail!(messages::google_failure_message(code));
    }

    state
        .session
        .ok_or_else(|| anyhow!(messages::GOOGLE_SIGN_IN_FAILED))
}

fn clear_pending(store: &dyn KeyValueStore) {
    if let Err(err) = PendingRedirect::clear(store) {
        warn!("failed to clear the pending redirect: {err}");
    }
}
