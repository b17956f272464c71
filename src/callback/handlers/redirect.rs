use crate::{callback::CallbackState, identity::record_redirect_callback};
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tracing::{debug, error, instrument};

const COMPLETE_PAGE: &str =
    "<!doctype html><title>TripCraft</title><p>Sign-in received. You can close this window and return to TripCraft.</p>";
const NO_PENDING_PAGE: &str =
    "<!doctype html><title>TripCraft</title><p>No sign-in is in progress.</p>";
const FAILED_PAGE: &str =
    "<!doctype html><title>TripCraft</title><p>Sign-in could not be recorded. Please try again.</p>";

/// Return leg of the redirect sign-in.
///
/// The query string is stored verbatim; it is only interpreted when the
/// pending redirect is resolved.
#[instrument(skip_all)]
pub async fn redirect(
    State(state): State<CallbackState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    match record_redirect_callback(state.store.as_ref(), query.as_deref()) {
        Ok(true) => {
            debug!("redirect callback recorded");
            // The listener only needs one signal; a full channel means it already has it.
            let _ = state.captured.try_send(());
            (StatusCode::OK, Html(COMPLETE_PAGE))
        }
        Ok(false) => (StatusCode::NOT_FOUND, Html(NO_PENDING_PAGE)),
        Err(err) => {
            error!("Failed to record redirect callback: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(FAILED_PAGE))
        }
    }
}
