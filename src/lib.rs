//! # TripCraft (authentication client)
//!
//! `tripcraft` mirrors a hosted identity provider's auth state into a local
//! session cell that the rest of the application reads from.
//!
//! ## Session Bridge
//!
//! [`session::SessionBridge`] owns the only writable copy of the session. It
//! subscribes to the provider's auth-state stream, translates provider users
//! into [`session::Session`] records, and exposes `login`, `register`,
//! `login_with_google` and `logout`. Consumers hold a read-only
//! [`session::SessionHandle`].
//!
//! ## Fallback Store
//!
//! When the provider cannot authenticate the built-in demo identity, the bridge
//! installs a fixed demo session and keeps it in the `tripcraft_user` key of a
//! [`storage::KeyValueStore`]. Logout and unreadable records clear the key.
//!
//! ## Redirect sign-in
//!
//! Google sign-in is redirect based: phase one initiates the redirect and
//! returns, the [`callback`] listener captures the browser's return leg, and a
//! fresh bridge resolves the pending result on its next `start`.

pub mod callback;
pub mod cli;
pub mod identity;
pub mod session;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
