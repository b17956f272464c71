//! Session Bridge.
//!
//! Mirrors the identity provider's auth state into a single session cell.
//! [`SessionBridge`] is the only writer; everything else reads through a
//! [`SessionHandle`].
//!
//! Flow Overview: `start` subscribes to the provider's auth-state stream and
//! resolves any pending redirect sign-in. `login` falls back to the demo
//! identity when the provider rejects the demo pair. `logout` always clears the
//! local session and the fallback record, whatever the provider says.

mod bridge;
mod demo;
pub mod messages;
mod model;

pub use bridge::{GoogleSignIn, SessionBridge, SessionHandle, Subscription};
pub use demo::{demo_session, DemoMode, DEMO_EMAIL, DEMO_PASSWORD};
pub use model::{Session, SessionState};
