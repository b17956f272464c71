//! Subcommand implementations.
//!
//! Every action builds its own [`SessionBridge`](crate::session::SessionBridge)
//! over the file store, waits for the restored state to settle, and then runs
//! one operation. Results go to stdout; diagnostics go through `tracing`.

pub mod google;
pub mod login;
pub mod logout;
pub mod register;
pub mod status;

use crate::{
    cli::globals::GlobalArgs,
    identity::SystemBrowser,
    session::{Session, SessionBridge, SessionHandle, Subscription},
    storage::KeyValueStore,
};
use anyhow::Result;
use std::sync::Arc;

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    Register(register::Args),
    Google(google::Args),
    Logout(GlobalArgs),
    Status(GlobalArgs),
}

impl Action {
    /// Run the selected subcommand.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn execute(self) -> Result<()> {
        match self {
            Self::Login(args) => login::execute(args).await,
            Self::Register(args) => register::execute(args).await,
            Self::Google(args) => google::execute(args).await,
            Self::Logout(globals) => logout::execute(globals).await,
            Self::Status(globals) => status::execute(globals).await,
        }
    }
}

/// A started bridge whose initial state has settled.
struct Attached {
    bridge: SessionBridge,
    handle: SessionHandle,
    _subscription: Subscription,
}

async fn attach(globals: &GlobalArgs, store: Arc<dyn KeyValueStore>) -> Result<Attached> {
    let bridge = globals.bridge(store, Arc::new(SystemBrowser))?;
    let subscription = bridge.start().await;
    let mut handle = bridge.handle();
    handle.ready().await;

    Ok(Attached {
        bridge,
        handle,
        _subscription: subscription,
    })
}

fn describe(session: &Session) -> String {
    if session.email.is_empty() {
        format!("{} (id {})", session.name, session.id)
    } else {
        format!("{} <{}> (id {})", session.name, session.email, session.id)
    }
}
