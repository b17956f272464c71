use crate::{
    cli::commands::{identity, storage},
    identity::{IdentityConfig, IdentityToolkit, Navigator},
    session::{DemoMode, SessionBridge},
    storage::{FileStore, KeyValueStore},
};
use anyhow::{Context, Result};
use clap::ArgMatches;
use std::{path::PathBuf, sync::Arc};
use tracing::debug;

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub identity: IdentityConfig,
    pub callback_port: u16,
    pub data_dir: PathBuf,
    pub demo_mode: DemoMode,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(identity: IdentityConfig, data_dir: PathBuf) -> Self {
        Self {
            identity,
            callback_port: 8085,
            data_dir,
            demo_mode: DemoMode::default(),
        }
    }

    /// # Errors
    /// Returns an error if a global argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let identity = identity::Options::parse(matches)?;
        let storage = storage::Options::parse(matches)?;

        Ok(Self {
            identity: identity.config,
            callback_port: identity.callback_port,
            data_dir: storage.data_dir,
            demo_mode: storage.demo_mode,
        })
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(FileStore::new(&self.data_dir))
    }

    /// Wires a bridge to the Identity Toolkit over `store`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn bridge(
        &self,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<SessionBridge> {
        debug!("identity settings: {:?}", self.identity);
        let provider = IdentityToolkit::new(self.identity.clone(), store.clone(), navigator)
            .context("failed to build the identity client")?;

        Ok(SessionBridge::new(Arc::new(provider), store, self.demo_mode))
    }
}
