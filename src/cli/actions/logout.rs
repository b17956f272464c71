use super::attach;
use crate::cli::globals::GlobalArgs;
use anyhow::Result;

/// Sign out. Always clears the local session.
///
/// # Errors
/// Returns an error if the identity client cannot be built.
pub async fn execute(globals: GlobalArgs) -> Result<()> {
    let attached = attach(&globals, globals.store()).await?;

    attached.bridge.logout().await;

    println!("Signed out");

    Ok(())
}
