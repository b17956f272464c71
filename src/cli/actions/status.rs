use super::{attach, describe};
use crate::cli::globals::GlobalArgs;
use anyhow::Result;

/// Print the current session.
///
/// Starting the bridge also completes a Google sign-in whose browser leg has
/// already returned.
///
/// # Errors
/// Returns an error if the identity client cannot be built.
pub async fn execute(globals: GlobalArgs) -> Result<()> {
    let attached = attach(&globals, globals.store()).await?;

    match attached.handle.current() {
        Some(session) => {
            println!("Signed in as {}", describe(&session));
            if let Some(photo_url) = session.photo_url {
                println!("Photo: {photo_url}");
            }
        }
        None => println!("Not signed in"),
    }

    Ok(())
}
