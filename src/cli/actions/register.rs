use super::{attach, describe};
use crate::cli::globals::GlobalArgs;
use anyhow::{bail, Result};
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: SecretString,
    pub name: String,
}

/// Create an account and sign in.
///
/// # Errors
/// Returns an error if the provider refuses the account.
pub async fn execute(args: Args) -> Result<()> {
    let attached = attach(&args.globals, args.globals.store()).await?;

    if !attached
        .bridge
        .register(&args.email, args.password.expose_secret(), &args.name)
        .await
    {
        bail!("Registration failed for {}", args.email);
    }

    match attached.handle.current() {
        Some(session) => println!("Registered and signed in as {}", describe(&session)),
        None => bail!("Registration failed: no session was established"),
    }

    Ok(())
}
