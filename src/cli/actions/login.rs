use super::{attach, describe};
use crate::cli::globals::GlobalArgs;
use anyhow::{bail, Result};
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: SecretString,
}

/// Sign in with email and password.
///
/// # Errors
/// Returns an error if the credentials are rejected.
pub async fn execute(args: Args) -> Result<()> {
    let attached = attach(&args.globals, args.globals.store()).await?;

    if !attached
        .bridge
        .login(&args.email, args.password.expose_secret())
        .await
    {
        bail!("Sign-in failed: invalid email or password");
    }

    match attached.handle.current() {
        Some(session) => println!("Signed in as {}", describe(&session)),
        None => bail!("Sign-in failed: no session was established"),
    }

    Ok(())
}
