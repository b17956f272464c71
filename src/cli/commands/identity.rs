use crate::{
    callback,
    identity::{IdentityConfig, DEFAULT_AUTH_DOMAIN, DEFAULT_IDENTITY_URL, DEFAULT_PROJECT_ID},
};
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_API_KEY: &str = "api-key";
pub const ARG_IDENTITY_URL: &str = "identity-url";
pub const ARG_AUTH_DOMAIN: &str = "auth-domain";
pub const ARG_PROJECT_ID: &str = "project-id";
pub const ARG_CALLBACK_PORT: &str = "callback-port";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_KEY)
                .long(ARG_API_KEY)
                .help("Identity provider web API key")
                .long_help(
                    "Identity provider web API key. Without it every provider call fails with auth/invalid-api-key, so only the demo account can sign in.",
                )
                .env("TRIPCRAFT_API_KEY")
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            Arg::new(ARG_IDENTITY_URL)
                .long(ARG_IDENTITY_URL)
                .help("Identity Toolkit base URL")
                .env("TRIPCRAFT_IDENTITY_URL")
                .default_value(DEFAULT_IDENTITY_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_AUTH_DOMAIN)
                .long(ARG_AUTH_DOMAIN)
                .help("Auth domain of the TripCraft project")
                .env("TRIPCRAFT_AUTH_DOMAIN")
                .default_value(DEFAULT_AUTH_DOMAIN)
                .global(true),
        )
        .arg(
            Arg::new(ARG_PROJECT_ID)
                .long(ARG_PROJECT_ID)
                .help("TripCraft project id")
                .env("TRIPCRAFT_PROJECT_ID")
                .default_value(DEFAULT_PROJECT_ID)
                .global(true),
        )
        .arg(
            Arg::new(ARG_CALLBACK_PORT)
                .long(ARG_CALLBACK_PORT)
                .help("Local port that receives the Google sign-in redirect")
                .env("TRIPCRAFT_CALLBACK_PORT")
                .default_value("8085")
                .global(true)
                .value_parser(clap::value_parser!(u16)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub config: IdentityConfig,
    pub callback_port: u16,
}

impl Options {
    /// Parse identity provider options from CLI matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let identity_url = matches
            .get_one::<String>(ARG_IDENTITY_URL)
            .cloned()
            .context("missing required argument: --identity-url")?;
        let auth_domain = matches
            .get_one::<String>(ARG_AUTH_DOMAIN)
            .cloned()
            .context("missing required argument: --auth-domain")?;
        let project_id = matches
            .get_one::<String>(ARG_PROJECT_ID)
            .cloned()
            .context("missing required argument: --project-id")?;
        let callback_port = matches
            .get_one::<u16>(ARG_CALLBACK_PORT)
            .copied()
            .context("missing required argument: --callback-port")?;

        let api_key = matches
            .get_one::<String>(ARG_API_KEY)
            .filter(|key| !key.trim().is_empty())
            .map(|key| SecretString::from(key.clone()));

        let config = IdentityConfig::new(identity_url)
            .with_api_key(api_key)
            .with_auth_domain(auth_domain)
            .with_project_id(project_id)
            .with_callback_url(callback::callback_url(callback_port));

        Ok(Self {
            config,
            callback_port,
        })
    }
}
