//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the [`Action`] the binary executes.

use crate::cli::{
    actions::{google, login, register, Action},
    commands::account,
    globals::GlobalArgs,
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use std::time::Duration;

fn required_string(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or the subcommand is unknown.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let (name, sub) = matches
        .subcommand()
        .context("missing subcommand, see --help")?;

    // Global arguments are propagated into the subcommand matches.
    let globals = GlobalArgs::parse(sub)?;

    match name {
        account::CMD_LOGIN => Ok(Action::Login(login::Args {
            globals,
            email: required_string(sub, account::ARG_EMAIL)?,
            password: SecretString::from(required_string(sub, account::ARG_PASSWORD)?),
        })),
        account::CMD_REGISTER => Ok(Action::Register(register::Args {
            globals,
            email: required_string(sub, account::ARG_EMAIL)?,
            password: SecretString::from(required_string(sub, account::ARG_PASSWORD)?),
            name: required_string(sub, account::ARG_NAME)?,
        })),
        account::CMD_GOOGLE => {
            let timeout_seconds = sub
                .get_one::<u64>(account::ARG_TIMEOUT_SECONDS)
                .copied()
                .unwrap_or(300);

            Ok(Action::Google(google::Args {
                globals,
                open_browser: !sub.get_flag(account::ARG_NO_BROWSER),
                timeout: Duration::from_secs(timeout_seconds),
            }))
        }
        account::CMD_LOGOUT => Ok(Action::Logout(globals)),
        account::CMD_STATUS => Ok(Action::Status(globals)),
        other => Err(anyhow!("unknown command: {other}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{cli::commands, session::DemoMode};
    use secrecy::ExposeSecret;

    fn dispatch(args: &[&str]) -> Action {
        temp_env::with_vars(
            [
                ("TRIPCRAFT_API_KEY", None::<&str>),
                ("TRIPCRAFT_DEMO_MODE", None),
                ("TRIPCRAFT_CALLBACK_PORT", None),
                ("TRIPCRAFT_EMAIL", None),
                ("TRIPCRAFT_PASSWORD", None),
                ("TRIPCRAFT_GOOGLE_TIMEOUT_SECONDS", None),
            ],
            || {
                let matches = commands::new().get_matches_from(args);
                handler(&matches).unwrap()
            },
        )
    }

    #[test]
    fn login_maps_credentials() {
        let action = dispatch(&[
            "tripcraft",
            "login",
            "--email",
            "abc123@gmail.com",
            "--password",
            "123456",
        ]);

        let Action::Login(args) = action else {
            panic!("expected login action");
        };
        assert_eq!(args.email, "abc123@gmail.com");
        assert_eq!(args.password.expose_secret(), "123456");
        assert_eq!(args.globals.demo_mode, DemoMode::Enabled);
        assert!(args.globals.identity.api_key().is_none());
    }

    #[test]
    fn register_maps_name() {
        let action = dispatch(&[
            "tripcraft",
            "register",
            "--email",
            "new@trip.example.org",
            "--password",
            "secret1",
            "--name",
            "Ada",
        ]);

        let Action::Register(args) = action else {
            panic!("expected register action");
        };
        assert_eq!(args.name, "Ada");
    }

    #[test]
    fn google_maps_flags_and_callback_url() {
        let action = dispatch(&[
            "tripcraft",
            "google",
            "--no-browser",
            "--timeout-seconds",
            "30",
            "--callback-port",
            "9000",
        ]);

        let Action::Google(args) = action else {
            panic!("expected google action");
        };
        assert!(!args.open_browser);
        assert_eq!(args.timeout, Duration::from_secs(30));
        assert_eq!(args.globals.callback_port, 9000);
        assert_eq!(
            args.globals.identity.callback_url(),
            "http://localhost:9000/auth/callback"
        );
    }

    #[test]
    fn logout_and_status_carry_globals() {
        let action = dispatch(&["tripcraft", "logout", "--demo-mode", "false"]);
        let Action::Logout(globals) = action else {
            panic!("expected logout action");
        };
        assert_eq!(globals.demo_mode, DemoMode::Disabled);

        let action = dispatch(&["tripcraft", "status", "--data-dir", "/tmp/trip"]);
        let Action::Status(globals) = action else {
            panic!("expected status action");
        };
        assert_eq!(globals.data_dir, std::path::PathBuf::from("/tmp/trip"));
    }
}
