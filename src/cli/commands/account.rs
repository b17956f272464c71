use clap::{builder::ValueParser, Arg, ArgAction, Command};
use regex::Regex;

pub const CMD_LOGIN: &str = "login";
pub const CMD_REGISTER: &str = "register";
pub const CMD_GOOGLE: &str = "google";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_STATUS: &str = "status";

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_NAME: &str = "name";
pub const ARG_NO_BROWSER: &str = "no-browser";
pub const ARG_TIMEOUT_SECONDS: &str = "timeout-seconds";

fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

#[must_use]
pub fn validator_email() -> ValueParser {
    ValueParser::from(move |email: &str| -> std::result::Result<String, String> {
        let email = email.trim();
        if valid_email(email) {
            Ok(email.to_string())
        } else {
            Err("invalid email address".to_string())
        }
    })
}

fn email_arg() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long(ARG_EMAIL)
        .help("Account email address")
        .env("TRIPCRAFT_EMAIL")
        .required(true)
        .value_parser(validator_email())
}

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .short('p')
        .long(ARG_PASSWORD)
        .help("Account password")
        .env("TRIPCRAFT_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Sign in with email and password")
                .arg(email_arg())
                .arg(password_arg()),
        )
        .subcommand(
            Command::new(CMD_REGISTER)
                .about("Create an account and sign in")
                .arg(email_arg())
                .arg(password_arg())
                .arg(
                    Arg::new(ARG_NAME)
                        .short('n')
                        .long(ARG_NAME)
                        .help("Display name for the new account")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new(CMD_GOOGLE)
                .about("Sign in with Google")
                .arg(
                    Arg::new(ARG_NO_BROWSER)
                        .long(ARG_NO_BROWSER)
                        .help("Print the sign-in URL instead of opening a browser")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new(ARG_TIMEOUT_SECONDS)
                        .long(ARG_TIMEOUT_SECONDS)
                        .help("How long to wait for the browser to return")
                        .env("TRIPCRAFT_GOOGLE_TIMEOUT_SECONDS")
                        .default_value("300")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                ),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("Sign out and forget the local session"))
        .subcommand(Command::new(CMD_STATUS).about("Show the current session"))
}
