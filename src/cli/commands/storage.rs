use crate::session::DemoMode;
use anyhow::{Context, Result};
use clap::{builder::BoolishValueParser, Arg, ArgMatches, Command};
use std::path::PathBuf;

pub const ARG_DATA_DIR: &str = "data-dir";
pub const ARG_DEMO_MODE: &str = "demo-mode";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DATA_DIR)
                .long(ARG_DATA_DIR)
                .help("Directory holding the local session store")
                .env("TRIPCRAFT_DATA_DIR")
                .default_value(".tripcraft")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_DEMO_MODE)
                .long(ARG_DEMO_MODE)
                .help("Accept the built-in demo account when the provider rejects it")
                .env("TRIPCRAFT_DEMO_MODE")
                .default_value("true")
                .default_missing_value("true")
                .num_args(0..=1)
                .global(true)
                .value_parser(BoolishValueParser::new()),
        )
}

#[derive(Debug)]
pub struct Options {
    pub data_dir: PathBuf,
    pub demo_mode: DemoMode,
}

impl Options {
    /// Parse local storage options from CLI matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let data_dir = matches
            .get_one::<PathBuf>(ARG_DATA_DIR)
            .cloned()
            .context("missing required argument: --data-dir")?;
        let demo_mode = matches
            .get_one::<bool>(ARG_DEMO_MODE)
            .copied()
            .unwrap_or(true);

        Ok(Self {
            data_dir,
            demo_mode: DemoMode::from_flag(demo_mode),
        })
    }
}
