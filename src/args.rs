use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "rebloggr", version)]
#[command(about = "utility to reblog all posts from one blog to another")]
pub struct Args {
    /// Log level
    #[arg(
        long,
        value_enum,
        ignore_case = true,
        default_value_t = LogLevel::Info,
        global = true
    )]
    pub log_level: LogLevel,

    /// Consumer Key generated during application registration
    #[arg(
        long,
        env = "REBLOGGR_CONSUMER_KEY",
        default_value = "",
        hide_env_values = true,
        global = true
    )]
    pub consumer_key: String,

    /// Consumer Secret generated during application registration
    #[arg(
        long,
        env = "REBLOGGR_CONSUMER_SECRET",
        default_value = "",
        hide_env_values = true,
        global = true
    )]
    pub consumer_secret: String,

    /// Callback URL setup during application registration
    #[arg(long, env = "REBLOGGR_CALLBACK_URL", default_value = "", global = true)]
    pub callback_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get an OAuth token
    Token,
    /// Start the reblogging process
    Reblog(ReblogArgs),
}

#[derive(clap::Args, Debug)]
pub struct ReblogArgs {
    /// OAuth token key
    #[arg(
        long,
        env = "REBLOGGR_TOKEN_KEY",
        default_value = "",
        hide_env_values = true
    )]
    pub token_key: String,

    /// OAuth token secret key
    #[arg(
        long,
        env = "REBLOGGR_TOKEN_SECRET",
        default_value = "",
        hide_env_values = true
    )]
    pub token_secret: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}
