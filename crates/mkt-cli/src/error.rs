use crate::ClientError;

use mkt_config::ConfigError;
use mkt_realtime::RealtimeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Client(#[from] ClientError),

    #[error("Realtime error: {0}")]
    Realtime(#[from] RealtimeError),

    #[error("Missing {what}: pass --{flag} or set {env}")]
    MissingArgument {
        what: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("Realtime connection lost: {message}")]
    ConnectionLost { message: String },

    #[error("Logger error: {message}")]
    Logger { message: String },

    #[error("Output error: {message}")]
    Output { message: String },
}

pub type Result<T> = std::result::Result<T, CliError>;
