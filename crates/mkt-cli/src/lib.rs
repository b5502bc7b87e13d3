//! mkt-cli library
//!
//! Exports the REST client, rendering helpers and realtime wiring used by the
//! `mkt` binary and its tests.

pub mod client;
pub mod error;
pub mod logger;
pub mod realtime;
pub mod render;
pub mod toast;

#[cfg(test)]
mod tests;

pub use client::{ApiClient, CliClientResult, ClientError, LoginResponse, extract_error_message};
pub use error::{CliError, Result as CliResult};
pub use realtime::{ListenOptions, build_manager, listen, with_connection};
pub use toast::TerminalToast;
