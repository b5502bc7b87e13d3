use crate::commands::Commands;

use clap::Parser;

pub(crate) const TOKEN_ENV: &str = "MKT_TOKEN";
pub(crate) const IDENTITY_ENV: &str = "MKT_IDENTITY";

#[derive(Parser)]
#[command(name = "mkt")]
#[command(about = "Marketplace realtime client: notifications and chat from the terminal")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// REST base URL (overrides api.base_url)
    #[arg(long, global = true)]
    pub(crate) server: Option<String>,

    /// Realtime base URL (overrides realtime.ws_base_url)
    #[arg(long, global = true)]
    pub(crate) ws_url: Option<String>,

    /// Bearer token (falls back to MKT_TOKEN)
    #[arg(long, global = true)]
    pub(crate) token: Option<String>,

    /// Identity the realtime session belongs to (falls back to MKT_IDENTITY)
    #[arg(long, global = true)]
    pub(crate) identity: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub(crate) pretty: bool,
}
