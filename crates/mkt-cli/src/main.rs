//! mkt - marketplace realtime client
//!
//! Listens for push notifications and chat messages over STOMP-over-WebSocket
//! and talks to the REST collaborators from the terminal.
//!
//! # Examples
//!
//! ```bash
//! # Get a token
//! mkt login --email user@example.com --password secret
//!
//! # Stream notifications and one conversation
//! MKT_TOKEN=abc123 mkt --identity user@example.com listen --conversation 42
//!
//! # Acknowledge a notification
//! mkt --token abc123 --identity user@example.com read 7
//! ```

mod chat_commands;
mod cli;
mod commands;

use crate::{
    chat_commands::ChatCommands,
    cli::{Cli, IDENTITY_ENV, TOKEN_ENV},
    commands::Commands,
};

use std::process::ExitCode;

use clap::Parser;
use log::info;
use mkt_cli::{
    ApiClient, CliError, CliResult, ListenOptions, build_manager, listen, logger, with_connection,
};
use mkt_config::Config;
use mkt_core::ChatMessageDraft;
use mkt_realtime::{Credential, RealtimeError};
use serde_json::{Value, json};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pretty = cli.pretty;
    match run(cli, &config).await {
        Ok(Some(value)) => print_json(&value, pretty),
        Ok(None) => ExitCode::SUCCESS,
        Err(CliError::Client(e)) => {
            eprintln!("Error: {}", e.user_message(&config.api.fallback_error_message));
            info!("{e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load, override from flags, validate, then start logging
fn load_config(cli: &Cli) -> CliResult<Config> {
    let mut config = Config::load()?;

    if let Some(ref server) = cli.server {
        config.api.base_url = server.clone();
    }
    if let Some(ref ws_url) = cli.ws_url {
        config.realtime.ws_base_url = ws_url.clone();
    }

    config.validate()?;

    logger::initialize(
        config.logging.level,
        config.log_file_path()?,
        config.logging.colored,
    )?;
    config.log_summary();

    Ok(config)
}

async fn run(cli: Cli, config: &Config) -> CliResult<Option<Value>> {
    let token = cli.token.or_else(|| std::env::var(TOKEN_ENV).ok());
    let identity = cli.identity.or_else(|| std::env::var(IDENTITY_ENV).ok());
    let credential = token.map(Credential::from);

    match cli.command {
        Commands::Login { email, password } => {
            let client = ApiClient::from_config(&config.api, None)?;
            let login = client.login(&email, &password).await?;
            Ok(Some(serde_json::to_value(&login).map_err(output_error)?))
        }

        Commands::Chat { action } => {
            let client = ApiClient::from_config(&config.api, credential)?;
            match action {
                ChatCommands::Conversations => Ok(Some(client.list_conversations().await?)),
                ChatCommands::Messages { conversation_id } => {
                    let messages = client.list_messages(&conversation_id).await?;
                    Ok(Some(serde_json::to_value(&messages).map_err(output_error)?))
                }
            }
        }

        Commands::Listen {
            user_id,
            conversations,
        } => {
            let credential = require_credential(credential)?;
            let options = ListenOptions {
                identity: require_identity(identity)?,
                user_id,
                conversations,
            };
            let manager = build_manager(config);
            listen(&manager, &options, credential).await?;
            Ok(None)
        }

        Commands::Send {
            conversation,
            content,
            receiver,
            sender,
        } => {
            let credential = require_credential(credential)?;
            let identity = require_identity(identity)?;
            let mut draft =
                ChatMessageDraft::text(conversation, sender.unwrap_or(identity.clone()), content);
            if let Some(receiver) = receiver {
                draft = draft.with_receiver(receiver);
            }
            draft.validate().map_err(RealtimeError::from)?;

            let manager = build_manager(config);
            with_connection(&manager, &identity, credential, |manager| {
                Ok(manager.send_chat_message(&draft)?)
            })
            .await?;
            Ok(Some(json!({ "sent": true, "conversationId": draft.conversation_id })))
        }

        Commands::Read { id } => {
            let credential = require_credential(credential)?;
            let identity = require_identity(identity)?;
            let manager = build_manager(config);
            with_connection(&manager, &identity, credential, |manager| {
                manager.mark_notification_read(id)?;
                Ok(())
            })
            .await?;
            Ok(Some(json!({ "id": id, "read": true })))
        }

        Commands::Ping { user_id } => {
            let credential = require_credential(credential)?;
            let identity = require_identity(identity)?;
            let user_id = user_id.unwrap_or(identity.clone());
            let manager = build_manager(config);
            with_connection(&manager, &identity, credential, |manager| {
                Ok(manager.ping(user_id.clone())?)
            })
            .await?;
            Ok(Some(json!({ "pinged": user_id })))
        }
    }
}

fn print_json(value: &Value, pretty: bool) -> ExitCode {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };

    match output {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing response: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn require_credential(credential: Option<Credential>) -> CliResult<Credential> {
    credential
        .filter(|credential| !credential.is_empty())
        .ok_or(CliError::MissingArgument {
            what: "token",
            flag: "token",
            env: TOKEN_ENV,
        })
}

fn require_identity(identity: Option<String>) -> CliResult<String> {
    identity
        .filter(|identity| !identity.trim().is_empty())
        .ok_or(CliError::MissingArgument {
            what: "identity",
            flag: "identity",
            env: IDENTITY_ENV,
        })
}

fn output_error(e: serde_json::Error) -> CliError {
    CliError::Output {
        message: e.to_string(),
    }
}
