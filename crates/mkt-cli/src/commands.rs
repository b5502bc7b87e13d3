use crate::chat_commands::ChatCommands;

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Log in and print the bearer token
    Login {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long)]
        password: String,
    },

    /// Stream notifications and chat messages until interrupted
    Listen {
        /// Also follow the seller notification topic for this user ID
        #[arg(long)]
        user_id: Option<String>,
        /// Conversation IDs to follow (repeatable)
        #[arg(long = "conversation")]
        conversations: Vec<String>,
    },

    /// Send a chat message over the realtime channel
    Send {
        /// Conversation ID
        #[arg(long)]
        conversation: String,
        /// Message text
        content: String,
        /// Receiver ID
        #[arg(long)]
        receiver: Option<String>,
        /// Sender ID (defaults to the identity)
        #[arg(long)]
        sender: Option<String>,
    },

    /// Mark a notification as read
    Read {
        /// Notification ID
        id: i64,
    },

    /// Send a liveness ping
    Ping {
        /// User ID to report (defaults to the identity)
        #[arg(long)]
        user_id: Option<String>,
    },

    /// Chat history over REST
    Chat {
        #[command(subcommand)]
        action: ChatCommands,
    },
}
