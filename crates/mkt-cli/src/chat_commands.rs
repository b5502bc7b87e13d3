use clap::Subcommand;

#[derive(Subcommand)]
pub enum ChatCommands {
    /// List conversations
    Conversations,
    /// List messages of a conversation
    Messages {
        /// Conversation ID
        conversation_id: String,
    },
}
