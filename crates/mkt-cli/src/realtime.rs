//! Wiring between the CLI and the realtime connection manager.

use crate::error::{CliError, Result as CliErrorResult};
use crate::render::render_message;
use crate::toast::TerminalToast;

use std::sync::Arc;

use log::{info, warn};
use mkt_config::Config;
use mkt_realtime::{
    ConnectionConfig, ConnectionManager, ConnectionState, Credential, InboundMessage, ListenerId,
    ReconnectPolicy, Topic, listener,
};

/// Build a manager from configuration, printing notifications as toasts
pub fn build_manager(config: &Config) -> ConnectionManager {
    ConnectionManager::builder(ConnectionConfig::from(&config.realtime))
        .policy(ReconnectPolicy::from(&config.reconnect))
        .toast(Arc::new(TerminalToast))
        .build()
}

/// What `mkt listen` subscribes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenOptions {
    pub identity: String,
    /// Adds the seller-side `/topic/notifications/{user_id}` topic
    pub user_id: Option<String>,
    pub conversations: Vec<String>,
}

impl ListenOptions {
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics = vec![Topic::user_notifications(&self.identity)];

        if let Some(ref user_id) = self.user_id {
            topics.push(Topic::seller_notifications(user_id));
        }

        for conversation in &self.conversations {
            let topic = Topic::conversation(conversation);
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }

        topics
    }
}

/// Register a printing listener on every topic in `options`.
///
/// Notifications are already shown by the toast sink, so notification topics
/// only print the unread badge.
pub fn subscribe_all(
    manager: &ConnectionManager,
    options: &ListenOptions,
) -> Vec<(Topic, ListenerId)> {
    options
        .topics()
        .into_iter()
        .map(|topic| {
            let id = if topic.is_notification() {
                let store = manager.notifications().clone();
                manager.subscribe(
                    topic.clone(),
                    listener(move |message: &InboundMessage| match message {
                        InboundMessage::Notification(_) => {
                            println!("  ({} unread)", store.unread_count());
                        }
                        other => println!("{}", render_message(other)),
                    }),
                )
            } else {
                manager.subscribe(
                    topic.clone(),
                    listener(|message: &InboundMessage| println!("{}", render_message(message))),
                )
            };
            (topic, id)
        })
        .collect()
}

pub fn unsubscribe_all(manager: &ConnectionManager, subscriptions: &[(Topic, ListenerId)]) {
    for (topic, id) in subscriptions {
        manager.unsubscribe(topic, *id);
    }
}

/// Stream realtime traffic to stdout until ctrl-c or until reconnecting
/// gives up.
pub async fn listen(
    manager: &ConnectionManager,
    options: &ListenOptions,
    credential: Credential,
) -> CliErrorResult<()> {
    let subscriptions = subscribe_all(manager, options);
    let mut states = manager.state_changes();

    if let Err(e) = manager.connect(options.identity.clone(), credential).await {
        if !e.is_retryable() {
            unsubscribe_all(manager, &subscriptions);
            manager.disconnect().await;
            return Err(e.into());
        }
        warn!("Realtime connect failed, retrying in the background: {e}");
    }

    for topic in options.topics() {
        info!("Listening on {topic}");
    }

    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, closing realtime connection");
                break Ok(());
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let state = states.borrow_and_update().clone();
                info!("Realtime connection {state}");
                if let ConnectionState::Error { message } = state {
                    break Err(CliError::ConnectionLost { message });
                }
            }
        }
    };

    unsubscribe_all(manager, &subscriptions);
    manager.disconnect().await;

    outcome
}

/// Connect, run `action` against the live connection, then disconnect.
pub async fn with_connection<F>(
    manager: &ConnectionManager,
    identity: &str,
    credential: Credential,
    action: F,
) -> CliErrorResult<()>
where
    F: FnOnce(&ConnectionManager) -> CliErrorResult<()>,
{
    manager.connect(identity.to_string(), credential).await?;
    let result = action(manager);
    manager.disconnect().await;
    result
}
