pub mod connection_config;
pub mod connection_manager;
pub mod connection_state;
pub mod credential;
pub mod dispatcher;
pub mod error;
pub mod heartbeat;
pub mod inbound_message;
pub mod listener;
pub mod notification_store;
pub mod reconnect_policy;
pub mod session_store;
pub mod sockjs;
pub mod stomp_command;
pub mod stomp_frame;
pub mod subscription_registry;
pub mod topic;
pub mod transport;
pub mod web_socket_transport;

pub use connection_config::ConnectionConfig;
pub use connection_manager::{
    CHAT_DESTINATION, ConnectionManager, ConnectionManagerBuilder, PING_DESTINATION,
    READ_RECEIPT_DESTINATION,
};
pub use connection_state::ConnectionState;
pub use credential::Credential;
pub use dispatcher::{Dispatcher, ToastSink};
pub use error::{RealtimeError, Result};
pub use heartbeat::Heartbeat;
pub use inbound_message::{ControlPing, InboundMessage};
pub use listener::{Listener, ListenerId, listener};
pub use notification_store::NotificationStore;
pub use reconnect_policy::ReconnectPolicy;
pub use session_store::{Session, SessionStore};
pub use sockjs::SockJsFrame;
pub use stomp_command::StompCommand;
pub use stomp_frame::{Decoded, FrameBuffer, HEARTBEAT_EOL, StompFrame};
pub use subscription_registry::SubscriptionRegistry;
pub use topic::Topic;
pub use transport::{ConnectRequest, Transport, TransportLink};
pub use web_socket_transport::WebSocketTransport;

#[cfg(test)]
mod tests;
