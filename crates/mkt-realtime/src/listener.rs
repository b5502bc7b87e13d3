use crate::InboundMessage;

use std::fmt;
use std::sync::Arc;

/// Callback invoked for every message on a subscribed topic
pub type Listener = Arc<dyn Fn(&InboundMessage) + Send + Sync>;

/// Wrap a closure as a [`Listener`]
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&InboundMessage) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Handle returned by `subscribe`, used to unsubscribe one callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl ListenerId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}
