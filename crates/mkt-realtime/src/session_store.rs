use crate::Credential;

use std::sync::Arc;

use log::{debug, info};
use tokio::sync::watch;

/// The authenticated identity and its bearer credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: String,
    pub credential: Credential,
}

/// Source of truth for who is logged in.
///
/// Clones share the same state; the connection manager follows it through
/// [`SessionStore::changes`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the current session. Re-logging the same session does not
    /// notify observers.
    pub fn login(&self, identity: impl Into<String>, credential: impl Into<Credential>) {
        let session = Session {
            identity: identity.into(),
            credential: credential.into(),
        };
        let identity = session.identity.clone();

        let changed = self.tx.send_if_modified(|current| {
            if current.as_ref() == Some(&session) {
                return false;
            }
            *current = Some(session);
            true
        });

        if changed {
            info!("Session started for {identity}");
        } else {
            debug!("Session for {identity} unchanged");
        }
    }

    pub fn logout(&self) {
        if let Some(previous) = self.tx.send_replace(None) {
            info!("Session ended for {}", previous.identity);
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn changes(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}
