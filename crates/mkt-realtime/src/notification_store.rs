use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::debug;
use mkt_core::Notification;
use tokio::sync::watch;

/// Shared notification list backing badges and inbox views.
///
/// Newest first. No deduplication: a redelivered notification is stored
/// twice. Unread count changes are published on a watch channel.
#[derive(Clone)]
pub struct NotificationStore {
    items: Arc<RwLock<Vec<Notification>>>,
    unread_tx: Arc<watch::Sender<usize>>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        let (unread_tx, _rx) = watch::channel(0);
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
            unread_tx: Arc::new(unread_tx),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Notification>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Notification>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_unread(&self, items: &[Notification]) {
        let unread = items.iter().filter(|n| !n.is_read).count();
        self.unread_tx.send_if_modified(|current| {
            if *current == unread {
                return false;
            }
            *current = unread;
            true
        });
    }

    pub fn add(&self, notification: Notification) {
        let mut items = self.write();
        debug!("Storing notification {}", notification.id);
        items.insert(0, notification);
        self.publish_unread(&items);
    }

    /// Mark every notification with `id` read; true if any changed
    pub fn mark_read(&self, id: i64) -> bool {
        let mut items = self.write();
        let mut changed = false;
        for notification in items.iter_mut().filter(|n| n.id == id) {
            changed |= notification.mark_read();
        }
        if changed {
            self.publish_unread(&items);
        }
        changed
    }

    /// Returns how many notifications flipped to read
    pub fn mark_all_read(&self) -> usize {
        let mut items = self.write();
        let changed = items
            .iter_mut()
            .map(Notification::mark_read)
            .filter(|changed| *changed)
            .count();
        if changed > 0 {
            self.publish_unread(&items);
        }
        changed
    }

    pub fn get(&self, id: i64) -> Option<Notification> {
        self.read().iter().find(|n| n.id == id).cloned()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn unread_count(&self) -> usize {
        *self.unread_tx.borrow()
    }

    pub fn unread_changes(&self) -> watch::Receiver<usize> {
        self.unread_tx.subscribe()
    }

    pub fn clear(&self) {
        let mut items = self.write();
        items.clear();
        self.publish_unread(&items);
    }
}
