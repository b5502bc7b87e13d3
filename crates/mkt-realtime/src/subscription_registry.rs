use crate::{InboundMessage, Listener, ListenerId, StompFrame, Topic};

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use tokio::sync::mpsc;

/// Topic -> ordered listeners, with one transport subscription per topic.
///
/// A topic has a transport subscription exactly when it has listeners and a
/// link is attached. Clones share state.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    topics: BTreeMap<Topic, TopicEntry>,
    /// STOMP subscription id -> topic, for routing MESSAGE frames
    by_subscription_id: HashMap<String, Topic>,
    /// Outbound side of the live connection, if any
    link: Option<mpsc::UnboundedSender<String>>,
    next_listener_id: u64,
    next_subscription_id: u64,
}

struct TopicEntry {
    listeners: Vec<(ListenerId, Listener)>,
    subscription_id: Option<String>,
}

impl RegistryInner {
    fn allocate_subscription_id(&mut self) -> String {
        self.next_subscription_id += 1;
        format!("sub-{}", self.next_subscription_id)
    }

    /// Send SUBSCRIBE for `topic` if a link is attached
    fn open_transport_subscription(&mut self, topic: &Topic) {
        let Some(link) = self.link.clone() else {
            debug!("Deferring subscription to {topic} until connected");
            return;
        };

        let id = self.allocate_subscription_id();
        let frame = StompFrame::subscribe(&id, &topic.destination());
        if link.send(frame.encode()).is_err() {
            warn!("Could not subscribe to {topic}: link closed");
            return;
        }

        debug!("Subscribed to {topic} as {id}");
        self.by_subscription_id.insert(id.clone(), topic.clone());
        if let Some(entry) = self.topics.get_mut(topic) {
            entry.subscription_id = Some(id);
        }
    }

    fn close_transport_subscription(&mut self, topic: &Topic, subscription_id: Option<String>) {
        let Some(id) = subscription_id else {
            return;
        };
        self.by_subscription_id.remove(&id);

        if let Some(link) = &self.link
            && link.send(StompFrame::unsubscribe(&id).encode()).is_err()
        {
            warn!("Could not unsubscribe {id} from {topic}: link closed");
            return;
        }
        debug!("Unsubscribed {id} from {topic}");
    }
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `listener` on `topic`.
    ///
    /// The first listener on a topic opens the transport subscription (or
    /// defers it until connected). Registering the same listener twice on the
    /// same topic returns the existing handle.
    pub fn subscribe(&self, topic: Topic, listener: Listener) -> ListenerId {
        let mut inner = self.lock();

        if let Some(entry) = inner.topics.get(&topic)
            && let Some((id, _)) = entry
                .listeners
                .iter()
                .find(|(_, existing)| Arc::ptr_eq(existing, &listener))
        {
            debug!("Listener already registered on {topic}");
            return *id;
        }

        inner.next_listener_id += 1;
        let id = ListenerId(inner.next_listener_id);

        let first = match inner.topics.get_mut(&topic) {
            Some(entry) => {
                entry.listeners.push((id, listener));
                entry.listeners.len() == 1
            }
            None => {
                inner.topics.insert(
                    topic.clone(),
                    TopicEntry {
                        listeners: vec![(id, listener)],
                        subscription_id: None,
                    },
                );
                true
            }
        };

        if first {
            inner.open_transport_subscription(&topic);
        }

        id
    }

    /// Remove one listener; the last one out closes the transport
    /// subscription. Returns false if the listener was not registered.
    pub fn unsubscribe(&self, topic: &Topic, id: ListenerId) -> bool {
        let mut inner = self.lock();

        let Some(entry) = inner.topics.get_mut(topic) else {
            return false;
        };
        let before = entry.listeners.len();
        entry.listeners.retain(|(existing, _)| *existing != id);
        if entry.listeners.len() == before {
            return false;
        }

        if entry.listeners.is_empty()
            && let Some(entry) = inner.topics.remove(topic)
        {
            inner.close_transport_subscription(topic, entry.subscription_id);
        }

        true
    }

    /// Remove a listener from whichever topic holds it
    pub fn unsubscribe_listener(&self, id: ListenerId) -> bool {
        let topic = {
            let inner = self.lock();
            inner
                .topics
                .iter()
                .find(|(_, entry)| entry.listeners.iter().any(|(existing, _)| *existing == id))
                .map(|(topic, _)| topic.clone())
        };

        match topic {
            Some(topic) => self.unsubscribe(&topic, id),
            None => false,
        }
    }

    /// Bind to a freshly connected link and subscribe every topic that still
    /// has listeners. Returns the number of topics subscribed.
    pub fn attach(&self, link: mpsc::UnboundedSender<String>) -> usize {
        let mut inner = self.lock();
        inner.by_subscription_id.clear();
        inner.link = Some(link);

        let topics: Vec<Topic> = inner
            .topics
            .iter_mut()
            .filter(|(_, entry)| !entry.listeners.is_empty())
            .map(|(topic, entry)| {
                entry.subscription_id = None;
                topic.clone()
            })
            .collect();

        for topic in &topics {
            inner.open_transport_subscription(topic);
        }

        if !topics.is_empty() {
            info!("Re-subscribed {} topic(s) after connect", topics.len());
        }
        topics.len()
    }

    /// Forget the link; transport subscriptions died with the socket
    pub fn detach(&self) {
        let mut inner = self.lock();
        inner.link = None;
        inner.by_subscription_id.clear();
        for entry in inner.topics.values_mut() {
            entry.subscription_id = None;
        }
    }

    pub fn is_attached(&self) -> bool {
        self.lock().link.is_some()
    }

    /// Topic for an inbound MESSAGE: by `subscription` header, falling back
    /// to the `destination` header
    pub fn resolve(&self, subscription_id: Option<&str>, destination: Option<&str>) -> Option<Topic> {
        if let Some(topic) = subscription_id.and_then(|id| self.lock().by_subscription_id.get(id).cloned()) {
            return Some(topic);
        }
        destination.map(Topic::parse)
    }

    /// Snapshot of the listeners on `topic`, in registration order
    pub fn listeners_for(&self, topic: &Topic) -> Vec<Listener> {
        self.lock()
            .topics
            .get(topic)
            .map(|entry| entry.listeners.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default()
    }

    /// Invoke every listener on `topic` outside the lock. A panicking
    /// listener is logged and does not stop the others.
    pub fn notify(&self, topic: &Topic, message: &InboundMessage) -> usize {
        let listeners = self.listeners_for(topic);
        for listener in &listeners {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener(message);
            }));
            if outcome.is_err() {
                warn!("Listener on {topic} panicked while handling a {} message", message.kind());
            }
        }
        listeners.len()
    }

    pub fn listener_count(&self, topic: &Topic) -> usize {
        self.lock()
            .topics
            .get(topic)
            .map_or(0, |entry| entry.listeners.len())
    }

    /// 0 or 1: whether `topic` currently holds a transport subscription
    pub fn transport_subscription_count(&self, topic: &Topic) -> usize {
        self.lock()
            .topics
            .get(topic)
            .map_or(0, |entry| usize::from(entry.subscription_id.is_some()))
    }

    /// Total transport subscriptions across all topics
    pub fn total_transport_subscriptions(&self) -> usize {
        self.lock().by_subscription_id.len()
    }

    /// Topics with at least one listener
    pub fn active_topics(&self) -> Vec<Topic> {
        self.lock()
            .topics
            .iter()
            .filter(|(_, entry)| !entry.listeners.is_empty())
            .map(|(topic, _)| topic.clone())
            .collect()
    }
}
