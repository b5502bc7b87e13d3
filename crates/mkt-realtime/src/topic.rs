use std::fmt;

const USER_PREFIX: &str = "/user/";
const USER_NOTIFICATIONS_SUFFIX: &str = "/queue/notifications";
const CONVERSATIONS_PREFIX: &str = "/topic/conversations/";
const SELLER_NOTIFICATIONS_PREFIX: &str = "/topic/notifications/";

/// A destination the client can subscribe to.
///
/// Destinations are bit-exact with the backend's broker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    /// `/user/{identity}/queue/notifications`
    UserNotifications { identity: String },
    /// `/topic/conversations/{conversationId}`
    Conversation { conversation_id: String },
    /// `/topic/notifications/{userId}`, the seller-side notification topic
    SellerNotifications { user_id: String },
    /// Any other destination, routed to listeners untouched
    Custom(String),
}

impl Topic {
    pub fn user_notifications(identity: impl Into<String>) -> Self {
        Self::UserNotifications {
            identity: identity.into(),
        }
    }

    pub fn conversation(conversation_id: impl Into<String>) -> Self {
        Self::Conversation {
            conversation_id: conversation_id.into(),
        }
    }

    pub fn seller_notifications(user_id: impl Into<String>) -> Self {
        Self::SellerNotifications {
            user_id: user_id.into(),
        }
    }

    pub fn destination(&self) -> String {
        match self {
            Self::UserNotifications { identity } => {
                format!("{USER_PREFIX}{identity}{USER_NOTIFICATIONS_SUFFIX}")
            }
            Self::Conversation { conversation_id } => {
                format!("{CONVERSATIONS_PREFIX}{conversation_id}")
            }
            Self::SellerNotifications { user_id } => {
                format!("{SELLER_NOTIFICATIONS_PREFIX}{user_id}")
            }
            Self::Custom(destination) => destination.clone(),
        }
    }

    /// Classify a raw destination; unknown shapes become `Custom`
    pub fn parse(destination: &str) -> Self {
        if let Some(identity) = destination
            .strip_prefix(USER_PREFIX)
            .and_then(|rest| rest.strip_suffix(USER_NOTIFICATIONS_SUFFIX))
            .filter(|identity| !identity.is_empty())
        {
            return Self::user_notifications(identity);
        }

        if let Some(id) = destination
            .strip_prefix(CONVERSATIONS_PREFIX)
            .filter(|id| !id.is_empty() && !id.contains('/'))
        {
            return Self::conversation(id);
        }

        if let Some(id) = destination
            .strip_prefix(SELLER_NOTIFICATIONS_PREFIX)
            .filter(|id| !id.is_empty() && !id.contains('/'))
        {
            return Self::seller_notifications(id);
        }

        Self::Custom(destination.to_string())
    }

    pub fn is_notification(&self) -> bool {
        matches!(
            self,
            Self::UserNotifications { .. } | Self::SellerNotifications { .. }
        )
    }

    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            Self::Conversation { conversation_id } => Some(conversation_id),
            _ => None,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.destination())
    }
}
