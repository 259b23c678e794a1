//! Subscription prefix matching for SUB sockets.
//!
//! Filtering happens on the subscriber side: a publisher sends everything and
//! each SUB socket drops what it did not ask for.

use bytes::Bytes;

/// A subscription entry with topic prefix
#[derive(Debug, Clone)]
pub struct Subscription {
    /// Topic prefix (empty = subscribe to all)
    pub prefix: Bytes,
}

impl Subscription {
    /// Create a new subscription for a topic prefix
    #[must_use]
    pub const fn new(prefix: Bytes) -> Self {
        Self { prefix }
    }

    /// Check if this subscription matches a given payload
    #[must_use]
    pub fn matches(&self, payload: &[u8]) -> bool {
        payload.starts_with(&self.prefix)
    }
}

/// The set of prefixes a SUB socket accepts.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    /// Create a new empty subscription set
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Add a subscription
    pub fn subscribe(&mut self, prefix: Bytes) {
        // Don't add duplicates
        if !self.subscriptions.iter().any(|s| s.prefix == prefix) {
            self.subscriptions.push(Subscription::new(prefix));
        }
    }

    /// Remove a subscription. Returns false if it was not present.
    pub fn unsubscribe(&mut self, prefix: &[u8]) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.prefix != prefix);
        before != self.subscriptions.len()
    }

    /// Check if a payload matches any subscription
    ///
    /// No subscriptions = nothing is delivered.
    #[must_use]
    pub fn matches(&self, payload: &[u8]) -> bool {
        self.subscriptions.iter().any(|s| s.matches(payload))
    }

    /// Get all subscriptions
    #[must_use]
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Check if there are no subscriptions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Get the number of subscriptions
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_matches() {
        let sub = Subscription::new(Bytes::from("topic."));
        assert!(sub.matches(b"topic.a"));
        assert!(sub.matches(b"topic."));
        assert!(!sub.matches(b"topic"));
        assert!(!sub.matches(b"other"));
    }

    #[test]
    fn test_empty_prefix_matches_all() {
        let mut set = SubscriptionSet::new();
        set.subscribe(Bytes::new());
        assert!(set.matches(b"anything"));
        assert!(set.matches(b""));
    }

    #[test]
    fn test_no_subscription_matches_nothing() {
        let set = SubscriptionSet::new();
        assert!(set.is_empty());
        assert!(!set.matches(b"anything"));
    }

    #[test]
    fn test_duplicates_and_unsubscribe() {
        let mut set = SubscriptionSet::new();
        set.subscribe(Bytes::from("a"));
        set.subscribe(Bytes::from("a"));
        set.subscribe(Bytes::from("b"));
        assert_eq!(set.len(), 2);

        assert!(set.unsubscribe(b"a"));
        assert!(!set.unsubscribe(b"a"));
        assert!(!set.matches(b"apple"));
        assert!(set.matches(b"banana"));
    }
}
