//! Insertion-ordered listener registry with stable handles

/// Handle identifying one subscription. Tokens are never reused within a
/// registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

/// Maps stable tokens to subscribers, preserving insertion order for
/// notification.
///
/// Duplicate policy: the same logical listener may be subscribed more than
/// once; each call yields an independent token and an independent callback.
/// Unsubscribing a token that was never issued, or was already removed, is a
/// no-op.
pub struct SubscriptionManager<L> {
    next_token: u64,
    entries: Vec<(SubscriptionToken, L)>,
}

impl<L> Default for SubscriptionManager<L> {
    fn default() -> Self {
        Self {
            next_token: 0,
            entries: Vec::new(),
        }
    }
}

impl<L> SubscriptionManager<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: L) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token);
        self.next_token += 1;
        self.entries.push((token, listener));
        token
    }

    pub fn unsubscribe(&mut self, token: SubscriptionToken) {
        self.entries.retain(|(t, _)| *t != token);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take the subscriber list out for dispatch. While detached, the
    /// registry is empty; pair with [`attach`](Self::attach).
    pub fn detach(&mut self) -> Vec<(SubscriptionToken, L)> {
        std::mem::take(&mut self.entries)
    }

    /// Restore a detached subscriber list, keeping entries subscribed in the
    /// meantime after the restored ones.
    pub fn attach(&mut self, mut entries: Vec<(SubscriptionToken, L)>) {
        entries.append(&mut self.entries);
        self.entries = entries;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_order_is_insertion_order() {
        let mut subs = SubscriptionManager::new();
        subs.subscribe("a");
        subs.subscribe("b");
        subs.subscribe("c");
        let order: Vec<&str> = subs.detach().into_iter().map(|(_, l)| l).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_token() {
        let mut subs = SubscriptionManager::new();
        let a = subs.subscribe("a");
        let _b = subs.subscribe("b");
        subs.unsubscribe(a);
        assert_eq!(subs.len(), 1);
        let order: Vec<&str> = subs.detach().into_iter().map(|(_, l)| l).collect();
        assert_eq!(order, vec!["b"]);
    }

    #[test]
    fn test_stale_token_is_noop() {
        let mut subs = SubscriptionManager::new();
        let a = subs.subscribe("a");
        subs.unsubscribe(a);
        subs.unsubscribe(a);
        assert!(subs.is_empty());

        // A token for an already-removed entry matches nothing later either
        subs.subscribe("x");
        subs.unsubscribe(a);
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn test_duplicates_allowed_with_independent_tokens() {
        let mut subs = SubscriptionManager::new();
        let first = subs.subscribe("same");
        let second = subs.subscribe("same");
        assert_ne!(first, second);
        assert_eq!(subs.len(), 2);
        subs.unsubscribe(first);
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn test_attach_keeps_midflight_subscriptions() {
        let mut subs = SubscriptionManager::new();
        subs.subscribe("a");
        let detached = subs.detach();
        assert!(subs.is_empty());
        subs.subscribe("b");
        subs.attach(detached);
        let order: Vec<&str> = subs.detach().into_iter().map(|(_, l)| l).collect();
        assert_eq!(order, vec!["a", "b"]);
    }
}
