//! Process-wide auth state: who the identity provider says is signed in.
//!
//! The state starts `Unknown` and becomes `Resolved` on the first
//! [`AuthState::update`], which is the only mutation. Observers subscribe to
//! a stream of changes. Registration and the read of the current value
//! happen under the same lock, so a subscriber either sees a change in its
//! initial value or receives it as an event, never neither.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::models::User;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthSnapshot {
    /// No provider callback has been received yet.
    #[default]
    Unknown,
    /// The provider has reported; `None` means signed out.
    Resolved(Option<User>),
}

impl AuthSnapshot {
    pub fn is_ready(&self) -> bool {
        matches!(self, AuthSnapshot::Resolved(_))
    }

    pub fn uid(&self) -> Option<&str> {
        match self {
            AuthSnapshot::Resolved(Some(user)) => Some(&user.uid),
            _ => None,
        }
    }
}

struct Inner {
    snapshot: AuthSnapshot,
    subscribers: HashMap<Uuid, mpsc::UnboundedSender<Option<User>>>,
}

pub struct AuthState {
    inner: Mutex<Inner>,
}

impl AuthState {
    pub fn new() -> Self {
        AuthState {
            inner: Mutex::new(Inner {
                snapshot: AuthSnapshot::Unknown,
                subscribers: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The guarded data stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.lock().snapshot.clone()
    }

    /// Records a provider callback and notifies every subscriber.
    pub fn update(&self, user: Option<User>) {
        let mut inner = self.lock();
        debug!(
            "Auth state changed to {:?} ({} subscribers)",
            user.as_ref().map(|u| u.uid.as_str()),
            inner.subscribers.len()
        );
        inner.snapshot = AuthSnapshot::Resolved(user.clone());
        inner
            .subscribers
            .retain(|_, sender| sender.send(user.clone()).is_ok());
    }

    /// Subscribes to auth-state changes. If the state is already resolved the
    /// current user is delivered as the first event.
    pub fn subscribe(self: &Arc<Self>) -> AuthSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();

        let mut inner = self.lock();
        if let AuthSnapshot::Resolved(user) = &inner.snapshot {
            // The receiver is alive, so this cannot fail.
            let _ = sender.send(user.clone());
        }
        inner.subscribers.insert(id, sender);
        drop(inner);

        AuthSubscription {
            id,
            state: Arc::clone(self),
            receiver,
        }
    }

    /// Waits until the state is resolved and returns the current user.
    pub async fn ready(self: &Arc<Self>) -> Option<User> {
        if let AuthSnapshot::Resolved(user) = self.snapshot() {
            return user;
        }
        self.subscribe().next().await
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn unsubscribe(&self, id: &Uuid) {
        self.lock().subscribers.remove(id);
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription to auth-state changes. Dropping it unsubscribes.
pub struct AuthSubscription {
    id: Uuid,
    state: Arc<AuthState>,
    receiver: mpsc::UnboundedReceiver<Option<User>>,
}

impl AuthSubscription {
    /// Returns the next reported user (`None` = signed out).
    pub async fn next(&mut self) -> Option<User> {
        match self.receiver.recv().await {
            Some(user) => user,
            // The state holds the sender for as long as we are registered.
            None => std::future::pending().await,
        }
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.state.unsubscribe(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn user(uid: &str) -> User {
        User::new(uid.to_string(), None, format!("{}-secret", uid))
    }

    #[tokio::test]
    async fn test_starts_unknown() {
        let state = AuthState::new();
        assert_eq!(state.snapshot(), AuthSnapshot::Unknown);
        assert!(!state.snapshot().is_ready());
    }

    #[tokio::test]
    async fn test_ready_blocks_until_first_update() {
        let state = Arc::new(AuthState::new());

        let pending = timeout(Duration::from_millis(50), state.ready()).await;
        assert!(pending.is_err(), "ready() must wait for the first callback");

        let waiter = {
            let state = state.clone();
            tokio::spawn(async move { state.ready().await })
        };
        tokio::task::yield_now().await;
        state.update(Some(user("alice")));

        let resolved = timeout(Duration::from_secs(1), waiter)
            .await
            .expect("ready() should resolve")
            .expect("task should not panic");
        assert_eq!(resolved.map(|u| u.uid), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn test_ready_immediate_when_resolved() {
        let state = Arc::new(AuthState::new());
        state.update(None);
        let user = timeout(Duration::from_millis(50), state.ready())
            .await
            .expect("already resolved");
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_subscriber_sees_current_value_first() {
        let state = Arc::new(AuthState::new());
        state.update(Some(user("alice")));

        let mut subscription = state.subscribe();
        let first = subscription.next().await;
        assert_eq!(first.map(|u| u.uid), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn test_every_change_is_delivered_in_order() {
        let state = Arc::new(AuthState::new());
        let mut subscription = state.subscribe();

        state.update(Some(user("alice")));
        state.update(Some(user("bob")));
        state.update(None);

        assert_eq!(
            subscription.next().await.map(|u| u.uid),
            Some("alice".to_string())
        );
        assert_eq!(
            subscription.next().await.map(|u| u.uid),
            Some("bob".to_string())
        );
        assert_eq!(subscription.next().await, None);
        assert_eq!(state.snapshot(), AuthSnapshot::Resolved(None));
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let state = Arc::new(AuthState::new());
        let first = state.subscribe();
        let second = state.subscribe();
        assert_eq!(state.subscriber_count(), 2);

        drop(first);
        assert_eq!(state.subscriber_count(), 1);
        drop(second);
        assert_eq!(state.subscriber_count(), 0);

        // Updating without subscribers is fine.
        state.update(Some(user("alice")));
        assert_eq!(state.snapshot().uid(), Some("alice"));
    }
}
