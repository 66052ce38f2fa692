// Shared roster with snapshot subscriptions.
//
// Subscribers see the full roster when they subscribe and again after every
// committed mutation. Dropping a subscription unregisters it.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{Roster, RosterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("roster store closed")]
pub struct StoreClosed;

/// Single writer, many readers. Readers hold `Arc` snapshots, so a slow
/// subscriber never blocks `update`.
#[derive(Debug)]
pub struct RosterStore {
    tx: watch::Sender<Arc<Roster>>,
}

impl RosterStore {
    pub fn new(roster: Roster) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(roster));
        RosterStore { tx }
    }

    /// The current roster.
    pub fn snapshot(&self) -> Arc<Roster> {
        self.tx.borrow().clone()
    }

    /// Apply a mutation to a copy of the roster and publish it on success.
    ///
    /// The copy, mutation and publish happen under the channel's write lock,
    /// so concurrent updates are serialized and none is lost. When the
    /// closure fails nothing is published and subscribers are not woken.
    pub fn update<T, F>(&self, f: F) -> Result<T, RosterError>
    where
        F: FnOnce(&mut Roster) -> Result<T, RosterError>,
    {
        let mut outcome = None;
        self.tx.send_if_modified(|current| {
            let mut next = (**current).clone();
            match f(&mut next) {
                Ok(out) => {
                    debug!(
                        "roster updated: {} players, {} confirmed",
                        next.len(),
                        next.confirmed_count()
                    );
                    *current = Arc::new(next);
                    outcome = Some(Ok(out));
                    true
                }
                Err(e) => {
                    warn!("roster update rejected: {}", e);
                    outcome = Some(Err(e));
                    false
                }
            }
        });
        // send_if_modified always runs the closure exactly once.
        outcome.unwrap_or_else(|| unreachable!("update closure did not run"))
    }

    /// Register a new subscriber. The first call to
    /// [`RosterSubscription::current`] yields the roster as of now.
    pub fn subscribe(&self) -> RosterSubscription {
        let mut rx = self.tx.subscribe();
        rx.mark_changed();
        RosterSubscription { rx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Handle returned by [`RosterStore::subscribe`].
#[derive(Debug)]
pub struct RosterSubscription {
    rx: watch::Receiver<Arc<Roster>>,
}

impl RosterSubscription {
    /// Latest snapshot, marking it as seen.
    pub fn current(&mut self) -> Arc<Roster> {
        self.rx.borrow_and_update().clone()
    }

    /// Whether a snapshot is waiting that has not been seen yet.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next unseen snapshot. A fresh subscription resolves
    /// immediately with the roster as it was at subscribe time.
    pub async fn changed(&mut self) -> Result<Arc<Roster>, StoreClosed> {
        self.rx.changed().await.map_err(|_| StoreClosed)?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Player, Position};

    fn store_with_two() -> RosterStore {
        let roster = Roster::from_players(vec![
            Player::new("1", "Ana", Position::Goalkeeper),
            Player::new("2", "Bea", Position::Defender),
        ])
        .unwrap();
        RosterStore::new(roster)
    }

    #[tokio::test]
    async fn subscribe_delivers_initial_snapshot() {
        let store = store_with_two();
        let mut sub = store.subscribe();
        assert!(sub.has_changed());

        let snap = sub.changed().await.unwrap();
        assert_eq!(snap.len(), 2);
        assert!(!sub.has_changed());
    }

    #[tokio::test]
    async fn update_notifies_subscribers() {
        let store = store_with_two();
        let mut sub = store.subscribe();
        sub.current();

        store.update(|r| r.set_confirmed("1", true)).unwrap();

        let snap = sub.changed().await.unwrap();
        assert_eq!(snap.confirmed_count(), 1);
        assert_eq!(store.snapshot().confirmed_count(), 1);
    }

    #[tokio::test]
    async fn failed_update_publishes_nothing() {
        let store = store_with_two();
        let mut sub = store.subscribe();
        sub.current();

        let err = store.update(|r| r.set_confirmed("missing", true)).unwrap_err();
        assert_eq!(err, RosterError::PlayerNotFound { id: "missing".into() });
        assert!(!sub.has_changed());
        assert_eq!(store.snapshot().confirmed_count(), 0);
    }

    #[tokio::test]
    async fn dropping_subscription_unregisters() {
        let store = store_with_two();
        let sub = store.subscribe();
        let other = store.subscribe();
        assert_eq!(store.subscriber_count(), 2);
        drop(sub);
        assert_eq!(store.subscriber_count(), 1);
        drop(other);
        assert_eq!(store.subscriber_count(), 0);

        // Updates still apply with no one listening.
        store.update(|r| r.toggle_confirmed("2")).unwrap();
        assert_eq!(store.snapshot().confirmed_count(), 1);
    }

    #[tokio::test]
    async fn closed_store_reports_error() {
        let store = store_with_two();
        let mut sub = store.subscribe();
        sub.current();
        drop(store);
        assert_eq!(sub.changed().await.unwrap_err(), StoreClosed);
    }

    #[test]
    fn concurrent_updates_are_all_kept() {
        let players = (0..64)
            .map(|i| Player::new(i.to_string(), format!("P{i}"), Position::Midfielder))
            .collect();
        let store = RosterStore::new(Roster::from_players(players).unwrap());

        std::thread::scope(|s| {
            for i in 0..64 {
                let store = &store;
                s.spawn(move || {
                    store
                        .update(|r| r.set_confirmed(&i.to_string(), true))
                        .unwrap();
                });
            }
        });

        assert_eq!(store.snapshot().confirmed_count(), 64);
    }

    #[test]
    fn update_returns_closure_value() {
        let store = store_with_two();
        let now_confirmed = store.update(|r| r.toggle_confirmed("2")).unwrap();
        assert!(now_confirmed);
    }
}
