//! The notification dispatcher.
//!
//! Subscribers register here; the discovery engine hands every newly
//! published catalog to [`NotificationDispatcher::publish`]. Each
//! subscriber owns a capacity-one latest-wins channel: if a consumer has
//! not drained the previous notification, it is replaced by the newer
//! one. Catalogs are full snapshots, not deltas, so only the newest
//! matters and nothing is ever queued behind a slow consumer.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use uuid::Uuid;

use crate::catalog::capability::{CapabilityCatalog, CatalogCell};
use crate::dispatch::events::CatalogChangedEvent;

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A consumer's registered interest in catalog change notifications.
///
/// Lives until [`NotificationDispatcher::unsubscribe`] is called with its
/// id, or until the consumer drops it (the dispatcher prunes the dead
/// channel on the next publish).
pub struct Subscription {
    id: Uuid,
    rx: watch::Receiver<Option<CatalogChangedEvent>>,
}

impl Subscription {
    /// The handle used with [`NotificationDispatcher::unsubscribe`].
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the next catalog change.
    ///
    /// Returns `None` once the subscription has been cancelled or the
    /// dispatcher has gone away. Intermediate events that arrived while
    /// the consumer was busy are skipped; most-recent-wins.
    pub async fn changed(&mut self) -> Option<CatalogChangedEvent> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(event) = self.rx.borrow_and_update().clone() {
                return Some(event);
            }
        }
    }

    /// The latest event delivered to this subscription, if any was ever
    /// published. Does not wait; marks the value as seen.
    pub fn latest(&mut self) -> Option<CatalogChangedEvent> {
        self.rx.borrow_and_update().clone()
    }
}

// ---------------------------------------------------------------------------
// NotificationDispatcher
// ---------------------------------------------------------------------------

/// Publishes catalog change events and serves current-catalog queries.
///
/// Reads the shared [`CatalogCell`] but never writes it; the discovery
/// engine is the cell's only writer.
pub struct NotificationDispatcher {
    cell: Arc<CatalogCell>,
    subscribers: DashMap<Uuid, watch::Sender<Option<CatalogChangedEvent>>>,
}

impl NotificationDispatcher {
    /// Create a dispatcher reading from the shared catalog cell.
    pub fn new(cell: Arc<CatalogCell>) -> Self {
        Self {
            cell,
            subscribers: DashMap::new(),
        }
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = watch::channel(None);
        let id = Uuid::new_v4();
        self.subscribers.insert(id, tx);
        log::debug!("Subscriber registered: id={}", id);
        Subscription { id, rx }
    }

    /// Cancel a subscription. Returns `false` if the id was unknown.
    pub fn unsubscribe(&self, id: Uuid) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            log::debug!("Subscriber cancelled: id={}", id);
        }
        removed
    }

    /// Current catalog snapshot.
    pub fn current_catalog(&self) -> Arc<CapabilityCatalog> {
        self.cell.load()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver `event` to every live subscriber.
    ///
    /// Never blocks: each hand-off replaces the subscriber's pending
    /// notification, if any. Subscribers whose receiving side is gone are
    /// pruned here.
    pub fn publish(&self, event: CatalogChangedEvent) {
        let mut dead = Vec::new();
        for entry in self.subscribers.iter() {
            if entry.value().send(Some(event.clone())).is_err() {
                dead.push(*entry.key());
            }
        }
        for id in &dead {
            self.subscribers.remove(id);
        }

        log::info!(
            "Catalog change published: version={}, added={:?}, removed={:?}, changed={:?}, subscribers={}",
            event.version,
            event.added,
            event.removed,
            event.changed,
            self.subscribers.len()
        );
        if !dead.is_empty() {
            log::debug!("Pruned {} closed subscription(s)", dead.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::capability::{Capability, CatalogDiff};
    use std::collections::BTreeMap;

    fn published(version: u64, names: &[&str]) -> Arc<CapabilityCatalog> {
        let capabilities: BTreeMap<String, Capability> = names
            .iter()
            .map(|n| {
                (
                    n.to_string(),
                    Capability {
                        name: n.to_string(),
                        href: format!("/accounts/acc-123/{}", n),
                        method: "POST".to_string(),
                        description: format!("Execute {} (POST)", n),
                    },
                )
            })
            .collect();
        Arc::new(CapabilityCatalog::new(capabilities).into_published(version))
    }

    fn event(version: u64, names: &[&str]) -> CatalogChangedEvent {
        CatalogChangedEvent::new(published(version, names), CatalogDiff::default())
    }

    #[tokio::test]
    async fn test_subscribe_receives_publish() {
        let dispatcher = NotificationDispatcher::new(Arc::new(CatalogCell::new()));
        let mut sub = dispatcher.subscribe();

        dispatcher.publish(event(1, &["self"]));

        let received = sub.changed().await.unwrap();
        assert_eq!(received.version, 1);
    }

    #[tokio::test]
    async fn test_undrained_subscriber_sees_latest_only() {
        let dispatcher = NotificationDispatcher::new(Arc::new(CatalogCell::new()));
        let mut sub = dispatcher.subscribe();

        dispatcher.publish(event(1, &["self"]));
        dispatcher.publish(event(2, &["self", "deposit"]));
        dispatcher.publish(event(3, &["self", "deposit", "withdraw"]));

        // Never drained in between: only the newest is observable.
        let received = sub.changed().await.unwrap();
        assert_eq!(received.version, 3);
        assert_eq!(received.catalog.len(), 3);
        assert!(sub.latest().map(|e| e.version) == Some(3));
    }

    #[tokio::test]
    async fn test_unsubscribe_terminates_subscription() {
        let dispatcher = NotificationDispatcher::new(Arc::new(CatalogCell::new()));
        let mut sub = dispatcher.subscribe();
        assert_eq!(dispatcher.subscriber_count(), 1);

        assert!(dispatcher.unsubscribe(sub.id()));
        assert_eq!(dispatcher.subscriber_count(), 0);
        assert!(sub.changed().await.is_none());

        // Unknown id is a no-op.
        assert!(!dispatcher.unsubscribe(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn test_dropped_subscriber_pruned_on_publish() {
        let dispatcher = NotificationDispatcher::new(Arc::new(CatalogCell::new()));
        let sub = dispatcher.subscribe();
        let _live = dispatcher.subscribe();
        drop(sub);

        dispatcher.publish(event(1, &["self"]));
        assert_eq!(dispatcher.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_publish_with_no_subscribers_is_fine() {
        let dispatcher = NotificationDispatcher::new(Arc::new(CatalogCell::new()));
        dispatcher.publish(event(1, &["self"]));
        assert_eq!(dispatcher.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_current_catalog_reads_cell() {
        let cell = Arc::new(CatalogCell::new());
        let dispatcher = NotificationDispatcher::new(cell.clone());
        assert_eq!(dispatcher.current_catalog().version, 0);

        cell.store(published(4, &["self"]));
        assert_eq!(dispatcher.current_catalog().version, 4);
    }
}
