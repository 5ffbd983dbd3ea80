//! Notification dispatch.
//!
//! Publishes "capability set changed" events to subscribers and answers
//! synchronous queries for the current catalog. Delivery is best-effort
//! per subscriber: a slow or absent consumer can never block the
//! discovery engine's next tick or delivery to anyone else.

pub mod dispatcher;
pub mod events;

pub use dispatcher::{NotificationDispatcher, Subscription};
pub use events::CatalogChangedEvent;
