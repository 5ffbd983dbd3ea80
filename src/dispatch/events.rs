//! Event payloads emitted by the notification dispatcher.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::capability::{CapabilityCatalog, CatalogDiff};

/// Emitted whenever the discovery engine publishes a new catalog.
///
/// Carries the membership transition (`added`/`removed`, plus in-place
/// `changed` targets) and the full new catalog snapshot, so a subscriber
/// that only ever sees the latest event still holds the complete current
/// state.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogChangedEvent {
    /// Version of the newly published catalog.
    pub version: u64,
    /// Capability names gained since the previously published catalog.
    pub added: BTreeSet<String>,
    /// Capability names lost since the previously published catalog.
    pub removed: BTreeSet<String>,
    /// Capability names whose `(href, method)` pair changed in place.
    pub changed: BTreeSet<String>,
    /// The full new catalog snapshot.
    #[serde(skip_serializing)]
    pub catalog: Arc<CapabilityCatalog>,
    /// When the catalog was published.
    pub published_at: DateTime<Utc>,
}

impl CatalogChangedEvent {
    /// Build an event from a published catalog and its diff against the
    /// previous publication.
    pub fn new(catalog: Arc<CapabilityCatalog>, diff: CatalogDiff) -> Self {
        Self {
            version: catalog.version,
            added: diff.added,
            removed: diff.removed,
            changed: diff.changed,
            published_at: Utc::now(),
            catalog,
        }
    }
}
