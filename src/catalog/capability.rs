//! Capability and catalog value types.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// A named, invokable unit derived 1:1 from one action-descriptor entry
/// of the resource representation.
///
/// Immutable value object. Identity for catalog-equality purposes is the
/// `(name, href, method)` triple; the description is derived and carries
/// no identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability {
    /// Capability name. Equals the relation name in the action map.
    pub name: String,
    /// Invocation target. May be server-relative.
    pub href: String,
    /// HTTP method, uppercased. Defaults to GET when the descriptor
    /// omitted one.
    pub method: String,
    /// Human-readable description.
    pub description: String,
}

impl Capability {
    /// Whether invoking this capability mutates resource state.
    pub fn is_mutating(&self) -> bool {
        matches!(self.method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE")
    }
}

// ---------------------------------------------------------------------------
// CapabilityCatalog
// ---------------------------------------------------------------------------

/// An immutable set of capabilities plus a version and computation time.
///
/// Two catalogs are *equal* iff they contain the same capability names,
/// each mapping to the same `(href, method)` pair. Version and timestamp
/// are bookkeeping, excluded from equality; see [`same_capabilities`].
///
/// [`same_capabilities`]: CapabilityCatalog::same_capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityCatalog {
    /// Capabilities keyed by name. `BTreeMap` gives canonical order.
    pub capabilities: BTreeMap<String, Capability>,
    /// Monotonically increasing publication version. 0 = never published.
    pub version: u64,
    /// When this catalog was computed.
    pub computed_at: DateTime<Utc>,
}

impl CapabilityCatalog {
    /// The empty, never-published catalog: the startup baseline. Any
    /// first successful poll that yields a capability differs from it and
    /// therefore publishes.
    pub fn empty() -> Self {
        Self {
            capabilities: BTreeMap::new(),
            version: 0,
            computed_at: Utc::now(),
        }
    }

    /// Build an unpublished (version 0) catalog from capabilities.
    pub fn new(capabilities: BTreeMap<String, Capability>) -> Self {
        Self {
            capabilities,
            version: 0,
            computed_at: Utc::now(),
        }
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.capabilities.get(name)
    }

    /// All capability names, in canonical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(String::as_str)
    }

    /// Number of capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether the catalog has no capabilities.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Content equality: same names mapping to the same `(href, method)`
    /// pairs. Version, timestamps, and descriptions are excluded, so
    /// transport-level reordering or re-derivation never reads as change.
    pub fn same_capabilities(&self, other: &Self) -> bool {
        if self.capabilities.len() != other.capabilities.len() {
            return false;
        }
        self.capabilities.iter().all(|(name, cap)| {
            other
                .get(name)
                .map(|o| o.href == cap.href && o.method == cap.method)
                .unwrap_or(false)
        })
    }

    /// Compute the membership diff from `previous` to `self`.
    pub fn diff(&self, previous: &Self) -> CatalogDiff {
        let added = self
            .capabilities
            .keys()
            .filter(|name| !previous.capabilities.contains_key(*name))
            .cloned()
            .collect();
        let removed = previous
            .capabilities
            .keys()
            .filter(|name| !self.capabilities.contains_key(*name))
            .cloned()
            .collect();
        let changed = self
            .capabilities
            .iter()
            .filter(|(name, cap)| {
                previous
                    .get(name)
                    .map(|p| p.href != cap.href || p.method != cap.method)
                    .unwrap_or(false)
            })
            .map(|(name, _)| name.clone())
            .collect();
        CatalogDiff {
            added,
            removed,
            changed,
        }
    }

    /// Produce the published successor of this catalog: same content,
    /// next version, fresh timestamp.
    pub fn into_published(mut self, version: u64) -> Self {
        self.version = version;
        self.computed_at = Utc::now();
        self
    }
}

// ---------------------------------------------------------------------------
// CatalogDiff
// ---------------------------------------------------------------------------

/// Membership transition between two catalogs.
///
/// `changed` names capabilities present in both whose `(href, method)`
/// pair differs; those publish but are not membership transitions, so
/// they are reported separately from `added`/`removed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDiff {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub changed: BTreeSet<String>,
}

impl CatalogDiff {
    /// True when nothing was gained, lost, or modified.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CatalogCell
// ---------------------------------------------------------------------------

/// The single shared "current catalog" cell.
///
/// Single-writer (the discovery engine), multi-reader (dispatcher,
/// invocation proxy, consumers). Readers take an atomic snapshot by
/// cloning the inner `Arc`; the write is a plain swap. The lock is held
/// only for the clone/swap, never across I/O or `.await`.
#[derive(Debug)]
pub struct CatalogCell {
    inner: RwLock<Arc<CapabilityCatalog>>,
}

impl CatalogCell {
    /// Create a cell holding the empty baseline catalog.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Arc::new(CapabilityCatalog::empty())),
        }
    }

    /// Snapshot the current catalog. Cheap; never blocks writers for
    /// longer than the Arc clone.
    pub fn load(&self) -> Arc<CapabilityCatalog> {
        self.inner.read().clone()
    }

    /// Replace the current catalog. Engine-only.
    pub fn store(&self, catalog: Arc<CapabilityCatalog>) {
        *self.inner.write() = catalog;
    }
}

impl Default for CatalogCell {
    fn default() -> Self {
        Self::new()
    }
}
