//! Wire-contract types served by the account resource.
//!
//! The upstream API is hypermedia-driven: every representation embeds an
//! `_links` map describing the state transitions that are valid *right
//! now*. Membership of that map is state-dependent (the `withdraw` entry
//! exists only while the balance is positive), which is the sole signal
//! the discovery engine watches.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One embedded action descriptor from the representation's `_links` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target URL. May be absolute or server-relative.
    pub href: String,
    /// HTTP method for the transition. Absent means GET.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Relation name. Usually mirrors the map key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
}

/// A decoded snapshot of the account resource at one instant.
///
/// Received fresh on every poll and never mutated in place; each poll
/// produces a new immutable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRepresentation {
    pub account_id: String,
    pub account_holder: String,
    pub balance: f64,
    pub currency: String,
    /// The action map. `BTreeMap` gives canonical iteration order, so
    /// transport-level key reordering never changes what downstream code
    /// observes.
    #[serde(rename = "_links", default)]
    pub links: BTreeMap<String, Link>,
}

impl AccountRepresentation {
    /// Relation names currently advertised by the resource.
    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }
}

/// Error body returned by the upstream resource on rejected operations,
/// e.g. `{"error": "Amount must be positive"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamError {
    pub error: String,
}
