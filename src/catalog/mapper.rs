//! Representation → catalog mapping.
//!
//! A pure, total function over the action map: every `_links` entry
//! becomes exactly one capability. Deterministic: identical input
//! content (ignoring field order) always yields an identical catalog.

use std::collections::BTreeMap;

use crate::catalog::capability::{Capability, CapabilityCatalog};
use crate::hypermedia::types::AccountRepresentation;

/// Map a resource representation onto an unpublished (version 0)
/// capability catalog.
///
/// For every action-map entry: name = relation key, target = href,
/// method = descriptor method uppercased (GET when absent). The
/// description follows the `"Execute {rel} ({METHOD})"` form the bridge
/// advertises to tool-protocol clients.
pub fn map_representation(representation: &AccountRepresentation) -> CapabilityCatalog {
    let capabilities: BTreeMap<String, Capability> = representation
        .links
        .iter()
        .map(|(name, link)| {
            let method = link
                .method
                .as_deref()
                .unwrap_or("GET")
                .to_ascii_uppercase();
            let rel = link.rel.as_deref().unwrap_or(name);
            let capability = Capability {
                name: name.clone(),
                href: link.href.clone(),
                method: method.clone(),
                description: format!("Execute {} ({})", rel, method),
            };
            (name.clone(), capability)
        })
        .collect();

    CapabilityCatalog::new(capabilities)
}
