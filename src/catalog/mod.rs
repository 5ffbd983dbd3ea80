//! Capability catalog: the derived, versioned view of the resource.
//!
//! The catalog is what consumers see instead of raw hypermedia links: a
//! set of named, invokable capabilities with a monotonically increasing
//! version. The discovery engine is its only writer; everyone else reads
//! immutable snapshots through the [`CatalogCell`].

pub mod capability;
pub mod mapper;

pub use capability::{CapabilityCatalog, Capability, CatalogCell, CatalogDiff};
pub use mapper::map_representation;
