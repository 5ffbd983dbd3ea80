//! Hypermedia resource access.
//!
//! This module owns the read-only dependency on the upstream account
//! resource: the wire-contract types it serves and the HTTP client that
//! fetches and invokes against it. Everything above this layer works with
//! decoded [`AccountRepresentation`] snapshots and never sees raw HTTP.

pub mod client;
pub mod types;

pub use client::{ResourceClient, ResourceFetch};
pub use types::{AccountRepresentation, Link};
