//! The discovery engine, the core of the bridge.
//!
//! Owns the polling loop that observes the resource's advertised link
//! set, maps it onto a capability catalog, detects content-level change
//! against the previously published catalog, and hands genuinely new
//! catalogs to the notification dispatcher. The only component with
//! state, timing, and consistency concerns.

pub mod config;
pub mod engine;

pub use config::DiscoveryConfig;
pub use engine::{DiscoveryEngine, DiscoveryHandle, PollState};
