//! # hateoas-bridge
//!
//! Bridges a hypermedia-driven bank-account API, one that advertises
//! its currently valid state transitions as embedded `_links`, into a
//! capability-based tool surface: a discrete, named, invokable set of
//! tools with a versioned catalog and change notifications.
//!
//! The heart of the crate is the discovery engine: a polling state
//! machine that observes the resource's advertised link set, maps it
//! onto a stable capability catalog, detects content-level change
//! between observations, and notifies subscribers exactly when, and
//! only when, the available capability set actually changed.
//!
//! ```rust,no_run
//! use hateoas_bridge::{BridgeConfig, ToolBridge};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let bridge = ToolBridge::start(BridgeConfig::new("http://localhost:9001", "acc-123"))?;
//!
//! let mut changes = bridge.subscribe();
//! while let Some(event) = changes.changed().await {
//!     println!(
//!         "catalog v{}: +{:?} -{:?}",
//!         event.version, event.added, event.removed
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod catalog;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod hypermedia;
pub mod proxy;

pub use bridge::{BridgeConfig, ToolBridge, ToolDescriptor};
pub use catalog::{Capability, CapabilityCatalog, CatalogCell, CatalogDiff};
pub use discovery::{DiscoveryConfig, DiscoveryEngine, DiscoveryHandle, PollState};
pub use dispatch::{CatalogChangedEvent, NotificationDispatcher, Subscription};
pub use error::{InvokeError, ResourceError};
pub use hypermedia::{AccountRepresentation, Link, ResourceClient, ResourceFetch};
pub use proxy::InvocationProxy;

/// Library version.
pub const VERSION: &str = "0.1.0";
