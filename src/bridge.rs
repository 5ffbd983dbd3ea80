//! The bridge facade.
//!
//! Wires the resource client, discovery engine, notification dispatcher,
//! and invocation proxy into the single surface a tool-protocol consumer
//! talks to: list the capabilities as tools, subscribe to change
//! notifications, invoke by name, shut down gracefully.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::capability::{Capability, CapabilityCatalog, CatalogCell};
use crate::discovery::config::{DiscoveryConfig, DEFAULT_POLL_INTERVAL};
use crate::discovery::engine::{DiscoveryEngine, DiscoveryHandle, PollState};
use crate::dispatch::dispatcher::{NotificationDispatcher, Subscription};
use crate::error::InvokeError;
use crate::hypermedia::client::ResourceClient;
use crate::proxy::invocation::InvocationProxy;

// ---------------------------------------------------------------------------
// Input schemas
// ---------------------------------------------------------------------------

/// Schema for mutating capabilities: a single required numeric `amount`.
static AMOUNT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::json!({
        "type": "object",
        "properties": {
            "amount": {
                "type": "number",
                "description": "Amount for the operation"
            }
        },
        "required": ["amount"]
    })
});

/// Schema for read-only capabilities: no arguments.
static EMPTY_SCHEMA: Lazy<Value> =
    Lazy::new(|| serde_json::json!({"type": "object", "properties": {}, "required": []}));

// ---------------------------------------------------------------------------
// ToolDescriptor
// ---------------------------------------------------------------------------

/// One row of the consumer-facing tool listing.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    /// Tool name; equals the capability (relation) name.
    pub name: String,
    /// Display title, e.g. `"Withdraw Tool"`.
    pub title: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's arguments.
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Derive the descriptor for one capability. Mutating methods
    /// (POST/PUT/PATCH) accept an `amount`; everything else takes no
    /// arguments.
    pub fn for_capability(capability: &Capability) -> Self {
        let takes_amount = matches!(capability.method.as_str(), "POST" | "PUT" | "PATCH");
        let input_schema = if takes_amount {
            AMOUNT_SCHEMA.clone()
        } else {
            EMPTY_SCHEMA.clone()
        };

        let mut title = String::with_capacity(capability.name.len() + 5);
        let mut chars = capability.name.chars();
        if let Some(first) = chars.next() {
            title.extend(first.to_uppercase());
            title.push_str(chars.as_str());
        }
        title.push_str(" Tool");

        Self {
            name: capability.name.clone(),
            title,
            description: capability.description.clone(),
            input_schema,
        }
    }
}

// ---------------------------------------------------------------------------
// BridgeConfig
// ---------------------------------------------------------------------------

/// Configuration for [`ToolBridge::start`].
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Base URL of the account resource server.
    pub base_url: String,
    /// Account to watch and invoke against.
    pub account_id: String,
    /// Discovery poll interval.
    pub poll_interval: Duration,
}

impl BridgeConfig {
    pub fn new(base_url: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            account_id: account_id.into(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL),
        }
    }

    /// Builder: set the discovery poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

// ---------------------------------------------------------------------------
// ToolBridge
// ---------------------------------------------------------------------------

/// The assembled bridge.
///
/// Must be started inside a Tokio runtime; the discovery loop runs as a
/// background task until [`shutdown`](ToolBridge::shutdown).
pub struct ToolBridge {
    dispatcher: Arc<NotificationDispatcher>,
    proxy: InvocationProxy,
    engine: DiscoveryHandle,
}

impl ToolBridge {
    /// Build the component graph and start the discovery loop.
    ///
    /// The first poll fires immediately; an unreachable upstream is not
    /// an error here; the catalog simply stays empty until a poll
    /// succeeds.
    pub fn start(config: BridgeConfig) -> anyhow::Result<Self> {
        let client = Arc::new(ResourceClient::new(&config.base_url)?);
        let cell = Arc::new(CatalogCell::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(cell.clone()));

        let discovery = DiscoveryConfig::new(&config.account_id)
            .with_poll_interval(config.poll_interval);
        let engine = DiscoveryEngine::spawn(
            discovery,
            client.clone(),
            dispatcher.clone(),
            cell.clone(),
        )?;

        let proxy = InvocationProxy::new(client, cell);

        Ok(Self {
            dispatcher,
            proxy,
            engine,
        })
    }

    /// The current catalog as an ordered tool listing.
    pub fn list_capabilities(&self) -> Vec<ToolDescriptor> {
        self.dispatcher
            .current_catalog()
            .capabilities
            .values()
            .map(ToolDescriptor::for_capability)
            .collect()
    }

    /// Snapshot of the current catalog.
    pub fn current_catalog(&self) -> Arc<CapabilityCatalog> {
        self.dispatcher.current_catalog()
    }

    /// Register for change notifications.
    pub fn subscribe(&self) -> Subscription {
        self.dispatcher.subscribe()
    }

    /// Cancel a subscription.
    pub fn unsubscribe(&self, id: Uuid) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// Invoke a capability by name. See
    /// [`InvocationProxy::invoke`](crate::proxy::InvocationProxy::invoke).
    pub async fn invoke(
        &self,
        capability_name: &str,
        payload: Option<Value>,
    ) -> Result<Value, InvokeError> {
        self.proxy.invoke(capability_name, payload).await
    }

    /// Nudge the discovery loop to poll ahead of schedule.
    pub fn refresh_now(&self) {
        self.engine.refresh_now();
    }

    /// Current state of the discovery loop.
    pub fn poll_state(&self) -> PollState {
        self.engine.state()
    }

    /// Stop the discovery loop gracefully. The last published catalog
    /// remains queryable through any outstanding dispatcher references.
    pub async fn shutdown(self) {
        self.engine.shutdown().await;
    }
}
