//! Capability invocation against the current catalog.

use std::sync::Arc;

use serde_json::Value;

use crate::catalog::capability::CatalogCell;
use crate::error::InvokeError;
use crate::hypermedia::client::ResourceFetch;

/// Invokes capabilities by name.
///
/// Each call snapshots the shared catalog cell exactly once, so the
/// lookup and the forwarded request resolve against a single consistent
/// catalog even while a new poll is concurrently in flight. A name the
/// snapshot does not contain is rejected with
/// [`InvokeError::UnknownCapability`], including names that the
/// upstream resource would still happily serve.
pub struct InvocationProxy {
    client: Arc<dyn ResourceFetch>,
    cell: Arc<CatalogCell>,
}

impl InvocationProxy {
    /// Create a proxy reading `cell` and forwarding through `client`.
    pub fn new(client: Arc<dyn ResourceFetch>, cell: Arc<CatalogCell>) -> Self {
        Self { client, cell }
    }

    /// Invoke the named capability with an optional JSON payload.
    ///
    /// Returns the upstream response body verbatim on success.
    ///
    /// # Errors
    ///
    /// * [`InvokeError::UnknownCapability`] - name absent from the
    ///   current catalog (never existed, or was removed by a concurrent
    ///   diff).
    /// * [`InvokeError::Rejected`] - the upstream rejected the call
    ///   (validation failures, forbidden transitions); the upstream
    ///   message is passed through.
    /// * [`InvokeError::Resource`] - transport or decode failure.
    pub async fn invoke(
        &self,
        capability_name: &str,
        payload: Option<Value>,
    ) -> Result<Value, InvokeError> {
        let catalog = self.cell.load();

        let capability = catalog.get(capability_name).ok_or_else(|| {
            log::debug!(
                "Invocation refused: capability='{}' not in catalog version {}",
                capability_name,
                catalog.version
            );
            InvokeError::UnknownCapability {
                name: capability_name.to_string(),
            }
        })?;

        log::info!(
            "Invocation started: capability='{}', method='{}', catalog_version={}",
            capability.name,
            capability.method,
            catalog.version
        );

        let result = self
            .client
            .execute(&capability.method, &capability.href, payload)
            .await;

        match &result {
            Ok(_) => log::info!("Invocation completed: capability='{}'", capability.name),
            Err(err) => log::warn!(
                "Invocation failed: capability='{}', error='{}'",
                capability.name,
                err
            ),
        }

        result
    }
}
