//! Error types for the hypermedia bridge.
//!
//! Two families, matching the two paths through the crate:
//!
//! - [`ResourceError`] - failures while reading the upstream resource.
//!   These are absorbed by the discovery engine on the polling path and
//!   never reach consumers as errors.
//! - [`InvokeError`] - failures on the invocation path. These are always
//!   surfaced synchronously to the caller.

use thiserror::Error;

/// Errors from reading the upstream account resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Connection, timeout, or other transport failure. Transient; the
    /// next scheduled poll retries.
    #[error("Network error talking to resource: {message}")]
    Network { message: String },

    /// The resource does not exist upstream (HTTP 404).
    #[error("Resource not found: {resource_id}")]
    NotFound { resource_id: String },

    /// The upstream body could not be decoded as a representation.
    #[error("Malformed resource representation: {message}")]
    Decode { message: String },

    /// The caller supplied an unusable resource identifier or base URL.
    #[error("Invalid resource reference: {message}")]
    InvalidResource { message: String },
}

/// Errors surfaced to callers of the invocation proxy.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The named capability is absent from the current catalog. Covers
    /// both "never existed" and "existed but was removed by a concurrent
    /// poll".
    #[error("Unknown capability: {name}")]
    UnknownCapability { name: String },

    /// The upstream resource rejected the invocation (4xx). The upstream
    /// error body is passed through verbatim in `message`.
    #[error("Invocation rejected by resource (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Underlying resource read/transport failure.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}
