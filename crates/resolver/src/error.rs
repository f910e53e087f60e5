//! Failure taxonomy for address resolution.

use thiserror::Error;

use nextip_domain::backend::BackendError;

/// Failures surfaced by the resolution engine. Only the hostname-lookup
/// miss is recoverable; the orchestrator consumes it internally and every
/// other variant propagates to the caller unretried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Hostname lookup matched no reusable address. Surfaced only when the
    /// hostname strategy is invoked on its own.
    #[error("no host record with a bound address found for `{hostname}`")]
    NotFound { hostname: String },
    /// The backend rejected our credentials during network lookup.
    #[error("authentication rejected by the ipam backend, check the configured username/password")]
    Authentication,
    /// The CIDR does not correspond to any known network.
    #[error("empty network lookup response, is `{cidr}` a valid network?")]
    InvalidNetwork { cidr: String },
    /// The allocation call failed or returned an unusable payload.
    #[error("allocation failed: {0}")]
    Allocation(String),
    /// Neither strategy was applicable.
    #[error("could not get next ip")]
    Resolution,
    /// The backend failed outside the cases above.
    #[error("backend failure: {0}")]
    Backend(#[from] BackendError),
}
