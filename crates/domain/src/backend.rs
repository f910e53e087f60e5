//! Collaborator traits the resolution engine calls on the IPAM backend.
//!
//! Implementations are injected by the caller (the WAPI client in
//! production, mocks in tests) so the engine never reaches for a global
//! client.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Cidr, ExclusionSet, HostRecord, Hostname, NetworkRef};

/// Common result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Failures surfaced by the IPAM backend collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend rejected the configured credentials.
    #[error("authorization rejected by the ipam backend")]
    Unauthorized,
    /// The backend answered with an application-level error.
    #[error("ipam backend error {code}: {message}")]
    Api { code: u16, message: String },
    /// The request never produced a usable response.
    #[error("ipam transport error: {0}")]
    Transport(String),
}

impl BackendError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

/// A network object matching a CIDR lookup. Only the reference token is
/// meaningful to the resolver; the echoed CIDR is informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRecord {
    pub object_ref: NetworkRef,
    pub cidr: Option<Cidr>,
}

/// Reply from a next-available-IP allocation call. The backend reports the
/// granted addresses in `ips`; entries may be empty strings when the
/// response payload was degenerate, which callers must treat as a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextIpReply {
    pub ips: Vec<String>,
}

impl NextIpReply {
    /// First non-empty address in the reply, if any.
    pub fn first_address(&self) -> Option<&str> {
        self.ips
            .iter()
            .map(String::as_str)
            .find(|address| !address.is_empty())
    }
}

/// Read-only host record lookup by exact name.
#[async_trait]
pub trait HostLookup: Send + Sync {
    async fn find_host_records_by_name(&self, name: &Hostname)
        -> BackendResult<Vec<HostRecord>>;
}

/// Network lookup and next-available-IP allocation.
#[async_trait]
pub trait NetworkAllocator: Send + Sync {
    async fn find_networks_by_cidr(&self, cidr: &Cidr) -> BackendResult<Vec<NetworkRecord>>;

    /// Requests `count` next-available addresses from the referenced
    /// network, skipping every address in `exclusions`.
    async fn next_available_ip(
        &self,
        network: &NetworkRef,
        count: u32,
        exclusions: &ExclusionSet,
    ) -> BackendResult<NextIpReply>;
}

/// Host record lifecycle operations keyed by backend object reference.
#[async_trait]
pub trait HostRecordStore: Send + Sync {
    /// Persists a new record and returns its backend object reference.
    async fn create_host_record(&self, record: &HostRecord) -> BackendResult<String>;
    async fn fetch_host_record(&self, object_ref: &str) -> BackendResult<Option<HostRecord>>;
    /// Replaces the record behind `object_ref`, returning the (possibly
    /// renewed) object reference.
    async fn update_host_record(
        &self,
        object_ref: &str,
        record: &HostRecord,
    ) -> BackendResult<String>;
    async fn delete_host_record(&self, object_ref: &str) -> BackendResult<()>;
}
