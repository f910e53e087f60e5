//! Domain-level building blocks shared across the resolver, WAPI client and
//! provisioning crates: typed identifiers with validation, the IPAM
//! collaborator traits, environment-driven configuration and telemetry
//! bootstrap.

pub mod backend;
pub mod config;
pub mod model;
pub mod services;

pub use backend::{
    BackendError, BackendResult, HostLookup, HostRecordStore, NetworkAllocator, NetworkRecord,
    NextIpReply,
};
pub use model::{
    AllocationRequest, Cidr, CidrFormatError, ExclusionSet, HostRecord, Hostname,
    HostnameFormatError, Ipv4Binding, Ipv6Binding, NetworkRef, ResolvedAddress,
};
