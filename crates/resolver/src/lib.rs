//! Address-resolution engine for host-record provisioning.
//!
//! Given an [`AllocationRequest`](nextip_domain::AllocationRequest) the
//! engine either reuses the address already bound to the request's hostname
//! or allocates the next free address from the request's CIDR block,
//! skipping every address staged by sibling entries in the same batch. The
//! IPAM backend is an injected collaborator, so tests run against mocks and
//! production runs against the WAPI client.

pub mod error;
pub mod hostname;
pub mod network;
pub mod resolve;

pub use error::ResolveError;
pub use hostname::{lookup_bound_address, HostnameLookup};
pub use network::{allocate_next, locate_network};
pub use resolve::resolve_address;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use nextip_domain::backend::{
        BackendError, BackendResult, HostLookup, NetworkAllocator, NetworkRecord, NextIpReply,
    };
    use nextip_domain::model::{Cidr, ExclusionSet, HostRecord, Hostname, NetworkRef};

    /// Scripted IPAM backend used across the resolver tests.
    #[derive(Default)]
    pub struct MockBackend {
        pub host_records: Vec<HostRecord>,
        pub host_error: Option<BackendError>,
        pub networks: Vec<NetworkRecord>,
        pub network_error: Option<BackendError>,
        pub next_ip: NextIpReply,
        pub next_ip_error: Option<BackendError>,
        pub host_calls: AtomicUsize,
        pub network_calls: AtomicUsize,
        pub allocation_calls: AtomicUsize,
        pub seen_exclusions: Mutex<Option<ExclusionSet>>,
    }

    impl MockBackend {
        pub fn host_calls(&self) -> usize {
            self.host_calls.load(Ordering::SeqCst)
        }

        pub fn network_calls(&self) -> usize {
            self.network_calls.load(Ordering::SeqCst)
        }

        pub fn allocation_calls(&self) -> usize {
            self.allocation_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HostLookup for MockBackend {
        async fn find_host_records_by_name(
            &self,
            _name: &Hostname,
        ) -> BackendResult<Vec<HostRecord>> {
            self.host_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.host_error {
                return Err(err.clone());
            }
            Ok(self.host_records.clone())
        }
    }

    #[async_trait]
    impl NetworkAllocator for MockBackend {
        async fn find_networks_by_cidr(&self, _cidr: &Cidr) -> BackendResult<Vec<NetworkRecord>> {
            self.network_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.network_error {
                return Err(err.clone());
            }
            Ok(self.networks.clone())
        }

        async fn next_available_ip(
            &self,
            _network: &NetworkRef,
            _count: u32,
            exclusions: &ExclusionSet,
        ) -> BackendResult<NextIpReply> {
            self.allocation_calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_exclusions.lock().expect("mutex poisoned") = Some(exclusions.clone());
            if let Some(err) = &self.next_ip_error {
                return Err(err.clone());
            }
            Ok(self.next_ip.clone())
        }
    }
}
