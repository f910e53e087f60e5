//! Orchestrates the two resolution strategies into a single resolved
//! address.

use metrics::counter;
use tracing::debug;

use nextip_domain::backend::{HostLookup, NetworkAllocator};
use nextip_domain::model::{AllocationRequest, ExclusionSet, ResolvedAddress};

use crate::error::ResolveError;
use crate::hostname::{lookup_bound_address, HostnameLookup};
use crate::network::{allocate_next, locate_network};

/// Resolves a single IPv4 address for the request.
///
/// Hostname reuse runs first so re-provisioning the same named host stays
/// idempotent: the address already bound to the name is returned instead of
/// allocating a fresh one. CIDR allocation is the fallback for genuinely
/// new hosts. Two linear paths, no loops, no retries; each strategy's
/// failure semantics live in [`crate::hostname`] and [`crate::network`].
pub async fn resolve_address<B>(
    backend: &B,
    request: &AllocationRequest,
) -> Result<ResolvedAddress, ResolveError>
where
    B: HostLookup + NetworkAllocator,
{
    let exclusions = ExclusionSet::from_siblings(&request.sibling_addresses);

    if let Some(hostname) = &request.hostname {
        match lookup_bound_address(backend, hostname).await? {
            HostnameLookup::Found(address) => {
                counter!("resolver_resolutions_total", 1, "strategy" => "hostname", "result" => "reused");
                return Ok(address);
            }
            outcome @ (HostnameLookup::NoRecord | HostnameLookup::NoUsableAddress) => {
                debug!(%hostname, ?outcome, "hostname strategy exhausted, trying cidr");
            }
        }
    }

    if let Some(cidr) = &request.cidr {
        let network = locate_network(backend, cidr).await.inspect_err(|_| {
            counter!("resolver_resolutions_total", 1, "strategy" => "cidr", "result" => "locate_failed");
        })?;
        let address = allocate_next(backend, &network, &exclusions)
            .await
            .inspect_err(|_| {
                counter!("resolver_resolutions_total", 1, "strategy" => "cidr", "result" => "allocate_failed");
            })?;
        counter!("resolver_resolutions_total", 1, "strategy" => "cidr", "result" => "allocated");
        return Ok(address);
    }

    counter!("resolver_resolutions_total", 1, "strategy" => "none", "result" => "exhausted");
    Err(ResolveError::Resolution)
}
