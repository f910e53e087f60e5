//! Hostname-reuse strategy: find the address already bound to a name.

use tracing::debug;

use nextip_domain::backend::HostLookup;
use nextip_domain::model::{Hostname, ResolvedAddress};

use crate::error::ResolveError;

/// Outcome of a hostname lookup. The two miss variants are distinct so the
/// orchestrator can log why it fell through to CIDR allocation, but both
/// mean "no reusable address".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostnameLookup {
    /// The name resolves to a record with a bound IPv4 address.
    Found(ResolvedAddress),
    /// A record exists but carries no usable IPv4 address.
    NoUsableAddress,
    /// No record matches the name.
    NoRecord,
}

impl HostnameLookup {
    /// Collapses the tagged outcome into the strict contract used when the
    /// hostname strategy runs on its own, without a CIDR fallback.
    pub fn require(self, hostname: &Hostname) -> Result<ResolvedAddress, ResolveError> {
        match self {
            Self::Found(address) => Ok(address),
            Self::NoUsableAddress | Self::NoRecord => Err(ResolveError::NotFound {
                hostname: hostname.to_string(),
            }),
        }
    }
}

/// Queries the backend for host records matching `hostname` exactly and
/// extracts a reusable IPv4 address.
///
/// The first matching record is authoritative. Within it, the first binding
/// carrying a non-empty IPv4 address wins; records binding several
/// addresses keep a stable, documented selection rule instead of whatever
/// iteration order the backend happens to return.
pub async fn lookup_bound_address(
    backend: &impl HostLookup,
    hostname: &Hostname,
) -> Result<HostnameLookup, ResolveError> {
    let records = backend.find_host_records_by_name(hostname).await?;

    let Some(record) = records.first() else {
        debug!(%hostname, "no host record matches");
        return Ok(HostnameLookup::NoRecord);
    };

    match record
        .ipv4_bindings
        .iter()
        .find_map(|binding| binding.bound_address())
    {
        Some(address) => {
            debug!(%hostname, address, "reusing bound address");
            Ok(HostnameLookup::Found(ResolvedAddress::new(address)))
        }
        None => {
            debug!(%hostname, "host record has no bound ipv4 address");
            Ok(HostnameLookup::NoUsableAddress)
        }
    }
}
