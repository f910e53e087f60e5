//! CIDR-allocation strategy: locate the network object, then request the
//! next available address from it.

use tracing::debug;

use nextip_domain::backend::{BackendError, NetworkAllocator};
use nextip_domain::model::{Cidr, ExclusionSet, NetworkRef, ResolvedAddress};

use crate::error::ResolveError;

/// Resolves a CIDR block to the backend's network object reference.
///
/// A credentials rejection is distinguished from other failures so callers
/// can surface actionable guidance. An empty lookup result means the CIDR
/// is not a known network. The first match is authoritative; CIDR matches
/// are expected to be unique so there is no tie-break.
pub async fn locate_network(
    backend: &impl NetworkAllocator,
    cidr: &Cidr,
) -> Result<NetworkRef, ResolveError> {
    let networks = match backend.find_networks_by_cidr(cidr).await {
        Ok(networks) => networks,
        Err(BackendError::Unauthorized) => return Err(ResolveError::Authentication),
        Err(err) => return Err(ResolveError::Backend(err)),
    };

    let Some(network) = networks.into_iter().next() else {
        return Err(ResolveError::InvalidNetwork {
            cidr: cidr.to_string(),
        });
    };

    debug!(%cidr, network_ref = network.object_ref.as_str(), "located network");
    Ok(network.object_ref)
}

/// Requests exactly one next-available address from the referenced network,
/// passing the exclusion set so the backend skips those addresses.
///
/// A successful call whose payload carries no usable address value is a
/// failure, never a silent empty result.
pub async fn allocate_next(
    backend: &impl NetworkAllocator,
    network: &NetworkRef,
    exclusions: &ExclusionSet,
) -> Result<ResolvedAddress, ResolveError> {
    let reply = backend
        .next_available_ip(network, 1, exclusions)
        .await
        .map_err(|err| ResolveError::Allocation(err.to_string()))?;

    match reply.first_address() {
        Some(address) => {
            debug!(network_ref = network.as_str(), address, "allocated next available ip");
            Ok(ResolvedAddress::new(address))
        }
        None => Err(ResolveError::Allocation(
            "unable to determine IP address from response".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;
    use nextip_domain::backend::{NetworkRecord, NextIpReply};

    fn network(object_ref: &str, cidr: &str) -> NetworkRecord {
        NetworkRecord {
            object_ref: NetworkRef::new(object_ref),
            cidr: Some(Cidr::parse(cidr).unwrap()),
        }
    }

    #[tokio::test]
    async fn locates_first_matching_network() {
        let backend = MockBackend {
            networks: vec![
                network("network/ZG5z:192.168.1.0/24", "192.168.1.0/24"),
                network("network/stale", "192.168.1.0/24"),
            ],
            ..MockBackend::default()
        };
        let cidr = Cidr::parse("192.168.1.0/24").unwrap();

        let located = locate_network(&backend, &cidr).await.expect("locates");
        assert_eq!(located.as_str(), "network/ZG5z:192.168.1.0/24");
    }

    #[tokio::test]
    async fn unknown_cidr_is_invalid_network() {
        let backend = MockBackend::default();
        let cidr = Cidr::parse("10.0.0.0/24").unwrap();

        let err = locate_network(&backend, &cidr).await.expect_err("fails");
        assert_eq!(
            err,
            ResolveError::InvalidNetwork {
                cidr: "10.0.0.0/24".to_string()
            }
        );
    }

    #[tokio::test]
    async fn credential_rejection_maps_to_authentication() {
        let backend = MockBackend {
            network_error: Some(BackendError::Unauthorized),
            ..MockBackend::default()
        };
        let cidr = Cidr::parse("10.0.0.0/24").unwrap();

        let err = locate_network(&backend, &cidr).await.expect_err("fails");
        assert_eq!(err, ResolveError::Authentication);
    }

    #[tokio::test]
    async fn transport_failures_stay_backend_errors() {
        let backend = MockBackend {
            network_error: Some(BackendError::transport("timed out")),
            ..MockBackend::default()
        };
        let cidr = Cidr::parse("10.0.0.0/24").unwrap();

        let err = locate_network(&backend, &cidr).await.expect_err("fails");
        assert!(matches!(err, ResolveError::Backend(_)));
    }

    #[tokio::test]
    async fn allocates_single_address() {
        let backend = MockBackend {
            next_ip: NextIpReply {
                ips: vec!["192.168.1.5".to_string()],
            },
            ..MockBackend::default()
        };
        let network = NetworkRef::new("network/ZG5z:192.168.1.0/24");
        let exclusions = ExclusionSet::from_siblings(["192.168.1.4"]);

        let address = allocate_next(&backend, &network, &exclusions)
            .await
            .expect("allocates");

        assert_eq!(address.as_str(), "192.168.1.5");
        assert_eq!(backend.allocation_calls(), 1);
        let seen = backend.seen_exclusions.lock().unwrap().clone().unwrap();
        assert!(seen.contains("192.168.1.4"));
    }

    #[tokio::test]
    async fn empty_reply_is_an_allocation_error() {
        let backend = MockBackend::default();
        let network = NetworkRef::new("network/ref");

        let err = allocate_next(&backend, &network, &ExclusionSet::default())
            .await
            .expect_err("fails");

        assert_eq!(
            err,
            ResolveError::Allocation("unable to determine IP address from response".to_string())
        );
    }

    #[tokio::test]
    async fn backend_failure_is_an_allocation_error() {
        let backend = MockBackend {
            next_ip_error: Some(BackendError::Api {
                code: 500,
                message: "no addresses left".to_string(),
            }),
            ..MockBackend::default()
        };
        let network = NetworkRef::new("network/ref");

        let err = allocate_next(&backend, &network, &ExclusionSet::default())
            .await
            .expect_err("fails");

        assert!(matches!(err, ResolveError::Allocation(message) if message.contains("no addresses left")));
    }
}
