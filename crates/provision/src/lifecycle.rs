//! Create/read/update/delete for host records, with address resolution
//! folded into the build step.

use metrics::counter;
use thiserror::Error;
use tracing::info;

use nextip_domain::backend::{
    BackendError, HostLookup, HostRecordStore, NetworkAllocator,
};
use nextip_domain::model::{
    AllocationRequest, Cidr, CidrFormatError, HostRecord, Hostname, HostnameFormatError,
    Ipv4Binding, Ipv6Binding,
};
use nextip_resolver::{resolve_address, ResolveError};

use crate::request::{Ipv4Spec, ProvisionRequest};

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("invalid hostname: {0}")]
    InvalidHostname(#[from] HostnameFormatError),
    #[error("invalid cidr: {0}")]
    InvalidCidr(#[from] CidrFormatError),
    #[error("address resolution failed: {0}")]
    Resolve(#[from] ResolveError),
    #[error("backend failure: {0}")]
    Backend(#[from] BackendError),
    #[error("no host record behind `{object_ref}`")]
    MissingRecord { object_ref: String },
}

/// Creates a host record. IPv4 bindings without a fixed address are
/// resolved in request order; each settled address joins the exclusion set
/// of the bindings after it so one batch never hands out the same address
/// twice.
pub async fn create_host<B>(
    backend: &B,
    request: &ProvisionRequest,
) -> Result<HostRecord, ProvisionError>
where
    B: HostLookup + NetworkAllocator + HostRecordStore,
{
    let mut record = build_record(backend, request).await?;

    let object_ref = backend.create_host_record(&record).await?;
    counter!("provision_host_records_total", 1, "operation" => "create");
    info!(name = record.name.as_str(), %object_ref, "host record created");
    record.object_ref = Some(object_ref);
    Ok(record)
}

/// Fetches the record behind a backend object reference.
pub async fn fetch_host<B>(backend: &B, object_ref: &str) -> Result<Option<HostRecord>, ProvisionError>
where
    B: HostRecordStore,
{
    Ok(backend.fetch_host_record(object_ref).await?)
}

/// Rebuilds the record from the request and replaces the stored one.
/// Address resolution runs again under the same rules, so an unchanged
/// request keeps its addresses via hostname reuse.
pub async fn update_host<B>(
    backend: &B,
    object_ref: &str,
    request: &ProvisionRequest,
) -> Result<HostRecord, ProvisionError>
where
    B: HostLookup + NetworkAllocator + HostRecordStore,
{
    if backend.fetch_host_record(object_ref).await?.is_none() {
        return Err(ProvisionError::MissingRecord {
            object_ref: object_ref.to_string(),
        });
    }

    let mut record = build_record(backend, request).await?;
    let renewed_ref = backend.update_host_record(object_ref, &record).await?;
    counter!("provision_host_records_total", 1, "operation" => "update");
    info!(name = record.name.as_str(), object_ref = %renewed_ref, "host record updated");
    record.object_ref = Some(renewed_ref);
    Ok(record)
}

/// Deletes the record behind a backend object reference.
pub async fn delete_host<B>(backend: &B, object_ref: &str) -> Result<(), ProvisionError>
where
    B: HostRecordStore,
{
    if backend.fetch_host_record(object_ref).await?.is_none() {
        return Err(ProvisionError::MissingRecord {
            object_ref: object_ref.to_string(),
        });
    }

    backend.delete_host_record(object_ref).await?;
    counter!("provision_host_records_total", 1, "operation" => "delete");
    info!(object_ref, "host record deleted");
    Ok(())
}

async fn build_record<B>(
    backend: &B,
    request: &ProvisionRequest,
) -> Result<HostRecord, ProvisionError>
where
    B: HostLookup + NetworkAllocator,
{
    let name = Hostname::parse(&request.name)?;
    let mut record = HostRecord::new(name.clone());
    record.configure_for_dns = request.configure_for_dns;
    record.comment = request.comment.clone();
    record.ttl = request.ttl;
    record.view = request.view.clone();

    let mut settled: Vec<String> = Vec::new();
    for spec in &request.ipv4 {
        let binding = settle_ipv4(backend, &name, spec, &settled).await?;
        if let Some(address) = binding.bound_address() {
            settled.push(address.to_string());
        }
        record.ipv4_bindings.push(binding);
    }

    record.ipv6_bindings = request
        .ipv6
        .iter()
        .map(|spec| Ipv6Binding {
            address: spec.address.clone(),
            mac: spec.mac.clone(),
            configure_for_dhcp: spec.configure_for_dhcp,
            host: spec.host.clone(),
        })
        .collect();

    Ok(record)
}

/// Settles one IPv4 binding. A fixed address wins outright; otherwise the
/// resolver runs with the addresses already settled in this batch as
/// exclusions. Only the first resolved binding may reuse the hostname's
/// bound address; later bindings go straight to CIDR allocation, else they
/// would all reuse the same address.
async fn settle_ipv4<B>(
    backend: &B,
    name: &Hostname,
    spec: &Ipv4Spec,
    settled: &[String],
) -> Result<Ipv4Binding, ProvisionError>
where
    B: HostLookup + NetworkAllocator,
{
    let cidr = spec.cidr.as_deref().map(Cidr::parse).transpose()?;

    let address = match &spec.address {
        Some(address) if !address.is_empty() => address.clone(),
        _ => {
            let allocation = AllocationRequest {
                hostname: settled.is_empty().then(|| name.clone()),
                cidr: cidr.clone(),
                sibling_addresses: settled.to_vec(),
            };
            resolve_address(backend, &allocation).await?.into_inner()
        }
    };

    Ok(Ipv4Binding {
        address: Some(address),
        mac: spec.mac.clone(),
        configure_for_dhcp: spec.configure_for_dhcp,
        host: spec.host.clone(),
        cidr,
    })
}
