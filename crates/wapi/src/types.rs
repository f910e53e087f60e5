//! Serde wire types for the WAPI surface we consume, plus conversions to
//! the domain model.

use serde::{Deserialize, Serialize};

use nextip_domain::backend::{BackendError, NetworkRecord};
use nextip_domain::model::{
    Cidr, HostRecord, Hostname, Ipv4Binding, Ipv6Binding, NetworkRef,
};

/// Return fields requested on host record lookups so the backend echoes the
/// full schema back.
pub const HOST_RETURN_FIELDS: &str = "name,ipv4addrs,ipv6addrs,configure_for_dns,comment,ttl,view";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WapiHostRecord {
    #[serde(rename = "_ref", default, skip_serializing_if = "Option::is_none")]
    pub object_ref: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv4addrs: Vec<WapiIpv4Addr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv6addrs: Vec<WapiIpv6Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configure_for_dns: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WapiIpv4Addr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configure_for_dhcp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WapiIpv6Addr {
    pub ipv6addr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configure_for_dhcp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WapiNetwork {
    #[serde(rename = "_ref")]
    pub object_ref: String,
    #[serde(default)]
    pub network: Option<String>,
}

/// Body for `?_function=next_available_ip` calls.
#[derive(Debug, Clone, Serialize)]
pub struct NextAvailableIpParams {
    pub num: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NextAvailableIpReply {
    #[serde(default)]
    pub ips: Vec<String>,
}

/// WAPI error envelope returned on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WapiErrorBody {
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl WapiErrorBody {
    /// Best human-readable message available in the envelope.
    pub fn message(&self) -> Option<&str> {
        self.text.as_deref().or(self.error.as_deref())
    }
}

pub fn convert_host_record(raw: WapiHostRecord) -> Result<HostRecord, BackendError> {
    let name = raw
        .name
        .as_deref()
        .ok_or_else(|| BackendError::transport("host record payload is missing a name"))?;
    let name = Hostname::parse(name)
        .map_err(|err| BackendError::transport(format!("unusable host record name: {err}")))?;

    let ipv4_bindings = raw
        .ipv4addrs
        .into_iter()
        .map(|addr| Ipv4Binding {
            address: addr.ipv4addr,
            mac: addr.mac,
            configure_for_dhcp: addr.configure_for_dhcp,
            host: addr.host,
            cidr: None,
        })
        .collect();

    let ipv6_bindings = raw
        .ipv6addrs
        .into_iter()
        .map(|addr| Ipv6Binding {
            address: addr.ipv6addr,
            mac: addr.mac,
            configure_for_dhcp: addr.configure_for_dhcp,
            host: addr.host,
        })
        .collect();

    Ok(HostRecord {
        object_ref: raw.object_ref,
        name,
        ipv4_bindings,
        ipv6_bindings,
        configure_for_dns: raw.configure_for_dns.unwrap_or(false),
        comment: raw.comment,
        ttl: raw.ttl,
        view: raw.view,
    })
}

/// Builds the create/update body for a host record. The object ref never
/// travels in the body; it addresses the URL instead.
pub fn host_record_body(record: &HostRecord) -> WapiHostRecord {
    WapiHostRecord {
        object_ref: None,
        name: Some(record.name.as_str().to_string()),
        ipv4addrs: record
            .ipv4_bindings
            .iter()
            .map(|binding| WapiIpv4Addr {
                ipv4addr: binding.address.clone(),
                mac: binding.mac.clone(),
                configure_for_dhcp: binding.configure_for_dhcp,
                host: binding.host.clone(),
            })
            .collect(),
        ipv6addrs: record
            .ipv6_bindings
            .iter()
            .map(|binding| WapiIpv6Addr {
                ipv6addr: binding.address.clone(),
                mac: binding.mac.clone(),
                configure_for_dhcp: binding.configure_for_dhcp,
                host: binding.host.clone(),
            })
            .collect(),
        configure_for_dns: Some(record.configure_for_dns),
        comment: record.comment.clone(),
        ttl: record.ttl,
        view: record.view.clone(),
    }
}

pub fn convert_network(raw: WapiNetwork) -> NetworkRecord {
    NetworkRecord {
        object_ref: NetworkRef::new(raw.object_ref),
        cidr: raw.network.as_deref().and_then(|cidr| Cidr::parse(cidr).ok()),
    }
}
