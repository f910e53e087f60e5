//! Data structures shared across the resolver, WAPI client and provisioning
//! crates.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use thiserror::Error;

/// Longest hostname accepted, matching the DNS wire limit.
pub const MAX_HOSTNAME_LENGTH: usize = 253;

/// Errors emitted when caller-supplied hostnames fail validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostnameFormatError {
    #[error("hostname must not be empty")]
    Empty,
    #[error("hostname exceeds {MAX_HOSTNAME_LENGTH} characters")]
    TooLong,
    #[error("hostname label `{0}` is not a valid DNS label")]
    InvalidLabel(String),
}

/// Validates that the supplied name is a usable DNS hostname.
pub fn validate_hostname(name: &str) -> Result<(), HostnameFormatError> {
    if name.is_empty() {
        return Err(HostnameFormatError::Empty);
    }
    if name.len() > MAX_HOSTNAME_LENGTH {
        return Err(HostnameFormatError::TooLong);
    }

    for label in name.split('.') {
        let valid = !label.is_empty()
            && label.len() <= 63
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-');
        if !valid {
            return Err(HostnameFormatError::InvalidLabel(label.to_string()));
        }
    }

    Ok(())
}

/// A validated DNS hostname identifying a host record in the IPAM backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hostname(String);

impl Hostname {
    pub fn parse(name: &str) -> Result<Self, HostnameFormatError> {
        validate_hostname(name)?;
        let mut owned = name.to_owned();
        owned.make_ascii_lowercase();
        Ok(Self(owned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Hostname {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors emitted when caller-supplied CIDR blocks fail validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CidrFormatError {
    #[error("cidr `{0}` is missing the `/prefix` suffix")]
    MissingPrefix(String),
    #[error("cidr `{0}` does not start with a valid IPv4 address")]
    InvalidAddress(String),
    #[error("cidr `{0}` has a prefix length outside 0..=32")]
    InvalidPrefix(String),
}

/// A validated IPv4 CIDR block in `a.b.c.d/len` notation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cidr(String);

impl Cidr {
    pub fn parse(cidr: &str) -> Result<Self, CidrFormatError> {
        let Some((address, prefix)) = cidr.split_once('/') else {
            return Err(CidrFormatError::MissingPrefix(cidr.to_string()));
        };

        if address.parse::<Ipv4Addr>().is_err() {
            return Err(CidrFormatError::InvalidAddress(cidr.to_string()));
        }

        match prefix.parse::<u8>() {
            Ok(len) if len <= 32 => Ok(Self(cidr.to_string())),
            _ => Err(CidrFormatError::InvalidPrefix(cidr.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference token the IPAM backend assigns to a network object.
/// Request-scoped; never cached across resolution calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkRef(String);

impl NetworkRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Single IPv4 address string produced by exactly one resolution strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress(String);

impl ResolvedAddress {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Addresses the allocator must skip when choosing the next available IP.
/// Built once per resolution call and immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(BTreeSet<String>);

impl ExclusionSet {
    /// Collects the non-empty address values already staged by sibling
    /// entries in the same provisioning batch. Duplicates collapse and
    /// ordering is irrelevant; an empty input yields an empty set.
    pub fn from_siblings<I, S>(siblings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let addresses = siblings
            .into_iter()
            .filter(|address| !address.as_ref().is_empty())
            .map(|address| address.as_ref().to_string())
            .collect();
        Self(addresses)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.0.contains(address)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// One address-resolution request: which strategies are available and which
/// addresses are already spoken for within the same batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationRequest {
    pub hostname: Option<Hostname>,
    pub cidr: Option<Cidr>,
    pub sibling_addresses: Vec<String>,
}

/// IPv4 binding attached to a host record. `address` is `None` while the
/// binding is still waiting for resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ipv4Binding {
    pub address: Option<String>,
    pub mac: Option<String>,
    pub configure_for_dhcp: Option<bool>,
    pub host: Option<String>,
    pub cidr: Option<Cidr>,
}

impl Ipv4Binding {
    /// Returns the bound address when one is present and non-empty.
    pub fn bound_address(&self) -> Option<&str> {
        self.address.as_deref().filter(|address| !address.is_empty())
    }
}

/// IPv6 binding attached to a host record. IPv6 addresses are always
/// caller-supplied, never derived by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ipv6Binding {
    pub address: String,
    pub mac: Option<String>,
    pub configure_for_dhcp: Option<bool>,
    pub host: Option<String>,
}

/// A named IPAM host record binding a hostname to its address set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Backend-assigned object reference; absent until the record is created.
    pub object_ref: Option<String>,
    pub name: Hostname,
    pub ipv4_bindings: Vec<Ipv4Binding>,
    pub ipv6_bindings: Vec<Ipv6Binding>,
    pub configure_for_dns: bool,
    pub comment: Option<String>,
    pub ttl: Option<u32>,
    pub view: Option<String>,
}

impl HostRecord {
    pub fn new(name: Hostname) -> Self {
        Self {
            object_ref: None,
            name,
            ipv4_bindings: Vec::new(),
            ipv6_bindings: Vec::new(),
            configure_for_dns: false,
            comment: None,
            ttl: None,
            view: None,
        }
    }
}
