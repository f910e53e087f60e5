//! Declarative description of a host record to provision.

use serde::Deserialize;

/// One host record to create or update. IPv4 bindings may name a fixed
/// address or a CIDR block to allocate from; IPv6 bindings always carry
/// their address.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionRequest {
    pub name: String,
    #[serde(default)]
    pub ipv4: Vec<Ipv4Spec>,
    #[serde(default)]
    pub ipv6: Vec<Ipv6Spec>,
    #[serde(default)]
    pub configure_for_dns: bool,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub view: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ipv4Spec {
    /// Fixed address; when absent the resolver picks one.
    #[serde(default)]
    pub address: Option<String>,
    /// CIDR block to allocate from when no address is fixed.
    #[serde(default)]
    pub cidr: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub configure_for_dhcp: Option<bool>,
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ipv6Spec {
    pub address: String,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub configure_for_dhcp: Option<bool>,
    #[serde(default)]
    pub host: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_request_parses() {
        let request: ProvisionRequest = serde_json::from_str(
            r#"{
                "name": "web1.example.com",
                "ipv4": [{"cidr": "192.168.1.0/24"}]
            }"#,
        )
        .expect("request parses");

        assert_eq!(request.name, "web1.example.com");
        assert_eq!(request.ipv4.len(), 1);
        assert_eq!(request.ipv4[0].cidr.as_deref(), Some("192.168.1.0/24"));
        assert!(request.ipv6.is_empty());
        assert!(!request.configure_for_dns);
    }

    #[test]
    fn full_request_parses() {
        let request: ProvisionRequest = serde_json::from_str(
            r#"{
                "name": "db1.example.com",
                "ipv4": [
                    {"address": "10.0.0.5", "mac": "aa:bb:cc:dd:ee:ff", "configure_for_dhcp": true}
                ],
                "ipv6": [{"address": "2001:db8::5"}],
                "configure_for_dns": true,
                "comment": "primary database",
                "ttl": 600,
                "view": "internal"
            }"#,
        )
        .expect("request parses");

        assert_eq!(request.ipv4[0].address.as_deref(), Some("10.0.0.5"));
        assert_eq!(request.ipv6[0].address, "2001:db8::5");
        assert_eq!(request.ttl, Some(600));
        assert!(request.configure_for_dns);
    }
}
