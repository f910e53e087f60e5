//! HTTP client for the WAPI endpoint, satisfying the domain backend traits.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use tracing::debug;

use nextip_domain::backend::{
    BackendError, BackendResult, HostLookup, HostRecordStore, NetworkAllocator, NetworkRecord,
    NextIpReply,
};
use nextip_domain::config::IpamConfig;
use nextip_domain::model::{Cidr, ExclusionSet, HostRecord, Hostname, NetworkRef};

use crate::types::{
    convert_host_record, convert_network, host_record_body, NextAvailableIpParams,
    NextAvailableIpReply, WapiErrorBody, WapiHostRecord, WapiNetwork, HOST_RETURN_FIELDS,
};

/// Client for one WAPI endpoint. Cheap to clone; connections are pooled by
/// the underlying `reqwest` client.
#[derive(Clone)]
pub struct WapiClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl WapiClient {
    /// Builds a client from the IPAM connection settings. Timeouts are
    /// enforced here at the transport layer; the resolver itself never
    /// retries or cancels.
    pub fn new(config: &IpamConfig) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs()))
            .build()
            .map_err(BackendError::transport)?;

        Ok(Self {
            http,
            base_url: wapi_base(config.base_url(), config.wapi_version()),
            username: config.username().to_string(),
            password: config.password().to_string(),
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.object_url(path))
            .basic_auth(&self.username, Some(&self.password))
    }

    /// Maps non-2xx responses onto the backend error taxonomy. Credential
    /// rejections are recognized both by status code and by the
    /// `Authorization Required` text some WAPI versions put in the body of
    /// an otherwise generic error.
    async fn check(response: Response) -> BackendResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BackendError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let envelope: WapiErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = envelope
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| body.clone());
        if message.contains("Authorization Required") {
            return Err(BackendError::Unauthorized);
        }

        Err(BackendError::Api {
            code: status.as_u16(),
            message,
        })
    }
}

fn wapi_base(base_url: &str, version: &str) -> String {
    format!("{}/wapi/v{}", base_url.trim_end_matches('/'), version)
}

#[async_trait]
impl HostLookup for WapiClient {
    async fn find_host_records_by_name(
        &self,
        name: &Hostname,
    ) -> BackendResult<Vec<HostRecord>> {
        debug!(name = name.as_str(), "looking up host records");
        let response = self
            .request(Method::GET, "record:host")
            .query(&[("name", name.as_str()), ("_return_fields", HOST_RETURN_FIELDS)])
            .send()
            .await
            .map_err(BackendError::transport)?;

        let raws: Vec<WapiHostRecord> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(BackendError::transport)?;

        raws.into_iter().map(convert_host_record).collect()
    }
}

#[async_trait]
impl NetworkAllocator for WapiClient {
    async fn find_networks_by_cidr(&self, cidr: &Cidr) -> BackendResult<Vec<NetworkRecord>> {
        debug!(cidr = cidr.as_str(), "looking up network");
        let response = self
            .request(Method::GET, "network")
            .query(&[("network", cidr.as_str())])
            .send()
            .await
            .map_err(BackendError::transport)?;

        let raws: Vec<WapiNetwork> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(BackendError::transport)?;

        Ok(raws.into_iter().map(convert_network).collect())
    }

    async fn next_available_ip(
        &self,
        network: &NetworkRef,
        count: u32,
        exclusions: &ExclusionSet,
    ) -> BackendResult<NextIpReply> {
        debug!(
            network_ref = network.as_str(),
            count,
            excluded = exclusions.len(),
            "requesting next available ip"
        );
        let params = NextAvailableIpParams {
            num: count,
            exclude: exclusions.iter().map(str::to_string).collect(),
        };
        let response = self
            .request(Method::POST, network.as_str())
            .query(&[("_function", "next_available_ip")])
            .json(&params)
            .send()
            .await
            .map_err(BackendError::transport)?;

        let reply: NextAvailableIpReply = Self::check(response)
            .await?
            .json()
            .await
            .map_err(BackendError::transport)?;

        Ok(NextIpReply { ips: reply.ips })
    }
}

#[async_trait]
impl HostRecordStore for WapiClient {
    async fn create_host_record(&self, record: &HostRecord) -> BackendResult<String> {
        debug!(name = record.name.as_str(), "creating host record");
        let response = self
            .request(Method::POST, "record:host")
            .json(&host_record_body(record))
            .send()
            .await
            .map_err(BackendError::transport)?;

        // WAPI answers object mutations with the bare reference string.
        Self::check(response)
            .await?
            .json::<String>()
            .await
            .map_err(BackendError::transport)
    }

    async fn fetch_host_record(&self, object_ref: &str) -> BackendResult<Option<HostRecord>> {
        let response = self
            .request(Method::GET, object_ref)
            .query(&[("_return_fields", HOST_RETURN_FIELDS)])
            .send()
            .await
            .map_err(BackendError::transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let raw: WapiHostRecord = Self::check(response)
            .await?
            .json()
            .await
            .map_err(BackendError::transport)?;

        convert_host_record(raw).map(Some)
    }

    async fn update_host_record(
        &self,
        object_ref: &str,
        record: &HostRecord,
    ) -> BackendResult<String> {
        debug!(object_ref, "updating host record");
        let response = self
            .request(Method::PUT, object_ref)
            .json(&host_record_body(record))
            .send()
            .await
            .map_err(BackendError::transport)?;

        Self::check(response)
            .await?
            .json::<String>()
            .await
            .map_err(BackendError::transport)
    }

    async fn delete_host_record(&self, object_ref: &str) -> BackendResult<()> {
        debug!(object_ref, "deleting host record");
        let response = self
            .request(Method::DELETE, object_ref)
            .send()
            .await
            .map_err(BackendError::transport)?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trims_trailing_slash() {
        assert_eq!(
            wapi_base("https://ipam.example.com/", "2.10"),
            "https://ipam.example.com/wapi/v2.10"
        );
        assert_eq!(
            wapi_base("https://ipam.example.com", "2.12"),
            "https://ipam.example.com/wapi/v2.12"
        );
    }

    #[tokio::test]
    async fn status_401_maps_to_unauthorized() {
        let response = http::Response::builder()
            .status(401)
            .body("")
            .unwrap();
        let err = WapiClient::check(Response::from(response))
            .await
            .expect_err("fails");
        assert_eq!(err, BackendError::Unauthorized);
    }

    #[tokio::test]
    async fn authorization_required_body_maps_to_unauthorized() {
        let response = http::Response::builder()
            .status(400)
            .body(r#"{"Error": "Authorization Required"}"#)
            .unwrap();
        let err = WapiClient::check(Response::from(response))
            .await
            .expect_err("fails");
        assert_eq!(err, BackendError::Unauthorized);
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_message() {
        let response = http::Response::builder()
            .status(400)
            .body(r#"{"Error": "AdmConDataError", "text": "Address not in network"}"#)
            .unwrap();
        let err = WapiClient::check(Response::from(response))
            .await
            .expect_err("fails");
        assert_eq!(
            err,
            BackendError::Api {
                code: 400,
                message: "Address not in network".to_string()
            }
        );
    }
}
