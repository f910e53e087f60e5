//! Provisioning binary: resolves addresses for one host record described in
//! a JSON request file and creates it against the configured IPAM backend.

use std::io;

use thiserror::Error;
use tracing::info;

use nextip_domain::backend::BackendError;
use nextip_domain::config::{ConfigError, IpamConfig};
use nextip_domain::services::telemetry::{init_telemetry, TelemetryConfig, TelemetryError};
use nextip_provision::{create_host, ProvisionError, ProvisionRequest};
use nextip_wapi::WapiClient;

#[tokio::main]
async fn main() -> io::Result<()> {
    if let Err(err) = bootstrap().await {
        eprintln!("[provision] failed: {err}");
        return Err(io::Error::other(err.to_string()));
    }

    Ok(())
}

async fn bootstrap() -> Result<(), BootstrapError> {
    let config = IpamConfig::load_from_env()?;
    let telemetry_config = TelemetryConfig::from_env("PROVISION");
    init_telemetry(&telemetry_config)?;

    let path = std::env::args()
        .nth(1)
        .ok_or(BootstrapError::MissingRequestFile)?;
    let raw = std::fs::read_to_string(&path)?;
    let request: ProvisionRequest = serde_json::from_str(&raw)?;

    let client = WapiClient::new(&config)?;
    let record = create_host(&client, &request).await?;
    info!(
        name = record.name.as_str(),
        object_ref = record.object_ref.as_deref().unwrap_or_default(),
        "host record provisioned"
    );

    Ok(())
}

#[derive(Debug, Error)]
enum BootstrapError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("usage: nextip_provision <request.json>")]
    MissingRequestFile,
    #[error("invalid request file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("provisioning failed: {0}")]
    Provision(#[from] ProvisionError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
