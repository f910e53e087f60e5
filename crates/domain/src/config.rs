//! Environment-driven configuration shared by binaries talking to the IPAM
//! backend.

use std::env;

use thiserror::Error;

/// Default WAPI version requested when `IPAM_WAPI_VERSION` is unset.
pub const DEFAULT_WAPI_VERSION: &str = "2.10";

/// Default HTTP timeout in seconds when `IPAM_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the IPAM WAPI endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpamConfig {
    base_url: String,
    username: String,
    password: String,
    wapi_version: String,
    timeout_secs: u64,
}

impl IpamConfig {
    /// Loads configuration by hydrating `.env` (if present) and reading the
    /// required process variables. Missing or malformed entries surface as
    /// `ConfigError` so binaries can respond gracefully.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        let timeout_secs = match get_optional_var("IPAM_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|source| ConfigError::InvalidNumber {
                key: "IPAM_TIMEOUT_SECS",
                source,
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url: get_required_var("IPAM_BASE_URL")?,
            username: get_required_var("IPAM_USERNAME")?,
            password: get_required_var("IPAM_PASSWORD")?,
            wapi_version: get_optional_var("IPAM_WAPI_VERSION")
                .unwrap_or_else(|| DEFAULT_WAPI_VERSION.to_string()),
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn wapi_version(&self) -> &str {
        &self.wapi_version
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

fn get_required_var(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(ConfigError::MissingVar { key })
            } else {
                Ok(trimmed.to_string())
            }
        }
        Err(_) => Err(ConfigError::MissingVar { key }),
    }
}

fn get_optional_var(key: &'static str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os("NEXTIP_SKIP_DOTENV").is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ConfigError::Dotenv { source: err }),
    }

    Ok(())
}

/// Errors emitted when `.env` hydration or environment parsing fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("invalid integer in `{key}`: {source}")]
    InvalidNumber {
        key: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_GUARD: Mutex<()> = Mutex::new(());

    fn set_env() {
        std::env::set_var("NEXTIP_SKIP_DOTENV", "1");
        std::env::set_var("IPAM_BASE_URL", "https://ipam.example.com");
        std::env::set_var("IPAM_USERNAME", "svc-provision");
        std::env::set_var("IPAM_PASSWORD", "hunter2");
        std::env::remove_var("IPAM_WAPI_VERSION");
        std::env::remove_var("IPAM_TIMEOUT_SECS");
    }

    #[test]
    fn config_loader_reads_env() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        let config = IpamConfig::load_from_env().expect("config loads");
        assert_eq!(config.base_url(), "https://ipam.example.com");
        assert_eq!(config.username(), "svc-provision");
        assert_eq!(config.wapi_version(), DEFAULT_WAPI_VERSION);
        assert_eq!(config.timeout_secs(), DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn optional_vars_override_defaults() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("IPAM_WAPI_VERSION", "2.12");
        std::env::set_var("IPAM_TIMEOUT_SECS", "5");

        let config = IpamConfig::load_from_env().expect("config loads");
        assert_eq!(config.wapi_version(), "2.12");
        assert_eq!(config.timeout_secs(), 5);

        set_env();
    }

    #[test]
    fn required_env_vars_are_trimmed() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("IPAM_BASE_URL", "  https://ipam.example.com  ");

        let config = IpamConfig::load_from_env().expect("config loads");
        assert_eq!(config.base_url(), "https://ipam.example.com");

        set_env();
    }

    #[test]
    fn empty_required_env_var_is_treated_as_missing() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("IPAM_PASSWORD", "   ");

        let err = IpamConfig::load_from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVar {
                key: "IPAM_PASSWORD"
            }
        ));

        set_env();
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("IPAM_TIMEOUT_SECS", "soon");

        let err = IpamConfig::load_from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                key: "IPAM_TIMEOUT_SECS",
                ..
            }
        ));

        set_env();
    }
}
