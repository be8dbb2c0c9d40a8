#[cfg(feature = "cli")]
pub mod cli;
pub mod credentials;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use std::time::Duration;
use toml_config::ProfileConfig;

/// Environment variable naming the region when `--region` is absent.
pub const OCI_REGION: &str = "OCI_REGION";

pub const DEFAULT_REGION: &str = "us-phoenix-1";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 1;
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Fully resolved client settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub region: String,
    pub identity_endpoint: String,
    pub functions_endpoint: String,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub page_limit: u32,
    pub danger_accept_invalid_certs: bool,
}

impl ClientSettings {
    pub fn from_profile(profile: ProfileConfig) -> Self {
        let region = profile
            .region
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let identity_endpoint = profile
            .identity_endpoint
            .unwrap_or_else(|| format!("https://identity.{}.oraclecloud.com", region));
        let functions_endpoint = profile
            .functions_endpoint
            .unwrap_or_else(|| format!("https://functions.{}.oci.oraclecloud.com", region));

        Self {
            identity_endpoint: identity_endpoint.trim_end_matches('/').to_string(),
            functions_endpoint: functions_endpoint.trim_end_matches('/').to_string(),
            region,
            timeout_seconds: profile.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            retry_attempts: profile.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS),
            page_limit: profile.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            danger_accept_invalid_certs: profile.danger_accept_invalid_certs.unwrap_or(false),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::from_profile(ProfileConfig::default())
    }
}

impl ConfigProvider for ClientSettings {
    fn identity_endpoint(&self) -> &str {
        &self.identity_endpoint
    }

    fn functions_endpoint(&self) -> &str {
        &self.functions_endpoint
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn page_limit(&self) -> u32 {
        self.page_limit
    }

    fn accept_invalid_certs(&self) -> bool {
        self.danger_accept_invalid_certs
    }
}

impl Validate for ClientSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("region", &self.region)?;
        validate_url("identity_endpoint", &self.identity_endpoint)?;
        validate_url("functions_endpoint", &self.functions_endpoint)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
        validate_range("retry_attempts", self.retry_attempts, 0, 5)?;
        validate_range("page_limit", self.page_limit, 1, 1000)?;

        if self.danger_accept_invalid_certs {
            tracing::warn!(
                "⚠️ TLS certificate validation is DISABLED (--danger-accept-invalid-certs); use only against local test endpoints"
            );
        }

        tracing::debug!("✅ Client configuration validation passed");
        Ok(())
    }
}
