use crate::config::toml_config::ProfileConfig;
use crate::utils::error::{FnError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "fn-invoke")]
#[command(about = "Resolve a function by compartment, application and function name, then invoke it")]
pub struct CliConfig {
    /// Compartment name (searched across the whole tenancy tree)
    pub compartment: String,

    /// Application name within the compartment
    pub application: String,

    /// Function name within the application
    pub function: String,

    /// Request body sent verbatim to the function
    pub payload: Option<String>,

    /// Read the request body from a file (binary safe)
    #[arg(long, conflicts_with = "payload")]
    pub payload_file: Option<PathBuf>,

    /// Write the response bytes to stdout without decoding them
    #[arg(long)]
    pub raw: bool,

    /// TOML profile with region, endpoints and transport settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Region; falls back to OCI_REGION, then the profile
    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub identity_endpoint: Option<String>,

    #[arg(long)]
    pub functions_endpoint: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Retries after a connect or timeout failure
    #[arg(long)]
    pub retry_attempts: Option<u32>,

    #[arg(long)]
    pub page_limit: Option<u32>,

    /// Disable TLS certificate validation. Local testing only.
    #[arg(long)]
    pub danger_accept_invalid_certs: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl CliConfig {
    /// Settings given on the command line, as the top configuration layer.
    pub fn overrides(&self) -> ProfileConfig {
        ProfileConfig {
            region: self.region.clone(),
            identity_endpoint: self.identity_endpoint.clone(),
            functions_endpoint: self.functions_endpoint.clone(),
            timeout_seconds: self.timeout_seconds,
            retry_attempts: self.retry_attempts,
            page_limit: self.page_limit,
            danger_accept_invalid_certs: self.danger_accept_invalid_certs.then_some(true),
        }
    }

    /// The request body. Defaults to empty when neither a payload nor a
    /// payload file is given.
    pub fn read_payload(&self) -> Result<Vec<u8>> {
        match (&self.payload, &self.payload_file) {
            (Some(_), Some(_)) => Err(FnError::usage(
                "a payload argument and --payload-file cannot be used together",
            )),
            (Some(payload), None) => Ok(payload.as_bytes().to_vec()),
            (None, Some(path)) => std::fs::read(path).map_err(|e| {
                FnError::usage(format!("cannot read payload file {}: {}", path.display(), e))
            }),
            (None, None) => Ok(Vec::new()),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("compartment", &self.compartment)?;
        validate_non_empty_string("application", &self.application)?;
        validate_non_empty_string("function", &self.function)?;

        if let Some(path) = &self.payload_file {
            validate_path("payload_file", &path.to_string_lossy())?;
        }
        if let Some(path) = &self.config {
            validate_path("config", &path.to_string_lossy())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let cli = CliConfig::try_parse_from(["fn-invoke", "dev", "myapp", "helloworld", "foobar"])
            .unwrap();

        assert_eq!(cli.compartment, "dev");
        assert_eq!(cli.application, "myapp");
        assert_eq!(cli.function, "helloworld");
        assert_eq!(cli.read_payload().unwrap(), b"foobar".to_vec());
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_payload_defaults_to_empty() {
        let cli = CliConfig::try_parse_from(["fn-invoke", "dev", "myapp", "helloworld"]).unwrap();
        assert!(cli.read_payload().unwrap().is_empty());
    }

    #[test]
    fn test_missing_function_name_is_rejected() {
        assert!(CliConfig::try_parse_from(["fn-invoke", "dev", "myapp"]).is_err());
    }

    #[test]
    fn test_payload_and_payload_file_conflict() {
        let result = CliConfig::try_parse_from([
            "fn-invoke",
            "dev",
            "myapp",
            "helloworld",
            "foobar",
            "--payload-file",
            "body.bin",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_payload_file_is_read_as_bytes() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("body.bin");
        std::fs::write(&path, [0u8, 159, 146, 150]).unwrap();

        let cli = CliConfig::try_parse_from([
            "fn-invoke",
            "dev",
            "myapp",
            "helloworld",
            "--payload-file",
            path.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(cli.read_payload().unwrap(), vec![0u8, 159, 146, 150]);
    }

    #[test]
    fn test_unreadable_payload_file_is_a_usage_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.bin");

        let cli = CliConfig::try_parse_from([
            "fn-invoke",
            "dev",
            "myapp",
            "helloworld",
            "--payload-file",
            path.to_str().unwrap(),
        ])
        .unwrap();

        let err = cli.read_payload().unwrap_err();
        assert_eq!(err.category(), crate::utils::error::ErrorCategory::Usage);
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("missing.bin"));
    }

    #[test]
    fn test_overrides_only_carry_given_flags() {
        let cli = CliConfig::try_parse_from([
            "fn-invoke",
            "dev",
            "myapp",
            "helloworld",
            "--timeout-seconds",
            "15",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.timeout_seconds, Some(15));
        assert_eq!(overrides.danger_accept_invalid_certs, None);
        assert_eq!(overrides.functions_endpoint, None);
    }

    #[test]
    fn test_blank_names_fail_validation() {
        let cli = CliConfig::try_parse_from(["fn-invoke", "dev", " ", "helloworld"]).unwrap();
        assert!(cli.validate().is_err());
    }
}
