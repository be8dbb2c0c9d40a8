use crate::config::cli::CliConfig;
use crate::config::credentials::{ApiKeyCredentials, CredentialSettings};
use crate::config::toml_config::ProfileConfig;
use crate::config::{ClientSettings, OCI_REGION};
use crate::core::engine::InvokeEngine;
use crate::core::http::SignedClient;
use crate::core::invoker::{write_report, FunctionInvoker};
use crate::core::resolver::ResourceResolver;
use crate::core::{CredentialProvider, FunctionRef};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::io::Write;
use std::sync::Arc;

/// Layers command-line flags over the environment over the TOML profile.
pub fn client_settings<F>(cli: &CliConfig, env: &F) -> Result<ClientSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let file = match &cli.config {
        Some(path) => {
            tracing::debug!("Loading profile from {}", path.display());
            ProfileConfig::from_file(path)?
        }
        None => ProfileConfig::default(),
    };
    let environment = ProfileConfig {
        region: env(OCI_REGION).filter(|region| !region.trim().is_empty()),
        ..Default::default()
    };
    Ok(ClientSettings::from_profile(
        file.overlay(environment).overlay(cli.overrides()),
    ))
}

/// Runs one resolve-and-invoke cycle and writes the report to `out`.
///
/// Everything that can fail without the network (arguments, environment,
/// profile, payload file, key) is checked before the first request.
pub async fn run<F, W>(cli: &CliConfig, env: F, out: &mut W) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    W: Write,
{
    cli.validate()?;
    let identity = CredentialSettings::from_lookup(&env)?;
    let settings = client_settings(cli, &env)?;
    settings.validate()?;
    let payload = cli.read_payload()?;

    tracing::debug!("Client settings: {:?}", settings);
    let credentials = Arc::new(ApiKeyCredentials::load(&identity)?);
    let tenancy_id = credentials.tenancy_id().to_string();

    let http = SignedClient::new(&settings, credentials)?;
    let engine = InvokeEngine::new(
        ResourceResolver::new(&settings, http.clone()),
        FunctionInvoker::new(http),
    );

    let target = FunctionRef {
        compartment: cli.compartment.clone(),
        application: cli.application.clone(),
        function: cli.function.clone(),
    };
    let (function, result) = engine.run(&tenancy_id, &target, &payload).await?;

    write_report(out, &function, &payload, &result, cli.raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(extra: &[&str]) -> CliConfig {
        let mut args = vec!["fn-invoke", "dev", "myapp", "helloworld"];
        args.extend_from_slice(extra);
        CliConfig::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_region_comes_from_injected_environment() {
        let env = |key: &str| (key == OCI_REGION).then(|| "eu-frankfurt-1".to_string());

        let settings = client_settings(&cli(&[]), &env).unwrap();

        assert_eq!(settings.region, "eu-frankfurt-1");
        assert_eq!(
            settings.functions_endpoint,
            "https://functions.eu-frankfurt-1.oci.oraclecloud.com"
        );
    }

    #[test]
    fn test_region_flag_beats_environment_and_profile() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let profile = temp_dir.path().join("profile.toml");
        std::fs::write(&profile, "region = \"us-ashburn-1\"\n").unwrap();
        let profile_arg = profile.to_str().unwrap().to_string();
        let env = |key: &str| (key == OCI_REGION).then(|| "eu-frankfurt-1".to_string());

        let from_env = client_settings(&cli(&["--config", profile_arg.as_str()]), &env).unwrap();
        assert_eq!(from_env.region, "eu-frankfurt-1");

        let from_flag = client_settings(
            &cli(&["--config", profile_arg.as_str(), "--region", "ap-tokyo-1"]),
            &env,
        )
        .unwrap();
        assert_eq!(from_flag.region, "ap-tokyo-1");

        let no_env = |_: &str| -> Option<String> { None };
        let from_profile =
            client_settings(&cli(&["--config", profile_arg.as_str()]), &no_env).unwrap();
        assert_eq!(from_profile.region, "us-ashburn-1");
    }
}
