use crate::utils::error::{FnError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Client profile as read from a TOML file. Every field is optional; unset
/// fields fall through to the next layer (see [`ProfileConfig::overlay`]).
///
/// ```toml
/// region = "eu-frankfurt-1"
/// timeout_seconds = 30
/// functions_endpoint = "${FN_ENDPOINT}"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub region: Option<String>,
    pub identity_endpoint: Option<String>,
    pub functions_endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub page_limit: Option<u32>,
    pub danger_accept_invalid_certs: Option<bool>,
}

impl ProfileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| FnError::ConfigFileError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FnError::ConfigFileError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FN_ENDPOINT})。Unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// Fields set in `higher` win over fields set in `self`.
    pub fn overlay(self, higher: ProfileConfig) -> ProfileConfig {
        ProfileConfig {
            region: higher.region.or(self.region),
            identity_endpoint: higher.identity_endpoint.or(self.identity_endpoint),
            functions_endpoint: higher.functions_endpoint.or(self.functions_endpoint),
            timeout_seconds: higher.timeout_seconds.or(self.timeout_seconds),
            retry_attempts: higher.retry_attempts.or(self.retry_attempts),
            page_limit: higher.page_limit.or(self.page_limit),
            danger_accept_invalid_certs: higher
                .danger_accept_invalid_certs
                .or(self.danger_accept_invalid_certs),
        }
    }
}
