use crate::domain::model::Stage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FnError {
    #[error("Usage error: {message}")]
    UsageError { message: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Could not find {stage} with name '{name}' in {scope}")]
    NotFoundError {
        stage: Stage,
        name: String,
        scope: String,
    },

    #[error("Found {count} {stage}s named '{name}' in {scope}; the name must be unique")]
    AmbiguousNameError {
        stage: Stage,
        name: String,
        scope: String,
        count: usize,
    },

    #[error("{stage} lookup failed: {source}")]
    StageError {
        stage: Stage,
        #[source]
        source: Box<FnError>,
    },

    #[error("HTTP request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}: {message}")]
    HttpStatusError {
        status: u16,
        url: String,
        message: String,
        request_id: Option<String>,
    },

    #[error("Response body is not valid UTF-8: {0}")]
    DecodeError(#[from] std::str::Utf8Error),

    #[error("Credential error: {message}")]
    CredentialError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration file error: {message}")]
    ConfigFileError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Usage,
    NotFound,
    Transport,
    Decode,
    Credential,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FnError {
    pub fn usage(message: impl Into<String>) -> Self {
        FnError::UsageError {
            message: message.into(),
        }
    }

    pub fn credential(message: impl Into<String>) -> Self {
        FnError::CredentialError {
            message: message.into(),
        }
    }

    /// Tags an error with the resolution stage it came from. Already tagged
    /// errors are returned unchanged.
    pub fn at_stage(self, stage: Stage) -> Self {
        match self {
            FnError::StageError { .. } => self,
            other => FnError::StageError {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage a resolution error originated from, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            FnError::StageError { stage, .. }
            | FnError::NotFoundError { stage, .. }
            | FnError::AmbiguousNameError { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost error, skipping stage annotations.
    pub fn root(&self) -> &FnError {
        match self {
            FnError::StageError { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FnError::StageError { source, .. } => source.category(),
            FnError::UsageError { .. }
            | FnError::InvalidConfigValueError { .. }
            | FnError::ConfigFileError { .. } => ErrorCategory::Usage,
            FnError::NotFoundError { .. } | FnError::AmbiguousNameError { .. } => {
                ErrorCategory::NotFound
            }
            FnError::TransportError(_) | FnError::HttpStatusError { .. } => {
                ErrorCategory::Transport
            }
            FnError::DecodeError(_) => ErrorCategory::Decode,
            FnError::CredentialError { .. } => ErrorCategory::Credential,
            FnError::IoError(_) | FnError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Usage | ErrorCategory::NotFound => ErrorSeverity::Medium,
            ErrorCategory::Transport | ErrorCategory::Decode => ErrorSeverity::High,
            ErrorCategory::Credential | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Usage => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Transport => 4,
            ErrorCategory::Decode => 5,
            ErrorCategory::Credential => 6,
            ErrorCategory::Internal => 1,
        }
    }

    /// Whether a retry could plausibly succeed. Only network-level failures
    /// qualify; an HTTP status from the service is a definitive answer.
    pub fn is_transient(&self) -> bool {
        match self {
            FnError::TransportError(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.root() {
            FnError::UsageError { .. } => {
                "Run with --help to see the expected arguments".to_string()
            }
            FnError::InvalidConfigValueError { field, .. } => {
                format!("Check the value given for {}", field)
            }
            FnError::ConfigFileError { .. } => {
                "Check the TOML syntax of the configuration file".to_string()
            }
            FnError::NotFoundError { stage, .. } => format!(
                "Check the {} name (names are case-sensitive) and that your user can see it",
                stage
            ),
            FnError::AmbiguousNameError { stage, .. } => {
                format!("Rename one of the {}s so the name is unique", stage)
            }
            FnError::TransportError(_) => {
                "Check network connectivity and the configured endpoints".to_string()
            }
            FnError::HttpStatusError { status: 401, .. } => {
                "Check the key fingerprint, user and tenancy OCIDs".to_string()
            }
            FnError::HttpStatusError { status: 404, .. } => {
                "Check the region and that the policy grants access to the resource".to_string()
            }
            FnError::HttpStatusError { .. } => {
                "Retry later or quote the opc-request-id when contacting support".to_string()
            }
            FnError::DecodeError(_) => {
                "Use --raw to write the response bytes without decoding".to_string()
            }
            FnError::CredentialError { .. } => {
                "Check PRIVATE_KEY_LOCATION and PASSPHRASE".to_string()
            }
            FnError::IoError(_) | FnError::SerializationError(_) => {
                "Re-run with --verbose for details".to_string()
            }
            FnError::StageError { source, .. } => source.recovery_suggestion(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.root() {
            FnError::HttpStatusError {
                status,
                message,
                request_id: Some(id),
                ..
            } => format!("{} (HTTP {}, opc-request-id {})", message, status, id),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FnError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found() -> FnError {
        FnError::NotFoundError {
            stage: Stage::Application,
            name: "myapp".to_string(),
            scope: "compartment dev".to_string(),
        }
    }

    #[test]
    fn test_stage_annotation_keeps_category() {
        let err = not_found().at_stage(Stage::Application);
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.stage(), Some(Stage::Application));
        assert!(matches!(err.root(), FnError::NotFoundError { .. }));
        assert_eq!(
            err.to_string(),
            "application lookup failed: Could not find application with name 'myapp' in compartment dev"
        );
    }

    #[test]
    fn test_stage_annotation_is_not_nested() {
        let err = not_found()
            .at_stage(Stage::Application)
            .at_stage(Stage::Function);
        assert_eq!(err.stage(), Some(Stage::Application));
    }

    #[test]
    fn test_exit_codes_are_non_zero() {
        let errors = vec![
            FnError::usage("missing"),
            not_found(),
            FnError::credential("bad key"),
            FnError::HttpStatusError {
                status: 500,
                url: "https://x".to_string(),
                message: "boom".to_string(),
                request_id: None,
            },
        ];
        for err in errors {
            assert_ne!(err.exit_code(), 0, "{}", err);
        }
    }

    #[test]
    fn test_http_status_is_not_transient() {
        let err = FnError::HttpStatusError {
            status: 503,
            url: "https://x".to_string(),
            message: "unavailable".to_string(),
            request_id: None,
        };
        assert!(!err.is_transient());
        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[test]
    fn test_user_friendly_message_includes_request_id() {
        let err = FnError::HttpStatusError {
            status: 401,
            url: "https://x".to_string(),
            message: "The required information to complete authentication was not provided"
                .to_string(),
            request_id: Some("ABC123".to_string()),
        }
        .at_stage(Stage::Compartment);
        assert!(err.user_friendly_message().contains("opc-request-id ABC123"));
        assert!(err.recovery_suggestion().contains("fingerprint"));
    }
}
