use crate::config::credentials::{load_private_key, ApiKeyCredentials};
use crate::config::ClientSettings;
use crate::core::http::SignedClient;
use httpmock::MockServer;
use std::path::Path;
use std::sync::Arc;

pub const TENANCY: &str = "ocid1.tenancy.oc1..aaaa";

pub fn test_credentials() -> Arc<ApiKeyCredentials> {
    let key = load_private_key(
        &Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/api_key.pem"),
        None,
    )
    .unwrap();
    Arc::new(ApiKeyCredentials::new(
        TENANCY.to_string(),
        "ocid1.user.oc1..bbbb".to_string(),
        "20:3b:97:13".to_string(),
        key,
    ))
}

/// Settings with both management endpoints pointed at `server`.
pub fn mock_settings(server: &MockServer) -> ClientSettings {
    ClientSettings {
        identity_endpoint: server.base_url(),
        functions_endpoint: server.base_url(),
        timeout_seconds: 5,
        retry_attempts: 0,
        page_limit: 2,
        ..Default::default()
    }
}

pub fn mock_client(settings: &ClientSettings) -> SignedClient<ApiKeyCredentials> {
    SignedClient::new(settings, test_credentials()).unwrap()
}
