use crate::domain::model::{Function, FunctionRef, InvocationResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Source of request signatures. Implementations hold the key material.
pub trait CredentialProvider: Send + Sync {
    fn tenancy_id(&self) -> &str;

    /// `<tenancy>/<user>/<fingerprint>`
    fn key_id(&self) -> String;

    /// RSA-SHA256 signature over `data`.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;
}

pub trait ConfigProvider: Send + Sync {
    fn identity_endpoint(&self) -> &str;
    fn functions_endpoint(&self) -> &str;
    fn timeout(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
    fn page_limit(&self) -> u32;
    fn accept_invalid_certs(&self) -> bool;
}

#[async_trait]
pub trait FunctionResolver: Send + Sync {
    async fn resolve(&self, tenancy_id: &str, target: &FunctionRef) -> Result<Function>;
}

#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, function: &Function, payload: &[u8]) -> Result<InvocationResult>;
}
