use crate::core::signing::sign_request;
use crate::core::{ConfigProvider, CredentialProvider};
use crate::utils::error::{FnError, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

pub const OPC_NEXT_PAGE: &str = "opc-next-page";
pub const OPC_REQUEST_ID: &str = "opc-request-id";

/// One page of a list operation.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    code: Option<String>,
    message: Option<String>,
}

/// reqwest client that signs every request and retries transient network
/// failures a bounded number of times.
pub struct SignedClient<C: CredentialProvider> {
    client: Client,
    credentials: Arc<C>,
    retry_attempts: u32,
}

impl<C: CredentialProvider> Clone for SignedClient<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            credentials: Arc::clone(&self.credentials),
            retry_attempts: self.retry_attempts,
        }
    }
}

impl<C: CredentialProvider> SignedClient<C> {
    pub fn new<P: ConfigProvider>(config: &P, credentials: Arc<C>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("fn-invoke/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.accept_invalid_certs())
            .build()?;

        Ok(Self {
            client,
            credentials,
            retry_attempts: config.retry_attempts(),
        })
    }

    /// GET a JSON array, returning it with the `opc-next-page` token.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Page<T>> {
        let response = self.execute(|| self.client.get(url).query(query)).await?;
        let next_page = header(&response, OPC_NEXT_PAGE);
        let bytes = response.bytes().await?;
        let items = serde_json::from_slice(&bytes)?;
        Ok(Page { items, next_page })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.execute(|| self.client.get(url)).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// POST raw bytes. The body is sent exactly as given.
    pub async fn post_bytes(&self, url: &str, body: &[u8]) -> Result<Response> {
        self.execute(|| self.client.post(url).body(body.to_vec()))
            .await
    }

    async fn execute<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            // Re-signed on every attempt so the date header stays fresh.
            let mut request = build().build()?;
            sign_request(self.credentials.as_ref(), &mut request)?;

            let method = request.method().clone();
            let url = request.url().to_string();
            tracing::debug!("📡 {} {}", method, url);

            match self.client.execute(request).await {
                Ok(response) => {
                    tracing::debug!("📡 {} {} -> {}", method, url, response.status());
                    return check_status(response).await;
                }
                Err(e) => {
                    let err = FnError::from(e);
                    if err.is_transient() && attempt < self.retry_attempts {
                        attempt += 1;
                        tracing::warn!(
                            "🔁 {} {} failed ({}), retry {}/{}",
                            method,
                            url,
                            err,
                            attempt,
                            self.retry_attempts
                        );
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }
}

fn header(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let request_id = header(&response, OPC_REQUEST_ID);
    let body = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ServiceError>(&body) {
        Ok(ServiceError {
            code: Some(code),
            message: Some(message),
        }) => format!("{}: {}", code, message),
        Ok(ServiceError {
            message: Some(message),
            ..
        }) => message,
        _ if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        _ => body,
    };

    Err(FnError::HttpStatusError {
        status: status.as_u16(),
        url,
        message,
        request_id,
    })
}
