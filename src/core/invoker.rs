use crate::core::http::{SignedClient, OPC_REQUEST_ID};
use crate::core::resolver::FUNCTIONS_API_VERSION;
use crate::core::{CredentialProvider, Function, InvocationResult, Invoker, Stage};
use crate::utils::error::{FnError, Result};
use async_trait::async_trait;
use std::io::Write;

/// Calls a resolved function on its own invoke endpoint.
pub struct FunctionInvoker<C: CredentialProvider> {
    http: SignedClient<C>,
}

impl<C: CredentialProvider> FunctionInvoker<C> {
    pub fn new(http: SignedClient<C>) -> Self {
        Self { http }
    }
}

/// `{invokeEndpoint}/20181201/functions/{id}/actions/invoke`
pub fn invoke_url(function: &Function) -> Result<String> {
    let endpoint = function
        .invoke_endpoint()
        .ok_or_else(|| FnError::NotFoundError {
            stage: Stage::Function,
            name: function.display_name.clone(),
            scope: "function metadata (no invoke endpoint)".to_string(),
        })?;

    Ok(format!(
        "{}/{}/functions/{}/actions/invoke",
        endpoint.trim_end_matches('/'),
        FUNCTIONS_API_VERSION,
        function.id
    ))
}

#[async_trait]
impl<C: CredentialProvider> Invoker for FunctionInvoker<C> {
    async fn invoke(&self, function: &Function, payload: &[u8]) -> Result<InvocationResult> {
        let url = invoke_url(function)?;
        tracing::info!(
            "🚀 Invoking function endpoint - {} with {} byte payload",
            url,
            payload.len()
        );

        let response = self.http.post_bytes(&url, payload).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let request_id = response
            .headers()
            .get(OPC_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        tracing::debug!("Function returned {} bytes", body.len());
        Ok(InvocationResult {
            body,
            content_type,
            request_id,
        })
    }
}

/// Writes the invocation to `out`: endpoint, payload and decoded response, or
/// only the raw response bytes when `raw` is set.
///
/// A response that is not UTF-8 fails with `DecodeError` unless `raw`.
pub fn write_report<W: Write>(
    out: &mut W,
    function: &Function,
    payload: &[u8],
    result: &InvocationResult,
    raw: bool,
) -> Result<()> {
    if raw {
        out.write_all(&result.body)?;
        out.flush()?;
        return Ok(());
    }

    let text = result.text()?;
    let endpoint = function.invoke_endpoint().unwrap_or_default();
    let payload_text = match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<{} bytes of binary data>", payload.len()),
    };

    writeln!(out, "Invoking function endpoint - {} with payload {}", endpoint, payload_text)?;
    writeln!(out, "Response from function - {}", text)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::credentials::ApiKeyCredentials;
    use crate::core::test_support::{mock_client, mock_settings};
    use httpmock::prelude::*;

    fn function_at(endpoint: String) -> Function {
        Function {
            id: "ocid1.fnfunc.oc1..hello".to_string(),
            display_name: "helloworld".to_string(),
            application_id: Some("ocid1.fnapp.oc1..myapp".to_string()),
            invoke_endpoint: Some(endpoint),
            lifecycle_state: Some("ACTIVE".to_string()),
        }
    }

    fn invoker(server: &MockServer) -> FunctionInvoker<ApiKeyCredentials> {
        FunctionInvoker::new(mock_client(&mock_settings(server)))
    }

    #[test]
    fn test_invoke_url_uses_invoke_endpoint() {
        let function = function_at("https://abc.us-phoenix-1.functions.oci.oraclecloud.com/".to_string());
        assert_eq!(
            invoke_url(&function).unwrap(),
            "https://abc.us-phoenix-1.functions.oci.oraclecloud.com/20181201/functions/ocid1.fnfunc.oc1..hello/actions/invoke"
        );
    }

    #[test]
    fn test_invoke_url_requires_endpoint() {
        let mut function = function_at(String::new());
        function.invoke_endpoint = None;
        assert!(matches!(
            invoke_url(&function),
            Err(FnError::NotFoundError { stage: Stage::Function, .. })
        ));
    }

    #[tokio::test]
    async fn test_json_boilerplate_echo() {
        let server = MockServer::start();
        let invoke_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/20181201/functions/ocid1.fnfunc.oc1..hello/actions/invoke")
                .header_exists("authorization")
                .body(r#"{"name":"foobar"}"#);
            then.status(200)
                .header("content-type", "application/json")
                .header("opc-request-id", "REQ-42")
                .body(r#"{"message":"Hello foobar"}"#);
        });

        let result = invoker(&server)
            .invoke(&function_at(server.base_url()), br#"{"name":"foobar"}"#)
            .await
            .unwrap();

        invoke_mock.assert();
        assert!(result.text().unwrap().contains("Hello foobar"));
        assert_eq!(result.content_type.as_deref(), Some("application/json"));
        assert_eq!(result.request_id.as_deref(), Some("REQ-42"));
    }

    #[tokio::test]
    async fn test_raw_string_payload_is_not_framed() {
        let server = MockServer::start();
        let invoke_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/20181201/functions/ocid1.fnfunc.oc1..hello/actions/invoke")
                .body("foobar");
            then.status(200).body("Hello foobar!");
        });

        let result = invoker(&server)
            .invoke(&function_at(server.base_url()), b"foobar")
            .await
            .unwrap();

        invoke_mock.assert();
        assert_eq!(result.text().unwrap(), "Hello foobar!");
    }

    #[tokio::test]
    async fn test_function_error_is_not_retried() {
        let server = MockServer::start();
        let invoke_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/20181201/functions/ocid1.fnfunc.oc1..hello/actions/invoke");
            then.status(502).json_body(serde_json::json!({
                "code": "FunctionInvokeExecutionFailed",
                "message": "function failed"
            }));
        });

        let err = invoker(&server)
            .invoke(&function_at(server.base_url()), b"foobar")
            .await
            .unwrap_err();

        invoke_mock.assert_hits(1);
        assert!(matches!(err, FnError::HttpStatusError { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_binary_response_round_trips_in_raw_mode() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/20181201/functions/ocid1.fnfunc.oc1..hello/actions/invoke");
            then.status(200).body(vec![0x89u8, 0x50, 0x4e, 0x47, 0xff]);
        });

        let function = function_at(server.base_url());
        let result = invoker(&server).invoke(&function, &[0u8, 1, 2]).await.unwrap();

        let mut out = Vec::new();
        write_report(&mut out, &function, &[0u8, 1, 2], &result, true).unwrap();
        assert_eq!(out, vec![0x89u8, 0x50, 0x4e, 0x47, 0xff]);

        let mut out = Vec::new();
        let err = write_report(&mut out, &function, &[0u8, 1, 2], &result, false).unwrap_err();
        assert!(matches!(err, FnError::DecodeError(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_text_report_lists_endpoint_payload_and_response() {
        let function = function_at("https://invoke.example.com".to_string());
        let result = InvocationResult {
            body: b"Hello foobar!".to_vec(),
            content_type: None,
            request_id: None,
        };

        let mut out = Vec::new();
        write_report(&mut out, &function, b"foobar", &result, false).unwrap();

        let report = String::from_utf8(out).unwrap();
        assert_eq!(
            report,
            "Invoking function endpoint - https://invoke.example.com with payload foobar\n\
             Response from function - Hello foobar!\n"
        );
    }
}
