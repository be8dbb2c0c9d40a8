//! HTTP request signing (draft-cavage-http-signatures, version 1, rsa-sha256).
//!
//! Every request signs `date`, `(request-target)` and `host`. Requests that
//! carry a body also sign `content-length`, `content-type` and
//! `x-content-sha256`.

use crate::core::CredentialProvider;
use crate::utils::error::{FnError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, DATE};
use reqwest::{Method, Request};
use rsa::sha2::{Digest, Sha256};

pub const X_CONTENT_SHA256: &str = "x-content-sha256";
const DEFAULT_BODY_CONTENT_TYPE: &str = "application/octet-stream";

const GENERIC_HEADERS: &[&str] = &["date", "(request-target)", "host"];
const BODY_HEADERS: &[&str] = &[
    "date",
    "(request-target)",
    "host",
    "content-length",
    "content-type",
    X_CONTENT_SHA256,
];

pub fn sign_request<C: CredentialProvider + ?Sized>(
    credentials: &C,
    request: &mut Request,
) -> Result<()> {
    sign_request_at(credentials, request, Utc::now())
}

/// Adds the signing headers and `Authorization` to `request` as of `now`.
pub fn sign_request_at<C: CredentialProvider + ?Sized>(
    credentials: &C,
    request: &mut Request,
    now: DateTime<Utc>,
) -> Result<()> {
    let date = now.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
    request.headers_mut().insert(DATE, header_value(&date)?);

    let names = if signs_body(request.method()) {
        let body = request
            .body()
            .map(|body| {
                body.as_bytes().map(<[u8]>::to_vec).ok_or_else(|| {
                    FnError::credential("streaming request bodies cannot be signed")
                })
            })
            .transpose()?
            .unwrap_or_default();

        let digest = STANDARD.encode(Sha256::digest(&body));
        let headers = request.headers_mut();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static(DEFAULT_BODY_CONTENT_TYPE),
            );
        }
        headers.insert(X_CONTENT_SHA256, header_value(&digest)?);
        BODY_HEADERS
    } else {
        GENERIC_HEADERS
    };

    let signing_string = signing_string(request, names)?;
    let signature = STANDARD.encode(credentials.sign(signing_string.as_bytes())?);

    let authorization = format!(
        r#"Signature version="1",keyId="{}",algorithm="rsa-sha256",headers="{}",signature="{}""#,
        credentials.key_id(),
        names.join(" "),
        signature
    );
    request
        .headers_mut()
        .insert(AUTHORIZATION, header_value(&authorization)?);

    Ok(())
}

/// The newline-joined `name: value` lines covered by the signature.
pub fn signing_string(request: &Request, names: &[&str]) -> Result<String> {
    let lines = names
        .iter()
        .map(|name| {
            let value = match *name {
                "(request-target)" => request_target(request),
                "host" => host(request)?,
                other => request
                    .headers()
                    .get(other)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        FnError::credential(format!("header '{}' missing from request", other))
                    })?,
            };
            Ok(format!("{}: {}", name, value))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(lines.join("\n"))
}

fn signs_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn request_target(request: &Request) -> String {
    let url = request.url();
    let method = request.method().as_str().to_lowercase();
    match url.query() {
        Some(query) => format!("{} {}?{}", method, url.path(), query),
        None => format!("{} {}", method, url.path()),
    }
}

/// Host as the transport will send it: the port only when non-default.
fn host(request: &Request) -> Result<String> {
    let url = request.url();
    let host = url
        .host_str()
        .ok_or_else(|| FnError::credential(format!("URL has no host: {}", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| FnError::credential(format!("invalid header value: {}", e)))
}
