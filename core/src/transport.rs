//! Single-shot HTTP transport over reqwest.
//!
//! # Design
//! One call, one round trip: a fresh reqwest client is assembled from
//! the request's TLS options, the request is sent once with no retry
//! and no client-imposed timeout, and the body is drained chunk by
//! chunk so a mid-stream failure is reported as a transport error
//! rather than a truncated body. Automatic decompression is left
//! disabled — decoding is the normalizer's job, driven by the
//! `Content-Encoding` header this layer records.

use futures_util::StreamExt;
use reqwest::header::CONTENT_ENCODING;
use reqwest::{Certificate, Identity};
use tracing::debug;

use crate::error::ClientError;
use crate::request::{HttpMethod, QueryRequest, RawResponse};

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Execute one [`QueryRequest`] and return the raw response.
///
/// # Errors
/// `Config` when the TLS PEM material does not parse; `Network` for
/// everything the wire can do wrong (connect, DNS, handshake, broken
/// body stream).
pub async fn execute(request: QueryRequest) -> Result<RawResponse, ClientError> {
    let mut builder = reqwest::Client::builder().use_rustls_tls();

    if let Some(ca) = &request.tls.ca_cert {
        let cert = Certificate::from_pem(ca.as_bytes())
            .map_err(|e| ClientError::Config(format!("unable to parse tlsCACert: {e}")))?;
        builder = builder.add_root_certificate(cert);
    }
    if let Some(identity) = &request.tls.identity {
        let pem = format!("{}\n{}", identity.cert, identity.key);
        let identity = Identity::from_pem(pem.as_bytes())
            .map_err(|e| ClientError::Config(format!("unable to parse tls client identity: {e}")))?;
        builder = builder.identity(identity);
    }
    if request.tls.skip_verify {
        builder = builder.danger_accept_invalid_certs(true);
    }

    let client = builder
        .build()
        .map_err(|e| ClientError::Network(e.to_string()))?;

    let mut outbound = client.request(request.method.into(), request.url);
    if !request.params.is_empty() {
        outbound = outbound.query(&request.params);
    }
    for (name, value) in &request.headers {
        outbound = outbound.header(name, value);
    }
    if let Some(credentials) = &request.basic_auth {
        outbound = outbound.basic_auth(&credentials.username, credentials.password.as_deref());
    }
    if let Some(body) = request.body {
        outbound = outbound.body(body);
    }

    let response = outbound
        .send()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;

    let status = response.status().as_u16();
    let content_encoding = response
        .headers()
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    debug!(status, content_encoding = content_encoding.as_deref(), "clickhouse response received");

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ClientError::Network(e.to_string()))?;
        body.extend_from_slice(&chunk);
    }

    Ok(RawResponse {
        status,
        content_encoding,
        body,
    })
}
