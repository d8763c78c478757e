//! Outbound request and raw response described as plain data.
//!
//! # Design
//! A [`QueryRequest`] is built per call, owned by that call, and
//! discarded when it returns — including its TLS options, so secret
//! PEM material never outlives the round trip. Keeping the request a
//! plain value (owned `String` / `Vec` fields, no transport handles)
//! lets the builder stay pure and unit-testable; the transport layer
//! is the only place that touches reqwest.

use url::Url;

/// HTTP method for the query. ClickHouse's HTTP interface accepts the
/// query text either as a `query` parameter (GET) or as the body (POST).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A single outbound ClickHouse query described as plain data.
///
/// Exactly one of `body` / the `query` parameter carries the query
/// text, never both.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub url: Url,
    pub method: HttpMethod,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub basic_auth: Option<BasicCredentials>,
    pub tls: TlsOptions,
}

/// Username/password pair for HTTP basic auth. The password is absent
/// when nothing is stored for the datasource; the credential is still
/// attached so the server decides whether that is acceptable.
#[derive(Debug, Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: Option<String>,
}

/// TLS material for one round trip.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// PEM-encoded CA certificate used as the trust anchor.
    pub ca_cert: Option<String>,
    /// Client certificate/key pair; validated as a pair before a
    /// request is built.
    pub identity: Option<ClientIdentity>,
    /// Disable peer verification. Takes precedence over `ca_cert` for
    /// the verification decision.
    pub skip_verify: bool,
}

/// PEM-encoded client certificate and private key.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub cert: String,
    pub key: String,
}

/// Raw response handed to the normalizer: status, the declared content
/// encoding, and the fully drained body bytes.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_encoding: Option<String>,
    pub body: Vec<u8>,
}
