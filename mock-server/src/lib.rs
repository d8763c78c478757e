//! Mock ClickHouse HTTP endpoint for integration tests.
//!
//! # Design
//! Implements just enough of the ClickHouse HTTP interface to exercise
//! the client end-to-end: the query text arrives either as the `query`
//! parameter or as the request body, the caller identity is read from
//! basic auth or the `X-ClickHouse-*` headers, and a tiny canned
//! dialect is answered. When the request carries
//! `enable_http_compression=1` and a recognized `Accept-Encoding`, the
//! response body is compressed and labeled accordingly. Anything the
//! dialect does not know gets a ClickHouse-flavored syntax error with
//! status 500.
//!
//! Deliberately independent of the core crate; integration tests catch
//! any drift in the wire conventions.

use std::collections::HashMap;
use std::io::Write;

use axum::{
    body::Body,
    extract::Query,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tokio::net::TcpListener;
use tracing::debug;

/// Credentials the mock saw on a request, exposed through the
/// `currentUser()` / `currentKey()` canned queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user: String,
    pub key: String,
}

pub fn app() -> Router {
    Router::new().route("/", get(handle_query).post(handle_query))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn handle_query(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let sql = params.get("query").cloned().unwrap_or(body);
    let identity = caller_identity(&headers);
    debug!(sql = %sql, user = %identity.user, "mock query");

    match execute(&sql, &identity) {
        Ok(result) => {
            let compression_enabled =
                params.get("enable_http_compression").map(String::as_str) == Some("1");
            let accept_encoding = headers
                .get(header::ACCEPT_ENCODING)
                .and_then(|v| v.to_str().ok());
            if compression_enabled {
                if let Some(name) = accept_encoding {
                    if let Some(compressed) = compress(name, result.as_bytes()) {
                        return (
                            StatusCode::OK,
                            [(header::CONTENT_ENCODING, name)],
                            compressed,
                        )
                            .into_response();
                    }
                }
            }
            (StatusCode::OK, result).into_response()
        }
        Err(message) => (StatusCode::INTERNAL_SERVER_ERROR, message).into_response(),
    }
}

/// Read the caller identity the way ClickHouse does: basic auth first,
/// then the `X-ClickHouse-*` headers, else the `default` user.
pub fn caller_identity(headers: &HeaderMap) -> CallerIdentity {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(encoded) = value.strip_prefix("Basic ") {
            if let Ok(decoded) = BASE64.decode(encoded) {
                let decoded = String::from_utf8_lossy(&decoded).into_owned();
                let (user, password) = decoded.split_once(':').unwrap_or((decoded.as_str(), ""));
                return CallerIdentity {
                    user: user.to_string(),
                    key: password.to_string(),
                };
            }
        }
    }
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let user = header_str("x-clickhouse-user");
    let key = header_str("x-clickhouse-key");
    CallerIdentity {
        user: if user.is_empty() { "default".to_string() } else { user },
        key,
    }
}

/// The canned query dialect.
pub fn execute(sql: &str, identity: &CallerIdentity) -> Result<String, String> {
    match sql.trim() {
        "SELECT 1" => Ok("1\n".to_string()),
        "SELECT version()" => Ok("24.3.1.2672\n".to_string()),
        "SELECT currentUser()" => Ok(format!("{}\n", identity.user)),
        "SELECT currentKey()" => Ok(format!("{}\n", identity.key)),
        "" => Err("Code: 62. DB::Exception: Empty query".to_string()),
        other => Err(format!(
            "Code: 62. DB::Exception: Syntax error: failed at position 1: {other}"
        )),
    }
}

/// Compress `data` with the named content coding; `None` for names the
/// mock does not speak, in which case the response goes out plain.
pub fn compress(name: &str, data: &[u8]) -> Option<Vec<u8>> {
    match name {
        "gzip" => {
            let mut encoder =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data).ok()?;
            encoder.finish().ok()
        }
        "deflate" => {
            let mut encoder =
                flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data).ok()?;
            encoder.finish().ok()
        }
        "br" => {
            let mut out = Vec::new();
            {
                let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 5, 22);
                writer.write_all(data).ok()?;
            }
            Some(out)
        }
        "zstd" => zstd::stream::encode_all(data, 0).ok(),
        _ => None,
    }
}
