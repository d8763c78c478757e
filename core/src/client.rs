//! Stateless query client for the ClickHouse HTTP interface.
//!
//! # Design
//! `ClickhouseClient` holds only immutable [`DatasourceSettings`] and
//! carries no state between calls, so a shared reference can issue any
//! number of queries concurrently. Each call runs three stages:
//! `build_query_request` (pure), [`transport::execute`] (the single
//! network operation), and `parse_query_response` (pure). The build
//! and parse halves stay public so both can be exercised without a
//! server.
//!
//! The caller's context value is opaque: it is moved into the call and
//! echoed unchanged in the result, purely for correlating concurrent
//! queries.

use tracing::debug;
use url::Url;

use crate::encoding::Compression;
use crate::error::ClientError;
use crate::request::{BasicCredentials, HttpMethod, QueryRequest, RawResponse};
use crate::settings::{AuthMode, DatasourceSettings};
use crate::transport;

/// A successful query: the caller's context echoed back, plus the
/// fully materialized (decompressed) response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse<C> {
    pub ctx: C,
    pub body: String,
}

/// Query-execution client for one ClickHouse datasource.
#[derive(Debug, Clone)]
pub struct ClickhouseClient {
    settings: DatasourceSettings,
}

impl ClickhouseClient {
    pub fn new(settings: DatasourceSettings) -> Self {
        Self { settings }
    }

    /// Run one query: build the request, send it, normalize the
    /// response. `ctx` is returned untouched in the success value.
    pub async fn query<C>(&self, ctx: C, query: &str) -> Result<QueryResponse<C>, ClientError> {
        let request = self.build_query_request(query)?;
        debug!(method = ?request.method, url = %request.url, "sending clickhouse query");
        let response = transport::execute(request).await?;
        self.parse_query_response(ctx, response)
    }

    /// Derive the outbound request from the settings and query text.
    ///
    /// # Errors
    /// `Config` when the endpoint URL does not parse or the client-TLS
    /// identity is incomplete. No network activity happens here.
    pub fn build_query_request(&self, query: &str) -> Result<QueryRequest, ClientError> {
        let url = Url::parse(&self.settings.url).map_err(|e| {
            ClientError::Config(format!(
                "unable to parse clickhouse datasource url {:?}: {e}",
                self.settings.url
            ))
        })?;
        let tls = self.settings.tls_options()?;

        // The query text travels in exactly one place: POST body or
        // `query` parameter.
        let (method, body, mut params) = if self.settings.use_post {
            (HttpMethod::Post, Some(query.to_owned()), Vec::new())
        } else {
            (
                HttpMethod::Get,
                None,
                vec![("query".to_string(), query.to_owned())],
            )
        };

        let mut headers = Vec::new();
        if let Some(algorithm) = self.settings.compression() {
            headers.push((
                "Accept-Encoding".to_string(),
                algorithm.encoding_name().to_string(),
            ));
            params.push(("enable_http_compression".to_string(), "1".to_string()));
        }

        let mut basic_auth = None;
        match self.settings.auth_mode() {
            AuthMode::Basic { user, password } => {
                basic_auth = Some(BasicCredentials {
                    username: user,
                    password,
                });
            }
            AuthMode::Header { user, key } => {
                headers.push(("X-ClickHouse-User".to_string(), user));
                if let Some(key) = key {
                    headers.push(("X-ClickHouse-Key".to_string(), key));
                }
            }
            AuthMode::None => {}
        }

        Ok(QueryRequest {
            url,
            method,
            params,
            headers,
            body,
            basic_auth,
            tls,
        })
    }

    /// Normalize a raw response into a result, echoing `ctx` back.
    ///
    /// Decompression is driven solely by the response's declared
    /// `Content-Encoding` — a server may compress even when the
    /// request negotiated nothing.
    ///
    /// # Errors
    /// `Network` when a declared encoding fails to decode; `Upstream`
    /// for any non-200 status, with the raw body as the message.
    pub fn parse_query_response<C>(
        &self,
        ctx: C,
        response: RawResponse,
    ) -> Result<QueryResponse<C>, ClientError> {
        let bytes = match response
            .content_encoding
            .as_deref()
            .and_then(Compression::from_name)
        {
            Some(algorithm) => algorithm.decompress(&response.body).map_err(|e| {
                ClientError::Network(format!(
                    "unable to decode {} response body: {e}",
                    algorithm.encoding_name()
                ))
            })?,
            None => response.body,
        };
        let body = String::from_utf8_lossy(&bytes).into_owned();

        if response.status != 200 {
            // ClickHouse puts its error detail in the body.
            return Err(ClientError::Upstream(body));
        }
        Ok(QueryResponse { ctx, body })
    }
}
