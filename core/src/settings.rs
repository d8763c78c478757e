//! Datasource settings and authentication-mode resolution.
//!
//! # Design
//! Settings arrive as the datasource-instance JSON blob and are fixed
//! for the lifetime of the client — nothing here is mutated per call.
//! Secret material (passwords, keys, TLS PEM) lives in [`SecureData`],
//! which mirrors the decrypted secure-JSON map keyed by the original
//! camelCase names. An empty string in a secure field means "not set",
//! same as the plain fields.
//!
//! Authentication is resolved by a pure function into the tagged
//! [`AuthMode`] so the mutual-exclusion rule (basic auth beats
//! header auth) is testable without building a request.

use serde::Deserialize;

use crate::encoding::Compression;
use crate::error::ClientError;
use crate::request::{ClientIdentity, TlsOptions};

/// Connection settings for one ClickHouse datasource instance.
///
/// Immutable once constructed; shared by every call the client makes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasourceSettings {
    /// Endpoint URL of the ClickHouse HTTP interface.
    pub url: String,
    /// Send the query as a POST body instead of a `query` parameter.
    pub use_post: bool,
    /// Ask the server to compress the response body.
    pub use_compression: bool,
    /// Compression algorithm name; anything outside the supported set
    /// silently disables compression.
    pub compression_type: String,
    /// Use HTTP basic auth with [`basic_auth_user`](Self::basic_auth_user)
    /// and the stored password.
    pub basic_auth_enabled: bool,
    pub basic_auth_user: String,
    /// Use `X-ClickHouse-User` / `X-ClickHouse-Key` header auth
    /// (managed-cloud style). Ignored while basic auth is enabled.
    pub use_cloud_authorization: bool,
    pub x_header_user: String,
    /// Plain-text key for header auth; a stored secret key overrides it.
    pub x_header_key: String,
    /// Disable peer verification. May coexist with a pinned CA; the
    /// verification decision is skipped either way.
    pub tls_skip_verify: bool,
    /// Decrypted secret material.
    pub secure_data: SecureData,
}

/// Decrypted secure-JSON fields, keyed as the frontend stores them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecureData {
    pub basic_auth_password: Option<String>,
    pub x_header_key: Option<String>,
    #[serde(rename = "tlsCACert")]
    pub tls_ca_cert: Option<String>,
    pub tls_client_cert: Option<String>,
    pub tls_client_key: Option<String>,
}

/// How a request authenticates, resolved from settings.
///
/// Exactly one mode applies per client: basic auth wins over header
/// auth when both are enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    None,
    Basic { user: String, password: Option<String> },
    Header { user: String, key: Option<String> },
}

impl DatasourceSettings {
    /// Parse settings from the datasource-instance JSON blob.
    pub fn from_json(raw: &str) -> Result<Self, ClientError> {
        serde_json::from_str(raw)
            .map_err(|e| ClientError::Config(format!("unable to parse datasource settings: {e}")))
    }

    /// Resolve the authentication mode, enforcing priority order:
    /// basic auth, then header auth, then none.
    pub fn auth_mode(&self) -> AuthMode {
        if self.basic_auth_enabled {
            return AuthMode::Basic {
                user: self.basic_auth_user.clone(),
                password: non_empty(self.secure_data.basic_auth_password.as_deref())
                    .map(str::to_owned),
            };
        }
        if self.use_cloud_authorization {
            // The stored secret key wins over the plain setting.
            let key = non_empty(self.secure_data.x_header_key.as_deref())
                .or_else(|| non_empty(Some(self.x_header_key.as_str())))
                .map(str::to_owned);
            return AuthMode::Header {
                user: self.x_header_user.clone(),
                key,
            };
        }
        AuthMode::None
    }

    /// The negotiated response compression, if any.
    ///
    /// `None` when compression is off or the configured name is not a
    /// supported algorithm — an unrecognized name is not an error.
    pub fn compression(&self) -> Option<Compression> {
        if !self.use_compression {
            return None;
        }
        Compression::from_name(&self.compression_type)
    }

    /// Assemble the per-call TLS options.
    ///
    /// A client certificate without a key (or the reverse) is a
    /// configuration error, never a silent fall back to no identity.
    pub fn tls_options(&self) -> Result<TlsOptions, ClientError> {
        let cert = non_empty(self.secure_data.tls_client_cert.as_deref());
        let key = non_empty(self.secure_data.tls_client_key.as_deref());
        let identity = match (cert, key) {
            (Some(cert), Some(key)) => Some(ClientIdentity {
                cert: cert.to_owned(),
                key: key.to_owned(),
            }),
            (None, None) => None,
            _ => {
                return Err(ClientError::Config(
                    "please setup both tlsClientCert and tlsClientKey".to_string(),
                ))
            }
        };
        Ok(TlsOptions {
            ca_cert: non_empty(self.secure_data.tls_ca_cert.as_deref()).map(str::to_owned),
            identity,
            skip_verify: self.tls_skip_verify,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
