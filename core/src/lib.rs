//! Query-execution client for the ClickHouse HTTP interface.
//!
//! # Overview
//! Turns datasource settings plus a raw SQL string into a single HTTP
//! request, applies one of the mutually exclusive authentication
//! strategies, negotiates response compression, configures TLS, and
//! normalizes the response (including transparent decompression) into
//! a uniform result or a typed failure.
//!
//! # Design
//! - [`ClickhouseClient`] is stateless beyond its immutable settings
//!   and can be shared across concurrent calls with no synchronization.
//! - Each call is strictly build → send → normalize; the build and
//!   normalize halves are public, pure, and testable without a server.
//! - One request per call: no retries, no pooling, no streaming of
//!   partial results, no client-imposed timeout.
//! - The caller's opaque context value is echoed back untouched for
//!   correlating concurrent queries.

pub mod client;
pub mod encoding;
pub mod error;
pub mod request;
pub mod settings;
pub mod transport;

pub use client::{ClickhouseClient, QueryResponse};
pub use encoding::Compression;
pub use error::ClientError;
pub use request::{BasicCredentials, ClientIdentity, HttpMethod, QueryRequest, RawResponse, TlsOptions};
pub use settings::{AuthMode, DatasourceSettings, SecureData};
