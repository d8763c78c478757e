//! Error types for the ClickHouse query client.
//!
//! # Design
//! The three variants map to the three places a call can fail: before
//! the wire (`Config`), on the wire (`Network`), and behind the wire
//! (`Upstream`). Callers render the message to the end user, so
//! `Upstream` displays as the bare server body — ClickHouse puts its
//! whole error detail there.

use thiserror::Error;

/// Errors returned by [`ClickhouseClient`](crate::ClickhouseClient).
///
/// None of these are retried internally; every failure surfaces to the
/// caller exactly once.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The datasource settings are unusable: malformed endpoint URL,
    /// incomplete client-TLS identity, or bad PEM material. Raised
    /// before any network activity.
    #[error("invalid datasource configuration: {0}")]
    Config(String),

    /// Transport-level failure: connect, DNS, TLS handshake, a broken
    /// body stream, or a body that fails to decompress.
    #[error("network failure: {0}")]
    Network(String),

    /// The server answered with a non-200 status; the message is the
    /// raw response body carrying the server's error detail.
    #[error("{0}")]
    Upstream(String),
}
