//! Response compression algorithms and decoding.
//!
//! # Design
//! The same fixed set of algorithms drives both sides of the exchange:
//! request negotiation (`Accept-Encoding`) and response decoding
//! (`Content-Encoding`). Names outside the set are ignored rather than
//! rejected, in both directions. HTTP `deflate` is decoded as
//! zlib-wrapped per RFC 9110, which is what ClickHouse sends.

use std::io::{self, Read};

use flate2::read::{GzDecoder, ZlibDecoder};

/// Response compression algorithms the client understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Brotli,
    Deflate,
    Zstd,
}

impl Compression {
    /// Look up an algorithm by its HTTP content-coding name.
    /// Unrecognized names yield `None` — the permissive policy the
    /// negotiation and decoding paths both rely on.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "gzip" => Some(Self::Gzip),
            "br" => Some(Self::Brotli),
            "deflate" => Some(Self::Deflate),
            "zstd" => Some(Self::Zstd),
            _ => None,
        }
    }

    /// The content-coding name sent in `Accept-Encoding`.
    pub fn encoding_name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Brotli => "br",
            Self::Deflate => "deflate",
            Self::Zstd => "zstd",
        }
    }

    /// Decode a fully accumulated response body.
    pub fn decompress(self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            Self::Gzip => {
                GzDecoder::new(data).read_to_end(&mut out)?;
            }
            Self::Deflate => {
                ZlibDecoder::new(data).read_to_end(&mut out)?;
            }
            Self::Brotli => {
                brotli::Decompressor::new(data, 4096).read_to_end(&mut out)?;
            }
            Self::Zstd => {
                out = zstd::stream::decode_all(data)?;
            }
        }
        Ok(out)
    }
}
