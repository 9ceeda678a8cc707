// Copyright (c) Storesig Contributors.
// Licensed under the MIT License.

//! Compact signed-token parsing.
//!
//! A token is `base64url(header) "." base64url(claims) "." base64url(signature)`
//! with the unpadded URL-safe alphabet. The first two segments decode to JSON
//! objects; the third is raw signature bytes. Parsing restores structure only —
//! the signature is carried through untouched for the verification crates.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum TokenParseError {
    #[error("compact token must have 3 segments, found {0}")]
    SegmentCount(usize),

    #[error("segment {segment} is not valid unpadded base64url: {detail}")]
    Base64 { segment: usize, detail: String },

    #[error("segment {segment} did not decode to a JSON object: {detail}")]
    Json { segment: usize, detail: String },

    /// A claim that should hold an embedded token string held something else.
    #[error("token value is not a string")]
    NotAString,
}

/// Decoded token header.
///
/// Only the fields the verification pipeline consumes are typed; anything else
/// the issuer put in the header is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenHeader {
    /// Signing algorithm identifier, e.g. `ES256`.
    pub alg: String,

    /// Embedded certificate chain: standard-base64 DER entries, leaf first.
    ///
    /// Kept as raw JSON so that an absent field, a non-array value, and a
    /// short array stay distinguishable at extraction time.
    #[serde(default)]
    pub x5c: Option<Value>,

    /// Key id passthrough; not used for verification.
    #[serde(default)]
    pub kid: Option<String>,

    #[serde(default)]
    pub typ: Option<String>,
}

/// A structurally parsed signed token.
///
/// Immutable once parsed. `signing_input` preserves the exact transport bytes
/// the signature was computed over, so verification never re-encodes.
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub header: TokenHeader,
    /// Claims as an opaque JSON object.
    pub claims: Map<String, Value>,
    /// The two transport-encoded segments joined by `.`, as signed.
    pub signing_input: Vec<u8>,
    /// Raw signature bytes from the third segment.
    pub signature: Vec<u8>,
}

/// Parse a compact signed-token string into structured fields.
///
/// Structural only: the signature segment is decoded but not checked.
pub fn parse_signed_token(token: &str) -> Result<SignedToken, TokenParseError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenParseError::SegmentCount(segments.len()));
    }

    let header_bytes = decode_segment(0, segments[0])?;
    let claims_bytes = decode_segment(1, segments[1])?;
    let signature = decode_segment(2, segments[2])?;

    let header: TokenHeader = serde_json::from_slice(&header_bytes).map_err(|e| TokenParseError::Json {
        segment: 0,
        detail: e.to_string(),
    })?;

    let claims: Map<String, Value> = serde_json::from_slice(&claims_bytes).map_err(|e| TokenParseError::Json {
        segment: 1,
        detail: e.to_string(),
    })?;

    // The signature covers the transport-encoded segments, not the decoded bytes.
    let signing_input = format!("{}.{}", segments[0], segments[1]).into_bytes();

    Ok(SignedToken {
        header,
        claims,
        signing_input,
        signature,
    })
}

fn decode_segment(segment: usize, encoded: &str) -> Result<Vec<u8>, TokenParseError> {
    URL_SAFE_NO_PAD.decode(encoded).map_err(|e| TokenParseError::Base64 {
        segment,
        detail: e.to_string(),
    })
}
