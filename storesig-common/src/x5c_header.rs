// Copyright (c) Storesig Contributors.
// Licensed under the MIT License.

//! Extraction of DER certificates from the token header's `x5c` chain.
//!
//! `x5c` (RFC 7515 §4.1.6) is an array of standard-base64 (not base64url)
//! DER certificates, ordered leaf first. Extraction is index-based so the
//! decoder can demand exactly the chain positions it needs and fail precisely
//! when one is missing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::signed_token::SignedToken;

#[derive(Debug, thiserror::Error)]
pub enum X5cError {
    #[error("token header has no x5c certificate chain")]
    Missing,

    #[error("x5c header is not an array")]
    NotAnArray,

    #[error("x5c chain has {len} entries, wanted index {index}")]
    OutOfRange { index: usize, len: usize },

    #[error("x5c entry {index} is not a string")]
    BadEntry { index: usize },

    #[error("x5c entry {index} is not valid base64: {detail}")]
    Base64 { index: usize, detail: String },
}

impl SignedToken {
    /// DER bytes of the `x5c` chain entry at `index` (0 = leaf).
    pub fn chain_certificate(&self, index: usize) -> Result<Vec<u8>, X5cError> {
        let Some(x5c) = self.header.x5c.as_ref() else {
            return Err(X5cError::Missing);
        };

        let Some(entries) = x5c.as_array() else {
            return Err(X5cError::NotAnArray);
        };

        let Some(entry) = entries.get(index) else {
            return Err(X5cError::OutOfRange {
                index,
                len: entries.len(),
            });
        };

        let Some(encoded) = entry.as_str() else {
            return Err(X5cError::BadEntry { index });
        };

        STANDARD.decode(encoded).map_err(|e| X5cError::Base64 {
            index,
            detail: e.to_string(),
        })
    }
}
