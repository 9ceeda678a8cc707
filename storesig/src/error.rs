// Copyright (c) Storesig Contributors.
// Licensed under the MIT License.

use storesig_common::{TokenParseError, X5cError};
use storesig_validation::SignatureError;
use storesig_x509::ChainError;

/// A decode failure, tagged by the pipeline stage that rejected the input.
///
/// Every variant is terminal for the decode call: these are deterministic
/// structural or cryptographic failures, not transient faults, so nothing is
/// retried. Callers match on the variant to report the failing stage.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The compact token string itself was malformed.
    #[error(transparent)]
    Token(#[from] TokenParseError),

    /// The certificate chain could not be extracted from the token header.
    #[error(transparent)]
    ChainHeader(#[from] X5cError),

    /// The embedded certificate chain failed trust validation.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The token signature failed verification under the chain leaf.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// An embedded transaction or renewal token failed its own pipeline.
    #[error("embedded {field} token failed verification: {source}")]
    Nested {
        /// Claim field the embedded token came from.
        field: &'static str,
        source: Box<DecodeError>,
    },
}
