// Copyright (c) Storesig Contributors.
// Licensed under the MIT License.

//! Signed-token signature verification.
//!
//! Verifies a token's signature over its signing input using the public key
//! of the chain leaf certificate. The chain must already have been validated
//! by `storesig-x509` — binding the signature to a verified leaf is what
//! stops an attacker-supplied self-signed chain from forging claims.

mod token_verifier;

pub use token_verifier::{verify_token_signature, JwsAlgorithm, SignatureError};
