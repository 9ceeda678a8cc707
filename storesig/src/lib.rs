// Copyright (c) Storesig Contributors.
// Licensed under the MIT License.

//! Verification and decoding of signed app-store server notifications.
//!
//! A notification arrives as a compact signed token whose header embeds a
//! certificate chain. Decoding validates that chain against a caller-supplied
//! root certificate, verifies the token signature under the chain leaf, and
//! then — for production notifications — runs the same pipeline over the
//! embedded transaction and renewal tokens. A notification is never partially
//! valid: any failure anywhere fails the whole decode, and claims from a
//! failed verification are never exposed.
//!
//! Design note: to keep the public API simple, the member-crate types a
//! caller needs are re-exported at the crate root.

mod decoder;
mod error;
mod options;

pub use decoder::{decode_notification, decode_notification_with_options, DecodedNotification};
pub use error::DecodeError;
pub use options::DecodeOptions;

pub use storesig_common::{parse_signed_token, SignedToken, TokenHeader, TokenParseError, X5cError};
pub use storesig_validation::{verify_token_signature, JwsAlgorithm, SignatureError};
pub use storesig_x509::{trust_anchor_from_pem, verify_chain, ChainError};
