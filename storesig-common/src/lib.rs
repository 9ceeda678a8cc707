// Copyright (c) Storesig Contributors.
// Licensed under the MIT License.

//! Shared codec for the storesig crates.
//!
//! This crate parses the compact signed-token wire format (three unpadded
//! base64url segments joined by `.`) into structured fields, and extracts DER
//! certificates from the header's embedded `x5c` chain. It is purely
//! structural: no signature or trust decision is made here.

mod signed_token;
mod x5c_header;

pub use signed_token::{parse_signed_token, SignedToken, TokenHeader, TokenParseError};
pub use x5c_header::X5cError;
