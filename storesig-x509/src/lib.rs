// Copyright (c) Storesig Contributors.
// Licensed under the MIT License.

//! X.509 certificate-chain validation for storesig.
//!
//! Tokens embed their certificate chain in the header; this crate validates
//! such a chain against a caller-supplied trust anchor. There is no system
//! trust store, no network fetch, and no revocation checking — the anchor is
//! always provided by the caller, which keeps validation deterministic and
//! testable offline.

mod chain_verifier;
mod trust_anchor;

pub use chain_verifier::{verify_chain, ChainError};
pub use trust_anchor::trust_anchor_from_pem;
