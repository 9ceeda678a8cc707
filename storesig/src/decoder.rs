// Copyright (c) Storesig Contributors.
// Licensed under the MIT License.

//! The notification decode pipeline.
//!
//! One decode is a strictly sequential chain: parse the outer token, validate
//! its embedded certificate chain against the trust anchor, verify the token
//! signature under the chain leaf, then branch on notification kind. Test
//! notifications terminate immediately; production notifications run the same
//! pipeline recursively over the embedded transaction and renewal tokens,
//! each with its own embedded chain.
//!
//! The pipeline is a pure function of its inputs: every call builds a fresh
//! result, and nothing is shared between calls.

use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::debug;

use storesig_common::{parse_signed_token, SignedToken, TokenParseError};
use storesig_validation::{verify_token_signature, JwsAlgorithm};
use storesig_x509::{trust_anchor_from_pem, verify_chain};

use crate::{DecodeError, DecodeOptions};

/// Notification-kind claim value marking a sandbox connectivity test.
const TEST_NOTIFICATION_TYPE: &str = "TEST";

const CLAIM_NOTIFICATION_TYPE: &str = "notificationType";
const CLAIM_DATA: &str = "data";
const CLAIM_TRANSACTION_INFO: &str = "signedTransactionInfo";
const CLAIM_RENEWAL_INFO: &str = "signedRenewalInfo";

/// Number of certificates a token header must embed: leaf, intermediate, root.
const CHAIN_LEN: usize = 3;

/// A fully verified, decoded notification.
///
/// Constructed fresh per decode call and immutable afterwards. Successful
/// decodes always have `is_valid` set; a failed decode returns an error and
/// never exposes claims.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedNotification {
    /// True: every chain and signature check passed.
    pub is_valid: bool,
    /// True when the notification is a sandbox connectivity test.
    pub is_test: bool,
    /// Claims of the outer token.
    pub payload: Map<String, Value>,
    /// Claims of the embedded transaction token, when present.
    pub transaction_info: Option<Map<String, Value>>,
    /// Claims of the embedded renewal token, when present.
    pub renewal_info: Option<Map<String, Value>>,
}

/// Decode and verify a signed notification against a PEM root certificate.
pub fn decode_notification(signed_payload: &str, root_cert_pem: &str) -> Result<DecodedNotification, DecodeError> {
    decode_notification_with_options(signed_payload, root_cert_pem, &DecodeOptions::default())
}

/// Decode and verify a signed notification with explicit options.
pub fn decode_notification_with_options(
    signed_payload: &str,
    root_cert_pem: &str,
    options: &DecodeOptions,
) -> Result<DecodedNotification, DecodeError> {
    let trust_anchor = trust_anchor_from_pem(root_cert_pem)?;
    let at = options.validation_time.unwrap_or_else(OffsetDateTime::now_utc);

    let outer = verify_token(signed_payload, &trust_anchor, at)?;
    let payload = outer.claims;

    let kind = payload.get(CLAIM_NOTIFICATION_TYPE).and_then(Value::as_str);
    if kind == Some(TEST_NOTIFICATION_TYPE) {
        // Test notifications carry no purchase data; embedded tokens are not
        // expected and not parsed.
        debug!("decoded test notification");
        return Ok(DecodedNotification {
            is_valid: true,
            is_test: true,
            payload,
            transaction_info: None,
            renewal_info: None,
        });
    }

    // Fixed order keeps error attribution deterministic when both embedded
    // tokens are bad.
    let transaction_info = decode_embedded(&payload, CLAIM_TRANSACTION_INFO, &trust_anchor, at)?;
    let renewal_info = decode_embedded(&payload, CLAIM_RENEWAL_INFO, &trust_anchor, at)?;

    debug!(
        notification_type = kind.unwrap_or("<none>"),
        has_transaction_info = transaction_info.is_some(),
        has_renewal_info = renewal_info.is_some(),
        "decoded production notification"
    );

    Ok(DecodedNotification {
        is_valid: true,
        is_test: false,
        payload,
        transaction_info,
        renewal_info,
    })
}

/// Run the full verify pipeline over one token string.
fn verify_token(token: &str, trust_anchor: &[u8], at: OffsetDateTime) -> Result<SignedToken, DecodeError> {
    let token = parse_signed_token(token)?;

    let mut chain = Vec::with_capacity(CHAIN_LEN);
    for index in 0..CHAIN_LEN {
        chain.push(token.chain_certificate(index)?);
    }

    verify_chain(&chain, trust_anchor, at)?;

    // Only a trust-validated leaf key may check the signature.
    let alg = JwsAlgorithm::from_header(&token.header.alg)?;
    verify_token_signature(&token.signing_input, &token.signature, &chain[0], alg)?;

    Ok(token)
}

/// Verify and decode an embedded token named by `field` under `data`.
///
/// Absent fields are not an error (a production notification without purchase
/// data is still valid); a present-but-unverifiable token fails the whole
/// decode.
fn decode_embedded(
    payload: &Map<String, Value>,
    field: &'static str,
    trust_anchor: &[u8],
    at: OffsetDateTime,
) -> Result<Option<Map<String, Value>>, DecodeError> {
    let Some(value) = payload
        .get(CLAIM_DATA)
        .and_then(Value::as_object)
        .and_then(|data| data.get(field))
    else {
        return Ok(None);
    };

    let wrap = |source: DecodeError| DecodeError::Nested {
        field,
        source: Box::new(source),
    };

    let Some(token) = value.as_str() else {
        return Err(wrap(TokenParseError::NotAString.into()));
    };

    // Embedded tokens carry their own chains; nothing from the outer token is
    // reused.
    let verified = verify_token(token, trust_anchor, at).map_err(wrap)?;
    Ok(Some(verified.claims))
}
