// Copyright (c) Storesig Contributors.
// Licensed under the MIT License.

//! Per-algorithm signature verification for compact signed tokens.
//!
//! The algorithm comes from the token header and is matched against a closed
//! set. Unknown identifiers — including `none` and the HMAC family — are
//! rejected outright; there is no fallback scheme.

use rsa::pkcs1v15;
use rsa::pkcs8::DecodePublicKey as _;
use rsa::pss;
use rsa::RsaPublicKey;
use sha2::Sha256;
use signature::Verifier as _;

use p256::elliptic_curve::sec1::ToEncodedPoint as _;

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("unsupported signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    /// The signing certificate or its public key could not be decoded.
    #[error("{0}")]
    Key(String),

    #[error("token signature does not verify under the signing certificate")]
    Mismatch,
}

/// Accepted token signing algorithms (RFC 7518 identifiers).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum JwsAlgorithm {
    /// ECDSA w/ SHA-256 over P-256.
    ES256,
    /// ECDSA w/ SHA-384 over P-384.
    ES384,
    /// ECDSA w/ SHA-512 over P-521.
    ES512,
    /// RSASSA-PKCS1v1.5 w/ SHA-256.
    RS256,
    /// RSASSA-PSS w/ SHA-256.
    PS256,
}

impl JwsAlgorithm {
    /// Resolve a header `alg` value. Identifiers are matched exactly.
    pub fn from_header(alg: &str) -> Result<Self, SignatureError> {
        match alg {
            "ES256" => Ok(Self::ES256),
            "ES384" => Ok(Self::ES384),
            "ES512" => Ok(Self::ES512),
            "RS256" => Ok(Self::RS256),
            "PS256" => Ok(Self::PS256),
            _ => Err(SignatureError::UnsupportedAlgorithm(alg.to_string())),
        }
    }
}

/// Verify a token signature against the signing certificate's public key.
///
/// `signing_cert_der` must be the leaf of a chain that already passed trust
/// validation. `signing_input` is the exact transport bytes the issuer
/// signed; `signature` is the raw bytes of the token's third segment.
pub fn verify_token_signature(
    signing_input: &[u8],
    signature: &[u8],
    signing_cert_der: &[u8],
    alg: JwsAlgorithm,
) -> Result<(), SignatureError> {
    let spki = spki_der_from_cert(signing_cert_der)?;

    match alg {
        JwsAlgorithm::ES256 => verify_ecdsa_p256(&spki, signing_input, signature),
        JwsAlgorithm::ES384 => verify_ecdsa_p384(&spki, signing_input, signature),
        JwsAlgorithm::ES512 => verify_ecdsa_p521(&spki, signing_input, signature),
        JwsAlgorithm::RS256 => verify_rsa_pkcs1(&spki, signing_input, signature),
        JwsAlgorithm::PS256 => verify_rsa_pss(&spki, signing_input, signature),
    }
}

/// Extract the SubjectPublicKeyInfo DER from a certificate.
fn spki_der_from_cert(der: &[u8]) -> Result<Vec<u8>, SignatureError> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| SignatureError::Key(format!("bad signing certificate: {e}")))?;
    Ok(cert.tbs_certificate.subject_pki.raw.to_vec())
}

/// Verify ES256 (P-256 ECDSA).
///
/// Token signatures carry ECDSA as the fixed-width `r || s` concatenation,
/// not DER.
fn verify_ecdsa_p256(spki: &[u8], msg: &[u8], sig: &[u8]) -> Result<(), SignatureError> {
    let pk = p256::PublicKey::from_public_key_der(spki)
        .map_err(|e| SignatureError::Key(format!("bad P-256 public key: {e}")))?;
    let ep = pk.to_encoded_point(false);
    let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
        .map_err(|e| SignatureError::Key(format!("bad P-256 public key: {e}")))?;
    let signature = p256::ecdsa::Signature::from_slice(sig).map_err(|_| SignatureError::Mismatch)?;
    vk.verify(msg, &signature).map_err(|_| SignatureError::Mismatch)
}

/// Verify ES384 (P-384 ECDSA).
fn verify_ecdsa_p384(spki: &[u8], msg: &[u8], sig: &[u8]) -> Result<(), SignatureError> {
    let pk = p384::PublicKey::from_public_key_der(spki)
        .map_err(|e| SignatureError::Key(format!("bad P-384 public key: {e}")))?;
    let ep = pk.to_encoded_point(false);
    let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
        .map_err(|e| SignatureError::Key(format!("bad P-384 public key: {e}")))?;
    let signature = p384::ecdsa::Signature::from_slice(sig).map_err(|_| SignatureError::Mismatch)?;
    vk.verify(msg, &signature).map_err(|_| SignatureError::Mismatch)
}

/// Verify ES512 (P-521 ECDSA).
fn verify_ecdsa_p521(spki: &[u8], msg: &[u8], sig: &[u8]) -> Result<(), SignatureError> {
    let pk = p521::PublicKey::from_public_key_der(spki)
        .map_err(|e| SignatureError::Key(format!("bad P-521 public key: {e}")))?;
    let ep = pk.to_encoded_point(false);
    let vk = p521::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
        .map_err(|e| SignatureError::Key(format!("bad P-521 public key: {e}")))?;
    let signature = p521::ecdsa::Signature::from_slice(sig).map_err(|_| SignatureError::Mismatch)?;
    vk.verify(msg, &signature).map_err(|_| SignatureError::Mismatch)
}

/// Decode an RSA public key from SPKI DER.
fn rsa_public_key(spki: &[u8]) -> Result<RsaPublicKey, SignatureError> {
    RsaPublicKey::from_public_key_der(spki).map_err(|e| SignatureError::Key(format!("bad RSA public key: {e}")))
}

/// Verify RS256 (RSASSA-PKCS1v1.5 + SHA-256).
fn verify_rsa_pkcs1(spki: &[u8], msg: &[u8], sig: &[u8]) -> Result<(), SignatureError> {
    let key = rsa_public_key(spki)?;
    let vk = pkcs1v15::VerifyingKey::<Sha256>::new(key);
    let signature = pkcs1v15::Signature::try_from(sig).map_err(|_| SignatureError::Mismatch)?;
    vk.verify(msg, &signature).map_err(|_| SignatureError::Mismatch)
}

/// Verify PS256 (RSASSA-PSS + SHA-256).
fn verify_rsa_pss(spki: &[u8], msg: &[u8], sig: &[u8]) -> Result<(), SignatureError> {
    let key = rsa_public_key(spki)?;
    let vk = pss::VerifyingKey::<Sha256>::new(key);
    let signature = pss::Signature::try_from(sig).map_err(|_| SignatureError::Mismatch)?;
    vk.verify(msg, &signature).map_err(|_| SignatureError::Mismatch)
}
