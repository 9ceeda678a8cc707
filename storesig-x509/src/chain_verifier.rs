// Copyright (c) Storesig Contributors.
// Licensed under the MIT License.

//! Ordered validation of an embedded certificate chain.
//!
//! A chain is `[leaf, intermediate, root]` DER certificates, leaf first.
//! `verify_chain` runs a fixed sequence of checks and stops at the first
//! failure, so the returned error names the earliest stage that rejected the
//! chain: structural parse, validity window, issuer/subject linkage, issuer
//! signatures, trust-anchor termination, CA capability.

use ::time::OffsetDateTime;

use rsa::pkcs1v15;
use rsa::pkcs8::DecodePublicKey as _;
use rsa::RsaPublicKey;
use sha2::{Sha256, Sha384, Sha512};
use signature::Verifier as _;

use p256::elliptic_curve::sec1::ToEncodedPoint as _;
use x509_parser::prelude::*;

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("certificate chain is empty")]
    EmptyChain,

    #[error("{subject}: not a well-formed X.509 certificate: {detail}")]
    CertificateParse { subject: String, detail: String },

    #[error("certificate '{subject}' is outside its validity window")]
    CertificateExpired { subject: String },

    #[error("issuer of '{subject}' does not match the subject of the next chain entry")]
    ChainLinkage { subject: String },

    #[error("signature on '{subject}' does not verify under its issuer's key: {detail}")]
    ChainSignature { subject: String, detail: String },

    #[error("chain root '{subject}' does not terminate at the supplied trust anchor")]
    UntrustedRoot { subject: String },

    #[error("certificate '{subject}' is not marked for certificate-authority use")]
    KeyUsage { subject: String },
}

/// The fields of one chain entry the checks below consume.
#[derive(Debug, Clone)]
struct ParsedCert {
    der: Vec<u8>,
    subject_dn: String,
    issuer_dn: String,
    spki_der: Vec<u8>,
    tbs_der: Vec<u8>,
    signature_oid: String,
    signature: Vec<u8>,
    not_before_unix_seconds: i64,
    not_after_unix_seconds: i64,
    is_ca: bool,
    /// `None` when the certificate carries no key-usage extension.
    key_cert_sign: Option<bool>,
}

fn parse_cert_der(der: &[u8]) -> Result<ParsedCert, String> {
    let (_, cert) = x509_parser::parse_x509_certificate(der).map_err(|e| format!("invalid cert DER: {e}"))?;

    let mut is_ca = false;
    let mut key_cert_sign = None;
    for ext in cert.extensions() {
        match ext.parsed_extension() {
            ParsedExtension::BasicConstraints(bc) => is_ca = bc.ca,
            ParsedExtension::KeyUsage(ku) => key_cert_sign = Some(ku.key_cert_sign()),
            _ => {}
        }
    }

    Ok(ParsedCert {
        der: der.to_vec(),
        subject_dn: cert.tbs_certificate.subject.to_string(),
        issuer_dn: cert.tbs_certificate.issuer.to_string(),
        spki_der: cert.tbs_certificate.subject_pki.raw.to_vec(),
        // `x509-parser` keeps the raw DER for TBSCertificate; expose it via `AsRef`.
        tbs_der: cert.tbs_certificate.as_ref().to_vec(),
        signature_oid: cert.signature_algorithm.algorithm.to_string(),
        signature: cert.signature_value.data.to_vec(),
        not_before_unix_seconds: cert.validity().not_before.timestamp(),
        not_after_unix_seconds: cert.validity().not_after.timestamp(),
        is_ca,
        key_cert_sign,
    })
}

fn rsa_public_key_from_spki(spki_der: &[u8]) -> Result<RsaPublicKey, String> {
    RsaPublicKey::from_public_key_der(spki_der).map_err(|e| format!("bad RSA public key: {e}"))
}

/// Verify one certificate's signature under its issuer's public key.
///
/// X.509 signatures are DER-encoded and computed over the TBSCertificate
/// bytes; the scheme is named by the certificate's signature-algorithm OID.
fn verify_cert_signature(
    issuer_spki_der: &[u8],
    tbs_der: &[u8],
    signature_oid: &str,
    signature: &[u8],
) -> Result<(), String> {
    match signature_oid {
        // sha256WithRSAEncryption / sha384WithRSAEncryption / sha512WithRSAEncryption
        "1.2.840.113549.1.1.11" => {
            let key = rsa_public_key_from_spki(issuer_spki_der)?;
            let vk = pkcs1v15::VerifyingKey::<Sha256>::new(key);
            let sig = pkcs1v15::Signature::try_from(signature).map_err(|e| format!("bad RSA signature bytes: {e}"))?;
            vk.verify(tbs_der, &sig).map_err(|_| "certificate signature verification failed".to_string())
        }
        "1.2.840.113549.1.1.12" => {
            let key = rsa_public_key_from_spki(issuer_spki_der)?;
            let vk = pkcs1v15::VerifyingKey::<Sha384>::new(key);
            let sig = pkcs1v15::Signature::try_from(signature).map_err(|e| format!("bad RSA signature bytes: {e}"))?;
            vk.verify(tbs_der, &sig).map_err(|_| "certificate signature verification failed".to_string())
        }
        "1.2.840.113549.1.1.13" => {
            let key = rsa_public_key_from_spki(issuer_spki_der)?;
            let vk = pkcs1v15::VerifyingKey::<Sha512>::new(key);
            let sig = pkcs1v15::Signature::try_from(signature).map_err(|e| format!("bad RSA signature bytes: {e}"))?;
            vk.verify(tbs_der, &sig).map_err(|_| "certificate signature verification failed".to_string())
        }

        // ecdsa-with-SHA256 / SHA384 / SHA512
        "1.2.840.10045.4.3.2" => {
            let pk = p256::PublicKey::from_public_key_der(issuer_spki_der)
                .map_err(|e| format!("bad P-256 issuer public key: {e}"))?;
            let ep = pk.to_encoded_point(false);
            let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
                .map_err(|e| format!("bad P-256 issuer public key: {e}"))?;
            let sig = p256::ecdsa::Signature::from_der(signature)
                .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
            vk.verify(tbs_der, &sig).map_err(|_| "certificate signature verification failed".to_string())
        }
        "1.2.840.10045.4.3.3" => {
            let pk = p384::PublicKey::from_public_key_der(issuer_spki_der)
                .map_err(|e| format!("bad P-384 issuer public key: {e}"))?;
            let ep = pk.to_encoded_point(false);
            let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
                .map_err(|e| format!("bad P-384 issuer public key: {e}"))?;
            let sig = p384::ecdsa::Signature::from_der(signature)
                .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
            vk.verify(tbs_der, &sig).map_err(|_| "certificate signature verification failed".to_string())
        }
        "1.2.840.10045.4.3.4" => {
            let pk = p521::PublicKey::from_public_key_der(issuer_spki_der)
                .map_err(|e| format!("bad P-521 issuer public key: {e}"))?;
            let ep = pk.to_encoded_point(false);
            let vk = p521::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
                .map_err(|e| format!("bad P-521 issuer public key: {e}"))?;
            let sig = p521::ecdsa::Signature::from_der(signature)
                .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
            vk.verify(tbs_der, &sig).map_err(|_| "certificate signature verification failed".to_string())
        }

        _ => Err(format!("unsupported certificate signature algorithm OID: {signature_oid}")),
    }
}

/// Validate an ordered certificate chain against a caller-supplied anchor.
///
/// `chain` is DER certificates, leaf first. `at` is the instant used for
/// validity-window checks; callers pin it in tests and pass the current time
/// in production. Checks run in a fixed order and the first failure wins.
pub fn verify_chain(chain: &[Vec<u8>], trust_anchor_der: &[u8], at: OffsetDateTime) -> Result<(), ChainError> {
    if chain.is_empty() {
        return Err(ChainError::EmptyChain);
    }

    // Structural parse of every entry and the anchor.
    let mut parsed = Vec::with_capacity(chain.len());
    for (index, der) in chain.iter().enumerate() {
        parsed.push(parse_cert_der(der).map_err(|detail| ChainError::CertificateParse {
            subject: format!("chain[{index}]"),
            detail,
        })?);
    }
    let anchor = parse_cert_der(trust_anchor_der).map_err(|detail| ChainError::CertificateParse {
        subject: "trust anchor".to_string(),
        detail,
    })?;

    // Validity window at the supplied instant.
    let now = at.unix_timestamp();
    for cert in &parsed {
        if now < cert.not_before_unix_seconds || now > cert.not_after_unix_seconds {
            return Err(ChainError::CertificateExpired {
                subject: cert.subject_dn.clone(),
            });
        }
    }

    // Issuer/subject linkage between adjacent entries.
    for pair in parsed.windows(2) {
        if pair[0].issuer_dn != pair[1].subject_dn {
            return Err(ChainError::ChainLinkage {
                subject: pair[0].subject_dn.clone(),
            });
        }
    }

    // Each entry is signed by the next one up.
    for pair in parsed.windows(2) {
        verify_cert_signature(&pair[1].spki_der, &pair[0].tbs_der, &pair[0].signature_oid, &pair[0].signature)
            .map_err(|detail| ChainError::ChainSignature {
                subject: pair[0].subject_dn.clone(),
                detail,
            })?;
    }

    // The chain must terminate at the anchor: an exact DER match, or a root
    // the anchor itself signed.
    let root = parsed.last().unwrap();
    if root.der.as_slice() != trust_anchor_der {
        let signed_by_anchor = root.issuer_dn == anchor.subject_dn
            && verify_cert_signature(&anchor.spki_der, &root.tbs_der, &root.signature_oid, &root.signature).is_ok();
        if !signed_by_anchor {
            return Err(ChainError::UntrustedRoot {
                subject: root.subject_dn.clone(),
            });
        }
    }

    // Every issuing entry must be CA-capable. A key-usage extension, when
    // present, must include keyCertSign.
    for cert in parsed.iter().skip(1) {
        if !cert.is_ca || cert.key_cert_sign == Some(false) {
            return Err(ChainError::KeyUsage {
                subject: cert.subject_dn.clone(),
            });
        }
    }

    Ok(())
}
