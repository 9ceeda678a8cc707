// Copyright (c) Storesig Contributors.
// Licensed under the MIT License.

//! Shared helpers for `storesig` integration tests.
//!
//! Builds a three-certificate PKI with `rcgen` (root CA, intermediate CA,
//! end-entity signer) and mints real ES256-signed notification tokens whose
//! headers embed the chain. Validity windows are pinned around the current
//! time so the pipeline tests stay deterministic.

#![allow(dead_code)]

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use p256::pkcs8::DecodePrivateKey as _;
use rcgen::{BasicConstraints, Certificate, CertificateParams, DnType, IsCa, KeyPair, KeyUsagePurpose};
use signature::Signer as _;
use time::{Duration, OffsetDateTime};

pub(crate) struct TestPki {
    pub(crate) root_pem: String,
    pub(crate) root_der: Vec<u8>,
    pub(crate) intermediate_der: Vec<u8>,
    pub(crate) leaf_der: Vec<u8>,
    pub(crate) leaf_key: p256::ecdsa::SigningKey,
    intermediate: Certificate,
    intermediate_key: KeyPair,
}

/// A signing identity: an end-entity key plus the `x5c` entries for its chain.
pub(crate) struct LeafSigner {
    pub(crate) x5c: Vec<String>,
    pub(crate) key: p256::ecdsa::SigningKey,
}

fn new_key() -> KeyPair {
    KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap()
}

fn ca_params(common_name: &str, not_after: OffsetDateTime) -> CertificateParams {
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name.push(DnType::CommonName, common_name);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
    params.not_before = OffsetDateTime::now_utc() - Duration::days(1);
    params.not_after = not_after;
    params
}

fn leaf_params(common_name: &str, not_after: OffsetDateTime) -> CertificateParams {
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name.push(DnType::CommonName, common_name);
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    params.not_before = OffsetDateTime::now_utc() - Duration::days(1);
    params.not_after = not_after;
    params
}

fn make_pki_with_leaf_expiry(leaf_not_after: OffsetDateTime) -> TestPki {
    let ca_not_after = OffsetDateTime::now_utc() + Duration::days(30);

    let root_key = new_key();
    let root = ca_params("Storesig Test Root CA", ca_not_after).self_signed(&root_key).unwrap();

    let intermediate_key = new_key();
    let intermediate = ca_params("Storesig Test Intermediate CA", ca_not_after)
        .signed_by(&intermediate_key, &root, &root_key)
        .unwrap();

    let leaf_key = new_key();
    let leaf = leaf_params("Storesig Test Signer", leaf_not_after)
        .signed_by(&leaf_key, &intermediate, &intermediate_key)
        .unwrap();

    let signing_key = p256::ecdsa::SigningKey::from_pkcs8_der(&leaf_key.serialize_der()).unwrap();

    TestPki {
        root_pem: root.pem(),
        root_der: root.der().to_vec(),
        intermediate_der: intermediate.der().to_vec(),
        leaf_der: leaf.der().to_vec(),
        leaf_key: signing_key,
        intermediate,
        intermediate_key,
    }
}

pub(crate) fn make_pki() -> TestPki {
    make_pki_with_leaf_expiry(OffsetDateTime::now_utc() + Duration::days(30))
}

/// A PKI whose leaf certificate is already outside its validity window.
pub(crate) fn make_expired_pki() -> TestPki {
    make_pki_with_leaf_expiry(OffsetDateTime::now_utc() - Duration::days(1))
}

/// Issue a further end-entity signer under the PKI's intermediate.
pub(crate) fn issue_signer(pki: &TestPki, common_name: &str) -> LeafSigner {
    let leaf_key = new_key();
    let leaf = leaf_params(common_name, OffsetDateTime::now_utc() + Duration::days(30))
        .signed_by(&leaf_key, &pki.intermediate, &pki.intermediate_key)
        .unwrap();

    LeafSigner {
        x5c: vec![
            STANDARD.encode(leaf.der()),
            STANDARD.encode(&pki.intermediate_der),
            STANDARD.encode(&pki.root_der),
        ],
        key: p256::ecdsa::SigningKey::from_pkcs8_der(&leaf_key.serialize_der()).unwrap(),
    }
}

fn x5c_entries(pki: &TestPki) -> Vec<String> {
    vec![
        STANDARD.encode(&pki.leaf_der),
        STANDARD.encode(&pki.intermediate_der),
        STANDARD.encode(&pki.root_der),
    ]
}

fn encode_and_sign(header: &serde_json::Value, claims: &serde_json::Value, key: &p256::ecdsa::SigningKey) -> String {
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(header).unwrap()),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap()),
    );

    let sig: p256::ecdsa::Signature = key.sign(signing_input.as_bytes());
    format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(sig.to_bytes()))
}

/// Mint an ES256-signed token embedding the PKI's chain in its header.
pub(crate) fn sign_token(claims: &serde_json::Value, pki: &TestPki) -> String {
    let header = serde_json::json!({"alg": "ES256", "x5c": x5c_entries(pki)});
    encode_and_sign(&header, claims, &pki.leaf_key)
}

/// Mint an ES256-signed token under a specific signing identity.
pub(crate) fn sign_token_as(signer: &LeafSigner, claims: &serde_json::Value) -> String {
    let header = serde_json::json!({"alg": "ES256", "x5c": signer.x5c.clone()});
    encode_and_sign(&header, claims, &signer.key)
}

/// Mint a token with an arbitrary `alg` header, a valid chain, and a junk
/// signature. Used to exercise the algorithm gate after chain validation.
pub(crate) fn token_with_alg(alg: &str, claims: &serde_json::Value, pki: &TestPki) -> String {
    let header = serde_json::json!({"alg": alg, "x5c": x5c_entries(pki)});
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap()),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap()),
        URL_SAFE_NO_PAD.encode([0u8; 64]),
    )
}
