// Copyright (c) Storesig Contributors.
// Licensed under the MIT License.

use x509_parser::pem::parse_x509_pem;

use crate::chain_verifier::ChainError;

/// Decode a PEM `CERTIFICATE` block into DER bytes.
///
/// Trust anchors arrive out-of-band as the usual `-----BEGIN CERTIFICATE-----`
/// textual encoding; chain validation itself operates on DER.
pub fn trust_anchor_from_pem(pem: &str) -> Result<Vec<u8>, ChainError> {
    let (_, parsed) = parse_x509_pem(pem.as_bytes()).map_err(|e| ChainError::CertificateParse {
        subject: "trust anchor".to_string(),
        detail: format!("invalid PEM: {e:?}"),
    })?;

    if parsed.label != "CERTIFICATE" {
        return Err(ChainError::CertificateParse {
            subject: "trust anchor".to_string(),
            detail: format!("unexpected PEM label '{}'", parsed.label),
        });
    }

    Ok(parsed.contents)
}
