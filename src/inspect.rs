// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The envelope walk: one [SignatureRecord] per signature, outermost
//! envelope first.

use {
    crate::{certificate::SignerCertificate, CmsError, SignedData, SignerIdentity, SignerInfo},
    bytes::Bytes,
    chrono::{DateTime, Utc},
};

/// How many nested envelopes [inspect_envelope] will descend into.
///
/// Real counter-signed documents nest a handful of levels. Anything
/// deeper is hostile input.
pub const MAX_ENVELOPE_DEPTH: usize = 64;

/// Why a signature could not be resolved to a certificate.
///
/// These are per-signature conditions. One unresolvable signer never
/// prevents the others from being reported.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SignerError {
    #[error("signer is identified by subject key identifier, which is not supported")]
    UnsupportedSignerIdentification,

    #[error("no certificate in the envelope matches the signer serial number")]
    CertificateNotFound,
}

/// Descriptive metadata for one signature found in an envelope chain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignatureRecord {
    /// 1-based position of the signer within its envelope.
    pub signer_index: usize,
    /// 1-based nesting level of the envelope; 1 is the outermost.
    pub envelope_level: usize,
    /// Display name of the signer, empty when unresolved.
    pub signer_name: String,
    /// Secondary identifier (fiscal code or DN qualifier), may be empty.
    pub signer_identifier: String,
    /// When the signing certificate expires.
    pub not_after: Option<DateTime<Utc>>,
    /// The certificate issuer, rendered for display.
    pub issuer: String,
    /// The signing time asserted by the signer.
    pub signing_time: Option<DateTime<Utc>>,
    /// Set when the signer could not be resolved; identity fields are
    /// then empty.
    pub error: Option<SignerError>,
}

/// Report every signature in a signed envelope and its nested envelopes.
///
/// Input that is not a decodable signed envelope yields an empty list.
/// This function never panics and never returns an error; diagnostics go
/// to the `log` crate at debug level.
pub fn inspect_envelope(data: &[u8]) -> Vec<SignatureRecord> {
    match try_inspect_envelope(data, MAX_ENVELOPE_DEPTH) {
        Ok(records) => records,
        Err(error) => {
            log::debug!("input is not an inspectable signed envelope: {}", error);
            Vec::new()
        }
    }
}

/// Like [inspect_envelope], but decode problems with the outermost
/// envelope are reported instead of swallowed, and the nesting cap is
/// caller-chosen.
///
/// Nested content that turns out not to be an envelope still just stops
/// the descent; records accumulated so far are returned. A chain of
/// exactly `max_depth` envelopes is within the cap; only an envelope
/// nested below that is [CmsError::DepthExceeded].
pub fn try_inspect_envelope(
    data: &[u8],
    max_depth: usize,
) -> Result<Vec<SignatureRecord>, CmsError> {
    let mut records = Vec::new();
    let mut pending = Some(Bytes::copy_from_slice(data));
    let mut level = 1;

    while let Some(raw) = pending.take() {
        let envelope = match SignedData::parse_ber(raw.as_ref()) {
            Ok(envelope) => envelope,
            Err(error) if level == 1 => return Err(error),
            Err(error) => {
                // Reached the actual document payload.
                log::debug!("level {} content is not an envelope: {}", level, error);
                break;
            }
        };

        // A plain payload at level max_depth + 1 is fine; only another
        // envelope there exceeds the cap.
        if level > max_depth {
            log::warn!("envelopes nested more than {} levels deep", max_depth);
            return Err(CmsError::DepthExceeded(max_depth));
        }

        for (index, signer) in envelope.signers().iter().enumerate() {
            records.push(signature_record(
                index + 1,
                level,
                signer,
                envelope.certificates(),
            ));
        }

        pending = envelope.content().map(Bytes::copy_from_slice);
        level += 1;
    }

    Ok(records)
}

/// Resolve one signer against the envelope's certificates.
///
/// Certificates are matched by serial number alone, first match wins.
fn signature_record(
    signer_index: usize,
    envelope_level: usize,
    signer: &SignerInfo,
    certificates: &[SignerCertificate],
) -> SignatureRecord {
    let mut record = SignatureRecord {
        signer_index,
        envelope_level,
        signer_name: String::new(),
        signer_identifier: String::new(),
        not_after: None,
        issuer: String::new(),
        signing_time: signer.signing_time(),
        error: None,
    };

    match signer.identity() {
        SignerIdentity::SubjectKeyIdentifier => {
            record.error = Some(SignerError::UnsupportedSignerIdentification);
        }
        SignerIdentity::IssuerAndSerial { serial, .. } => {
            match certificates
                .iter()
                .find(|cert| cert.serial_number() == serial)
            {
                Some(cert) => {
                    record.signer_name = cert.subject_display_name();
                    record.signer_identifier = cert.subject_identifier();
                    record.not_after = Some(cert.not_after());
                    record.issuer = cert.issuer_display();
                }
                None => {
                    record.error = Some(SignerError::CertificateNotFound);
                }
            }
        }
    }

    record
}
