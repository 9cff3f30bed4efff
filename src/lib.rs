// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Signer metadata inspection for CMS / PKCS#7 signed envelopes.

This crate reads signed envelopes as produced by qualified signature
tools (`.p7m` files, RFC 5652 SignedData) and reports who signed them:
the signer's name and personal identifier from the signing certificate,
the certificate expiry and issuer, and the asserted signing time.
Counter-signatures applied by wrapping an already signed envelope in
another envelope are followed recursively.

Nothing is verified cryptographically. The output describes what the
envelope claims, which is exactly what a file manager style "who signed
this" preview needs, and nothing more.

The main entry point is [inspect_envelope]:

```no_run
let data = std::fs::read("document.pdf.p7m").unwrap();

for record in cms_envelope_inspector::inspect_envelope(&data) {
    println!(
        "level {} signer {}: {}",
        record.envelope_level, record.signer_index, record.signer_name
    );
}
```
*/

pub mod asn1;
pub mod certificate;
pub mod inspect;

pub use crate::{
    certificate::SignerCertificate,
    inspect::{
        inspect_envelope, try_inspect_envelope, SignatureRecord, SignerError, MAX_ENVELOPE_DEPTH,
    },
};

use {
    crate::asn1::{
        common::Time,
        rfc3280::Name,
        rfc5652::{self, OID_ID_SIGNED_DATA, OID_SIGNING_TIME},
    },
    bcder::{Integer, Oid},
    bytes::Bytes,
    chrono::{DateTime, Utc},
    std::ops::Deref,
};

#[derive(Debug, thiserror::Error)]
pub enum CmsError {
    #[error("ASN.1 decode error: {0}")]
    Decode(#[from] bcder::decode::DecodeError<std::convert::Infallible>),

    #[error("content type {0} is not signed-data")]
    UnsupportedContentType(Oid),

    #[error("signed-data wrapper carries no content")]
    MissingContent,

    #[error("envelopes nested more than {0} levels deep")]
    DepthExceeded(usize),
}

/// A parsed signed envelope.
///
/// High-level view over an RFC 5652 SignedData: the attached
/// certificates, one [SignerInfo] per signature, and the encapsulated
/// content (which may itself be another envelope).
#[derive(Clone, Debug)]
pub struct SignedData {
    certificates: Vec<SignerCertificate>,
    signers: Vec<SignerInfo>,
    content: Option<Bytes>,
}

impl SignedData {
    /// Parse a BER encoded signed envelope.
    ///
    /// The input must be a ContentInfo of type id-signedData; anything
    /// else is [CmsError::UnsupportedContentType].
    pub fn parse_ber(data: &[u8]) -> Result<Self, CmsError> {
        Self::from_content_info(&rfc5652::ContentInfo::decode_ber(data)?)
    }

    pub fn from_content_info(content_info: &rfc5652::ContentInfo) -> Result<Self, CmsError> {
        if content_info.content_type != OID_ID_SIGNED_DATA {
            return Err(CmsError::UnsupportedContentType(
                content_info.content_type.clone(),
            ));
        }

        let content = content_info
            .content
            .as_ref()
            .ok_or(CmsError::MissingContent)?;

        let raw = content
            .clone()
            .decode(|cons| rfc5652::SignedData::take_from(cons))?;

        Ok(Self::from(&raw))
    }

    /// Certificates attached to the envelope, in envelope order.
    pub fn certificates(&self) -> &[SignerCertificate] {
        &self.certificates
    }

    /// The envelope's signers, in envelope order.
    pub fn signers(&self) -> &[SignerInfo] {
        &self.signers
    }

    /// The encapsulated content, if the envelope carries any.
    ///
    /// Detached signatures have no content.
    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_ref().map(|content| content.as_ref())
    }
}

impl From<&rfc5652::SignedData> for SignedData {
    fn from(raw: &rfc5652::SignedData) -> Self {
        let certificates = raw
            .certificates
            .as_ref()
            .map(|set| {
                set.iter_certificates()
                    .cloned()
                    .map(SignerCertificate::from)
                    .collect()
            })
            .unwrap_or_default();

        let signers = raw.signer_infos.iter().map(SignerInfo::from).collect();

        let content = raw
            .content_info
            .content
            .as_ref()
            .map(|content| content.to_bytes());

        Self {
            certificates,
            signers,
            content,
        }
    }
}

/// How a signer references its certificate.
#[derive(Clone, Debug)]
pub enum SignerIdentity {
    /// Issuer name plus certificate serial number.
    IssuerAndSerial { issuer: Name, serial: Integer },
    /// Reference by subject key identifier. Not resolved by this crate.
    SubjectKeyIdentifier,
}

/// Metadata for a single signature.
#[derive(Clone, Debug)]
pub struct SignerInfo {
    identity: SignerIdentity,
    signing_time: Option<DateTime<Utc>>,
}

impl SignerInfo {
    pub fn identity(&self) -> &SignerIdentity {
        &self.identity
    }

    /// The instant the signer claims to have signed at, from the
    /// signing-time signed attribute.
    pub fn signing_time(&self) -> Option<DateTime<Utc>> {
        self.signing_time
    }
}

impl From<&rfc5652::SignerInfo> for SignerInfo {
    fn from(info: &rfc5652::SignerInfo) -> Self {
        let identity = match &info.sid {
            rfc5652::SignerIdentifier::IssuerAndSerialNumber(ias) => {
                SignerIdentity::IssuerAndSerial {
                    issuer: ias.issuer.clone(),
                    serial: ias.serial_number.clone(),
                }
            }
            rfc5652::SignerIdentifier::SubjectKeyIdentifier(_) => {
                SignerIdentity::SubjectKeyIdentifier
            }
        };

        let signing_time = info
            .signed_attributes
            .as_ref()
            .and_then(signing_time_from_attributes);

        Self {
            identity,
            signing_time,
        }
    }
}

/// The first value of the signing-time attribute, if present and sound.
///
/// A malformed value is tolerated (logged and ignored). A signer with a
/// bad attribute must not sink inspection of the whole envelope.
fn signing_time_from_attributes(attrs: &rfc5652::SignedAttributes) -> Option<DateTime<Utc>> {
    let attr = attrs.find_attribute(&Oid(OID_SIGNING_TIME.as_ref().into()))?;
    let value = attr.values.first()?;

    match value.deref().clone().decode(|cons| Time::take_from(cons)) {
        Ok(time) => Some(time.into()),
        Err(error) => {
            log::debug!("ignoring malformed signing-time attribute: {}", error);
            None
        }
    }
}
