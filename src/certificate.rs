// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level interface to certificates carried by signed envelopes.

use {
    crate::asn1::{
        rfc3280::Name,
        rfc4519::{
            OID_COMMON_NAME, OID_DN_QUALIFIER, OID_GIVEN_NAME, OID_SERIAL_NUMBER, OID_SURNAME,
        },
        rfc5280,
    },
    bcder::{ConstOid, Integer, Oid},
    bytes::Bytes,
    chrono::{DateTime, Utc},
};

/// The string value of the first non-empty attribute with a given type.
///
/// Attributes whose value cannot be coerced to a string are skipped.
fn first_attribute_string(name: &Name, oid: ConstOid) -> Option<String> {
    name.iter_by_oid(Oid(Bytes::copy_from_slice(oid.as_ref())))
        .filter_map(|atv| atv.to_string().ok())
        .find(|value| !value.is_empty())
}

/// An X.509 certificate attached to a signed envelope.
///
/// Wraps the parsed ASN.1 certificate and exposes the metadata the
/// inspection engine reports. No signature or chain validation happens
/// here.
#[derive(Clone, Debug)]
pub struct SignerCertificate(rfc5280::Certificate);

impl SignerCertificate {
    /// Obtain the underlying ASN.1 structure.
    pub fn raw_certificate(&self) -> &rfc5280::Certificate {
        &self.0
    }

    /// The certificate serial number.
    ///
    /// Signers referencing certificates by issuer and serial number are
    /// resolved against this value.
    pub fn serial_number(&self) -> &Integer {
        &self.0.tbs_certificate.serial_number
    }

    pub fn subject(&self) -> &Name {
        &self.0.tbs_certificate.subject
    }

    pub fn issuer(&self) -> &Name {
        &self.0.tbs_certificate.issuer
    }

    /// When the certificate stops being valid.
    pub fn not_after(&self) -> DateTime<Utc> {
        *self.0.tbs_certificate.validity.not_after.as_ref()
    }

    /// Human-readable name of the certificate holder.
    ///
    /// Qualified personal certificates carry givenName and surname; when
    /// both are present the result is `"{given} {surname}"`. Otherwise the
    /// first commonName is used. An empty string means the subject carries
    /// neither.
    pub fn subject_display_name(&self) -> String {
        let subject = self.subject();

        let given = first_attribute_string(subject, OID_GIVEN_NAME);
        let surname = first_attribute_string(subject, OID_SURNAME);

        match (given, surname) {
            (Some(given), Some(surname)) => format!("{} {}", given, surname),
            _ => first_attribute_string(subject, OID_COMMON_NAME).unwrap_or_default(),
        }
    }

    /// Secondary identifier of the certificate holder.
    ///
    /// The subject serialNumber attribute (the fiscal code on Italian
    /// qualified certificates) wins over dnQualifier. Empty when neither
    /// is present.
    pub fn subject_identifier(&self) -> String {
        first_attribute_string(self.subject(), OID_SERIAL_NUMBER)
            .or_else(|| first_attribute_string(self.subject(), OID_DN_QUALIFIER))
            .unwrap_or_default()
    }

    /// The issuer name rendered in RDN order.
    pub fn issuer_display(&self) -> String {
        self.issuer().user_friendly_str()
    }
}

impl From<rfc5280::Certificate> for SignerCertificate {
    fn from(cert: rfc5280::Certificate) -> Self {
        Self(cert)
    }
}
