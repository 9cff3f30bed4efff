// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end inspection tests over envelopes built with the crate's own
//! ASN.1 encoders.

use {
    bcder::{
        encode::{PrimitiveContent, Values},
        BitString, Captured, ConstOid, Integer, Mode, OctetString, Oid,
    },
    bytes::Bytes,
    chrono::{DateTime, TimeZone, Utc},
    cms_envelope_inspector::{
        asn1::{
            common::Time,
            rfc3280::Name,
            rfc4519::{
                OID_COMMON_NAME, OID_COUNTRY_NAME, OID_DN_QUALIFIER, OID_GIVEN_NAME,
                OID_ORGANIZATION_NAME, OID_SERIAL_NUMBER, OID_SURNAME,
            },
            rfc5280::{
                AlgorithmIdentifier, Certificate, SubjectPublicKeyInfo, TbsCertificate, Validity,
                Version,
            },
            rfc5652::{
                Attribute, AttributeValue, CertificateChoices, CertificateSet, CmsVersion,
                ContentInfo, DigestAlgorithmIdentifiers, EncapsulatedContentInfo,
                IssuerAndSerialNumber, SignedAttributes, SignedData, SignerIdentifier, SignerInfo,
                SignerInfos, OID_ID_DATA, OID_ID_SIGNED_DATA, OID_SIGNING_TIME,
            },
        },
        inspect_envelope, try_inspect_envelope, CmsError, SignerError, MAX_ENVELOPE_DEPTH,
    },
};

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .unwrap()
}

fn name(attrs: &[(ConstOid, &str)]) -> Name {
    let mut name = Name::default();

    for (oid, value) in attrs {
        name.append_utf8_string(Oid(Bytes::copy_from_slice(oid.as_ref())), value)
            .unwrap();
    }

    name
}

fn issuer_name() -> Name {
    name(&[
        (OID_COMMON_NAME, "Example Qualified CA"),
        (OID_ORGANIZATION_NAME, "Example Trust Services"),
        (OID_COUNTRY_NAME, "IT"),
    ])
}

/// sha256 (2.16.840.1.101.3.4.2.1)
fn digest_algorithm() -> AlgorithmIdentifier {
    AlgorithmIdentifier {
        algorithm: Oid(Bytes::from_static(&[96, 134, 72, 1, 101, 3, 4, 2, 1])),
        parameters: None,
    }
}

/// sha256WithRSAEncryption (1.2.840.113549.1.1.11)
fn signature_algorithm() -> AlgorithmIdentifier {
    AlgorithmIdentifier {
        algorithm: Oid(Bytes::from_static(&[42, 134, 72, 134, 247, 13, 1, 1, 11])),
        parameters: None,
    }
}

fn certificate(subject: Name, serial: u64, not_after: DateTime<Utc>) -> Certificate {
    Certificate {
        tbs_certificate: TbsCertificate {
            version: Some(Version::V3),
            serial_number: Integer::from(serial),
            signature: signature_algorithm(),
            issuer: issuer_name(),
            validity: Validity {
                not_before: Time::from(utc(2020, 1, 1, 0, 0, 0)),
                not_after: Time::from(not_after),
            },
            subject,
            subject_public_key_info: SubjectPublicKeyInfo {
                algorithm: signature_algorithm(),
                subject_public_key: BitString::new(0, Bytes::from_static(&[0x42; 32])),
            },
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: None,
        },
        signature_algorithm: signature_algorithm(),
        signature: BitString::new(0, Bytes::from_static(&[0x13; 32])),
    }
}

fn signer(serial: u64, signing_time: Option<DateTime<Utc>>) -> SignerInfo {
    SignerInfo {
        version: CmsVersion::V1,
        sid: SignerIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
            issuer: issuer_name(),
            serial_number: Integer::from(serial),
        }),
        digest_algorithm: digest_algorithm(),
        signed_attributes: signing_time
            .map(|t| SignedAttributes::from(vec![Attribute::signing_time(Time::from(t))])),
        signature_algorithm: signature_algorithm(),
        signature: OctetString::new(Bytes::from_static(&[0x55; 32])),
        unsigned_attributes: None,
    }
}

/// Encode a complete envelope wrapping `payload`.
fn signed_envelope(
    certificates: Vec<Certificate>,
    signers: Vec<SignerInfo>,
    payload: Option<&[u8]>,
) -> Vec<u8> {
    let signed_data = SignedData {
        version: CmsVersion::V1,
        digest_algorithms: DigestAlgorithmIdentifiers(vec![digest_algorithm()]),
        content_info: EncapsulatedContentInfo {
            content_type: Oid(OID_ID_DATA.as_ref().into()),
            content: payload.map(|data| OctetString::new(Bytes::copy_from_slice(data))),
        },
        certificates: if certificates.is_empty() {
            None
        } else {
            Some(CertificateSet::from(
                certificates
                    .into_iter()
                    .map(|cert| CertificateChoices::Certificate(Box::new(cert)))
                    .collect::<Vec<_>>(),
            ))
        },
        crls: None,
        signer_infos: SignerInfos(signers),
    };

    let content_info = ContentInfo {
        content_type: Oid(OID_ID_SIGNED_DATA.as_ref().into()),
        content: Some(Captured::from_values(Mode::Der, signed_data.encode_ref())),
    };

    let mut encoded = Vec::new();
    content_info
        .encode_ref()
        .write_encoded(Mode::Ber, &mut encoded)
        .unwrap();

    encoded
}

fn mario_rossi_subject() -> Name {
    name(&[
        (OID_COMMON_NAME, "ROSSI MARIO"),
        (OID_GIVEN_NAME, "Mario"),
        (OID_SURNAME, "Rossi"),
        (OID_SERIAL_NUMBER, "TINIT-MRORSS80A01H501U"),
    ])
}

#[test]
fn single_signature_metadata() {
    let signing_time = utc(2024, 5, 3, 10, 30, 0);
    let expires = utc(2030, 6, 1, 12, 0, 0);

    let data = signed_envelope(
        vec![certificate(mario_rossi_subject(), 42, expires)],
        vec![signer(42, Some(signing_time))],
        Some(b"the document"),
    );

    let records = inspect_envelope(&data);
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.signer_index, 1);
    assert_eq!(record.envelope_level, 1);
    assert_eq!(record.signer_name, "Mario Rossi");
    assert_eq!(record.signer_identifier, "TINIT-MRORSS80A01H501U");
    assert_eq!(record.not_after, Some(expires));
    assert_eq!(
        record.issuer,
        "CN=Example Qualified CA, O=Example Trust Services, C=IT"
    );
    assert_eq!(record.signing_time, Some(signing_time));
    assert_eq!(record.error, None);
}

#[test]
fn identity_fallbacks() {
    let subject = name(&[
        (OID_COMMON_NAME, "ACME Signing Service"),
        (OID_DN_QUALIFIER, "2024-001"),
    ]);

    let data = signed_envelope(
        vec![certificate(subject, 7, utc(2031, 1, 1, 0, 0, 0))],
        vec![signer(7, None)],
        Some(b"payload"),
    );

    let records = inspect_envelope(&data);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].signer_name, "ACME Signing Service");
    assert_eq!(records[0].signer_identifier, "2024-001");
    assert_eq!(records[0].signing_time, None);
    assert_eq!(records[0].error, None);
}

#[test]
fn signer_without_matching_certificate() {
    let signing_time = utc(2024, 5, 3, 10, 30, 0);

    let data = signed_envelope(
        vec![certificate(mario_rossi_subject(), 42, utc(2030, 1, 1, 0, 0, 0))],
        vec![signer(99, Some(signing_time))],
        Some(b"payload"),
    );

    let records = inspect_envelope(&data);
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.error, Some(SignerError::CertificateNotFound));
    assert_eq!(record.signer_name, "");
    assert_eq!(record.signer_identifier, "");
    assert_eq!(record.issuer, "");
    assert_eq!(record.not_after, None);
    // The signing time comes from the SignerInfo itself and is still known.
    assert_eq!(record.signing_time, Some(signing_time));
}

#[test]
fn subject_key_identifier_signer_is_reported_unsupported() {
    let mut unsupported = signer(42, None);
    unsupported.sid =
        SignerIdentifier::SubjectKeyIdentifier(OctetString::new(Bytes::from_static(&[0xab; 20])));

    let data = signed_envelope(
        vec![certificate(mario_rossi_subject(), 42, utc(2030, 1, 1, 0, 0, 0))],
        vec![unsupported],
        Some(b"payload"),
    );

    let records = inspect_envelope(&data);
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].error,
        Some(SignerError::UnsupportedSignerIdentification)
    );
    assert_eq!(records[0].signer_name, "");
}

#[test]
fn nested_envelopes_are_walked_outermost_first() {
    let anna = name(&[
        (OID_GIVEN_NAME, "Anna"),
        (OID_SURNAME, "Bianchi"),
        (OID_SERIAL_NUMBER, "TINIT-BNCNNA85M41F205X"),
    ]);
    let carlo = name(&[(OID_GIVEN_NAME, "Carlo"), (OID_SURNAME, "Verdi")]);

    let inner = signed_envelope(
        vec![
            certificate(anna, 10, utc(2030, 1, 1, 0, 0, 0)),
            certificate(carlo, 11, utc(2030, 1, 1, 0, 0, 0)),
        ],
        vec![
            signer(10, Some(utc(2024, 1, 10, 9, 0, 0))),
            signer(11, Some(utc(2024, 1, 11, 9, 0, 0))),
        ],
        Some(b"the actual document"),
    );

    let outer = signed_envelope(
        vec![certificate(mario_rossi_subject(), 42, utc(2030, 1, 1, 0, 0, 0))],
        vec![signer(42, Some(utc(2024, 2, 1, 9, 0, 0)))],
        Some(&inner),
    );

    let records = inspect_envelope(&outer);
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].envelope_level, 1);
    assert_eq!(records[0].signer_index, 1);
    assert_eq!(records[0].signer_name, "Mario Rossi");

    assert_eq!(records[1].envelope_level, 2);
    assert_eq!(records[1].signer_index, 1);
    assert_eq!(records[1].signer_name, "Anna Bianchi");

    assert_eq!(records[2].envelope_level, 2);
    assert_eq!(records[2].signer_index, 2);
    assert_eq!(records[2].signer_name, "Carlo Verdi");
}

#[test]
fn detached_envelope_yields_its_signers_only() {
    let data = signed_envelope(
        vec![certificate(mario_rossi_subject(), 42, utc(2030, 1, 1, 0, 0, 0))],
        vec![signer(42, None)],
        None,
    );

    let records = inspect_envelope(&data);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].envelope_level, 1);
}

#[test]
fn malformed_signing_time_is_tolerated() {
    let mut bad_attr = signer(42, None);
    bad_attr.signed_attributes = Some(SignedAttributes::from(vec![Attribute {
        typ: Oid(OID_SIGNING_TIME.as_ref().into()),
        // An OID where a Time is expected.
        values: vec![AttributeValue::new(Captured::from_values(
            Mode::Der,
            Oid(Bytes::copy_from_slice(OID_ID_DATA.as_ref())).encode(),
        ))],
    }]));

    let data = signed_envelope(
        vec![certificate(mario_rossi_subject(), 42, utc(2030, 1, 1, 0, 0, 0))],
        vec![bad_attr],
        Some(b"payload"),
    );

    let records = inspect_envelope(&data);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].signing_time, None);
    assert_eq!(records[0].error, None);
    assert_eq!(records[0].signer_name, "Mario Rossi");
}

#[test]
fn non_cms_input_yields_nothing() {
    assert!(inspect_envelope(b"definitely not BER").is_empty());

    assert!(matches!(
        try_inspect_envelope(b"definitely not BER", MAX_ENVELOPE_DEPTH),
        Err(CmsError::Decode(_))
    ));
}

#[test]
fn foreign_content_type_yields_nothing() {
    let content_info = ContentInfo {
        content_type: Oid(OID_ID_DATA.as_ref().into()),
        content: Some(Captured::from_values(
            Mode::Der,
            OctetString::new(Bytes::from_static(b"plain data")).encode(),
        )),
    };

    let mut encoded = Vec::new();
    content_info
        .encode_ref()
        .write_encoded(Mode::Ber, &mut encoded)
        .unwrap();

    assert!(inspect_envelope(&encoded).is_empty());

    assert!(matches!(
        try_inspect_envelope(&encoded, MAX_ENVELOPE_DEPTH),
        Err(CmsError::UnsupportedContentType(_))
    ));
}

#[test]
fn inspection_is_idempotent() {
    let data = signed_envelope(
        vec![certificate(mario_rossi_subject(), 42, utc(2030, 1, 1, 0, 0, 0))],
        vec![signer(42, Some(utc(2024, 5, 3, 10, 30, 0)))],
        Some(b"payload"),
    );

    assert_eq!(inspect_envelope(&data), inspect_envelope(&data));
}

#[test]
fn nesting_depth_is_capped() {
    let mut data = signed_envelope(
        vec![certificate(mario_rossi_subject(), 42, utc(2030, 1, 1, 0, 0, 0))],
        vec![signer(42, None)],
        Some(b"payload"),
    );

    for _ in 0..11 {
        data = signed_envelope(
            vec![certificate(mario_rossi_subject(), 42, utc(2030, 1, 1, 0, 0, 0))],
            vec![signer(42, None)],
            Some(&data),
        );
    }

    // 12 nested envelopes, one signer each.
    assert_eq!(inspect_envelope(&data).len(), 12);

    assert!(matches!(
        try_inspect_envelope(&data, 8),
        Err(CmsError::DepthExceeded(8))
    ));
}

#[test]
fn nesting_exactly_at_the_cap_is_walked_fully() {
    let mut data = signed_envelope(
        vec![certificate(mario_rossi_subject(), 42, utc(2030, 1, 1, 0, 0, 0))],
        vec![signer(42, None)],
        Some(b"payload"),
    );

    for _ in 0..2 {
        data = signed_envelope(
            vec![certificate(mario_rossi_subject(), 42, utc(2030, 1, 1, 0, 0, 0))],
            vec![signer(42, None)],
            Some(&data),
        );
    }

    // 3 envelopes around a plain payload do not exceed a cap of 3.
    let records = try_inspect_envelope(&data, 3).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].envelope_level, 3);
}
