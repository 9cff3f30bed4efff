// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! X.501 distinguished names, as profiled by RFC 3280.

use {
    crate::asn1::rfc4519::{
        OID_COMMON_NAME, OID_COUNTRY_NAME, OID_DN_QUALIFIER, OID_GIVEN_NAME, OID_LOCALITY_NAME,
        OID_ORGANIZATIONAL_UNIT_NAME, OID_ORGANIZATION_IDENTIFIER, OID_ORGANIZATION_NAME,
        OID_SERIAL_NUMBER, OID_STATE_PROVINCE_NAME, OID_SURNAME,
    },
    bcder::{
        decode::{BytesSource, Constructed, DecodeError, Source},
        encode,
        encode::{PrimitiveContent, Values},
        string::{Ia5String, NumericString, PrintableString, Utf8String},
        Captured, Mode, Oid, Tag,
    },
    std::{
        fmt::{Debug, Formatter},
        io::Write,
        ops::{Deref, DerefMut},
        str::FromStr,
    },
};

/// Short label for a directory attribute type, if it has a customary one.
fn attribute_type_label(typ: &Oid) -> Option<&'static str> {
    if *typ == OID_COMMON_NAME {
        Some("CN")
    } else if *typ == OID_SURNAME {
        Some("SN")
    } else if *typ == OID_SERIAL_NUMBER {
        Some("SERIALNUMBER")
    } else if *typ == OID_COUNTRY_NAME {
        Some("C")
    } else if *typ == OID_LOCALITY_NAME {
        Some("L")
    } else if *typ == OID_STATE_PROVINCE_NAME {
        Some("ST")
    } else if *typ == OID_ORGANIZATION_NAME {
        Some("O")
    } else if *typ == OID_ORGANIZATIONAL_UNIT_NAME {
        Some("OU")
    } else if *typ == OID_GIVEN_NAME {
        Some("GN")
    } else if *typ == OID_DN_QUALIFIER {
        Some("dnQualifier")
    } else if *typ == OID_ORGANIZATION_IDENTIFIER {
        Some("organizationIdentifier")
    } else {
        None
    }
}

/// Directory string.
///
/// ```ASN.1
/// DirectoryString ::= CHOICE {
///       teletexString           TeletexString (SIZE (1..MAX)),
///       printableString         PrintableString (SIZE (1..MAX)),
///       universalString         UniversalString (SIZE (1..MAX)),
///       utf8String              UTF8String (SIZE (1..MAX)),
///       bmpString               BMPString (SIZE (1..MAX)) }
/// ```
///
/// Only the PrintableString and UTF8String alternatives are decoded. They
/// are the only forms RFC 5280 allows new certificates to use.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DirectoryString {
    PrintableString(PrintableString),
    Utf8String(Utf8String),
}

impl DirectoryString {
    pub fn take_from<S: Source>(cons: &mut Constructed<S>) -> Result<Self, DecodeError<S::Error>> {
        cons.take_value(|tag, content| {
            if tag == Tag::PRINTABLE_STRING {
                Ok(Self::PrintableString(PrintableString::from_content(
                    content,
                )?))
            } else if tag == Tag::UTF8_STRING {
                Ok(Self::Utf8String(Utf8String::from_content(content)?))
            } else {
                Err(content
                    .content_err("only decoding of PrintableString and UTF8String is implemented"))
            }
        })
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        match self {
            Self::PrintableString(ps) => (Some(ps.encode_ref()), None),
            Self::Utf8String(s) => (None, Some(s.encode_ref())),
        }
    }
}

impl ToString for DirectoryString {
    fn to_string(&self) -> String {
        match self {
            Self::PrintableString(s) => s.to_string(),
            Self::Utf8String(s) => s.to_string(),
        }
    }
}

impl Values for DirectoryString {
    fn encoded_len(&self, mode: Mode) -> usize {
        self.encode_ref().encoded_len(mode)
    }

    fn write_encoded<W: Write>(&self, mode: Mode, target: &mut W) -> Result<(), std::io::Error> {
        self.encode_ref().write_encoded(mode, target)
    }
}

/// An X.501 name.
///
/// ```ASN.1
/// Name ::= CHOICE { rdnSequence  RDNSequence }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Name {
    RdnSequence(RdnSequence),
}

impl Name {
    pub fn take_from<S: Source>(cons: &mut Constructed<S>) -> Result<Self, DecodeError<S::Error>> {
        Ok(Self::RdnSequence(RdnSequence::take_from(cons)?))
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        match self {
            Self::RdnSequence(seq) => seq.encode_ref(),
        }
    }

    /// Iterate over all attributes in this name, in RDN order.
    pub fn iter_attributes(&self) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.0.iter().flat_map(|rdn| rdn.iter())
    }

    /// Iterate over all attributes having a given OID.
    pub fn iter_by_oid(&self, oid: Oid) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.iter_attributes().filter(move |atv| atv.typ == oid)
    }

    /// Find the first attribute having a given OID.
    pub fn find_attribute(&self, oid: Oid) -> Option<&AttributeTypeAndValue> {
        self.iter_by_oid(oid).next()
    }

    /// Obtain the string value of the first attribute having a given OID.
    pub fn find_first_attribute_string(
        &self,
        oid: Oid,
    ) -> Result<Option<String>, DecodeError<<BytesSource as Source>::Error>> {
        if let Some(atv) = self.find_attribute(oid) {
            Ok(Some(atv.to_string()?))
        } else {
            Ok(None)
        }
    }

    /// Render this name as `TYPE=value` pairs in RDN order.
    ///
    /// Attribute types without a customary short label are printed as
    /// dotted OIDs. Attributes whose value cannot be coerced to a string
    /// are skipped.
    pub fn user_friendly_str(&self) -> String {
        let mut fields = vec![];

        for atv in self.iter_attributes() {
            let value = match atv.to_string() {
                Ok(value) => value,
                Err(_) => continue,
            };

            match attribute_type_label(&atv.typ) {
                Some(label) => fields.push(format!("{}={}", label, value)),
                None => fields.push(format!("{}={}", atv.typ, value)),
            }
        }

        fields.join(", ")
    }

    /// Append a UTF8String attribute, in a new RDN.
    pub fn append_utf8_string(
        &mut self,
        oid: Oid,
        value: &str,
    ) -> Result<(), bcder::string::CharSetError> {
        let mut rdn = RelativeDistinguishedName::default();
        rdn.push(AttributeTypeAndValue::new_utf8_string(oid, value)?);
        self.0.push(rdn);

        Ok(())
    }

    /// Append a PrintableString attribute, in a new RDN.
    pub fn append_printable_string(
        &mut self,
        oid: Oid,
        value: &str,
    ) -> Result<(), bcder::string::CharSetError> {
        let mut rdn = RelativeDistinguishedName::default();
        rdn.push(AttributeTypeAndValue::new_printable_string(oid, value)?);
        self.0.push(rdn);

        Ok(())
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::RdnSequence(RdnSequence::default())
    }
}

impl Deref for Name {
    type Target = RdnSequence;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::RdnSequence(seq) => seq,
        }
    }
}

impl DerefMut for Name {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Self::RdnSequence(seq) => seq,
        }
    }
}

/// ```ASN.1
/// RDNSequence ::= SEQUENCE OF RelativeDistinguishedName
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RdnSequence(Vec<RelativeDistinguishedName>);

impl Deref for RdnSequence {
    type Target = Vec<RelativeDistinguishedName>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for RdnSequence {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl RdnSequence {
    pub fn take_from<S: Source>(cons: &mut Constructed<S>) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut values = Vec::new();

            while let Some(value) = RelativeDistinguishedName::take_opt_from(cons)? {
                values.push(value);
            }

            Ok(Self(values))
        })
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        encode::sequence(&self.0)
    }
}

/// Relative distinguished name.
///
/// ```ASN.1
/// RelativeDistinguishedName ::=
///   SET OF AttributeTypeAndValue
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RelativeDistinguishedName(Vec<AttributeTypeAndValue>);

impl Deref for RelativeDistinguishedName {
    type Target = Vec<AttributeTypeAndValue>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for RelativeDistinguishedName {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl RelativeDistinguishedName {
    pub fn take_opt_from<S: Source>(
        cons: &mut Constructed<S>,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_set(|cons| {
            let mut values = Vec::new();

            while let Some(value) = AttributeTypeAndValue::take_opt_from(cons)? {
                values.push(value);
            }

            Ok(Self(values))
        })
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        encode::set(&self.0)
    }
}

impl Values for RelativeDistinguishedName {
    fn encoded_len(&self, mode: Mode) -> usize {
        self.encode_ref().encoded_len(mode)
    }

    fn write_encoded<W: Write>(&self, mode: Mode, target: &mut W) -> Result<(), std::io::Error> {
        self.encode_ref().write_encoded(mode, target)
    }
}

/// Attribute type and its value.
///
/// ```ASN.1
/// AttributeTypeAndValue ::= SEQUENCE {
///   type     AttributeType,
///   value    AttributeValue }
/// ```
#[derive(Clone)]
pub struct AttributeTypeAndValue {
    pub typ: AttributeType,
    pub value: AttributeValue,
}

impl Debug for AttributeTypeAndValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("AttributeTypeAndValue");
        s.field("type", &format_args!("{}", self.typ));
        s.field("value", &self.value);
        s.finish()
    }
}

impl AttributeTypeAndValue {
    pub fn take_opt_from<S: Source>(
        cons: &mut Constructed<S>,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            let typ = AttributeType::take_from(cons)?;
            let value = cons.capture_all()?;

            Ok(Self {
                typ,
                value: value.into(),
            })
        })
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        encode::sequence((self.typ.encode_ref(), self.value.deref()))
    }

    /// Attempt to coerce the stored value to a Rust string.
    pub fn to_string(&self) -> Result<String, DecodeError<<BytesSource as Source>::Error>> {
        self.value.to_string()
    }

    pub fn new_utf8_string(oid: Oid, s: &str) -> Result<Self, bcder::string::CharSetError> {
        Ok(Self {
            typ: oid,
            value: AttributeValue::new_utf8_string(s)?,
        })
    }

    pub fn new_printable_string(oid: Oid, s: &str) -> Result<Self, bcder::string::CharSetError> {
        Ok(Self {
            typ: oid,
            value: AttributeValue::new_printable_string(s)?,
        })
    }
}

impl PartialEq for AttributeTypeAndValue {
    fn eq(&self, other: &Self) -> bool {
        self.typ == other.typ && self.value.as_slice() == other.value.as_slice()
    }
}

impl Eq for AttributeTypeAndValue {}

impl Values for AttributeTypeAndValue {
    fn encoded_len(&self, mode: Mode) -> usize {
        self.encode_ref().encoded_len(mode)
    }

    fn write_encoded<W: Write>(&self, mode: Mode, target: &mut W) -> Result<(), std::io::Error> {
        self.encode_ref().write_encoded(mode, target)
    }
}

pub type AttributeType = Oid;

/// A captured attribute value of unknown inner type.
#[derive(Clone)]
pub struct AttributeValue(Captured);

impl Debug for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}", hex::encode(self.0.as_slice())))
    }
}

impl AttributeValue {
    pub fn new_utf8_string(s: &str) -> Result<Self, bcder::string::CharSetError> {
        let ds = DirectoryString::Utf8String(Utf8String::from_str(s)?);

        Ok(Self(Captured::from_values(Mode::Der, ds)))
    }

    pub fn new_printable_string(s: &str) -> Result<Self, bcder::string::CharSetError> {
        let ds = DirectoryString::PrintableString(PrintableString::from_str(s)?);

        Ok(Self(Captured::from_values(Mode::Der, ds)))
    }

    /// Attempt to coerce the inner value to a Rust string.
    ///
    /// Several string types are attempted. If none of them matches the
    /// stored value, a decode error occurs.
    pub fn to_string(&self) -> Result<String, DecodeError<<BytesSource as Source>::Error>> {
        self.0.clone().decode(|cons| {
            if let Some(s) = cons.take_opt_value_if(Tag::NUMERIC_STRING, |content| {
                NumericString::from_content(content)
            })? {
                Ok(s.to_string())
            } else if let Some(s) = cons.take_opt_value_if(Tag::IA5_STRING, |content| {
                Ia5String::from_content(content)
            })? {
                Ok(s.to_string())
            } else {
                Ok(DirectoryString::take_from(cons)?.to_string())
            }
        })
    }
}

impl Deref for AttributeValue {
    type Target = Captured;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Captured> for AttributeValue {
    fn from(v: Captured) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_name() -> Name {
        let mut name = Name::default();
        name.append_utf8_string(Oid(OID_GIVEN_NAME.as_ref().into()), "Mario")
            .unwrap();
        name.append_utf8_string(Oid(OID_SURNAME.as_ref().into()), "Rossi")
            .unwrap();
        name.append_printable_string(Oid(OID_COUNTRY_NAME.as_ref().into()), "IT")
            .unwrap();

        name
    }

    #[test]
    fn attribute_lookup() {
        let name = sample_name();

        assert_eq!(
            name.find_first_attribute_string(Oid(OID_SURNAME.as_ref().into()))
                .unwrap(),
            Some("Rossi".to_string())
        );
        assert_eq!(
            name.find_first_attribute_string(Oid(OID_COMMON_NAME.as_ref().into()))
                .unwrap(),
            None
        );
    }

    #[test]
    fn rendering_preserves_rdn_order() {
        let name = sample_name();

        assert_eq!(name.user_friendly_str(), "GN=Mario, SN=Rossi, C=IT");
    }

    #[test]
    fn round_trip() {
        let name = sample_name();

        let captured = Captured::from_values(Mode::Der, name.encode_ref());
        let decoded = captured.decode(|cons| Name::take_from(cons)).unwrap();

        assert_eq!(decoded, name);
    }
}
