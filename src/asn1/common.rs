// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ASN.1 time types shared by the certificate and CMS structures.

use {
    bcder::{
        decode::{Constructed, DecodeError, Primitive, Source},
        encode::{PrimitiveContent, Values},
        Mode, Tag,
    },
    chrono::{Datelike, TimeZone, Timelike},
    std::{io::Write, ops::Deref},
};

/// A UTCTime or GeneralizedTime.
///
/// ```ASN.1
/// Time ::= CHOICE {
///   utcTime        UTCTime,
///   generalTime    GeneralizedTime }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Time {
    UtcTime(UtcTime),
    GeneralTime(GeneralizedTime),
}

impl Time {
    pub fn take_from<S: Source>(cons: &mut Constructed<S>) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive(|tag, prim| match tag {
            Tag::UTC_TIME => Ok(Self::UtcTime(UtcTime::from_primitive(prim)?)),
            Tag::GENERALIZED_TIME => Ok(Self::GeneralTime(GeneralizedTime::from_primitive(prim)?)),
            _ => Err(prim.content_err("expected UTCTime or GeneralizedTime")),
        })
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        match self {
            Self::UtcTime(utc) => (Some(utc.encode()), None),
            Self::GeneralTime(gt) => (None, Some(gt.encode())),
        }
    }
}

impl AsRef<chrono::DateTime<chrono::Utc>> for Time {
    fn as_ref(&self) -> &chrono::DateTime<chrono::Utc> {
        match self {
            Self::UtcTime(dt) => dt.deref(),
            Self::GeneralTime(dt) => dt.deref(),
        }
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Time {
    fn from(t: chrono::DateTime<chrono::Utc>) -> Self {
        Self::UtcTime(UtcTime(t))
    }
}

impl From<Time> for chrono::DateTime<chrono::Utc> {
    fn from(t: Time) -> Self {
        *t.as_ref()
    }
}

fn parse_datetime(digits: &str, year_digits: usize) -> Option<chrono::DateTime<chrono::Utc>> {
    let year = digits[0..year_digits].parse::<i32>().ok()?;
    let mut fields = [0u32; 5];
    for (i, field) in fields.iter_mut().enumerate() {
        let start = year_digits + i * 2;
        *field = digits[start..start + 2].parse::<u32>().ok()?;
    }

    chrono::Utc
        .with_ymd_and_hms(year, fields[0], fields[1], fields[2], fields[3], fields[4])
        .single()
}

/// GeneralizedTime, restricted to the `YYYYMMDDHHMMSSZ` form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneralizedTime(chrono::DateTime<chrono::Utc>);

impl Deref for GeneralizedTime {
    type Target = chrono::DateTime<chrono::Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl GeneralizedTime {
    pub fn from_primitive<S: Source>(
        prim: &mut Primitive<S>,
    ) -> Result<Self, DecodeError<S::Error>> {
        let data = prim.take_all()?;

        Self::parse(data.as_ref()).ok_or_else(|| prim.content_err("malformed GeneralizedTime"))
    }

    fn parse(data: &[u8]) -> Option<Self> {
        if data.len() != "YYYYMMDDHHMMSSZ".len() || data[14] != b'Z' {
            return None;
        }

        let digits = std::str::from_utf8(&data[0..14]).ok()?;

        parse_datetime(digits, 4).map(Self)
    }
}

impl ToString for GeneralizedTime {
    fn to_string(&self) -> String {
        format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year(),
            self.0.month(),
            self.0.day(),
            self.0.hour(),
            self.0.minute(),
            self.0.second()
        )
    }
}

impl PrimitiveContent for GeneralizedTime {
    const TAG: Tag = Tag::GENERALIZED_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        self.to_string().len()
    }

    fn write_encoded<W: Write>(&self, _: Mode, target: &mut W) -> Result<(), std::io::Error> {
        target.write_all(self.to_string().as_bytes())
    }
}

/// UTCTime, restricted to the `YYMMDDHHMMSSZ` form.
///
/// Two digit years >= 50 are interpreted as 19xx, the rest as 20xx.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UtcTime(pub(crate) chrono::DateTime<chrono::Utc>);

impl UtcTime {
    pub fn from_primitive<S: Source>(
        prim: &mut Primitive<S>,
    ) -> Result<Self, DecodeError<S::Error>> {
        let data = prim.take_all()?;

        Self::parse(data.as_ref()).ok_or_else(|| prim.content_err("malformed UTCTime"))
    }

    fn parse(data: &[u8]) -> Option<Self> {
        if data.len() != "YYMMDDHHMMSSZ".len() || data[12] != b'Z' {
            return None;
        }

        let digits = std::str::from_utf8(&data[0..12]).ok()?;
        let short_year = digits[0..2].parse::<i32>().ok()?;
        let century = if short_year >= 50 { 1900 } else { 2000 };

        let full = format!("{:04}{}", century + short_year, &digits[2..]);

        parse_datetime(&full, 4).map(Self)
    }
}

impl ToString for UtcTime {
    fn to_string(&self) -> String {
        format!(
            "{:02}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year() % 100,
            self.0.month(),
            self.0.day(),
            self.0.hour(),
            self.0.minute(),
            self.0.second()
        )
    }
}

impl Deref for UtcTime {
    type Target = chrono::DateTime<chrono::Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PrimitiveContent for UtcTime {
    const TAG: Tag = Tag::UTC_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        self.to_string().len()
    }

    fn write_encoded<W: Write>(&self, _: Mode, target: &mut W) -> Result<(), std::io::Error> {
        target.write_all(self.to_string().as_bytes())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn utc_time_parse() {
        let parsed = UtcTime::parse(b"240503103000Z").unwrap();
        assert_eq!(
            *parsed,
            chrono::Utc.with_ymd_and_hms(2024, 5, 3, 10, 30, 0).unwrap()
        );

        // Pre-2000 pivot.
        let parsed = UtcTime::parse(b"990101000000Z").unwrap();
        assert_eq!(parsed.year(), 1999);

        assert!(UtcTime::parse(b"2405031030Z").is_none());
        assert!(UtcTime::parse(b"240503103000X").is_none());
        assert!(UtcTime::parse(b"2405aa103000Z").is_none());
    }

    #[test]
    fn generalized_time_parse() {
        let parsed = GeneralizedTime::parse(b"20301231235959Z").unwrap();
        assert_eq!(
            *parsed,
            chrono::Utc.with_ymd_and_hms(2030, 12, 31, 23, 59, 59).unwrap()
        );

        assert!(GeneralizedTime::parse(b"20301331235959Z").is_none());
    }

    #[test]
    fn time_round_trip() {
        let time = Time::from(chrono::Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap());

        let captured = bcder::Captured::from_values(Mode::Der, time.encode_ref());
        let decoded = captured.decode(|cons| Time::take_from(cons)).unwrap();

        assert_eq!(decoded, time);
    }
}
