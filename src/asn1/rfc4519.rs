// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Directory attribute type OIDs from RFC 4519 (and X.520).
//!
//! Only the attribute types consumed when rendering signer identities are
//! defined here.

use bcder::{ConstOid, Oid};

/// Common Name (CN)
///
/// 2.5.4.3
pub const OID_COMMON_NAME: ConstOid = Oid(&[85, 4, 3]);

/// Surname (SN)
///
/// 2.5.4.4
pub const OID_SURNAME: ConstOid = Oid(&[85, 4, 4]);

/// Serial Number
///
/// 2.5.4.5
///
/// On qualified signature certificates this carries the personal
/// identifier (e.g. the Italian fiscal code), not the certificate serial.
pub const OID_SERIAL_NUMBER: ConstOid = Oid(&[85, 4, 5]);

/// Country Name (C)
///
/// 2.5.4.6
pub const OID_COUNTRY_NAME: ConstOid = Oid(&[85, 4, 6]);

/// Locality Name (L)
///
/// 2.5.4.7
pub const OID_LOCALITY_NAME: ConstOid = Oid(&[85, 4, 7]);

/// State or Province Name (ST)
///
/// 2.5.4.8
pub const OID_STATE_PROVINCE_NAME: ConstOid = Oid(&[85, 4, 8]);

/// Organization Name (O)
///
/// 2.5.4.10
pub const OID_ORGANIZATION_NAME: ConstOid = Oid(&[85, 4, 10]);

/// Organizational Unit Name (OU)
///
/// 2.5.4.11
pub const OID_ORGANIZATIONAL_UNIT_NAME: ConstOid = Oid(&[85, 4, 11]);

/// Given Name (GN)
///
/// 2.5.4.42
pub const OID_GIVEN_NAME: ConstOid = Oid(&[85, 4, 42]);

/// DN Qualifier
///
/// 2.5.4.46
pub const OID_DN_QUALIFIER: ConstOid = Oid(&[85, 4, 46]);

/// Organization Identifier
///
/// 2.5.4.97
pub const OID_ORGANIZATION_IDENTIFIER: ConstOid = Oid(&[85, 4, 97]);
