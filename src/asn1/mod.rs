// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Low-level ASN.1 structures.
//!
//! The subset of RFC 3280, RFC 4519, RFC 5280, and RFC 5652 needed to pull
//! signer metadata out of signed envelopes, built on the `bcder` crate.

pub mod common;
pub mod rfc3280;
pub mod rfc4519;
pub mod rfc5280;
pub mod rfc5652;
