/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Optional serde support: a [`Mime`] serializes as its serialized form, as
//! a string when that form is UTF-8 and as raw bytes otherwise.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::mime_type::Mime;

impl Serialize for Mime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let serialized = self.serialize();
        match std::str::from_utf8(&serialized) {
            Ok(string) => serializer.serialize_str(string),
            Err(_) => serializer.serialize_bytes(&serialized),
        }
    }
}

impl<'de> Deserialize<'de> for Mime {
    fn deserialize<D>(deserializer: D) -> Result<Mime, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MimeVisitor;

        impl<'de> Visitor<'de> for MimeVisitor {
            type Value = Mime;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid MIME type")
            }

            fn visit_str<E>(self, value: &str) -> Result<Mime, E>
            where
                E: de::Error,
            {
                crate::parse(value.as_bytes()).ok_or_else(|| E::custom("invalid MIME type"))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Mime, E>
            where
                E: de::Error,
            {
                crate::parse(value).ok_or_else(|| E::custom("invalid MIME type"))
            }
        }

        deserializer.deserialize_str(MimeVisitor)
    }
}
