/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Implementation of the [WHATWG MIME Sniffing Standard](https://mimesniff.spec.whatwg.org/).
//!
//! The crate has two halves:
//!
//! * A [`Mime`] value model with the parsing and serialization rules used for
//!   HTTP `Content-Type` header values: asymmetric case folding (type,
//!   subtype and parameter names fold to ASCII lowercase, parameter values
//!   keep their case), quoted-string parameter values with backslash escapes,
//!   and insertion-ordered parameters where the first occurrence of a name
//!   wins.
//! * Content sniffing: [`sniff_mime_type`] and friends inspect up to
//!   [`RESOURCE_HEADER_LENGTH`] leading bytes of a resource and compute a
//!   media type from byte signatures, container probes (MP4, WebM, MP3) and
//!   the caller-supplied metadata carried by a [`Resource`].
//!
//! Parsing operates on raw bytes, not strings: every byte of the header
//! value is one code unit, and bytes in the 0x80..=0xFF range are legal
//! inside quoted parameter values.
//!
//! ```
//! let mime = mimesniff::parse(b"text/HTML; charset=UTF-8").unwrap();
//! assert_eq!(mime.type_(), "text");
//! assert_eq!(mime.subtype(), "html");
//! assert_eq!(mime.parameters().get("charset"), Some(&b"UTF-8"[..]));
//! assert_eq!(mime.serialize(), b"text/html;charset=UTF-8");
//! ```
//!
//! ```
//! use mimesniff::{determine_supplied_mime_type, sniff_mime_type};
//!
//! let resource = determine_supplied_mime_type(None);
//! let computed = sniff_mime_type(&resource, b"\x89PNG\r\n\x1A\n....");
//! assert_eq!(computed, Some(mimesniff::IMAGE_PNG));
//! ```

#![deny(unsafe_code)]

mod constants;
mod headers;
mod mime_classifier;
mod mime_type;
mod parse;
#[cfg(feature = "serde")]
mod serde_impl;

pub use crate::constants::*;
pub use crate::headers::{content_type_header, determine_nosniff, resource_metadata_from_headers};
pub use crate::mime_classifier::{
    determine_supplied_mime_type, distinguish_text_or_binary, identify_unknown_mime_type,
    read_resource_header, sniff_in_context, sniff_mime_type, validate_pattern_tables,
    ApacheBugFlag, LoadContext, NoSniffFlag, Resource, RESOURCE_HEADER_LENGTH,
};
pub use crate::mime_type::{InvalidMimeType, Mime, Parameters};
pub use crate::parse::{is_valid_mime_type_string, is_valid_mime_type_with_no_parameters, parse};
