/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The MIME type record and the group predicates defined over it.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// <https://mimesniff.spec.whatwg.org/#http-whitespace-byte>
#[inline]
pub(crate) fn is_http_whitespace(byte: u8) -> bool {
    matches!(byte, 0x09 | 0x0A | 0x0C | 0x0D | 0x20)
}

/// <https://mimesniff.spec.whatwg.org/#http-token-code-point>
#[inline]
pub(crate) fn is_http_token(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() ||
        matches!(
            byte,
            b'!' | b'#' |
                b'$' |
                b'%' |
                b'&' |
                b'\'' |
                b'*' |
                b'+' |
                b'-' |
                b'.' |
                b'^' |
                b'_' |
                b'`' |
                b'|' |
                b'~'
        )
}

/// <https://mimesniff.spec.whatwg.org/#http-quoted-string-token-code-point>
#[inline]
pub(crate) fn is_http_quoted_string_token(byte: u8) -> bool {
    byte == 0x09 || (0x20..=0x7E).contains(&byte) || byte >= 0x80
}

/// The parameters of a [`Mime`], an insertion-ordered map from lowercase
/// parameter names to case-preserved values.
///
/// The first write to a name wins; later writes with the same name are
/// ignored, matching the parse algorithm's treatment of duplicate
/// parameters. Iteration yields entries in insertion order, which is also
/// the order used by [`Mime::serialize`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, Vec<u8>)>,
}

impl Parameters {
    /// An empty parameter map.
    pub const fn new() -> Parameters {
        Parameters {
            entries: Vec::new(),
        }
    }

    /// The number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a parameter with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(entry_name, _)| entry_name == name)
    }

    /// The value of the named parameter, if present.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, value)| &value[..])
    }

    /// Append a parameter unless one with the same name is already present.
    pub fn insert_if_absent(&mut self, name: String, value: Vec<u8>) {
        if !self.contains(&name) {
            self.entries.push((name, value));
        }
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), &value[..]))
    }
}

/// <https://mimesniff.spec.whatwg.org/#mime-type>
///
/// Type and subtype are always stored in ASCII lowercase and contain only
/// HTTP token code points. Values backing the well-known constants borrow
/// static storage; parsed values own theirs. Equality ignores the
/// distinction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mime {
    pub(crate) type_: Cow<'static, str>,
    pub(crate) subtype: Cow<'static, str>,
    pub(crate) parameters: Parameters,
}

impl Mime {
    /// A parameterless value borrowing static storage, usable in `const`
    /// contexts. Both halves must already be lowercase token strings.
    pub(crate) const fn borrowed(type_: &'static str, subtype: &'static str) -> Mime {
        Mime {
            type_: Cow::Borrowed(type_),
            subtype: Cow::Borrowed(subtype),
            parameters: Parameters::new(),
        }
    }

    /// A parameterless owned value. The given type and subtype are folded to
    /// ASCII lowercase; they are expected to be non-empty HTTP token strings.
    pub fn new(type_: &str, subtype: &str) -> Mime {
        Mime {
            type_: Cow::Owned(type_.to_ascii_lowercase()),
            subtype: Cow::Owned(subtype.to_ascii_lowercase()),
            parameters: Parameters::new(),
        }
    }

    /// <https://mimesniff.spec.whatwg.org/#type>
    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// <https://mimesniff.spec.whatwg.org/#subtype>
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// <https://mimesniff.spec.whatwg.org/#parameters>
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// <https://mimesniff.spec.whatwg.org/#mime-type-essence>
    pub fn essence(&self) -> String {
        format!("{}/{}", self.type_, self.subtype)
    }

    /// Compare the essence against `"type/subtype"` without allocating.
    pub fn essence_is(&self, essence: &str) -> bool {
        essence
            .split_once('/')
            .is_some_and(|(type_, subtype)| self.type_ == type_ && self.subtype == subtype)
    }

    fn subtype_ends_with(&self, suffix: &str) -> bool {
        self.subtype.ends_with(suffix)
    }

    /// <https://mimesniff.spec.whatwg.org/#image-mime-type>
    pub fn is_image(&self) -> bool {
        self.type_ == "image"
    }

    /// <https://mimesniff.spec.whatwg.org/#audio-or-video-mime-type>
    pub fn is_audio_or_video(&self) -> bool {
        self.type_ == "audio" || self.type_ == "video" || self.essence_is("application/ogg")
    }

    /// <https://mimesniff.spec.whatwg.org/#font-mime-type>
    pub fn is_font(&self) -> bool {
        self.type_ == "font" ||
            (self.type_ == "application" &&
                matches!(
                    self.subtype(),
                    "font-cff" |
                        "font-off" |
                        "font-sfnt" |
                        "font-ttf" |
                        "font-woff" |
                        "vnd.ms-fontobject" |
                        "vnd.ms-opentype"
                ))
    }

    /// <https://mimesniff.spec.whatwg.org/#zip-based-mime-type>
    pub fn is_zip_based(&self) -> bool {
        self.subtype_ends_with("+zip") || self.essence_is("application/zip")
    }

    /// <https://mimesniff.spec.whatwg.org/#archive-mime-type>
    pub fn is_archive(&self) -> bool {
        self.type_ == "application" &&
            matches!(self.subtype(), "x-rar-compressed" | "zip" | "x-gzip")
    }

    /// <https://mimesniff.spec.whatwg.org/#xml-mime-type>
    pub fn is_xml(&self) -> bool {
        self.subtype_ends_with("+xml") ||
            matches!((self.type_(), self.subtype()), ("text", "xml") | ("application", "xml"))
    }

    /// <https://mimesniff.spec.whatwg.org/#html-mime-type>
    pub fn is_html(&self) -> bool {
        self.essence_is("text/html")
    }

    /// <https://mimesniff.spec.whatwg.org/#scriptable-mime-type>
    pub fn is_scriptable(&self) -> bool {
        self.is_xml() || self.is_html() || self.essence_is("application/pdf")
    }

    /// <https://mimesniff.spec.whatwg.org/#javascript-mime-type>
    ///
    /// The essence comparison is ASCII case-insensitive; stored values are
    /// already lowercase, so the match below is exact.
    pub fn is_javascript(&self) -> bool {
        matches!(
            (self.type_(), self.subtype()),
            (
                "application",
                "ecmascript" | "javascript" | "x-ecmascript" | "x-javascript"
            ) | (
                "text",
                "ecmascript" |
                    "javascript" |
                    "javascript1.0" |
                    "javascript1.1" |
                    "javascript1.2" |
                    "javascript1.3" |
                    "javascript1.4" |
                    "javascript1.5" |
                    "jscript" |
                    "livescript" |
                    "x-ecmascript" |
                    "x-javascript"
            )
        )
    }

    /// <https://mimesniff.spec.whatwg.org/#json-mime-type>
    pub fn is_json(&self) -> bool {
        self.subtype_ends_with("+json") ||
            matches!((self.type_(), self.subtype()), ("application", "json") | ("text", "json"))
    }

    /// <https://mimesniff.spec.whatwg.org/#minimize-a-supported-mime-type>
    ///
    /// Every member of a group predicate counts as supported, so the final
    /// step always falls back to the essence.
    pub fn minimize(&self) -> String {
        if self.is_javascript() {
            "text/javascript".to_owned()
        } else if self.is_json() {
            "application/json".to_owned()
        } else if self.essence_is("image/svg+xml") {
            "image/svg+xml".to_owned()
        } else if self.is_xml() {
            "application/xml".to_owned()
        } else {
            self.essence()
        }
    }

    /// <https://mimesniff.spec.whatwg.org/#serialize-a-mime-type>
    ///
    /// Parameter values are emitted bare when they consist solely of HTTP
    /// token code points, and as quoted strings with `"` and `\` escaped
    /// otherwise.
    pub fn serialize(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(self.type_.len() + self.subtype.len() + 1);
        output.extend_from_slice(self.type_.as_bytes());
        output.push(b'/');
        output.extend_from_slice(self.subtype.as_bytes());
        for (name, value) in self.parameters.iter() {
            output.push(b';');
            output.extend_from_slice(name.as_bytes());
            output.push(b'=');
            if !value.is_empty() && value.iter().copied().all(is_http_token) {
                output.extend_from_slice(value);
            } else {
                output.push(b'"');
                for &byte in value {
                    if byte == b'"' || byte == b'\\' {
                        output.push(b'\\');
                    }
                    output.push(byte);
                }
                output.push(b'"');
            }
        }
        output
    }
}

impl fmt::Display for Mime {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&String::from_utf8_lossy(&self.serialize()))
    }
}

/// The error of [`Mime`]'s `FromStr` impl; carries no detail because the
/// parse algorithm has a single failure mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidMimeType;

impl fmt::Display for InvalidMimeType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("invalid MIME type")
    }
}

impl std::error::Error for InvalidMimeType {}

impl FromStr for Mime {
    type Err = InvalidMimeType;

    fn from_str(input: &str) -> Result<Mime, InvalidMimeType> {
        crate::parse(input.as_bytes()).ok_or(InvalidMimeType)
    }
}
