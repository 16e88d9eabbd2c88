/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! <https://mimesniff.spec.whatwg.org/#mime-type-sniffing-algorithm>
//!
//! The byte-pattern tables, the container probes for MP4, WebM and MP3, and
//! the decision tree that combines them with the supplied metadata of a
//! [`Resource`].

use log::{debug, warn};

use crate::constants::{
    APPLICATION_OCTET_STREAM, APPLICATION_OGG, APPLICATION_PDF, APPLICATION_POSTSCRIPT,
    APPLICATION_VND_MS_FONTOBJECT, APPLICATION_X_GZIP, APPLICATION_X_RAR_COMPRESSED,
    APPLICATION_ZIP, AUDIO_AIFF, AUDIO_MIDI, AUDIO_MPEG, AUDIO_WAVE, FONT_COLLECTION, FONT_OTF,
    FONT_TTF, FONT_WOFF, FONT_WOFF2, IMAGE_BMP, IMAGE_GIF, IMAGE_JPEG, IMAGE_PNG, IMAGE_WEBP,
    IMAGE_X_ICON, TEXT_CACHE_MANIFEST, TEXT_HTML, TEXT_PLAIN, TEXT_VTT, TEXT_XML, VIDEO_AVI,
    VIDEO_MP4, VIDEO_WEBM,
};
use crate::mime_type::Mime;

/// <https://mimesniff.spec.whatwg.org/#resource-header>
pub const RESOURCE_HEADER_LENGTH: usize = 1445;

/// The prefix of `data` examined by the sniffing algorithms.
pub fn read_resource_header(data: &[u8]) -> &[u8] {
    &data[..data.len().min(RESOURCE_HEADER_LENGTH)]
}

/// Caller policy: when set, the computed type is the supplied type and the
/// resource header is never consulted (scriptable sniffing stays off even on
/// the unknown-type path).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoSniffFlag {
    On,
    #[default]
    Off,
}

/// Set when the raw `Content-Type` value is one a misconfigured Apache
/// server sends for resources it knows nothing about; the header text is
/// then only trusted as far as the text-or-binary distinction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ApacheBugFlag {
    On,
    #[default]
    Off,
}

impl ApacheBugFlag {
    /// <https://mimesniff.spec.whatwg.org/#supplied-mime-type-detection-algorithm>
    pub fn from_content_type(last_raw_content_type: &[u8]) -> ApacheBugFlag {
        if last_raw_content_type == b"text/plain" ||
            last_raw_content_type == b"text/plain; charset=ISO-8859-1" ||
            last_raw_content_type == b"text/plain; charset=iso-8859-1" ||
            last_raw_content_type == b"text/plain; charset=UTF-8"
        {
            ApacheBugFlag::On
        } else {
            ApacheBugFlag::Off
        }
    }
}

/// <https://mimesniff.spec.whatwg.org/#context-specific-sniffing>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadContext {
    Browsing,
    Image,
    AudioVideo,
    Font,
    Plugin,
    Style,
    Script,
    TextTrack,
    CacheManifest,
}

/// <https://mimesniff.spec.whatwg.org/#resource>
///
/// The sniff-time metadata of one resource. Created by
/// [`determine_supplied_mime_type`] (or by hand), consumed by one sniff, and
/// dropped; it does not outlive the request it describes.
#[derive(Clone, Debug, Default)]
pub struct Resource {
    pub supplied_mime_type: Option<Mime>,
    pub check_for_apache_bug: ApacheBugFlag,
    pub no_sniff: NoSniffFlag,
    pub computed_mime_type: Option<Mime>,
}

impl Resource {
    /// Run the sniffing algorithm for `context` and record the result in
    /// `computed_mime_type`.
    pub fn classify(&mut self, context: LoadContext, resource_header: &[u8]) {
        let computed = sniff_in_context(self, context, resource_header);
        self.computed_mime_type = computed;
    }
}

/// <https://mimesniff.spec.whatwg.org/#supplied-mime-type-detection-algorithm>
///
/// `last_raw_content_type` is the value of the last `Content-Type` header
/// associated with the resource, if any. A value that fails to parse leaves
/// the supplied type absent but may still set the Apache-bug flag.
pub fn determine_supplied_mime_type(last_raw_content_type: Option<&[u8]>) -> Resource {
    let mut resource = Resource::default();
    if let Some(raw) = last_raw_content_type {
        resource.check_for_apache_bug = ApacheBugFlag::from_content_type(raw);
        resource.supplied_mime_type = crate::parse(raw);
        if resource.supplied_mime_type.is_none() {
            debug!(
                "supplied Content-Type {:?} did not parse",
                String::from_utf8_lossy(raw)
            );
        }
    }
    resource
}

/// <https://mimesniff.spec.whatwg.org/#mime-type-sniffing-algorithm>
pub fn sniff_mime_type(resource: &Resource, resource_header: &[u8]) -> Option<Mime> {
    let supplied_type = match &resource.supplied_mime_type {
        // Step 2 (supplied type undefined): identify the unknown type, with
        // scriptable sniffing gated on the no-sniff flag.
        None => {
            return Some(identify_unknown_mime_type(
                resource_header,
                resource.no_sniff == NoSniffFlag::Off,
            ));
        },
        Some(supplied_type) => supplied_type,
    };

    // Step 1. An XML or HTML supplied type is never upgraded by sniffing.
    if supplied_type.is_xml() || supplied_type.is_html() {
        return Some(supplied_type.clone());
    }

    // Step 2, explicit unknowns.
    if is_explicit_unknown(supplied_type) {
        return Some(identify_unknown_mime_type(
            resource_header,
            resource.no_sniff == NoSniffFlag::Off,
        ));
    }

    // Step 3.
    if resource.no_sniff == NoSniffFlag::On {
        return Some(supplied_type.clone());
    }

    // Step 4.
    if resource.check_for_apache_bug == ApacheBugFlag::On {
        return Some(distinguish_text_or_binary(resource_header));
    }

    // Steps 5-6.
    if supplied_type.is_image() {
        if let Some(matched_type) = match_image_type(resource_header) {
            return Some(matched_type);
        }
    }

    // Steps 7-8.
    if supplied_type.is_audio_or_video() {
        if let Some(matched_type) = match_audio_or_video_type(resource_header) {
            return Some(matched_type);
        }
    }

    // Step 9.
    Some(supplied_type.clone())
}

/// <https://mimesniff.spec.whatwg.org/#context-specific-sniffing>
///
/// [`LoadContext::Browsing`] is the top-level algorithm; the other contexts
/// only consult their own pattern group, or none at all.
pub fn sniff_in_context(
    resource: &Resource,
    context: LoadContext,
    resource_header: &[u8],
) -> Option<Mime> {
    let supplied_type = &resource.supplied_mime_type;
    match context {
        LoadContext::Browsing => sniff_mime_type(resource, resource_header),
        // <https://mimesniff.spec.whatwg.org/#sniffing-in-an-image-context>
        LoadContext::Image => match supplied_type {
            Some(supplied) if supplied.is_xml() => Some(supplied.clone()),
            supplied => match_image_type(resource_header).or_else(|| supplied.clone()),
        },
        // <https://mimesniff.spec.whatwg.org/#sniffing-in-an-audio-or-video-context>
        LoadContext::AudioVideo => match supplied_type {
            Some(supplied) if supplied.is_xml() => Some(supplied.clone()),
            supplied => match_audio_or_video_type(resource_header).or_else(|| supplied.clone()),
        },
        // <https://mimesniff.spec.whatwg.org/#sniffing-in-a-font-context>
        LoadContext::Font => match supplied_type {
            Some(supplied) if supplied.is_xml() => Some(supplied.clone()),
            supplied => match_font_type(resource_header).or_else(|| supplied.clone()),
        },
        // <https://mimesniff.spec.whatwg.org/#sniffing-in-a-plugin-context>
        LoadContext::Plugin => match supplied_type {
            None => Some(APPLICATION_OCTET_STREAM),
            Some(supplied) => Some(supplied.clone()),
        },
        // <https://mimesniff.spec.whatwg.org/#sniffing-in-a-style-context>
        LoadContext::Style => supplied_type.clone(),
        // <https://mimesniff.spec.whatwg.org/#sniffing-in-a-script-context>
        LoadContext::Script => supplied_type.clone(),
        // <https://mimesniff.spec.whatwg.org/#sniffing-in-a-text-track-context>
        LoadContext::TextTrack => Some(TEXT_VTT),
        // <https://mimesniff.spec.whatwg.org/#sniffing-in-a-cache-manifest-context>
        LoadContext::CacheManifest => Some(TEXT_CACHE_MANIFEST),
    }
}

fn is_explicit_unknown(mime: &Mime) -> bool {
    matches!(
        (mime.type_(), mime.subtype()),
        ("unknown", "unknown") | ("application", "unknown") | ("*", "*")
    )
}

/// <https://mimesniff.spec.whatwg.org/#rules-for-identifying-an-unknown-mime-type>
pub fn identify_unknown_mime_type(resource_header: &[u8], sniff_scriptable: bool) -> Mime {
    if sniff_scriptable {
        if let Some(matched_type) = match_scriptable_type(resource_header) {
            return matched_type;
        }
    }
    if let Some(matched_type) = match_plaintext_type(resource_header) {
        return matched_type;
    }
    if let Some(matched_type) = match_image_type(resource_header) {
        return matched_type;
    }
    if let Some(matched_type) = match_audio_or_video_type(resource_header) {
        return matched_type;
    }
    if let Some(matched_type) = match_archive_type(resource_header) {
        return matched_type;
    }
    if !resource_header.iter().copied().any(is_binary_data_byte) {
        return TEXT_PLAIN;
    }
    APPLICATION_OCTET_STREAM
}

/// <https://mimesniff.spec.whatwg.org/#rules-for-text-or-binary>
pub fn distinguish_text_or_binary(resource_header: &[u8]) -> Mime {
    if resource_header.starts_with(&[0xFE, 0xFF]) ||
        resource_header.starts_with(&[0xFF, 0xFE]) ||
        resource_header.starts_with(&[0xEF, 0xBB, 0xBF])
    {
        TEXT_PLAIN
    } else if resource_header.iter().copied().any(is_binary_data_byte) {
        APPLICATION_OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

/// <https://mimesniff.spec.whatwg.org/#binary-data-byte>
#[inline]
pub(crate) fn is_binary_data_byte(byte: u8) -> bool {
    matches!(byte, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

/// <https://mimesniff.spec.whatwg.org/#tag-terminating-byte>
#[inline]
fn is_tag_terminating_byte(byte: u8) -> bool {
    byte == 0x20 || byte == 0x3E
}

/// One row of a signature table: a pre-masked pattern, a parallel mask
/// (0xFF exact, 0xDF ASCII-case-insensitive letter, 0x00 wildcard), a set
/// of byte values the matcher may skip at the start of the input, and the
/// media type a match computes.
struct ByteMatcher {
    pattern: &'static [u8],
    mask: &'static [u8],
    leading_ignore: &'static [u8],
    content_type: Mime,
}

impl ByteMatcher {
    const fn new(
        pattern: &'static [u8],
        mask: &'static [u8],
        leading_ignore: &'static [u8],
        content_type: Mime,
    ) -> ByteMatcher {
        ByteMatcher {
            pattern,
            mask,
            leading_ignore,
            content_type,
        }
    }

    /// <https://mimesniff.spec.whatwg.org/#matching-a-byte-pattern>
    ///
    /// Returns the input offset one past the match.
    fn matches(&self, data: &[u8]) -> Option<usize> {
        let start = data
            .iter()
            .position(|byte| !self.leading_ignore.contains(byte))
            .unwrap_or(data.len());
        let remaining = &data[start..];
        if remaining.len() < self.pattern.len() {
            return None;
        }
        let matched = remaining
            .iter()
            .zip(self.pattern.iter())
            .zip(self.mask.iter())
            .all(|((&data, &pattern), &mask)| data & mask == pattern);
        matched.then_some(start + self.pattern.len())
    }

    fn classify(&self, data: &[u8]) -> Option<Mime> {
        self.matches(data).map(|_| self.content_type.clone())
    }

    fn validate(&self) -> Result<(), String> {
        if self.pattern.is_empty() {
            return Err(format!("Zero length pattern for {}", self.content_type));
        }
        if self.pattern.len() != self.mask.len() {
            return Err(format!(
                "Unequal pattern and mask length for {}",
                self.content_type
            ));
        }
        if self
            .pattern
            .iter()
            .zip(self.mask.iter())
            .any(|(&pattern, &mask)| pattern & mask != pattern)
        {
            return Err(format!("Pattern not pre-masked for {}", self.content_type));
        }
        Ok(())
    }
}

/// A tag-name pattern; the byte after the match must be a tag-terminating
/// byte (space or `>`).
struct TagTerminatedByteMatcher {
    matcher: ByteMatcher,
}

impl TagTerminatedByteMatcher {
    const fn new(
        pattern: &'static [u8],
        mask: &'static [u8],
        content_type: Mime,
    ) -> TagTerminatedByteMatcher {
        TagTerminatedByteMatcher {
            matcher: ByteMatcher::new(pattern, mask, HTML_LEADING_IGNORE, content_type),
        }
    }

    fn classify(&self, data: &[u8]) -> Option<Mime> {
        self.matcher.matches(data).and_then(|end| {
            if end < data.len() && is_tag_terminating_byte(data[end]) {
                Some(self.matcher.content_type.clone())
            } else {
                None
            }
        })
    }
}

/// The HTML patterns may be preceded by any run of HTTP whitespace.
const HTML_LEADING_IGNORE: &[u8] = b"\t\n\x0C\r ";

/// <https://mimesniff.spec.whatwg.org/#identifying-a-resource-with-an-unknown-mime-type>
/// rows 1-17: tag-name signatures for `text/html`.
static HTML_PATTERN_TABLE: [TagTerminatedByteMatcher; 17] = [
    TagTerminatedByteMatcher::new(
        b"<!DOCTYPE HTML",
        b"\xFF\xFF\xDF\xDF\xDF\xDF\xDF\xDF\xDF\xFF\xDF\xDF\xDF\xDF",
        TEXT_HTML,
    ),
    TagTerminatedByteMatcher::new(b"<HTML", b"\xFF\xDF\xDF\xDF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<HEAD", b"\xFF\xDF\xDF\xDF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<SCRIPT", b"\xFF\xDF\xDF\xDF\xDF\xDF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<IFRAME", b"\xFF\xDF\xDF\xDF\xDF\xDF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<H1", b"\xFF\xDF\xFF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<DIV", b"\xFF\xDF\xDF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<FONT", b"\xFF\xDF\xDF\xDF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<TABLE", b"\xFF\xDF\xDF\xDF\xDF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<A", b"\xFF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<STYLE", b"\xFF\xDF\xDF\xDF\xDF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<TITLE", b"\xFF\xDF\xDF\xDF\xDF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<B", b"\xFF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<BODY", b"\xFF\xDF\xDF\xDF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<BR", b"\xFF\xDF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<P", b"\xFF\xDF", TEXT_HTML),
    TagTerminatedByteMatcher::new(b"<!--", b"\xFF\xFF\xFF\xFF", TEXT_HTML),
];

static XML_PATTERN: ByteMatcher = ByteMatcher::new(
    b"<?xml",
    b"\xFF\xFF\xFF\xFF\xFF",
    HTML_LEADING_IGNORE,
    TEXT_XML,
);

static PDF_PATTERN: ByteMatcher =
    ByteMatcher::new(b"%PDF-", b"\xFF\xFF\xFF\xFF\xFF", &[], APPLICATION_PDF);

static POSTSCRIPT_PATTERN: ByteMatcher = ByteMatcher::new(
    b"%!PS-Adobe-",
    b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF",
    &[],
    APPLICATION_POSTSCRIPT,
);

/// UTF-16BE, UTF-16LE and UTF-8 byte order marks, all `text/plain`.
static BOM_PATTERNS: [ByteMatcher; 3] = [
    ByteMatcher::new(b"\xFE\xFF", b"\xFF\xFF", &[], TEXT_PLAIN),
    ByteMatcher::new(b"\xFF\xFE", b"\xFF\xFF", &[], TEXT_PLAIN),
    ByteMatcher::new(b"\xEF\xBB\xBF", b"\xFF\xFF\xFF", &[], TEXT_PLAIN),
];

/// <https://mimesniff.spec.whatwg.org/#matching-an-image-type-pattern>
///
/// None of these rows may carry a leading-ignore set, and their first
/// pattern and mask bytes are mirrored in [`IMAGE_PATTERN_LEADS`]; the
/// `image_dispatch_agrees_with_the_table` test holds the two together.
static IMAGE_PATTERN_TABLE: [ByteMatcher; 8] = [
    // Windows Icon
    ByteMatcher::new(b"\x00\x00\x01\x00", b"\xFF\xFF\xFF\xFF", &[], IMAGE_X_ICON),
    // Windows Cursor
    ByteMatcher::new(b"\x00\x00\x02\x00", b"\xFF\xFF\xFF\xFF", &[], IMAGE_X_ICON),
    ByteMatcher::new(b"BM", b"\xFF\xFF", &[], IMAGE_BMP),
    ByteMatcher::new(b"GIF87a", b"\xFF\xFF\xFF\xFF\xFF\xFF", &[], IMAGE_GIF),
    ByteMatcher::new(b"GIF89a", b"\xFF\xFF\xFF\xFF\xFF\xFF", &[], IMAGE_GIF),
    // "RIFF", four wildcard bytes, "WEBPVP"
    ByteMatcher::new(
        b"RIFF\x00\x00\x00\x00WEBPVP",
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        &[],
        IMAGE_WEBP,
    ),
    ByteMatcher::new(
        b"\x89PNG\r\n\x1A\n",
        b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF",
        &[],
        IMAGE_PNG,
    ),
    // Start of Image marker plus the lead byte of a following marker
    ByteMatcher::new(b"\xFF\xD8\xFF", b"\xFF\xFF\xFF", &[], IMAGE_JPEG),
];

/// The `[pattern[0], mask[0]]` pair of each image pattern row.
const IMAGE_PATTERN_LEADS: [[u8; 2]; 8] = [
    [0x00, 0xFF],
    [0x00, 0xFF],
    [b'B', 0xFF],
    [b'G', 0xFF],
    [b'G', 0xFF],
    [b'R', 0xFF],
    [0x89, 0xFF],
    [0xFF, 0xFF],
];

/// For each possible first byte, a bitmap of the image patterns it could
/// open. Almost every byte maps to the empty set, so most inputs are
/// rejected with a single table load.
static IMAGE_PATTERN_DISPATCH: [u8; 256] = image_pattern_dispatch();

const fn image_pattern_dispatch() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut byte = 0;
    while byte < 256 {
        let mut index = 0;
        while index < IMAGE_PATTERN_LEADS.len() {
            let lead = IMAGE_PATTERN_LEADS[index];
            if byte as u8 & lead[1] == lead[0] {
                table[byte] |= 1 << index;
            }
            index += 1;
        }
        byte += 1;
    }
    table
}

/// <https://mimesniff.spec.whatwg.org/#matching-an-audio-or-video-type-pattern>
/// rows without a container probe.
static AUDIO_VIDEO_PATTERN_TABLE: [ByteMatcher; 6] = [
    // "FORM", four wildcard bytes, "AIFF"
    ByteMatcher::new(
        b"FORM\x00\x00\x00\x00AIFF",
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        &[],
        AUDIO_AIFF,
    ),
    // ID3v2-tagged MP3
    ByteMatcher::new(b"ID3", b"\xFF\xFF\xFF", &[], AUDIO_MPEG),
    ByteMatcher::new(b"OggS\x00", b"\xFF\xFF\xFF\xFF\xFF", &[], APPLICATION_OGG),
    // "MThd" followed by 6 as a 32-bit big-endian integer
    ByteMatcher::new(
        b"MThd\x00\x00\x00\x06",
        b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF",
        &[],
        AUDIO_MIDI,
    ),
    ByteMatcher::new(
        b"RIFF\x00\x00\x00\x00AVI ",
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        &[],
        VIDEO_AVI,
    ),
    ByteMatcher::new(
        b"RIFF\x00\x00\x00\x00WAVE",
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        &[],
        AUDIO_WAVE,
    ),
];

/// <https://mimesniff.spec.whatwg.org/#matching-a-font-type-pattern>
static FONT_PATTERN_TABLE: [ByteMatcher; 6] = [
    // 34 bytes the matcher does not care about, then "LP": Embedded OpenType
    ByteMatcher::new(
        b"\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
          \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
          \x00\x00LP",
        b"\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
          \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
          \x00\x00\xFF\xFF",
        &[],
        APPLICATION_VND_MS_FONTOBJECT,
    ),
    // TrueType version 1.0
    ByteMatcher::new(b"\x00\x01\x00\x00", b"\xFF\xFF\xFF\xFF", &[], FONT_TTF),
    ByteMatcher::new(b"OTTO", b"\xFF\xFF\xFF\xFF", &[], FONT_OTF),
    ByteMatcher::new(b"ttcf", b"\xFF\xFF\xFF\xFF", &[], FONT_COLLECTION),
    ByteMatcher::new(b"wOFF", b"\xFF\xFF\xFF\xFF", &[], FONT_WOFF),
    ByteMatcher::new(b"wOF2", b"\xFF\xFF\xFF\xFF", &[], FONT_WOFF2),
];

/// <https://mimesniff.spec.whatwg.org/#matching-an-archive-type-pattern>
static ARCHIVE_PATTERN_TABLE: [ByteMatcher; 3] = [
    ByteMatcher::new(b"\x1F\x8B\x08", b"\xFF\xFF\xFF", &[], APPLICATION_X_GZIP),
    ByteMatcher::new(b"PK\x03\x04", b"\xFF\xFF\xFF\xFF", &[], APPLICATION_ZIP),
    ByteMatcher::new(
        b"Rar!\x1A\x07\x00",
        b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF",
        &[],
        APPLICATION_X_RAR_COMPRESSED,
    ),
];

fn match_scriptable_type(resource_header: &[u8]) -> Option<Mime> {
    HTML_PATTERN_TABLE
        .iter()
        .find_map(|matcher| matcher.classify(resource_header))
        .or_else(|| XML_PATTERN.classify(resource_header))
        .or_else(|| PDF_PATTERN.classify(resource_header))
}

fn match_plaintext_type(resource_header: &[u8]) -> Option<Mime> {
    POSTSCRIPT_PATTERN.classify(resource_header).or_else(|| {
        BOM_PATTERNS
            .iter()
            .find_map(|matcher| matcher.classify(resource_header))
    })
}

/// <https://mimesniff.spec.whatwg.org/#image-type-pattern-matching-algorithm>
pub(crate) fn match_image_type(resource_header: &[u8]) -> Option<Mime> {
    let candidates = IMAGE_PATTERN_DISPATCH[*resource_header.first()? as usize];
    if candidates == 0 {
        return None;
    }
    IMAGE_PATTERN_TABLE
        .iter()
        .enumerate()
        .filter(|(index, _)| candidates & 1 << index != 0)
        .find_map(|(_, matcher)| matcher.classify(resource_header))
}

/// <https://mimesniff.spec.whatwg.org/#audio-or-video-type-pattern-matching-algorithm>
pub(crate) fn match_audio_or_video_type(resource_header: &[u8]) -> Option<Mime> {
    if let Some(matched_type) = AUDIO_VIDEO_PATTERN_TABLE
        .iter()
        .find_map(|matcher| matcher.classify(resource_header))
    {
        return Some(matched_type);
    }
    if matches_mp4_signature(resource_header) {
        return Some(VIDEO_MP4);
    }
    if matches_webm_signature(resource_header) {
        return Some(VIDEO_WEBM);
    }
    if matches_mp3_signature(resource_header) {
        return Some(AUDIO_MPEG);
    }
    None
}

/// <https://mimesniff.spec.whatwg.org/#font-type-pattern-matching-algorithm>
pub(crate) fn match_font_type(resource_header: &[u8]) -> Option<Mime> {
    FONT_PATTERN_TABLE
        .iter()
        .find_map(|matcher| matcher.classify(resource_header))
}

/// <https://mimesniff.spec.whatwg.org/#archive-type-pattern-matching-algorithm>
pub(crate) fn match_archive_type(resource_header: &[u8]) -> Option<Mime> {
    ARCHIVE_PATTERN_TABLE
        .iter()
        .find_map(|matcher| matcher.classify(resource_header))
}

/// <https://mimesniff.spec.whatwg.org/#signature-for-mp4>
fn matches_mp4_signature(byte_sequence: &[u8]) -> bool {
    let length = byte_sequence.len();
    if length < 12 {
        return false;
    }

    let box_size = ((byte_sequence[0] as u32) << 24 |
        (byte_sequence[1] as u32) << 16 |
        (byte_sequence[2] as u32) << 8 |
        (byte_sequence[3] as u32)) as usize;
    if length < box_size || box_size % 4 != 0 {
        return false;
    }

    if &byte_sequence[4..8] != b"ftyp" {
        return false;
    }
    // The major brand, then each compatible brand in turn.
    if byte_sequence[8..].starts_with(b"mp4") {
        return true;
    }
    let mut bytes_read = 16;
    while bytes_read + 3 <= box_size {
        if &byte_sequence[bytes_read..bytes_read + 3] == b"mp4" {
            return true;
        }
        bytes_read += 4;
    }
    false
}

/// <https://mimesniff.spec.whatwg.org/#signature-for-webm>
fn matches_webm_signature(byte_sequence: &[u8]) -> bool {
    // EBML header magic.
    if !byte_sequence.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return false;
    }
    let length = byte_sequence.len();
    let mut iter = 4;
    while iter + 1 < length && iter < 38 {
        // The DocType element id.
        if byte_sequence[iter] == 0x42 && byte_sequence[iter + 1] == 0x82 {
            iter += 2;
            if iter >= length {
                break;
            }
            // The element length, then the DocType string itself, which some
            // muxers pad with leading NULs.
            let (_, vint_size) = parse_vint(byte_sequence, iter);
            let index = iter + vint_size;
            let mut position = index;
            while position < index + 4 && position < length && byte_sequence[position] == 0 {
                position += 1;
            }
            if position < index + 4 && byte_sequence[position..].starts_with(b"webm") {
                return true;
            }
        }
        iter += 1;
    }
    false
}

/// EBML variable-width integer: the count of leading zero bits of the first
/// byte (plus one) is the total byte width; the value is the remaining bits
/// of the first byte followed by the continuation bytes, big-endian.
/// `offset` must be in bounds. Returns `(value, width)`.
fn parse_vint(byte_sequence: &[u8], offset: usize) -> (u64, usize) {
    let first = byte_sequence[offset];
    let mut mask = 0x80u8;
    let mut size = 1;
    while size < 8 && first & mask == 0 {
        mask >>= 1;
        size += 1;
    }
    let mut value = (first & !mask) as u64;
    let mut index = 1;
    while index < size {
        match byte_sequence.get(offset + index) {
            Some(&byte) => value = value << 8 | byte as u64,
            // A vint truncated by the end of the header; the width is still
            // meaningful to the caller.
            None => break,
        }
        index += 1;
    }
    (value, size)
}

/// <https://mimesniff.spec.whatwg.org/#signature-for-mp3-without-id3>
///
/// Two consecutive valid frame headers, spaced by the frame size computed
/// from the first.
fn matches_mp3_signature(byte_sequence: &[u8]) -> bool {
    let length = byte_sequence.len();
    let s = 0;
    if !matches_mp3_frame_header(byte_sequence, s) {
        return false;
    }
    let frame_size = mp3_frame_size(byte_sequence, s);
    if frame_size < 4 || frame_size > length - s {
        return false;
    }
    matches_mp3_frame_header(byte_sequence, s + frame_size)
}

/// <https://mimesniff.spec.whatwg.org/#match-an-mp3-header>
fn matches_mp3_frame_header(byte_sequence: &[u8], s: usize) -> bool {
    if byte_sequence.len() < s + 4 {
        return false;
    }
    // Frame sync.
    if byte_sequence[s] != 0xFF || byte_sequence[s + 1] & 0xE0 != 0xE0 {
        return false;
    }
    let layer = (byte_sequence[s + 1] & 0x06) >> 1;
    if layer == 0 {
        return false;
    }
    // 15 is the reserved bitrate index, 3 the reserved sample-rate index.
    let bit_rate = (byte_sequence[s + 2] & 0xF0) >> 4;
    if bit_rate == 15 {
        return false;
    }
    let sample_rate = (byte_sequence[s + 2] & 0x0C) >> 2;
    if sample_rate == 3 {
        return false;
    }
    true
}

const MP25_BIT_RATES: [u32; 15] = [
    0, 8_000, 16_000, 24_000, 32_000, 40_000, 48_000, 56_000, 64_000, 80_000, 96_000, 112_000,
    128_000, 144_000, 160_000,
];

const MP3_BIT_RATES: [u32; 15] = [
    0, 32_000, 40_000, 48_000, 56_000, 64_000, 80_000, 96_000, 112_000, 128_000, 160_000, 192_000,
    224_000, 256_000, 320_000,
];

const SAMPLE_RATES: [u32; 3] = [44_100, 48_000, 32_000];

/// <https://mimesniff.spec.whatwg.org/#parse-an-mp3-frame> followed by
/// <https://mimesniff.spec.whatwg.org/#compute-an-mp3-frame-size>.
/// The header at `s` must already have been validated; that bounds both
/// table indices.
fn mp3_frame_size(byte_sequence: &[u8], s: usize) -> usize {
    let version = (byte_sequence[s + 1] & 0x18) >> 3;
    let bit_rate_index = ((byte_sequence[s + 2] & 0xF0) >> 4) as usize;
    let bit_rate = if version & 0x01 != 0 {
        MP25_BIT_RATES[bit_rate_index]
    } else {
        MP3_BIT_RATES[bit_rate_index]
    };
    let sample_rate_index = ((byte_sequence[s + 2] & 0x0C) >> 2) as usize;
    let sample_rate = SAMPLE_RATES[sample_rate_index];
    let pad = (byte_sequence[s + 2] & 0x02) >> 1;

    let scale = if version == 1 { 72 } else { 144 };
    let mut size = (bit_rate * scale / sample_rate) as usize;
    if pad != 0 {
        size += 1;
    }
    size
}

/// Check every signature table for rows with an empty pattern, a
/// pattern/mask length mismatch, or a pattern that is not pre-masked.
pub fn validate_pattern_tables() -> Result<(), String> {
    let result = validate_pattern_tables_impl();
    if let Err(ref error) = result {
        warn!("signature table validation failed: {error}");
    }
    result
}

fn validate_pattern_tables_impl() -> Result<(), String> {
    for matcher in &HTML_PATTERN_TABLE {
        matcher.matcher.validate()?;
    }
    XML_PATTERN.validate()?;
    PDF_PATTERN.validate()?;
    POSTSCRIPT_PATTERN.validate()?;
    for matcher in BOM_PATTERNS
        .iter()
        .chain(&IMAGE_PATTERN_TABLE)
        .chain(&AUDIO_VIDEO_PATTERN_TABLE)
        .chain(&FONT_PATTERN_TABLE)
        .chain(&ARCHIVE_PATTERN_TABLE)
    {
        matcher.validate()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_well_formed() {
        validate_pattern_tables().unwrap();
    }

    #[test]
    fn image_dispatch_agrees_with_the_table() {
        // Every pattern must be reachable through the dispatch bitmap of its
        // own first byte, and unreachable through any byte its mask rejects.
        for (index, matcher) in IMAGE_PATTERN_TABLE.iter().enumerate() {
            assert!(matcher.leading_ignore.is_empty());
            for byte in 0..=255u8 {
                let candidate = IMAGE_PATTERN_DISPATCH[byte as usize] & 1 << index != 0;
                assert_eq!(candidate, byte & matcher.mask[0] == matcher.pattern[0]);
            }
        }
    }

    #[test]
    fn pattern_match_skips_only_ignored_prefixes() {
        let matcher = &HTML_PATTERN_TABLE[1]; // <HTML
        assert!(matcher.classify(b"<html>").is_some());
        assert!(matcher.classify(b"  \t\r\n\x0C<HTML PLEASE>").is_some());
        assert!(matcher.classify(b"x <html>").is_none());
        assert!(matcher.classify(b"<html").is_none()); // no terminating byte
        assert!(matcher.classify(b"<htmlx>").is_none());
        assert!(matcher.classify(b"").is_none());
        assert!(matcher.classify(b"    ").is_none());
    }

    #[test]
    fn masked_matching_is_case_insensitive_per_letter() {
        assert_eq!(match_scriptable_type(b"<!doctype html>"), Some(TEXT_HTML));
        assert_eq!(match_scriptable_type(b"<!DocType HTML ans"), Some(TEXT_HTML));
        assert_eq!(match_scriptable_type(b"<P >"), Some(TEXT_HTML));
        // The comment pattern is mask-exact.
        assert_eq!(match_scriptable_type(b"<!-- hi -->"), Some(TEXT_HTML));
        assert_eq!(match_scriptable_type(b"<?XML version"), None);
        assert_eq!(match_scriptable_type(b"\t<?xml version"), Some(TEXT_XML));
        assert_eq!(match_scriptable_type(b"%PDF-1.7"), Some(APPLICATION_PDF));
    }

    #[test]
    fn image_signatures() {
        assert_eq!(match_image_type(b"\x00\x00\x01\x00rest"), Some(IMAGE_X_ICON));
        assert_eq!(match_image_type(b"\x00\x00\x02\x00rest"), Some(IMAGE_X_ICON));
        assert_eq!(match_image_type(b"BM\x01\x02"), Some(IMAGE_BMP));
        assert_eq!(match_image_type(b"GIF87a..."), Some(IMAGE_GIF));
        assert_eq!(match_image_type(b"GIF89a..."), Some(IMAGE_GIF));
        assert_eq!(match_image_type(b"RIFF\x12\x34\x56\x78WEBPVP8 "), Some(IMAGE_WEBP));
        assert_eq!(match_image_type(b"\x89PNG\r\n\x1A\ntrailer"), Some(IMAGE_PNG));
        assert_eq!(match_image_type(b"\xFF\xD8\xFF\xE0"), Some(IMAGE_JPEG));
        assert_eq!(match_image_type(b"GIF88a..."), None);
        assert_eq!(match_image_type(b"\x89PNG\r\n"), None); // truncated
        assert_eq!(match_image_type(b""), None);
    }

    #[test]
    fn audio_video_signatures() {
        assert_eq!(
            match_audio_or_video_type(b"FORM\x00\x00\x01\x00AIFF"),
            Some(AUDIO_AIFF)
        );
        assert_eq!(match_audio_or_video_type(b"ID3\x04rest"), Some(AUDIO_MPEG));
        assert_eq!(match_audio_or_video_type(b"OggS\x00rest"), Some(APPLICATION_OGG));
        assert_eq!(
            match_audio_or_video_type(b"MThd\x00\x00\x00\x06\x00"),
            Some(AUDIO_MIDI)
        );
        assert_eq!(
            match_audio_or_video_type(b"RIFF\xAA\xBB\xCC\xDDAVI listing"),
            Some(VIDEO_AVI)
        );
        assert_eq!(
            match_audio_or_video_type(b"RIFF\xAA\xBB\xCC\xDDWAVEfmt"),
            Some(AUDIO_WAVE)
        );
        assert_eq!(match_audio_or_video_type(b"OggS\x01"), None);
        assert_eq!(match_audio_or_video_type(b"MThd\x00\x00\x00\x07"), None);
    }

    #[test]
    fn font_signatures() {
        let mut eot = vec![0u8; 34];
        eot.extend_from_slice(b"LP....");
        assert_eq!(match_font_type(&eot), Some(APPLICATION_VND_MS_FONTOBJECT));
        // The first 34 bytes are fully wildcarded.
        eot[0] = 0xAB;
        eot[33] = 0xCD;
        assert_eq!(match_font_type(&eot), Some(APPLICATION_VND_MS_FONTOBJECT));

        assert_eq!(match_font_type(b"\x00\x01\x00\x00rest"), Some(FONT_TTF));
        assert_eq!(match_font_type(b"OTTOrest"), Some(FONT_OTF));
        assert_eq!(match_font_type(b"ttcfrest"), Some(FONT_COLLECTION));
        assert_eq!(match_font_type(b"wOFFrest"), Some(FONT_WOFF));
        assert_eq!(match_font_type(b"wOF2rest"), Some(FONT_WOFF2));
        assert_eq!(match_font_type(b"wOF3rest"), None);
    }

    #[test]
    fn archive_signatures() {
        assert_eq!(match_archive_type(b"\x1F\x8B\x08rest"), Some(APPLICATION_X_GZIP));
        assert_eq!(match_archive_type(b"PK\x03\x04rest"), Some(APPLICATION_ZIP));
        assert_eq!(
            match_archive_type(b"Rar!\x1A\x07\x00rest"),
            Some(APPLICATION_X_RAR_COMPRESSED)
        );
        assert_eq!(match_archive_type(b"PK\x05\x06"), None);
    }

    #[test]
    fn mp4_signature() {
        // Major brand carries "mp4".
        let mut header = Vec::new();
        header.extend_from_slice(&[0x00, 0x00, 0x00, 0x0C]);
        header.extend_from_slice(b"ftyp");
        header.extend_from_slice(b"mp42");
        assert!(matches_mp4_signature(&header));

        // "mp4" only among the compatible brands.
        let mut header = Vec::new();
        header.extend_from_slice(&[0x00, 0x00, 0x00, 0x14]);
        header.extend_from_slice(b"ftyp");
        header.extend_from_slice(b"isom");
        header.extend_from_slice(&[0x00, 0x00, 0x02, 0x00]);
        header.extend_from_slice(b"mp41");
        assert!(matches_mp4_signature(&header));

        // No "mp4" brand anywhere.
        let mut header = Vec::new();
        header.extend_from_slice(&[0x00, 0x00, 0x00, 0x14]);
        header.extend_from_slice(b"ftyp");
        header.extend_from_slice(b"isom");
        header.extend_from_slice(&[0x00, 0x00, 0x02, 0x00]);
        header.extend_from_slice(b"avc1");
        assert!(!matches_mp4_signature(&header));

        // Box size not a multiple of four.
        let mut header = Vec::new();
        header.extend_from_slice(&[0x00, 0x00, 0x00, 0x0D]);
        header.extend_from_slice(b"ftypmp42X");
        assert!(!matches_mp4_signature(&header));

        // Input shorter than the declared box.
        let mut header = Vec::new();
        header.extend_from_slice(&[0x00, 0x00, 0x01, 0x00]);
        header.extend_from_slice(b"ftypmp42");
        assert!(!matches_mp4_signature(&header));

        assert!(!matches_mp4_signature(b"ftypmp42"));
        assert!(!matches_mp4_signature(b""));
    }

    #[test]
    fn webm_signature() {
        // DocType immediately after the magic, one-byte length vint.
        let mut header = Vec::new();
        header.extend_from_slice(&[0x1A, 0x45, 0xDF, 0xA3]);
        header.extend_from_slice(&[0x42, 0x82, 0x84]);
        header.extend_from_slice(b"webm");
        assert!(matches_webm_signature(&header));

        // Zero-padded DocType string.
        let mut header = Vec::new();
        header.extend_from_slice(&[0x1A, 0x45, 0xDF, 0xA3]);
        header.extend_from_slice(&[0x42, 0x82, 0x85, 0x00]);
        header.extend_from_slice(b"webm");
        assert!(matches_webm_signature(&header));

        // DocType later in the header, after other EBML elements.
        let mut header = Vec::new();
        header.extend_from_slice(&[0x1A, 0x45, 0xDF, 0xA3]);
        header.extend_from_slice(&[0x9F, 0x42, 0x86, 0x81, 0x01]);
        header.extend_from_slice(&[0x42, 0x82, 0x84]);
        header.extend_from_slice(b"webm");
        assert!(matches_webm_signature(&header));

        // A two-byte length vint before the DocType string.
        let mut header = Vec::new();
        header.extend_from_slice(&[0x1A, 0x45, 0xDF, 0xA3]);
        header.extend_from_slice(&[0x42, 0x82, 0x40, 0x04]);
        header.extend_from_slice(b"webm");
        assert!(matches_webm_signature(&header));

        // Wrong DocType.
        let mut header = Vec::new();
        header.extend_from_slice(&[0x1A, 0x45, 0xDF, 0xA3]);
        header.extend_from_slice(&[0x42, 0x82, 0x88]);
        header.extend_from_slice(b"matroska");
        assert!(!matches_webm_signature(&header));

        // The scan gives up past offset 38.
        let mut header = Vec::new();
        header.extend_from_slice(&[0x1A, 0x45, 0xDF, 0xA3]);
        header.extend_from_slice(&[0xAA; 40]);
        header.extend_from_slice(&[0x42, 0x82, 0x84]);
        header.extend_from_slice(b"webm");
        assert!(!matches_webm_signature(&header));

        assert!(!matches_webm_signature(b"\x1A\x45\xDF\xA3"));
        assert!(!matches_webm_signature(b"webm"));
    }

    #[test]
    fn vint_widths() {
        assert_eq!(parse_vint(&[0x81], 0), (1, 1));
        assert_eq!(parse_vint(&[0x84], 0), (4, 1));
        assert_eq!(parse_vint(&[0x40, 0x04], 0), (4, 2));
        assert_eq!(parse_vint(&[0x21, 0x23, 0x45], 0), (0x012345, 3));
        // Eight leading zero bits: the maximum width.
        assert_eq!(parse_vint(&[0x00, 0xFF], 0).1, 8);
        assert_eq!(parse_vint(&[0x01], 0).1, 8);
    }

    // 0xFF 0xFB 0x90: MPEG-1 layer 3, bitrate index 9, 44100 Hz, no padding.
    // The frame-size rule pairs that version with the 80 kbit table and
    // scale 144, so the next header is expected 261 bytes in.
    fn mp3_frame(buffer: &mut [u8], offset: usize) {
        buffer[offset] = 0xFF;
        buffer[offset + 1] = 0xFB;
        buffer[offset + 2] = 0x90;
    }

    #[test]
    fn mp3_signature() {
        let mut data = vec![0x55u8; 266];
        mp3_frame(&mut data, 0);
        mp3_frame(&mut data, 261);
        assert!(matches_mp3_signature(&data));

        // Valid first frame, garbage where the second sync word should be.
        let mut data = vec![0x55u8; 266];
        mp3_frame(&mut data, 0);
        assert!(!matches_mp3_signature(&data));

        // Input ends before the second header.
        let mut data = vec![0x55u8; 200];
        mp3_frame(&mut data, 0);
        assert!(!matches_mp3_signature(&data));

        // Padding bit shifts the second frame by one byte.
        let mut data = vec![0x55u8; 266];
        mp3_frame(&mut data, 0);
        data[2] = 0x92;
        mp3_frame(&mut data, 262);
        assert!(matches_mp3_signature(&data));

        // Reserved bitrate index.
        let mut data = vec![0x55u8; 266];
        mp3_frame(&mut data, 0);
        data[2] = 0xF0;
        assert!(!matches_mp3_signature(&data));

        // Reserved sample-rate index.
        let mut data = vec![0x55u8; 266];
        mp3_frame(&mut data, 0);
        data[2] = 0x9C;
        assert!(!matches_mp3_signature(&data));

        // Layer 0 is reserved.
        let mut data = vec![0x55u8; 266];
        mp3_frame(&mut data, 0);
        data[1] = 0xF9;
        assert!(!matches_mp3_signature(&data));

        assert!(!matches_mp3_signature(b"\xFF\xFB"));
    }

    #[test]
    fn binary_data_bytes() {
        for byte in [0x00, 0x08, 0x0B, 0x0E, 0x1A, 0x1C, 0x1F] {
            assert!(is_binary_data_byte(byte), "{byte:#04X}");
        }
        for byte in [0x09, 0x0A, 0x0C, 0x0D, 0x1B, 0x20, b'a', 0xFF] {
            assert!(!is_binary_data_byte(byte), "{byte:#04X}");
        }
    }
}
