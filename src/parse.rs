/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Parsing of MIME type byte sequences.

use std::borrow::Cow;

use crate::mime_type::{
    is_http_quoted_string_token, is_http_token, is_http_whitespace, Mime, Parameters,
};

/// <https://mimesniff.spec.whatwg.org/#parse-a-mime-type>
///
/// The input is the raw bytes of a `Content-Type` field value; no UTF-8
/// decoding takes place. Returns `None` when the input is empty after
/// trimming, has no `/`, or has an empty or non-token type or subtype.
/// Malformed parameters never fail the parse; they are skipped.
pub fn parse(input: &[u8]) -> Option<Mime> {
    // 1. Remove any leading and trailing HTTP whitespace from input.
    let input = trim_http_whitespace(input);

    // 2.-4. Collect the type up to the first U+002F (/); it must be a
    // non-empty sequence of HTTP token code points.
    let slash = input.iter().position(|&byte| byte == b'/')?;
    let (type_, rest) = (&input[..slash], &input[slash + 1..]);
    if type_.is_empty() || !type_.iter().copied().all(is_http_token) {
        return None;
    }

    // 6.-9. Collect the subtype up to the first U+003B (;) and remove its
    // trailing HTTP whitespace.
    let (subtype, parameters_input) = match rest.iter().position(|&byte| byte == b';') {
        Some(semicolon) => (&rest[..semicolon], &rest[semicolon..]),
        None => (rest, &rest[rest.len()..]),
    };
    let subtype = trim_end_http_whitespace(subtype);
    if subtype.is_empty() || !subtype.iter().copied().all(is_http_token) {
        return None;
    }

    // 10. Both halves are stored in ASCII lowercase.
    let mut mime = Mime {
        type_: Cow::Owned(token_to_lowercase(type_)),
        subtype: Cow::Owned(token_to_lowercase(subtype)),
        parameters: Parameters::new(),
    };

    // 11. While position is not past the end of input, collect parameters.
    parse_parameters(parameters_input, &mut mime.parameters);

    Some(mime)
}

/// `input` is empty or starts at a U+003B (;).
fn parse_parameters(input: &[u8], parameters: &mut Parameters) {
    let mut position = 0;
    // Loop invariant: input[position] is a ';' or past the end.
    while position < input.len() {
        // Skip past the ';', then any HTTP whitespace.
        position += 1;
        while position < input.len() && is_http_whitespace(input[position]) {
            position += 1;
        }

        // Collect the parameter name, up to a ';' or '='.
        let name_start = position;
        while position < input.len() && input[position] != b';' && input[position] != b'=' {
            position += 1;
        }
        let name = &input[name_start..position];

        if position >= input.len() {
            break;
        }
        if input[position] == b';' {
            continue;
        }
        // Skip past the '='.
        position += 1;

        let value: Cow<[u8]> = if input.get(position) == Some(&b'"') {
            let value = collect_http_quoted_string(input, &mut position);
            // Anything between the closing quote and the next ';' is dropped.
            while position < input.len() && input[position] != b';' {
                position += 1;
            }
            Cow::Owned(value)
        } else {
            let value_start = position;
            while position < input.len() && input[position] != b';' {
                position += 1;
            }
            let value = trim_end_http_whitespace(&input[value_start..position]);
            if value.is_empty() {
                continue;
            }
            Cow::Borrowed(value)
        };

        if !name.is_empty() &&
            name.iter().copied().all(is_http_token) &&
            !value.is_empty() &&
            value.iter().copied().all(is_http_quoted_string_token)
        {
            parameters.insert_if_absent(token_to_lowercase(name), value.into_owned());
        }
    }
}

/// <https://fetch.spec.whatwg.org/#collect-an-http-quoted-string> with the
/// extract-value flag: unescapes `\x` to `x` and drops the delimiters.
/// `position` is at the opening `"` on entry and one past the terminating
/// `"` (or at the end of input) on exit. A trailing backslash with nothing
/// after it contributes no code unit.
fn collect_http_quoted_string(input: &[u8], position: &mut usize) -> Vec<u8> {
    debug_assert_eq!(input.get(*position), Some(&b'"'));
    *position += 1;
    let mut value = Vec::new();
    while *position < input.len() {
        let byte = input[*position];
        *position += 1;
        match byte {
            b'\\' => {
                if let Some(&escaped) = input.get(*position) {
                    value.push(escaped);
                    *position += 1;
                }
            },
            b'"' => break,
            _ => value.push(byte),
        }
    }
    value
}

/// <https://mimesniff.spec.whatwg.org/#valid-mime-type>
pub fn is_valid_mime_type_string(input: &[u8]) -> bool {
    parse(input).is_some()
}

/// <https://mimesniff.spec.whatwg.org/#valid-mime-type-with-no-parameters>
pub fn is_valid_mime_type_with_no_parameters(input: &[u8]) -> bool {
    !input.contains(&b';') && parse(input).is_some()
}

pub(crate) fn trim_http_whitespace(input: &[u8]) -> &[u8] {
    trim_end_http_whitespace(trim_start_http_whitespace(input))
}

fn trim_start_http_whitespace(mut input: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = input {
        if !is_http_whitespace(*first) {
            break;
        }
        input = rest;
    }
    input
}

fn trim_end_http_whitespace(mut input: &[u8]) -> &[u8] {
    while let [rest @ .., last] = input {
        if !is_http_whitespace(*last) {
            break;
        }
        input = rest;
    }
    input
}

/// HTTP token code points are ASCII, so folding bytes yields valid UTF-8.
/// Callers only pass byte sequences already validated as token strings.
fn token_to_lowercase(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| byte.to_ascii_lowercase() as char)
        .collect()
}
