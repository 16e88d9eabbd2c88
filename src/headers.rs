/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Deriving sniffing inputs from an HTTP header list.

use http::header::{HeaderMap, CONTENT_TYPE};

use crate::mime_classifier::{determine_supplied_mime_type, NoSniffFlag, Resource};
use crate::parse::trim_http_whitespace;

/// The raw bytes of the last `Content-Type` header, the candidate value for
/// the supplied MIME type.
pub fn content_type_header(headers: &HeaderMap) -> Option<&[u8]> {
    headers
        .get_all(CONTENT_TYPE)
        .iter()
        .last()
        .map(|value| value.as_bytes())
}

/// <https://fetch.spec.whatwg.org/#determine-nosniff>
///
/// True when the first element of the combined `X-Content-Type-Options`
/// value is `nosniff`, ASCII case-insensitively.
pub fn determine_nosniff(headers: &HeaderMap) -> bool {
    let mut elements = headers
        .get_all("x-content-type-options")
        .iter()
        .flat_map(|value| value.as_bytes().split(|&byte| byte == b','));
    match elements.next() {
        None => false,
        Some(first) => trim_http_whitespace(first).eq_ignore_ascii_case(b"nosniff"),
    }
}

/// Bundle the header-derived sniffing inputs for one response: the supplied
/// MIME type and Apache-bug flag from the last `Content-Type` value, and the
/// no-sniff flag from `X-Content-Type-Options`.
pub fn resource_metadata_from_headers(headers: &HeaderMap) -> Resource {
    let mut resource = determine_supplied_mime_type(content_type_header(headers));
    if determine_nosniff(headers) {
        resource.no_sniff = NoSniffFlag::On;
    }
    resource
}

#[cfg(test)]
mod tests {
    use http::header::{HeaderValue, CONTENT_TYPE};

    use super::*;
    use crate::{ApacheBugFlag, Mime};

    #[test]
    fn last_content_type_wins() {
        let mut headers = HeaderMap::new();
        headers.append(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        headers.append(CONTENT_TYPE, HeaderValue::from_static("image/png"));
        assert_eq!(content_type_header(&headers), Some(&b"image/png"[..]));

        let resource = resource_metadata_from_headers(&headers);
        assert_eq!(resource.supplied_mime_type, Some(Mime::new("image", "png")));
    }

    #[test]
    fn missing_content_type() {
        let headers = HeaderMap::new();
        assert_eq!(content_type_header(&headers), None);
        let resource = resource_metadata_from_headers(&headers);
        assert_eq!(resource.supplied_mime_type, None);
        assert_eq!(resource.check_for_apache_bug, ApacheBugFlag::Off);
    }

    #[test]
    fn apache_bug_flag_from_headers() {
        let mut headers = HeaderMap::new();
        headers.append(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=ISO-8859-1"),
        );
        let resource = resource_metadata_from_headers(&headers);
        assert_eq!(resource.check_for_apache_bug, ApacheBugFlag::On);

        // Only the four exact byte sequences set the flag.
        let mut headers = HeaderMap::new();
        headers.append(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain;charset=ISO-8859-1"),
        );
        let resource = resource_metadata_from_headers(&headers);
        assert_eq!(resource.check_for_apache_bug, ApacheBugFlag::Off);
    }

    #[test]
    fn nosniff_detection() {
        let mut headers = HeaderMap::new();
        assert!(!determine_nosniff(&headers));

        headers.append("x-content-type-options", HeaderValue::from_static("nosniff"));
        assert!(determine_nosniff(&headers));

        let mut headers = HeaderMap::new();
        headers.append(
            "x-content-type-options",
            HeaderValue::from_static(" NoSniff , other"),
        );
        assert!(determine_nosniff(&headers));

        let mut headers = HeaderMap::new();
        headers.append(
            "x-content-type-options",
            HeaderValue::from_static("other, nosniff"),
        );
        assert!(!determine_nosniff(&headers));
    }
}
