/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Well-known media types, usable in `const` contexts.
//!
//! These values borrow static storage, so cloning one never allocates; the
//! sniffing tables return them from their hot paths.

use crate::mime_type::Mime;

/// `text/plain`
pub const TEXT_PLAIN: Mime = Mime::borrowed("text", "plain");
/// `text/html`
pub const TEXT_HTML: Mime = Mime::borrowed("text", "html");
/// `text/xml`
pub const TEXT_XML: Mime = Mime::borrowed("text", "xml");
/// `text/css`
pub const TEXT_CSS: Mime = Mime::borrowed("text", "css");
/// `text/javascript`
pub const TEXT_JAVASCRIPT: Mime = Mime::borrowed("text", "javascript");
/// `text/json`
pub const TEXT_JSON: Mime = Mime::borrowed("text", "json");
/// `text/vtt`
pub const TEXT_VTT: Mime = Mime::borrowed("text", "vtt");
/// `text/cache-manifest`
pub const TEXT_CACHE_MANIFEST: Mime = Mime::borrowed("text", "cache-manifest");

/// `application/octet-stream`
pub const APPLICATION_OCTET_STREAM: Mime = Mime::borrowed("application", "octet-stream");
/// `application/xml`
pub const APPLICATION_XML: Mime = Mime::borrowed("application", "xml");
/// `application/json`
pub const APPLICATION_JSON: Mime = Mime::borrowed("application", "json");
/// `application/pdf`
pub const APPLICATION_PDF: Mime = Mime::borrowed("application", "pdf");
/// `application/postscript`
pub const APPLICATION_POSTSCRIPT: Mime = Mime::borrowed("application", "postscript");
/// `application/ogg`
pub const APPLICATION_OGG: Mime = Mime::borrowed("application", "ogg");
/// `application/x-gzip`
pub const APPLICATION_X_GZIP: Mime = Mime::borrowed("application", "x-gzip");
/// `application/zip`
pub const APPLICATION_ZIP: Mime = Mime::borrowed("application", "zip");
/// `application/x-rar-compressed`
pub const APPLICATION_X_RAR_COMPRESSED: Mime = Mime::borrowed("application", "x-rar-compressed");
/// `application/vnd.ms-fontobject`
pub const APPLICATION_VND_MS_FONTOBJECT: Mime = Mime::borrowed("application", "vnd.ms-fontobject");

/// `image/x-icon`
pub const IMAGE_X_ICON: Mime = Mime::borrowed("image", "x-icon");
/// `image/bmp`
pub const IMAGE_BMP: Mime = Mime::borrowed("image", "bmp");
/// `image/gif`
pub const IMAGE_GIF: Mime = Mime::borrowed("image", "gif");
/// `image/webp`
pub const IMAGE_WEBP: Mime = Mime::borrowed("image", "webp");
/// `image/png`
pub const IMAGE_PNG: Mime = Mime::borrowed("image", "png");
/// `image/jpeg`
pub const IMAGE_JPEG: Mime = Mime::borrowed("image", "jpeg");
/// `image/svg+xml`
pub const IMAGE_SVG_XML: Mime = Mime::borrowed("image", "svg+xml");

/// `audio/aiff`
pub const AUDIO_AIFF: Mime = Mime::borrowed("audio", "aiff");
/// `audio/mpeg`
pub const AUDIO_MPEG: Mime = Mime::borrowed("audio", "mpeg");
/// `audio/midi`
pub const AUDIO_MIDI: Mime = Mime::borrowed("audio", "midi");
/// `audio/wave`
pub const AUDIO_WAVE: Mime = Mime::borrowed("audio", "wave");

/// `video/avi`
pub const VIDEO_AVI: Mime = Mime::borrowed("video", "avi");
/// `video/mp4`
pub const VIDEO_MP4: Mime = Mime::borrowed("video", "mp4");
/// `video/webm`
pub const VIDEO_WEBM: Mime = Mime::borrowed("video", "webm");

/// `font/ttf`
pub const FONT_TTF: Mime = Mime::borrowed("font", "ttf");
/// `font/otf`
pub const FONT_OTF: Mime = Mime::borrowed("font", "otf");
/// `font/collection`
pub const FONT_COLLECTION: Mime = Mime::borrowed("font", "collection");
/// `font/woff`
pub const FONT_WOFF: Mime = Mime::borrowed("font", "woff");
/// `font/woff2`
pub const FONT_WOFF2: Mime = Mime::borrowed("font", "woff2");
