//! String-level cleanup shared by the handlers and the asset sink.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;
use xxhash_rust::xxh3::xxh3_64;

/// Whitespace runs that span a line break, as found between serialized tags.
static MULTILINE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t]*(?:\r?\n[ \t]*)+").expect("MULTILINE_WHITESPACE: hardcoded regex is valid")
});

/// Line-breaking whitespace between two tags (pretty-printing, not content).
static INTER_TAG_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r">[ \t]*(?:\r?\n\s*)+<").expect("INTER_TAG_WHITESPACE: hardcoded regex is valid")
});

/// Characters that render as nothing but survive `trim()`.
#[inline]
pub fn is_invisible_char(c: char) -> bool {
    matches!(c,
        '\u{00AD}' |              // soft hyphen
        '\u{200B}'..='\u{200F}' | // zero-width space/joiners, direction marks
        '\u{2060}'..='\u{2064}' | // word joiner, invisible operators
        '\u{FEFF}'                // byte order mark
    )
}

/// Remove invisible formatting characters.
#[must_use]
pub fn strip_invisible(text: &str) -> String {
    text.chars().filter(|c| !is_invisible_char(*c)).collect()
}

/// Canonical form of an asset URL, used as its dedup key.
///
/// Drops the fragment (layout hints such as `#pic_center`) and the query
/// (watermark/resize directives). Relative URLs are cut by hand since they
/// cannot be parsed without a base.
#[must_use]
pub fn canonicalize_url(raw: &str) -> String {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.set_query(None);
            url.to_string()
        }
        Err(_) => {
            let end = raw.find(['?', '#']).unwrap_or(raw.len());
            raw[..end].to_string()
        }
    }
}

/// File extension of the last path segment of a URL, lowercased.
#[must_use]
pub fn url_extension(raw: &str) -> Option<String> {
    let cleaned = canonicalize_url(raw);
    let segment = cleaned.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Make a string safe to use as a single path component.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned = sanitize_filename::sanitize(strip_invisible(name.trim()));
    let cleaned = cleaned.replace(char::is_whitespace, "_");
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}

/// Collapse serialized HTML onto one line.
///
/// Blank lines terminate raw HTML blocks in CommonMark, so markup passed
/// through verbatim must not contain any.
#[must_use]
pub fn collapse_html_whitespace(html: &str) -> String {
    let tight = INTER_TAG_WHITESPACE.replace_all(html.trim(), "><");
    MULTILINE_WHITESPACE.replace_all(&tight, " ").into_owned()
}

/// Stable content hash, hex encoded.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(xxh3_64(bytes).to_be_bytes())
}
