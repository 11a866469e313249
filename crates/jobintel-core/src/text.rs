//! Shared text cleanup for HTML-bearing source fields.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<[^>]+>").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strips HTML tags and common entities, collapsing runs of whitespace.
#[must_use]
pub fn strip_html(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, " ");
    let unescaped = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'");
    WHITESPACE_RE.replace_all(&unescaped, " ").trim().to_string()
}
