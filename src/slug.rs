//! Title normalization for filesystem-safe audio filenames, plus
//! description cleanup applied during metadata sync.
//!
//! `slugify` must stay deterministic: the download stage decides whether a
//! file was already fetched by recomputing the slug from the stored title,
//! so the same title has to map to the same name on every run.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Boilerplate phrase some channels carry in every description.
const AMARA_CREDIT: &str = "Subtitles by the Amara.org community";

/// Convert a human-readable title into a lowercase, underscore-separated
/// token safe to use as a path component.
///
/// Steps: NFKD-decompose and drop combining marks, map the HTML entities
/// that show up in API titles (`&amp;` becomes "and", quote entities are
/// removed), drop everything that is not a word character, then collapse
/// whitespace/hyphen runs into single underscores.
pub fn slugify(title: &str) -> String {
    let decomposed: String = title.nfkd().filter(|c| !is_combining_mark(*c)).collect();

    let replaced = decomposed
        .replace("&quot;", "")
        .replace("&#39;", "")
        .replace("&amp;", "and");

    let mut slug = String::with_capacity(replaced.len());
    let mut pending_separator = false;

    for c in replaced.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
        // Remaining punctuation is dropped without acting as a separator.
    }

    slug.trim_matches('_').to_string()
}

fn hashtag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#\w+").unwrap())
}

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\d{1,2}:\d{2}(?::\d{2})?\]").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Clean an upstream video description before storing it: hashtags,
/// `[mm:ss]` chapter markers, and the Amara subtitle credit are stripped,
/// and whitespace runs collapse to single spaces.
pub fn clean_description(text: &str) -> String {
    let text = hashtag_re().replace_all(text, "");
    let text = timestamp_re().replace_all(&text, "");
    let text = whitespace_re().replace_all(&text, " ");
    text.replace(AMARA_CREDIT, "").trim().to_string()
}
