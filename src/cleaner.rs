use std::sync::OnceLock;

use regex::Regex;

fn website_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:www\.)?[a-z0-9][a-z0-9-]*(?:\.[a-z]{2,})+(?:/\S*)?")
            .expect("valid regex")
    })
}

fn postcode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // UK postcode, e.g. SW1A 1AA or M1 1AE
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Z]{1,2}\d[A-Z\d]?\s*\d[A-Z]{2}\b").expect("valid regex")
    })
}

fn digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d+\b").expect("valid regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Strip the noise banks append to free-text descriptions: website
/// fragments, UK postcodes, card-terminal digit runs. The result is what
/// the category map is keyed by, so this must stay deterministic — the
/// same raw description always cleans to the same string.
pub fn clean_description(raw: &str) -> String {
    let s = website_re().replace_all(raw, " ");
    let s = postcode_re().replace_all(&s, " ");
    let s = digits_re().replace_all(&s, " ");
    let s = whitespace_re().replace_all(&s, " ");
    s.trim().to_string()
}
