use crate::result::ResolutionResult;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;

// ASCII word characters only, so that punctuation or non-Latin text directly
// after a link is left alone.
const SHORT_LINK_PATTERN: &str = r"https?://lnkd\.in/[A-Za-z0-9_-]+";

static SHORT_LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(SHORT_LINK_PATTERN).unwrap());

/// All short links in the text, in order of appearance (including repeats).
pub fn find_short_links(text: &str) -> Vec<&str> {
    SHORT_LINK_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .collect()
}

/// Map from original URL to expanded URL.
pub fn expansions(results: &[ResolutionResult]) -> HashMap<&str, &str> {
    results
        .iter()
        .map(|result| (result.original.as_str(), result.expanded.as_str()))
        .collect()
}

/// Replace every short link in the text with its expansion, leaving links
/// without an entry (and everything else) untouched.
pub fn restore<'a>(text: &'a str, results: &[ResolutionResult]) -> Cow<'a, str> {
    let expansions = expansions(results);

    SHORT_LINK_RE.replace_all(text, |captures: &regex::Captures| {
        let link = &captures[0];

        expansions.get(link).copied().unwrap_or(link).to_string()
    })
}

/// Counts reported after restoring a text.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Serialize)]
pub struct Stats {
    /// Short link occurrences in the input.
    pub found: usize,
    /// Distinct links that came back from resolution.
    pub expanded: usize,
}

impl Stats {
    pub fn new(found: usize, expanded: usize) -> Self {
        Self { found, expanded }
    }
}
