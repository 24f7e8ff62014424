use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;

const TRACKING_ANCHOR_HREF_FIRST_PATTERN: &str = r#"(?i)<a(?:\s[^>]*?)?\shref\s*=\s*"([^"]+)"[^>]*?\sdata-tracking-control-name\s*=\s*"external_url_click""#;
const TRACKING_ANCHOR_HREF_LAST_PATTERN: &str = r#"(?i)<a(?:\s[^>]*?)?\sdata-tracking-control-name\s*=\s*"external_url_click"[^>]*?\shref\s*=\s*"([^"]+)""#;

const META_REFRESH_PATTERN: &str = r#"(?i)<meta\s[^>]*?http-equiv\s*=\s*["']?refresh["']?[^>]*?\scontent\s*=\s*["']?\s*\d*\s*;\s*url\s*=\s*["']?([^"'>\s]+)"#;
const META_REFRESH_CONTENT_FIRST_PATTERN: &str = r#"(?i)<meta\s[^>]*?content\s*=\s*["']?\s*\d*\s*;\s*url\s*=\s*["']?([^"'>\s]+)[^>]*?\shttp-equiv\s*=\s*["']?refresh"#;

const SCRIPT_NAVIGATION_PATTERN: &str = r#"window\.location(?:\.replace\(\s*|\.href\s*=\s*)(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')"#;

static TRACKING_ANCHOR_RES: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(TRACKING_ANCHOR_HREF_FIRST_PATTERN).unwrap(),
        Regex::new(TRACKING_ANCHOR_HREF_LAST_PATTERN).unwrap(),
    ]
});

static META_REFRESH_RES: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(META_REFRESH_PATTERN).unwrap(),
        Regex::new(META_REFRESH_CONTENT_FIRST_PATTERN).unwrap(),
    ]
});

static SCRIPT_NAVIGATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(SCRIPT_NAVIGATION_PATTERN).unwrap());

/// The heuristic that located a destination on an interstitial page.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    TrackingAnchor,
    MetaRefresh,
    ScriptNavigation,
}

impl Strategy {
    /// All strategies, in the order they are tried.
    pub const ALL: [Strategy; 3] = [
        Strategy::TrackingAnchor,
        Strategy::MetaRefresh,
        Strategy::ScriptNavigation,
    ];

    pub fn apply(self, content: &str) -> Option<String> {
        match self {
            Self::TrackingAnchor => {
                first_capture(TRACKING_ANCHOR_RES.iter(), content).map(decode_amp)
            }
            Self::MetaRefresh => first_capture(META_REFRESH_RES.iter(), content).map(decode_amp),
            Self::ScriptNavigation => SCRIPT_NAVIGATION_RE
                .captures_iter(content)
                .filter_map(|groups| groups.get(1).or_else(|| groups.get(2)))
                .map(|m| m.as_str())
                .find(|value| !value.is_empty())
                .map(strip_backslashes),
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrackingAnchor => f.write_str("tracking-anchor"),
            Self::MetaRefresh => f.write_str("meta-refresh"),
            Self::ScriptNavigation => f.write_str("script-navigation"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterstitialMatch {
    pub url: String,
    pub strategy: Strategy,
}

impl InterstitialMatch {
    pub fn new(url: String, strategy: Strategy) -> Self {
        Self { url, strategy }
    }
}

/// Find the destination URL on an interstitial page, trying each strategy in
/// priority order: tracking anchor, meta refresh, then script navigation.
pub fn extract(content: &str) -> Option<InterstitialMatch> {
    Strategy::ALL.iter().find_map(|strategy| {
        strategy
            .apply(content)
            .map(|url| InterstitialMatch::new(url, *strategy))
    })
}

fn first_capture<'a, I: Iterator<Item = &'a Regex>>(
    mut patterns: I,
    content: &str,
) -> Option<&str> {
    patterns.find_map(|re| {
        re.captures(content)
            .and_then(|groups| groups.get(1))
            .map(|m| m.as_str())
    })
}

fn decode_amp(value: &str) -> String {
    value.replace("&amp;", "&")
}

fn strip_backslashes(value: &str) -> String {
    value.replace('\\', "")
}
