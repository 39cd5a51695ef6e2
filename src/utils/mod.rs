//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Extract the short arXiv identifier from an entry URL.
///
/// `http://arxiv.org/abs/2406.04843v2` yields `2406.04843v2`; old-style ids keep
/// their archive prefix (`abs/hep-th/9901001v1` yields `hep-th/9901001v1`).
pub fn short_id_from_url(entry_url: &str) -> Option<String> {
    let parsed = Url::parse(entry_url.trim()).ok()?;
    let id = parsed.path().split_once("/abs/")?.1.trim_matches('/');
    (!id.is_empty()).then(|| id.to_string())
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
