//! Canonical resource paths for camps.

use regex::Regex;
use std::sync::OnceLock;

/// Mount point of the camp API.
pub const API_BASE: &str = "/api";

/// Route segments under `/camps` that a moniker must not shadow.
const RESERVED_SEGMENTS: &[&str] = &["search"];

fn moniker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9._~-]+$").expect("moniker pattern compiles"))
}

#[derive(Clone, Debug)]
pub struct LinkGenerator {
    base: String,
}

impl Default for LinkGenerator {
    fn default() -> Self {
        LinkGenerator::new(API_BASE)
    }
}

impl LinkGenerator {
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        LinkGenerator {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Path of the camp with `moniker`, or None if the moniker cannot be used as a single path
    /// segment: blank, outside the URI unreserved characters, a dot segment, or a reserved route.
    pub fn camp_path(&self, moniker: &str) -> Option<String> {
        if !moniker_pattern().is_match(moniker) || moniker == "." || moniker == ".." {
            return None;
        }
        if RESERVED_SEGMENTS.iter().any(|r| r.eq_ignore_ascii_case(moniker)) {
            return None;
        }
        Some(format!("{}/camps/{}", self.base, moniker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_camp_path() {
        let links = LinkGenerator::default();
        assert_eq!(links.camp_path("ATL2018").as_deref(), Some("/api/camps/ATL2018"));
        assert_eq!(LinkGenerator::new("/v2/").camp_path("a-b_c.d~e").as_deref(), Some("/v2/camps/a-b_c.d~e"));
    }

    #[test]
    fn rejects_unroutable_monikers() {
        let links = LinkGenerator::default();
        for bad in ["", " ", "ATL 2018", "a/b", "..", ".", "search", "Search", "caf\u{e9}", "a?b"] {
            assert!(links.camp_path(bad).is_none(), "{:?} should be rejected", bad);
        }
    }
}
