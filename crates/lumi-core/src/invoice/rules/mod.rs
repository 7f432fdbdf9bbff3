//! Rule-based field matching for electricity bills.

pub mod amounts;
pub mod dates;
pub mod patterns;

pub use amounts::{format_brl, parse_decimal, parse_quantity};
pub use dates::{format_reference_month, month_number, parse_month_year};

use regex::Regex;

/// Which copy of the bill text produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPass {
    /// Whitespace runs collapsed to single spaces.
    Normalized,
    /// Text exactly as the PDF converter returned it.
    Raw,
}

/// A successful pattern-chain match.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    /// Capture groups 1..n; `None` for groups that did not participate.
    pub groups: Vec<Option<String>>,
    /// Position of the winning pattern in its chain.
    pub pattern_index: usize,
    /// Text copy the pattern matched against.
    pub pass: TextPass,
}

impl FieldMatch {
    /// Capture group `n` (1-based), if it participated.
    pub fn group(&self, n: usize) -> Option<&str> {
        self.groups.get(n.checked_sub(1)?)?.as_deref()
    }
}

/// Collapse every whitespace run (including newlines) to one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Run a pattern chain against the normalized text, then the raw text.
pub fn find_first_match(text: &str, patterns: &[Regex]) -> Option<FieldMatch> {
    let normalized = normalize_whitespace(text);
    find_first_match_in(&normalized, text, patterns)
}

/// Like [`find_first_match`] with the normalized copy computed by the caller.
///
/// Every pattern is tried against `normalized` before any pattern is tried
/// against `raw`; within a pass the first pattern in the chain wins.
pub fn find_first_match_in(normalized: &str, raw: &str, patterns: &[Regex]) -> Option<FieldMatch> {
    for (pass, candidate) in [(TextPass::Normalized, normalized), (TextPass::Raw, raw)] {
        for (pattern_index, pattern) in patterns.iter().enumerate() {
            if let Some(caps) = pattern.captures(candidate) {
                let groups = caps
                    .iter()
                    .skip(1)
                    .map(|g| g.map(|m| m.as_str().to_string()))
                    .collect();
                return Some(FieldMatch {
                    groups,
                    pattern_index,
                    pass,
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(patterns: &[&str]) -> Vec<Regex> {
        patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\n b\t c  "), "a b c");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_normalized_pass_bridges_wrapped_lines() {
        let patterns = chain(&[r"Contrib Ilum (\d+)"]);
        let found = find_first_match("Contrib\n   Ilum 42", &patterns).unwrap();
        assert_eq!(found.group(1), Some("42"));
        assert_eq!(found.pass, TextPass::Normalized);
    }

    #[test]
    fn test_raw_pass_keeps_line_anchors() {
        let patterns = chain(&[r"(?m)^total (\d+)$"]);
        let found = find_first_match("header\ntotal 5\nfooter", &patterns).unwrap();
        assert_eq!(found.group(1), Some("5"));
        assert_eq!(found.pass, TextPass::Raw);
    }

    #[test]
    fn test_all_patterns_on_normalized_before_raw() {
        // The first pattern only matches the raw text; the second matches the
        // normalized text, so the normalized pass wins with the second pattern.
        let patterns = chain(&[r"(?m)^total (\d+)$", r"total (\d+)"]);
        let found = find_first_match("header\ntotal 5\nfooter", &patterns).unwrap();
        assert_eq!(found.pattern_index, 1);
        assert_eq!(found.pass, TextPass::Normalized);
    }

    #[test]
    fn test_fallback_pattern_used_when_primary_misses() {
        let patterns = chain(&[r"Nº DO CLIENTE (\d+)", r"CLIENTE: (\d+)"]);
        let found = find_first_match("CLIENTE: 123", &patterns).unwrap();
        assert_eq!(found.pattern_index, 1);
        assert_eq!(found.group(1), Some("123"));
    }

    #[test]
    fn test_no_match() {
        let patterns = chain(&[r"x(\d)"]);
        assert!(find_first_match("nothing here", &patterns).is_none());
    }

    #[test]
    fn test_group_out_of_range() {
        let patterns = chain(&[r"(a)(b)?"]);
        let found = find_first_match("a", &patterns).unwrap();
        assert_eq!(found.group(1), Some("a"));
        assert_eq!(found.group(2), None);
        assert_eq!(found.group(0), None);
        assert_eq!(found.group(3), None);
    }
}
