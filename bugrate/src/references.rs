//! Extraction of issue references from pull-request bodies.
//!
//! A reference is a closing keyword (close, closes, closed, fix, fixes,
//! fixed, resolve, resolves, resolved) followed by `#` and a number, e.g.
//! `fixes #12`. Matching is case-sensitive and keywords must start on a word
//! boundary, so `prefix #3` is not a reference.

use lazy_static::lazy_static;
use regex::Regex;

const LOG_TARGET: &str = "references";

lazy_static! {
    static ref CLOSING_REF_RE: Regex =
        Regex::new(r"\b(?:close[sd]?|fix(?:es|ed)?|resolve[sd]?)\s*#(\d+)").unwrap();
}

/// Returns the issue numbers referenced by `body`, in order of appearance.
///
/// Duplicates are kept. A match whose number does not parse is skipped with
/// a warning naming `pull_id`; extraction continues with the rest of the body.
pub fn extract(body: &str, pull_id: u64) -> Vec<u64> {
    let mut issues = Vec::new();
    for caps in CLOSING_REF_RE.captures_iter(body) {
        let digits = caps.get(1).map_or("", |m| m.as_str());
        match digits.parse::<u64>() {
            Ok(issue) => issues.push(issue),
            Err(e) => {
                log::warn!(
                    target: LOG_TARGET,
                    "Error getting issue resolved by pull request #{}: '{}': {}",
                    pull_id,
                    digits,
                    e
                );
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_multiple_keywords() {
        assert_eq!(extract("fixes #12 and resolves #34", 7), vec![12, 34]);
    }

    #[test]
    fn test_no_reference() {
        assert!(extract("no reference here", 7).is_empty());
        assert!(extract("", 7).is_empty());
    }

    #[test]
    fn test_duplicates_preserved() {
        assert_eq!(extract("fix #12 fix #12", 7), vec![12, 12]);
    }

    #[test]
    fn test_every_keyword_form() {
        let body = "close #1 closes #2 closed #3 fix #4 fixes #5 fixed #6 resolve #7 resolves #8 resolved #9";
        assert_eq!(extract(body, 1), (1..=9).collect::<Vec<u64>>());
    }

    #[test]
    fn test_keyword_must_be_whole_word() {
        assert!(extract("prefix #3", 1).is_empty());
        assert!(extract("unresolved #4", 1).is_empty());
        assert!(extract("see #5", 1).is_empty());
    }

    #[test]
    fn test_case_sensitive() {
        assert!(extract("Fixes #12", 1).is_empty());
    }

    #[test]
    fn test_malformed_number_is_skipped() {
        // Overflows u64
        let body = "fixes #99999999999999999999999 and closes #8";
        assert_eq!(extract(body, 1), vec![8]);

        // Non-ASCII decimal digits match \d but do not parse
        assert_eq!(extract("fixes #\u{0661}\u{0662} fix #3", 1), vec![3]);
    }

    #[test]
    fn test_reference_without_space() {
        assert_eq!(extract("fixed#42.", 1), vec![42]);
    }
}
