//! Boilerplate removal for concatenated record text.
//!
//! Scanned record bundles carry fax cover sheets, confidentiality notices,
//! page footers and billing codes that would otherwise pollute segmentation
//! and keyword extraction. Patterns are applied in a fixed order, then
//! whitespace is normalized.

use std::sync::LazyLock;

use regex::Regex;

/// Noise patterns, applied in order. Page markers (`[PAGE_n]`) are never
/// matched — page attribution must survive filtering.
static NOISE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Common cover-sheet phrases
        r"(?i)fax cover sheet",
        r"(?i)confidentiality notice",
        r"(?i)this document contains",
        // Footers
        r"(?i)page \d+ of \d+",
        r"(?i)printed on \d{1,2}[/-]\d{1,2}[/-]\d{2,4}",
        // Separator lines and standalone page numbers
        r"(?m)^[-=_]{3,}$",
        r"(?m)^\s*\d+\s*$",
        // Billing/administrative codes
        r"(?i)CPT:\s*\d+",
        r"(?i)ICD[- ]?\d*:\s*[\d.]+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid noise pattern"))
    .collect()
});

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static EXCESS_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("valid regex"));

/// Strip boilerplate from `text` and normalize whitespace.
///
/// Pure function; always returns a string (possibly empty).
pub fn filter_noise(text: &str) -> String {
    let mut cleaned = text.to_owned();
    for pattern in NOISE_PATTERNS.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    let cleaned = EXCESS_NEWLINES.replace_all(&cleaned, "\n\n");
    let cleaned = EXCESS_SPACES.replace_all(&cleaned, " ");
    cleaned.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_cover_sheet_phrases() {
        let raw = "FAX COVER SHEET\nImportant content\nConfidentiality Notice applies";
        let clean = filter_noise(raw);
        assert!(!clean.to_lowercase().contains("fax cover sheet"));
        assert!(!clean.to_lowercase().contains("confidentiality notice"));
        assert!(clean.contains("Important content"));
    }

    #[test]
    fn strips_page_footers_and_print_stamps() {
        let raw = "Progress details here\nPage 3 of 12\nPrinted on 01/05/2023\nMore details";
        let clean = filter_noise(raw);
        assert!(!clean.to_lowercase().contains("page 3 of 12"));
        assert!(!clean.to_lowercase().contains("printed on"));
        assert!(clean.contains("More details"));
    }

    #[test]
    fn strips_separator_lines() {
        let raw = "above\n-----\n=====\n___\nbelow";
        let clean = filter_noise(raw);
        assert!(!clean.contains("-----"));
        assert!(!clean.contains("====="));
        assert!(clean.contains("above"));
        assert!(clean.contains("below"));
    }

    #[test]
    fn strips_standalone_numeric_lines() {
        let raw = "narrative line\n42\nnext line";
        let clean = filter_noise(raw);
        assert!(!clean.contains("42"));
        assert!(clean.contains("narrative line"));
        assert!(clean.contains("next line"));
    }

    #[test]
    fn strips_billing_codes() {
        let raw = "Assessment follows CPT: 99213 and ICD-10: 250.00 for billing";
        let clean = filter_noise(raw);
        assert!(!clean.contains("99213"));
        assert!(!clean.contains("250.00"));
        assert!(clean.contains("Assessment follows"));
    }

    #[test]
    fn preserves_page_markers() {
        let raw = "[PAGE_1]\nsome page text\n[PAGE_2]\nmore text";
        let clean = filter_noise(raw);
        assert!(clean.contains("[PAGE_1]"));
        assert!(clean.contains("[PAGE_2]"));
    }

    #[test]
    fn collapses_excess_whitespace() {
        let raw = "first\n\n\n\n\nsecond   third  ";
        let clean = filter_noise(raw);
        assert_eq!(clean, "first\n\nsecond third");
    }

    #[test]
    fn empty_input_returns_empty() {
        assert_eq!(filter_noise(""), "");
    }
}
