//! Segment metadata enrichment.
//!
//! The pipeline only depends on the [`MetadataExtractor`] trait; the
//! [`PatternMetadataExtractor`] is the built-in regex-driven implementation
//! (dates of service, document types, provider/facility labels, keywords).
//! Entity-model-based extraction is a later phase and plugs in behind the
//! same trait.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::config::SegmentationConfig;
use crate::models::DocumentSegment;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("invalid date pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("metadata extraction failed: {0}")]
    Extraction(String),
}

/// Enriches a segment with date of service, document type, provider/facility
/// and keywords.
///
/// Implementations must be idempotent (enriching twice yields the same
/// segment) and total (an already-set field is never replaced with `None`).
pub trait MetadataExtractor: Send + Sync {
    fn enrich(&self, segment: &mut DocumentSegment) -> Result<(), MetadataError>;
}

/// Date formats tried against every candidate string, in order. Two-digit
/// year formats come first: `%Y` also accepts two digits, so the reverse
/// order would turn "19" into year 0019.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m-%d-%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y-%m-%d",
    "%B %d, %Y",
];

static PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[PAGE_\d+\]").expect("valid regex"));

/// Terms whose presence marks a word as likely meaningful in record text.
const MEDICAL_INDICATORS: &[&str] = &[
    "patient",
    "diagnosis",
    "treatment",
    "doctor",
    "hospital",
    "medical",
    "clinical",
    "therapy",
    "medication",
    "examination",
    "record",
    "report",
    "history",
    "service",
    "provider",
    "clinic",
    "visit",
    "care",
    "health",
];

/// Words too common to be useful keywords.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "this", "that", "will", "have", "been", "were", "said",
    "each", "which", "their", "time", "day", "may", "use", "her", "would", "there", "one", "all",
];

/// Regex-driven metadata extraction, no NLP model required.
#[derive(Debug)]
pub struct PatternMetadataExtractor {
    date_label_patterns: Vec<Regex>,
    extra_date_patterns: Vec<Regex>,
    provider_patterns: Vec<Regex>,
    facility_patterns: Vec<Regex>,
    type_patterns: Vec<(&'static str, Regex)>,
}

impl PatternMetadataExtractor {
    pub fn new(config: &SegmentationConfig) -> Result<Self, MetadataError> {
        // Labeled date patterns in preference order; the bare numeric date is
        // the last resort.
        let date_label_patterns = [
            r"(?i)Date of Service:\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
            r"(?i)Service Date:\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
            r"(?i)DOS:\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
            r"(?i)Date:\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
            r"(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
        ]
        .iter()
        .map(|p| compile(p))
        .collect::<Result<Vec<_>, _>>()?;

        let extra_date_patterns = config
            .date_patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;

        let provider_patterns = [
            r"(?i)Provider:\s*([^\n]+)",
            r"(?i)Physician:\s*([^\n]+)",
            r"(?i)Doctor:\s*([^\n]+)",
            r"(?i)Attending:\s*([^\n]+)",
            r"(?i)MD:\s*([^\n]+)",
        ]
        .iter()
        .map(|p| compile(p))
        .collect::<Result<Vec<_>, _>>()?;

        let facility_patterns = [
            r"(?i)Facility:\s*([^\n]+)",
            r"(?i)Hospital:\s*([^\n]+)",
            r"(?i)Clinic:\s*([^\n]+)",
            r"(?i)Medical Center:\s*([^\n]+)",
        ]
        .iter()
        .map(|p| compile(p))
        .collect::<Result<Vec<_>, _>>()?;

        // Canonical type names with their word-bounded trigger vocabularies.
        // Checked in order; the first type with any hit wins.
        let type_patterns = [
            ("Admission Note", r"admission|admit"),
            ("Discharge Summary", r"discharge"),
            ("Progress Note", r"progress|daily note"),
            ("Consultation", r"consultation|consult|referral"),
            ("Operative Report", r"operative|surgery|procedure|operation"),
            ("Laboratory Results", r"lab|laboratory|blood work"),
            ("Radiology Report", r"radiology|x-ray|ct|mri|ultrasound"),
            ("Pathology Report", r"pathology|biopsy|specimen"),
            ("Emergency Department", r"emergency|ed|er"),
            ("Nursing Note", r"nursing|nurse"),
            ("Medication List", r"medication|drug|prescription|pharmacy"),
            ("Vital Signs", r"vital signs|vitals|temperature|blood pressure"),
        ]
        .iter()
        .map(|(name, triggers)| Ok((*name, compile(&format!(r"(?i)\b(?:{triggers})\b"))?)))
        .collect::<Result<Vec<_>, MetadataError>>()?;

        Ok(Self {
            date_label_patterns,
            extra_date_patterns,
            provider_patterns,
            facility_patterns,
            type_patterns,
        })
    }

    fn extract_date(&self, text: &str) -> Option<NaiveDate> {
        for pattern in &self.date_label_patterns {
            if let Some(caps) = pattern.captures(text) {
                if let Some(date) = parse_date(&caps[1]) {
                    return Some(date);
                }
            }
        }
        for pattern in &self.extra_date_patterns {
            if let Some(found) = pattern.find(text) {
                if let Some(date) = parse_date(found.as_str()) {
                    return Some(date);
                }
            }
        }
        None
    }

    fn extract_document_type(&self, text: &str) -> Option<String> {
        for (name, pattern) in &self.type_patterns {
            if pattern.is_match(text) {
                return Some((*name).to_owned());
            }
        }
        // Fall back to the first all-caps header-looking line.
        for line in text.lines().take(10) {
            let line = line.trim();
            if line.chars().count() > 5 && is_caps_header(line) {
                let cleaned: String = line
                    .chars()
                    .filter(|c| c.is_ascii_uppercase() || c.is_whitespace())
                    .collect();
                let cleaned = cleaned.trim();
                if !cleaned.is_empty() {
                    return Some(title_case(cleaned));
                }
            }
        }
        None
    }

    fn extract_labeled(&self, patterns: &[Regex], text: &str) -> Option<String> {
        for pattern in patterns {
            if let Some(caps) = pattern.captures(text) {
                let value = caps[1].trim();
                if !value.is_empty() {
                    return Some(value.to_owned());
                }
            }
        }
        None
    }

    fn extract_keywords(&self, text: &str) -> Vec<String> {
        let filtered = filter_for_keywords(text);

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for raw in filtered.split(|c: char| !c.is_alphanumeric()) {
            if raw.is_empty() {
                continue;
            }
            let word = raw.to_lowercase();
            if is_valid_keyword(&word) {
                *counts.entry(word).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.into_iter().take(10).map(|(word, _)| word).collect()
    }
}

impl MetadataExtractor for PatternMetadataExtractor {
    fn enrich(&self, segment: &mut DocumentSegment) -> Result<(), MetadataError> {
        if segment.date_of_service.is_none() {
            segment.date_of_service = self.extract_date(&segment.text_content);
        }
        if segment.document_type.is_none() {
            segment.document_type = self.extract_document_type(&segment.text_content);
        }
        if segment.provider.is_none() {
            segment.provider = self.extract_labeled(&self.provider_patterns, &segment.text_content);
        }
        if segment.facility.is_none() {
            segment.facility = self.extract_labeled(&self.facility_patterns, &segment.text_content);
        }
        if segment.keywords.is_empty() {
            segment.keywords = self.extract_keywords(&segment.text_content);
        }
        debug!(
            segment_id = %segment.segment_id,
            dated = segment.date_of_service.is_some(),
            typed = segment.document_type.is_some(),
            "segment enriched"
        );
        Ok(())
    }
}

fn compile(pattern: &str) -> Result<Regex, MetadataError> {
    Regex::new(pattern).map_err(|source| MetadataError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })
}

fn parse_date(candidate: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
}

/// All cased characters uppercase, at least one letter.
fn is_caps_header(line: &str) -> bool {
    line.chars().any(|c| c.is_alphabetic()) && !line.chars().any(|c| c.is_lowercase())
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove page markers and lines that are mostly non-alphabetic before
/// keyword counting.
fn filter_for_keywords(text: &str) -> String {
    let stripped = PAGE_MARKER.replace_all(text, "");
    stripped
        .lines()
        .filter(|line| {
            let total = line.chars().count();
            if total == 0 {
                return false;
            }
            let alpha = line.chars().filter(|c| c.is_alphabetic()).count();
            alpha * 2 >= total
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validity rules for a candidate keyword: sensible length, mostly
/// alphabetic, no OCR-artifact character runs, not a stop word.
fn is_valid_keyword(word: &str) -> bool {
    let total = word.chars().count();
    if !(3..=30).contains(&total) {
        return false;
    }
    let alpha = word.chars().filter(|c| c.is_alphabetic()).count();
    if alpha * 10 < total * 7 {
        return false;
    }
    if has_char_run(word, 3) {
        return false;
    }
    if MEDICAL_INDICATORS
        .iter()
        .any(|indicator| word.contains(indicator))
    {
        return true;
    }
    !STOP_WORDS.contains(&word)
}

/// True when any character repeats `run` or more times consecutively.
fn has_char_run(word: &str, run: usize) -> bool {
    let mut count = 0;
    let mut previous = None;
    for c in word.chars() {
        if Some(c) == previous {
            count += 1;
            if count >= run {
                return true;
            }
        } else {
            previous = Some(c);
            count = 1;
        }
    }
    false
}
