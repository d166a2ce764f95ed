//! Sentence segmentation for chunk splitting.
//!
//! Wraps Unicode sentence boundaries (UAX #29) with a merge pass for
//! clinical abbreviations ("Dr.", "M.D.", …) that would otherwise produce
//! spurious breaks. The splitter is built once per process and shared;
//! `LazyLock` guards concurrent first use.

use std::collections::HashSet;
use std::sync::LazyLock;

use unicode_segmentation::UnicodeSegmentation;

static SPLITTER: LazyLock<SentenceSplitter> = LazyLock::new(SentenceSplitter::build);

/// Abbreviations that end with a period but do not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "dr.", "mr.", "mrs.", "ms.", "md.", "m.d.", "d.o.", "ph.d.", "r.n.", "p.a.", "n.p.", "st.",
    "no.", "vs.", "e.g.", "i.e.", "approx.", "dept.", "inc.", "jr.", "sr.",
];

/// Sentence splitter with an abbreviation table.
pub struct SentenceSplitter {
    abbreviations: HashSet<&'static str>,
}

impl SentenceSplitter {
    fn build() -> Self {
        Self {
            abbreviations: ABBREVIATIONS.iter().copied().collect(),
        }
    }

    /// Shared process-wide instance.
    pub fn shared() -> &'static Self {
        &SPLITTER
    }

    /// Split `text` into trimmed, non-empty sentences.
    ///
    /// A boundary is suppressed when the preceding sentence ends with a known
    /// abbreviation, so "Seen by Dr. Lee today." stays one sentence.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut sentences: Vec<String> = Vec::new();
        for bound in text.split_sentence_bounds() {
            let piece = bound.trim();
            if piece.is_empty() {
                continue;
            }
            match sentences.last_mut() {
                Some(prev) if self.ends_with_abbreviation(prev) => {
                    prev.push(' ');
                    prev.push_str(piece);
                }
                _ => sentences.push(piece.to_owned()),
            }
        }
        sentences
    }

    fn ends_with_abbreviation(&self, sentence: &str) -> bool {
        sentence
            .rsplit(char::is_whitespace)
            .next()
            .map(|last| self.abbreviations.contains(last.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

/// Force initialization of the shared splitter. Callers may invoke this at
/// startup so first use inside a worker thread pays no setup cost.
pub fn ensure_initialized() {
    LazyLock::force(&SPLITTER);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_sentences() {
        let splitter = SentenceSplitter::shared();
        let sentences = splitter.split("First sentence. Second sentence. Third one here.");
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0], "First sentence.");
        assert_eq!(sentences[2], "Third one here.");
    }

    #[test]
    fn keeps_doctor_abbreviation_in_one_sentence() {
        let splitter = SentenceSplitter::shared();
        let sentences = splitter.split("Patient was seen by Dr. Lee today. Follow-up scheduled.");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].contains("Dr. Lee today."));
    }

    #[test]
    fn empty_text_yields_no_sentences() {
        let splitter = SentenceSplitter::shared();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("   \n  ").is_empty());
    }

    #[test]
    fn single_unterminated_sentence_survives() {
        let splitter = SentenceSplitter::shared();
        let sentences = splitter.split("no terminal punctuation at all");
        assert_eq!(sentences, vec!["no terminal punctuation at all"]);
    }

    #[test]
    fn ensure_initialized_is_idempotent() {
        ensure_initialized();
        ensure_initialized();
        assert!(!SentenceSplitter::shared().split("One. Two.").is_empty());
    }
}
