//! Single-segment detection: best (language, confidence) for a short span.
//! Resolution order, first accepted answer wins:
//! lexical function word → romanized pattern → statistical identifier →
//! `("unknown", 0)`.

use std::time::Instant;

use super::lexicon::{self, apply_multiplier};
use crate::identify::{Identification, LanguageIdentifier};
use crate::metrics::{metric_names, MetricsRegistry};

/// Lexical hit in a language the caller did not hint.
pub const UNHINTED_LEXICAL_CONFIDENCE: f64 = 0.8;
/// Floor for romanized/statistical answers in a hinted language.
pub const USER_LANGUAGE_FLOOR: f64 = 0.4;
/// Romanized answers outside the hints need at least this raw confidence.
pub const ROMANIZED_ACCEPT: f64 = 0.3;

pub struct SegmentDetector<'a> {
    identifier: &'a dyn LanguageIdentifier,
    user_languages: &'a [String],
    threshold: f64,
    metrics: &'a MetricsRegistry,
}

impl<'a> SegmentDetector<'a> {
    /// `user_languages` must already be normalized codes.
    pub fn new(
        identifier: &'a dyn LanguageIdentifier,
        user_languages: &'a [String],
        threshold: f64,
        metrics: &'a MetricsRegistry,
    ) -> Self {
        Self {
            identifier,
            user_languages,
            threshold,
            metrics,
        }
    }

    fn is_user_language(&self, language: &str) -> bool {
        self.user_languages.iter().any(|l| l == language)
    }

    pub fn detect(&self, text: &str) -> Identification {
        if text.trim().is_empty() {
            return Identification::unknown();
        }

        if let Some(id) = self.lexical(text) {
            return id;
        }
        if let Some(id) = self.romanized(text) {
            return id;
        }
        if let Some(id) = self.statistical(text) {
            return id;
        }
        Identification::unknown()
    }

    fn lexical(&self, text: &str) -> Option<Identification> {
        text.split_whitespace()
            .find_map(|word| lexicon::classify_hinted(word, self.user_languages))
            .map(|(lang, hinted_confidence)| {
                let base = if self.is_user_language(lang) {
                    hinted_confidence
                } else {
                    UNHINTED_LEXICAL_CONFIDENCE
                };
                Identification::new(lang, apply_multiplier(lang, base))
            })
    }

    fn romanized(&self, text: &str) -> Option<Identification> {
        let (lang, confidence) = lexicon::match_romanized(text)?;
        if self.is_user_language(lang) {
            let floored = confidence.max(USER_LANGUAGE_FLOOR);
            return Some(Identification::new(lang, apply_multiplier(lang, floored)));
        }
        (confidence >= ROMANIZED_ACCEPT)
            .then(|| Identification::new(lang, apply_multiplier(lang, confidence)))
    }

    fn statistical(&self, text: &str) -> Option<Identification> {
        let start = Instant::now();
        let id = self.identifier.identify_hinted(text, self.user_languages);
        self.metrics.record(
            metric_names::FALLBACK_IDENTIFY,
            start.elapsed().as_micros() as f64,
        );
        if id.is_unknown() {
            return None;
        }

        let mut confidence = id.confidence;
        if self.is_user_language(&id.language) {
            confidence = confidence.max(USER_LANGUAGE_FLOOR);
        }
        let confidence = apply_multiplier(&id.language, confidence);
        (confidence >= self.threshold).then(|| Identification::new(id.language, confidence))
    }
}
