//! Statistical language identification behind a single capability.
//! The segment detector only sees [`LanguageIdentifier`]; which backend
//! answers (whatlang in-process, the subprocess worker, or both chained) is
//! a construction-time choice.

pub mod worker;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::detect::language::UNKNOWN;

pub use worker::{WorkerError, WorkerIdentifier};

/// Best guess for a span of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    pub language: String,
    pub confidence: f64,
}

impl Identification {
    pub fn new(language: impl Into<String>, confidence: f64) -> Self {
        Self {
            language: language.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The `("unknown", 0)` sentinel.
    pub fn unknown() -> Self {
        Self {
            language: UNKNOWN.to_string(),
            confidence: 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.language == UNKNOWN
    }
}

/// Language identifier trait (adapter for different backends).
/// Implementations must not fail: any backend error becomes
/// [`Identification::unknown`] before it crosses this boundary.
pub trait LanguageIdentifier: Send + Sync {
    fn identify(&self, text: &str) -> Identification;

    /// [`identify`](Self::identify) with the caller's hints as normalized
    /// codes. Backends that cannot use hints ignore them.
    fn identify_hinted(&self, text: &str, _hints: &[String]) -> Identification {
        self.identify(text)
    }

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

impl<T: LanguageIdentifier + ?Sized> LanguageIdentifier for Arc<T> {
    fn identify(&self, text: &str) -> Identification {
        (**self).identify(text)
    }

    fn identify_hinted(&self, text: &str, hints: &[String]) -> Identification {
        (**self).identify_hinted(text, hints)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// In-process trigram detector backed by whatlang.
/// Unlike a whole-document detector this reports whatever confidence
/// whatlang computes, reliable or not; callers threshold it.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatlangIdentifier;

impl WhatlangIdentifier {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageIdentifier for WhatlangIdentifier {
    fn identify(&self, text: &str) -> Identification {
        match whatlang::detect(text) {
            Some(info) => Identification::new(lang_to_code(info.lang()), info.confidence()),
            None => Identification::unknown(),
        }
    }

    fn name(&self) -> &'static str {
        "whatlang"
    }
}

fn lang_to_code(lang: whatlang::Lang) -> &'static str {
    use whatlang::Lang::*;
    match lang {
        Eng => "en",
        Spa => "es",
        Fra => "fr",
        Deu => "de",
        Por => "pt",
        Ita => "it",
        Urd => "ur",
        Hin => "hi",
        Ara => "ar",
        Pes => "fa",
        Tur => "tr",
        Cmn => "zh",
        Jpn => "ja",
        Kor => "ko",
        Rus => "ru",
        Nld => "nl",
        Pol => "pl",
        Ukr => "uk",
        Vie => "vi",
        Tha => "th",
        Swe => "sv",
        Ben => "bn",
        Heb => "he",
        Ell => "el",
        Ces => "cs",
        Ron => "ro",
        Hun => "hu",
        Fin => "fi",
        Bul => "bg",
        Hrv => "hr",
        Slk => "sk",
        Lit => "lt",
        Lav => "lv",
        Est => "et",
        Slv => "sl",
        Mkd => "mk",
        Srp => "sr",
        Tgl => "tl",
        other => other.code(),
    }
}

/// Prefers `primary`; asks `secondary` only when the primary has no answer.
pub struct FallbackChain {
    primary: Box<dyn LanguageIdentifier>,
    secondary: Box<dyn LanguageIdentifier>,
}

impl FallbackChain {
    pub fn new(
        primary: impl LanguageIdentifier + 'static,
        secondary: impl LanguageIdentifier + 'static,
    ) -> Self {
        Self {
            primary: Box::new(primary),
            secondary: Box::new(secondary),
        }
    }
}

impl LanguageIdentifier for FallbackChain {
    fn identify(&self, text: &str) -> Identification {
        self.identify_hinted(text, &[])
    }

    fn identify_hinted(&self, text: &str, hints: &[String]) -> Identification {
        let first = self.primary.identify_hinted(text, hints);
        if !first.is_unknown() {
            return first;
        }
        tracing::debug!(
            primary = self.primary.name(),
            secondary = self.secondary.name(),
            "primary identifier had no answer, falling back"
        );
        self.secondary.identify_hinted(text, hints)
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}

/// Always answers the same thing. Useful to disable the statistical step
/// (`StaticIdentifier::unknown()`) or to pin it in tests.
#[derive(Debug, Clone)]
pub struct StaticIdentifier {
    answer: Identification,
}

impl StaticIdentifier {
    pub fn new(language: &str, confidence: f64) -> Self {
        Self {
            answer: Identification::new(language, confidence),
        }
    }

    pub fn unknown() -> Self {
        Self {
            answer: Identification::unknown(),
        }
    }
}

impl LanguageIdentifier for StaticIdentifier {
    fn identify(&self, _text: &str) -> Identification {
        self.answer.clone()
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whatlang_identifies_long_english() {
        let id = WhatlangIdentifier::new()
            .identify("This is a longer English sentence to ensure correct detection.");
        assert_eq!(id.language, "en");
        assert!(id.confidence > 0.0 && id.confidence <= 1.0);
    }

    #[test]
    fn whatlang_empty_is_unknown() {
        assert!(WhatlangIdentifier::new().identify("").is_unknown());
    }

    #[test]
    fn chain_prefers_primary() {
        let chain = FallbackChain::new(
            StaticIdentifier::new("es", 0.7),
            StaticIdentifier::new("en", 0.9),
        );
        assert_eq!(chain.identify("x"), Identification::new("es", 0.7));
    }

    #[test]
    fn chain_falls_back_on_unknown() {
        let chain = FallbackChain::new(StaticIdentifier::unknown(), StaticIdentifier::new("en", 0.9));
        assert_eq!(chain.identify("x"), Identification::new("en", 0.9));
    }

    /// Answers with the first hint it was given.
    struct FirstHint;

    impl LanguageIdentifier for FirstHint {
        fn identify(&self, _text: &str) -> Identification {
            Identification::unknown()
        }

        fn identify_hinted(&self, _text: &str, hints: &[String]) -> Identification {
            hints
                .first()
                .map(|h| Identification::new(h.as_str(), 0.5))
                .unwrap_or_else(Identification::unknown)
        }

        fn name(&self) -> &'static str {
            "first-hint"
        }
    }

    #[test]
    fn chain_passes_hints_through() {
        let chain = FallbackChain::new(StaticIdentifier::unknown(), Arc::new(FirstHint));
        let hints = vec!["ur".to_string()];
        assert_eq!(chain.identify_hinted("x", &hints), Identification::new("ur", 0.5));
        assert!(chain.identify("x").is_unknown());
        // Backends without hint support fall back to plain identify.
        assert!(StaticIdentifier::unknown().identify_hinted("x", &hints).is_unknown());
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Identification::new("en", 1.7).confidence, 1.0);
        assert_eq!(Identification::new("en", -0.2).confidence, 0.0);
    }
}
