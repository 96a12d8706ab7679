//! Code-switching detection pipeline.
//! tokenize → cluster (adaptive windows + per-segment detection) →
//! switch points and aggregation. Result types live here; the cached,
//! logged entry point is [`crate::CodeSwitchDetector`].

pub mod aggregate;
pub mod cluster;
pub mod language;
pub mod lexicon;
pub mod segment;
pub mod window;

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One whitespace-delimited unit of input with its label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub word: String,
    pub language: String,
    pub confidence: f64,
}

/// Maximal run of consecutive tokens sharing a language.
/// `start_index`/`end_index` are inclusive token offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhraseCluster {
    pub words: Vec<String>,
    pub text: String,
    pub language: String,
    pub confidence: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub is_user_language: bool,
}

impl PhraseCluster {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Copy with indices moved by `offset` tokens.
    pub fn shifted(&self, offset: usize) -> Self {
        Self {
            start_index: self.start_index + offset,
            end_index: self.end_index + offset,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub tokens: Vec<Token>,
    pub phrases: Vec<PhraseCluster>,
    pub switch_points: Vec<usize>,
    pub confidence: f64,
    pub user_language_match: bool,
    pub detected_languages: BTreeSet<String>,
}

impl AnalysisResult {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Per-language slice of [`AnalysisStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageBreakdown {
    pub language: String,
    pub token_count: usize,
    pub phrase_count: usize,
    pub average_confidence: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStats {
    pub total_tokens: usize,
    pub total_phrases: usize,
    pub total_switch_points: usize,
    pub overall_confidence: f64,
    pub user_language_match: bool,
    pub detected_languages: BTreeSet<String>,
    pub language_breakdown: Vec<LanguageBreakdown>,
    pub average_words_per_phrase: f64,
}

/// Entry of the supported-language listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedLanguage {
    pub code: String,
    pub name: String,
}

static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence break pattern is valid"));

/// Whitespace tokenization; every returned slice is non-empty.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Split on runs of `.`, `!`, `?`, dropping the terminators and blank pieces.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Languages the lexical tables know, with display names.
pub fn supported_languages() -> Vec<SupportedLanguage> {
    lexicon::tabled_languages()
        .into_iter()
        .map(|code| SupportedLanguage {
            code: code.to_string(),
            name: language::language_name(code),
        })
        .collect()
}
