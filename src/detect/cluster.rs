//! Phrase clustering: the core segmentation pass.
//! At each token every candidate window (per the adaptive policy) is scored
//! and the most confident answer drives the decision: a language change, or
//! a cluster already `max_size` long, closes the current cluster; otherwise
//! the token joins it and the running confidence moves by an EMA.
//! Expressed as a fold over token indices, each step consuming the previous
//! state, so intermediate states can be inspected in tests.

use super::segment::SegmentDetector;
use super::window::{window_for, WindowRange};
use super::PhraseCluster;
use crate::identify::Identification;

/// Weight kept by the running confidence when a token joins a cluster.
pub const EMA_RETAIN: f64 = 0.7;

/// Cluster being grown.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub start: usize,
    pub words: Vec<String>,
    pub language: String,
    pub confidence: f64,
}

impl Draft {
    fn open(start: usize, word: &str, id: Identification) -> Self {
        Self {
            start,
            words: vec![word.to_string()],
            language: id.language,
            confidence: id.confidence,
        }
    }

    fn extend(mut self, word: &str, candidate_confidence: f64) -> Self {
        self.words.push(word.to_string());
        self.confidence =
            EMA_RETAIN * self.confidence + (1.0 - EMA_RETAIN) * candidate_confidence;
        self
    }

    fn close(self, user_languages: &[String]) -> PhraseCluster {
        let end_index = self.start + self.words.len() - 1;
        let is_user_language = user_languages.iter().any(|l| *l == self.language);
        PhraseCluster {
            text: self.words.join(" "),
            words: self.words,
            language: self.language,
            confidence: self.confidence,
            start_index: self.start,
            end_index,
            is_user_language,
        }
    }
}

/// Fold state: closed clusters plus the one in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterState {
    pub closed: Vec<PhraseCluster>,
    pub current: Option<Draft>,
}

impl ClusterState {
    /// Apply the decision rule for token `index` given its best candidate.
    pub fn step(
        self,
        index: usize,
        word: &str,
        best: Identification,
        max_size: usize,
        user_languages: &[String],
    ) -> Self {
        let ClusterState { mut closed, current } = self;
        let current = match current {
            Some(draft) if draft.language == best.language && draft.words.len() < max_size => {
                draft.extend(word, best.confidence)
            }
            Some(draft) => {
                closed.push(draft.close(user_languages));
                Draft::open(index, word, best)
            }
            None => Draft::open(index, word, best),
        };
        ClusterState {
            closed,
            current: Some(current),
        }
    }

    pub fn finish(self, user_languages: &[String]) -> Vec<PhraseCluster> {
        let mut closed = self.closed;
        if let Some(draft) = self.current {
            closed.push(draft.close(user_languages));
        }
        closed
    }
}

/// Most confident answer over the candidate windows starting at `index`.
/// Ties keep the narrower window.
pub fn best_candidate(
    words: &[&str],
    index: usize,
    window: WindowRange,
    detector: &SegmentDetector<'_>,
) -> Identification {
    let remaining = words.len() - index;
    let mut best: Option<Identification> = None;
    for size in window.candidate_sizes(remaining) {
        let span = words[index..index + size].join(" ");
        let candidate = detector.detect(&span);
        if best
            .as_ref()
            .map_or(true, |b| candidate.confidence > b.confidence)
        {
            best = Some(candidate);
        }
    }
    best.unwrap_or_else(Identification::unknown)
}

/// Partition `words` into language-homogeneous clusters.
/// `user_languages` must already be normalized codes.
pub fn cluster_words(
    words: &[&str],
    detector: &SegmentDetector<'_>,
    user_languages: &[String],
) -> Vec<PhraseCluster> {
    let window = window_for(words.len());
    words
        .iter()
        .enumerate()
        .fold(ClusterState::default(), |state, (index, word)| {
            let best = best_candidate(words, index, window, detector);
            state.step(index, word, best, window.max_size, user_languages)
        })
        .finish(user_languages)
}
