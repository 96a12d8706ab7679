//! Turns a cluster list into the public result: switch points, per-token
//! labels, overall confidence and language coverage. Also merges per-sentence
//! results and derives the reporting statistics.

use std::collections::{BTreeMap, BTreeSet};

use super::language::UNKNOWN;
use super::{AnalysisResult, AnalysisStats, LanguageBreakdown, PhraseCluster, Token};

/// A switch needs at least one side at or above this confidence.
pub const SWITCH_MIN_CONFIDENCE: f64 = 0.4;

/// Start index of every cluster whose language differs from its predecessor,
/// skipping `unknown` neighbours and pairs where both sides are weak.
pub fn switch_points(phrases: &[PhraseCluster]) -> Vec<usize> {
    phrases
        .windows(2)
        .filter(|pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            prev.language != cur.language
                && prev.language != UNKNOWN
                && cur.language != UNKNOWN
                && (prev.confidence >= SWITCH_MIN_CONFIDENCE
                    || cur.confidence >= SWITCH_MIN_CONFIDENCE)
        })
        .map(|pair| pair[1].start_index)
        .collect()
}

/// One token per word, each carrying its cluster's label.
pub fn flatten_tokens(phrases: &[PhraseCluster]) -> Vec<Token> {
    phrases
        .iter()
        .flat_map(|phrase| {
            phrase.words.iter().map(move |word| Token {
                word: word.clone(),
                language: phrase.language.clone(),
                confidence: phrase.confidence,
            })
        })
        .collect()
}

/// Unweighted mean of cluster confidences.
pub fn mean_confidence(phrases: &[PhraseCluster]) -> f64 {
    if phrases.is_empty() {
        return 0.0;
    }
    phrases.iter().map(|p| p.confidence).sum::<f64>() / phrases.len() as f64
}

pub fn detected_languages(phrases: &[PhraseCluster]) -> BTreeSet<String> {
    phrases
        .iter()
        .filter(|p| p.language != UNKNOWN)
        .map(|p| p.language.clone())
        .collect()
}

/// Every hint detected. No hints never matches.
pub fn user_language_match(user_languages: &[String], detected: &BTreeSet<String>) -> bool {
    !user_languages.is_empty() && user_languages.iter().all(|l| detected.contains(l))
}

pub fn build_result(phrases: Vec<PhraseCluster>, user_languages: &[String]) -> AnalysisResult {
    let detected = detected_languages(&phrases);
    AnalysisResult {
        tokens: flatten_tokens(&phrases),
        switch_points: switch_points(&phrases),
        confidence: mean_confidence(&phrases),
        user_language_match: user_language_match(user_languages, &detected),
        detected_languages: detected,
        phrases,
    }
}

/// Concatenate per-sentence results, shifting indices by the tokens before
/// each sentence. Confidence is the mean over sentences; the user-language
/// flag holds if any sentence matched.
pub fn merge_sentences(results: &[AnalysisResult]) -> AnalysisResult {
    let mut merged = AnalysisResult::default();
    if results.is_empty() {
        return merged;
    }

    let mut offset = 0;
    for result in results {
        merged.tokens.extend(result.tokens.iter().cloned());
        merged
            .phrases
            .extend(result.phrases.iter().map(|p| p.shifted(offset)));
        merged
            .switch_points
            .extend(result.switch_points.iter().map(|sp| sp + offset));
        merged
            .detected_languages
            .extend(result.detected_languages.iter().cloned());
        merged.user_language_match |= result.user_language_match;
        offset += result.tokens.len();
    }
    merged.confidence =
        results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64;
    merged
}

#[derive(Default)]
struct LanguageTally {
    tokens: usize,
    phrases: usize,
    confidence_sum: f64,
}

/// Reporting view of a result. The breakdown lists every cluster language,
/// `unknown` included, in code order.
pub fn compute_stats(result: &AnalysisResult) -> AnalysisStats {
    let mut tallies: BTreeMap<&str, LanguageTally> = BTreeMap::new();
    for phrase in &result.phrases {
        let tally = tallies.entry(phrase.language.as_str()).or_default();
        tally.tokens += phrase.len();
        tally.phrases += 1;
        tally.confidence_sum += phrase.confidence;
    }

    let total_tokens = result.tokens.len();
    let language_breakdown = tallies
        .into_iter()
        .map(|(language, tally)| LanguageBreakdown {
            language: language.to_string(),
            token_count: tally.tokens,
            phrase_count: tally.phrases,
            average_confidence: tally.confidence_sum / tally.phrases as f64,
            percentage: if total_tokens == 0 {
                0.0
            } else {
                tally.tokens as f64 * 100.0 / total_tokens as f64
            },
        })
        .collect();

    let total_phrases = result.phrases.len();
    AnalysisStats {
        total_tokens,
        total_phrases,
        total_switch_points: result.switch_points.len(),
        overall_confidence: result.confidence,
        user_language_match: result.user_language_match,
        detected_languages: result.detected_languages.clone(),
        language_breakdown,
        average_words_per_phrase: if total_phrases == 0 {
            0.0
        } else {
            total_tokens as f64 / total_phrases as f64
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase(words: &[&str], language: &str, confidence: f64, start: usize) -> PhraseCluster {
        PhraseCluster {
            words: words.iter().map(|w| w.to_string()).collect(),
            text: words.join(" "),
            language: language.into(),
            confidence,
            start_index: start,
            end_index: start + words.len() - 1,
            is_user_language: false,
        }
    }

    fn codes(langs: &[&str]) -> Vec<String> {
        langs.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn switch_points_need_evidence() {
        let phrases = vec![
            phrase(&["the", "cat"], "en", 0.9, 0),
            phrase(&["gato"], "es", 0.3, 2),
            phrase(&["qqq"], UNKNOWN, 0.0, 3),
            phrase(&["perro"], "es", 0.3, 4),
            phrase(&["chien"], "fr", 0.35, 5),
            phrase(&["dog"], "en", 0.8, 6),
        ];
        // es→unknown and unknown→es skipped, es(0.3)→fr(0.35) too weak.
        assert_eq!(switch_points(&phrases), vec![2, 6]);
    }

    #[test]
    fn same_language_neighbours_are_not_switches() {
        let phrases = vec![
            phrase(&["a", "b", "c"], "en", 0.9, 0),
            phrase(&["d"], "en", 0.9, 3),
        ];
        assert!(switch_points(&phrases).is_empty());
    }

    #[test]
    fn tokens_repeat_cluster_labels() {
        let phrases = vec![
            phrase(&["main", "gaya"], "ur", 1.0, 0),
            phrase(&["office"], "en", 0.9, 2),
        ];
        let tokens = flatten_tokens(&phrases);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].word, "gaya");
        assert_eq!(tokens[1].language, "ur");
        assert_eq!(tokens[2].confidence, 0.9);
    }

    #[test]
    fn result_aggregates() {
        let phrases = vec![
            phrase(&["main"], "ur", 1.0, 0),
            phrase(&["office"], "en", 0.9, 1),
            phrase(&["qqq"], UNKNOWN, 0.0, 2),
        ];
        let result = build_result(phrases, &codes(&["ur", "en"]));
        assert!((result.confidence - 1.9 / 3.0).abs() < 1e-9);
        assert_eq!(
            result.detected_languages,
            BTreeSet::from(["en".to_string(), "ur".to_string()])
        );
        assert!(result.user_language_match);
        assert_eq!(result.switch_points, vec![1]);
    }

    #[test]
    fn user_language_match_requires_all_hints() {
        let detected = BTreeSet::from(["en".to_string()]);
        assert!(user_language_match(&codes(&["en"]), &detected));
        assert!(!user_language_match(&codes(&["en", "es"]), &detected));
        assert!(!user_language_match(&[], &detected));
    }

    #[test]
    fn merge_offsets_and_any_match() {
        let hints = codes(&["es", "en"]);
        let first = build_result(
            vec![phrase(&["hola"], "es", 0.9, 0), phrase(&["amigo"], "en", 0.5, 1)],
            &hints,
        );
        let second = build_result(vec![phrase(&["bien"], "es", 0.7, 0)], &hints);
        assert!(first.user_language_match);
        assert!(!second.user_language_match);

        let merged = merge_sentences(&[first, second]);
        assert_eq!(merged.tokens.len(), 3);
        assert_eq!(merged.phrases[2].start_index, 2);
        assert_eq!(merged.phrases[2].end_index, 2);
        assert_eq!(merged.switch_points, vec![1]);
        assert!(merged.user_language_match);
        assert!((merged.confidence - (0.7 + 0.7) / 2.0).abs() < 1e-9);
        assert_eq!(merged.detected_languages.len(), 2);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert_eq!(merge_sentences(&[]), AnalysisResult::default());
    }

    #[test]
    fn stats_breakdown() {
        let phrases = vec![
            phrase(&["main", "gaya"], "ur", 1.0, 0),
            phrase(&["office"], "en", 0.9, 2),
            phrase(&["tha"], "ur", 0.8, 3),
        ];
        let result = build_result(phrases, &codes(&["ur"]));
        let stats = compute_stats(&result);

        assert_eq!(stats.total_tokens, 4);
        assert_eq!(stats.total_phrases, 3);
        assert_eq!(stats.total_switch_points, 2);
        assert!((stats.average_words_per_phrase - 4.0 / 3.0).abs() < 1e-9);

        let ur = &stats.language_breakdown[1];
        assert_eq!(ur.language, "ur");
        assert_eq!((ur.token_count, ur.phrase_count), (3, 2));
        assert!((ur.average_confidence - 0.9).abs() < 1e-9);
        assert!((ur.percentage - 75.0).abs() < 1e-9);
        assert_eq!(stats.language_breakdown[0].language, "en");
    }

    #[test]
    fn stats_of_empty_result() {
        let stats = compute_stats(&AnalysisResult::default());
        assert_eq!(stats.total_tokens, 0);
        assert_eq!(stats.average_words_per_phrase, 0.0);
        assert!(stats.language_breakdown.is_empty());
    }
}
