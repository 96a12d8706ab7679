use std::sync::Arc;

use codeswitch::{AnalysisResult, CodeSwitchDetector, StaticIdentifier};

const NO_HINTS: &[&str] = &[];

fn offline() -> CodeSwitchDetector {
    CodeSwitchDetector::with_identifier(Arc::new(StaticIdentifier::unknown()))
}

const SAMPLES: &[(&str, &[&str])] = &[
    ("the gato is black", &[]),
    ("main office gaya tha", &["Urdu", "English"]),
    ("Hola hi", &["Spanish", "English"]),
    (
        "yaar main kal office nahi ja raha because the meeting is cancelled and mujhe \
         ghar pe kaam karna hai",
        &["Urdu", "English"],
    ),
    (
        "I told him que no quiero ir porque the weather is bad and la lluvia es muy fuerte \
         today so we stay en casa con la familia and watch a movie together tonight after \
         dinner is ready",
        &["Spanish", "English"],
    ),
    ("inshallah kal milte hain", &[]),
    ("qqq zzz xxx", &["French"]),
];

fn assert_partition(text: &str, result: &AnalysisResult) {
    let words: Vec<&str> = text.split_whitespace().collect();
    let rebuilt: Vec<&str> = result
        .phrases
        .iter()
        .flat_map(|p| p.words.iter().map(String::as_str))
        .collect();
    assert_eq!(rebuilt, words, "phrases must cover the tokens in order: {text}");
    assert_eq!(result.tokens.len(), words.len());

    for (i, token) in result.tokens.iter().enumerate() {
        let owners: Vec<_> = result
            .phrases
            .iter()
            .filter(|p| p.start_index <= i && i <= p.end_index)
            .collect();
        assert_eq!(owners.len(), 1, "token {i} of {text:?}");
        assert_eq!(owners[0].language, token.language);
        assert_eq!(token.word, words[i]);
    }
}

fn assert_switch_points_valid(result: &AnalysisResult) {
    let starts: Vec<usize> = result.phrases.iter().skip(1).map(|p| p.start_index).collect();
    for sp in &result.switch_points {
        assert!(starts.contains(sp), "switch point {sp} is not a phrase start");
    }
    assert!(result.switch_points.windows(2).all(|w| w[0] < w[1]));
}

fn assert_confidence_bounds(result: &AnalysisResult) {
    assert!((0.0..=1.0).contains(&result.confidence));
    assert!(result
        .tokens
        .iter()
        .all(|t| (0.0..=1.0).contains(&t.confidence)));
    assert!(result
        .phrases
        .iter()
        .all(|p| (0.0..=1.0).contains(&p.confidence)));
}

#[test]
fn results_partition_tokens() {
    let detector = offline();
    for &(text, hints) in SAMPLES {
        let result = detector.analyze(text, hints);
        assert_partition(text, &result);
        assert_switch_points_valid(&result);
        assert_confidence_bounds(&result);
    }
}

#[test]
fn invariants_hold_with_whatlang() {
    let detector = CodeSwitchDetector::default();
    for &(text, hints) in SAMPLES {
        let result = detector.analyze(text, hints);
        assert_partition(text, &result);
        assert_switch_points_valid(&result);
        assert_confidence_bounds(&result);
    }
}

#[test]
fn analysis_is_deterministic() {
    let cached = offline();
    for &(text, hints) in SAMPLES {
        let first = cached.analyze(text, hints);
        let second = cached.analyze(text, hints);
        let fresh = offline().analyze(text, hints);
        assert_eq!(first, second);
        assert_eq!(first, fresh);
    }
}

#[test]
fn english_with_spanish_noun() {
    let result = CodeSwitchDetector::default().analyze("the gato is black", NO_HINTS);
    assert!(result.detected_languages.contains("en"));
    assert_eq!(result.tokens[0].language, "en");
    assert_eq!(result.tokens[2].language, "en");
    // whatlang cannot place a lone "gato" above the threshold, and an
    // unknown neighbour never forms a switch point.
    assert_eq!(result.tokens[1].language, "unknown");
    assert!(result.switch_points.is_empty());
}

#[test]
fn romanized_urdu_postpositions_stay_urdu() {
    let text = "woh ghar se aaya to main ja raha tha";
    let result = offline().analyze(text, &["Urdu", "English"]);
    assert_eq!(result.tokens[2].word, "se");
    assert_eq!(result.tokens[2].language, "ur");
    assert_eq!(result.tokens[6].language, "ur");
    assert!(!result.detected_languages.contains("es"));
    assert!(!result.detected_languages.contains("de"));
    assert!(result.user_language_match);
}

#[test]
fn french_article_follows_french_hint() {
    let detector = offline();
    let hinted = detector.analyze("le chat", &["French"]);
    assert_eq!(hinted.tokens[0].language, "fr");
    assert!((hinted.tokens[0].confidence - 0.9).abs() < 1e-9);

    let plain = detector.analyze("le chat", NO_HINTS);
    assert_eq!(plain.tokens[0].language, "es");
}

#[test]
fn romanized_urdu_with_english() {
    let result = offline().analyze("main office gaya tha", &["Urdu", "English"]);
    assert!(result.user_language_match);
    assert!(result.tokens.iter().all(|t| t.language != "unknown"));
    let langs: Vec<&str> = result.tokens.iter().map(|t| t.language.as_str()).collect();
    assert_eq!(langs, vec!["ur", "en", "ur", "ur"]);
    assert_eq!(
        result.detected_languages.iter().cloned().collect::<Vec<_>>(),
        vec!["en", "ur"]
    );
}

#[test]
fn empty_text_gives_empty_result() {
    let detector = offline();
    for text in ["", "   \n\t "] {
        let result = detector.analyze(text, &["English"]);
        assert!(result.tokens.is_empty());
        assert!(result.phrases.is_empty());
        assert!(result.switch_points.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert!(!result.user_language_match);
        assert!(result.detected_languages.is_empty());
    }
}

#[test]
fn two_word_switch() {
    let result = offline().analyze("Hola hi", &["Spanish", "English"]);
    assert_eq!(result.phrases.len(), 2);
    assert!(result.phrases.iter().all(|p| p.len() == 1));
    assert_eq!(result.switch_points, vec![1]);
    assert!(result.user_language_match);
}

#[test]
fn hints_never_lower_romanized_confidence() {
    let detector = offline();
    for text in ["inshallah kal milte hain", "yaar bohot acha hai"] {
        let plain = detector.analyze(text, NO_HINTS);
        let hinted = detector.analyze(text, &["Urdu"]);
        for (p, h) in plain.tokens.iter().zip(&hinted.tokens) {
            if p.language == "ur" && h.language == "ur" {
                assert!(h.confidence >= p.confidence, "{text}: {p:?} vs {h:?}");
            }
        }
    }
}

#[test]
fn unknown_text_has_no_switches() {
    let result = offline().analyze("qqq zzz xxx", &["French"]);
    assert!(result.switch_points.is_empty());
    assert!(result.detected_languages.is_empty());
    assert!(!result.user_language_match);
    assert_eq!(result.confidence, 0.0);
}

#[test]
fn multi_sentence_offsets() {
    let detector = offline();
    let text = "main office gaya tha. Hola hi!";
    let result = detector.analyze_multi_sentence(text, &["Urdu", "English"]);
    assert_eq!(result.tokens.len(), 6);
    assert_partition("main office gaya tha Hola hi", &result);
    assert_switch_points_valid(&result);
    assert!(result.switch_points.contains(&5));
    assert!(result.user_language_match);
    assert!(result.detected_languages.contains("es"));
}

#[test]
fn stats_summarize_result() {
    let detector = offline();
    let result = detector.analyze("main office gaya tha", &["Urdu", "English"]);
    let stats = detector.stats(&result);
    assert_eq!(stats.total_tokens, 4);
    assert_eq!(stats.total_phrases, result.phrases.len());
    assert_eq!(stats.total_switch_points, result.switch_points.len());
    let total: f64 = stats.language_breakdown.iter().map(|b| b.percentage).sum();
    assert!((total - 100.0).abs() < 1e-9);

    let json = serde_json::to_value(&stats).unwrap();
    assert!(json.get("languageBreakdown").is_some());
    assert!(json.get("averageWordsPerPhrase").is_some());
}

#[test]
fn result_serializes_camel_case() {
    let result = offline().analyze("Hola hi", &["Spanish", "English"]);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["switchPoints"], serde_json::json!([1]));
    assert_eq!(json["phrases"][1]["startIndex"], 1);
    assert_eq!(json["userLanguageMatch"], true);

    let back: AnalysisResult = serde_json::from_value(json).unwrap();
    assert_eq!(back, result);
}

#[test]
fn supported_languages_cover_lexicon() {
    let langs = offline().supported_languages();
    for code in ["en", "es", "ur", "hi", "ar"] {
        assert!(langs.iter().any(|l| l.code == code), "{code} missing");
    }
}
