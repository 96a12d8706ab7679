//! Language name ↔ code normalization.
//! User hints arrive as free-form display names ("Spanish", "urdu") and are
//! reduced to the short codes the lexicon and identifiers speak.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Label for spans no signal could resolve.
pub const UNKNOWN: &str = "unknown";

static NAME_TO_CODE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("english", "en"),
        ("spanish", "es"),
        ("hindi", "hi"),
        ("mandarin", "zh"),
        ("chinese", "zh"),
        ("french", "fr"),
        ("arabic", "ar"),
        ("portuguese", "pt"),
        ("russian", "ru"),
        ("japanese", "ja"),
        ("german", "de"),
        ("korean", "ko"),
        ("italian", "it"),
        ("dutch", "nl"),
        ("swedish", "sv"),
        ("norwegian", "no"),
        ("tagalog", "tl"),
        ("urdu", "ur"),
        ("bengali", "bn"),
        ("vietnamese", "vi"),
        ("turkish", "tr"),
        ("polish", "pl"),
        ("ukrainian", "uk"),
        ("czech", "cs"),
        ("greek", "el"),
        ("hebrew", "he"),
        ("thai", "th"),
        ("romanian", "ro"),
        ("hungarian", "hu"),
        ("finnish", "fi"),
        ("bulgarian", "bg"),
        ("croatian", "hr"),
        ("slovak", "sk"),
        ("lithuanian", "lt"),
        ("latvian", "lv"),
        ("estonian", "et"),
        ("slovenian", "sl"),
        ("macedonian", "mk"),
        ("albanian", "sq"),
        ("serbian", "sr"),
        ("bosnian", "bs"),
        ("montenegrin", "cnr"),
        ("maltese", "mt"),
        ("persian", "fa"),
        ("farsi", "fa"),
    ])
});

static CODE_TO_NAME: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("en", "English"),
        ("es", "Spanish"),
        ("hi", "Hindi"),
        ("zh", "Chinese"),
        ("fr", "French"),
        ("ar", "Arabic"),
        ("pt", "Portuguese"),
        ("ru", "Russian"),
        ("ja", "Japanese"),
        ("de", "German"),
        ("ko", "Korean"),
        ("it", "Italian"),
        ("nl", "Dutch"),
        ("sv", "Swedish"),
        ("no", "Norwegian"),
        ("tl", "Tagalog"),
        ("ur", "Urdu"),
        ("bn", "Bengali"),
        ("vi", "Vietnamese"),
        ("tr", "Turkish"),
        ("pl", "Polish"),
        ("uk", "Ukrainian"),
        ("cs", "Czech"),
        ("el", "Greek"),
        ("he", "Hebrew"),
        ("th", "Thai"),
        ("ro", "Romanian"),
        ("hu", "Hungarian"),
        ("fi", "Finnish"),
        ("bg", "Bulgarian"),
        ("hr", "Croatian"),
        ("sk", "Slovak"),
        ("lt", "Lithuanian"),
        ("lv", "Latvian"),
        ("et", "Estonian"),
        ("sl", "Slovenian"),
        ("mk", "Macedonian"),
        ("sq", "Albanian"),
        ("sr", "Serbian"),
        ("bs", "Bosnian"),
        ("mt", "Maltese"),
        ("fa", "Persian"),
    ])
});

/// Normalize a display name to a short code.
/// Known codes pass through; unrecognized names fall back to their first two
/// lowercased characters.
pub fn normalize_language(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    if let Some(code) = NAME_TO_CODE.get(lower.as_str()) {
        return (*code).to_string();
    }
    if CODE_TO_NAME.contains_key(lower.as_str()) || lower == UNKNOWN {
        return lower;
    }
    lower.chars().take(2).collect()
}

/// Normalize a hint list, dropping blanks and duplicates while keeping order.
pub fn normalize_languages<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if name.as_ref().trim().is_empty() {
            continue;
        }
        let code = normalize_language(name.as_ref());
        if !out.contains(&code) {
            out.push(code);
        }
    }
    out
}

/// Readable name for a code, or the uppercased code when it is not tabled.
pub fn language_name(code: &str) -> String {
    CODE_TO_NAME
        .get(code)
        .map(|n| (*n).to_string())
        .unwrap_or_else(|| code.to_uppercase())
}
