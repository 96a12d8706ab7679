//! Lexical and script tables.
//! Function words (plus a few greetings and common code-mixed loanwords) map
//! to every language that lists them; romanized Urdu/Hindi/Arabic/Persian are matched by
//! per-language regex word lists. All tables are data: adding a language is a
//! new row, not a new branch.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

/// Base confidence of a clean lexical hit.
pub const LEXICAL_CONFIDENCE: f64 = 0.9;
/// Minimum matched-word ratio for a romanized pattern to count.
pub const ROMANIZED_MIN_RATIO: f64 = 0.2;
/// Romanized hits are less certain than dictionary hits.
pub const ROMANIZED_DISCOUNT: f64 = 0.8;

/// A form listed by several rows resolves to a hinted language if one lists
/// it, else to the earliest row.
const FUNCTION_WORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "a", "an", "and", "or", "but", "is", "are", "was", "were", "be", "been",
            "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
            "my", "your", "his", "our", "their", "this", "that", "these", "those", "of", "in",
            "on", "at", "to", "for", "with", "from", "by", "about", "not", "do", "does", "did",
            "have", "has", "had", "will", "would", "can", "could", "should", "what", "who",
            "where", "when", "why", "how", "hi", "hello", "hey", "yes", "please", "thanks",
            "okay", "ok", "no", "as", "so", "if", "just", "all", "there", "office", "meeting",
            "online", "phone", "work", "school", "join",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "los", "las", "un", "una", "unos", "unas", "y", "pero", "es", "son",
            "está", "están", "yo", "tú", "él", "ella", "nosotros", "ellos", "ellas", "que",
            "de", "del", "en", "por", "para", "con", "sin", "muy", "hola", "gracias", "sí",
            "como", "porque", "también", "mi", "tu", "su", "lo", "le", "se", "al", "cuando",
            "donde", "bueno", "adiós", "más",
        ],
    ),
    (
        "fr",
        &[
            "le", "les", "une", "des", "et", "ou", "mais", "je", "il", "elle", "nous", "vous",
            "ils", "elles", "est", "sont", "du", "au", "aux", "avec", "pour", "dans", "sur",
            "pas", "ne", "oui", "non", "bonjour", "merci", "très", "cest", "qui", "quoi", "ce",
            "cette",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "oder", "aber", "ich", "du", "er", "sie", "wir", "ihr",
            "ist", "sind", "nicht", "ein", "eine", "einen", "mit", "von", "zu", "auf", "für",
            "ja", "nein", "danke", "hallo", "auch", "sehr", "wie", "dem", "den", "im",
        ],
    ),
    (
        "pt",
        &[
            "o", "os", "as", "um", "uma", "e", "é", "não", "sim", "você", "eu", "ele", "nós",
            "eles", "do", "da", "dos", "das", "no", "na", "em", "com", "obrigado", "obrigada",
            "olá", "muito", "mas", "isso", "isto", "também",
        ],
    ),
    (
        "it",
        &[
            "il", "gli", "uno", "ed", "è", "sono", "non", "io", "lui", "lei", "noi", "voi",
            "loro", "di", "nel", "della", "delle", "che", "per", "ciao", "grazie", "molto",
            "anche", "questo", "quello", "perché", "buongiorno",
        ],
    ),
    (
        "ur",
        &[
            "main", "mein", "hum", "tum", "aap", "ap", "yeh", "woh", "hai", "hain", "tha",
            "thi", "gaya", "gayi", "ka", "ki", "ke", "ko", "se", "par", "aur", "bhi", "nahi",
            "nahin", "kya", "kyun", "kaise", "kahan", "jab", "tab", "mera", "meri", "mere",
            "tera", "tumhara", "hamara", "apna", "ho", "hoon", "raha", "rahi", "rahe", "kar",
            "karna", "kiya", "acha", "theek", "lekin", "magar", "abhi", "shukriya", "janab",
            "zaroor", "ja", "aaya", "aya", "ghar",
        ],
    ),
    (
        "hi",
        &[
            "namaste", "namaskar", "dhanyavad", "dhanyavaad", "haan", "accha", "achha",
            "bahut", "kuch", "mujhe", "mujhko", "tumhe", "unka", "iska", "uska", "kyunki",
            "isliye", "phir", "bhai", "yaar", "ji", "chalo", "bilkul", "sab", "log", "aaj",
        ],
    ),
    (
        "ar",
        &[
            "ana", "anta", "enta", "inta", "anti", "huwa", "hiya", "nahnu", "habibi",
            "habibti", "yalla", "yallah", "wallah", "wallahi", "shukran", "marhaba", "ahlan",
            "khalas", "aiwa", "aywa", "kayf", "kaifa", "ila", "min",
        ],
    ),
    (
        "fa",
        &[
            "shoma", "ast", "hast", "nist", "chera", "mamnoon", "khoobi", "khubi", "baraye",
            "kheili", "kheyli", "bale",
        ],
    ),
    (
        "tr",
        &[
            "ve", "bir", "bu", "şu", "ben", "sen", "biz", "siz", "onlar", "değil", "evet",
            "hayır", "merhaba", "teşekkür", "teşekkürler", "için", "ile", "ama", "çok", "nasıl",
        ],
    ),
];

/// Regex fragments per language for informal romanization.
const ROMANIZED_PATTERNS: &[(&str, &[&str])] = &[
    (
        "ur",
        &[
            r"ha+i+n?", r"nahi+n?", r"kya", r"mein", r"main", r"aap", r"hum", r"yeh", r"woh",
            r"k[aie]", r"ko", r"se", r"aur", r"bhi", r"tha", r"thi", r"gaya", r"gayi",
            r"inshall?ah", r"masha?llah", r"assalam(?:u)?", r"w?alaikum", r"khuda", r"hafiz",
            r"shukriya", r"janab", r"bohat|bohot", r"theek|thik", r"acha+",
        ],
    ),
    (
        "hi",
        &[
            r"namast[e]+", r"namaskar", r"dhanyava+d", r"ha+n", r"bahut", r"kuch", r"mujhe",
            r"kyunki", r"isliye", r"phir", r"bhai", r"yaar", r"ji", r"chalo", r"bilkul",
            r"bhagwan", r"ram ram", r"achh?a",
        ],
    ),
    (
        "ar",
        &[
            r"habibi?t?i", r"yall?ah?", r"wall?ahi?", r"shukran", r"marhaba", r"ahlan",
            r"alhamdulill?ah", r"bismill?ah", r"khalas", r"aiwa|aywa", r"ana", r"ent?a|inta",
            r"salaam",
        ],
    ),
    (
        "fa",
        &[
            r"shoma", r"ast", r"hast", r"nist", r"chera", r"mamnoon", r"kh[ou]+bi",
            r"baraye", r"khe[iy]li", r"bale", r"khodahafez",
        ],
    ),
];

/// Confidence multipliers for languages the statistical fallback
/// under-scores when they are written in Latin script.
const SCRIPT_MULTIPLIERS: &[(&str, f64)] = &[
    ("ur", 1.2),
    ("hi", 1.1),
    ("ar", 1.1),
    ("fa", 1.1),
    ("tr", 1.05),
    ("en", 1.0),
    ("es", 1.0),
    ("fr", 1.0),
    ("de", 1.0),
    ("pt", 1.0),
    ("it", 1.0),
];

static WORD_TABLE: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
    for (lang, words) in FUNCTION_WORDS {
        for word in *words {
            let langs = table.entry(*word).or_default();
            if !langs.contains(lang) {
                langs.push(*lang);
            }
        }
    }
    table
});

static ROMANIZED: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    ROMANIZED_PATTERNS
        .iter()
        .map(|(lang, fragments)| {
            let pattern = format!(r"(?i)\b(?:{})\b", fragments.join("|"));
            let regex = Regex::new(&pattern).expect("romanized pattern table is valid");
            (*lang, regex)
        })
        .collect()
});

/// Lowercase a word and drop everything that is not a letter or digit.
pub fn clean_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Every language listing `word`, in table order.
pub fn languages_for(word: &str) -> &'static [&'static str] {
    let cleaned = clean_word(word);
    WORD_TABLE
        .get(cleaned.as_str())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Look a single word up in the function-word table.
pub fn classify(word: &str) -> Option<(&'static str, f64)> {
    classify_hinted(word, &[])
}

/// [`classify`], preferring a listed language that appears in `hints`.
pub fn classify_hinted(word: &str, hints: &[String]) -> Option<(&'static str, f64)> {
    let langs = languages_for(word);
    langs
        .iter()
        .copied()
        .find(|lang| hints.iter().any(|h| h.as_str() == *lang))
        .or_else(|| langs.first().copied())
        .map(|lang| (lang, LEXICAL_CONFIDENCE))
}

/// Score `text` against every romanized word list.
/// The best language is kept when at least a fifth of the words match; its
/// confidence is the match ratio discounted by [`ROMANIZED_DISCOUNT`].
pub fn match_romanized(text: &str) -> Option<(&'static str, f64)> {
    let total = text.split_whitespace().count();
    if total == 0 {
        return None;
    }

    let mut best: Option<(&'static str, f64)> = None;
    for (lang, regex) in ROMANIZED.iter() {
        let matches = regex.find_iter(text).count();
        let ratio = (matches as f64 / total as f64).min(1.0);
        if best.map_or(true, |(_, b)| ratio > b) {
            best = Some((*lang, ratio));
        }
    }

    best.filter(|(_, ratio)| *ratio >= ROMANIZED_MIN_RATIO)
        .map(|(lang, ratio)| (lang, ratio * ROMANIZED_DISCOUNT))
}

/// Per-language confidence multiplier (1.0 when untabled).
pub fn script_multiplier(language: &str) -> f64 {
    SCRIPT_MULTIPLIERS
        .iter()
        .find(|(code, _)| *code == language)
        .map(|(_, m)| *m)
        .unwrap_or(1.0)
}

/// `min(confidence × multiplier, 1.0)`.
pub fn apply_multiplier(language: &str, confidence: f64) -> f64 {
    (confidence * script_multiplier(language)).clamp(0.0, 1.0)
}

/// Every language code the tables can produce, sorted.
pub fn tabled_languages() -> BTreeSet<&'static str> {
    FUNCTION_WORDS
        .iter()
        .map(|(lang, _)| *lang)
        .chain(ROMANIZED_PATTERNS.iter().map(|(lang, _)| *lang))
        .collect()
}
