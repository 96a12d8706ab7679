//! codeswitch: code-switching detection for short mixed-language text.
//! Splits an utterance into language-homogeneous phrases, labels each with a
//! language and confidence, and reports the token indices where the language
//! changes. Results are cached per (text, hints) with LRU + TTL.

pub mod cache;
pub mod config;
pub mod detect;
pub mod detector;
pub mod identify;
pub mod metrics;

pub use cache::{AnalysisCache, CacheStats, Clock, ManualClock, SystemClock, TopEntry};
pub use config::{ConfigError, DetectorConfig, WorkerConfig};
pub use detect::{
    AnalysisResult, AnalysisStats, LanguageBreakdown, PhraseCluster, SupportedLanguage, Token,
};
pub use detector::CodeSwitchDetector;
pub use identify::{
    FallbackChain, Identification, LanguageIdentifier, StaticIdentifier, WhatlangIdentifier,
    WorkerError, WorkerIdentifier,
};
pub use metrics::{MetricSummary, MetricsRegistry};

/// Install a fmt subscriber filtered by `RUST_LOG` (default `codeswitch=info`).
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("codeswitch=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init();
}

/// Same as [`init_tracing`] but emits JSON lines.
pub fn init_json_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("codeswitch=info"));
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init();
}
