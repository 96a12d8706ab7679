//! Cached code-switching detector.
//! analyze: cache → tokenize → cluster → aggregate → cache.
//! Never fails: bad input and backend trouble both end up as empty or
//! `unknown`-labelled results.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{AnalysisCache, CacheStats, Clock, SystemClock};
use crate::config::DetectorConfig;
use crate::detect::aggregate::{build_result, compute_stats, merge_sentences};
use crate::detect::cluster::cluster_words;
use crate::detect::language::normalize_languages;
use crate::detect::segment::SegmentDetector;
use crate::detect::{self, AnalysisResult, AnalysisStats, SupportedLanguage};
use crate::identify::{FallbackChain, LanguageIdentifier, WhatlangIdentifier, WorkerIdentifier};
use crate::metrics::{metric_names, MetricsRegistry};

pub struct CodeSwitchDetector {
    config: DetectorConfig,
    cache: AnalysisCache,
    identifier: Arc<dyn LanguageIdentifier>,
    metrics: Arc<MetricsRegistry>,
}

impl Default for CodeSwitchDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl CodeSwitchDetector {
    /// whatlang as the statistical step, preceded by the subprocess worker
    /// when one is configured.
    pub fn new(config: DetectorConfig) -> Self {
        let metrics = Arc::new(MetricsRegistry::new());
        let identifier: Arc<dyn LanguageIdentifier> = match &config.worker {
            Some(worker) => {
                info!(program = %worker.program, "using worker identifier with whatlang fallback");
                Arc::new(FallbackChain::new(
                    WorkerIdentifier::new(worker.clone()).with_metrics(Arc::clone(&metrics)),
                    WhatlangIdentifier::new(),
                ))
            }
            None => Arc::new(WhatlangIdentifier::new()),
        };
        Self::with_parts(config, identifier, metrics, Arc::new(SystemClock))
    }

    /// Fully injected construction; `config.worker` is ignored.
    pub fn with_parts(
        config: DetectorConfig,
        identifier: Arc<dyn LanguageIdentifier>,
        metrics: Arc<MetricsRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = AnalysisCache::with_clock(config.cache_capacity, config.cache_ttl(), clock);
        Self {
            config,
            cache,
            identifier,
            metrics,
        }
    }

    /// Default config with a custom statistical step.
    pub fn with_identifier(identifier: Arc<dyn LanguageIdentifier>) -> Self {
        Self::with_parts(
            DetectorConfig::default(),
            identifier,
            Arc::new(MetricsRegistry::new()),
            Arc::new(SystemClock),
        )
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Segment `text` into language-homogeneous phrases.
    /// `user_languages` are display names or codes ("Urdu", "en").
    pub fn analyze<S: AsRef<str>>(&self, text: &str, user_languages: &[S]) -> AnalysisResult {
        if text.trim().is_empty() {
            return AnalysisResult::default();
        }

        if let Some(hit) = self.cache.get(text, user_languages) {
            self.metrics.incr(metric_names::CACHE_HIT);
            debug!(tokens = hit.tokens.len(), "analysis served from cache");
            return hit;
        }
        self.metrics.incr(metric_names::CACHE_MISS);

        let span = self.metrics.span(metric_names::ANALYZE);
        let result = self.compute(text, user_languages);
        let elapsed_us = span.finish();
        debug!(
            tokens = result.tokens.len(),
            phrases = result.phrases.len(),
            switch_points = result.switch_points.len(),
            elapsed_us,
            "analysis complete"
        );

        self.cache.set(text, user_languages, result.clone());
        result
    }

    fn compute<S: AsRef<str>>(&self, text: &str, user_languages: &[S]) -> AnalysisResult {
        let hints = normalize_languages(user_languages);
        let threshold = self.config.threshold_for(!hints.is_empty());
        let words = detect::tokenize(text);

        let segment =
            SegmentDetector::new(self.identifier.as_ref(), &hints, threshold, &self.metrics);
        let span = self.metrics.span(metric_names::CLUSTER);
        let phrases = cluster_words(&words, &segment, &hints);
        span.finish();

        build_result(phrases, &hints)
    }

    /// Analyze each sentence on its own and stitch the results together.
    /// `user_language_match` is true when any single sentence matched, unlike
    /// [`analyze`](Self::analyze) which needs every hint in one result.
    pub fn analyze_multi_sentence<S: AsRef<str>>(
        &self,
        text: &str,
        user_languages: &[S],
    ) -> AnalysisResult {
        let results: Vec<AnalysisResult> = detect::split_sentences(text)
            .into_iter()
            .map(|sentence| self.analyze(sentence, user_languages))
            .collect();
        debug!(sentences = results.len(), "multi-sentence analysis");
        merge_sentences(&results)
    }

    pub fn stats(&self, result: &AnalysisResult) -> AnalysisStats {
        compute_stats(result)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("analysis cache cleared");
    }

    pub fn supported_languages(&self) -> Vec<SupportedLanguage> {
        detect::supported_languages()
    }
}
