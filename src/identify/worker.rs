//! Subprocess language-ID worker client.
//! Spawns an external detector (e.g. a fastText worker), talks JSON lines
//! over stdin/stdout: one ready line at start-up, then one request line and
//! one response line per call. stdout is drained on a dedicated thread into a
//! channel so every wait is bounded by the configured timeout.
//! Consecutive failures ≥ `max_failures` → marked unavailable until reset.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel as cb;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{Identification, LanguageIdentifier};
use crate::config::WorkerConfig;
use crate::detect::language::normalize_language;
use crate::metrics::{metric_names, MetricsRegistry};

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("failed to spawn language-ID worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("worker I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("worker did not answer within {0:?}")]
    Timeout(Duration),
    #[error("worker closed its output")]
    Closed,
    #[error("worker protocol error: {0}")]
    Protocol(String),
    #[error("worker unavailable after {0} consecutive failures")]
    Unavailable(u32),
}

/// Managed worker process with its stdin and a line channel fed from stdout.
struct WorkerProcess {
    child: Child,
    stdin: ChildStdin,
    lines: cb::Receiver<String>,
}

impl WorkerProcess {
    fn send_line(&mut self, line: &str) -> Result<(), WorkerError> {
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn recv_line(&self, timeout: Duration) -> Result<String, WorkerError> {
        match self.lines.recv_timeout(timeout) {
            Ok(line) => Ok(line),
            Err(cb::RecvTimeoutError::Timeout) => Err(WorkerError::Timeout(timeout)),
            Err(cb::RecvTimeoutError::Disconnected) => Err(WorkerError::Closed),
        }
    }

    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }
}

impl Drop for WorkerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// --- wire types ---

#[derive(Serialize)]
struct WorkerRequest<'a> {
    text: &'a str,
    languages: &'a [String],
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct WorkerResponse {
    status: Option<String>,
    error: Option<String>,
    confidence: Option<f64>,
    detected_languages: Option<Vec<String>>,
}

impl WorkerResponse {
    fn parse(line: &str) -> Result<Self, WorkerError> {
        serde_json::from_str(line)
            .map_err(|e| WorkerError::Protocol(format!("malformed response: {e}")))
    }
}

/// Language identifier backed by an external worker process.
pub struct WorkerIdentifier {
    worker: Mutex<Option<WorkerProcess>>,
    config: WorkerConfig,
    available: AtomicBool,
    consecutive_failures: AtomicU32,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl WorkerIdentifier {
    /// The process is not started until the first call.
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            worker: Mutex::new(None),
            config,
            available: AtomicBool::new(true),
            consecutive_failures: AtomicU32::new(0),
            metrics: None,
        }
    }

    /// Count failed calls under `fallback_failure` in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    fn spawn_worker(&self) -> Result<WorkerProcess, WorkerError> {
        info!(program = %self.config.program, "spawning language-ID worker");

        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(WorkerError::Spawn)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| WorkerError::Protocol("worker stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| WorkerError::Protocol("worker stdout unavailable".into()))?;

        let (tx, rx) = cb::unbounded();
        std::thread::Builder::new()
            .name("langid-worker-stdout".into())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    match line {
                        Ok(line) if line.trim().is_empty() => continue,
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
            })
            .map_err(WorkerError::Spawn)?;

        let process = WorkerProcess {
            child,
            stdin,
            lines: rx,
        };

        let ready = WorkerResponse::parse(&process.recv_line(self.timeout())?)?;
        if let Some(err) = ready.error {
            return Err(WorkerError::Protocol(format!("worker failed to start: {err}")));
        }
        if ready.status.as_deref() != Some("ready") {
            return Err(WorkerError::Protocol("worker did not signal ready".into()));
        }

        info!(pid = process.child.id(), "language-ID worker ready");
        Ok(process)
    }

    /// One request/response round trip. A failed exchange drops the process
    /// so the next call starts a fresh one.
    fn request(&self, text: &str, hints: &[String]) -> Result<Identification, WorkerError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(WorkerError::Unavailable(
                self.consecutive_failures.load(Ordering::SeqCst),
            ));
        }

        let mut guard = self.worker.lock();
        let needs_spawn = match guard.as_mut() {
            Some(w) => !w.is_alive(),
            None => true,
        };
        if needs_spawn {
            *guard = Some(self.spawn_worker()?);
        }
        let Some(worker) = guard.as_mut() else {
            return Err(WorkerError::Closed);
        };

        let payload = serde_json::to_string(&WorkerRequest {
            text,
            languages: hints,
        })
        .map_err(|e| WorkerError::Protocol(format!("serialize: {e}")))?;

        let exchange = worker
            .send_line(&payload)
            .and_then(|_| worker.recv_line(self.timeout()));
        let line = match exchange {
            Ok(line) => line,
            Err(e) => {
                *guard = None;
                return Err(e);
            }
        };

        let response = WorkerResponse::parse(&line)?;
        if let Some(err) = response.error {
            return Err(WorkerError::Protocol(err));
        }

        let language = response
            .detected_languages
            .as_ref()
            .and_then(|langs| langs.first())
            .map(|name| normalize_language(name));
        match language {
            Some(language) => Ok(Identification::new(
                language,
                response.confidence.unwrap_or(0.0),
            )),
            None => Ok(Identification::unknown()),
        }
    }

    fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
    }

    fn record_failure(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.incr(metric_names::FALLBACK_FAILURE);
        }
        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        if failures >= self.config.max_failures {
            warn!(failures, "max worker failures reached, marking unavailable");
            self.available.store(false, Ordering::SeqCst);
            *self.worker.lock() = None;
        }
    }

    /// True while a worker process is running. Does not spawn one.
    pub fn health_check(&self) -> bool {
        let mut guard = self.worker.lock();
        let alive = guard.as_mut().map(|w| w.is_alive()).unwrap_or(false);
        debug!(alive, "worker health check");
        alive
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Clear the failure streak and allow spawning again.
    pub fn reset(&self) {
        *self.worker.lock() = None;
        self.consecutive_failures.store(0, Ordering::SeqCst);
        self.available.store(true, Ordering::SeqCst);
        info!("language-ID worker reset");
    }
}

impl LanguageIdentifier for WorkerIdentifier {
    fn identify(&self, text: &str) -> Identification {
        self.identify_hinted(text, &[])
    }

    fn identify_hinted(&self, text: &str, hints: &[String]) -> Identification {
        let start = Instant::now();
        match self.request(text, hints) {
            Ok(id) => {
                self.record_success();
                debug!(
                    language = %id.language,
                    confidence = id.confidence,
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "worker identified span"
                );
                id
            }
            Err(WorkerError::Unavailable(_)) => Identification::unknown(),
            Err(e) => {
                warn!(error = %e, "worker identify failed");
                self.record_failure();
                Identification::unknown()
            }
        }
    }

    fn name(&self) -> &'static str {
        "worker"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell_worker(script: &str, timeout_ms: u64) -> WorkerIdentifier {
        WorkerIdentifier::new(WorkerConfig {
            program: "sh".into(),
            args: vec!["-c".into(), script.into()],
            timeout_ms,
            max_failures: 2,
        })
    }

    #[test]
    fn answers_are_normalized_to_codes() {
        let worker = shell_worker(
            r#"echo '{"status":"ready"}'; while read line; do echo '{"confidence":0.93,"detectedLanguages":["Spanish","English"]}'; done"#,
            2000,
        );
        let id = worker.identify("hola amigo");
        assert_eq!(id, Identification::new("es", 0.93));
        assert!(worker.health_check());

        // Same process serves the next request.
        assert_eq!(worker.identify("otra vez").language, "es");
    }

    #[test]
    fn hints_are_forwarded_to_the_worker() {
        let worker = shell_worker(
            r#"echo '{"status":"ready"}'
while read line; do
  case "$line" in
    *'"languages":["ur","en"]'*) echo '{"confidence":0.7,"detectedLanguages":["Urdu"]}' ;;
    *) echo '{"confidence":0.7,"detectedLanguages":["Hindi"]}' ;;
  esac
done"#,
            2000,
        );
        let hints = vec!["ur".to_string(), "en".to_string()];
        assert_eq!(worker.identify_hinted("kya haal hai", &hints).language, "ur");
        assert_eq!(worker.identify("kya haal hai").language, "hi");
    }

    #[test]
    fn error_lines_become_unknown() {
        let worker = shell_worker(
            r#"echo '{"status":"ready"}'; while read line; do echo '{"error":"Empty text provided"}'; done"#,
            2000,
        );
        assert!(worker.identify("x").is_unknown());
        assert!(worker.is_available());
    }

    #[test]
    fn silent_worker_times_out_to_unknown() {
        let worker = shell_worker(
            r#"echo '{"status":"ready"}'; while read line; do :; done"#,
            150,
        );
        let start = Instant::now();
        assert!(worker.identify("anything").is_unknown());
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(!worker.health_check());
    }

    #[test]
    fn missing_program_disables_after_max_failures() {
        let metrics = Arc::new(MetricsRegistry::new());
        let worker = WorkerIdentifier::new(WorkerConfig {
            program: "/nonexistent/codeswitch-langid-worker".into(),
            args: Vec::new(),
            timeout_ms: 100,
            max_failures: 2,
        })
        .with_metrics(Arc::clone(&metrics));
        assert!(worker.identify("a").is_unknown());
        assert!(worker.is_available());
        assert!(worker.identify("b").is_unknown());
        assert!(!worker.is_available());
        // Unavailable calls are not new failures.
        assert!(worker.identify("c").is_unknown());
        assert_eq!(metrics.counter(metric_names::FALLBACK_FAILURE), 2);

        worker.reset();
        assert!(worker.is_available());
    }

    #[test]
    fn startup_error_is_reported_as_unknown() {
        let worker = shell_worker(r#"echo '{"error":"Failed to initialize model"}'"#, 500);
        assert!(worker.identify("hello").is_unknown());
    }
}
