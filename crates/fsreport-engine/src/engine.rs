//! Concurrent execution of resolved analysers.
//!
//! Every analyser gets its own worker on tokio's blocking pool. The engine
//! keeps the join handles indexed by requested position and awaits all of
//! them, so artifacts come back in requested order whatever order the
//! workers finish in.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use fsreport_analyze::{AnalysisError, AnalysisResult, Analyser, Artifact, ResolvedAnalyser};
use fsreport_core::Diagnostic;

use crate::config::EngineConfig;
use crate::outcome::{AnalyserOutcome, AnalyserState, EngineEvent, EngineOutcome};

/// Runs analysers concurrently against their shared tree.
#[derive(Debug, Clone, Default)]
pub struct ExecutionEngine {
    config: EngineConfig,
}

impl ExecutionEngine {
    /// Create an engine with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given settings.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Get the engine settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run every analyser to a terminal state and collect their artifacts.
    ///
    /// A failing, panicking or timed-out analyser is recorded as `Failed`
    /// with a diagnostic; its siblings are unaffected.
    pub async fn run(&self, analysers: Vec<ResolvedAnalyser>) -> EngineOutcome {
        self.execute(analysers, Reporter(None)).await
    }

    /// Like [`run`](Self::run), also sending every state change to `events`.
    pub async fn run_with_events(
        &self,
        analysers: Vec<ResolvedAnalyser>,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> EngineOutcome {
        self.execute(analysers, Reporter(Some(events))).await
    }

    async fn execute(&self, analysers: Vec<ResolvedAnalyser>, reporter: Reporter) -> EngineOutcome {
        let semaphore = (self.config.max_concurrency > 0)
            .then(|| Arc::new(Semaphore::new(self.config.max_concurrency)));

        info!(
            count = analysers.len(),
            max_concurrency = self.config.max_concurrency,
            "starting analysers"
        );

        let mut handles = Vec::with_capacity(analysers.len());
        for (position, resolved) in analysers.into_iter().enumerate() {
            let name = resolved.analyser.name().to_string();
            reporter.send(position, &name, AnalyserState::Pending);

            let worker = Worker {
                position,
                name: name.clone(),
                semaphore: semaphore.clone(),
                timeout: self.config.timeout,
                reporter: reporter.clone(),
            };
            let handle = tokio::spawn(worker.run(resolved.analyser));
            handles.push((position, resolved.id, name, handle));
        }

        let mut outcome = EngineOutcome::default();
        for (position, id, name, handle) in handles {
            let (result, elapsed) = match handle.await {
                Ok(done) => done,
                Err(err) => {
                    let err = join_failure(&name, err);
                    reporter.send(position, &name, AnalyserState::Failed);
                    (Err(err), Duration::ZERO)
                }
            };

            let (state, error) = match result {
                Ok(artifact) => {
                    outcome.artifacts.push(artifact);
                    (AnalyserState::Succeeded, None)
                }
                Err(err) => {
                    warn!(analyser = %name, error = %err, "analyser failed");
                    outcome.diagnostics.push(Diagnostic::analysis_failed(&name, &err));
                    (AnalyserState::Failed, Some(err))
                }
            };

            outcome.outcomes.push(AnalyserOutcome {
                position,
                id,
                name,
                state,
                elapsed,
                error,
            });
        }

        info!(
            succeeded = outcome.succeeded(),
            failed = outcome.failed(),
            "all analysers finished"
        );
        outcome
    }
}

/// Drives one analyser from `Pending` to a terminal state.
struct Worker {
    position: usize,
    name: String,
    semaphore: Option<Arc<Semaphore>>,
    timeout: Option<Duration>,
    reporter: Reporter,
}

impl Worker {
    async fn run(self, analyser: Box<dyn Analyser>) -> (AnalysisResult<Artifact>, Duration) {
        // The semaphore is never closed, so acquisition only fails on shutdown.
        let permit = match &self.semaphore {
            Some(semaphore) => Arc::clone(semaphore).acquire_owned().await.ok(),
            None => None,
        };

        self.reporter.send(self.position, &self.name, AnalyserState::Running);
        debug!(analyser = %self.name, position = self.position, "analyser running");
        let started = Instant::now();

        // The permit travels with the blocking thread, so a timed-out analyser
        // keeps its slot until it actually returns.
        let task = tokio::task::spawn_blocking(move || -> AnalysisResult<Artifact> {
            let _permit = permit;
            let mut analyser = analyser;
            analyser.analyze()?;
            analyser.produce_artifact()
        });

        // A timed-out blocking task cannot be stopped; it is left to finish
        // on its own and its result is discarded.
        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => Ok(Err(AnalysisError::Timeout {
                    analyser: self.name.clone(),
                    timeout: limit,
                })),
            },
            None => task.await,
        };

        let result = joined.unwrap_or_else(|err| Err(join_failure(&self.name, err)));
        let elapsed = started.elapsed();

        let state = if result.is_ok() {
            AnalyserState::Succeeded
        } else {
            AnalyserState::Failed
        };
        debug!(
            analyser = %self.name,
            state = %state,
            elapsed_ms = elapsed.as_millis() as u64,
            "analyser finished"
        );
        self.reporter.send(self.position, &self.name, state);

        (result, elapsed)
    }
}

fn join_failure(name: &str, err: JoinError) -> AnalysisError {
    if err.is_panic() {
        AnalysisError::Panicked {
            analyser: name.to_string(),
        }
    } else {
        AnalysisError::failed(name, format!("Task failed: {err}"))
    }
}

/// Optional sink for state changes.
#[derive(Clone)]
struct Reporter(Option<mpsc::UnboundedSender<EngineEvent>>);

impl Reporter {
    fn send(&self, position: usize, analyser: &str, state: AnalyserState) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(EngineEvent {
                position,
                analyser: analyser.to_string(),
                state,
            });
        }
    }
}
