use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;
use vigil_ai::{ClassifierError, Verdict, VerdictClassifier};
use vigil_capture::ScreenCapture;

use crate::config::GuardConfig;
use crate::metrics::{SessionMetrics, SessionReport};
use crate::penalty::{PenaltyEnforcer, PenaltyState};

/// Granularity at which the scheduling loop notices stop requests and
/// penalty completion. Bounds shutdown latency.
const POLL_STEP: Duration = Duration::from_secs(1);

/// Completion event for one dispatched check.
struct CheckCompletion {
    seq: u64,
    result: Result<Verdict, ClassifierError>,
}

/// Externally-triggerable stop switch for a running guard.
#[derive(Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    /// Request a graceful stop. Future scheduling halts; in-flight work
    /// runs to natural completion.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Monitoring coordinator.
///
/// Drives the check cadence, dispatches classification off the scheduling
/// path, and reacts to verdicts by updating metrics and triggering the
/// penalty enforcer. The scheduler never waits on an in-flight check; while
/// a penalty is active, checking is suspended entirely.
pub struct Guard {
    config: GuardConfig,
    capturer: Box<dyn ScreenCapture>,
    classifier: Arc<dyn VerdictClassifier>,
    enforcer: Arc<PenaltyEnforcer>,
    metrics: Arc<Mutex<SessionMetrics>>,
    running: Arc<AtomicBool>,
    checks_dispatched: u64,
}

impl Guard {
    #[must_use]
    pub fn new(
        config: GuardConfig,
        capturer: Box<dyn ScreenCapture>,
        classifier: Arc<dyn VerdictClassifier>,
        enforcer: Arc<PenaltyEnforcer>,
    ) -> Self {
        Self {
            config,
            capturer,
            classifier,
            enforcer,
            metrics: Arc::new(Mutex::new(SessionMetrics::new())),
            running: Arc::new(AtomicBool::new(false)),
            checks_dispatched: 0,
        }
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Run until interrupted with Ctrl-C, then emit the final report.
    ///
    /// # Errors
    ///
    /// Propagates only startup failures; per-cycle errors are contained.
    pub async fn run_with_signals(&mut self) -> Result<SessionReport> {
        let handle = self.stop_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Received Ctrl-C, shutting down...");
                handle.stop();
            }
        });
        self.run().await
    }

    /// Run the scheduling loop until the stop handle fires, then produce
    /// the session report exactly once.
    ///
    /// # Errors
    ///
    /// Propagates only startup failures; per-cycle errors are contained.
    pub async fn run(&mut self) -> Result<SessionReport> {
        let session_id = Uuid::new_v4();
        self.running.store(true, Ordering::SeqCst);
        log::info!(
            "Monitoring session {session_id} started (check every {}s, penalty {}s)",
            self.config.check_interval.as_secs(),
            self.config.penalty_duration.as_secs()
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let handler = tokio::spawn(apply_completions(
            rx,
            Arc::clone(&self.metrics),
            Arc::clone(&self.enforcer),
            self.config.penalty_duration.as_secs(),
        ));

        while self.running.load(Ordering::SeqCst) {
            if self.enforcer.state() != PenaltyState::Idle {
                // Checking is suspended for the whole penalty; re-check at
                // poll granularity so a stop request is noticed promptly.
                tokio::time::sleep(POLL_STEP).await;
                continue;
            }

            self.run_cycle(&tx).await;
            self.wait_next_cycle().await;
        }

        // Completions landing after stop are logged by their own task and
        // excluded from the report. An active penalty is uninterruptible,
        // so let it finish before summarizing.
        drop(tx);
        handler.abort();
        self.enforcer.completed().await;

        let report = self.metrics.lock().await.summary();
        log::info!(
            "Monitoring session {session_id} stopped after {} completed checks",
            report.total_checks
        );
        Ok(report)
    }

    /// One check cycle: capture, then hand the image to a classification
    /// task. A capture failure skips the cycle and is contained here.
    async fn run_cycle(&mut self, tx: &mpsc::UnboundedSender<CheckCompletion>) {
        match self.capturer.capture().await {
            Ok(image) => self.dispatch_check(image, tx),
            Err(e) => log::warn!("Screen capture failed: {e}; skipping this cycle"),
        }
    }

    /// Dispatch classification without blocking the scheduling cadence.
    fn dispatch_check(&mut self, image: Vec<u8>, tx: &mpsc::UnboundedSender<CheckCompletion>) {
        self.checks_dispatched += 1;
        let seq = self.checks_dispatched;
        let classifier = Arc::clone(&self.classifier);
        let tx = tx.clone();

        log::debug!("Check #{seq}: captured {} bytes, classifying", image.len());
        tokio::spawn(async move {
            let result = classifier.classify(&image).await;
            if tx.send(CheckCompletion { seq, result }).is_err() {
                log::debug!("Check #{seq} completed after shutdown");
            }
        });
    }

    /// Sleep until the next interval boundary, polling the stop flag so
    /// shutdown latency stays within one poll step.
    async fn wait_next_cycle(&self) {
        let mut remaining = self.config.check_interval;
        while !remaining.is_zero() {
            if !self.running.load(Ordering::SeqCst) {
                return;
            }
            let step = remaining.min(POLL_STEP);
            tokio::time::sleep(step).await;
            remaining -= step;
        }
    }
}

/// Apply classification completions to the session metrics, in completion
/// order. Runs as its own task so updates from concurrent checks are
/// serialized; a distracted verdict also triggers the penalty enforcer.
async fn apply_completions(
    mut rx: mpsc::UnboundedReceiver<CheckCompletion>,
    metrics: Arc<Mutex<SessionMetrics>>,
    enforcer: Arc<PenaltyEnforcer>,
    penalty_seconds: u64,
) {
    while let Some(check) = rx.recv().await {
        match check.result {
            Ok(Verdict::Safe) => {
                let mut metrics = metrics.lock().await;
                metrics.record_safe();
                log::info!(
                    "Check #{}: safe (focus streak: {})",
                    check.seq,
                    metrics.current_focus_streak()
                );
            }
            Ok(Verdict::Distracted) => {
                metrics.lock().await.record_distracted(penalty_seconds);
                log::warn!("Check #{}: distracted, triggering penalty", check.seq);
                enforcer.start();
            }
            Err(e) => {
                log::warn!(
                    "Check #{}: classification failed: {e}; will retry next cycle",
                    check.seq
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use vigil_capture::CaptureError;

    use crate::penalty::PenaltyPresenter;

    struct ScriptedCapturer {
        responses: StdMutex<VecDeque<Result<Vec<u8>, CaptureError>>>,
    }

    impl ScriptedCapturer {
        fn new(responses: Vec<Result<Vec<u8>, CaptureError>>) -> Box<Self> {
            Box::new(Self {
                responses: StdMutex::new(responses.into_iter().collect()),
            })
        }

        fn always_ok() -> Box<Self> {
            Box::new(Self {
                responses: StdMutex::new(VecDeque::new()),
            })
        }
    }

    #[async_trait]
    impl ScreenCapture for ScriptedCapturer {
        async fn capture(&self) -> Result<Vec<u8>, CaptureError> {
            let next = self
                .responses
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .pop_front();
            // Exhausted scripts keep succeeding with a placeholder frame.
            next.unwrap_or_else(|| Ok(vec![0u8; 16]))
        }
    }

    struct ScriptedClassifier {
        verdicts: StdMutex<VecDeque<Result<Verdict, ClassifierError>>>,
    }

    impl ScriptedClassifier {
        fn new(verdicts: Vec<Result<Verdict, ClassifierError>>) -> Arc<Self> {
            Arc::new(Self {
                verdicts: StdMutex::new(verdicts.into_iter().collect()),
            })
        }
    }

    #[async_trait]
    impl VerdictClassifier for ScriptedClassifier {
        async fn classify(&self, _png: &[u8]) -> Result<Verdict, ClassifierError> {
            let next = self
                .verdicts
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .pop_front();
            next.unwrap_or(Ok(Verdict::Safe))
        }
    }

    struct SleepingPresenter;

    #[async_trait]
    impl PenaltyPresenter for SleepingPresenter {
        async fn present(&self, duration: Duration) -> Result<()> {
            tokio::time::sleep(duration).await;
            Ok(())
        }
    }

    fn test_guard(
        config: GuardConfig,
        capturer: Box<dyn ScreenCapture>,
        classifier: Arc<dyn VerdictClassifier>,
    ) -> Guard {
        let enforcer = Arc::new(PenaltyEnforcer::new(
            Arc::new(SleepingPresenter),
            config.penalty_duration,
        ));
        Guard::new(config, capturer, classifier, enforcer)
    }

    #[tokio::test]
    async fn failed_capture_contributes_no_check() {
        let capturer = ScriptedCapturer::new(vec![
            Err(CaptureError::EmptyImage),
            Ok(vec![0u8; 16]),
        ]);
        let classifier = ScriptedClassifier::new(vec![Ok(Verdict::Safe)]);
        let mut guard = test_guard(GuardConfig::new(40, 30), capturer, classifier);

        let (tx, rx) = mpsc::unbounded_channel();
        guard.run_cycle(&tx).await;
        guard.run_cycle(&tx).await;
        drop(tx);
        apply_completions(rx, Arc::clone(&guard.metrics), Arc::clone(&guard.enforcer), 30).await;

        let report = guard.metrics.lock().await.summary();
        assert_eq!(report.total_checks, 1);
        assert_eq!(report.safe_checks, 1);
    }

    #[tokio::test]
    async fn classifier_failure_leaves_metrics_untouched() {
        let capturer = ScriptedCapturer::always_ok();
        let classifier = ScriptedClassifier::new(vec![
            Err(ClassifierError::MalformedResponse { provider: "mock" }),
            Ok(Verdict::Safe),
        ]);
        let mut guard = test_guard(GuardConfig::new(40, 30), capturer, classifier);

        let (tx, rx) = mpsc::unbounded_channel();
        guard.run_cycle(&tx).await;
        guard.run_cycle(&tx).await;
        drop(tx);
        apply_completions(rx, Arc::clone(&guard.metrics), Arc::clone(&guard.enforcer), 30).await;

        let report = guard.metrics.lock().await.summary();
        assert_eq!(report.total_checks, 1);
        assert_eq!(report.safe_checks, 1);
        assert_eq!(report.distracted_checks, 0);
    }

    #[tokio::test]
    async fn distracted_verdict_triggers_the_enforcer() {
        let capturer = ScriptedCapturer::always_ok();
        let classifier = ScriptedClassifier::new(vec![Ok(Verdict::Distracted)]);
        let config = GuardConfig {
            check_interval: Duration::from_secs(40),
            penalty_duration: Duration::from_millis(20),
        };
        let enforcer = Arc::new(PenaltyEnforcer::new(
            Arc::new(SleepingPresenter),
            config.penalty_duration,
        ));
        let mut guard = Guard::new(config, capturer, classifier, Arc::clone(&enforcer));

        let (tx, rx) = mpsc::unbounded_channel();
        guard.run_cycle(&tx).await;
        drop(tx);
        apply_completions(rx, Arc::clone(&guard.metrics), Arc::clone(&guard.enforcer), 30).await;

        enforcer.completed().await;
        let report = guard.metrics.lock().await.summary();
        assert_eq!(report.distracted_checks, 1);
        assert_eq!(report.total_penalty_seconds, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduler_keeps_cadence_and_reports_on_stop() {
        let capturer = ScriptedCapturer::always_ok();
        let classifier = ScriptedClassifier::new(Vec::new());
        let mut guard = test_guard(GuardConfig::new(40, 30), capturer, classifier);

        let stop = guard.stop_handle();
        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(85)).await;
            stop.stop();
        });

        // Checks fire at t=0, t=40, t=80; stop lands at t=85.
        let report = guard.run().await.unwrap();
        stopper.await.unwrap();

        assert_eq!(report.total_checks, 3);
        assert_eq!(report.safe_checks, 3);
        assert_eq!(report.current_focus_streak, 3);
        assert_eq!(report.longest_focus_streak, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn checking_is_suspended_while_a_penalty_is_active() {
        let capturer = ScriptedCapturer::always_ok();
        let classifier = ScriptedClassifier::new(vec![Ok(Verdict::Distracted)]);
        let mut guard = test_guard(GuardConfig::new(40, 30), capturer, classifier);

        let stop = guard.stop_handle();
        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(35)).await;
            stop.stop();
        });

        // The only check (t=0) comes back distracted; the 30s penalty covers
        // the rest of the interval, and the stop at t=35 precedes the next
        // scheduled check at t=40.
        let report = guard.run().await.unwrap();
        stopper.await.unwrap();

        assert_eq!(report.total_checks, 1);
        assert_eq!(report.distracted_checks, 1);
        assert_eq!(report.total_penalty_seconds, 30);
    }
}
