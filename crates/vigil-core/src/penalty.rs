use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

/// Lifecycle of the blocking penalty presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyState {
    Idle,
    Starting,
    Active,
}

/// Presentation surface for the penalty. Implementations own all rendering
/// detail; the enforcer only observes start and completion.
#[async_trait]
pub trait PenaltyPresenter: Send + Sync {
    /// Occupy the presentation surface for the full duration.
    async fn present(&self, duration: Duration) -> anyhow::Result<()>;
}

/// Serializes penalty activation: at most one penalty runs at a time,
/// however many distracted verdicts arrive while it is showing.
pub struct PenaltyEnforcer {
    presenter: Arc<dyn PenaltyPresenter>,
    duration: Duration,
    state: watch::Sender<PenaltyState>,
}

impl PenaltyEnforcer {
    #[must_use]
    pub fn new(presenter: Arc<dyn PenaltyPresenter>, duration: Duration) -> Self {
        let (state, _) = watch::channel(PenaltyState::Idle);
        Self { presenter, duration, state }
    }

    #[must_use]
    pub fn state(&self) -> PenaltyState {
        *self.state.borrow()
    }

    /// Start a penalty. Returns `false` without re-triggering when one is
    /// already starting or active, so near-simultaneous distracted verdicts
    /// produce exactly one visible penalty.
    pub fn start(&self) -> bool {
        // Atomic check-and-set: only one caller can claim Idle -> Starting.
        let claimed = self.state.send_if_modified(|state| {
            if *state == PenaltyState::Idle {
                *state = PenaltyState::Starting;
                true
            } else {
                false
            }
        });
        if !claimed {
            log::debug!("Penalty already in progress, ignoring duplicate trigger");
            return false;
        }

        let presenter = Arc::clone(&self.presenter);
        let duration = self.duration;
        let state = self.state.clone();
        tokio::spawn(async move {
            // Dropping the guard restores Idle on every exit path, including
            // a panicking or failing presenter.
            let _release = ReleaseGuard { state: state.clone() };
            state.send_replace(PenaltyState::Active);
            log::warn!("Penalty active for {}s, checks suspended", duration.as_secs());

            if let Err(e) = presenter.present(duration).await {
                log::error!("Penalty presentation failed: {e:#}");
            }
        });
        true
    }

    /// Wait until no penalty is starting or active.
    pub async fn completed(&self) {
        let mut rx = self.state.subscribe();
        while *rx.borrow_and_update() != PenaltyState::Idle {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

struct ReleaseGuard {
    state: watch::Sender<PenaltyState>,
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.state.send_replace(PenaltyState::Idle);
        log::info!("Penalty finished, presentation surface released");
    }
}
