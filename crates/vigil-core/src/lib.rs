pub mod config;
pub mod coordinator;
pub mod metrics;
pub mod penalty;

pub use config::GuardConfig;
pub use coordinator::{Guard, StopHandle};
pub use metrics::{SessionMetrics, SessionReport};
pub use penalty::{PenaltyEnforcer, PenaltyPresenter, PenaltyState};
