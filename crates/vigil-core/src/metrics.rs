use serde::Serialize;

/// Mutable session counters, updated once per completed check.
///
/// Errored cycles never reach these counters, so
/// `safe_checks + distracted_checks == total_checks` always holds.
#[derive(Debug, Default)]
pub struct SessionMetrics {
    total_checks: u32,
    safe_checks: u32,
    distracted_checks: u32,
    total_penalty_seconds: u64,
    current_focus_streak: u32,
    longest_focus_streak: u32,
    focus_streak_history: Vec<u32>,
}

impl SessionMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a safe verdict: extends the current focus streak.
    pub fn record_safe(&mut self) {
        self.total_checks += 1;
        self.safe_checks += 1;
        self.current_focus_streak += 1;
        if self.current_focus_streak > self.longest_focus_streak {
            self.longest_focus_streak = self.current_focus_streak;
        }
    }

    /// Record a distracted verdict: books the penalty time and, if a streak
    /// was running, archives it before resetting to zero.
    pub fn record_distracted(&mut self, penalty_seconds: u64) {
        self.total_checks += 1;
        self.distracted_checks += 1;
        self.total_penalty_seconds += penalty_seconds;
        if self.current_focus_streak > 0 {
            self.focus_streak_history.push(self.current_focus_streak);
            self.current_focus_streak = 0;
        }
    }

    #[must_use]
    pub fn total_checks(&self) -> u32 {
        self.total_checks
    }

    #[must_use]
    pub fn current_focus_streak(&self) -> u32 {
        self.current_focus_streak
    }

    /// Derive a read-only report from the current counters. Never mutates,
    /// so repeated calls without intervening records are identical.
    #[must_use]
    pub fn summary(&self) -> SessionReport {
        let focus_rate =
            f64::from(self.safe_checks) / f64::from(self.total_checks.max(1)) * 100.0;

        // Mean of completed streaks; the running streak stands in when no
        // streak has completed yet.
        let average_focus_streak = if self.focus_streak_history.is_empty() {
            f64::from(self.current_focus_streak)
        } else {
            let total: u32 = self.focus_streak_history.iter().sum();
            f64::from(total) / self.focus_streak_history.len() as f64
        };

        SessionReport {
            total_checks: self.total_checks,
            safe_checks: self.safe_checks,
            distracted_checks: self.distracted_checks,
            focus_rate,
            total_penalty_seconds: self.total_penalty_seconds,
            current_focus_streak: self.current_focus_streak,
            longest_focus_streak: self.longest_focus_streak,
            average_focus_streak,
            focus_streak_history: self.focus_streak_history.clone(),
        }
    }
}

/// End-of-session report derived from [`SessionMetrics::summary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub total_checks: u32,
    pub safe_checks: u32,
    pub distracted_checks: u32,
    pub focus_rate: f64,
    pub total_penalty_seconds: u64,
    pub current_focus_streak: u32,
    pub longest_focus_streak: u32,
    pub average_focus_streak: f64,
    pub focus_streak_history: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_safe_checks_build_a_streak() {
        let mut metrics = SessionMetrics::new();
        metrics.record_safe();
        metrics.record_safe();
        metrics.record_safe();

        let report = metrics.summary();
        assert_eq!(report.current_focus_streak, 3);
        assert_eq!(report.longest_focus_streak, 3);
        assert!(report.focus_streak_history.is_empty());
        assert_eq!(report.total_checks, 3);
        assert_eq!(report.safe_checks, 3);
    }

    #[test]
    fn distraction_archives_the_streak_and_books_penalty_time() {
        let mut metrics = SessionMetrics::new();
        metrics.record_safe();
        metrics.record_safe();
        metrics.record_distracted(30);

        let report = metrics.summary();
        assert_eq!(report.focus_streak_history, vec![2]);
        assert_eq!(report.current_focus_streak, 0);
        assert_eq!(report.total_penalty_seconds, 30);
        assert_eq!(report.distracted_checks, 1);
    }

    #[test]
    fn distraction_with_no_running_streak_archives_nothing() {
        let mut metrics = SessionMetrics::new();
        metrics.record_distracted(30);
        metrics.record_distracted(30);

        let report = metrics.summary();
        assert!(report.focus_streak_history.is_empty());
        assert_eq!(report.total_penalty_seconds, 60);
    }

    #[test]
    fn longest_streak_never_decreases() {
        let mut metrics = SessionMetrics::new();
        metrics.record_safe();
        metrics.record_safe();
        metrics.record_distracted(30);
        metrics.record_safe();

        let report = metrics.summary();
        assert_eq!(report.longest_focus_streak, 2);
        assert_eq!(report.current_focus_streak, 1);
        assert!(report.longest_focus_streak >= report.current_focus_streak);
    }

    #[test]
    fn safe_and_distracted_always_sum_to_total() {
        let mut metrics = SessionMetrics::new();
        metrics.record_safe();
        metrics.record_distracted(30);
        metrics.record_safe();
        metrics.record_safe();
        metrics.record_distracted(30);

        let report = metrics.summary();
        assert_eq!(report.safe_checks + report.distracted_checks, report.total_checks);
    }

    #[test]
    fn summary_is_idempotent() {
        let mut metrics = SessionMetrics::new();
        metrics.record_safe();
        metrics.record_distracted(30);

        assert_eq!(metrics.summary(), metrics.summary());
    }

    #[test]
    fn focus_rate_handles_an_empty_session() {
        let metrics = SessionMetrics::new();
        let report = metrics.summary();
        assert!((report.focus_rate - 0.0).abs() < f64::EPSILON);
        assert!((report.average_focus_streak - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_streak_falls_back_to_the_running_streak() {
        let mut metrics = SessionMetrics::new();
        metrics.record_safe();
        metrics.record_safe();

        let report = metrics.summary();
        assert!((report.average_focus_streak - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_streak_is_the_mean_of_completed_streaks() {
        let mut metrics = SessionMetrics::new();
        metrics.record_safe();
        metrics.record_safe();
        metrics.record_distracted(30);
        metrics.record_safe();
        metrics.record_safe();
        metrics.record_safe();
        metrics.record_safe();
        metrics.record_distracted(30);

        let report = metrics.summary();
        assert_eq!(report.focus_streak_history, vec![2, 4]);
        assert!((report.average_focus_streak - 3.0).abs() < f64::EPSILON);
    }
}
