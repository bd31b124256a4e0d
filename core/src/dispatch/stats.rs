//! Dispatch statistics and run phases

use std::fmt;
use tokio::time::Instant;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchPhase {
    /// Pulling from the arrival schedule
    #[default]
    Scheduling,
    /// Schedule exhausted, waiting for launched executions
    Draining,
    /// Every execution has produced its record
    Complete,
}

impl fmt::Display for DispatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchPhase::Scheduling => write!(f, "scheduling"),
            DispatchPhase::Draining => write!(f, "draining"),
            DispatchPhase::Complete => write!(f, "complete"),
        }
    }
}

/// Counters tracked by the dispatcher
#[derive(Debug, Default, Clone)]
pub struct DispatchStats {
    /// Executions started
    pub launched: usize,

    /// Executions that stored a record
    pub completed: usize,

    /// Executions that failed
    pub failed: usize,

    /// Current phase
    pub phase: DispatchPhase,

    /// Run start time
    pub started_at: Option<Instant>,

    /// Run end time
    pub ended_at: Option<Instant>,
}

impl DispatchStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking (records start time)
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stop tracking (records end time)
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Move to `phase`
    pub fn transition(&mut self, phase: DispatchPhase) {
        tracing::info!(
            from = %self.phase,
            to = %phase,
            launched = self.launched,
            completed = self.completed,
            in_flight = self.in_flight(),
            "Dispatch phase changed"
        );
        self.phase = phase;
    }

    /// Executions launched but not yet finished
    pub fn in_flight(&self) -> usize {
        self.launched
            .saturating_sub(self.completed)
            .saturating_sub(self.failed)
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Option<std::time::Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }

    /// Record a stored result
    pub fn record_success(&mut self) {
        self.completed += 1;
    }

    /// Record a failed execution
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_stats_defaults() {
        let stats = DispatchStats::default();
        assert_eq!(stats.launched, 0);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.phase, DispatchPhase::Scheduling);
        assert!(stats.started_at.is_none());
        assert!(stats.elapsed().is_none());
    }

    #[test]
    fn test_in_flight() {
        let mut stats = DispatchStats::new();
        stats.launched = 10;
        stats.record_success();
        stats.record_success();
        stats.record_failure();
        assert_eq!(stats.in_flight(), 7);
    }

    #[test]
    fn test_transition() {
        let mut stats = DispatchStats::new();
        stats.transition(DispatchPhase::Draining);
        assert_eq!(stats.phase, DispatchPhase::Draining);
        stats.transition(DispatchPhase::Complete);
        assert_eq!(stats.phase.to_string(), "complete");
    }

    #[test]
    fn test_start_stop() {
        let mut stats = DispatchStats::new();
        stats.start();
        std::thread::sleep(std::time::Duration::from_millis(10));
        stats.stop();

        let elapsed = stats.elapsed().unwrap();
        assert!(elapsed >= std::time::Duration::from_millis(10));
    }
}
