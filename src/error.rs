//! Crate-wide error taxonomy for the search and pool layers.
//!
//! Single-run simulation is total and never fails; errors arise from
//! preconditions (optimizer budget), lifecycle (cancellation, pool shutdown),
//! and worker transport.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// The optimizer needs at least one allocatable point to search over.
    #[error("stat budget is zero, nothing to optimize")]
    EmptyBudget,

    /// A pool must have at least one worker.
    #[error("worker pool size must be at least 1")]
    EmptyPool,

    /// The search was configured to evaluate zero candidates.
    #[error("candidate pool is empty, nothing to screen")]
    NoCandidates,

    /// Cancellation was observed between evaluations.
    #[error("optimization cancelled")]
    Cancelled,

    /// The pool has shut down; the request was not dispatched.
    #[error("worker pool is closed")]
    PoolClosed,

    /// A worker failed to deliver a response.
    #[error("worker failed: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_stable() {
        assert_eq!(
            SimError::EmptyBudget.to_string(),
            "stat budget is zero, nothing to optimize"
        );
        assert_eq!(SimError::Cancelled.to_string(), "optimization cancelled");
        assert_eq!(
            SimError::Worker("channel closed".into()).to_string(),
            "worker failed: channel closed"
        );
    }
}
