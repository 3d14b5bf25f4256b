use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use semfrag_common::Config;

use crate::SearchError;

/// Shared flag that stops every search holding the same handle.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// A fresh, uncancelled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Searches notice on their next step.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Clears a previous cancellation.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    /// True once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Step counter bounding one fragment query.
///
/// Every selection and every matcher node costs one step. The counter is
/// atomic so the per-sentence workers of a query can share it.
#[derive(Debug)]
pub struct SearchBudget {
    limit: Option<u64>,
    steps: AtomicU64,
    cancel: CancelHandle,
}

/// Point-in-time view of a budget, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetSnapshot {
    /// Step limit, if any.
    pub limit: Option<u64>,
    /// Steps spent so far.
    pub steps: u64,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl SearchBudget {
    /// A budget of `limit` steps with its own cancel handle.
    pub fn new(limit: Option<u64>) -> Self {
        Self::with_cancel(limit, CancelHandle::new())
    }

    /// A budget that only stops on cancellation.
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// A budget that also stops when `cancel` fires.
    pub fn with_cancel(limit: Option<u64>, cancel: CancelHandle) -> Self {
        Self {
            limit,
            steps: AtomicU64::new(0),
            cancel,
        }
    }

    /// A budget of `config.node_budget` steps that stops when `cancel` fires.
    pub fn from_config(config: &Config, cancel: CancelHandle) -> Self {
        Self::with_cancel(config.node_budget, cancel)
    }

    /// A handle that cancels this budget from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Spends one step.
    pub fn tick(&self) -> Result<(), SearchError> {
        let steps = self.steps.fetch_add(1, Ordering::Relaxed) + 1;
        if self.cancel.is_cancelled() || self.limit.is_some_and(|limit| steps > limit) {
            return Err(SearchError::Aborted { steps });
        }
        Ok(())
    }

    /// Steps spent so far.
    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::Relaxed)
    }

    /// Copies the current limit and step count.
    pub fn snapshot(&self) -> BudgetSnapshot {
        BudgetSnapshot {
            limit: self.limit,
            steps: self.steps(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_inclusive() {
        let budget = SearchBudget::new(Some(2));
        assert!(budget.tick().is_ok());
        assert!(budget.tick().is_ok());
        assert_eq!(budget.tick(), Err(SearchError::Aborted { steps: 3 }));
    }

    #[test]
    fn cancel_stops_next_tick() {
        let budget = SearchBudget::unlimited();
        let handle = budget.cancel_handle();
        assert!(budget.tick().is_ok());
        handle.cancel();
        assert!(matches!(budget.tick(), Err(SearchError::Aborted { .. })));
        handle.reset();
        assert!(budget.tick().is_ok());
        assert_eq!(budget.snapshot().steps, 3);
    }

    #[test]
    fn config_budget_shares_the_cancel_handle() {
        let config = Config::builder().node_budget(Some(5)).build();
        let handle = CancelHandle::new();
        let budget = SearchBudget::from_config(&config, handle.clone());
        assert_eq!(budget.snapshot(), BudgetSnapshot { limit: Some(5), steps: 0 });
        handle.cancel();
        assert_eq!(budget.tick(), Err(SearchError::Aborted { steps: 1 }));
    }
}
