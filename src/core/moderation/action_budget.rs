use std::sync::atomic::{AtomicU32, Ordering};

use crate::core::policy::MAX_ACTIONS_PER_RUN;

/// Ceiling on mutating remote calls within one sweep pass.
///
/// One logical moderation action (mark, censor, close, unmark) claims a
/// single unit, even when it fans out into several remote calls. The
/// counter is claimed check-then-act atomically so the sweep's two
/// pipelines can share one instance without racing past the cap.
pub struct ActionBudget {
    remaining: AtomicU32,
}

impl ActionBudget {
    /// The configured limit is clamped to the hard ceiling of 30.
    pub fn new(limit: u32) -> Self {
        Self {
            remaining: AtomicU32::new(limit.min(MAX_ACTIONS_PER_RUN)),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }

    /// Claims one action. Returns false, leaving the counter untouched,
    /// once the budget is exhausted.
    pub fn try_consume(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_down_to_zero_and_stops() {
        let budget = ActionBudget::new(2);
        assert!(budget.try_consume());
        assert!(budget.try_consume());
        assert!(!budget.try_consume());
        assert_eq!(budget.remaining(), 0);
        // Still exhausted; the counter never goes negative.
        assert!(!budget.try_consume());
    }

    #[test]
    fn clamps_to_the_hard_ceiling() {
        let budget = ActionBudget::new(500);
        assert_eq!(budget.remaining(), MAX_ACTIONS_PER_RUN);
    }

    #[test]
    fn respects_small_limits() {
        let budget = ActionBudget::new(1);
        assert!(budget.try_consume());
        assert!(!budget.try_consume());
    }
}
