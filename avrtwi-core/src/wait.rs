//! Polling waits
//!
//! Every hardware wait in the engine goes through [`wait_for_flag`]. The
//! budget counts polling iterations, not time: how long a budget lasts in
//! the real world depends on the core clock and the bus speed, so budgets
//! should be sized experimentally.

/// Remaining polling iterations for one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaitBudget {
    remaining: u32,
}

impl WaitBudget {
    /// Create a budget allowing `iterations` polls
    pub const fn new(iterations: u32) -> Self {
        Self {
            remaining: iterations,
        }
    }

    /// Polls left
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// No polls left
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Take one iteration from the budget
    ///
    /// Returns `false` once the budget is spent; the count never wraps.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Poll `ready` until it reports true or the budget runs out
///
/// Each call to `ready` costs one iteration, so `ready` is evaluated at most
/// `budget.remaining()` times. Returns `true` if the flag was observed.
pub fn wait_for_flag(mut ready: impl FnMut() -> bool, budget: &mut WaitBudget) -> bool {
    while budget.tick() {
        if ready() {
            return true;
        }
    }
    false
}

/// Poll `ready` until it reports true, without limit
pub fn wait_forever(mut ready: impl FnMut() -> bool) {
    while !ready() {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_immediately() {
        let mut budget = WaitBudget::new(5);
        assert!(wait_for_flag(|| true, &mut budget));
        assert_eq!(budget.remaining(), 4);
    }

    #[test]
    fn test_never_ready_is_bounded() {
        let mut polls = 0;
        let mut budget = WaitBudget::new(0xFF);
        let ready = wait_for_flag(
            || {
                polls += 1;
                false
            },
            &mut budget,
        );

        assert!(!ready);
        assert_eq!(polls, 0xFF);
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_ready_on_last_poll_succeeds() {
        let mut polls = 0;
        let mut budget = WaitBudget::new(3);
        let ready = wait_for_flag(
            || {
                polls += 1;
                polls == 3
            },
            &mut budget,
        );

        assert!(ready);
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_zero_budget_never_polls() {
        let mut polled = false;
        let mut budget = WaitBudget::new(0);
        assert!(!wait_for_flag(
            || {
                polled = true;
                true
            },
            &mut budget
        ));
        assert!(!polled);
    }

    #[test]
    fn test_tick_does_not_wrap() {
        let mut budget = WaitBudget::new(1);
        assert!(budget.tick());
        assert!(!budget.tick());
        assert!(!budget.tick());
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_wait_forever_outlasts_any_budget() {
        let mut polls = 0u32;
        wait_forever(|| {
            polls += 1;
            polls > 10_000
        });
        assert_eq!(polls, 10_001);
    }
}
