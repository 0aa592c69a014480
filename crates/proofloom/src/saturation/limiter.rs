//! Limited resource strategy.
//!
//! Every so often the limiter extrapolates how many more clauses the run
//! can activate before its time runs out and asks the passive container to
//! drop whatever would not be reached anyway. Once any ceiling has been
//! set the run is no longer complete, even if the ceilings are lifted
//! later.

use super::passive::PassiveContainer;
use crate::config::Options;
use crate::log_targets;

/// Selections between two estimates
const UPDATE_INTERVAL: u32 = 500;
/// Selections between two estimates while ceilings are in force
const LIMITED_UPDATE_INTERVAL: u32 = 50;
/// Fewer active clauses than this give too noisy an estimate
const MIN_ACTIVE_FOR_ESTIMATE: u64 = 10;

/// Time as seen by one strategy context.
pub trait Clock {
    /// Milliseconds this context has been switched in
    fn local_elapsed_ms(&self) -> u64;
    /// Milliseconds since the whole run started
    fn global_elapsed_ms(&self) -> u64;
    /// Contexts still competing for the remaining time
    fn alive_contexts(&self) -> usize;
}

/// Hook run whenever a clause leaves Unprocessed.
pub trait ResourceLimiter: Send {
    /// Returns whether the passive limits were changed.
    fn on_unprocessed_selected(
        &mut self,
        passive: &mut PassiveContainer,
        active_clauses: usize,
        clock: &dyn Clock,
        options: &Options,
    ) -> bool;

    fn limits_ever_active(&self) -> bool;
}

/// Plain saturation: passive clauses are never limited.
#[derive(Debug, Default)]
pub struct NoLimits;

impl ResourceLimiter for NoLimits {
    fn on_unprocessed_selected(&mut self, _: &mut PassiveContainer, _: usize, _: &dyn Clock, _: &Options) -> bool {
        false
    }

    fn limits_ever_active(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
pub struct LrsLimiter {
    counter: u32,
    limits_ever_active: bool,
}

impl LrsLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    fn should_update_limits(&mut self, limited: bool) -> bool {
        self.counter += 1;
        if self.counter == UPDATE_INTERVAL || (limited && self.counter > LIMITED_UPDATE_INTERVAL) {
            self.counter = 0;
            return true;
        }
        false
    }
}

impl ResourceLimiter for LrsLimiter {
    fn on_unprocessed_selected(
        &mut self,
        passive: &mut PassiveContainer,
        active_clauses: usize,
        clock: &dyn Clock,
        options: &Options,
    ) -> bool {
        if !self.should_update_limits(passive.limits().is_active()) {
            return false;
        }
        let Some(estimate) = estimated_reachable_count(
            active_clauses as u64,
            clock.local_elapsed_ms(),
            clock.global_elapsed_ms(),
            clock.alive_contexts(),
            options,
        ) else {
            return false;
        };
        let changed = passive.update_limits(estimate);
        let limits = passive.limits();
        if changed {
            log::debug!(
                target: log_targets::LRS,
                "Estimated {} reachable, limits now age {:?} weight {:?}",
                estimate,
                limits.age_limit,
                limits.weight_limit
            );
        }
        self.limits_ever_active |= limits.is_active();
        changed
    }

    fn limits_ever_active(&self) -> bool {
        self.limits_ever_active
    }
}

/// Milliseconds left to this context: its own allowance, capped by a fair
/// share of the global time. `None` when neither leaves anything.
pub fn local_time_left(local_ms: u64, global_ms: u64, alive: usize, options: &Options) -> Option<u64> {
    let local_ms = local_ms as i64;
    let global_ms = global_ms as i64;
    let (local_left, global_left) = if options.simulated_time_limit > 0 {
        let left = i64::from(options.simulated_time_limit) * 100 - local_ms;
        (left, left)
    } else {
        let alive = alive.max(1) as i64;
        (
            i64::from(options.effective_local_time_limit()) * 100 - local_ms,
            (i64::from(options.time_limit) * 100 - global_ms) / alive,
        )
    };

    let left = if local_left <= 0 {
        if global_left <= 0 {
            return None;
        }
        global_left
    } else if global_left > 0 && global_left < local_left {
        global_left
    } else {
        local_left
    };
    u64::try_from(left).ok()
}

/// How many more clauses this context can expect to activate, or `None`
/// while there is too little data to extrapolate from.
pub fn estimated_reachable_count(
    active_clauses: u64,
    local_ms: u64,
    global_ms: u64,
    alive: usize,
    options: &Options,
) -> Option<u64> {
    let first_check = u64::from(options.lrs_first_time_check);
    let local_first_check = first_check * u64::from(options.effective_local_time_limit());
    let global_first_check = first_check * u64::from(options.time_limit);
    if local_ms < local_first_check && global_ms < global_first_check {
        return None;
    }

    let time_left = local_time_left(local_ms, global_ms, alive, options)?;
    if active_clauses <= MIN_ACTIVE_FOR_ESTIMATE || local_ms == 0 {
        return None;
    }
    Some(active_clauses * time_left / local_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn options(time_limit: u32, local_time_limit: u32) -> Options {
        Options {
            time_limit,
            local_time_limit,
            ..Options::default()
        }
    }

    #[test]
    fn test_no_estimate_with_few_active_clauses() {
        let opts = options(100, 50);
        for active in 0..=10 {
            assert_eq!(estimated_reachable_count(active, 4_000, 9_000, 1, &opts), None);
        }
        assert!(estimated_reachable_count(11, 4_000, 9_000, 1, &opts).is_some());
    }

    #[test]
    fn test_no_estimate_before_first_check() {
        // 5% of 100 ds is 500 ms
        let opts = options(100, 100);
        assert_eq!(estimated_reachable_count(1000, 499, 499, 1, &opts), None);
        assert!(estimated_reachable_count(1000, 500, 500, 1, &opts).is_some());
    }

    #[test]
    fn test_linear_extrapolation() {
        // 10 s global, no local limit, 2 contexts: 4 s global spent leaves 3 s each
        let opts = options(100, 0);
        assert_eq!(local_time_left(2_000, 4_000, 2, &opts), Some(3_000));
        assert_eq!(estimated_reachable_count(100, 2_000, 4_000, 2, &opts), Some(150));
    }

    #[test]
    fn test_simulated_limit_overrides_real_ones() {
        let opts = Options {
            simulated_time_limit: 30,
            ..options(100, 0)
        };
        assert_eq!(local_time_left(1_000, 9_000, 4, &opts), Some(2_000));
    }

    #[test]
    fn test_exhausted_time_gives_no_estimate() {
        let opts = options(0, 0);
        assert_eq!(local_time_left(1_000, 1_000, 1, &opts), None);
        assert_eq!(estimated_reachable_count(500, 1_000, 1_000, 1, &opts), None);
    }

    #[test]
    fn test_zero_local_limit_waits_for_global_first_check() {
        // Defaults: 600 ds global, local follows it, first check at 3 s
        let opts = options(600, 0);
        assert_eq!(estimated_reachable_count(100, 100, 100, 1, &opts), None);
        assert_eq!(estimated_reachable_count(100, 2_999, 2_999, 1, &opts), None);
        assert_eq!(estimated_reachable_count(100, 3_000, 3_000, 1, &opts), Some(1_900));
    }

    #[test]
    fn test_limiter_samples_every_500_selections() {
        struct Fixed;
        impl Clock for Fixed {
            fn local_elapsed_ms(&self) -> u64 {
                5_000
            }
            fn global_elapsed_ms(&self) -> u64 {
                5_000
            }
            fn alive_contexts(&self) -> usize {
                1
            }
        }

        let opts = options(100, 0);
        let mut passive = PassiveContainer::new((1, 1));
        for i in 0..100 {
            passive.add(i, i, i);
        }
        let mut limiter = LrsLimiter::new();
        for _ in 0..499 {
            assert!(!limiter.on_unprocessed_selected(&mut passive, 20, &Fixed, &opts));
        }
        assert!(!limiter.limits_ever_active());
        // 20 active in 5 s with 5 s left: 20 more reachable out of 100
        assert!(limiter.on_unprocessed_selected(&mut passive, 20, &Fixed, &opts));
        assert!(limiter.limits_ever_active());
        assert!(passive.limits().is_active());
    }

    proptest! {
        #[test]
        fn prop_fair_share_bounds_time_left(
            time_limit in 1u32..10_000,
            local_time_limit in 0u32..10_000,
            global_ms in 0u64..2_000_000,
            local_ms in 0u64..2_000_000,
            alive in 1usize..16,
        ) {
            let opts = options(time_limit, local_time_limit);
            if let Some(left) = local_time_left(local_ms, global_ms, alive, &opts) {
                let global_share = (i64::from(time_limit) * 100 - global_ms as i64).max(0) as u64 / alive as u64;
                let own = (i64::from(opts.effective_local_time_limit()) * 100 - local_ms as i64).max(0) as u64;
                prop_assert!(left <= global_share + own);
            }
        }
    }
}
