//! Strategy contexts.
//!
//! A context owns one main loop together with everything that loop treats
//! as its environment (options, signature, statistics), so several
//! strategies can share a thread without seeing each other's state. The
//! scheduler lends a context the processor for one time slice at a time.

pub mod scheduler;

use crate::config::Options;
use crate::error::Result;
use crate::log_targets;
use crate::logic::{Clause, Signature};
use crate::saturation::{Clock, SaturationAlgorithm};
use crate::statistics::{Statistics, TerminationReason};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use scheduler::{Scheduler, SchedulerOutcome};

/// A main loop that can be suspended between steps.
pub trait ConcurrentMainLoop {
    /// Called once, before the first step.
    fn init(&mut self) -> Option<TerminationReason>;

    fn step(&mut self, clock: &dyn Clock) -> Option<TerminationReason>;

    /// Stop from outside (resource limits); returns the final reason.
    fn finish(&mut self, reason: TerminationReason) -> Option<TerminationReason>;

    fn statistics(&self) -> &Statistics;
}

impl ConcurrentMainLoop for SaturationAlgorithm {
    fn init(&mut self) -> Option<TerminationReason> {
        SaturationAlgorithm::init(self)
    }

    fn step(&mut self, clock: &dyn Clock) -> Option<TerminationReason> {
        SaturationAlgorithm::step(self, clock)
    }

    fn finish(&mut self, reason: TerminationReason) -> Option<TerminationReason> {
        SaturationAlgorithm::finish(self, reason)
    }

    fn statistics(&self) -> &Statistics {
        SaturationAlgorithm::statistics(self)
    }
}

/// Time seen by a context during one slice.
#[derive(Debug, Clone, Copy)]
pub struct StepClock {
    before: Duration,
    slice_start: Instant,
    global_start: Instant,
    alive: usize,
}

impl Clock for StepClock {
    fn local_elapsed_ms(&self) -> u64 {
        (self.before + self.slice_start.elapsed()).as_millis() as u64
    }

    fn global_elapsed_ms(&self) -> u64 {
        self.global_start.elapsed().as_millis() as u64
    }

    fn alive_contexts(&self) -> usize {
        self.alive
    }
}

/// Marks a context as running; the time until drop is charged to it.
struct SwitchGuard<'a> {
    id: usize,
    elapsed: &'a mut Duration,
    start: Instant,
}

impl<'a> SwitchGuard<'a> {
    fn switch_in(id: usize, elapsed: &'a mut Duration) -> Self {
        log::trace!(target: log_targets::SCHEDULER, "Context {} switched in", id);
        SwitchGuard {
            id,
            elapsed,
            start: Instant::now(),
        }
    }

    fn clock(&self, global_start: Instant, alive: usize) -> StepClock {
        StepClock {
            before: *self.elapsed,
            slice_start: self.start,
            global_start,
            alive,
        }
    }
}

impl Drop for SwitchGuard<'_> {
    fn drop(&mut self) {
        *self.elapsed += self.start.elapsed();
        log::trace!(target: log_targets::SCHEDULER, "Context {} switched out", self.id);
    }
}

pub struct MainLoopContext<L = SaturationAlgorithm> {
    id: usize,
    main_loop: L,
    /// Deciseconds, 0 for none
    local_time_limit: u32,
    elapsed: Duration,
    steps: usize,
    initialised: bool,
    result: Option<TerminationReason>,
}

impl MainLoopContext<SaturationAlgorithm> {
    /// Context running a saturation loop configured by `options`.
    pub fn from_options(id: usize, input: Vec<Arc<Clause>>, signature: Signature, options: Options) -> Result<Self> {
        let local_time_limit = options.local_time_limit;
        log::info!(
            target: log_targets::SCHEDULER,
            "Context {}: {:?} selection {:?} age:weight {:?}",
            id,
            options.saturation_algorithm,
            options.selection,
            options.age_weight_ratio
        );
        let algorithm = SaturationAlgorithm::from_options(input, signature, options)?;
        Ok(MainLoopContext::new(id, algorithm, local_time_limit))
    }
}

impl<L: ConcurrentMainLoop> MainLoopContext<L> {
    pub fn new(id: usize, main_loop: L, local_time_limit: u32) -> Self {
        MainLoopContext {
            id,
            main_loop,
            local_time_limit,
            elapsed: Duration::ZERO,
            steps: 0,
            initialised: false,
            result: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn main_loop(&self) -> &L {
        &self.main_loop
    }

    /// Time this context has been switched in
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_deciseconds(&self) -> u64 {
        (self.elapsed.as_millis() / 100) as u64
    }

    /// Slices received so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn average_time_slice(&self) -> Duration {
        match u32::try_from(self.steps) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.elapsed / n,
        }
    }

    pub fn result(&self) -> Option<TerminationReason> {
        self.result
    }

    pub fn is_alive(&self) -> bool {
        self.result.is_none()
    }

    /// Counters of the main loop, with this context's elapsed time.
    pub fn statistics(&self) -> Statistics {
        Statistics {
            elapsed: self.elapsed,
            ..self.main_loop.statistics().clone()
        }
    }

    /// Run the main loop for one slice of `slice_cs` hundredths of a second.
    ///
    /// At least one loop step is made. `global_start` and `alive` feed the
    /// loop's view of the shared time budget.
    pub fn do_step(&mut self, slice_cs: u32, global_start: Instant, alive: usize) -> Option<TerminationReason> {
        if self.result.is_some() {
            return self.result;
        }
        let budget = Duration::from_millis(u64::from(slice_cs) * 10);

        let mut result = None;
        {
            let guard = SwitchGuard::switch_in(self.id, &mut self.elapsed);
            let clock = guard.clock(global_start, alive);
            if !self.initialised {
                self.initialised = true;
                result = self.main_loop.init();
            }
            while result.is_none() {
                result = self.main_loop.step(&clock);
                if guard.start.elapsed() >= budget {
                    break;
                }
            }
        }
        self.steps += 1;

        let limit = Duration::from_millis(u64::from(self.local_time_limit) * 100);
        if result.is_none() && self.local_time_limit > 0 && self.elapsed >= limit {
            result = self.main_loop.finish(TerminationReason::TimeLimit);
        }
        if let Some(reason) = result {
            log::info!(
                target: log_targets::SCHEDULER,
                "Context {} finished with {:?} after {} slices ({:.2}s)",
                self.id,
                reason,
                self.steps,
                self.elapsed.as_secs_f64()
            );
        }
        self.result = result;
        result
    }

    /// Stop from outside, e.g. when a global limit is hit.
    pub fn terminate(&mut self, reason: TerminationReason) {
        if self.result.is_none() {
            self.result = self.main_loop.finish(reason);
        }
    }
}

impl<L> std::fmt::Debug for MainLoopContext<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainLoopContext")
            .field("id", &self.id)
            .field("elapsed", &self.elapsed)
            .field("steps", &self.steps)
            .field("result", &self.result)
            .finish()
    }
}
