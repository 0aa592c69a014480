//! Round-robin scheduling of strategy contexts on one thread.

use super::{ConcurrentMainLoop, MainLoopContext};
use crate::config::process_memory_mb;
use crate::log_targets;
use crate::saturation::SaturationAlgorithm;
use crate::statistics::{Statistics, TerminationReason};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How a schedule run ended.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerOutcome {
    pub reason: TerminationReason,
    /// Id of the context that succeeded
    pub winner: Option<usize>,
    /// Per context, in creation order
    pub statistics: Vec<(usize, Statistics)>,
}

pub struct Scheduler<L = SaturationAlgorithm> {
    contexts: Vec<MainLoopContext<L>>,
    alive: VecDeque<usize>,
    /// Hundredths of a second
    time_slice: u32,
    /// Deciseconds, 0 for none
    time_limit: u32,
    /// Megabytes, 0 for none
    memory_limit: usize,
}

impl<L: ConcurrentMainLoop> Scheduler<L> {
    pub fn new(contexts: Vec<MainLoopContext<L>>, time_slice: u32, time_limit: u32, memory_limit: usize) -> Self {
        let alive = (0..contexts.len()).collect();
        Scheduler {
            contexts,
            alive,
            time_slice: time_slice.max(1),
            time_limit,
            memory_limit,
        }
    }

    pub fn number_of_alive_contexts(&self) -> usize {
        self.alive.len()
    }

    pub fn contexts(&self) -> &[MainLoopContext<L>] {
        &self.contexts
    }

    fn global_limit_hit(&self, start: Instant) -> Option<TerminationReason> {
        let limit = Duration::from_millis(u64::from(self.time_limit) * 100);
        if self.time_limit > 0 && start.elapsed() >= limit {
            return Some(TerminationReason::TimeLimit);
        }
        if self.memory_limit > 0 && process_memory_mb().is_some_and(|mb| mb >= self.memory_limit) {
            return Some(TerminationReason::MemoryLimit);
        }
        None
    }

    fn terminate_alive(&mut self, reason: TerminationReason) {
        for pos in self.alive.drain(..) {
            self.contexts[pos].terminate(reason);
        }
    }

    /// Give slices round robin until one context succeeds, all have
    /// finished, or a global limit is hit.
    pub fn run(&mut self) -> SchedulerOutcome {
        let start = Instant::now();
        let mut winner = None;

        while let Some(&pos) = self.alive.front() {
            if let Some(reason) = self.global_limit_hit(start) {
                log::info!(target: log_targets::SCHEDULER, "Global limit hit: {:?}", reason);
                self.terminate_alive(reason);
                break;
            }

            let alive = self.alive.len();
            self.alive.pop_front();
            match self.contexts[pos].do_step(self.time_slice, start, alive) {
                None => self.alive.push_back(pos),
                Some(reason) if reason.is_success() => {
                    winner = Some(pos);
                    break;
                }
                Some(_) => {}
            }
        }

        let outcome = self.outcome(winner);
        log::info!(
            target: log_targets::SCHEDULER,
            "Schedule finished with {:?} after {:.2}s",
            outcome.reason,
            start.elapsed().as_secs_f64()
        );
        outcome
    }

    fn outcome(&self, winner: Option<usize>) -> SchedulerOutcome {
        let reason = match winner {
            Some(pos) => self.contexts[pos].result().unwrap_or_default(),
            None => {
                let results: Vec<_> = self.contexts.iter().filter_map(|c| c.result()).collect();
                if results.contains(&TerminationReason::TimeLimit) {
                    TerminationReason::TimeLimit
                } else if results.contains(&TerminationReason::MemoryLimit) {
                    TerminationReason::MemoryLimit
                } else {
                    TerminationReason::Unknown
                }
            }
        };
        SchedulerOutcome {
            reason,
            winner: winner.map(|pos| self.contexts[pos].id()),
            statistics: self.contexts.iter().map(|c| (c.id(), c.statistics())).collect(),
        }
    }
}
