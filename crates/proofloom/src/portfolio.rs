//! Multi-strategy portfolio.
//!
//! A schedule is a list of strategy codes. Each code becomes one option set
//! (the base options with the code decoded on top), the problem is
//! preprocessed once with the base options, and one context per option set
//! is run by the scheduler.

use crate::config::Options;
use crate::context::{MainLoopContext, Scheduler};
use crate::error::{ProverError, Result};
use crate::log_targets;
use crate::preprocess::preprocess;
use crate::problem::Problem;
use crate::statistics::{Statistics, TerminationReason};
use serde::Serialize;
use std::io::{self, Write};

/// Codes starting with this name the retired tabulation strategy
const LEGACY_PREFIX: &str = "tab";

/// Simulated time limits are inflated by this to make up for switching
pub const SLOWDOWN_FACTOR: f64 = 1.1;

/// Settings that decide what preprocessing does. They must agree between
/// strategies, so every strategy takes them from the base options.
pub const PREPROCESSING_OPTIONS: &[&str] = &[
    "function_definition_elimination",
    "general_splitting",
    "unused_predicate_definition_removal",
    "sine_depth",
    "sine_generality_threshold",
    "sine_selection",
    "sine_tolerance",
    "naming",
    "inequality_splitting",
];

/// Split a schedule given as one string on commas and whitespace.
pub fn parse_schedule(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioResult {
    pub reason: TerminationReason,
    pub exit_code: i32,
    /// Strategy code of the context that succeeded
    pub winner: Option<String>,
    pub statistics: Vec<(String, Statistics)>,
}

impl PortfolioResult {
    fn refused() -> Self {
        PortfolioResult {
            reason: TerminationReason::Unknown,
            exit_code: 1,
            winner: None,
            statistics: Vec::new(),
        }
    }

    pub fn write_status(&self, out: &mut impl Write, problem_name: &str) -> io::Result<()> {
        writeln!(out, "% SZS status {} for {}", self.reason.szs_status(), problem_name)
    }
}

#[derive(Debug, Clone)]
pub struct Portfolio {
    base: Options,
    schedule: Vec<String>,
    fallback: bool,
}

impl Portfolio {
    pub fn new(base: Options, schedule: Vec<String>) -> Self {
        Portfolio {
            base,
            schedule,
            fallback: false,
        }
    }

    /// Mark the schedule as a fallback schedule; those are not run.
    pub fn fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    /// Codes that will be run, in order.
    pub fn codes(&self) -> impl Iterator<Item = &String> + '_ {
        self.schedule.iter().filter(|code| !code.starts_with(LEGACY_PREFIX))
    }

    /// One option set per usable code.
    pub fn strategies(&self) -> Result<Vec<Options>> {
        let mut strategies = Vec::new();
        for code in self.codes() {
            let mut options = self.base.clone();
            options.set("ignore_missing", "on")?;
            options.set("decode", code)?;

            options.set_function_definition_elimination(self.base.function_definition_elimination);
            options.set_general_splitting(self.base.general_splitting);
            options.set_sine_selection(self.base.sine_selection);
            for name in PREPROCESSING_OPTIONS {
                options.copy_from(&self.base, name)?;
            }

            options.simulated_time_limit = (f64::from(options.simulated_time_limit) * SLOWDOWN_FACTOR) as u32;
            log::info!(target: log_targets::PORTFOLIO, "Strategy {}: {}", strategies.len(), code);
            strategies.push(options);
        }
        if strategies.is_empty() {
            return Err(ProverError::EmptySchedule);
        }
        Ok(strategies)
    }

    /// Preprocess `problem` and race the strategies on it.
    pub fn run(&self, mut problem: Problem) -> Result<PortfolioResult> {
        if self.fallback {
            log::warn!(target: log_targets::PORTFOLIO, "Fallback schedules are not supported");
            return Ok(PortfolioResult::refused());
        }
        let strategies = self.strategies()?;
        let codes: Vec<String> = self.codes().cloned().collect();

        log::info!(target: log_targets::PORTFOLIO, "Problem: {:?}", problem.property());
        preprocess(&mut problem, &self.base)?;
        let input = problem.clauses();

        let mut contexts = Vec::with_capacity(strategies.len());
        for (id, options) in strategies.into_iter().enumerate() {
            contexts.push(MainLoopContext::from_options(
                id,
                input.clone(),
                problem.signature.clone(),
                options,
            )?);
        }

        let mut scheduler = Scheduler::new(
            contexts,
            self.base.time_slice,
            self.base.time_limit,
            self.base.memory_limit,
        );
        let outcome = scheduler.run();

        let success = match outcome.reason {
            TerminationReason::Refutation => true,
            TerminationReason::Satisfiable => self.base.satisfiable_is_success,
            _ => false,
        };
        Ok(PortfolioResult {
            reason: outcome.reason,
            exit_code: if success { 0 } else { 1 },
            winner: outcome.winner.map(|id| codes[id].clone()),
            statistics: outcome
                .statistics
                .into_iter()
                .map(|(id, stats)| (codes[id].clone(), stats))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FunctionDefinitionElimination, SaturationAlgorithmKind, SineSelection};

    fn schedule(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_parse_schedule() {
        assert_eq!(
            parse_schedule("lrs+21_1_100, dis+0_2:1  ott-20_1"),
            schedule(&["lrs+21_1_100", "dis+0_2:1", "ott-20_1"])
        );
    }

    #[test]
    fn test_whitelist_comes_from_base() {
        let base = Options {
            sine_selection: SineSelection::Axioms,
            sine_depth: 2,
            function_definition_elimination: FunctionDefinitionElimination::Unused,
            ..Options::default()
        };
        let portfolio = Portfolio::new(
            base.clone(),
            schedule(&[
                "lrs+21_1_sd=5:ss=off:fde=none:flr=on_100",
                "tab+0_1_50",
                "dis+20_3:1_st=3.0:nm=0:gsp=on_200",
            ]),
        );
        let strategies = portfolio.strategies().unwrap();
        assert_eq!(strategies.len(), 2);
        for name in PREPROCESSING_OPTIONS {
            let expected = base.get(name).unwrap();
            for options in &strategies {
                assert_eq!(options.get(name).unwrap(), expected, "{}", name);
            }
        }
        // Everything else is per strategy
        assert!(strategies[0].literal_rewriting);
        assert_eq!(strategies[1].saturation_algorithm, SaturationAlgorithmKind::Discount);
        assert_eq!(strategies[1].local_time_limit, 200);
    }

    #[test]
    fn test_simulated_limit_is_inflated() {
        let portfolio = Portfolio::new(Options::default(), schedule(&["lrs+21_1_stl=100_300"]));
        let strategies = portfolio.strategies().unwrap();
        assert_eq!(strategies[0].simulated_time_limit, 110);
    }

    #[test]
    fn test_only_legacy_codes_is_an_empty_schedule() {
        let portfolio = Portfolio::new(Options::default(), schedule(&["tab+0_1_50"]));
        assert!(matches!(portfolio.strategies(), Err(ProverError::EmptySchedule)));
    }

    #[test]
    fn test_fallback_is_refused() {
        let problem = Problem::new(crate::logic::Signature::new());
        let portfolio = Portfolio::new(Options::default(), schedule(&["lrs+21_1"])).fallback(true);
        let result = portfolio.run(problem).unwrap();
        assert_eq!(result.exit_code, 1);
        let mut out = Vec::new();
        result.write_status(&mut out, "p").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "% SZS status GaveUp for p\n");
    }
}
