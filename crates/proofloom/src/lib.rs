//! Proofloom: a time-sliced portfolio saturation prover for first-order logic
//!
//! Several independently configured given-clause loops share one thread and
//! one preprocessed problem. A round-robin scheduler hands each of them short
//! time slices until one finds a refutation or saturates.

pub mod config;
pub mod context;
pub mod error;
pub mod generating;
pub mod index;
pub mod log_targets;
pub mod logic;
pub mod portfolio;
pub mod preprocess;
pub mod problem;
pub mod saturation;
pub mod selection;
pub mod simplifying;
pub mod statistics;

pub use config::{InductionKind, LiteralSelectionStrategy, Options, SaturationAlgorithmKind};
pub use error::{ProverError, Result};

pub use logic::{
    Clause, Formula, FormulaUnit, Literal, PredicateSymbol, Signature, Term, TermAlgebra, TermAlgebraConstructor,
    Unit, KBO,
};

pub use generating::{BinaryResolution, Factoring, GeneratingInferenceEngine, StructuralInduction};
pub use simplifying::{ForwardLiteralRewriting, ForwardSimplificationEngine, ForwardSimplificationPerformer};

pub use saturation::{Clock, LrsLimiter, PassiveContainer, SaturationAlgorithm, StandaloneClock};

pub use context::{ConcurrentMainLoop, MainLoopContext, Scheduler, SchedulerOutcome};
pub use portfolio::{parse_schedule, Portfolio, PortfolioResult};
pub use preprocess::preprocess;
pub use problem::{Problem, Property};
pub use statistics::{Statistics, TerminationReason};
