//! Generating inference engines.
//!
//! An engine is attached once to the loop's index manager, then asked for
//! the conclusions of every clause that becomes active.

pub mod common;
pub mod factoring;
pub mod resolution;
pub mod structural_induction;

use crate::config::Options;
use crate::index::IndexManager;
use crate::logic::{Clause, Signature, KBO};
use crate::saturation::store::ClauseStore;
use crate::statistics::Statistics;

pub use factoring::{factoring, Factoring};
pub use resolution::{resolution, BinaryResolution};
pub use structural_induction::StructuralInduction;

/// Loop state an engine may read, plus the parts it may extend.
///
/// Engines introduce symbols (skolems, renamed variables) into the context's
/// own signature and bump its statistics.
pub struct InferenceEnv<'a> {
    pub store: &'a ClauseStore,
    pub indexes: &'a IndexManager,
    pub ordering: &'a KBO,
    pub signature: &'a mut Signature,
    pub statistics: &'a mut Statistics,
    pub options: &'a Options,
}

pub trait GeneratingInferenceEngine: Send {
    fn name(&self) -> &str;

    fn attach(&mut self, _indexes: &mut IndexManager) {}

    fn detach(&mut self, _indexes: &mut IndexManager) {}

    /// Conclusions of the active clause `premise` with `selected` literals.
    fn generate_clauses(&mut self, premise: usize, selected: &[usize], env: &mut InferenceEnv<'_>) -> Vec<Clause>;
}
