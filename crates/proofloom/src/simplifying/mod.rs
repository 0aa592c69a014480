//! Forward simplification.
//!
//! An engine inspects a clause just taken from Unprocessed and may ask the
//! saturation loop, through a [`ForwardSimplificationPerformer`], to replace
//! or delete it. The performer decides whether a premise may be used at all
//! and whether the inspected clause is still alive afterwards.

pub mod literal_rewriting;
pub mod tautology;
pub mod variants;

use crate::index::IndexManager;
use crate::logic::{Clause, Signature, KBO};
use crate::saturation::store::ClauseStore;
use crate::statistics::Statistics;

pub use literal_rewriting::ForwardLiteralRewriting;
pub use tautology::TautologyDeletion;
pub use variants::VariantDeletion;

pub trait ForwardSimplificationPerformer {
    /// `premise` may justify a simplification right now.
    fn will_perform(&self, premise: usize) -> bool;

    /// Replace the inspected clause by `replacement`, or delete it when `None`.
    fn perform(&mut self, premises: &[usize], replacement: Option<Clause>);

    /// The inspected clause has not been simplified away.
    fn clause_kept(&self) -> bool;
}

/// Read-only view of the loop state handed to simplification engines.
pub struct SimplificationEnv<'a> {
    pub store: &'a ClauseStore,
    pub indexes: &'a IndexManager,
    pub ordering: &'a KBO,
    pub signature: &'a Signature,
}

pub trait ForwardSimplificationEngine: Send {
    fn name(&self) -> &str;

    /// Request needed indexes; must precede the first `perform`.
    fn attach(&mut self, _indexes: &mut IndexManager) {}

    fn detach(&mut self, _indexes: &mut IndexManager) {}

    fn perform(
        &mut self,
        clause: usize,
        env: &SimplificationEnv<'_>,
        statistics: &mut Statistics,
        performer: &mut dyn ForwardSimplificationPerformer,
    );
}

/// Performer that records what an engine asked for, used by engine tests.
#[cfg(test)]
pub(crate) struct RecordingPerformer {
    pub blocked: Vec<usize>,
    pub performed: Vec<(Vec<usize>, Option<Clause>)>,
}

#[cfg(test)]
impl RecordingPerformer {
    pub fn new() -> Self {
        RecordingPerformer {
            blocked: Vec::new(),
            performed: Vec::new(),
        }
    }
}

#[cfg(test)]
impl ForwardSimplificationPerformer for RecordingPerformer {
    fn will_perform(&self, premise: usize) -> bool {
        !self.blocked.contains(&premise)
    }

    fn perform(&mut self, premises: &[usize], replacement: Option<Clause>) {
        self.performed.push((premises.to_vec(), replacement));
    }

    fn clause_kept(&self) -> bool {
        self.performed.is_empty()
    }
}
