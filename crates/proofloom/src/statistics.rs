//! Per-context counters
//!
//! Each strategy context owns one `Statistics`. Inference engines only ever
//! increment counters; nothing in the prover reads them back to make
//! decisions except the activation count used by the LRS estimate.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Why a saturation run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    Refutation,
    Satisfiable,
    TimeLimit,
    MemoryLimit,
    #[default]
    Unknown,
}

impl TerminationReason {
    /// Refutation or satisfiability were established.
    pub fn is_success(self) -> bool {
        matches!(self, TerminationReason::Refutation | TerminationReason::Satisfiable)
    }

    /// SZS status name
    pub fn szs_status(self) -> &'static str {
        match self {
            TerminationReason::Refutation => "Unsatisfiable",
            TerminationReason::Satisfiable => "Satisfiable",
            TerminationReason::TimeLimit => "Timeout",
            TerminationReason::MemoryLimit => "MemoryOut",
            TerminationReason::Unknown => "GaveUp",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub input_clauses: usize,
    pub generated_clauses: usize,
    pub activations: usize,
    pub active_clauses: usize,
    pub passive_clauses: usize,
    pub resolutions: usize,
    pub factorings: usize,
    pub forward_literal_rewrites: usize,
    pub structural_induction_inferences: usize,
    pub tautologies_deleted: usize,
    pub variants_deleted: usize,
    pub split_clauses: usize,
    pub split_components: usize,
    pub discarded_non_redundant_clauses: usize,
    pub discarded_by_size: usize,
    pub deactivated: usize,
    pub reactivated: usize,
    pub lrs_limit_updates: usize,
    pub elapsed: Duration,
    pub termination_reason: TerminationReason,
    /// Store id of the empty clause, if one was derived
    pub refutation: Option<usize>,
}

impl Serialize for Statistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Statistics", 21)?;
        s.serialize_field("input_clauses", &self.input_clauses)?;
        s.serialize_field("generated_clauses", &self.generated_clauses)?;
        s.serialize_field("activations", &self.activations)?;
        s.serialize_field("active_clauses", &self.active_clauses)?;
        s.serialize_field("passive_clauses", &self.passive_clauses)?;
        s.serialize_field("resolutions", &self.resolutions)?;
        s.serialize_field("factorings", &self.factorings)?;
        s.serialize_field("forward_literal_rewrites", &self.forward_literal_rewrites)?;
        s.serialize_field(
            "structural_induction_inferences",
            &self.structural_induction_inferences,
        )?;
        s.serialize_field("tautologies_deleted", &self.tautologies_deleted)?;
        s.serialize_field("variants_deleted", &self.variants_deleted)?;
        s.serialize_field("split_clauses", &self.split_clauses)?;
        s.serialize_field("split_components", &self.split_components)?;
        s.serialize_field(
            "discarded_non_redundant_clauses",
            &self.discarded_non_redundant_clauses,
        )?;
        s.serialize_field("discarded_by_size", &self.discarded_by_size)?;
        s.serialize_field("deactivated", &self.deactivated)?;
        s.serialize_field("reactivated", &self.reactivated)?;
        s.serialize_field("lrs_limit_updates", &self.lrs_limit_updates)?;
        s.serialize_field("elapsed", &self.elapsed.as_secs_f64())?;
        s.serialize_field("termination_reason", &self.termination_reason)?;
        s.serialize_field("refutation", &self.refutation)?;
        s.end()
    }
}
