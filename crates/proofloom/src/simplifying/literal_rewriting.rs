//! Forward literal rewriting.
//!
//! Uses the rewrite-rule index: for a rule L ⇔ ¬o built from the clauses
//! {L, o} and {¬L, ¬o}, a literal ¬Lσ becomes oσ (justified by {L, o}) and
//! a literal Lσ becomes ¬oσ (justified by {¬L, ¬o}). The replacement must
//! be strictly smaller than the literal it replaces.

use super::{ForwardSimplificationEngine, ForwardSimplificationPerformer, SimplificationEnv};
use crate::index::{IndexKind, IndexManager, RewriteMatch};
use crate::log_targets;
use crate::logic::{Clause, Inference, InferenceRule, Literal, Ordering, KBO};
use crate::statistics::Statistics;

#[derive(Debug, Default)]
pub struct ForwardLiteralRewriting {
    attached: bool,
}

impl ForwardLiteralRewriting {
    pub fn new() -> Self {
        Self::default()
    }

    /// The literal `lit` rewrites to under `m`, with the clause justifying
    /// the step; `None` when the result would not be strictly smaller.
    pub fn rewritten_literal(lit: &Literal, m: &RewriteMatch<'_>, ordering: &KBO) -> Option<(Literal, usize)> {
        let (rhs, premise) = if lit.polarity {
            (m.rule.other.complement(), m.rule.counterpart)
        } else {
            (m.rule.other.clone(), m.rule.clause)
        };
        let rhs = m.substitution.apply_literal(&rhs);
        if ordering.compare_literals(lit, &rhs) != Ordering::Greater {
            return None;
        }
        Some((rhs, premise))
    }
}

impl ForwardSimplificationEngine for ForwardLiteralRewriting {
    fn name(&self) -> &str {
        "ForwardLiteralRewriting"
    }

    fn attach(&mut self, indexes: &mut IndexManager) {
        indexes.request(IndexKind::RewriteRules);
        self.attached = true;
    }

    fn detach(&mut self, indexes: &mut IndexManager) {
        indexes.release(IndexKind::RewriteRules);
        self.attached = false;
    }

    fn perform(
        &mut self,
        clause_idx: usize,
        env: &SimplificationEnv<'_>,
        statistics: &mut Statistics,
        performer: &mut dyn ForwardSimplificationPerformer,
    ) {
        assert!(self.attached, "ForwardLiteralRewriting used before attach");
        let Some(index) = env.indexes.rewrite_rules() else {
            return;
        };
        let clause = env.store.get(clause_idx);

        for (position, lit) in clause.literals.iter().enumerate() {
            for m in index.generalizations(lit) {
                if !performer.will_perform(m.rule.clause) || !performer.will_perform(m.rule.counterpart) {
                    continue;
                }
                if clause_idx == m.rule.clause || clause_idx == m.rule.counterpart {
                    continue;
                }
                let Some((rhs, premise)) = Self::rewritten_literal(lit, &m, env.ordering) else {
                    continue;
                };

                let mut literals = Vec::with_capacity(clause.literals.len());
                literals.push(rhs);
                literals.extend(
                    clause
                        .literals
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != position)
                        .map(|(_, l)| l.clone()),
                );
                let premise_clause = env.store.get(premise);
                let result = Clause::derived(
                    literals,
                    clause.input_type.max(premise_clause.input_type),
                    clause.age,
                    Inference::new(InferenceRule::ForwardLiteralRewriting, vec![clause_idx, premise]),
                );
                log::trace!(
                    target: log_targets::REWRITING,
                    "[{}] {} rewritten by [{}]",
                    clause_idx,
                    lit.display(&env.signature.interner),
                    premise
                );
                statistics.forward_literal_rewrites += 1;
                performer.perform(&[premise], Some(result));
                if !performer.clause_kept() {
                    return;
                }
            }
        }
    }
}
