//! Tautology deletion: clauses with a complementary pair of literals.

use super::{ForwardSimplificationEngine, ForwardSimplificationPerformer, SimplificationEnv};
use crate::logic::Clause;
use crate::statistics::Statistics;

#[derive(Debug, Default)]
pub struct TautologyDeletion;

impl TautologyDeletion {
    pub fn is_tautology(clause: &Clause) -> bool {
        let lits = &clause.literals;
        (0..lits.len()).any(|i| lits[i + 1..].iter().any(|other| lits[i].is_complementary(other)))
    }
}

impl ForwardSimplificationEngine for TautologyDeletion {
    fn name(&self) -> &str {
        "Tautology"
    }

    fn perform(
        &mut self,
        clause: usize,
        env: &SimplificationEnv<'_>,
        statistics: &mut Statistics,
        performer: &mut dyn ForwardSimplificationPerformer,
    ) {
        if Self::is_tautology(env.store.get(clause)) {
            statistics.tautologies_deleted += 1;
            performer.perform(&[], None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Interner, Literal, PredicateSymbol, Term};

    #[test]
    fn test_complementary_pair_is_tautology() {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 1);
        let q = PredicateSymbol::new(interner.intern_predicate("q"), 1);
        let x = Term::var(interner.intern_variable("X"));
        let y = Term::var(interner.intern_variable("Y"));

        let taut = Clause::new(vec![
            Literal::positive(q, vec![y.clone()]),
            Literal::positive(p, vec![x.clone()]),
            Literal::negative(p, vec![x.clone()]),
        ]);
        let not_taut = Clause::new(vec![
            Literal::positive(p, vec![x]),
            Literal::negative(p, vec![y]),
        ]);
        assert!(TautologyDeletion::is_tautology(&taut));
        assert!(!TautologyDeletion::is_tautology(&not_taut));
    }
}
