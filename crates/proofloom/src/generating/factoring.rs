//! Factoring inference rule

use super::common::{collect_literals_except, remove_duplicate_literals};
use super::{GeneratingInferenceEngine, InferenceEnv};
use crate::logic::substitution::unify_atoms;
use crate::logic::{Clause, Inference, InferenceRule};

/// Factors of `clause` obtained by unifying a selected literal with another
/// literal of the same polarity and predicate.
pub fn factoring(clause: &Clause, idx: usize, selected: &[usize]) -> Vec<Clause> {
    let mut results = Vec::new();
    for &i in selected {
        let lit1 = &clause.literals[i];
        for (j, lit2) in clause.literals.iter().enumerate() {
            if i == j || lit1.polarity != lit2.polarity || lit1.predicate != lit2.predicate {
                continue;
            }
            // Each selected pair once
            if j < i && selected.contains(&j) {
                continue;
            }
            let Ok(mgu) = unify_atoms(lit1, lit2) else {
                continue;
            };
            let literals = remove_duplicate_literals(collect_literals_except(&clause.literals, &[j], &mgu));
            results.push(Clause::derived(
                literals,
                clause.input_type,
                clause.age + 1,
                Inference::new(InferenceRule::Factoring, vec![idx]),
            ));
        }
    }
    results
}

#[derive(Debug, Default)]
pub struct Factoring;

impl GeneratingInferenceEngine for Factoring {
    fn name(&self) -> &str {
        "Factoring"
    }

    fn generate_clauses(&mut self, premise: usize, selected: &[usize], env: &mut InferenceEnv<'_>) -> Vec<Clause> {
        let results = factoring(env.store.get(premise), premise, selected);
        env.statistics.factorings += results.len();
        results
    }
}
