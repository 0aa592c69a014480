//! Binary resolution on selected literals

use super::common::{collect_literals_except, remove_duplicate_literals};
use super::{GeneratingInferenceEngine, InferenceEnv};
use crate::index::{IndexKind, IndexManager};
use crate::logic::substitution::{rename_variables, unify_atoms};
use crate::logic::{Clause, Inference, InferenceRule, Interner, Literal};
use std::collections::HashMap;

/// Resolve literal `i` of `given` against literal `j` of `partner`.
///
/// `partner` must already be variable-disjoint from `given`.
pub fn resolution(
    given: &Clause,
    given_idx: usize,
    i: usize,
    partner: &Clause,
    partner_literals: &[Literal],
    partner_idx: usize,
    j: usize,
) -> Option<Clause> {
    let lit1 = &given.literals[i];
    let lit2 = &partner_literals[j];
    if lit1.polarity == lit2.polarity || lit1.predicate != lit2.predicate {
        return None;
    }
    let mgu = unify_atoms(lit1, lit2).ok()?;

    let mut literals = collect_literals_except(&given.literals, &[i], &mgu);
    literals.extend(collect_literals_except(partner_literals, &[j], &mgu));

    Some(Clause::derived(
        remove_duplicate_literals(literals),
        given.input_type.max(partner.input_type),
        given.age.max(partner.age) + 1,
        Inference::new(
            InferenceRule::Resolution,
            vec![given_idx.min(partner_idx), given_idx.max(partner_idx)],
        ),
    ))
}

/// Resolves the given clause's selected literals against selected literals
/// of active clauses, the given clause itself included.
#[derive(Debug, Default)]
pub struct BinaryResolution {
    attached: bool,
}

impl BinaryResolution {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GeneratingInferenceEngine for BinaryResolution {
    fn name(&self) -> &str {
        "Resolution"
    }

    fn attach(&mut self, indexes: &mut IndexManager) {
        indexes.request(IndexKind::GeneratingLiterals);
        self.attached = true;
    }

    fn detach(&mut self, indexes: &mut IndexManager) {
        indexes.release(IndexKind::GeneratingLiterals);
        self.attached = false;
    }

    fn generate_clauses(&mut self, premise: usize, selected: &[usize], env: &mut InferenceEnv<'_>) -> Vec<Clause> {
        assert!(self.attached, "Resolution used before attach");
        let index = env
            .indexes
            .generating_literals()
            .expect("generating literal index is requested on attach");
        let given = env.store.get(premise);

        let mut renamed: HashMap<usize, Vec<Literal>> = HashMap::new();
        let mut results = Vec::new();
        for &i in selected {
            let lit = &given.literals[i];
            let candidates: Vec<(usize, usize)> = index.candidates(lit.predicate.id, !lit.polarity).collect();
            for (partner_idx, j) in candidates {
                let partner = env.store.get(partner_idx);
                let partner_literals = renamed
                    .entry(partner_idx)
                    .or_insert_with(|| rename_apart(partner, premise, &mut env.signature.interner));
                if let Some(resolvent) = resolution(given, premise, i, partner, partner_literals, partner_idx, j) {
                    env.statistics.resolutions += 1;
                    results.push(resolvent);
                }
            }
        }
        results
    }
}

fn rename_apart(partner: &Clause, given_idx: usize, interner: &mut Interner) -> Vec<Literal> {
    rename_variables(&partner.literals, given_idx, interner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::logic::{PredicateSymbol, Signature, Term, KBO};
    use crate::saturation::store::ClauseStore;
    use crate::statistics::Statistics;
    use std::sync::Arc;

    struct TestContext {
        signature: Signature,
        p: PredicateSymbol,
        q: PredicateSymbol,
    }

    impl TestContext {
        fn new() -> Self {
            let mut signature = Signature::new();
            let i = signature.default_sort();
            let p = signature.declare_predicate("p", vec![i]);
            let q = signature.declare_predicate("q", vec![i]);
            TestContext { signature, p, q }
        }

        fn var(&mut self, name: &str) -> Term {
            Term::var(self.signature.interner.intern_variable(name))
        }

        fn constant(&mut self, name: &str) -> Term {
            Term::constant(self.signature.interner.intern_constant(name))
        }
    }

    #[test]
    fn test_resolves_against_active_partner() {
        let mut ctx = TestContext::new();
        let x = ctx.var("X");
        let a = ctx.constant("a");
        let (p, q) = (ctx.p, ctx.q);

        // p(X) | q(X)  and  ~p(a)
        let mut store = ClauseStore::new();
        let c0 = store.push(Arc::new(Clause::new(vec![
            Literal::positive(p, vec![x.clone()]),
            Literal::positive(q, vec![x]),
        ])));
        let c1 = store.push(Arc::new(Clause::new(vec![Literal::negative(p, vec![a.clone()])])));

        let ordering = KBO::default();
        let mut indexes = IndexManager::new(ordering.clone());
        let mut engine = BinaryResolution::new();
        engine.attach(&mut indexes);
        indexes.on_activate(c0, store.get(c0), &[0]);
        indexes.on_activate(c1, store.get(c1), &[0]);

        let options = Options::default();
        let mut statistics = Statistics::default();
        let mut env = InferenceEnv {
            store: &store,
            indexes: &indexes,
            ordering: &ordering,
            signature: &mut ctx.signature,
            statistics: &mut statistics,
            options: &options,
        };
        let results = engine.generate_clauses(c1, &[0], &mut env);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].literals, vec![Literal::positive(q, vec![a])]);
        assert_eq!(results[0].age, 1);
        assert_eq!(results[0].inference.premises, vec![c0, c1]);
        assert_eq!(statistics.resolutions, 1);
    }

    #[test]
    fn test_same_polarity_does_not_resolve() {
        let mut ctx = TestContext::new();
        let a = ctx.constant("a");
        let p = ctx.p;
        let c = Clause::new(vec![Literal::positive(p, vec![a.clone()])]);
        let d = Clause::new(vec![Literal::positive(p, vec![a])]);
        assert!(resolution(&c, 0, 0, &d, &d.literals, 1, 0).is_none());
    }

    #[test]
    #[should_panic(expected = "used before attach")]
    fn test_generate_before_attach_panics() {
        let mut ctx = TestContext::new();
        let store = ClauseStore::new();
        let ordering = KBO::default();
        let indexes = IndexManager::new(ordering.clone());
        let options = Options::default();
        let mut statistics = Statistics::default();
        let mut env = InferenceEnv {
            store: &store,
            indexes: &indexes,
            ordering: &ordering,
            signature: &mut ctx.signature,
            statistics: &mut statistics,
            options: &options,
        };
        BinaryResolution::new().generate_clauses(0, &[], &mut env);
    }
}
