//! Splitting clauses into variable-disjoint components by naming.
//!
//! A clause C1 ∨ C2 ∨ ... ∨ Cn whose components share no variables becomes
//! C1 ∨ p2 ∨ ... ∨ pn together with one definition ¬pi ∨ Ci per named
//! component. Names are propositional split predicates; a component that
//! reappears (up to variable renaming) reuses its name, and its definition
//! is only produced the first time.

use crate::log_targets;
use crate::logic::{Clause, ClauseKey, Inference, InferenceRule, Literal, PredicateSymbol, Signature, VariableId};
use std::collections::{HashMap, HashSet};

#[derive(Debug)]
pub struct SplitResult {
    /// First component plus the names of the others
    pub clause: Clause,
    /// Definitions introduced by this split
    pub definitions: Vec<Clause>,
    pub components: usize,
}

#[derive(Debug, Default)]
pub struct ComponentSplitter {
    names: HashMap<ClauseKey, PredicateSymbol>,
}

impl ComponentSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variable-disjoint components as lists of literal positions.
    ///
    /// Split-name literals carry no variables and stay with the first
    /// component, so naming never splits them off again.
    pub fn components(clause: &Clause, signature: &Signature) -> Vec<Vec<usize>> {
        let mut components: Vec<(HashSet<VariableId>, Vec<usize>)> = Vec::new();
        let mut names = Vec::new();
        for (i, lit) in clause.literals.iter().enumerate() {
            if signature.is_split_predicate(lit.predicate.id) {
                names.push(i);
                continue;
            }
            let vars = lit.variable_ids();
            let mut merged = (vars, vec![i]);
            let mut k = 0;
            while k < components.len() {
                if vars_intersect(&components[k].0, &merged.0) || (merged.0.is_empty() && components[k].0.is_empty()) {
                    let (other_vars, other_lits) = components.remove(k);
                    merged.0.extend(other_vars);
                    merged.1.extend(other_lits);
                } else {
                    k += 1;
                }
            }
            components.push(merged);
        }

        let mut result: Vec<Vec<usize>> = components
            .into_iter()
            .map(|(_, mut lits)| {
                lits.sort_unstable();
                lits
            })
            .collect();
        result.sort_unstable_by_key(|lits| lits[0]);
        match result.first_mut() {
            Some(first) => {
                first.extend(names);
                first.sort_unstable();
            }
            None if !names.is_empty() => result.push(names),
            None => {}
        }
        result
    }

    /// Split `clause` (stored at `idx`); `None` if it has a single component.
    pub fn split(&mut self, idx: usize, clause: &Clause, signature: &mut Signature) -> Option<SplitResult> {
        let components = Self::components(clause, signature);
        if components.len() < 2 {
            return None;
        }

        let pick = |positions: &[usize]| -> Vec<Literal> {
            positions.iter().map(|&i| clause.literals[i].clone()).collect()
        };
        let mut literals = pick(&components[0]);
        let mut definitions = Vec::new();
        for component in &components[1..] {
            let component_literals = pick(component);
            let key = ClauseKey::from_literals(&component_literals);
            let name = match self.names.get(&key) {
                Some(&name) => name,
                None => {
                    let name = signature.add_split_predicate();
                    self.names.insert(key, name);
                    let mut definition = vec![Literal::negative(name, vec![])];
                    definition.extend(component_literals);
                    definitions.push(Clause::derived(
                        definition,
                        clause.input_type,
                        clause.age,
                        Inference::new(InferenceRule::SplittingComponent, vec![idx]),
                    ));
                    name
                }
            };
            literals.push(Literal::positive(name, vec![]));
        }

        log::trace!(
            target: log_targets::SPLITTING,
            "[{}] split into {} components",
            idx,
            components.len()
        );
        Some(SplitResult {
            clause: Clause::derived(
                literals,
                clause.input_type,
                clause.age,
                Inference::new(InferenceRule::Splitting, vec![idx]),
            ),
            definitions,
            components: components.len(),
        })
    }
}

fn vars_intersect(a: &HashSet<VariableId>, b: &HashSet<VariableId>) -> bool {
    a.iter().any(|v| b.contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Term;

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
            let q = signature.declare_predicate("q", vec![i, i]);
            TestContext { signature, p, q }
        }

        fn var(&mut self, name: &str) -> Term {
            Term::var(self.signature.interner.intern_variable(name))
        }
    }

    #[test]
    fn test_connected_literals_stay_together() {
        let mut ctx = TestContext::new();
        let (x, y, z) = (ctx.var("X"), ctx.var("Y"), ctx.var("Z"));
        // p(X) | q(X, Y) | p(Z)
        let clause = Clause::new(vec![
            Literal::positive(ctx.p, vec![x.clone()]),
            Literal::positive(ctx.q, vec![x, y]),
            Literal::negative(ctx.p, vec![z]),
        ]);
        assert_eq!(
            ComponentSplitter::components(&clause, &ctx.signature),
            vec![vec![0, 1], vec![2]]
        );
    }

    #[test]
    fn test_split_names_components_once() {
        let mut ctx = TestContext::new();
        let (x, y) = (ctx.var("X"), ctx.var("Y"));
        let clause = Clause::new(vec![
            Literal::positive(ctx.p, vec![x]),
            Literal::negative(ctx.p, vec![y.clone()]),
        ]);
        let mut splitter = ComponentSplitter::new();

        let first = splitter.split(3, &clause, &mut ctx.signature).unwrap();
        assert_eq!(first.components, 2);
        assert_eq!(first.definitions.len(), 1);
        assert_eq!(first.clause.literals.len(), 2);
        let name = first.clause.literals[1].predicate;
        assert!(ctx.signature.is_split_predicate(name.id));
        assert_eq!(first.definitions[0].literals[0], Literal::negative(name, vec![]));
        assert_eq!(first.definitions[0].inference.premises, vec![3]);

        // The renamed component ~p(W) reuses the name
        let w = ctx.var("W");
        let v = ctx.var("V");
        let again = Clause::new(vec![
            Literal::positive(ctx.q, vec![v.clone(), v]),
            Literal::negative(ctx.p, vec![w]),
        ]);
        let second = splitter.split(4, &again, &mut ctx.signature).unwrap();
        assert!(second.definitions.is_empty());
        assert_eq!(second.clause.literals[1].predicate, name);

        // The split clause itself does not split again
        assert!(splitter.split(5, &first.clause, &mut ctx.signature).is_none());
    }
}
