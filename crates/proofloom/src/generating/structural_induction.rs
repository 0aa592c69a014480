//! Structural induction over term algebra sorts.
//!
//! For a ground selected literal L[t] where t has a recursive term algebra
//! sort, each constructor c contributes one case branch:
//!
//! - `L[c(sk_1, ..., sk_n)]` with fresh skolem constants for the arguments
//! - `¬L[sk_i]` for every argument i of the algebra's own sort
//!
//! A conclusion picks one literal from every branch (the Cartesian product)
//! and puts the pick where L stood in the premise.
//!
//! Each generalised pattern L[$induction] is instantiated at most once per
//! engine, and an engine lives exactly as long as its saturation run.

use super::{GeneratingInferenceEngine, InferenceEnv};
use crate::config::InductionKind;
use crate::log_targets;
use crate::logic::{Clause, Inference, InferenceRule, Literal, Signature, Term, TermAlgebra};
use std::collections::HashSet;

/// Name of the variable standing for the generalised subterm in memo keys.
const INDUCTION_VARIABLE: &str = "$induction";

#[derive(Debug)]
pub struct StructuralInduction {
    kind: InductionKind,
    /// Largest head arity of an induction point, `None` for unbounded
    subterm_arity: Option<usize>,
    generalised: HashSet<Literal>,
}

impl StructuralInduction {
    pub fn new(kind: InductionKind, subterm_arity: i32) -> Self {
        StructuralInduction {
            kind,
            subterm_arity: usize::try_from(subterm_arity).ok(),
            generalised: HashSet::new(),
        }
    }

    pub fn is_eligible(&self, lit: &Literal) -> bool {
        lit.is_ground() && self.kind.admits(lit.polarity)
    }

    /// Subterms of `lit` to induct over, recording each generalised pattern.
    ///
    /// Patterns already instantiated (for any literal) are skipped.
    pub fn induction_points(&mut self, lit: &Literal, signature: &mut Signature) -> Vec<Term> {
        let placeholder = Term::var(signature.interner.intern_variable(INDUCTION_VARIABLE));
        let mut seen = HashSet::new();
        let mut points = Vec::new();
        for subterm in lit.non_variable_subterms() {
            if !seen.insert(subterm) {
                continue;
            }
            if self.subterm_arity.is_some_and(|max| subterm.head_arity() > max) {
                continue;
            }
            let Some(algebra) = signature
                .sort_of(subterm)
                .and_then(|sort| signature.term_algebra_of_sort(sort))
            else {
                continue;
            };
            if !algebra.is_recursive() || algebra.is_constructor_term(subterm) {
                continue;
            }
            debug_assert!(lit.is_ground());
            if !self.generalised.insert(lit.replace_term(subterm, &placeholder)) {
                continue;
            }
            points.push(subterm.clone());
        }
        points
    }

    /// Schema literals for `complement` (the complement of the selected
    /// literal) over `subterm`, one branch per constructor of `algebra`.
    pub fn case_branches(
        complement: &Literal,
        subterm: &Term,
        algebra: &TermAlgebra,
        signature: &mut Signature,
    ) -> Vec<Vec<Literal>> {
        algebra
            .constructors
            .iter()
            .map(|ctor| {
                let mut hypotheses = Vec::new();
                let skolems: Vec<Term> = ctor
                    .arg_sorts
                    .iter()
                    .enumerate()
                    .map(|(i, &sort)| {
                        let suffix = ctor.destructors.get(i).map_or("arg", String::as_str);
                        let skolem = Term::Constant(signature.add_skolem_constant(sort, suffix));
                        if ctor.is_recursive_argument(i) {
                            hypotheses.push(complement.replace_term(subterm, &skolem));
                        }
                        skolem
                    })
                    .collect();
                let case = complement.replace_term(subterm, &ctor.apply(skolems)).complement();
                let mut branch = Vec::with_capacity(1 + hypotheses.len());
                branch.push(case);
                branch.extend(hypotheses);
                branch
            })
            .collect()
    }

    /// Every way of picking one literal from each branch.
    pub fn cartesian_product(branches: &[Vec<Literal>]) -> Vec<Vec<Literal>> {
        branches.iter().fold(vec![Vec::new()], |product, branch| {
            product
                .iter()
                .flat_map(|prefix| {
                    branch.iter().map(move |lit| {
                        let mut combination = prefix.clone();
                        combination.push(lit.clone());
                        combination
                    })
                })
                .collect()
        })
    }
}

impl GeneratingInferenceEngine for StructuralInduction {
    fn name(&self) -> &str {
        "StructuralInduction"
    }

    fn generate_clauses(&mut self, premise: usize, selected: &[usize], env: &mut InferenceEnv<'_>) -> Vec<Clause> {
        let clause = env.store.get(premise);
        let mut results = Vec::new();

        for &position in selected {
            let lit = &clause.literals[position];
            if !self.is_eligible(lit) {
                continue;
            }
            for subterm in self.induction_points(lit, env.signature) {
                let Some(algebra) = env
                    .signature
                    .sort_of(&subterm)
                    .and_then(|sort| env.signature.term_algebra_of_sort(sort))
                    .cloned()
                else {
                    continue;
                };
                log::debug!(
                    target: log_targets::INDUCTION,
                    "Instantiating structural induction schema for {} over {}",
                    lit.display(&env.signature.interner),
                    subterm.display(&env.signature.interner)
                );

                let branches = Self::case_branches(&lit.complement(), &subterm, &algebra, env.signature);
                for combination in Self::cartesian_product(&branches) {
                    let mut literals = Vec::with_capacity(clause.literals.len() - 1 + combination.len());
                    literals.extend_from_slice(&clause.literals[..position]);
                    literals.extend(combination);
                    literals.extend_from_slice(&clause.literals[position + 1..]);
                    results.push(Clause::derived(
                        literals,
                        clause.input_type,
                        clause.age + 1,
                        Inference::new(InferenceRule::StructuralInduction, vec![premise]),
                    ));
                    env.statistics.structural_induction_inferences += 1;
                }
            }
        }
        results
    }
}
