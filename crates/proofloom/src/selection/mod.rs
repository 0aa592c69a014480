//! Literal selection strategies based on Hoder et al. "Selecting the selection" (2016)
//!
//! A selector decides which literals of an activated clause generating
//! inferences may work on.
//!
//! - Selection 0: Select all literals
//! - Selection 20: Select all maximal literals
//! - Selection 21: Select unique maximal, else negative with max weight, else all maximal
//! - Selection 22: Select negative literal with max weight, else all maximal

use crate::config::LiteralSelectionStrategy;
use crate::logic::{Clause, Ordering, KBO};

pub trait LiteralSelector: Send + Sync {
    /// Indices of the selected literals, ascending
    fn select(&self, clause: &Clause, ordering: &KBO) -> Vec<usize>;

    fn name(&self) -> &str;
}

pub fn selector_for(strategy: LiteralSelectionStrategy) -> Box<dyn LiteralSelector> {
    match strategy {
        LiteralSelectionStrategy::Sel0 => Box::new(SelectAll),
        LiteralSelectionStrategy::Sel20 => Box::new(SelectMaximal),
        LiteralSelectionStrategy::Sel21 => Box::new(SelectUniqueMaximalOrNegOrMaximal),
        LiteralSelectionStrategy::Sel22 => Box::new(SelectNegMaxWeightOrMaximal),
    }
}

/// Literals no other literal of the clause is strictly greater than.
fn maximal_literals(clause: &Clause, ordering: &KBO) -> Vec<usize> {
    let lits = &clause.literals;
    (0..lits.len())
        .filter(|&i| {
            !lits
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && ordering.compare_literals(other, &lits[i]) == Ordering::Greater)
        })
        .collect()
}

fn unique_maximal(clause: &Clause, ordering: &KBO) -> Option<usize> {
    let maximal = maximal_literals(clause, ordering);
    match maximal.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

/// Heaviest negative literal; the first one on ties.
fn max_weight_negative(clause: &Clause) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (i, lit) in clause.literals.iter().enumerate() {
        if lit.polarity {
            continue;
        }
        let w = lit.weight();
        if best.map_or(true, |(_, bw)| w > bw) {
            best = Some((i, w));
        }
    }
    best.map(|(i, _)| i)
}

pub struct SelectAll;

impl LiteralSelector for SelectAll {
    fn select(&self, clause: &Clause, _ordering: &KBO) -> Vec<usize> {
        (0..clause.literals.len()).collect()
    }

    fn name(&self) -> &str {
        "Sel0"
    }
}

pub struct SelectMaximal;

impl LiteralSelector for SelectMaximal {
    fn select(&self, clause: &Clause, ordering: &KBO) -> Vec<usize> {
        maximal_literals(clause, ordering)
    }

    fn name(&self) -> &str {
        "Sel20"
    }
}

pub struct SelectUniqueMaximalOrNegOrMaximal;

impl LiteralSelector for SelectUniqueMaximalOrNegOrMaximal {
    fn select(&self, clause: &Clause, ordering: &KBO) -> Vec<usize> {
        if let Some(i) = unique_maximal(clause, ordering) {
            return vec![i];
        }
        if let Some(i) = max_weight_negative(clause) {
            return vec![i];
        }
        maximal_literals(clause, ordering)
    }

    fn name(&self) -> &str {
        "Sel21"
    }
}

pub struct SelectNegMaxWeightOrMaximal;

impl LiteralSelector for SelectNegMaxWeightOrMaximal {
    fn select(&self, clause: &Clause, ordering: &KBO) -> Vec<usize> {
        match max_weight_negative(clause) {
            Some(i) => vec![i],
            None => maximal_literals(clause, ordering),
        }
    }

    fn name(&self) -> &str {
        "Sel22"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{FunctionSymbol, Interner, Literal, PredicateSymbol, Term};

    struct TestContext {
        interner: Interner,
    }

    impl TestContext {
        fn new() -> Self {
            TestContext {
                interner: Interner::new(),
            }
        }

        fn var(&mut self, name: &str) -> Term {
            Term::var(self.interner.intern_variable(name))
        }

        fn const_(&mut self, name: &str) -> Term {
            Term::constant(self.interner.intern_constant(name))
        }

        fn func(&mut self, name: &str, args: Vec<Term>) -> Term {
            let id = self.interner.intern_function(name);
            Term::Function(FunctionSymbol::new(id, args.len() as u8), args)
        }

        fn lit(&mut self, name: &str, args: Vec<Term>, positive: bool) -> Literal {
            let p = PredicateSymbol::new(self.interner.intern_predicate(name), args.len() as u8);
            Literal { predicate: p, args, polarity: positive }
        }
    }

    #[test]
    fn test_select_all() {
        let mut ctx = TestContext::new();
        let a = ctx.const_("a");
        let clause = Clause::new(vec![ctx.lit("p", vec![a.clone()], true), ctx.lit("q", vec![a], false)]);
        assert_eq!(SelectAll.select(&clause, &KBO::default()), vec![0, 1]);
    }

    #[test]
    fn test_select_maximal_keeps_incomparable() {
        let mut ctx = TestContext::new();
        let x = ctx.var("X");
        let y = ctx.var("Y");
        let a = ctx.const_("a");
        let fa = ctx.func("f", vec![a.clone()]);
        // p(f(a)) > p(a); ~q(X) and r(Y) are incomparable with the rest
        let clause = Clause::new(vec![
            ctx.lit("p", vec![fa], true),
            ctx.lit("p", vec![a], true),
            ctx.lit("q", vec![x], false),
            ctx.lit("r", vec![y], true),
        ]);
        assert_eq!(SelectMaximal.select(&clause, &KBO::default()), vec![0, 2, 3]);
    }

    #[test]
    fn test_sel21_falls_back_to_heaviest_negative() {
        let mut ctx = TestContext::new();
        let x = ctx.var("X");
        let y = ctx.var("Y");
        let fx = ctx.func("f", vec![x.clone()]);
        let clause = Clause::new(vec![
            ctx.lit("p", vec![x], true),
            ctx.lit("q", vec![y.clone()], true),
            ctx.lit("r", vec![fx], false),
            ctx.lit("s", vec![y], false),
        ]);
        let ordering = KBO::default();
        assert_eq!(SelectUniqueMaximalOrNegOrMaximal.select(&clause, &ordering), vec![2]);
        assert_eq!(SelectNegMaxWeightOrMaximal.select(&clause, &ordering), vec![2]);
    }
}
