//! Recursive rewriting of formulas.
//!
//! A transformer returns `None` for a subformula it leaves alone. Parents
//! are rebuilt only when some child changed, so an untouched formula comes
//! back as the very same value from [`FormulaTransformer::transform`].
//!
//! The `walk_*` functions are the default structural recursion; overriding
//! implementations call them to fall back to it.

use super::clause::{Clause, Inference, InferenceRule};
use super::formula::{BinaryConnective, Formula, FormulaUnit, Junction, Quantifier};
use super::literal::Literal;
use super::term::{Term, Variable};
use std::sync::Arc;

pub trait FormulaTransformer {
    fn transform(&mut self, f: Formula) -> Formula {
        match self.apply(&f) {
            Some(changed) => changed,
            None => f,
        }
    }

    fn apply(&mut self, f: &Formula) -> Option<Formula> {
        match f {
            Formula::Literal(lit) => self.apply_literal(lit),
            Formula::True => self.apply_true_false(true),
            Formula::False => self.apply_true_false(false),
            Formula::Not(arg) => self.apply_not(arg),
            Formula::Junction(j, args) => self.apply_junction(*j, args),
            Formula::Binary(BinaryConnective::Implies, l, r) => self.apply_implies(l, r),
            Formula::Binary(c, l, r) => self.apply_binary(*c, l, r),
            Formula::Quantified(q, vars, body) => self.apply_quantified(*q, vars, body),
            Formula::Ite(c, t, e) => self.apply_ite(c, t, e),
        }
    }

    fn apply_literal(&mut self, _lit: &Literal) -> Option<Formula> {
        None
    }

    fn apply_true_false(&mut self, _value: bool) -> Option<Formula> {
        None
    }

    fn apply_not(&mut self, arg: &Formula) -> Option<Formula> {
        walk_not(self, arg)
    }

    fn apply_junction(&mut self, junction: Junction, args: &[Formula]) -> Option<Formula> {
        walk_junction(self, junction, args)
    }

    fn apply_implies(&mut self, lhs: &Formula, rhs: &Formula) -> Option<Formula> {
        walk_binary(self, BinaryConnective::Implies, lhs, rhs)
    }

    fn apply_binary(&mut self, c: BinaryConnective, lhs: &Formula, rhs: &Formula) -> Option<Formula> {
        walk_binary(self, c, lhs, rhs)
    }

    fn apply_quantified(&mut self, q: Quantifier, vars: &[Variable], body: &Formula) -> Option<Formula> {
        walk_quantified(self, q, vars, body)
    }

    fn apply_ite(&mut self, cond: &Formula, then: &Formula, other: &Formula) -> Option<Formula> {
        walk_ite(self, cond, then, other)
    }
}

pub fn walk_not<T: FormulaTransformer + ?Sized>(t: &mut T, arg: &Formula) -> Option<Formula> {
    t.apply(arg).map(|a| Formula::Not(Box::new(a)))
}

pub fn walk_junction<T: FormulaTransformer + ?Sized>(
    t: &mut T,
    junction: Junction,
    args: &[Formula],
) -> Option<Formula> {
    let mut changed: Vec<Option<Formula>> = Vec::with_capacity(args.len());
    let mut modified = false;
    for arg in args {
        let new_arg = t.apply(arg);
        modified |= new_arg.is_some();
        changed.push(new_arg);
    }
    if !modified {
        return None;
    }
    let args = changed
        .into_iter()
        .zip(args)
        .map(|(new, old)| new.unwrap_or_else(|| old.clone()))
        .collect();
    Some(Formula::Junction(junction, args))
}

pub fn walk_binary<T: FormulaTransformer + ?Sized>(
    t: &mut T,
    c: BinaryConnective,
    lhs: &Formula,
    rhs: &Formula,
) -> Option<Formula> {
    let new_lhs = t.apply(lhs);
    let new_rhs = t.apply(rhs);
    rebuild_binary(c, lhs, rhs, new_lhs, new_rhs)
}

fn rebuild_binary(
    c: BinaryConnective,
    lhs: &Formula,
    rhs: &Formula,
    new_lhs: Option<Formula>,
    new_rhs: Option<Formula>,
) -> Option<Formula> {
    if new_lhs.is_none() && new_rhs.is_none() {
        return None;
    }
    Some(Formula::Binary(
        c,
        Box::new(new_lhs.unwrap_or_else(|| lhs.clone())),
        Box::new(new_rhs.unwrap_or_else(|| rhs.clone())),
    ))
}

pub fn walk_quantified<T: FormulaTransformer + ?Sized>(
    t: &mut T,
    q: Quantifier,
    vars: &[Variable],
    body: &Formula,
) -> Option<Formula> {
    t.apply(body)
        .map(|b| Formula::Quantified(q, vars.to_vec(), Box::new(b)))
}

pub fn walk_ite<T: FormulaTransformer + ?Sized>(
    t: &mut T,
    cond: &Formula,
    then: &Formula,
    other: &Formula,
) -> Option<Formula> {
    let new_cond = t.apply(cond);
    let new_then = t.apply(then);
    let new_other = t.apply(other);
    rebuild_ite(cond, then, other, new_cond, new_then, new_other)
}

fn rebuild_ite(
    cond: &Formula,
    then: &Formula,
    other: &Formula,
    new_cond: Option<Formula>,
    new_then: Option<Formula>,
    new_other: Option<Formula>,
) -> Option<Formula> {
    if new_cond.is_none() && new_then.is_none() && new_other.is_none() {
        return None;
    }
    Some(Formula::Ite(
        Box::new(new_cond.unwrap_or_else(|| cond.clone())),
        Box::new(new_then.unwrap_or_else(|| then.clone())),
        Box::new(new_other.unwrap_or_else(|| other.clone())),
    ))
}

// =============================================================================
// Term-level rewriting inside literals
// =============================================================================

pub trait TermTransformer {
    /// Replacement for `term`, or `None` to descend into its arguments.
    fn transform_term(&mut self, term: &Term) -> Option<Term>;
}

fn transform_term_deep<T: TermTransformer + ?Sized>(tt: &mut T, term: &Term) -> Option<Term> {
    if let Some(replaced) = tt.transform_term(term) {
        return Some(replaced);
    }
    let Term::Function(f, args) = term else {
        return None;
    };
    let new_args: Vec<Option<Term>> = args.iter().map(|a| transform_term_deep(tt, a)).collect();
    if new_args.iter().all(Option::is_none) {
        return None;
    }
    Some(Term::Function(
        *f,
        new_args
            .into_iter()
            .zip(args)
            .map(|(n, o)| n.unwrap_or_else(|| o.clone()))
            .collect(),
    ))
}

pub fn transform_literal_terms<T: TermTransformer + ?Sized>(tt: &mut T, lit: &Literal) -> Option<Literal> {
    let new_args: Vec<Option<Term>> = lit.args.iter().map(|a| transform_term_deep(tt, a)).collect();
    if new_args.iter().all(Option::is_none) {
        return None;
    }
    Some(Literal {
        predicate: lit.predicate,
        args: new_args
            .into_iter()
            .zip(&lit.args)
            .map(|(n, o)| n.unwrap_or_else(|| o.clone()))
            .collect(),
        polarity: lit.polarity,
    })
}

/// Applies a term transformer to every literal argument.
pub struct TermTransformingFormulaTransformer<T> {
    pub term_transformer: T,
}

impl<T: TermTransformer> TermTransformingFormulaTransformer<T> {
    pub fn new(term_transformer: T) -> Self {
        TermTransformingFormulaTransformer { term_transformer }
    }
}

impl<T: TermTransformer> FormulaTransformer for TermTransformingFormulaTransformer<T> {
    fn apply_literal(&mut self, lit: &Literal) -> Option<Formula> {
        transform_literal_terms(&mut self.term_transformer, lit).map(Formula::Literal)
    }
}

// =============================================================================
// Polarity tracking
// =============================================================================

/// Polarity of a subformula occurrence: 1, -1, or 0 for both.
pub type Polarity = i8;

/// Leaf behaviour for [`PolarityAware`].
pub trait PolarityLeafTransformer {
    fn apply_literal(&mut self, lit: &Literal, polarity: Polarity) -> Option<Formula>;

    fn apply_true_false(&mut self, _value: bool, _polarity: Polarity) -> Option<Formula> {
        None
    }
}

/// Tracks the polarity of the current position while descending:
/// negation and the left side of an implication flip it, equivalence,
/// exclusive or and if-then-else conditions reset it to 0.
pub struct PolarityAware<L> {
    pub leaf: L,
    polarity: Polarity,
}

impl<L: PolarityLeafTransformer> PolarityAware<L> {
    pub fn new(leaf: L) -> Self {
        PolarityAware { leaf, polarity: 1 }
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn transform_with_polarity(&mut self, f: Formula, polarity: Polarity) -> Formula {
        self.polarity = polarity;
        self.transform(f)
    }

    fn scoped<R>(&mut self, polarity: Polarity, body: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.polarity;
        self.polarity = polarity;
        let result = body(self);
        self.polarity = saved;
        result
    }
}

impl<L: PolarityLeafTransformer> FormulaTransformer for PolarityAware<L> {
    fn apply_literal(&mut self, lit: &Literal) -> Option<Formula> {
        self.leaf.apply_literal(lit, self.polarity)
    }

    fn apply_true_false(&mut self, value: bool) -> Option<Formula> {
        self.leaf.apply_true_false(value, self.polarity)
    }

    fn apply_not(&mut self, arg: &Formula) -> Option<Formula> {
        let flipped = -self.polarity;
        self.scoped(flipped, |t| walk_not(t, arg))
    }

    fn apply_implies(&mut self, lhs: &Formula, rhs: &Formula) -> Option<Formula> {
        let flipped = -self.polarity;
        let new_lhs = self.scoped(flipped, |t| t.apply(lhs));
        let new_rhs = self.apply(rhs);
        rebuild_binary(BinaryConnective::Implies, lhs, rhs, new_lhs, new_rhs)
    }

    fn apply_binary(&mut self, c: BinaryConnective, lhs: &Formula, rhs: &Formula) -> Option<Formula> {
        self.scoped(0, |t| walk_binary(t, c, lhs, rhs))
    }

    fn apply_ite(&mut self, cond: &Formula, then: &Formula, other: &Formula) -> Option<Formula> {
        let new_cond = self.scoped(0, |t| t.apply(cond));
        let new_then = self.apply(then);
        let new_other = self.apply(other);
        rebuild_ite(cond, then, other, new_cond, new_then, new_other)
    }
}

// =============================================================================
// Unit-level transformation
// =============================================================================

/// A problem unit: a clause or a formula awaiting clausification.
#[derive(Debug, Clone)]
pub enum Unit {
    Clause(Arc<Clause>),
    Formula(FormulaUnit),
}

pub enum UnitTransform {
    Unchanged,
    Replaced(FormulaUnit),
    Deleted,
}

pub trait FormulaUnitTransformer {
    fn transform_unit(&mut self, unit: &FormulaUnit) -> UnitTransform;

    /// Transform formula units in place; clauses pass through untouched.
    fn transform_units(&mut self, units: &mut Vec<Unit>) {
        let mut kept = Vec::with_capacity(units.len());
        for unit in units.drain(..) {
            match unit {
                Unit::Clause(_) => kept.push(unit),
                Unit::Formula(fu) => match self.transform_unit(&fu) {
                    UnitTransform::Unchanged => kept.push(Unit::Formula(fu)),
                    UnitTransform::Replaced(new_unit) => kept.push(Unit::Formula(new_unit)),
                    UnitTransform::Deleted => {}
                },
            }
        }
        *units = kept;
    }
}

/// Lifts a formula transformer to units, recording `rule` as the inference
/// of every unit it changes.
pub struct LocalFormulaUnitTransformer<T> {
    transformer: T,
    rule: InferenceRule,
    next_id: usize,
}

impl<T: FormulaTransformer> LocalFormulaUnitTransformer<T> {
    pub fn new(transformer: T, rule: InferenceRule, next_id: usize) -> Self {
        LocalFormulaUnitTransformer {
            transformer,
            rule,
            next_id,
        }
    }

    /// First unit id not handed out yet.
    pub fn next_id(&self) -> usize {
        self.next_id
    }
}

impl<T: FormulaTransformer> FormulaUnitTransformer for LocalFormulaUnitTransformer<T> {
    fn transform_unit(&mut self, unit: &FormulaUnit) -> UnitTransform {
        match self.transformer.apply(&unit.formula) {
            None => UnitTransform::Unchanged,
            Some(formula) => {
                let id = self.next_id;
                self.next_id += 1;
                UnitTransform::Replaced(FormulaUnit {
                    id,
                    formula,
                    input_type: unit.input_type,
                    inference: Inference::new(self.rule, vec![unit.id]),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::clause::InputType;
    use crate::logic::interner::Interner;
    use crate::logic::literal::PredicateSymbol;

    struct Renamer {
        from: Term,
        to: Term,
    }

    impl TermTransformer for Renamer {
        fn transform_term(&mut self, term: &Term) -> Option<Term> {
            (term == &self.from).then(|| self.to.clone())
        }
    }

    /// Records (literal, polarity) pairs.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<(Literal, Polarity)>,
    }

    impl PolarityLeafTransformer for Recorder {
        fn apply_literal(&mut self, lit: &Literal, polarity: Polarity) -> Option<Formula> {
            self.seen.push((lit.clone(), polarity));
            None
        }
    }

    fn atoms() -> (Interner, Literal, Literal, Term, Term) {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 1);
        let q = PredicateSymbol::new(interner.intern_predicate("q"), 1);
        let a = Term::constant(interner.intern_constant("a"));
        let b = Term::constant(interner.intern_constant("b"));
        (
            interner,
            Literal::positive(p, vec![a.clone()]),
            Literal::positive(q, vec![a.clone()]),
            a,
            b,
        )
    }

    #[test]
    fn test_unchanged_formula_is_returned_as_is() {
        let (_, pa, qa, _a, _b) = atoms();
        let f = Formula::and(vec![Formula::Literal(pa), Formula::not(Formula::Literal(qa))]);
        let mut t = TermTransformingFormulaTransformer::new(Renamer {
            from: Term::constant(crate::logic::interner::ConstantId(99)),
            to: Term::constant(crate::logic::interner::ConstantId(98)),
        });
        assert!(t.apply(&f).is_none());
        assert_eq!(t.transform(f.clone()), f);
    }

    #[test]
    fn test_term_transforming_rewrites_literals() {
        let (_, pa, qa, a, b) = atoms();
        let f = Formula::or(vec![Formula::Literal(pa.clone()), Formula::Literal(qa)]);
        let mut t = TermTransformingFormulaTransformer::new(Renamer { from: a.clone(), to: b.clone() });
        let result = t.transform(f);
        let Formula::Junction(Junction::Or, args) = result else {
            panic!("junction expected");
        };
        assert_eq!(args[0], Formula::Literal(pa.replace_term(&a, &b)));
    }

    #[test]
    fn test_polarity_through_connectives() {
        let (_, pa, qa, _, _) = atoms();
        // ~(p => q) <=> p
        let f = Formula::not(Formula::implies(
            Formula::Literal(pa.clone()),
            Formula::Literal(qa.clone()),
        ));
        let mut t = PolarityAware::new(Recorder::default());
        t.transform_with_polarity(f, 1);
        assert_eq!(t.leaf.seen, vec![(pa.clone(), 1), (qa.clone(), -1)]);

        let g = Formula::iff(Formula::Literal(pa.clone()), Formula::Literal(qa.clone()));
        let mut t = PolarityAware::new(Recorder::default());
        t.transform_with_polarity(g, 1);
        assert!(t.leaf.seen.iter().all(|(_, pol)| *pol == 0));
        // Scoped polarity is restored after leaving the equivalence
        assert_eq!(t.polarity(), 1);
    }

    #[test]
    fn test_unit_transformer_replaces_and_records_rule() {
        let (_, pa, _, a, b) = atoms();
        let unit = FormulaUnit {
            id: 0,
            formula: Formula::Literal(pa),
            input_type: InputType::Axiom,
            inference: Inference::input(),
        };
        let mut units = vec![Unit::Formula(unit)];
        let mut t = LocalFormulaUnitTransformer::new(
            TermTransformingFormulaTransformer::new(Renamer { from: a, to: b }),
            InferenceRule::Preprocessing,
            1,
        );
        t.transform_units(&mut units);
        let Unit::Formula(fu) = &units[0] else {
            panic!("formula unit expected");
        };
        assert_eq!(fu.id, 1);
        assert_eq!(fu.inference.premises, vec![0]);
        assert_eq!(t.next_id(), 2);
    }
}
