//! Substitutions, one-way matching and unification

use super::interner::{Interner, VariableId};
use super::literal::Literal;
use super::term::Term;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnificationError {
    #[error("symbol clash")]
    SymbolClash,
    #[error("occurs check failed for {0}")]
    OccursCheck(VariableId),
    #[error("variable already bound to a different term")]
    BindingConflict,
}

/// Mapping from variables to terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    pub map: HashMap<VariableId, Term>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var: VariableId) -> Option<&Term> {
        self.map.get(&var)
    }

    pub fn insert(&mut self, var: VariableId, term: Term) {
        self.map.insert(var, term);
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Apply, following chains of bindings until a fixed point.
    pub fn apply(&self, term: &Term) -> Term {
        match term {
            Term::Variable(v) => match self.map.get(&v.id) {
                Some(bound) if bound != term => self.apply(bound),
                _ => term.clone(),
            },
            Term::Constant(_) => term.clone(),
            Term::Function(f, args) => Term::Function(*f, args.iter().map(|a| self.apply(a)).collect()),
        }
    }

    pub fn apply_literal(&self, lit: &Literal) -> Literal {
        Literal {
            predicate: lit.predicate,
            args: lit.args.iter().map(|a| self.apply(a)).collect(),
            polarity: lit.polarity,
        }
    }
}

// =============================================================================
// Matching
// =============================================================================

/// One-way match: extend `subst` so that `pattern·subst == term`.
pub fn match_term(pattern: &Term, term: &Term, subst: &mut Substitution) -> bool {
    match (pattern, term) {
        (Term::Variable(v), _) => match subst.get(v.id) {
            Some(bound) => bound == term,
            None => {
                subst.insert(v.id, term.clone());
                true
            }
        },
        (Term::Constant(c1), Term::Constant(c2)) => c1 == c2,
        (Term::Function(f1, a1), Term::Function(f2, a2)) => {
            f1.id == f2.id
                && a1.len() == a2.len()
                && a1.iter().zip(a2).all(|(p, t)| match_term(p, t, subst))
        }
        _ => false,
    }
}

/// Match the atom of `pattern` onto the atom of `instance`, ignoring polarity.
pub fn match_atom(pattern: &Literal, instance: &Literal) -> Option<Substitution> {
    if pattern.predicate != instance.predicate || pattern.args.len() != instance.args.len() {
        return None;
    }
    let mut subst = Substitution::new();
    pattern
        .args
        .iter()
        .zip(&instance.args)
        .all(|(p, t)| match_term(p, t, &mut subst))
        .then_some(subst)
}

// =============================================================================
// Unification
// =============================================================================

fn occurs(var: VariableId, term: &Term, subst: &Substitution) -> bool {
    match term {
        Term::Variable(v) => {
            v.id == var || subst.get(v.id).is_some_and(|b| occurs(var, b, subst))
        }
        Term::Constant(_) => false,
        Term::Function(_, args) => args.iter().any(|a| occurs(var, a, subst)),
    }
}

fn unify_into(s: &Term, t: &Term, subst: &mut Substitution) -> Result<(), UnificationError> {
    let s = match s {
        Term::Variable(v) if subst.get(v.id).is_some() => subst.apply(s),
        _ => s.clone(),
    };
    let t = match t {
        Term::Variable(v) if subst.get(v.id).is_some() => subst.apply(t),
        _ => t.clone(),
    };
    match (&s, &t) {
        (Term::Variable(x), Term::Variable(y)) if x == y => Ok(()),
        (Term::Variable(x), other) | (other, Term::Variable(x)) => {
            if occurs(x.id, other, subst) {
                return Err(UnificationError::OccursCheck(x.id));
            }
            subst.insert(x.id, other.clone());
            Ok(())
        }
        (Term::Constant(a), Term::Constant(b)) if a == b => Ok(()),
        (Term::Function(f, a1), Term::Function(g, a2)) if f.id == g.id && a1.len() == a2.len() => {
            for (x, y) in a1.iter().zip(a2) {
                unify_into(x, y, subst)?;
            }
            Ok(())
        }
        _ => Err(UnificationError::SymbolClash),
    }
}

/// Most general unifier of two terms.
pub fn unify(s: &Term, t: &Term) -> Result<Substitution, UnificationError> {
    let mut subst = Substitution::new();
    unify_into(s, t, &mut subst)?;
    Ok(subst)
}

/// Most general unifier of two atoms, polarity ignored.
pub fn unify_atoms(l1: &Literal, l2: &Literal) -> Result<Substitution, UnificationError> {
    if l1.predicate != l2.predicate || l1.args.len() != l2.args.len() {
        return Err(UnificationError::SymbolClash);
    }
    let mut subst = Substitution::new();
    for (a, b) in l1.args.iter().zip(&l2.args) {
        unify_into(a, b, &mut subst)?;
    }
    Ok(subst)
}

/// Rename every variable of `literals` to `{name}_{suffix}`.
pub fn rename_variables(literals: &[Literal], suffix: usize, interner: &mut Interner) -> Vec<Literal> {
    let mut renaming = Substitution::new();
    for lit in literals {
        for var in lit.variable_ids() {
            if renaming.get(var).is_none() {
                let name = format!("{}_{}", interner.resolve_variable(var), suffix);
                renaming.insert(var, Term::var(interner.intern_variable(&name)));
            }
        }
    }
    literals.iter().map(|l| renaming.apply_literal(l)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::literal::PredicateSymbol;
    use crate::logic::term::FunctionSymbol;

    #[test]
    fn test_match_is_one_way() {
        let mut interner = Interner::new();
        let x = Term::var(interner.intern_variable("X"));
        let a = Term::constant(interner.intern_constant("a"));
        let f = FunctionSymbol::new(interner.intern_function("f"), 2);
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 1);

        let pattern = Literal::positive(p, vec![Term::Function(f, vec![x.clone(), x.clone()])]);
        let good = Literal::negative(p, vec![Term::Function(f, vec![a.clone(), a.clone()])]);
        let bad = Literal::positive(p, vec![Term::Function(f, vec![a.clone(), x.clone()])]);

        let subst = match_atom(&pattern, &good).expect("instance");
        assert_eq!(subst.apply(&x), a);
        assert!(match_atom(&pattern, &bad).is_none());
        assert!(match_atom(&good, &pattern).is_none());
    }

    #[test]
    fn test_unify_with_occurs_check() {
        let mut interner = Interner::new();
        let x = Term::var(interner.intern_variable("X"));
        let y = Term::var(interner.intern_variable("Y"));
        let a = Term::constant(interner.intern_constant("a"));
        let f = FunctionSymbol::new(interner.intern_function("f"), 1);
        let fx = Term::Function(f, vec![x.clone()]);

        assert_eq!(unify(&x, &fx), Err(UnificationError::OccursCheck(match &x {
            Term::Variable(v) => v.id,
            _ => unreachable!(),
        })));

        let fy = Term::Function(f, vec![y.clone()]);
        let fa = Term::Function(f, vec![a.clone()]);
        let mgu = unify(&fy, &fa).unwrap();
        assert_eq!(mgu.apply(&fy), fa);
    }
}
