//! Terms

use crate::logic::interner::{ConstantId, FunctionId, Interner, VariableId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
}

impl Variable {
    pub fn new(id: VariableId) -> Self {
        Variable { id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Constant {
    pub id: ConstantId,
}

impl Constant {
    pub fn new(id: ConstantId) -> Self {
        Constant { id }
    }
}

/// A function symbol with its arity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub id: FunctionId,
    pub arity: u8,
}

impl FunctionSymbol {
    pub fn new(id: FunctionId, arity: u8) -> Self {
        FunctionSymbol { id, arity }
    }
}

/// A first-order term
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Variable(Variable),
    Constant(Constant),
    Function(FunctionSymbol, Vec<Term>),
}

impl Term {
    pub fn var(id: VariableId) -> Term {
        Term::Variable(Variable::new(id))
    }

    pub fn constant(id: ConstantId) -> Term {
        Term::Constant(Constant::new(id))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    pub fn is_ground(&self) -> bool {
        match self {
            Term::Variable(_) => false,
            Term::Constant(_) => true,
            Term::Function(_, args) => args.iter().all(Term::is_ground),
        }
    }

    /// Arity of the head symbol; 0 for constants and variables.
    pub fn head_arity(&self) -> usize {
        match self {
            Term::Function(_, args) => args.len(),
            _ => 0,
        }
    }

    /// Number of symbol occurrences, variables included.
    pub fn symbol_count(&self) -> usize {
        match self {
            Term::Variable(_) | Term::Constant(_) => 1,
            Term::Function(_, args) => 1 + args.iter().map(Term::symbol_count).sum::<usize>(),
        }
    }

    pub fn collect_variable_ids(&self, vars: &mut HashSet<VariableId>) {
        match self {
            Term::Variable(v) => {
                vars.insert(v.id);
            }
            Term::Constant(_) => {}
            Term::Function(_, args) => {
                for arg in args {
                    arg.collect_variable_ids(vars);
                }
            }
        }
    }

    /// Variable occurrences in left-to-right order, repeats included.
    pub fn variable_occurrences(&self, out: &mut Vec<VariableId>) {
        match self {
            Term::Variable(v) => out.push(v.id),
            Term::Constant(_) => {}
            Term::Function(_, args) => {
                for arg in args {
                    arg.variable_occurrences(out);
                }
            }
        }
    }

    pub fn contains(&self, needle: &Term) -> bool {
        if self == needle {
            return true;
        }
        match self {
            Term::Function(_, args) => args.iter().any(|a| a.contains(needle)),
            _ => false,
        }
    }

    /// Replace every occurrence of `from` by `to`.
    pub fn replace(&self, from: &Term, to: &Term) -> Term {
        if self == from {
            return to.clone();
        }
        match self {
            Term::Function(f, args) => {
                Term::Function(*f, args.iter().map(|a| a.replace(from, to)).collect())
            }
            _ => self.clone(),
        }
    }

    /// Pre-order walk over all non-variable subterms, `self` included.
    pub fn non_variable_subterms(&self) -> NonVariableSubterms<'_> {
        NonVariableSubterms { stack: vec![self] }
    }

    pub fn display<'a>(&'a self, interner: &'a Interner) -> TermDisplay<'a> {
        TermDisplay {
            term: self,
            interner,
        }
    }
}

pub struct NonVariableSubterms<'a> {
    stack: Vec<&'a Term>,
}

impl<'a> Iterator for NonVariableSubterms<'a> {
    type Item = &'a Term;

    fn next(&mut self) -> Option<&'a Term> {
        while let Some(term) = self.stack.pop() {
            match term {
                Term::Variable(_) => continue,
                Term::Constant(_) => return Some(term),
                Term::Function(_, args) => {
                    self.stack.extend(args.iter().rev());
                    return Some(term);
                }
            }
        }
        None
    }
}

pub struct TermDisplay<'a> {
    term: &'a Term,
    interner: &'a Interner,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term {
            Term::Variable(v) => write!(f, "{}", self.interner.resolve_variable(v.id)),
            Term::Constant(c) => write!(f, "{}", self.interner.resolve_constant(c.id)),
            Term::Function(func, args) => {
                write!(f, "{}(", self.interner.resolve_function(func.id))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg.display(self.interner))?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Interner, Term, Term, Term) {
        let mut interner = Interner::new();
        let x = Term::var(interner.intern_variable("X"));
        let a = Term::constant(interner.intern_constant("a"));
        let f = FunctionSymbol::new(interner.intern_function("f"), 2);
        let fxa = Term::Function(f, vec![x.clone(), a.clone()]);
        (interner, x, a, fxa)
    }

    #[test]
    fn test_non_variable_subterms_preorder() {
        let (_, _x, a, fxa) = setup();
        let subterms: Vec<&Term> = fxa.non_variable_subterms().collect();
        assert_eq!(subterms, vec![&fxa, &a]);
    }

    #[test]
    fn test_replace_and_contains() {
        let (mut interner, x, a, fxa) = setup();
        let b = Term::constant(interner.intern_constant("b"));
        let replaced = fxa.replace(&a, &b);
        assert!(replaced.contains(&b));
        assert!(!replaced.contains(&a));
        assert!(replaced.contains(&x));
        assert_eq!(fxa.symbol_count(), 3);
        assert!(!fxa.is_ground());
        assert_eq!(format!("{}", replaced.display(&interner)), "f(X,b)");
    }
}
