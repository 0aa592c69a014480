//! Literals

use super::interner::{Interner, PredicateId, VariableId};
use super::term::Term;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A predicate symbol with arity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PredicateSymbol {
    pub id: PredicateId,
    pub arity: u8,
}

impl PredicateSymbol {
    pub fn new(id: PredicateId, arity: u8) -> Self {
        PredicateSymbol { id, arity }
    }
}

/// A positive or negative atom
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub predicate: PredicateSymbol,
    pub args: Vec<Term>,
    pub polarity: bool, // true = positive
}

impl Literal {
    pub fn positive(predicate: PredicateSymbol, args: Vec<Term>) -> Self {
        Literal {
            predicate,
            args,
            polarity: true,
        }
    }

    pub fn negative(predicate: PredicateSymbol, args: Vec<Term>) -> Self {
        Literal {
            predicate,
            args,
            polarity: false,
        }
    }

    pub fn complement(&self) -> Literal {
        Literal {
            predicate: self.predicate,
            args: self.args.clone(),
            polarity: !self.polarity,
        }
    }

    /// Same predicate and arguments, polarity ignored.
    pub fn same_atom(&self, other: &Literal) -> bool {
        self.predicate == other.predicate && self.args == other.args
    }

    pub fn is_complementary(&self, other: &Literal) -> bool {
        self.polarity != other.polarity && self.same_atom(other)
    }

    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }

    /// Symbol count including the predicate symbol.
    pub fn weight(&self) -> usize {
        1 + self.args.iter().map(Term::symbol_count).sum::<usize>()
    }

    pub fn collect_variable_ids(&self, vars: &mut HashSet<VariableId>) {
        for arg in &self.args {
            arg.collect_variable_ids(vars);
        }
    }

    pub fn variable_ids(&self) -> HashSet<VariableId> {
        let mut vars = HashSet::new();
        self.collect_variable_ids(&mut vars);
        vars
    }

    /// Replace every occurrence of the term `from` in the arguments by `to`.
    pub fn replace_term(&self, from: &Term, to: &Term) -> Literal {
        Literal {
            predicate: self.predicate,
            args: self.args.iter().map(|a| a.replace(from, to)).collect(),
            polarity: self.polarity,
        }
    }

    /// Non-variable subterms of all arguments, pre-order, left to right.
    pub fn non_variable_subterms(&self) -> impl Iterator<Item = &Term> + '_ {
        self.args.iter().flat_map(Term::non_variable_subterms)
    }

    pub fn display<'a>(&'a self, interner: &'a Interner) -> LiteralDisplay<'a> {
        LiteralDisplay {
            literal: self,
            interner,
        }
    }
}

pub struct LiteralDisplay<'a> {
    literal: &'a Literal,
    interner: &'a Interner,
}

impl fmt::Display for LiteralDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.literal.polarity {
            write!(f, "~")?;
        }
        write!(f, "{}", self.interner.resolve_predicate(self.literal.predicate.id))?;
        if self.literal.args.is_empty() {
            return Ok(());
        }
        write!(f, "(")?;
        for (i, arg) in self.literal.args.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", arg.display(self.interner))?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.polarity {
            write!(f, "~")?;
        }
        write!(f, "{}(", self.predicate.id)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{:?}", arg)?;
        }
        write!(f, ")")
    }
}
