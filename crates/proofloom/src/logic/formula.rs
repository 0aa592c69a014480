//! First-order formulas and formula units

use super::clause::{Inference, InputType};
use super::interner::Interner;
use super::literal::Literal;
use super::term::Variable;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Junction {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryConnective {
    Implies,
    Iff,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    Forall,
    Exists,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formula {
    Literal(Literal),
    True,
    False,
    Not(Box<Formula>),
    Junction(Junction, Vec<Formula>),
    Binary(BinaryConnective, Box<Formula>, Box<Formula>),
    Quantified(Quantifier, Vec<Variable>, Box<Formula>),
    /// if-then-else over formulas
    Ite(Box<Formula>, Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn and(args: Vec<Formula>) -> Formula {
        Formula::Junction(Junction::And, args)
    }

    pub fn or(args: Vec<Formula>) -> Formula {
        Formula::Junction(Junction::Or, args)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(arg: Formula) -> Formula {
        Formula::Not(Box::new(arg))
    }

    pub fn implies(lhs: Formula, rhs: Formula) -> Formula {
        Formula::Binary(BinaryConnective::Implies, Box::new(lhs), Box::new(rhs))
    }

    pub fn iff(lhs: Formula, rhs: Formula) -> Formula {
        Formula::Binary(BinaryConnective::Iff, Box::new(lhs), Box::new(rhs))
    }

    pub fn forall(vars: Vec<Variable>, body: Formula) -> Formula {
        Formula::Quantified(Quantifier::Forall, vars, Box::new(body))
    }

    /// Visit every literal occurrence.
    pub fn for_each_literal<F: FnMut(&Literal)>(&self, f: &mut F) {
        match self {
            Formula::Literal(l) => f(l),
            Formula::True | Formula::False => {}
            Formula::Not(arg) => arg.for_each_literal(f),
            Formula::Junction(_, args) => args.iter().for_each(|a| a.for_each_literal(f)),
            Formula::Binary(_, l, r) => {
                l.for_each_literal(f);
                r.for_each_literal(f);
            }
            Formula::Quantified(_, _, body) => body.for_each_literal(f),
            Formula::Ite(c, t, e) => {
                c.for_each_literal(f);
                t.for_each_literal(f);
                e.for_each_literal(f);
            }
        }
    }

    pub fn display<'a>(&'a self, interner: &'a Interner) -> FormulaDisplay<'a> {
        FormulaDisplay {
            formula: self,
            interner,
        }
    }
}

pub struct FormulaDisplay<'a> {
    formula: &'a Formula,
    interner: &'a Interner,
}

impl fmt::Display for FormulaDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let i = self.interner;
        match self.formula {
            Formula::Literal(l) => write!(f, "{}", l.display(i)),
            Formula::True => write!(f, "$true"),
            Formula::False => write!(f, "$false"),
            Formula::Not(a) => write!(f, "~({})", a.display(i)),
            Formula::Junction(j, args) => {
                let sep = match j {
                    Junction::And => " & ",
                    Junction::Or => " | ",
                };
                write!(f, "(")?;
                for (k, a) in args.iter().enumerate() {
                    if k > 0 {
                        write!(f, "{}", sep)?;
                    }
                    write!(f, "{}", a.display(i))?;
                }
                write!(f, ")")
            }
            Formula::Binary(c, l, r) => {
                let op = match c {
                    BinaryConnective::Implies => "=>",
                    BinaryConnective::Iff => "<=>",
                    BinaryConnective::Xor => "<~>",
                };
                write!(f, "({} {} {})", l.display(i), op, r.display(i))
            }
            Formula::Quantified(q, vars, body) => {
                let q = match q {
                    Quantifier::Forall => "!",
                    Quantifier::Exists => "?",
                };
                write!(f, "{}[", q)?;
                for (k, v) in vars.iter().enumerate() {
                    if k > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", i.resolve_variable(v.id))?;
                }
                write!(f, "]: {}", body.display(i))
            }
            Formula::Ite(c, t, e) => {
                write!(f, "$ite({}, {}, {})", c.display(i), t.display(i), e.display(i))
            }
        }
    }
}

/// A formula in the problem, before clausification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaUnit {
    pub id: usize,
    pub formula: Formula,
    pub input_type: InputType,
    pub inference: Inference,
}
