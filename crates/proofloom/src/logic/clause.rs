//! Clauses and their derivation records

use super::interner::{Interner, VariableId};
use super::literal::Literal;
use super::term::Term;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Where a clause's content comes from.
///
/// Ordered: a derived clause inherits the maximum over its premises, so
/// anything touched by the negated conjecture stays marked as such.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    #[default]
    Axiom,
    Hypothesis,
    Definition,
    NegatedConjecture,
}

impl InputType {
    /// Map a TPTP-style role name.
    pub fn from_role(role: &str) -> Self {
        match role {
            "hypothesis" | "assumption" => InputType::Hypothesis,
            "definition" => InputType::Definition,
            "negated_conjecture" | "conjecture" => InputType::NegatedConjecture,
            _ => InputType::Axiom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceRule {
    Input,
    Preprocessing,
    Resolution,
    Factoring,
    ForwardLiteralRewriting,
    StructuralInduction,
    Splitting,
    SplittingComponent,
}

impl InferenceRule {
    pub fn name(&self) -> &'static str {
        match self {
            InferenceRule::Input => "input",
            InferenceRule::Preprocessing => "preprocessing",
            InferenceRule::Resolution => "resolution",
            InferenceRule::Factoring => "factoring",
            InferenceRule::ForwardLiteralRewriting => "forward literal rewriting",
            InferenceRule::StructuralInduction => "structural induction",
            InferenceRule::Splitting => "splitting",
            InferenceRule::SplittingComponent => "splitting component",
        }
    }
}

/// Rule plus premise ids. Premises always precede the conclusion in the
/// clause store, so the derivation graph cannot contain a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inference {
    pub rule: InferenceRule,
    pub premises: Vec<usize>,
}

impl Inference {
    pub fn input() -> Self {
        Inference {
            rule: InferenceRule::Input,
            premises: Vec::new(),
        }
    }

    pub fn new(rule: InferenceRule, premises: Vec<usize>) -> Self {
        Inference { rule, premises }
    }
}

/// A disjunction of literals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub literals: Vec<Literal>,
    /// Position in the owning clause store, assigned on insertion
    pub id: Option<usize>,
    pub input_type: InputType,
    /// Generation counter; 0 for input clauses
    pub age: usize,
    pub inference: Inference,
}

impl Clause {
    pub fn new(literals: Vec<Literal>) -> Self {
        Clause {
            literals,
            id: None,
            input_type: InputType::default(),
            age: 0,
            inference: Inference::input(),
        }
    }

    pub fn with_input_type(literals: Vec<Literal>, input_type: InputType) -> Self {
        Clause {
            input_type,
            ..Clause::new(literals)
        }
    }

    pub fn derived(
        literals: Vec<Literal>,
        input_type: InputType,
        age: usize,
        inference: Inference,
    ) -> Self {
        Clause {
            literals,
            id: None,
            input_type,
            age,
            inference,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_ground(&self) -> bool {
        self.literals.iter().all(Literal::is_ground)
    }

    /// Total symbol count, the measure used by weight-based selection.
    pub fn weight(&self) -> usize {
        self.literals.iter().map(Literal::weight).sum()
    }

    pub fn variable_ids(&self) -> HashSet<VariableId> {
        let mut vars = HashSet::new();
        for lit in &self.literals {
            lit.collect_variable_ids(&mut vars);
        }
        vars
    }

    /// Approximate heap footprint, used for memory-limit accounting.
    pub fn estimated_bytes(&self) -> usize {
        std::mem::size_of::<Clause>()
            + self.inference.premises.len() * std::mem::size_of::<usize>()
            + self
                .literals
                .iter()
                .map(|l| {
                    std::mem::size_of::<Literal>()
                        + l.args.iter().map(Term::symbol_count).sum::<usize>()
                            * std::mem::size_of::<Term>()
                })
                .sum::<usize>()
    }

    pub fn display<'a>(&'a self, interner: &'a Interner) -> ClauseDisplay<'a> {
        ClauseDisplay {
            clause: self,
            interner,
        }
    }
}

pub struct ClauseDisplay<'a> {
    clause: &'a Clause,
    interner: &'a Interner,
}

impl fmt::Display for ClauseDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clause.is_empty() {
            return write!(f, "$false");
        }
        for (i, lit) in self.clause.literals.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", lit.display(self.interner))?;
        }
        Ok(())
    }
}

// =============================================================================
// ClauseKey - variant detection
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum TermKey {
    Variable(u32),
    Constant(u32),
    Function(u32, Vec<TermKey>),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct LiteralKey {
    polarity: bool,
    predicate: u32,
    args: Vec<TermKey>,
}

impl TermKey {
    /// Variables are numbered through `names`; `None` erases them.
    fn build(term: &Term, names: Option<&mut HashMap<VariableId, u32>>) -> TermKey {
        fn go(term: &Term, names: &mut Option<&mut HashMap<VariableId, u32>>) -> TermKey {
            match term {
                Term::Variable(v) => match names {
                    Some(map) => {
                        let next = map.len() as u32;
                        TermKey::Variable(*map.entry(v.id).or_insert(next))
                    }
                    None => TermKey::Variable(0),
                },
                Term::Constant(c) => TermKey::Constant(c.id.as_u32()),
                Term::Function(f, args) => {
                    TermKey::Function(f.id.as_u32(), args.iter().map(|a| go(a, names)).collect())
                }
            }
        }
        let mut names = names;
        go(term, &mut names)
    }
}

impl LiteralKey {
    fn build(lit: &Literal, mut names: Option<&mut HashMap<VariableId, u32>>) -> LiteralKey {
        LiteralKey {
            polarity: lit.polarity,
            predicate: lit.predicate.id.as_u32(),
            args: lit
                .args
                .iter()
                .map(|a| TermKey::build(a, names.as_deref_mut()))
                .collect(),
        }
    }
}

/// Structural key identifying a clause up to literal order and variable
/// renaming.
///
/// Literals are ordered by their shape with variables erased, then variables
/// are numbered by first occurrence in that order. Equal keys therefore
/// always denote variant clauses; a few variants with identically shaped
/// literals may still get distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClauseKey {
    literals: Vec<LiteralKey>,
}

impl ClauseKey {
    pub fn from_literals(literals: &[Literal]) -> Self {
        let mut order: Vec<(LiteralKey, &Literal)> = literals
            .iter()
            .map(|l| (LiteralKey::build(l, None), l))
            .collect();
        order.sort_by(|a, b| a.0.cmp(&b.0));
        let mut names = HashMap::new();
        let literals = order
            .into_iter()
            .map(|(_, l)| LiteralKey::build(l, Some(&mut names)))
            .collect();
        ClauseKey { literals }
    }

    pub fn from_clause(clause: &Clause) -> Self {
        Self::from_literals(&clause.literals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::literal::PredicateSymbol;

    #[test]
    fn test_input_type_is_inherited_by_maximum() {
        assert!(InputType::NegatedConjecture > InputType::Axiom);
        assert_eq!(
            InputType::Axiom.max(InputType::NegatedConjecture),
            InputType::NegatedConjecture
        );
        assert_eq!(InputType::from_role("conjecture"), InputType::NegatedConjecture);
    }

    #[test]
    fn test_clause_key_identifies_variants() {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 1);
        let q = PredicateSymbol::new(interner.intern_predicate("q"), 1);
        let x = Term::var(interner.intern_variable("X"));
        let y = Term::var(interner.intern_variable("Y"));

        let c1 = Clause::new(vec![
            Literal::positive(p, vec![x.clone()]),
            Literal::negative(q, vec![x.clone()]),
        ]);
        let c2 = Clause::new(vec![
            Literal::negative(q, vec![y.clone()]),
            Literal::positive(p, vec![y.clone()]),
        ]);
        let c3 = Clause::new(vec![
            Literal::negative(q, vec![y.clone()]),
            Literal::positive(p, vec![x.clone()]),
        ]);

        assert_eq!(ClauseKey::from_clause(&c1), ClauseKey::from_clause(&c2));
        assert_ne!(ClauseKey::from_clause(&c1), ClauseKey::from_clause(&c3));
    }
}
