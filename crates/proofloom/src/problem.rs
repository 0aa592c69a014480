//! Problems: a signature together with the input units.
//!
//! Problems are read from JSON. Symbols used without a declaration are
//! declared on first use over the default sort, with the arity they are
//! used with.

use crate::error::{ProverError, Result};
use crate::logic::signature::DEFAULT_SORT;
use crate::logic::{
    Clause, ConstructorHead, Formula, FormulaUnit, FunctionSymbol, Inference, InputType, Literal, PredicateSymbol,
    Signature, SortId, Term, TermAlgebra, TermAlgebraConstructor, Unit, Variable,
};
use crate::logic::formula::{BinaryConnective, Junction, Quantifier};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

// =============================================================================
// JSON input
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TermJson {
    Variable { name: String },
    Constant { name: String },
    Function { name: String, args: Vec<TermJson> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomJson {
    pub predicate: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TermJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteralJson {
    pub polarity: bool,
    pub atom: AtomJson,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FormulaJson {
    True,
    False,
    Atom { atom: AtomJson },
    Not { arg: Box<FormulaJson> },
    And { args: Vec<FormulaJson> },
    Or { args: Vec<FormulaJson> },
    Implies { lhs: Box<FormulaJson>, rhs: Box<FormulaJson> },
    Iff { lhs: Box<FormulaJson>, rhs: Box<FormulaJson> },
    Xor { lhs: Box<FormulaJson>, rhs: Box<FormulaJson> },
    Forall { vars: Vec<String>, body: Box<FormulaJson> },
    Exists { vars: Vec<String>, body: Box<FormulaJson> },
    Ite { cond: Box<FormulaJson>, then: Box<FormulaJson>, other: Box<FormulaJson> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClauseJson {
    #[serde(default)]
    pub role: Option<String>,
    pub literals: Vec<LiteralJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaUnitJson {
    #[serde(default)]
    pub role: Option<String>,
    pub formula: FormulaJson,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstantDecl {
    pub name: String,
    #[serde(default)]
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub args: Vec<String>,
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredicateDecl {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructorArgDecl {
    pub destructor: String,
    pub sort: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructorDecl {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ConstructorArgDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermAlgebraDecl {
    pub sort: String,
    pub constructors: Vec<ConstructorDecl>,
}

/// Top level of a problem file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemJson {
    pub sorts: Vec<String>,
    pub constants: Vec<ConstantDecl>,
    pub functions: Vec<FunctionDecl>,
    pub predicates: Vec<PredicateDecl>,
    pub term_algebras: Vec<TermAlgebraDecl>,
    pub clauses: Vec<ClauseJson>,
    pub formulas: Vec<FormulaUnitJson>,
}

// =============================================================================
// Problem
// =============================================================================

#[derive(Debug, Clone)]
pub struct Problem {
    pub signature: Signature,
    pub units: Vec<Unit>,
    next_unit_id: usize,
}

/// Facts about a problem that strategies may consult.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Property {
    pub clauses: usize,
    pub formulas: usize,
    pub unit_clauses: usize,
    pub ground_clauses: usize,
    pub max_clause_size: usize,
    pub term_algebras: usize,
    pub recursive_term_algebras: usize,
    pub has_conjecture: bool,
}

impl Problem {
    pub fn new(signature: Signature) -> Self {
        Problem {
            signature,
            units: Vec::new(),
            next_unit_id: 0,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: ProblemJson = serde_json::from_str(text)?;
        Self::from_problem_json(&file)
    }

    pub fn from_problem_json(file: &ProblemJson) -> Result<Self> {
        let mut problem = Problem::new(Signature::new());
        let mut loader = Loader {
            signature: &mut problem.signature,
        };
        loader.declarations(file)?;

        let mut clauses = Vec::with_capacity(file.clauses.len());
        for clause in &file.clauses {
            let literals = clause
                .literals
                .iter()
                .map(|l| loader.literal(l))
                .collect::<Result<Vec<_>>>()?;
            clauses.push((literals, input_type(clause.role.as_deref())));
        }
        let mut formulas = Vec::with_capacity(file.formulas.len());
        for unit in &file.formulas {
            formulas.push((loader.formula(&unit.formula)?, input_type(unit.role.as_deref())));
        }

        for (literals, input_type) in clauses {
            problem.add_clause(literals, input_type);
        }
        for (formula, input_type) in formulas {
            problem.add_formula(formula, input_type);
        }
        Ok(problem)
    }

    pub fn add_clause(&mut self, literals: Vec<Literal>, input_type: InputType) {
        self.units
            .push(Unit::Clause(Arc::new(Clause::with_input_type(literals, input_type))));
    }

    /// Add a formula unit, returning its id.
    pub fn add_formula(&mut self, formula: Formula, input_type: InputType) -> usize {
        let id = self.fresh_unit_id();
        self.units.push(Unit::Formula(FormulaUnit {
            id,
            formula,
            input_type,
            inference: Inference::input(),
        }));
        id
    }

    pub fn fresh_unit_id(&mut self) -> usize {
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        id
    }

    pub fn next_unit_id(&self) -> usize {
        self.next_unit_id
    }

    pub fn set_next_unit_id(&mut self, id: usize) {
        self.next_unit_id = self.next_unit_id.max(id);
    }

    /// The clause units, in order.
    pub fn clauses(&self) -> Vec<Arc<Clause>> {
        self.units
            .iter()
            .filter_map(|u| match u {
                Unit::Clause(c) => Some(Arc::clone(c)),
                Unit::Formula(_) => None,
            })
            .collect()
    }

    pub fn property(&self) -> Property {
        let mut property = Property {
            term_algebras: self.signature.term_algebras().count(),
            recursive_term_algebras: self.signature.term_algebras().filter(|ta| ta.is_recursive()).count(),
            ..Property::default()
        };
        for unit in &self.units {
            match unit {
                Unit::Clause(c) => {
                    property.clauses += 1;
                    property.unit_clauses += usize::from(c.len() == 1);
                    property.ground_clauses += usize::from(c.is_ground());
                    property.max_clause_size = property.max_clause_size.max(c.len());
                    property.has_conjecture |= c.input_type == InputType::NegatedConjecture;
                }
                Unit::Formula(f) => {
                    property.formulas += 1;
                    property.has_conjecture |= f.input_type == InputType::NegatedConjecture;
                }
            }
        }
        property
    }
}

fn input_type(role: Option<&str>) -> InputType {
    role.map(InputType::from_role).unwrap_or_default()
}

/// Builds terms and declarations into a signature.
struct Loader<'a> {
    signature: &'a mut Signature,
}

impl Loader<'_> {
    fn sort(&mut self, name: &str) -> SortId {
        if name == DEFAULT_SORT {
            return self.signature.default_sort();
        }
        self.signature.sort(name)
    }

    fn sorts(&mut self, names: &[String]) -> Vec<SortId> {
        names.iter().map(|n| self.sort(n)).collect()
    }

    fn declarations(&mut self, file: &ProblemJson) -> Result<()> {
        for sort in &file.sorts {
            self.sort(sort);
        }
        for c in &file.constants {
            let sort = match &c.sort {
                Some(s) => self.sort(s),
                None => self.signature.default_sort(),
            };
            self.signature.declare_constant(&c.name, sort);
        }
        for f in &file.functions {
            let args = self.sorts(&f.args);
            let result = self.sort(&f.result);
            self.signature.declare_function(&f.name, args, result);
        }
        for p in &file.predicates {
            let args = self.sorts(&p.args);
            self.signature.declare_predicate(&p.name, args);
        }
        for ta in &file.term_algebras {
            let algebra = self.term_algebra(ta)?;
            self.signature.add_term_algebra(algebra);
        }
        Ok(())
    }

    fn term_algebra(&mut self, decl: &TermAlgebraDecl) -> Result<TermAlgebra> {
        let sort = self.sort(&decl.sort);
        if decl.constructors.is_empty() {
            return Err(ProverError::InvalidProblem(format!(
                "term algebra {} has no constructors",
                decl.sort
            )));
        }
        let mut constructors = Vec::with_capacity(decl.constructors.len());
        for ctor in &decl.constructors {
            let arg_sorts: Vec<SortId> = ctor.args.iter().map(|a| self.sort(&a.sort)).collect();
            let destructors = ctor.args.iter().map(|a| a.destructor.clone()).collect();
            let head = if arg_sorts.is_empty() {
                ConstructorHead::Constant(self.signature.declare_constant(&ctor.name, sort))
            } else {
                ConstructorHead::Function(self.signature.declare_function(&ctor.name, arg_sorts.clone(), sort))
            };
            constructors.push(TermAlgebraConstructor::new(head, arg_sorts, sort, destructors));
        }
        Ok(TermAlgebra::new(sort, constructors))
    }

    fn term(&mut self, term: &TermJson) -> Result<Term> {
        Ok(match term {
            TermJson::Variable { name } => Term::var(self.signature.interner.intern_variable(name)),
            TermJson::Constant { name } => self.constant(name),
            TermJson::Function { name, args } if args.is_empty() => self.constant(name),
            TermJson::Function { name, args } => {
                let args = args.iter().map(|a| self.term(a)).collect::<Result<Vec<_>>>()?;
                Term::Function(self.function(name, args.len())?, args)
            }
        })
    }

    fn constant(&mut self, name: &str) -> Term {
        match self.signature.interner.get_constant(name) {
            Some(id) => Term::constant(id),
            None => {
                let sort = self.signature.default_sort();
                Term::Constant(self.signature.declare_constant(name, sort))
            }
        }
    }

    fn function(&mut self, name: &str, arity: usize) -> Result<FunctionSymbol> {
        if let Some(id) = self.signature.interner.get_function(name) {
            let declared = self.signature.function_type(id).map_or(arity, |t| t.args.len());
            if declared != arity {
                return Err(arity_mismatch("function", name, declared, arity));
            }
            return Ok(FunctionSymbol::new(id, arity as u8));
        }
        let sort = self.signature.default_sort();
        Ok(self.signature.declare_function(name, vec![sort; arity], sort))
    }

    fn predicate(&mut self, name: &str, arity: usize) -> Result<PredicateSymbol> {
        if let Some(id) = self.signature.interner.get_predicate(name) {
            let declared = self.signature.predicate_arg_sorts(id).map_or(arity, <[SortId]>::len);
            if declared != arity {
                return Err(arity_mismatch("predicate", name, declared, arity));
            }
            return Ok(PredicateSymbol::new(id, arity as u8));
        }
        let sort = self.signature.default_sort();
        Ok(self.signature.declare_predicate(name, vec![sort; arity]))
    }

    fn atom(&mut self, atom: &AtomJson, polarity: bool) -> Result<Literal> {
        let args = atom.args.iter().map(|a| self.term(a)).collect::<Result<Vec<_>>>()?;
        let predicate = self.predicate(&atom.predicate, args.len())?;
        Ok(Literal {
            predicate,
            args,
            polarity,
        })
    }

    fn literal(&mut self, lit: &LiteralJson) -> Result<Literal> {
        self.atom(&lit.atom, lit.polarity)
    }

    fn formula(&mut self, f: &FormulaJson) -> Result<Formula> {
        let boxed = |this: &mut Self, f: &FormulaJson| this.formula(f).map(Box::new);
        Ok(match f {
            FormulaJson::True => Formula::True,
            FormulaJson::False => Formula::False,
            FormulaJson::Atom { atom } => Formula::Literal(self.atom(atom, true)?),
            FormulaJson::Not { arg } => Formula::Not(boxed(self, arg)?),
            FormulaJson::And { args } => Formula::Junction(Junction::And, self.formulas(args)?),
            FormulaJson::Or { args } => Formula::Junction(Junction::Or, self.formulas(args)?),
            FormulaJson::Implies { lhs, rhs } => {
                Formula::Binary(BinaryConnective::Implies, boxed(self, lhs)?, boxed(self, rhs)?)
            }
            FormulaJson::Iff { lhs, rhs } => Formula::Binary(BinaryConnective::Iff, boxed(self, lhs)?, boxed(self, rhs)?),
            FormulaJson::Xor { lhs, rhs } => Formula::Binary(BinaryConnective::Xor, boxed(self, lhs)?, boxed(self, rhs)?),
            FormulaJson::Forall { vars, body } => {
                Formula::Quantified(Quantifier::Forall, self.variables(vars), boxed(self, body)?)
            }
            FormulaJson::Exists { vars, body } => {
                Formula::Quantified(Quantifier::Exists, self.variables(vars), boxed(self, body)?)
            }
            FormulaJson::Ite { cond, then, other } => {
                Formula::Ite(boxed(self, cond)?, boxed(self, then)?, boxed(self, other)?)
            }
        })
    }

    fn formulas(&mut self, fs: &[FormulaJson]) -> Result<Vec<Formula>> {
        fs.iter().map(|f| self.formula(f)).collect()
    }

    fn variables(&mut self, names: &[String]) -> Vec<Variable> {
        names
            .iter()
            .map(|n| Variable::new(self.signature.interner.intern_variable(n)))
            .collect()
    }
}

fn arity_mismatch(kind: &str, name: &str, declared: usize, used: usize) -> ProverError {
    ProverError::InvalidProblem(format!(
        "{} {} declared with arity {} but used with {}",
        kind, name, declared, used
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREES: &str = r#"{
        "sorts": ["tree"],
        "predicates": [{"name": "p", "args": ["tree"]}],
        "term_algebras": [{
            "sort": "tree",
            "constructors": [
                {"name": "leaf"},
                {"name": "node", "args": [
                    {"destructor": "left", "sort": "tree"},
                    {"destructor": "right", "sort": "tree"}
                ]}
            ]
        }],
        "constants": [{"name": "c", "sort": "tree"}],
        "clauses": [
            {"role": "negated_conjecture", "literals": [
                {"polarity": false, "atom": {"predicate": "p", "args": [{"type": "constant", "name": "c"}]}}
            ]},
            {"literals": [
                {"polarity": true, "atom": {"predicate": "p", "args": [{"type": "variable", "name": "X"}]}},
                {"polarity": true, "atom": {"predicate": "q"}}
            ]}
        ],
        "formulas": [
            {"formula": {"op": "forall", "vars": ["Y"], "body": {"op": "atom", "atom": {"predicate": "q"}}}}
        ]
    }"#;

    #[test]
    fn test_load_term_algebra_problem() {
        let problem = Problem::from_json(TREES).unwrap();
        let tree = problem.signature.interner.get_sort("tree").unwrap();
        let algebra = problem.signature.term_algebra_of_sort(tree).unwrap();
        assert_eq!(algebra.constructors.len(), 2);
        assert!(algebra.is_recursive());
        assert_eq!(algebra.constructors[1].destructor_name(0), "left");

        let clauses = problem.clauses();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].input_type, InputType::NegatedConjecture);
        // c was declared over tree
        let c = &clauses[0].literals[0].args[0];
        assert_eq!(problem.signature.sort_of(c), Some(tree));
        assert_eq!(problem.next_unit_id(), 1);
    }

    #[test]
    fn test_property() {
        let problem = Problem::from_json(TREES).unwrap();
        assert_eq!(
            problem.property(),
            Property {
                clauses: 2,
                formulas: 1,
                unit_clauses: 1,
                ground_clauses: 1,
                max_clause_size: 2,
                term_algebras: 1,
                recursive_term_algebras: 1,
                has_conjecture: true,
            }
        );
    }

    #[test]
    fn test_arity_mismatch_is_rejected() {
        let text = r#"{"clauses": [
            {"literals": [{"polarity": true, "atom": {"predicate": "p", "args": [{"type": "constant", "name": "a"}]}}]},
            {"literals": [{"polarity": true, "atom": {"predicate": "p"}}]}
        ]}"#;
        assert!(matches!(Problem::from_json(text), Err(ProverError::InvalidProblem(_))));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(Problem::from_json("{\"clauses\": 3}"), Err(ProverError::Json(_))));
    }
}
