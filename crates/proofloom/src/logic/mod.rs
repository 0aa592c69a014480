//! Core logic types: symbols, terms, clauses, formulas and orderings

pub mod clause;
pub mod formula;
pub mod interner;
pub mod literal;
pub mod ordering;
pub mod signature;
pub mod substitution;
pub mod term;
pub mod term_algebra;
pub mod transformer;

pub use clause::{Clause, ClauseKey, Inference, InferenceRule, InputType};
pub use formula::{Formula, FormulaUnit};
pub use interner::{ConstantId, FunctionId, Interner, PredicateId, SortId, VariableId};
pub use literal::{Literal, PredicateSymbol};
pub use ordering::{Ordering, KBO};
pub use signature::Signature;
pub use substitution::Substitution;
pub use term::{Constant, FunctionSymbol, Term, Variable};
pub use term_algebra::{ConstructorHead, TermAlgebra, TermAlgebraConstructor};
pub use transformer::{FormulaTransformer, Unit};
