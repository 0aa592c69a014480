//! Signature: symbol names plus sort information.
//!
//! Every strategy context clones the problem signature, so symbols it
//! introduces (skolem constants, split names) stay private to that context.

use super::interner::{ConstantId, FunctionId, Interner, PredicateId, SortId};
use super::literal::PredicateSymbol;
use super::term::{Constant, FunctionSymbol, Term};
use super::term_algebra::TermAlgebra;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Name of the sort given to symbols declared without one.
pub const DEFAULT_SORT: &str = "$i";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorType {
    pub args: Vec<SortId>,
    pub result: SortId,
}

#[derive(Debug, Clone)]
pub struct Signature {
    pub interner: Interner,
    default_sort: SortId,
    constant_sorts: HashMap<ConstantId, SortId>,
    function_types: HashMap<FunctionId, OperatorType>,
    predicate_types: HashMap<PredicateId, Vec<SortId>>,
    term_algebras: IndexMap<SortId, TermAlgebra>,
    split_predicates: HashSet<PredicateId>,
    skolem_constants: HashSet<ConstantId>,
}

impl Default for Signature {
    fn default() -> Self {
        Self::new()
    }
}

impl Signature {
    pub fn new() -> Self {
        let mut interner = Interner::new();
        let default_sort = interner.intern_sort(DEFAULT_SORT);
        Signature {
            interner,
            default_sort,
            constant_sorts: HashMap::new(),
            function_types: HashMap::new(),
            predicate_types: HashMap::new(),
            term_algebras: IndexMap::new(),
            split_predicates: HashSet::new(),
            skolem_constants: HashSet::new(),
        }
    }

    pub fn default_sort(&self) -> SortId {
        self.default_sort
    }

    pub fn sort(&mut self, name: &str) -> SortId {
        self.interner.intern_sort(name)
    }

    pub fn declare_constant(&mut self, name: &str, sort: SortId) -> Constant {
        let id = self.interner.intern_constant(name);
        self.constant_sorts.insert(id, sort);
        Constant::new(id)
    }

    pub fn declare_function(&mut self, name: &str, args: Vec<SortId>, result: SortId) -> FunctionSymbol {
        let id = self.interner.intern_function(name);
        let arity = args.len() as u8;
        self.function_types.insert(id, OperatorType { args, result });
        FunctionSymbol::new(id, arity)
    }

    pub fn declare_predicate(&mut self, name: &str, args: Vec<SortId>) -> PredicateSymbol {
        let id = self.interner.intern_predicate(name);
        let arity = args.len() as u8;
        self.predicate_types.insert(id, args);
        PredicateSymbol::new(id, arity)
    }

    pub fn function_type(&self, f: FunctionId) -> Option<&OperatorType> {
        self.function_types.get(&f)
    }

    pub fn predicate_arg_sorts(&self, p: PredicateId) -> Option<&[SortId]> {
        self.predicate_types.get(&p).map(Vec::as_slice)
    }

    /// Sort of a non-variable term; variables carry no sort of their own.
    pub fn sort_of(&self, term: &Term) -> Option<SortId> {
        match term {
            Term::Variable(_) => None,
            Term::Constant(c) => Some(
                self.constant_sorts
                    .get(&c.id)
                    .copied()
                    .unwrap_or(self.default_sort),
            ),
            Term::Function(f, _) => Some(
                self.function_types
                    .get(&f.id)
                    .map(|t| t.result)
                    .unwrap_or(self.default_sort),
            ),
        }
    }

    // === Term algebras ===

    pub fn add_term_algebra(&mut self, algebra: TermAlgebra) {
        self.term_algebras.insert(algebra.sort, algebra);
    }

    pub fn is_term_algebra_sort(&self, sort: SortId) -> bool {
        self.term_algebras.contains_key(&sort)
    }

    pub fn term_algebra_of_sort(&self, sort: SortId) -> Option<&TermAlgebra> {
        self.term_algebras.get(&sort)
    }

    pub fn term_algebras(&self) -> impl Iterator<Item = &TermAlgebra> {
        self.term_algebras.values()
    }

    /// A value of sort `from` can contain a subterm of sort `to`.
    pub fn subterm_reachable(&self, from: SortId, to: SortId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(sort) = stack.pop() {
            if !seen.insert(sort) {
                continue;
            }
            let Some(algebra) = self.term_algebras.get(&sort) else {
                continue;
            };
            for ctor in &algebra.constructors {
                for arg in &ctor.arg_sorts {
                    if *arg == to {
                        return true;
                    }
                    stack.push(*arg);
                }
            }
        }
        false
    }

    // === Fresh symbols ===

    /// Fresh constant of `sort`, named after `suffix` (a destructor name).
    pub fn add_skolem_constant(&mut self, sort: SortId, suffix: &str) -> Constant {
        let id = self.interner.fresh_constant(&format!("$sk_{}_", suffix));
        self.constant_sorts.insert(id, sort);
        self.skolem_constants.insert(id);
        Constant::new(id)
    }

    pub fn is_skolem(&self, c: ConstantId) -> bool {
        self.skolem_constants.contains(&c)
    }

    /// Fresh propositional symbol naming a split-off clause component.
    pub fn add_split_predicate(&mut self) -> PredicateSymbol {
        let id = self.interner.fresh_predicate("$spl");
        self.predicate_types.insert(id, Vec::new());
        self.split_predicates.insert(id);
        PredicateSymbol::new(id, 0)
    }

    pub fn is_split_predicate(&self, p: PredicateId) -> bool {
        self.split_predicates.contains(&p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::term_algebra::{ConstructorHead, TermAlgebraConstructor};

    #[test]
    fn test_list_of_trees_reaches_trees() {
        let mut sig = Signature::new();
        let tree = sig.sort("tree");
        let list = sig.sort("list");
        let leaf = sig.declare_constant("leaf", tree);
        let nil = sig.declare_constant("nil", list);
        let cons = sig.declare_function("cons", vec![tree, list], list);

        sig.add_term_algebra(TermAlgebra::new(
            tree,
            vec![TermAlgebraConstructor::new(ConstructorHead::Constant(leaf), vec![], tree, vec![])],
        ));
        sig.add_term_algebra(TermAlgebra::new(
            list,
            vec![
                TermAlgebraConstructor::new(ConstructorHead::Constant(nil), vec![], list, vec![]),
                TermAlgebraConstructor::new(
                    ConstructorHead::Function(cons),
                    vec![tree, list],
                    list,
                    vec!["head".into(), "tail".into()],
                ),
            ],
        ));

        assert!(sig.subterm_reachable(list, tree));
        assert!(!sig.subterm_reachable(tree, list));
        assert!(sig.term_algebra_of_sort(list).unwrap().is_recursive());
        assert!(sig.term_algebra_of_sort(tree).unwrap().finite_domain());
    }

    #[test]
    fn test_skolems_are_fresh_and_sorted() {
        let mut sig = Signature::new();
        let tree = sig.sort("tree");
        let s1 = sig.add_skolem_constant(tree, "left");
        let s2 = sig.add_skolem_constant(tree, "left");
        assert_ne!(s1, s2);
        assert_eq!(sig.sort_of(&Term::Constant(s1)), Some(tree));
        assert!(sig.is_skolem(s2.id));
    }
}
