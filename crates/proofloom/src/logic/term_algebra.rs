//! Term algebra sorts: inductive datatypes given by constructors.

use super::interner::{Interner, SortId};
use super::term::{Constant, FunctionSymbol, Term};
use serde::Serialize;

/// Head symbol of a constructor; nullary constructors are constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstructorHead {
    Constant(Constant),
    Function(FunctionSymbol),
}

#[derive(Debug, Clone, Serialize)]
pub struct TermAlgebraConstructor {
    pub head: ConstructorHead,
    pub arg_sorts: Vec<SortId>,
    pub range: SortId,
    /// One destructor name per argument
    pub destructors: Vec<String>,
}

impl TermAlgebraConstructor {
    pub fn new(head: ConstructorHead, arg_sorts: Vec<SortId>, range: SortId, destructors: Vec<String>) -> Self {
        TermAlgebraConstructor {
            head,
            arg_sorts,
            range,
            destructors,
        }
    }

    pub fn arity(&self) -> usize {
        self.arg_sorts.len()
    }

    /// Some argument has the constructor's own sort.
    pub fn recursive(&self) -> bool {
        self.arg_sorts.iter().any(|s| *s == self.range)
    }

    pub fn is_recursive_argument(&self, index: usize) -> bool {
        self.arg_sorts[index] == self.range
    }

    pub fn name<'a>(&self, interner: &'a Interner) -> &'a str {
        match self.head {
            ConstructorHead::Constant(c) => interner.resolve_constant(c.id),
            ConstructorHead::Function(f) => interner.resolve_function(f.id),
        }
    }

    pub fn discriminator_name(&self, interner: &Interner) -> String {
        format!("$is_{}", self.name(interner))
    }

    pub fn destructor_name(&self, index: usize) -> &str {
        &self.destructors[index]
    }

    pub fn matches_head(&self, term: &Term) -> bool {
        match (self.head, term) {
            (ConstructorHead::Constant(c), Term::Constant(t)) => c == *t,
            (ConstructorHead::Function(f), Term::Function(g, _)) => f.id == g.id,
            _ => false,
        }
    }

    /// Build `ctor(args)`.
    pub fn apply(&self, args: Vec<Term>) -> Term {
        match self.head {
            ConstructorHead::Constant(c) => Term::Constant(c),
            ConstructorHead::Function(f) => Term::Function(f, args),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TermAlgebra {
    pub sort: SortId,
    pub constructors: Vec<TermAlgebraConstructor>,
    pub allows_cyclic_terms: bool,
}

impl TermAlgebra {
    pub fn new(sort: SortId, constructors: Vec<TermAlgebraConstructor>) -> Self {
        TermAlgebra {
            sort,
            constructors,
            allows_cyclic_terms: false,
        }
    }

    pub fn empty_domain(&self) -> bool {
        if self.constructors.is_empty() {
            return true;
        }
        if self.allows_cyclic_terms {
            return false;
        }
        self.constructors.iter().all(TermAlgebraConstructor::recursive)
    }

    pub fn finite_domain(&self) -> bool {
        self.constructors.iter().all(|c| c.arity() == 0)
    }

    pub fn infinite_domain(&self) -> bool {
        self.constructors.iter().any(TermAlgebraConstructor::recursive)
    }

    /// Structural induction only makes sense over recursive algebras.
    pub fn is_recursive(&self) -> bool {
        self.infinite_domain()
    }

    pub fn constructor_of(&self, term: &Term) -> Option<&TermAlgebraConstructor> {
        self.constructors.iter().find(|c| c.matches_head(term))
    }

    /// Ground term built from this algebra's constructors alone.
    ///
    /// Arguments of foreign sorts are not inspected.
    pub fn is_constructor_term(&self, term: &Term) -> bool {
        match self.constructor_of(term) {
            None => false,
            Some(ctor) => {
                let args: &[Term] = match term {
                    Term::Function(_, args) => args,
                    _ => &[],
                };
                args.iter().enumerate().all(|(i, arg)| {
                    if ctor.is_recursive_argument(i) {
                        self.is_constructor_term(arg)
                    } else {
                        arg.is_ground()
                    }
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::signature::Signature;

    fn constant(sig: &mut Signature, name: &str, sort: SortId) -> TermAlgebraConstructor {
        let c = sig.declare_constant(name, sort);
        TermAlgebraConstructor::new(ConstructorHead::Constant(c), vec![], sort, vec![])
    }

    fn function(sig: &mut Signature, name: &str, args: Vec<SortId>, sort: SortId) -> TermAlgebraConstructor {
        let f = sig.declare_function(name, args.clone(), sort);
        let destructors = (0..args.len()).map(|i| format!("{}{}", name, i)).collect();
        TermAlgebraConstructor::new(ConstructorHead::Function(f), args, sort, destructors)
    }

    #[test]
    fn test_domain_sizes() {
        let mut sig = Signature::new();
        let nat = sig.sort("nat");
        let zero = constant(&mut sig, "zero", nat);
        let succ = function(&mut sig, "succ", vec![nat], nat);
        let nats = TermAlgebra::new(nat, vec![zero, succ.clone()]);
        assert!(!nats.empty_domain());
        assert!(!nats.finite_domain());
        assert!(nats.infinite_domain());
        assert!(nats.is_recursive());

        let colour = sig.sort("colour");
        let colours = TermAlgebra::new(
            colour,
            vec![constant(&mut sig, "red", colour), constant(&mut sig, "green", colour)],
        );
        assert!(!colours.empty_domain());
        assert!(colours.finite_domain());
        assert!(!colours.infinite_domain());

        // Only a recursive constructor: no finite term to start from
        let mut loops = TermAlgebra::new(nat, vec![succ]);
        assert!(loops.empty_domain());
        assert!(loops.infinite_domain());
        loops.allows_cyclic_terms = true;
        assert!(!loops.empty_domain());

        let void = TermAlgebra::new(sig.sort("void"), vec![]);
        assert!(void.empty_domain());
        assert!(!void.infinite_domain());
    }

    #[test]
    fn test_discriminator_and_destructor_names() {
        let mut sig = Signature::new();
        let nat = sig.sort("nat");
        let list = sig.sort("list");
        let nil = constant(&mut sig, "nil", list);
        let cons = function(&mut sig, "cons", vec![nat, list], list);

        assert_eq!(nil.discriminator_name(&sig.interner), "$is_nil");
        assert_eq!(cons.discriminator_name(&sig.interner), "$is_cons");
        assert_eq!(cons.destructor_name(1), "cons1");
        assert!(cons.recursive());
        assert!(!cons.is_recursive_argument(0));
        assert!(cons.is_recursive_argument(1));
    }

    #[test]
    fn test_constructor_terms_must_be_ground() {
        let mut sig = Signature::new();
        let nat = sig.sort("nat");
        let list = sig.sort("list");
        let zero = sig.declare_constant("zero", nat);
        let succ = sig.declare_function("succ", vec![nat], nat);
        let nil = constant(&mut sig, "nil", list);
        let cons = function(&mut sig, "cons", vec![nat, list], list);
        let lists = TermAlgebra::new(list, vec![nil.clone(), cons.clone()]);
        let x = Term::var(sig.interner.intern_variable("X"));

        let nil_term = nil.apply(vec![]);
        let zero_term = Term::Constant(zero);
        let one = Term::Function(succ, vec![zero_term.clone()]);

        assert!(lists.is_constructor_term(&nil_term));
        // Ground arguments of a foreign sort are accepted as they are
        assert!(lists.is_constructor_term(&cons.apply(vec![one, nil_term.clone()])));
        assert!(lists.is_constructor_term(&cons.apply(vec![
            zero_term.clone(),
            cons.apply(vec![zero_term.clone(), nil_term.clone()]),
        ])));

        assert!(!lists.is_constructor_term(&x));
        assert!(!lists.is_constructor_term(&cons.apply(vec![x.clone(), nil_term])));
        assert!(!lists.is_constructor_term(&cons.apply(vec![zero_term.clone(), x])));
        assert!(!lists.is_constructor_term(&zero_term));
        let pair = cons.apply(vec![zero_term, nil.apply(vec![])]);
        assert_eq!(lists.constructor_of(&pair).map(TermAlgebraConstructor::arity), Some(2));
    }
}
