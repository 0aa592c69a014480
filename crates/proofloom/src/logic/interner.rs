//! Symbol interning
//!
//! Symbol names live in one arena per symbol kind and the rest of the prover
//! works with small `Copy` ids. Each kind has its own id type so a sort can
//! never be confused with a predicate:
//! - `VariableId` for variables
//! - `ConstantId` for constants
//! - `FunctionId` for function symbols
//! - `PredicateId` for predicate symbols
//! - `SortId` for sorts
//!
//! Fresh names (skolem constants, split predicates, renamed variables) are
//! produced by `fresh_*`, which never collide with a name already interned.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

macro_rules! symbol_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Raw id value
            pub fn as_u32(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

symbol_id!(
    /// Interned variable name
    VariableId,
    "V"
);
symbol_id!(
    /// Interned constant name
    ConstantId,
    "C"
);
symbol_id!(
    /// Interned function symbol name
    FunctionId,
    "F"
);
symbol_id!(
    /// Interned predicate symbol name
    PredicateId,
    "P"
);
symbol_id!(
    /// Interned sort name
    SortId,
    "S"
);

#[derive(Debug, Clone, Default)]
struct NameArena {
    names: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl NameArena {
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), id);
        id
    }

    fn resolve(&self, id: u32) -> &str {
        &self.names[id as usize]
    }

    fn get(&self, name: &str) -> Option<u32> {
        self.lookup.get(name).copied()
    }

    fn len(&self) -> usize {
        self.names.len()
    }

    /// Intern `{prefix}{n}` for the smallest counter value not yet taken.
    fn fresh(&mut self, prefix: &str, counter: &mut usize) -> u32 {
        loop {
            let candidate = format!("{}{}", prefix, *counter);
            *counter += 1;
            if !self.lookup.contains_key(&candidate) {
                return self.intern(&candidate);
            }
        }
    }
}

/// Symbol table for one signature.
///
/// Cloned wholesale when a strategy context takes its own copy of the
/// problem signature, so fresh symbols introduced by one context are
/// invisible to every other.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    variables: NameArena,
    constants: NameArena,
    functions: NameArena,
    predicates: NameArena,
    sorts: NameArena,
    fresh_counter: usize,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    // === Variables ===

    pub fn intern_variable(&mut self, name: &str) -> VariableId {
        VariableId(self.variables.intern(name))
    }

    pub fn resolve_variable(&self, id: VariableId) -> &str {
        self.variables.resolve(id.0)
    }

    pub fn get_variable(&self, name: &str) -> Option<VariableId> {
        self.variables.get(name).map(VariableId)
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    // === Constants ===

    pub fn intern_constant(&mut self, name: &str) -> ConstantId {
        ConstantId(self.constants.intern(name))
    }

    pub fn resolve_constant(&self, id: ConstantId) -> &str {
        self.constants.resolve(id.0)
    }

    pub fn get_constant(&self, name: &str) -> Option<ConstantId> {
        self.constants.get(name).map(ConstantId)
    }

    /// Fresh constant named `{prefix}{n}`.
    pub fn fresh_constant(&mut self, prefix: &str) -> ConstantId {
        ConstantId(self.constants.fresh(prefix, &mut self.fresh_counter))
    }

    // === Functions ===

    pub fn intern_function(&mut self, name: &str) -> FunctionId {
        FunctionId(self.functions.intern(name))
    }

    pub fn resolve_function(&self, id: FunctionId) -> &str {
        self.functions.resolve(id.0)
    }

    pub fn get_function(&self, name: &str) -> Option<FunctionId> {
        self.functions.get(name).map(FunctionId)
    }

    // === Predicates ===

    pub fn intern_predicate(&mut self, name: &str) -> PredicateId {
        PredicateId(self.predicates.intern(name))
    }

    pub fn resolve_predicate(&self, id: PredicateId) -> &str {
        self.predicates.resolve(id.0)
    }

    pub fn get_predicate(&self, name: &str) -> Option<PredicateId> {
        self.predicates.get(name).map(PredicateId)
    }

    /// Fresh predicate named `{prefix}{n}`.
    pub fn fresh_predicate(&mut self, prefix: &str) -> PredicateId {
        PredicateId(self.predicates.fresh(prefix, &mut self.fresh_counter))
    }

    // === Sorts ===

    pub fn intern_sort(&mut self, name: &str) -> SortId {
        SortId(self.sorts.intern(name))
    }

    pub fn resolve_sort(&self, id: SortId) -> &str {
        self.sorts.resolve(id.0)
    }

    pub fn get_sort(&self, name: &str) -> Option<SortId> {
        self.sorts.get(name).map(SortId)
    }

    /// Total number of interned symbols across all kinds
    pub fn total_symbols(&self) -> usize {
        self.variables.len()
            + self.constants.len()
            + self.functions.len()
            + self.predicates.len()
            + self.sorts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_is_idempotent_per_kind() {
        let mut interner = Interner::new();
        let x1 = interner.intern_variable("X");
        let x2 = interner.intern_variable("X");
        let y = interner.intern_variable("Y");
        assert_eq!(x1, x2);
        assert_ne!(x1, y);

        // Same name in different kinds gets independent ids
        let c = interner.intern_constant("X");
        assert_eq!(c.as_u32(), 0);
        assert_eq!(interner.resolve_variable(y), "Y");
    }

    #[test]
    fn test_fresh_names_skip_taken_ones() {
        let mut interner = Interner::new();
        interner.intern_constant("sK0");
        let fresh = interner.fresh_constant("sK");
        assert_eq!(interner.resolve_constant(fresh), "sK1");
        let next = interner.fresh_constant("sK");
        assert_eq!(interner.resolve_constant(next), "sK2");
    }

    #[test]
    fn test_clone_isolates_fresh_symbols() {
        let mut base = Interner::new();
        base.intern_predicate("p");
        let mut copy = base.clone();
        copy.fresh_predicate("$spl");
        assert!(base.get_predicate("$spl0").is_none());
        assert!(copy.get_predicate("$spl0").is_some());
    }
}
