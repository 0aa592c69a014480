//! Shared clause indexes.
//!
//! Inference engines request the indexes they need when attached and
//! release them when detached. The manager creates an index on first
//! request, drops it when the last user releases it, and routes clause
//! lifecycle events to every live index:
//! - `on_passive`: clause survived forward simplification and entered Passive
//! - `on_activate`: clause selected as given clause and moved to Active
//! - `on_remove`: clause left Passive or Active (purged or deactivated)
//!
//! ## Index Types
//!
//! - `GeneratingLiterals`: selected literals of active clauses by predicate and polarity
//! - `Variants`: keys of retained clauses, for variant deletion
//! - `RewriteRules`: counterpart clause pairs usable as literal rewrite rules

pub mod rewrite_rules;

use crate::logic::{Clause, ClauseKey, PredicateId, KBO};
use indexmap::IndexSet;
use std::any::Any;
use std::collections::HashMap;

pub use rewrite_rules::{RewriteMatch, RewriteRuleIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    GeneratingLiterals,
    Variants,
    RewriteRules,
}

pub trait Index: Send + Sync {
    fn kind(&self) -> IndexKind;

    fn on_passive(&mut self, _idx: usize, _clause: &Clause) {}

    fn on_activate(&mut self, _idx: usize, _clause: &Clause, _selected: &[usize]) {}

    fn on_remove(&mut self, idx: usize, clause: &Clause);

    fn as_any(&self) -> &dyn Any;
}

// =============================================================================
// GeneratingLiteralIndex
// =============================================================================

/// Selected literals of active clauses, keyed by predicate and polarity.
#[derive(Debug, Default)]
pub struct GeneratingLiteralIndex {
    entries: HashMap<(PredicateId, bool), IndexSet<(usize, usize)>>,
    by_clause: HashMap<usize, Vec<(PredicateId, bool, usize)>>,
}

impl GeneratingLiteralIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// (clause, literal position) pairs with the given predicate and polarity
    pub fn candidates(&self, predicate: PredicateId, polarity: bool) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries
            .get(&(predicate, polarity))
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(IndexSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Index for GeneratingLiteralIndex {
    fn kind(&self) -> IndexKind {
        IndexKind::GeneratingLiterals
    }

    fn on_activate(&mut self, idx: usize, clause: &Clause, selected: &[usize]) {
        let mut keys = Vec::with_capacity(selected.len());
        for &i in selected {
            let lit = &clause.literals[i];
            self.entries
                .entry((lit.predicate.id, lit.polarity))
                .or_default()
                .insert((idx, i));
            keys.push((lit.predicate.id, lit.polarity, i));
        }
        self.by_clause.insert(idx, keys);
    }

    fn on_remove(&mut self, idx: usize, _clause: &Clause) {
        if let Some(keys) = self.by_clause.remove(&idx) {
            for (p, pol, i) in keys {
                if let Some(set) = self.entries.get_mut(&(p, pol)) {
                    set.shift_remove(&(idx, i));
                }
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// VariantIndex
// =============================================================================

/// Clauses retained in Passive or Active, by variant key.
#[derive(Debug, Default)]
pub struct VariantIndex {
    keys: HashMap<ClauseKey, usize>,
}

impl VariantIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// A retained clause that is a variant of `clause`, if any.
    pub fn find_variant(&self, clause: &Clause) -> Option<usize> {
        self.keys.get(&ClauseKey::from_clause(clause)).copied()
    }
}

impl Index for VariantIndex {
    fn kind(&self) -> IndexKind {
        IndexKind::Variants
    }

    fn on_passive(&mut self, idx: usize, clause: &Clause) {
        self.keys.entry(ClauseKey::from_clause(clause)).or_insert(idx);
    }

    fn on_remove(&mut self, idx: usize, clause: &Clause) {
        let key = ClauseKey::from_clause(clause);
        if self.keys.get(&key) == Some(&idx) {
            self.keys.remove(&key);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// IndexManager
// =============================================================================

/// Owns live indexes and their request counts.
pub struct IndexManager {
    ordering: KBO,
    indices: HashMap<IndexKind, (Box<dyn Index>, usize)>,
}

impl IndexManager {
    pub fn new(ordering: KBO) -> Self {
        IndexManager {
            ordering,
            indices: HashMap::new(),
        }
    }

    /// Create the index if needed and count one more user.
    pub fn request(&mut self, kind: IndexKind) {
        let ordering = &self.ordering;
        let entry = self.indices.entry(kind).or_insert_with(|| {
            let index: Box<dyn Index> = match kind {
                IndexKind::GeneratingLiterals => Box::new(GeneratingLiteralIndex::new()),
                IndexKind::Variants => Box::new(VariantIndex::new()),
                IndexKind::RewriteRules => Box::new(RewriteRuleIndex::new(ordering.clone())),
            };
            (index, 0)
        });
        entry.1 += 1;
    }

    /// Count one user less; the index is dropped with its last user.
    pub fn release(&mut self, kind: IndexKind) {
        let drop_it = match self.indices.get_mut(&kind) {
            Some((_, users)) => {
                *users -= 1;
                *users == 0
            }
            None => false,
        };
        if drop_it {
            self.indices.remove(&kind);
        }
    }

    pub fn has(&self, kind: IndexKind) -> bool {
        self.indices.contains_key(&kind)
    }

    pub fn on_passive(&mut self, idx: usize, clause: &Clause) {
        for (index, _) in self.indices.values_mut() {
            index.on_passive(idx, clause);
        }
    }

    pub fn on_activate(&mut self, idx: usize, clause: &Clause, selected: &[usize]) {
        for (index, _) in self.indices.values_mut() {
            index.on_activate(idx, clause, selected);
        }
    }

    pub fn on_remove(&mut self, idx: usize, clause: &Clause) {
        for (index, _) in self.indices.values_mut() {
            index.on_remove(idx, clause);
        }
    }

    fn get<T: 'static>(&self, kind: IndexKind) -> Option<&T> {
        self.indices
            .get(&kind)
            .and_then(|(index, _)| index.as_any().downcast_ref())
    }

    pub fn generating_literals(&self) -> Option<&GeneratingLiteralIndex> {
        self.get(IndexKind::GeneratingLiterals)
    }

    pub fn variants(&self) -> Option<&VariantIndex> {
        self.get(IndexKind::Variants)
    }

    pub fn rewrite_rules(&self) -> Option<&RewriteRuleIndex> {
        self.get(IndexKind::RewriteRules)
    }
}

impl std::fmt::Debug for IndexManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexManager")
            .field("indices", &self.indices.keys().collect::<Vec<_>>())
            .finish()
    }
}
