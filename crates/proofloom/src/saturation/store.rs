//! Append-only clause arena.
//!
//! A clause's id is its position here. Inference records only reference
//! earlier ids, which makes the derivation graph acyclic by construction.

use crate::logic::{Clause, InferenceRule};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A single step of an extracted proof.
#[derive(Debug, Clone)]
pub struct ProofStep {
    pub clause_idx: usize,
    pub rule: InferenceRule,
    pub premises: Vec<usize>,
    pub conclusion: Arc<Clause>,
}

#[derive(Debug, Default)]
pub struct ClauseStore {
    clauses: Vec<Arc<Clause>>,
    bytes: usize,
}

impl ClauseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append, stamping the clause with its id.
    ///
    /// A shared input clause already carrying the right id is stored as is;
    /// otherwise it is copied before its id is overwritten.
    pub fn push(&mut self, mut clause: Arc<Clause>) -> usize {
        let idx = self.clauses.len();
        if clause.id != Some(idx) {
            Arc::make_mut(&mut clause).id = Some(idx);
        }
        debug_assert!(
            clause.inference.premises.iter().all(|&p| p < idx),
            "premises must precede their conclusion"
        );
        self.bytes += clause.estimated_bytes();
        self.clauses.push(clause);
        idx
    }

    pub fn get(&self, idx: usize) -> &Arc<Clause> {
        &self.clauses[idx]
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Estimated bytes held by stored clauses
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Clause>> {
        self.clauses.iter()
    }

    /// Ancestors of `idx` (itself included) in ascending id order, so every
    /// premise is listed before the steps that use it.
    pub fn extract_proof(&self, idx: usize) -> Vec<ProofStep> {
        let mut needed = BTreeSet::new();
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if needed.insert(current) {
                stack.extend(self.clauses[current].inference.premises.iter().copied());
            }
        }
        needed
            .into_iter()
            .map(|i| {
                let clause = &self.clauses[i];
                ProofStep {
                    clause_idx: i,
                    rule: clause.inference.rule,
                    premises: clause.inference.premises.clone(),
                    conclusion: Arc::clone(clause),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Inference, InputType};

    #[test]
    fn test_proof_lists_premises_first() {
        let mut store = ClauseStore::new();
        let a = store.push(Arc::new(Clause::new(vec![])));
        let b = store.push(Arc::new(Clause::new(vec![])));
        let _unused = store.push(Arc::new(Clause::new(vec![])));
        let c = store.push(Arc::new(Clause::derived(
            vec![],
            InputType::Axiom,
            1,
            Inference::new(InferenceRule::Resolution, vec![b, a]),
        )));

        let proof = store.extract_proof(c);
        let ids: Vec<usize> = proof.iter().map(|s| s.clause_idx).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert_eq!(proof[2].premises, vec![b, a]);
    }

    #[test]
    fn test_shared_clause_keeps_matching_id() {
        let mut store = ClauseStore::new();
        let mut clause = Clause::new(vec![]);
        clause.id = Some(0);
        let shared = Arc::new(clause);
        store.push(Arc::clone(&shared));
        assert!(Arc::ptr_eq(store.get(0), &shared));
    }
}
