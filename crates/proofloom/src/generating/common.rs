//! Helpers shared by the generating rules

use crate::logic::{Literal, Substitution};
use std::collections::HashSet;

/// Literals not at `exclude`, with `subst` applied.
pub fn collect_literals_except(literals: &[Literal], exclude: &[usize], subst: &Substitution) -> Vec<Literal> {
    literals
        .iter()
        .enumerate()
        .filter(|(i, _)| !exclude.contains(i))
        .map(|(_, lit)| subst.apply_literal(lit))
        .collect()
}

/// Remove duplicate literals, keeping first occurrences in order.
pub fn remove_duplicate_literals(literals: Vec<Literal>) -> Vec<Literal> {
    let mut seen = HashSet::new();
    literals.into_iter().filter(|lit| seen.insert(lit.clone())).collect()
}
