//! Index of literal rewrite rules.
//!
//! Two active two-literal clauses {L, o} and {¬L, ¬o} state L ⇔ ¬o. When
//! L is strictly greater than o, any instance Lσ (of either polarity) in
//! another clause can be replaced by the smaller literal. The index keeps
//! the positive greater literal L as the lookup key, remembering which
//! clause holds L positively (`clause`) and which holds ¬L (`counterpart`).
//!
//! A two-literal clause whose counterpart is not active yet waits in
//! `pending` until it arrives.

use super::{Index, IndexKind};
use crate::logic::substitution::match_atom;
use crate::logic::{Clause, ClauseKey, Literal, Ordering, PredicateId, Substitution, KBO};
use std::any::Any;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct RewriteRule {
    /// Positive, greater literal L
    pub lhs: Literal,
    /// The other literal o of `clause`, in the same variable naming
    pub other: Literal,
    /// Clause {L, o}
    pub clause: usize,
    /// Clause {¬L, ¬o}
    pub counterpart: usize,
}

/// A rule whose lhs generalizes a queried literal.
#[derive(Debug)]
pub struct RewriteMatch<'a> {
    pub rule: &'a RewriteRule,
    pub substitution: Substitution,
}

#[derive(Debug)]
pub struct RewriteRuleIndex {
    ordering: KBO,
    rules: HashMap<PredicateId, Vec<RewriteRule>>,
    pending: HashMap<ClauseKey, usize>,
    pending_keys: HashMap<usize, ClauseKey>,
}

impl RewriteRuleIndex {
    pub fn new(ordering: KBO) -> Self {
        RewriteRuleIndex {
            ordering,
            rules: HashMap::new(),
            pending: HashMap::new(),
            pending_keys: HashMap::new(),
        }
    }

    /// Rules whose lhs atom matches `lit`'s atom, produced lazily.
    pub fn generalizations<'a>(&'a self, lit: &'a Literal) -> impl Iterator<Item = RewriteMatch<'a>> + 'a {
        self.rules
            .get(&lit.predicate.id)
            .into_iter()
            .flatten()
            .filter_map(move |rule| {
                match_atom(&rule.lhs, lit).map(|substitution| RewriteMatch { rule, substitution })
            })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    fn add_pending(&mut self, idx: usize, key: ClauseKey) {
        self.pending.insert(key.clone(), idx);
        self.pending_keys.insert(idx, key);
    }
}

impl Index for RewriteRuleIndex {
    fn kind(&self) -> IndexKind {
        IndexKind::RewriteRules
    }

    fn on_activate(&mut self, idx: usize, clause: &Clause, _selected: &[usize]) {
        let [l0, l1] = clause.literals.as_slice() else {
            return;
        };
        let (greater, smaller) = match self.ordering.compare_literals(l0, l1) {
            Ordering::Greater => (l0, l1),
            Ordering::Less => (l1, l0),
            _ => return,
        };

        let wanted = ClauseKey::from_literals(&[greater.complement(), smaller.complement()]);
        let Some(partner) = self.pending.remove(&wanted) else {
            self.add_pending(idx, ClauseKey::from_clause(clause));
            return;
        };
        self.pending_keys.remove(&partner);

        let rule = if greater.polarity {
            RewriteRule {
                lhs: greater.clone(),
                other: smaller.clone(),
                clause: idx,
                counterpart: partner,
            }
        } else {
            RewriteRule {
                lhs: greater.complement(),
                other: smaller.complement(),
                clause: partner,
                counterpart: idx,
            }
        };
        self.rules.entry(rule.lhs.predicate.id).or_default().push(rule);
    }

    fn on_remove(&mut self, idx: usize, _clause: &Clause) {
        if let Some(key) = self.pending_keys.remove(&idx) {
            // A later clause with the same key may own the slot now
            if self.pending.get(&key) == Some(&idx) {
                self.pending.remove(&key);
            }
            return;
        }
        let mut orphans = Vec::new();
        for rules in self.rules.values_mut() {
            rules.retain(|rule| {
                if rule.clause == idx {
                    let key = ClauseKey::from_literals(&[rule.lhs.complement(), rule.other.complement()]);
                    orphans.push((rule.counterpart, key));
                    false
                } else if rule.counterpart == idx {
                    let key = ClauseKey::from_literals(&[rule.lhs.clone(), rule.other.clone()]);
                    orphans.push((rule.clause, key));
                    false
                } else {
                    true
                }
            });
        }
        for (survivor, key) in orphans {
            self.add_pending(survivor, key);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{FunctionSymbol, Interner, PredicateSymbol, Term};

    /// {q(f(X)), ~p(X)} and {~q(f(Y)), p(Y)}: q(f(X)) <=> p(X)
    fn rule_pair() -> (Interner, Clause, Clause, PredicateSymbol, PredicateSymbol, FunctionSymbol) {
        let mut interner = Interner::new();
        let p = PredicateSymbol::new(interner.intern_predicate("p"), 1);
        let q = PredicateSymbol::new(interner.intern_predicate("q"), 1);
        let f = FunctionSymbol::new(interner.intern_function("f"), 1);
        let x = Term::var(interner.intern_variable("X"));
        let y = Term::var(interner.intern_variable("Y"));
        let c1 = Clause::new(vec![
            Literal::positive(q, vec![Term::Function(f, vec![x.clone()])]),
            Literal::negative(p, vec![x]),
        ]);
        let c2 = Clause::new(vec![
            Literal::negative(q, vec![Term::Function(f, vec![y.clone()])]),
            Literal::positive(p, vec![y]),
        ]);
        (interner, c1, c2, p, q, f)
    }

    #[test]
    fn test_removing_older_duplicate_keeps_pending_slot() {
        let (_interner, c1, c2, _p, _q, _f) = rule_pair();
        let mut index = RewriteRuleIndex::new(KBO::default());
        index.on_activate(3, &c2, &[]);
        index.on_activate(5, &c2, &[]);
        index.on_remove(3, &c2);

        index.on_activate(9, &c1, &[]);
        assert_eq!(index.rule_count(), 1);
        let rule = index.rules.values().flatten().next().unwrap();
        assert_eq!((rule.clause, rule.counterpart), (9, 5));
    }

    #[test]
    fn test_pairing_builds_one_oriented_rule() {
        let (mut interner, c1, c2, _p, q, f) = rule_pair();
        let mut index = RewriteRuleIndex::new(KBO::default());
        index.on_activate(7, &c2, &[]);
        assert_eq!(index.rule_count(), 0);
        index.on_activate(9, &c1, &[]);
        assert_eq!(index.rule_count(), 1);

        let a = Term::constant(interner.intern_constant("a"));
        let query = Literal::negative(q, vec![Term::Function(f, vec![a])]);
        let matches: Vec<_> = index.generalizations(&query).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rule.clause, 9);
        assert_eq!(matches[0].rule.counterpart, 7);
        assert!(matches[0].rule.lhs.polarity);
    }

    #[test]
    fn test_removal_returns_partner_to_pending() {
        let (_, c1, c2, ..) = rule_pair();
        let mut index = RewriteRuleIndex::new(KBO::default());
        index.on_activate(0, &c1, &[]);
        index.on_activate(1, &c2, &[]);
        index.on_remove(0, &c1);
        assert_eq!(index.rule_count(), 0);
        // c1 comes back and pairs with the waiting c2 again
        index.on_activate(2, &c1, &[]);
        assert_eq!(index.rule_count(), 1);
    }
}
