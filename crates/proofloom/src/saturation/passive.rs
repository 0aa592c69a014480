//! Passive clause container with age/weight selection and LRS limits.
//!
//! Two ordered queues hold the same clauses: one by age, one by weight
//! (ties broken by age, then id). Selection alternates between them
//! according to the age:weight ratio.
//!
//! Limits are ceilings on age and weight. A clause fulfils them when it is
//! within at least one active ceiling; with no ceilings set everything does.

use std::collections::{BTreeSet, HashMap};

/// Age and weight ceilings; `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub age_limit: Option<usize>,
    pub weight_limit: Option<usize>,
}

impl Limits {
    pub fn age_limited(&self) -> bool {
        self.age_limit.is_some()
    }

    pub fn weight_limited(&self) -> bool {
        self.weight_limit.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.age_limited() || self.weight_limited()
    }

    pub fn fulfils(&self, age: usize, weight: usize) -> bool {
        if !self.is_active() {
            return true;
        }
        let age_ok = self.age_limit.is_some_and(|limit| age <= limit);
        let weight_ok = self.weight_limit.is_some_and(|limit| weight <= limit);
        age_ok || weight_ok
    }
}

#[derive(Debug)]
pub struct PassiveContainer {
    age_ratio: i64,
    weight_ratio: i64,
    balance: i64,
    by_age: BTreeSet<(usize, usize)>,
    by_weight: BTreeSet<(usize, usize, usize)>,
    entries: HashMap<usize, (usize, usize)>,
    limits: Limits,
}

impl PassiveContainer {
    /// `ratio` is (age picks, weight picks), not both zero.
    pub fn new(ratio: (u32, u32)) -> Self {
        PassiveContainer {
            age_ratio: i64::from(ratio.0),
            weight_ratio: i64::from(ratio.1),
            balance: 0,
            by_age: BTreeSet::new(),
            by_weight: BTreeSet::new(),
            entries: HashMap::new(),
            limits: Limits::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.entries.contains_key(&idx)
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn fulfils_limits(&self, age: usize, weight: usize) -> bool {
        self.limits.fulfils(age, weight)
    }

    /// Insert a clause; `false` (and nothing stored) if it exceeds the limits.
    pub fn add(&mut self, idx: usize, age: usize, weight: usize) -> bool {
        if !self.fulfils_limits(age, weight) {
            return false;
        }
        self.by_age.insert((age, idx));
        self.by_weight.insert((weight, age, idx));
        self.entries.insert(idx, (age, weight));
        true
    }

    pub fn remove(&mut self, idx: usize) -> bool {
        match self.entries.remove(&idx) {
            Some((age, weight)) => {
                self.by_age.remove(&(age, idx));
                self.by_weight.remove(&(weight, age, idx));
                true
            }
            None => false,
        }
    }

    fn pick_by_weight(balance: i64, age_ratio: i64, weight_ratio: i64) -> bool {
        if age_ratio == 0 {
            return true;
        }
        if weight_ratio == 0 {
            return false;
        }
        balance > 0
    }

    fn advance(&mut self, by_weight: bool) {
        if by_weight {
            self.balance -= self.age_ratio;
        } else {
            self.balance += self.weight_ratio;
        }
    }

    /// Remove and return the next clause to activate.
    pub fn pop_selected(&mut self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let by_weight = Self::pick_by_weight(self.balance, self.age_ratio, self.weight_ratio);
        self.advance(by_weight);
        let idx = if by_weight {
            self.by_weight.first().map(|&(_, _, idx)| idx)
        } else {
            self.by_age.first().map(|&(_, idx)| idx)
        }?;
        self.remove(idx);
        Some(idx)
    }

    /// Set ceilings so that roughly `estimate` more selections stay reachable.
    ///
    /// Replays the selection policy over the current queues without removing
    /// anything. If the queues run dry first, no ceilings are needed.
    /// Returns whether the limits changed.
    pub fn update_limits(&mut self, estimate: u64) -> bool {
        let old = self.limits;
        if estimate >= self.len() as u64 {
            self.limits = Limits::default();
            return old != self.limits;
        }

        let mut picked = std::collections::HashSet::new();
        let mut ages = self.by_age.iter();
        let mut weights = self.by_weight.iter();
        let mut balance = self.balance;
        let mut max_age = None;
        let mut max_weight = None;
        let mut remaining = estimate;

        while remaining > 0 {
            let by_weight = Self::pick_by_weight(balance, self.age_ratio, self.weight_ratio);
            if by_weight {
                balance -= self.age_ratio;
                let Some(&(weight, _, idx)) = weights.find(|(_, _, idx)| !picked.contains(idx)) else {
                    break;
                };
                picked.insert(idx);
                max_weight = Some(weight);
            } else {
                balance += self.weight_ratio;
                let Some(&(age, idx)) = ages.find(|(_, idx)| !picked.contains(idx)) else {
                    break;
                };
                picked.insert(idx);
                max_age = Some(age);
            }
            remaining -= 1;
        }

        self.limits = Limits {
            age_limit: Some(max_age.unwrap_or(0)),
            weight_limit: Some(max_weight.unwrap_or(0)),
        };
        old != self.limits
    }

    /// Drop every clause outside the current limits, returning their ids.
    pub fn purge_exceeding(&mut self) -> Vec<usize> {
        if !self.limits.is_active() {
            return Vec::new();
        }
        let limits = self.limits;
        let doomed: Vec<usize> = self
            .entries
            .iter()
            .filter(|(_, &(age, weight))| !limits.fulfils(age, weight))
            .map(|(&idx, _)| idx)
            .collect();
        for &idx in &doomed {
            self.remove(idx);
        }
        doomed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_alternates_queues() {
        // age:weight 1:1, clause 0 is old and heavy, 1 is young and light
        let mut passive = PassiveContainer::new((1, 1));
        passive.add(0, 0, 10);
        passive.add(1, 5, 1);
        passive.add(2, 6, 2);
        assert_eq!(passive.pop_selected(), Some(0)); // by age
        assert_eq!(passive.pop_selected(), Some(1)); // by weight
        assert_eq!(passive.pop_selected(), Some(2));
        assert_eq!(passive.pop_selected(), None);
    }

    #[test]
    fn test_weight_only_ratio() {
        let mut passive = PassiveContainer::new((0, 1));
        passive.add(0, 0, 10);
        passive.add(1, 5, 1);
        assert_eq!(passive.pop_selected(), Some(1));
    }

    #[test]
    fn test_large_estimate_clears_limits() {
        let mut passive = PassiveContainer::new((1, 1));
        for i in 0..5 {
            passive.add(i, i, 10 - i);
        }
        passive.update_limits(2);
        assert!(passive.limits().is_active());
        passive.update_limits(100);
        assert!(!passive.limits().is_active());
    }

    #[test]
    fn test_limits_follow_simulated_selection() {
        let mut passive = PassiveContainer::new((1, 1));
        // (idx, age, weight)
        for (idx, age, weight) in [(0, 0, 9), (1, 1, 8), (2, 2, 1), (3, 3, 7), (4, 4, 6)] {
            passive.add(idx, age, weight);
        }
        // Two picks: age picks 0 (age 0), weight picks 2 (weight 1)
        assert!(passive.update_limits(2));
        assert_eq!(
            passive.limits(),
            Limits {
                age_limit: Some(0),
                weight_limit: Some(1)
            }
        );
        // 1, 3 and 4 are too old and too heavy
        let mut purged = passive.purge_exceeding();
        purged.sort_unstable();
        assert_eq!(purged, vec![1, 3, 4]);
        assert!(!passive.add(5, 7, 7));
        assert!(passive.add(6, 7, 1));
    }
}
