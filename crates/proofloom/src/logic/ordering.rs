//! Knuth-Bendix ordering on terms, lifted to literals.
//!
//! Literals are compared as their atoms (the predicate acting as the head
//! symbol). Two literals over the same atom are ordered negative above
//! positive.

use super::interner::{ConstantId, FunctionId, PredicateId, VariableId};
use super::literal::Literal;
use super::term::Term;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct KBOConfig {
    /// Symbol weights; absent symbols weigh 1
    pub function_weights: HashMap<FunctionId, usize>,
    pub constant_weights: HashMap<ConstantId, usize>,
    /// Precedences; ties are broken by symbol id
    pub function_precedence: HashMap<FunctionId, usize>,
    pub constant_precedence: HashMap<ConstantId, usize>,
    pub predicate_precedence: HashMap<PredicateId, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    Greater,
    Less,
    Equal,
    Incomparable,
}

impl Ordering {
    pub fn reverse(self) -> Ordering {
        match self {
            Ordering::Greater => Ordering::Less,
            Ordering::Less => Ordering::Greater,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Head {
    Variable(VariableId),
    Constant(ConstantId),
    Function(FunctionId),
    Predicate(PredicateId),
}

/// Anything KBO can look at: a head symbol over term children.
trait KboNode {
    fn head(&self) -> Head;
    fn children(&self) -> &[Term];
}

impl KboNode for Term {
    fn head(&self) -> Head {
        match self {
            Term::Variable(v) => Head::Variable(v.id),
            Term::Constant(c) => Head::Constant(c.id),
            Term::Function(f, _) => Head::Function(f.id),
        }
    }

    fn children(&self) -> &[Term] {
        match self {
            Term::Function(_, args) => args,
            _ => &[],
        }
    }
}

impl KboNode for Literal {
    fn head(&self) -> Head {
        Head::Predicate(self.predicate.id)
    }

    fn children(&self) -> &[Term] {
        &self.args
    }
}

#[derive(Debug, Clone, Default)]
pub struct KBO {
    config: KBOConfig,
}

impl KBO {
    pub fn new(config: KBOConfig) -> Self {
        KBO { config }
    }

    fn head_weight(&self, head: Head) -> usize {
        match head {
            Head::Variable(_) | Head::Predicate(_) => 1,
            Head::Constant(c) => self.config.constant_weights.get(&c).copied().unwrap_or(1),
            Head::Function(f) => self.config.function_weights.get(&f).copied().unwrap_or(1),
        }
    }

    /// (kind, precedence, id); kinds only meet within one family
    fn head_rank(&self, head: Head) -> (u8, usize, u32) {
        match head {
            Head::Variable(v) => (0, 0, v.as_u32()),
            Head::Constant(c) => (
                1,
                self.config.constant_precedence.get(&c).copied().unwrap_or(0),
                c.as_u32(),
            ),
            Head::Function(f) => (
                2,
                self.config.function_precedence.get(&f).copied().unwrap_or(0),
                f.as_u32(),
            ),
            Head::Predicate(p) => (
                3,
                self.config.predicate_precedence.get(&p).copied().unwrap_or(0),
                p.as_u32(),
            ),
        }
    }

    pub fn term_weight(&self, term: &Term) -> usize {
        self.node_weight(term)
    }

    fn node_weight<N: KboNode>(&self, node: &N) -> usize {
        self.head_weight(node.head())
            + node
                .children()
                .iter()
                .map(|c| self.node_weight(c))
                .sum::<usize>()
    }

    fn count_variables<N: KboNode>(node: &N, counts: &mut HashMap<VariableId, i64>, sign: i64) {
        if let Head::Variable(v) = node.head() {
            *counts.entry(v).or_insert(0) += sign;
        }
        for child in node.children() {
            Self::count_variables(child, counts, sign);
        }
    }

    pub fn compare(&self, s: &Term, t: &Term) -> Ordering {
        self.compare_nodes(s, t)
    }

    /// Compare literals by their atoms; same atom means negative is greater.
    pub fn compare_literals(&self, l1: &Literal, l2: &Literal) -> Ordering {
        if l1.same_atom(l2) {
            return match (l1.polarity, l2.polarity) {
                (a, b) if a == b => Ordering::Equal,
                (false, true) => Ordering::Greater,
                _ => Ordering::Less,
            };
        }
        self.compare_nodes(l1, l2)
    }

    fn compare_nodes<A: KboNode, B: KboNode>(&self, s: &A, t: &B) -> Ordering {
        match (s.head(), t.head()) {
            (Head::Variable(x), Head::Variable(y)) => {
                return if x == y {
                    Ordering::Equal
                } else {
                    Ordering::Incomparable
                };
            }
            (Head::Variable(x), _) => {
                return if Self::occurs(x, t) {
                    Ordering::Less
                } else {
                    Ordering::Incomparable
                };
            }
            (_, Head::Variable(y)) => {
                return if Self::occurs(y, s) {
                    Ordering::Greater
                } else {
                    Ordering::Incomparable
                };
            }
            _ => {}
        }

        // balance[x] = #(x, s) - #(x, t)
        let mut balance = HashMap::new();
        Self::count_variables(s, &mut balance, 1);
        Self::count_variables(t, &mut balance, -1);
        let s_covers_t = balance.values().all(|&b| b >= 0);
        let t_covers_s = balance.values().all(|&b| b <= 0);

        let ws = self.node_weight(s);
        let wt = self.node_weight(t);

        let candidate = if ws > wt {
            Ordering::Greater
        } else if ws < wt {
            Ordering::Less
        } else {
            self.compare_same_weight(s, t)
        };

        match candidate {
            Ordering::Greater if s_covers_t => Ordering::Greater,
            Ordering::Less if t_covers_s => Ordering::Less,
            Ordering::Equal => Ordering::Equal,
            _ => Ordering::Incomparable,
        }
    }

    fn compare_same_weight<A: KboNode, B: KboNode>(&self, s: &A, t: &B) -> Ordering {
        let (hs, ht) = (s.head(), t.head());
        if hs != ht {
            let (rs, rt) = (self.head_rank(hs), self.head_rank(ht));
            return if rs > rt {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        for (a, b) in s.children().iter().zip(t.children()) {
            match self.compare_nodes(a, b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    fn occurs<N: KboNode>(var: VariableId, node: &N) -> bool {
        node.head() == Head::Variable(var) || node.children().iter().any(|c| Self::occurs(var, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::interner::Interner;
    use crate::logic::literal::PredicateSymbol;
    use crate::logic::term::FunctionSymbol;
    use proptest::prelude::*;

    struct TestContext {
        interner: Interner,
    }

    impl TestContext {
        fn new() -> Self {
            TestContext {
                interner: Interner::new(),
            }
        }

        fn var(&mut self, name: &str) -> Term {
            Term::var(self.interner.intern_variable(name))
        }

        fn const_(&mut self, name: &str) -> Term {
            Term::constant(self.interner.intern_constant(name))
        }

        fn func(&mut self, name: &str, args: Vec<Term>) -> Term {
            let id = self.interner.intern_function(name);
            Term::Function(FunctionSymbol::new(id, args.len() as u8), args)
        }

        fn pred(&mut self, name: &str, arity: u8) -> PredicateSymbol {
            PredicateSymbol::new(self.interner.intern_predicate(name), arity)
        }
    }

    #[test]
    fn test_variable_condition() {
        let mut ctx = TestContext::new();
        let kbo = KBO::default();
        let x = ctx.var("X");
        let y = ctx.var("Y");
        let a = ctx.const_("a");
        let fx = ctx.func("f", vec![x.clone()]);
        let fy = ctx.func("f", vec![y.clone()]);

        assert_eq!(kbo.compare(&x, &y), Ordering::Incomparable);
        assert_eq!(kbo.compare(&a, &x), Ordering::Incomparable);
        assert_eq!(kbo.compare(&fx, &x), Ordering::Greater);
        assert_eq!(kbo.compare(&x, &fx), Ordering::Less);
        assert_eq!(kbo.compare(&fx, &fy), Ordering::Incomparable);
    }

    #[test]
    fn test_literal_comparison() {
        let mut ctx = TestContext::new();
        let kbo = KBO::default();
        let p = ctx.pred("p", 1);
        let q = ctx.pred("q", 1);
        let a = ctx.const_("a");
        let ffa = {
            let fa = ctx.func("f", vec![a.clone()]);
            ctx.func("f", vec![fa])
        };

        let pa = Literal::positive(p, vec![a.clone()]);
        let qffa = Literal::positive(q, vec![ffa]);
        assert_eq!(kbo.compare_literals(&qffa, &pa), Ordering::Greater);
        assert_eq!(kbo.compare_literals(&pa, &qffa), Ordering::Less);
        assert_eq!(kbo.compare_literals(&pa.complement(), &pa), Ordering::Greater);
        assert_eq!(kbo.compare_literals(&pa, &pa.clone()), Ordering::Equal);
    }

    proptest! {
        #[test]
        fn prop_ground_comparison_is_antisymmetric(depth_a in 0usize..5, depth_b in 0usize..5) {
            let mut ctx = TestContext::new();
            let kbo = KBO::default();
            let mut s = ctx.const_("a");
            for _ in 0..depth_a {
                s = ctx.func("f", vec![s]);
            }
            let mut t = ctx.const_("b");
            for _ in 0..depth_b {
                t = ctx.func("g", vec![t]);
            }
            let st = kbo.compare(&s, &t);
            let ts = kbo.compare(&t, &s);
            prop_assert_eq!(st, ts.reverse());
            // KBO is total on ground terms
            prop_assert_ne!(st, Ordering::Incomparable);
        }
    }
}
