//! End-to-end saturation runs on JSON problems

use proofloom::saturation::limiter::estimated_reachable_count;
use proofloom::logic::InferenceRule;
use proofloom::{Options, Problem, SaturationAlgorithm, SaturationAlgorithmKind, TerminationReason};

const CHAIN: &str = r#"{
    "clauses": [
        {"role": "axiom", "literals": [
            {"polarity": true, "atom": {"predicate": "p", "args": [{"type": "constant", "name": "a"}]}}
        ]},
        {"role": "axiom", "literals": [
            {"polarity": false, "atom": {"predicate": "p", "args": [{"type": "variable", "name": "X"}]}},
            {"polarity": true, "atom": {"predicate": "q", "args": [{"type": "variable", "name": "X"}]}}
        ]},
        {"role": "negated_conjecture", "literals": [
            {"polarity": false, "atom": {"predicate": "q", "args": [{"type": "constant", "name": "a"}]}}
        ]}
    ]
}"#;

/// q(f(X)) <=> p(X) as a rule pair, plus a clause that derives ~q(f(a)) | r.
const REWRITE_RULES: &str = r#"{
    "clauses": [
        {"literals": [
            {"polarity": true, "atom": {"predicate": "q", "args": [
                {"type": "function", "name": "f", "args": [{"type": "variable", "name": "X"}]}
            ]}},
            {"polarity": false, "atom": {"predicate": "p", "args": [{"type": "variable", "name": "X"}]}}
        ]},
        {"literals": [
            {"polarity": false, "atom": {"predicate": "q", "args": [
                {"type": "function", "name": "f", "args": [{"type": "variable", "name": "Y"}]}
            ]}},
            {"polarity": true, "atom": {"predicate": "p", "args": [{"type": "variable", "name": "Y"}]}}
        ]},
        {"literals": [
            {"polarity": true, "atom": {"predicate": "s", "args": [{"type": "constant", "name": "a"}]}}
        ]},
        {"literals": [
            {"polarity": false, "atom": {"predicate": "s", "args": [{"type": "variable", "name": "Z"}]}},
            {"polarity": true, "atom": {"predicate": "u", "args": [
                {"type": "function", "name": "f", "args": [{"type": "variable", "name": "Z"}]}
            ]}}
        ]},
        {"literals": [
            {"polarity": false, "atom": {"predicate": "u", "args": [{"type": "variable", "name": "W"}]}},
            {"polarity": false, "atom": {"predicate": "q", "args": [{"type": "variable", "name": "W"}]}},
            {"polarity": true, "atom": {"predicate": "r"}}
        ]}
    ]
}"#;

/// All trees have p, by induction: p(leaf) and p(l) & p(r) -> p(node(l, r)).
const TREES: &str = r#"{
    "sorts": ["tree"],
    "predicates": [{"name": "p", "args": ["tree"]}],
    "term_algebras": [{
        "sort": "tree",
        "constructors": [
            {"name": "leaf"},
            {"name": "node", "args": [
                {"destructor": "left", "sort": "tree"},
                {"destructor": "right", "sort": "tree"}
            ]}
        ]
    }],
    "constants": [{"name": "c", "sort": "tree"}],
    "clauses": [
        {"role": "axiom", "literals": [
            {"polarity": true, "atom": {"predicate": "p", "args": [{"type": "constant", "name": "leaf"}]}}
        ]},
        {"role": "axiom", "literals": [
            {"polarity": false, "atom": {"predicate": "p", "args": [{"type": "variable", "name": "L"}]}},
            {"polarity": false, "atom": {"predicate": "p", "args": [{"type": "variable", "name": "R"}]}},
            {"polarity": true, "atom": {"predicate": "p", "args": [
                {"type": "function", "name": "node", "args": [
                    {"type": "variable", "name": "L"},
                    {"type": "variable", "name": "R"}
                ]}
            ]}}
        ]},
        {"role": "negated_conjecture", "literals": [
            {"polarity": false, "atom": {"predicate": "p", "args": [{"type": "constant", "name": "c"}]}}
        ]}
    ]
}"#;

fn saturate(text: &str, options: Options) -> SaturationAlgorithm {
    let problem = Problem::from_json(text).unwrap();
    let mut algorithm = SaturationAlgorithm::from_options(problem.clauses(), problem.signature, options).unwrap();
    algorithm.saturate();
    algorithm
}

fn assert_valid_proof(algorithm: &SaturationAlgorithm) {
    let proof = algorithm.proof().expect("refutation has a proof");
    assert!(proof.last().unwrap().conclusion.is_empty());
    for step in &proof {
        for premise in &step.premises {
            assert!(*premise < step.clause_idx, "premise {} after [{}]", premise, step.clause_idx);
            assert!(proof.iter().any(|s| s.clause_idx == *premise));
        }
    }
}

#[test]
fn test_every_algorithm_refutes_chain() {
    for kind in [
        SaturationAlgorithmKind::Otter,
        SaturationAlgorithmKind::Discount,
        SaturationAlgorithmKind::Lrs,
    ] {
        let options = Options {
            saturation_algorithm: kind,
            ..Options::default()
        };
        let algorithm = saturate(CHAIN, options);
        assert_eq!(algorithm.result(), Some(TerminationReason::Refutation), "{:?}", kind);
        assert_valid_proof(&algorithm);
    }
}

#[test]
fn test_literal_rewriting_replaces_derived_clause() {
    let options = Options {
        saturation_algorithm: SaturationAlgorithmKind::Otter,
        literal_rewriting: true,
        ..Options::default()
    };
    let algorithm = saturate(REWRITE_RULES, options);
    assert!(algorithm.statistics().forward_literal_rewrites > 0);

    // u(f(a)) meets ~u(W) | ~q(W) | r, and ~q(f(a)) | r is rewritten to ~p(a) | r
    let interner = &algorithm.signature().interner;
    let rewritten: Vec<Vec<(bool, &str)>> = algorithm
        .store()
        .iter()
        .filter(|c| c.inference.rule == InferenceRule::ForwardLiteralRewriting)
        .map(|c| {
            c.literals
                .iter()
                .map(|l| (l.polarity, interner.resolve_predicate(l.predicate.id)))
                .collect()
        })
        .collect();
    assert!(
        rewritten
            .iter()
            .any(|lits| lits.len() == 2 && lits.contains(&(false, "p")) && lits.contains(&(true, "r"))),
        "{:?}",
        rewritten
    );
}

#[test]
fn test_trees_are_refuted_by_induction() {
    let options = Options {
        saturation_algorithm: SaturationAlgorithmKind::Otter,
        structural_induction: true,
        max_clause_size: 10,
        ..Options::default()
    };
    let algorithm = saturate(TREES, options);
    assert_eq!(algorithm.result(), Some(TerminationReason::Refutation));
    assert!(!algorithm.is_complete());
    assert!(algorithm.statistics().structural_induction_inferences >= 3);
    assert_valid_proof(&algorithm);
}

#[test]
fn test_lrs_has_no_estimate_for_small_runs() {
    let options = Options {
        time_limit: 100,
        ..Options::default()
    };
    for active in 0..=10 {
        assert_eq!(estimated_reachable_count(active, 6_000, 6_000, 1, &options), None);
    }
    assert!(estimated_reachable_count(200, 6_000, 6_000, 1, &options).is_some());
}
