//! The preprocessing pass shared by every strategy of a schedule.
//!
//! Runs once over the problem, before any context exists:
//! 1. `$true`/`$false` simplification
//! 2. negation normal form
//! 3. pure predicate removal (`unused_predicate_definition_removal`)
//! 4. SInE axiom selection (`sine_selection=axioms`)
//! 5. clausification of clause-shaped formulas
//!
//! Only universally closed disjunctions of literals (and conjunctions of
//! those) are clausified. Anything needing skolemization or distribution
//! is rejected.

use crate::config::{Options, SineSelection};
use crate::error::{ProverError, Result};
use crate::log_targets;
use crate::logic::formula::{BinaryConnective, Junction, Quantifier};
use crate::logic::transformer::{
    FormulaUnitTransformer, LocalFormulaUnitTransformer, Polarity, PolarityAware, PolarityLeafTransformer,
};
use crate::logic::{
    Clause, ConstantId, Formula, FormulaTransformer, FormulaUnit, FunctionId, InferenceRule, InputType, Literal,
    PredicateId, Term, Unit, Variable,
};
use crate::problem::Problem;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

fn truth(value: bool) -> Formula {
    if value {
        Formula::True
    } else {
        Formula::False
    }
}

fn truth_value(f: &Formula) -> Option<bool> {
    match f {
        Formula::True => Some(true),
        Formula::False => Some(false),
        _ => None,
    }
}

/// Negation that folds constants.
fn negate(f: Formula) -> Formula {
    match f {
        Formula::True => Formula::False,
        Formula::False => Formula::True,
        other => Formula::not(other),
    }
}

// =============================================================================
// $true / $false simplification
// =============================================================================

/// Removes `$true` and `$false` from inside formulas.
#[derive(Debug, Default)]
pub struct TrueFalseSimplifier;

impl TrueFalseSimplifier {
    /// Transformed child, or a copy of the original.
    fn child(&mut self, f: &Formula) -> (Formula, bool) {
        match self.apply(f) {
            Some(changed) => (changed, true),
            None => (f.clone(), false),
        }
    }
}

impl FormulaTransformer for TrueFalseSimplifier {
    fn apply_not(&mut self, arg: &Formula) -> Option<Formula> {
        let (arg, changed) = self.child(arg);
        match truth_value(&arg) {
            Some(v) => Some(truth(!v)),
            None if changed => Some(Formula::not(arg)),
            None => None,
        }
    }

    fn apply_junction(&mut self, junction: Junction, args: &[Formula]) -> Option<Formula> {
        // `$true` absorbs a disjunction, `$false` a conjunction
        let absorbing = junction == Junction::Or;
        let mut changed = false;
        let mut kept = Vec::with_capacity(args.len());
        for arg in args {
            let (arg, arg_changed) = self.child(arg);
            changed |= arg_changed;
            match truth_value(&arg) {
                Some(v) if v == absorbing => return Some(truth(absorbing)),
                Some(_) => changed = true,
                None => kept.push(arg),
            }
        }
        if !changed {
            return None;
        }
        Some(match kept.len() {
            0 => truth(!absorbing),
            1 => kept.swap_remove(0),
            _ => Formula::Junction(junction, kept),
        })
    }

    fn apply_implies(&mut self, lhs: &Formula, rhs: &Formula) -> Option<Formula> {
        let (l, lc) = self.child(lhs);
        let (r, rc) = self.child(rhs);
        match (truth_value(&l), truth_value(&r)) {
            (Some(false), _) | (_, Some(true)) => Some(Formula::True),
            (Some(true), _) => Some(r),
            (_, Some(false)) => Some(negate(l)),
            _ if lc || rc => Some(Formula::implies(l, r)),
            _ => None,
        }
    }

    fn apply_binary(&mut self, c: BinaryConnective, lhs: &Formula, rhs: &Formula) -> Option<Formula> {
        let (l, lc) = self.child(lhs);
        let (r, rc) = self.child(rhs);
        // x <=> $true is x, x <~> $true is ~x
        let xor = c == BinaryConnective::Xor;
        match (truth_value(&l), truth_value(&r)) {
            (Some(a), Some(b)) => Some(truth((a == b) != xor)),
            (Some(v), None) => Some(if v != xor { r } else { negate(r) }),
            (None, Some(v)) => Some(if v != xor { l } else { negate(l) }),
            _ if lc || rc => Some(Formula::Binary(c, Box::new(l), Box::new(r))),
            _ => None,
        }
    }

    fn apply_quantified(&mut self, q: Quantifier, vars: &[Variable], body: &Formula) -> Option<Formula> {
        let (body, changed) = self.child(body);
        match truth_value(&body) {
            Some(v) => Some(truth(v)),
            None if changed => Some(Formula::Quantified(q, vars.to_vec(), Box::new(body))),
            None => None,
        }
    }

    fn apply_ite(&mut self, cond: &Formula, then: &Formula, other: &Formula) -> Option<Formula> {
        let (c, cc) = self.child(cond);
        let (t, tc) = self.child(then);
        let (e, ec) = self.child(other);
        match truth_value(&c) {
            Some(true) => Some(t),
            Some(false) => Some(e),
            None if cc || tc || ec => Some(Formula::Ite(Box::new(c), Box::new(t), Box::new(e))),
            None => None,
        }
    }
}

// =============================================================================
// Negation normal form
// =============================================================================

/// Pushes negations down to literals and expands `=>`, `<=>`, `<~>` and
/// if-then-else into conjunctions and disjunctions.
#[derive(Debug, Default)]
pub struct NnfTransformer;

impl NnfTransformer {
    fn nnf(&mut self, f: &Formula) -> Formula {
        self.transform(f.clone())
    }

    /// Negation normal form of `~f`.
    fn negated(&mut self, f: &Formula) -> Formula {
        match f {
            Formula::Literal(lit) => Formula::Literal(lit.complement()),
            Formula::True => Formula::False,
            Formula::False => Formula::True,
            Formula::Not(arg) => self.nnf(arg),
            Formula::Junction(j, args) => {
                let dual = match j {
                    Junction::And => Junction::Or,
                    Junction::Or => Junction::And,
                };
                Formula::Junction(dual, args.iter().map(|a| self.negated(a)).collect())
            }
            Formula::Binary(BinaryConnective::Implies, l, r) => Formula::and(vec![self.nnf(l), self.negated(r)]),
            // ~(a <=> b) is a <~> b and vice versa
            Formula::Binary(BinaryConnective::Iff, l, r) => self.xor(l, r),
            Formula::Binary(BinaryConnective::Xor, l, r) => self.iff(l, r),
            Formula::Quantified(q, vars, body) => {
                let dual = match q {
                    Quantifier::Forall => Quantifier::Exists,
                    Quantifier::Exists => Quantifier::Forall,
                };
                Formula::Quantified(dual, vars.clone(), Box::new(self.negated(body)))
            }
            Formula::Ite(c, t, e) => Formula::and(vec![
                Formula::or(vec![self.negated(c), self.negated(t)]),
                Formula::or(vec![self.nnf(c), self.negated(e)]),
            ]),
        }
    }

    fn iff(&mut self, l: &Formula, r: &Formula) -> Formula {
        Formula::and(vec![
            Formula::or(vec![self.negated(l), self.nnf(r)]),
            Formula::or(vec![self.nnf(l), self.negated(r)]),
        ])
    }

    fn xor(&mut self, l: &Formula, r: &Formula) -> Formula {
        Formula::and(vec![
            Formula::or(vec![self.nnf(l), self.nnf(r)]),
            Formula::or(vec![self.negated(l), self.negated(r)]),
        ])
    }
}

impl FormulaTransformer for NnfTransformer {
    fn apply_not(&mut self, arg: &Formula) -> Option<Formula> {
        Some(self.negated(arg))
    }

    fn apply_implies(&mut self, lhs: &Formula, rhs: &Formula) -> Option<Formula> {
        Some(Formula::or(vec![self.negated(lhs), self.nnf(rhs)]))
    }

    fn apply_binary(&mut self, c: BinaryConnective, lhs: &Formula, rhs: &Formula) -> Option<Formula> {
        Some(match c {
            BinaryConnective::Iff => self.iff(lhs, rhs),
            BinaryConnective::Xor => self.xor(lhs, rhs),
            BinaryConnective::Implies => Formula::or(vec![self.negated(lhs), self.nnf(rhs)]),
        })
    }

    fn apply_ite(&mut self, cond: &Formula, then: &Formula, other: &Formula) -> Option<Formula> {
        Some(Formula::and(vec![
            Formula::or(vec![self.negated(cond), self.nnf(then)]),
            Formula::or(vec![self.nnf(cond), self.nnf(other)]),
        ]))
    }
}

// =============================================================================
// Pure predicate removal
// =============================================================================

/// Polarities each predicate occurs with: (positive, negative).
#[derive(Debug, Default)]
pub struct PolarityCollector {
    occurrences: HashMap<PredicateId, (bool, bool)>,
}

impl PolarityCollector {
    fn record(&mut self, predicate: PredicateId, polarity: Polarity) {
        let entry = self.occurrences.entry(predicate).or_default();
        entry.0 |= polarity >= 0;
        entry.1 |= polarity <= 0;
    }

    /// Predicates occurring with one polarity only, with the truth value
    /// that satisfies all their occurrences.
    pub fn pure_predicates(&self) -> HashMap<PredicateId, bool> {
        self.occurrences
            .iter()
            .filter(|(_, &(pos, neg))| pos != neg)
            .map(|(&p, &(pos, _))| (p, pos))
            .collect()
    }
}

impl PolarityLeafTransformer for PolarityCollector {
    fn apply_literal(&mut self, lit: &Literal, polarity: Polarity) -> Option<Formula> {
        let effective = if lit.polarity { polarity } else { -polarity };
        self.record(lit.predicate.id, effective);
        None
    }
}

/// Replaces literals of the given predicates by their truth value.
struct PureLiteralEliminator<'a> {
    values: &'a HashMap<PredicateId, bool>,
}

impl FormulaTransformer for PureLiteralEliminator<'_> {
    fn apply_literal(&mut self, lit: &Literal) -> Option<Formula> {
        self.values
            .get(&lit.predicate.id)
            .map(|&value| truth(lit.polarity == value))
    }
}

/// Delete every unit made true by pure predicates, until none are left.
/// Returns the number of units removed.
pub fn remove_pure_predicates(units: &mut Vec<Unit>) -> usize {
    let mut removed = 0;
    loop {
        let mut collector = PolarityAware::new(PolarityCollector::default());
        for unit in units.iter() {
            match unit {
                Unit::Clause(c) => {
                    for lit in &c.literals {
                        collector.leaf.record(lit.predicate.id, if lit.polarity { 1 } else { -1 });
                    }
                }
                Unit::Formula(fu) => {
                    collector.apply(&fu.formula);
                }
            }
        }
        let pure = collector.leaf.pure_predicates();
        if pure.is_empty() {
            return removed;
        }

        let before = units.len();
        let mut kept = Vec::with_capacity(units.len());
        for unit in units.drain(..) {
            match unit {
                Unit::Clause(c) => {
                    if !c.literals.iter().any(|l| pure.contains_key(&l.predicate.id)) {
                        kept.push(Unit::Clause(c));
                    }
                }
                Unit::Formula(mut fu) => {
                    let mut eliminator = PureLiteralEliminator { values: &pure };
                    if let Some(f) = eliminator.apply(&fu.formula) {
                        fu.formula = TrueFalseSimplifier.transform(f);
                    }
                    if fu.formula != Formula::True {
                        kept.push(Unit::Formula(fu));
                    }
                }
            }
        }
        *units = kept;
        log::debug!(
            target: log_targets::PREPROCESS,
            "{} pure predicates, {} units removed",
            pure.len(),
            before - units.len()
        );
        removed += before - units.len();
    }
}

// =============================================================================
// SInE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Symbol {
    Predicate(PredicateId),
    Function(FunctionId),
    Constant(ConstantId),
}

fn term_symbols(term: &Term, out: &mut HashSet<Symbol>) {
    match term {
        Term::Variable(_) => {}
        Term::Constant(c) => {
            out.insert(Symbol::Constant(c.id));
        }
        Term::Function(f, args) => {
            out.insert(Symbol::Function(f.id));
            for arg in args {
                term_symbols(arg, out);
            }
        }
    }
}

fn unit_symbols(unit: &Unit) -> HashSet<Symbol> {
    let mut out = HashSet::new();
    let mut add = |lit: &Literal| {
        out.insert(Symbol::Predicate(lit.predicate.id));
        for arg in &lit.args {
            term_symbols(arg, &mut out);
        }
    };
    match unit {
        Unit::Clause(c) => c.literals.iter().for_each(&mut add),
        Unit::Formula(fu) => fu.formula.for_each_literal(&mut add),
    }
    out
}

fn is_goal(unit: &Unit) -> bool {
    let input_type = match unit {
        Unit::Clause(c) => c.input_type,
        Unit::Formula(fu) => fu.input_type,
    };
    input_type == InputType::NegatedConjecture
}

/// Keep the goals and the axioms reachable from them via trigger symbols.
///
/// A symbol triggers a unit when it is no more than `sine_tolerance` times
/// as common as the rarest symbol of that unit, or when it occurs in at
/// most `sine_generality_threshold` units. `sine_depth` bounds the number
/// of trigger rounds, 0 for none.
pub fn sine_select(units: Vec<Unit>, options: &Options) -> Vec<Unit> {
    let symbols: Vec<HashSet<Symbol>> = units.iter().map(unit_symbols).collect();
    let mut occurrences: HashMap<Symbol, usize> = HashMap::new();
    for s in symbols.iter().flatten() {
        *occurrences.entry(*s).or_default() += 1;
    }

    let tolerance = f64::from(options.sine_tolerance);
    let threshold = options.sine_generality_threshold as usize;
    let mut triggers: HashMap<Symbol, Vec<usize>> = HashMap::new();
    for (i, syms) in symbols.iter().enumerate() {
        let Some(rarest) = syms.iter().map(|s| occurrences[s]).min() else {
            continue;
        };
        for s in syms {
            let occ = occurrences[s];
            if occ <= threshold || occ as f64 <= tolerance * rarest as f64 {
                triggers.entry(*s).or_default().push(i);
            }
        }
    }

    let mut selected: Vec<bool> = units.iter().zip(&symbols).map(|(u, s)| is_goal(u) || s.is_empty()).collect();
    let mut seen: HashSet<Symbol> = HashSet::new();
    let mut frontier: Vec<Symbol> = Vec::new();
    for (i, unit) in units.iter().enumerate() {
        if is_goal(unit) {
            frontier.extend(symbols[i].iter().filter(|s| seen.insert(**s)));
        }
    }
    if frontier.is_empty() {
        log::info!(target: log_targets::PREPROCESS, "SInE: no goal symbols, keeping all axioms");
        return units;
    }

    let mut depth = 0;
    while !frontier.is_empty() && (options.sine_depth == 0 || depth < options.sine_depth) {
        depth += 1;
        let mut next = Vec::new();
        for s in frontier {
            for &i in triggers.get(&s).into_iter().flatten() {
                if !selected[i] {
                    selected[i] = true;
                    next.extend(symbols[i].iter().filter(|t| seen.insert(**t)));
                }
            }
        }
        frontier = next;
    }

    let before = units.len();
    let kept: Vec<Unit> = units
        .into_iter()
        .zip(selected)
        .filter_map(|(u, keep)| keep.then_some(u))
        .collect();
    log::info!(
        target: log_targets::PREPROCESS,
        "SInE selected {} of {} units in {} rounds",
        kept.len(),
        before,
        depth
    );
    kept
}

// =============================================================================
// Clausification
// =============================================================================

fn unsupported(f: &Formula, reason: &str) -> ProverError {
    ProverError::UnsupportedFormula(format!("{} in {:?}", reason, f))
}

fn strip_forall(f: &Formula) -> &Formula {
    match f {
        Formula::Quantified(Quantifier::Forall, _, body) => strip_forall(body),
        other => other,
    }
}

/// Literals of one disjunction, or `None` if it is trivially true.
fn disjunction_literals(f: &Formula, out: &mut Vec<Literal>) -> Result<bool> {
    match f {
        Formula::Literal(lit) => out.push(lit.clone()),
        Formula::True => return Ok(false),
        Formula::False => {}
        Formula::Junction(Junction::Or, args) => {
            for arg in args {
                if !disjunction_literals(arg, out)? {
                    return Ok(false);
                }
            }
        }
        other => return Err(unsupported(other, "not a disjunction of literals")),
    }
    Ok(true)
}

/// Clauses of a formula in negation normal form.
pub fn clausify(unit: &FormulaUnit) -> Result<Vec<Clause>> {
    let mut conjuncts = vec![strip_forall(&unit.formula)];
    let mut clauses = Vec::new();
    while let Some(f) = conjuncts.pop() {
        match f {
            Formula::Junction(Junction::And, args) => {
                conjuncts.extend(args.iter().rev().map(strip_forall));
            }
            Formula::Quantified(Quantifier::Exists, ..) => {
                return Err(unsupported(f, "existential quantifier"));
            }
            _ => {
                let mut literals = Vec::new();
                if disjunction_literals(f, &mut literals)? {
                    clauses.push(Clause::with_input_type(literals, unit.input_type));
                }
            }
        }
    }
    Ok(clauses)
}

// =============================================================================
// The pass
// =============================================================================

/// Statistics of one preprocessing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreprocessReport {
    pub simplified: usize,
    pub pure_units_removed: usize,
    pub sine_removed: usize,
    pub clauses: usize,
}

fn formula_count(units: &[Unit]) -> usize {
    units.iter().filter(|u| matches!(u, Unit::Formula(_))).count()
}

pub fn preprocess(problem: &mut Problem, options: &Options) -> Result<PreprocessReport> {
    let mut report = PreprocessReport::default();
    log::debug!(
        target: log_targets::PREPROCESS,
        "Definition and naming settings: fde={:?} gsp={} naming={} ins={}",
        options.function_definition_elimination,
        options.general_splitting,
        options.naming,
        options.inequality_splitting
    );

    let ids = problem.next_unit_id();
    let mut simplifier = LocalFormulaUnitTransformer::new(TrueFalseSimplifier, InferenceRule::Preprocessing, ids);
    simplifier.transform_units(&mut problem.units);
    report.simplified = simplifier.next_id() - ids;

    let mut nnf = LocalFormulaUnitTransformer::new(NnfTransformer, InferenceRule::Preprocessing, simplifier.next_id());
    nnf.transform_units(&mut problem.units);
    problem.set_next_unit_id(nnf.next_id());

    if options.unused_predicate_definition_removal {
        report.pure_units_removed = remove_pure_predicates(&mut problem.units);
    }
    if options.sine_selection == SineSelection::Axioms {
        let before = problem.units.len();
        let units = std::mem::take(&mut problem.units);
        problem.units = sine_select(units, options);
        report.sine_removed = before - problem.units.len();
    }

    let formulas = formula_count(&problem.units);
    let mut units = Vec::with_capacity(problem.units.len());
    for unit in problem.units.drain(..) {
        match unit {
            Unit::Clause(c) => units.push(Unit::Clause(c)),
            Unit::Formula(fu) => {
                for clause in clausify(&fu)? {
                    units.push(Unit::Clause(Arc::new(clause)));
                }
            }
        }
    }
    problem.units = units;
    report.clauses = problem.units.len();

    log::info!(
        target: log_targets::PREPROCESS,
        "Preprocessed: {} formulas clausified, {} pure units and {} SInE units removed, {} clauses",
        formulas,
        report.pure_units_removed,
        report.sine_removed,
        report.clauses
    );
    Ok(report)
}
