//! Given-clause saturation.
//!
//! Clauses move through four pools:
//! - Unprocessed: new clauses waiting for forward simplification
//! - Passive: retained clauses waiting to be selected
//! - Active: clauses that have been selected and take part in generation
//! - Deactivated: clauses taken out of Active until they are reactivated
//!
//! `step()` does one bounded unit of work (one unprocessed clause or one
//! activation) so a context can suspend between any two steps.

pub mod limiter;
pub mod passive;
pub mod splitter;
pub mod store;

use crate::config::{Options, SaturationAlgorithmKind};
use crate::error::{ProverError, Result};
use crate::generating::{BinaryResolution, Factoring, GeneratingInferenceEngine, InferenceEnv, StructuralInduction};
use crate::index::IndexManager;
use crate::log_targets;
use crate::logic::{Clause, Signature, KBO};
use crate::selection::{selector_for, LiteralSelector};
use crate::simplifying::{
    ForwardLiteralRewriting, ForwardSimplificationEngine, ForwardSimplificationPerformer, SimplificationEnv,
    TautologyDeletion, VariantDeletion,
};
use crate::statistics::{Statistics, TerminationReason};
use indexmap::IndexSet;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

pub use limiter::{Clock, LrsLimiter, NoLimits, ResourceLimiter};
pub use passive::{Limits, PassiveContainer};
pub use splitter::ComponentSplitter;
pub use store::{ClauseStore, ProofStep};

/// Clock of a loop running on its own, outside any scheduler.
#[derive(Debug, Clone, Copy)]
pub struct StandaloneClock {
    start: Instant,
}

impl StandaloneClock {
    pub fn new() -> Self {
        StandaloneClock { start: Instant::now() }
    }
}

impl Default for StandaloneClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StandaloneClock {
    fn local_elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn global_elapsed_ms(&self) -> u64 {
        self.local_elapsed_ms()
    }

    fn alive_contexts(&self) -> usize {
        1
    }
}

/// Performer handed to forward simplifiers by the loop.
///
/// Premises must be retained clauses: active ones always, passive ones only
/// when the algorithm simplifies against Passive.
struct LoopPerformer<'a> {
    active: &'a IndexSet<usize>,
    passive: Option<&'a PassiveContainer>,
    kept: bool,
    replacements: Vec<Clause>,
}

impl ForwardSimplificationPerformer for LoopPerformer<'_> {
    fn will_perform(&self, premise: usize) -> bool {
        self.active.contains(&premise) || self.passive.is_some_and(|p| p.contains(premise))
    }

    fn perform(&mut self, _premises: &[usize], replacement: Option<Clause>) {
        assert!(self.kept, "clause simplified after it was already removed");
        self.kept = false;
        self.replacements.extend(replacement);
    }

    fn clause_kept(&self) -> bool {
        self.kept
    }
}

pub struct SaturationAlgorithm {
    options: Options,
    signature: Signature,
    ordering: KBO,
    selector: Box<dyn LiteralSelector>,
    store: ClauseStore,
    unprocessed: VecDeque<usize>,
    passive: PassiveContainer,
    active: IndexSet<usize>,
    deactivated: IndexSet<usize>,
    /// Selected literal positions of active clauses
    selected: HashMap<usize, Vec<usize>>,
    indexes: IndexManager,
    simplifiers: Vec<Box<dyn ForwardSimplificationEngine>>,
    generators: Vec<Box<dyn GeneratingInferenceEngine>>,
    splitter: Option<ComponentSplitter>,
    limiter: Box<dyn ResourceLimiter>,
    statistics: Statistics,
    input: Vec<Arc<Clause>>,
    /// Some clause was dropped without being redundant
    incomplete: bool,
    result: Option<TerminationReason>,
}

impl SaturationAlgorithm {
    /// Build the loop and attach the engines `options` ask for.
    pub fn from_options(input: Vec<Arc<Clause>>, signature: Signature, options: Options) -> Result<Self> {
        let limiter: Box<dyn ResourceLimiter> = match options.saturation_algorithm {
            SaturationAlgorithmKind::Lrs => Box::new(LrsLimiter::new()),
            SaturationAlgorithmKind::Otter | SaturationAlgorithmKind::Discount => Box::new(NoLimits),
            SaturationAlgorithmKind::Tabulation => {
                return Err(ProverError::InvalidOptionValue {
                    option: "saturation_algorithm".into(),
                    value: "tabulation".into(),
                })
            }
        };

        let ordering = KBO::default();
        let mut indexes = IndexManager::new(ordering.clone());

        let mut simplifiers: Vec<Box<dyn ForwardSimplificationEngine>> =
            vec![Box::new(TautologyDeletion), Box::new(VariantDeletion::default())];
        if options.literal_rewriting {
            simplifiers.push(Box::new(ForwardLiteralRewriting::new()));
        }

        let mut generators: Vec<Box<dyn GeneratingInferenceEngine>> =
            vec![Box::new(BinaryResolution::new()), Box::new(Factoring)];
        let induction = options.structural_induction && signature.term_algebras().any(|ta| ta.is_recursive());
        if induction {
            generators.push(Box::new(StructuralInduction::new(
                options.structural_induction_kind,
                options.structural_induction_subterm_arity,
            )));
        }

        for engine in simplifiers.iter_mut() {
            engine.attach(&mut indexes);
        }
        for engine in generators.iter_mut() {
            engine.attach(&mut indexes);
        }

        Ok(SaturationAlgorithm {
            selector: selector_for(options.selection),
            passive: PassiveContainer::new(options.effective_age_weight_ratio()),
            splitter: options.splitting.then(ComponentSplitter::new),
            // Saturating with induction instances says nothing about the intended models
            incomplete: induction,
            options,
            signature,
            ordering,
            store: ClauseStore::new(),
            unprocessed: VecDeque::new(),
            active: IndexSet::new(),
            deactivated: IndexSet::new(),
            selected: HashMap::new(),
            indexes,
            simplifiers,
            generators,
            limiter,
            statistics: Statistics::default(),
            input,
            result: None,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn store(&self) -> &ClauseStore {
        &self.store
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn result(&self) -> Option<TerminationReason> {
        self.result
    }

    pub fn active(&self) -> &IndexSet<usize> {
        &self.active
    }

    pub fn passive(&self) -> &PassiveContainer {
        &self.passive
    }

    /// Literal positions selected when an active clause was activated.
    pub fn selected_literals(&self, idx: usize) -> Option<&[usize]> {
        self.selected.get(&idx).map(Vec::as_slice)
    }

    pub fn unprocessed_len(&self) -> usize {
        self.unprocessed.len()
    }

    /// Saturation without refutation proves satisfiability only if nothing
    /// was ever pruned.
    pub fn is_complete(&self) -> bool {
        !self.limiter.limits_ever_active() && !self.incomplete
    }

    /// Derivation of the empty clause, if one was found.
    pub fn proof(&self) -> Option<Vec<ProofStep>> {
        self.statistics.refutation.map(|idx| self.store.extract_proof(idx))
    }

    // =========================================================================
    // Main loop
    // =========================================================================

    /// Queue the input clauses. Must be called once before the first step.
    pub fn init(&mut self) -> Option<TerminationReason> {
        let input = std::mem::take(&mut self.input);
        self.statistics.input_clauses = input.len();
        for clause in input {
            if let Some(result) = self.add_new_clause(clause) {
                return Some(result);
            }
        }
        log::debug!(
            target: log_targets::SATURATION,
            "Initialised with {} clauses",
            self.statistics.input_clauses
        );
        None
    }

    /// One unit of work. `Some` once the run has terminated.
    pub fn step(&mut self, clock: &dyn Clock) -> Option<TerminationReason> {
        if self.result.is_some() {
            return self.result;
        }

        // === Step 1: Check memory ===
        if self.options.memory_limit > 0 && self.store.bytes() >= self.options.memory_limit * 1024 * 1024 {
            return self.finish(TerminationReason::MemoryLimit);
        }

        // === Step 2: Process one unprocessed clause ===
        if let Some(idx) = self.unprocessed.pop_front() {
            return self.process_unprocessed(idx, clock);
        }

        // === Step 3: Select given clause, or report saturation ===
        let Some(given) = self.passive.pop_selected() else {
            let reason = if self.is_complete() {
                TerminationReason::Satisfiable
            } else {
                TerminationReason::Unknown
            };
            return self.finish(reason);
        };
        self.statistics.passive_clauses = self.passive.len();

        // === Step 4: Activate and generate ===
        self.activate(given)
    }

    /// Run to termination, honouring the global time limit.
    pub fn saturate(&mut self) -> TerminationReason {
        let clock = StandaloneClock::new();
        if let Some(result) = self.init() {
            return result;
        }
        loop {
            if let Some(result) = self.step(&clock) {
                return result;
            }
            let limit_ms = u64::from(self.options.time_limit) * 100;
            if limit_ms > 0 && clock.global_elapsed_ms() >= limit_ms {
                if let Some(result) = self.finish(TerminationReason::TimeLimit) {
                    return result;
                }
            }
        }
    }

    /// Stop the run with `reason` unless it already stopped.
    pub fn finish(&mut self, reason: TerminationReason) -> Option<TerminationReason> {
        let result = *self.result.get_or_insert(reason);
        self.statistics.termination_reason = result;
        log::debug!(target: log_targets::SATURATION, "Terminated: {:?}", result);
        Some(result)
    }

    /// Take an active clause out of the search.
    pub fn deactivate(&mut self, idx: usize) -> bool {
        if !self.active.shift_remove(&idx) {
            return false;
        }
        self.indexes.on_remove(idx, self.store.get(idx));
        self.selected.remove(&idx);
        self.deactivated.insert(idx);
        self.statistics.deactivated += 1;
        self.statistics.active_clauses = self.active.len();
        true
    }

    /// Send a deactivated clause back through Unprocessed.
    pub fn reactivate(&mut self, idx: usize) -> bool {
        if !self.deactivated.shift_remove(&idx) {
            return false;
        }
        self.unprocessed.push_back(idx);
        self.statistics.reactivated += 1;
        true
    }

    // =========================================================================
    // Private helper methods
    // =========================================================================

    /// Store a new clause and queue it. The empty clause ends the run.
    fn add_new_clause(&mut self, clause: Arc<Clause>) -> Option<TerminationReason> {
        let idx = self.store.push(clause);
        if self.store.get(idx).is_empty() {
            self.statistics.refutation = Some(idx);
            log::info!(target: log_targets::SATURATION, "Refutation found at [{}]", idx);
            return self.finish(TerminationReason::Refutation);
        }
        self.unprocessed.push_back(idx);
        None
    }

    fn process_unprocessed(&mut self, idx: usize, clock: &dyn Clock) -> Option<TerminationReason> {
        if self
            .limiter
            .on_unprocessed_selected(&mut self.passive, self.active.len(), clock, &self.options)
        {
            self.statistics.lrs_limit_updates += 1;
            for purged in self.passive.purge_exceeding() {
                self.indexes.on_remove(purged, self.store.get(purged));
                self.statistics.discarded_non_redundant_clauses += 1;
            }
        }

        let clause = Arc::clone(self.store.get(idx));
        if clause.len() > self.options.max_clause_size {
            self.statistics.discarded_by_size += 1;
            self.incomplete = true;
            return None;
        }

        let (kept, replacements) = self.forward_simplify(idx);
        for replacement in replacements {
            if let Some(result) = self.add_new_clause(Arc::new(replacement)) {
                return Some(result);
            }
        }
        if !kept {
            return None;
        }

        if let Some(splitter) = self.splitter.as_mut() {
            if let Some(split) = splitter.split(idx, &clause, &mut self.signature) {
                self.statistics.split_clauses += 1;
                self.statistics.split_components += split.components;
                for part in std::iter::once(split.clause).chain(split.definitions) {
                    if let Some(result) = self.add_new_clause(Arc::new(part)) {
                        return Some(result);
                    }
                }
                return None;
            }
        }

        if !self.passive.add(idx, clause.age, clause.weight()) {
            self.statistics.discarded_non_redundant_clauses += 1;
            return None;
        }
        self.indexes.on_passive(idx, &clause);
        self.statistics.passive_clauses = self.passive.len();
        None
    }

    /// Run forward simplifiers until one removes the clause.
    fn forward_simplify(&mut self, idx: usize) -> (bool, Vec<Clause>) {
        let simplify_with_passive = self.options.saturation_algorithm != SaturationAlgorithmKind::Discount;
        let env = SimplificationEnv {
            store: &self.store,
            indexes: &self.indexes,
            ordering: &self.ordering,
            signature: &self.signature,
        };
        let mut performer = LoopPerformer {
            active: &self.active,
            passive: simplify_with_passive.then_some(&self.passive),
            kept: true,
            replacements: Vec::new(),
        };
        for engine in self.simplifiers.iter_mut() {
            engine.perform(idx, &env, &mut self.statistics, &mut performer);
            if !performer.clause_kept() {
                break;
            }
        }
        (performer.kept, performer.replacements)
    }

    fn activate(&mut self, given: usize) -> Option<TerminationReason> {
        let clause = Arc::clone(self.store.get(given));
        let selected = self.selector.select(&clause, &self.ordering);
        self.active.insert(given);
        self.indexes.on_activate(given, &clause, &selected);
        self.selected.insert(given, selected.clone());
        self.statistics.activations += 1;
        self.statistics.active_clauses = self.active.len();
        log::trace!(
            target: log_targets::SATURATION,
            "[{}] activated: {}",
            given,
            clause.display(&self.signature.interner)
        );

        let mut generated = Vec::new();
        let mut env = InferenceEnv {
            store: &self.store,
            indexes: &self.indexes,
            ordering: &self.ordering,
            signature: &mut self.signature,
            statistics: &mut self.statistics,
            options: &self.options,
        };
        for engine in self.generators.iter_mut() {
            generated.extend(engine.generate_clauses(given, &selected, &mut env));
        }

        self.statistics.generated_clauses += generated.len();
        for clause in generated {
            if let Some(result) = self.add_new_clause(Arc::new(clause)) {
                return Some(result);
            }
        }
        None
    }
}

impl Drop for SaturationAlgorithm {
    fn drop(&mut self) {
        for engine in self.simplifiers.iter_mut().rev() {
            engine.detach(&mut self.indexes);
        }
        for engine in self.generators.iter_mut().rev() {
            engine.detach(&mut self.indexes);
        }
    }
}

impl std::fmt::Debug for SaturationAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaturationAlgorithm")
            .field("algorithm", &self.options.saturation_algorithm)
            .field("unprocessed", &self.unprocessed.len())
            .field("passive", &self.passive.len())
            .field("active", &self.active.len())
            .field("result", &self.result)
            .finish()
    }
}
