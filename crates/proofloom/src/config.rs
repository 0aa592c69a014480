//! Prover options and strategy-code decoding.
//!
//! Options are plain typed fields. The string interface (`set`/`get` by
//! option name, with short aliases) exists for strategy codes and for
//! copying whitelisted settings between portfolio slices.
//!
//! A strategy code looks like `lrs+21_3:1_flr=on:si=on_300`:
//! saturation algorithm and literal selection, then the age:weight ratio,
//! then `name=value` pairs joined by `:`, then the local time limit in
//! deciseconds. The option and time sections are optional.

use crate::error::{ProverError, Result};
use serde::{Deserialize, Serialize};

/// Saturation loop flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaturationAlgorithmKind {
    /// Simplify against active and passive clauses
    Otter,
    /// Passive clauses are not used for simplification
    Discount,
    /// Otter with limited-resource pruning of passive clauses
    Lrs,
    /// Legacy tabulation; only accepted to recognise and reject it
    Tabulation,
}

/// Literal selection strategies (numbers match the `selection` option)
///
/// - Sel0: Select all literals
/// - Sel20: Select all maximal literals
/// - Sel21: Select unique maximal, else max-weight negative, else all maximal
/// - Sel22: Select max-weight negative literal, else all maximal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralSelectionStrategy {
    Sel0,
    Sel20,
    Sel21,
    Sel22,
}

/// Which polarity of ground literal structural induction fires on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InductionKind {
    Positive,
    Negative,
    Both,
}

impl InductionKind {
    pub fn admits(self, polarity: bool) -> bool {
        match self {
            InductionKind::Positive => polarity,
            InductionKind::Negative => !polarity,
            InductionKind::Both => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SineSelection {
    Off,
    Axioms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionDefinitionElimination {
    None,
    Unused,
    All,
}

/// (long name, short name)
const OPTION_NAMES: &[(&str, &str)] = &[
    ("saturation_algorithm", "sa"),
    ("selection", "s"),
    ("age_weight_ratio", "awr"),
    ("time_limit", "t"),
    ("local_time_limit", "ltl"),
    ("simulated_time_limit", "stl"),
    ("lrs_first_time_check", "lftc"),
    ("memory_limit", "m"),
    ("max_clause_size", "mcs"),
    ("literal_rewriting", "flr"),
    ("structural_induction", "si"),
    ("structural_induction_kind", "sik"),
    ("structural_induction_subterm_arity", "sisa"),
    ("splitting", "spl"),
    ("satisfiable_is_success", "sis"),
    ("time_slice", "ts"),
    ("function_definition_elimination", "fde"),
    ("general_splitting", "gsp"),
    ("unused_predicate_definition_removal", "updr"),
    ("sine_depth", "sd"),
    ("sine_generality_threshold", "sgt"),
    ("sine_selection", "ss"),
    ("sine_tolerance", "st"),
    ("naming", "nm"),
    ("inequality_splitting", "ins"),
    ("ignore_missing", "im"),
    ("decode", "dec"),
];

fn canonical_name(name: &str) -> Option<&'static str> {
    OPTION_NAMES
        .iter()
        .find(|(long, short)| *long == name || *short == name)
        .map(|(long, _)| *long)
}

fn invalid(option: &str, value: &str) -> ProverError {
    ProverError::InvalidOptionValue {
        option: option.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(option: &str, value: &str) -> Result<bool> {
    match value {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        _ => Err(invalid(option, value)),
    }
}

fn parse_number<T: std::str::FromStr>(option: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| invalid(option, value))
}

fn parse_choice<T: Copy>(option: &str, value: &str, table: &[(&str, T)]) -> Result<T> {
    table
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, v)| *v)
        .ok_or_else(|| invalid(option, value))
}

fn choice_name<T: PartialEq>(value: T, table: &[(&'static str, T)]) -> &'static str {
    table
        .iter()
        .find(|(_, v)| *v == value)
        .map(|(name, _)| *name)
        .unwrap_or("?")
}

const ALGORITHMS: &[(&str, SaturationAlgorithmKind)] = &[
    ("otter", SaturationAlgorithmKind::Otter),
    ("discount", SaturationAlgorithmKind::Discount),
    ("lrs", SaturationAlgorithmKind::Lrs),
    ("tabulation", SaturationAlgorithmKind::Tabulation),
];

/// Prefixes used in strategy codes
const ALGORITHM_CODES: &[(&str, SaturationAlgorithmKind)] = &[
    ("ott", SaturationAlgorithmKind::Otter),
    ("dis", SaturationAlgorithmKind::Discount),
    ("lrs", SaturationAlgorithmKind::Lrs),
    ("tab", SaturationAlgorithmKind::Tabulation),
];

const SELECTIONS: &[(&str, LiteralSelectionStrategy)] = &[
    ("0", LiteralSelectionStrategy::Sel0),
    ("20", LiteralSelectionStrategy::Sel20),
    ("21", LiteralSelectionStrategy::Sel21),
    ("22", LiteralSelectionStrategy::Sel22),
];

const INDUCTION_KINDS: &[(&str, InductionKind)] = &[
    ("positive", InductionKind::Positive),
    ("negative", InductionKind::Negative),
    ("both", InductionKind::Both),
];

const SINE_SELECTIONS: &[(&str, SineSelection)] =
    &[("off", SineSelection::Off), ("axioms", SineSelection::Axioms)];

const FDE_MODES: &[(&str, FunctionDefinitionElimination)] = &[
    ("none", FunctionDefinitionElimination::None),
    ("unused", FunctionDefinitionElimination::Unused),
    ("all", FunctionDefinitionElimination::All),
];

/// Strategy configuration for one saturation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub saturation_algorithm: SaturationAlgorithmKind,
    pub selection: LiteralSelectionStrategy,
    /// (age, weight)
    pub age_weight_ratio: (u32, u32),
    /// Global limit in deciseconds, 0 for none
    pub time_limit: u32,
    /// Per-strategy limit in deciseconds, 0 for the global limit
    pub local_time_limit: u32,
    /// Time limit the LRS pretends to have, deciseconds, 0 for none
    pub simulated_time_limit: u32,
    /// Percentage of the time limit to spend before the first LRS estimate
    pub lrs_first_time_check: u32,
    /// Megabytes, 0 for none
    pub memory_limit: usize,
    pub max_clause_size: usize,
    pub literal_rewriting: bool,
    pub structural_induction: bool,
    pub structural_induction_kind: InductionKind,
    /// Largest head arity of an induction subterm, -1 for unbounded
    pub structural_induction_subterm_arity: i32,
    pub splitting: bool,
    pub satisfiable_is_success: bool,
    /// Context time slice in hundredths of a second
    pub time_slice: u32,
    pub function_definition_elimination: FunctionDefinitionElimination,
    pub general_splitting: bool,
    pub unused_predicate_definition_removal: bool,
    pub sine_depth: u32,
    pub sine_generality_threshold: u32,
    pub sine_selection: SineSelection,
    pub sine_tolerance: f32,
    pub naming: u32,
    pub inequality_splitting: u32,
    /// Unknown options in a strategy code are skipped instead of rejected
    pub ignore_missing: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            saturation_algorithm: SaturationAlgorithmKind::Lrs,
            selection: LiteralSelectionStrategy::Sel21,
            age_weight_ratio: (1, 1),
            time_limit: 600,
            local_time_limit: 0,
            simulated_time_limit: 0,
            lrs_first_time_check: 5,
            memory_limit: 0,
            max_clause_size: 100,
            literal_rewriting: false,
            structural_induction: false,
            structural_induction_kind: InductionKind::Both,
            structural_induction_subterm_arity: -1,
            splitting: false,
            satisfiable_is_success: false,
            time_slice: 10,
            function_definition_elimination: FunctionDefinitionElimination::All,
            general_splitting: false,
            unused_predicate_definition_removal: true,
            sine_depth: 0,
            sine_generality_threshold: 0,
            sine_selection: SineSelection::Off,
            sine_tolerance: 1.0,
            naming: 8,
            inequality_splitting: 3,
            ignore_missing: false,
        }
    }
}

impl Options {
    /// Set an option by long or short name.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let option = canonical_name(name).ok_or_else(|| ProverError::UnknownOption(name.to_string()))?;
        match option {
            "saturation_algorithm" => {
                self.saturation_algorithm = parse_choice(option, value, ALGORITHMS)?;
            }
            "selection" => self.selection = parse_choice(option, value, SELECTIONS)?,
            "age_weight_ratio" => self.age_weight_ratio = parse_ratio(option, value)?,
            "time_limit" => self.time_limit = parse_number(option, value)?,
            "local_time_limit" => self.local_time_limit = parse_number(option, value)?,
            "simulated_time_limit" => self.simulated_time_limit = parse_number(option, value)?,
            "lrs_first_time_check" => {
                let percent: u32 = parse_number(option, value)?;
                if percent > 100 {
                    return Err(invalid(option, value));
                }
                self.lrs_first_time_check = percent;
            }
            "memory_limit" => self.memory_limit = parse_number(option, value)?,
            "max_clause_size" => self.max_clause_size = parse_number(option, value)?,
            "literal_rewriting" => self.literal_rewriting = parse_bool(option, value)?,
            "structural_induction" => self.structural_induction = parse_bool(option, value)?,
            "structural_induction_kind" => {
                self.structural_induction_kind = parse_choice(option, value, INDUCTION_KINDS)?;
            }
            "structural_induction_subterm_arity" => {
                let arity: i32 = parse_number(option, value)?;
                if arity < -1 {
                    return Err(invalid(option, value));
                }
                self.structural_induction_subterm_arity = arity;
            }
            "splitting" => self.splitting = parse_bool(option, value)?,
            "satisfiable_is_success" => self.satisfiable_is_success = parse_bool(option, value)?,
            "time_slice" => {
                let slice: u32 = parse_number(option, value)?;
                if slice == 0 {
                    return Err(invalid(option, value));
                }
                self.time_slice = slice;
            }
            "function_definition_elimination" => {
                self.function_definition_elimination = parse_choice(option, value, FDE_MODES)?;
            }
            "general_splitting" => self.general_splitting = parse_bool(option, value)?,
            "unused_predicate_definition_removal" => {
                self.unused_predicate_definition_removal = parse_bool(option, value)?;
            }
            "sine_depth" => self.sine_depth = parse_number(option, value)?,
            "sine_generality_threshold" => self.sine_generality_threshold = parse_number(option, value)?,
            "sine_selection" => self.sine_selection = parse_choice(option, value, SINE_SELECTIONS)?,
            "sine_tolerance" => {
                let tolerance: f32 = parse_number(option, value)?;
                if tolerance < 1.0 {
                    return Err(invalid(option, value));
                }
                self.sine_tolerance = tolerance;
            }
            "naming" => self.naming = parse_number(option, value)?,
            "inequality_splitting" => self.inequality_splitting = parse_number(option, value)?,
            "ignore_missing" => self.ignore_missing = parse_bool(option, value)?,
            "decode" => self.decode(value)?,
            _ => return Err(ProverError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    /// Current value of an option in the form `set` accepts.
    pub fn get(&self, name: &str) -> Result<String> {
        let option = canonical_name(name).ok_or_else(|| ProverError::UnknownOption(name.to_string()))?;
        let on_off = |b: bool| if b { "on" } else { "off" }.to_string();
        Ok(match option {
            "saturation_algorithm" => choice_name(self.saturation_algorithm, ALGORITHMS).to_string(),
            "selection" => choice_name(self.selection, SELECTIONS).to_string(),
            "age_weight_ratio" => format!("{}:{}", self.age_weight_ratio.0, self.age_weight_ratio.1),
            "time_limit" => self.time_limit.to_string(),
            "local_time_limit" => self.local_time_limit.to_string(),
            "simulated_time_limit" => self.simulated_time_limit.to_string(),
            "lrs_first_time_check" => self.lrs_first_time_check.to_string(),
            "memory_limit" => self.memory_limit.to_string(),
            "max_clause_size" => self.max_clause_size.to_string(),
            "literal_rewriting" => on_off(self.literal_rewriting),
            "structural_induction" => on_off(self.structural_induction),
            "structural_induction_kind" => {
                choice_name(self.structural_induction_kind, INDUCTION_KINDS).to_string()
            }
            "structural_induction_subterm_arity" => self.structural_induction_subterm_arity.to_string(),
            "splitting" => on_off(self.splitting),
            "satisfiable_is_success" => on_off(self.satisfiable_is_success),
            "time_slice" => self.time_slice.to_string(),
            "function_definition_elimination" => {
                choice_name(self.function_definition_elimination, FDE_MODES).to_string()
            }
            "general_splitting" => on_off(self.general_splitting),
            "unused_predicate_definition_removal" => on_off(self.unused_predicate_definition_removal),
            "sine_depth" => self.sine_depth.to_string(),
            "sine_generality_threshold" => self.sine_generality_threshold.to_string(),
            "sine_selection" => choice_name(self.sine_selection, SINE_SELECTIONS).to_string(),
            "sine_tolerance" => self.sine_tolerance.to_string(),
            "naming" => self.naming.to_string(),
            "inequality_splitting" => self.inequality_splitting.to_string(),
            "ignore_missing" => on_off(self.ignore_missing),
            _ => return Err(ProverError::UnknownOption(name.to_string())),
        })
    }

    /// Copy one option's value from `other`.
    pub fn copy_from(&mut self, other: &Options, name: &str) -> Result<()> {
        let value = other.get(name)?;
        self.set(name, &value)
    }

    /// Apply a strategy code on top of the current values.
    pub fn decode(&mut self, code: &str) -> Result<()> {
        let bad = |reason: &str| ProverError::InvalidStrategyCode {
            code: code.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = code.split('_').collect();
        if segments.len() < 2 {
            return Err(bad("expected at least algorithm and age:weight ratio"));
        }

        let head = segments[0];
        let sign_at = head
            .find(['+', '-'])
            .ok_or_else(|| bad("missing selection sign"))?;
        let (algorithm, selection) = (&head[..sign_at], &head[sign_at + 1..]);
        self.saturation_algorithm = ALGORITHM_CODES
            .iter()
            .find(|(prefix, _)| *prefix == algorithm)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| bad("unknown saturation algorithm"))?;
        self.selection = parse_choice("selection", selection, SELECTIONS)
            .map_err(|_| bad("unknown literal selection"))?;
        self.age_weight_ratio =
            parse_ratio("age_weight_ratio", segments[1]).map_err(|_| bad("bad age:weight ratio"))?;

        let mut rest = &segments[2..];
        if let Some((last, init)) = rest.split_last() {
            if !last.is_empty() && last.chars().all(|c| c.is_ascii_digit()) {
                self.local_time_limit = parse_number("local_time_limit", last)?;
                rest = init;
            }
        }

        let joined = rest.join("_");
        for pair in joined.split(':').filter(|p| !p.is_empty()) {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| bad("option without value"))?;
            match self.set(name, value) {
                Err(ProverError::UnknownOption(_)) if self.ignore_missing => {
                    log::warn!(target: crate::log_targets::PORTFOLIO, "Ignoring unknown option {name} in {code}");
                }
                other => other?,
            }
        }
        Ok(())
    }

    pub fn set_function_definition_elimination(&mut self, mode: FunctionDefinitionElimination) {
        self.function_definition_elimination = mode;
    }

    pub fn set_general_splitting(&mut self, on: bool) {
        self.general_splitting = on;
    }

    pub fn set_sine_selection(&mut self, selection: SineSelection) {
        self.sine_selection = selection;
    }

    /// Per-strategy limit in deciseconds with 0 resolved to the global limit.
    pub fn effective_local_time_limit(&self) -> u32 {
        match self.local_time_limit {
            0 => self.time_limit,
            limit => limit,
        }
    }

    /// Age and weight picks, never both zero.
    pub fn effective_age_weight_ratio(&self) -> (u32, u32) {
        match self.age_weight_ratio {
            (0, 0) => (1, 1),
            ratio => ratio,
        }
    }
}

fn parse_ratio(option: &str, value: &str) -> Result<(u32, u32)> {
    let ratio = match value.split_once(':') {
        Some((age, weight)) => (parse_number(option, age)?, parse_number(option, weight)?),
        None => (parse_number(option, value)?, 1),
    };
    if ratio == (0, 0) {
        return Err(invalid(option, value));
    }
    Ok(ratio)
}

/// Current process RSS in MB, where the platform exposes it.
pub fn process_memory_mb() -> Option<usize> {
    #[cfg(target_os = "linux")]
    {
        let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
        let rss_pages: usize = statm.split_whitespace().nth(1)?.parse().ok()?;
        Some(rss_pages * 4096 / (1024 * 1024))
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_by_short_and_long_name() {
        let mut opts = Options::default();
        opts.set("flr", "on").unwrap();
        opts.set("structural_induction_kind", "negative").unwrap();
        assert!(opts.literal_rewriting);
        assert_eq!(opts.structural_induction_kind, InductionKind::Negative);
        assert_eq!(opts.get("literal_rewriting").unwrap(), "on");
        assert!(matches!(opts.set("bogus", "1"), Err(ProverError::UnknownOption(_))));
        assert!(matches!(
            opts.set("selection", "7"),
            Err(ProverError::InvalidOptionValue { .. })
        ));
    }

    #[test]
    fn test_decode_full_code() {
        let mut opts = Options::default();
        opts.decode("dis+20_3:1_flr=on:spl=on:fde=none_300").unwrap();
        assert_eq!(opts.saturation_algorithm, SaturationAlgorithmKind::Discount);
        assert_eq!(opts.selection, LiteralSelectionStrategy::Sel20);
        assert_eq!(opts.age_weight_ratio, (3, 1));
        assert!(opts.literal_rewriting && opts.splitting);
        assert_eq!(opts.function_definition_elimination, FunctionDefinitionElimination::None);
        assert_eq!(opts.local_time_limit, 300);
    }

    #[test]
    fn test_decode_without_options_or_time() {
        let mut opts = Options::default();
        opts.decode("ott-0_2").unwrap();
        assert_eq!(opts.saturation_algorithm, SaturationAlgorithmKind::Otter);
        assert_eq!(opts.age_weight_ratio, (2, 1));
        assert_eq!(opts.local_time_limit, 0);
    }

    #[test]
    fn test_decode_unknown_option_respects_ignore_missing() {
        let mut strict = Options::default();
        assert!(strict.decode("lrs+21_1_xyz=3_100").is_err());

        let mut lenient = Options::default();
        lenient.set("ignore_missing", "on").unwrap();
        lenient.set("decode", "lrs+21_1_xyz=3:flr=on_100").unwrap();
        assert!(lenient.literal_rewriting);
        assert_eq!(lenient.local_time_limit, 100);
    }

    #[test]
    fn test_copy_from_round_trips_every_whitelisted_value() {
        let mut base = Options::default();
        base.sine_tolerance = 2.5;
        base.sine_selection = SineSelection::Axioms;
        let mut other = Options::default();
        for name in ["sine_tolerance", "sine_selection", "fde", "naming"] {
            other.copy_from(&base, name).unwrap();
        }
        assert_eq!(other.sine_tolerance, 2.5);
        assert_eq!(other.sine_selection, SineSelection::Axioms);
    }
}
