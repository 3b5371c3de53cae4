//! Language presets.
//!
//! A [`Language`] is a named, parameterised recipe for a backend. The runner
//! initialises it with merged run parameters and asks it for a fresh backend
//! for every run pair.

use deepchall_backends::{Cfg, Nfa};
use deepchall_core::{Backend, Shape};

use crate::error::OpsResult;
use crate::params::{ParamSpec, RunParams};

/// A named formal language with its tunable parameters.
pub trait Language {
    /// Preset name used in run configurations.
    fn name(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Number of symbols; every generated symbol is below this.
    fn alphabet_size(&self) -> usize;

    /// Shape of the samples this language produces.
    fn shape(&self) -> Shape {
        Shape::sequence()
    }

    /// Language-specific parameters and their defaults.
    fn params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Prepare for a run. `params` holds every declared parameter.
    fn init(&mut self, params: &RunParams) -> OpsResult<()> {
        let _ = params;
        Ok(())
    }

    /// Build the backend that generates and recognises this language.
    fn backend(&self) -> OpsResult<Box<dyn Backend>>;
}

// =============================================================================
// FSM presets
// =============================================================================

/// Three states in a cycle, all terminal.
#[derive(Debug, Default, Clone)]
pub struct ToyFsm;

impl Language for ToyFsm {
    fn name(&self) -> &'static str {
        "toy_fsm"
    }

    fn description(&self) -> &'static str {
        "Circular three-state automaton with a self-loop and a forward edge per state, all states terminal"
    }

    fn alphabet_size(&self) -> usize {
        3
    }

    fn backend(&self) -> OpsResult<Box<dyn Backend>> {
        let mut nfa = Nfa::new(self.alphabet_size());
        let s = nfa.add_states(3, true);
        nfa.add_transition(s[0], 0, &[s[0], s[1]])?;
        nfa.add_transition(s[1], 1, &[s[1], s[2]])?;
        nfa.add_transition(s[2], 2, &[s[2], s[0]])?;
        Ok(Box::new(nfa))
    }
}

/// Binary strings with an even number of ones.
#[derive(Debug, Default, Clone)]
pub struct ParityFsm;

impl Language for ParityFsm {
    fn name(&self) -> &'static str {
        "parity_fsm"
    }

    fn description(&self) -> &'static str {
        "Binary strings containing an even number of 1s"
    }

    fn alphabet_size(&self) -> usize {
        2
    }

    fn backend(&self) -> OpsResult<Box<dyn Backend>> {
        let mut nfa = Nfa::new(self.alphabet_size());
        let even = nfa.add_state(true);
        let odd = nfa.add_state(false);
        nfa.add_transition(even, 0, &[even])?;
        nfa.add_transition(even, 1, &[odd])?;
        nfa.add_transition(odd, 0, &[odd])?;
        nfa.add_transition(odd, 1, &[even])?;
        nfa.set_start(even)?;
        Ok(Box::new(nfa))
    }
}

// =============================================================================
// CFG presets
// =============================================================================

const MAX_DEPTH: &str = "max_depth";

/// `0^n 1^n` for every `n >= 0`.
#[derive(Debug, Clone)]
pub struct ToyCfg {
    max_depth: usize,
}

impl ToyCfg {
    const GRAMMAR: &'static str = "S -> '0' S '1' | ";
    const DEFAULT_DEPTH: usize = 20;
}

impl Default for ToyCfg {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_DEPTH,
        }
    }
}

impl Language for ToyCfg {
    fn name(&self) -> &'static str {
        "toy_cfg"
    }

    fn description(&self) -> &'static str {
        "Any number of 0s followed by the same number of 1s, e.g. 01, 0011, 000111"
    }

    fn alphabet_size(&self) -> usize {
        2
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::new(
            MAX_DEPTH,
            "Maximum expansion depth of the grammar",
            Self::DEFAULT_DEPTH,
        )]
    }

    fn init(&mut self, params: &RunParams) -> OpsResult<()> {
        self.max_depth = params.usize(MAX_DEPTH)?;
        Ok(())
    }

    fn backend(&self) -> OpsResult<Box<dyn Backend>> {
        let cfg = Cfg::with_alphabet(Self::GRAMMAR, &["0", "1"], Some(self.max_depth))?;
        Ok(Box::new(cfg))
    }
}

/// Balanced strings over two kinds of brackets.
#[derive(Debug, Clone)]
pub struct DyckCfg {
    max_depth: usize,
}

impl DyckCfg {
    const GRAMMAR: &'static str = "\
S -> '(' S ')' S
   | '[' S ']' S
   |
";
    const ALPHABET: [&'static str; 4] = ["(", ")", "[", "]"];
    const DEFAULT_DEPTH: usize = 5;
}

impl Default for DyckCfg {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_DEPTH,
        }
    }
}

impl Language for DyckCfg {
    fn name(&self) -> &'static str {
        "dyck_cfg"
    }

    fn description(&self) -> &'static str {
        "Balanced strings of round and square brackets, symbols ( ) [ ] as 0 1 2 3"
    }

    fn alphabet_size(&self) -> usize {
        Self::ALPHABET.len()
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::new(
            MAX_DEPTH,
            "Maximum expansion depth of the grammar",
            Self::DEFAULT_DEPTH,
        )]
    }

    fn init(&mut self, params: &RunParams) -> OpsResult<()> {
        self.max_depth = params.usize(MAX_DEPTH)?;
        Ok(())
    }

    fn backend(&self) -> OpsResult<Box<dyn Backend>> {
        let cfg = Cfg::with_alphabet(Self::GRAMMAR, &Self::ALPHABET, Some(self.max_depth))?;
        Ok(Box::new(cfg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepchall_core::Sample;

    fn collect(lang: &dyn Language, max_length: Option<usize>, limit: usize) -> Vec<Sample> {
        let backend = lang.backend().unwrap();
        backend.generate(max_length).take(limit).collect()
    }

    #[test]
    fn test_toy_fsm_starts_with_short_strings() {
        let samples = collect(&ToyFsm, None, 4);
        assert_eq!(samples[0], Sample::empty());
        assert_eq!(samples[1], Sample::from(vec![0]));
        assert_eq!(samples[2], Sample::from(vec![0]));
        assert_eq!(samples[3].len(), 2);
    }

    #[test]
    fn test_toy_fsm_rejects_skipping_a_state() {
        let backend = ToyFsm.backend().unwrap();
        assert!(backend.parse(&Sample::from(vec![0, 1, 2, 0])));
        assert!(!backend.parse(&Sample::from(vec![0, 2])));
        assert!(!backend.parse(&Sample::from(vec![1])));
    }

    #[test]
    fn test_parity_fsm() {
        let backend = ParityFsm.backend().unwrap();
        assert!(backend.parse(&Sample::empty()));
        assert!(backend.parse(&Sample::from(vec![1, 0, 1])));
        assert!(!backend.parse(&Sample::from(vec![1, 0, 0])));
        for sample in backend.generate(Some(4)) {
            let ones = sample.symbols().iter().filter(|&&s| s == 1).count();
            assert_eq!(ones % 2, 0, "{sample}");
        }
    }

    #[test]
    fn test_toy_cfg_honours_max_depth() {
        let mut lang = ToyCfg::default();
        lang.init(&RunParams::new().with(MAX_DEPTH, 3)).unwrap();
        let samples = collect(&lang, None, usize::MAX);
        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(|s| s.len() <= 4));
    }

    #[test]
    fn test_cfg_init_requires_depth() {
        let mut lang = DyckCfg::default();
        assert!(lang.init(&RunParams::new()).is_err());
        assert!(lang.init(&RunParams::new().with(MAX_DEPTH, "deep")).is_err());
    }

    #[test]
    fn test_dyck_cfg_generates_balanced_strings() {
        let mut lang = DyckCfg::default();
        lang.init(&RunParams::new().with(MAX_DEPTH, 4)).unwrap();
        let backend = lang.backend().unwrap();
        assert_eq!(backend.alphabet_size(), 4);
        for sample in backend.generate(Some(6)) {
            assert!(sample.len() % 2 == 0);
            assert!(backend.parse(&sample), "{sample}");
        }
        assert!(!backend.parse(&Sample::from(vec![0, 3])));
        assert!(backend.parse(&Sample::from(vec![0, 2, 3, 1])));
    }

    #[test]
    fn test_presets_declare_sequence_shape() {
        let langs: Vec<Box<dyn Language>> = vec![
            Box::new(ToyFsm),
            Box::new(ParityFsm),
            Box::new(ToyCfg::default()),
            Box::new(DyckCfg::default()),
        ];
        for lang in langs {
            let backend = lang.backend().unwrap();
            lang.shape().check_compatible(backend.shape()).unwrap();
            assert!(backend.alphabet_size() <= lang.alphabet_size());
        }
    }
}
