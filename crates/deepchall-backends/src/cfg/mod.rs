//! Context-free grammar backend.
//!
//! Wraps a [`Grammar`] with a derivation depth bound. Generation yields the
//! terminal strings of derivations up to that depth; recognition runs an
//! Earley recogniser over the sample decoded through the terminal table.

mod earley;
mod generate;
mod grammar;

pub use generate::Derivations;
pub use grammar::{Grammar, GrammarSymbol, NonTerminalId, Production};

use deepchall_core::{Backend, BackendInfo, Sample, SampleIter, Shape, Symbol};

use crate::error::BackendResult;

/// Grammar-backed language.
///
/// ```
/// use deepchall_backends::Cfg;
/// use deepchall_core::{Backend, Sample};
///
/// let cfg = Cfg::new("S -> '0' S '1' |", Some(2)).unwrap();
/// let samples: Vec<Sample> = cfg.generate(None).collect();
/// assert_eq!(samples, vec![Sample::from(vec![0, 1]), Sample::empty()]);
/// assert!(cfg.parse(&Sample::from(vec![0, 0, 1, 1])));
/// ```
#[derive(Debug, Clone)]
pub struct Cfg {
    grammar: Grammar,
    max_depth: Option<usize>,
    shape: Shape,
}

impl Cfg {
    /// Backend kind name.
    pub const NAME: &'static str = "cfg";

    /// Backend kind description.
    pub const DESCRIPTION: &'static str =
        "Context-free grammar enumerated by bounded-depth derivation, recognised with Earley";

    /// Static metadata for the registry.
    pub fn info() -> BackendInfo {
        BackendInfo {
            name: Self::NAME,
            description: Self::DESCRIPTION,
            shape: Shape::sequence(),
        }
    }

    /// Build from grammar text, numbering terminals by first appearance.
    pub fn new(grammar: &str, max_depth: Option<usize>) -> BackendResult<Self> {
        Ok(Self::from_grammar(Grammar::parse(grammar)?, max_depth))
    }

    /// Build from grammar text whose terminals must belong to `alphabet`.
    ///
    /// Terminal `alphabet[i]` is encoded as symbol `i`.
    pub fn with_alphabet<S: AsRef<str>>(
        grammar: &str,
        alphabet: &[S],
        max_depth: Option<usize>,
    ) -> BackendResult<Self> {
        Ok(Self::from_grammar(
            Grammar::parse_with_alphabet(grammar, alphabet)?,
            max_depth,
        ))
    }

    /// Wrap an already-built grammar.
    pub fn from_grammar(grammar: Grammar, max_depth: Option<usize>) -> Self {
        Self {
            grammar,
            max_depth,
            shape: Shape::sequence(),
        }
    }

    /// The underlying grammar.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Derivation depth bound, `None` when unbounded.
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Encode terminals, `None` if any terminal is unknown.
    pub fn encode<S: AsRef<str>>(&self, terminals: &[S]) -> Option<Sample> {
        terminals
            .iter()
            .map(|t| self.grammar.symbol(t.as_ref()))
            .collect::<Option<Vec<Symbol>>>()
            .map(Sample::from)
    }

    /// Decode a sample, `None` if any symbol has no terminal.
    pub fn decode(&self, sample: &Sample) -> Option<Vec<&str>> {
        sample
            .symbols()
            .iter()
            .map(|&s| self.grammar.terminal(s))
            .collect()
    }
}

impl Backend for Cfg {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn alphabet_size(&self) -> usize {
        self.grammar.terminal_count()
    }

    fn generate(&self, max_length: Option<usize>) -> SampleIter<'_> {
        Box::new(Derivations::new(&self.grammar, self.max_depth, max_length))
    }

    fn parse(&self, sample: &Sample) -> bool {
        if !sample.within_alphabet(self.grammar.terminal_count()) {
            return false;
        }
        earley::recognize(&self.grammar, sample.symbols())
    }
}
