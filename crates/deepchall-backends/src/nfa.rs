//! Non-deterministic finite automaton backend.
//!
//! States live in an arena owned by [`Nfa`]; transitions refer to their
//! targets by [`StateId`], so cycles (including self loops) need no shared
//! ownership. A [`StateRef`] pairs the arena with one state index and exposes
//! the per-state API: terminal check, traversal, recognition and enumeration.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;

use deepchall_core::{Backend, BackendInfo, Sample, SampleIter, Shape, Symbol};
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::error::{BackendError, BackendResult};

/// Index of a state inside its automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub usize);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// A single automaton state.
#[derive(Debug, Clone, Default)]
pub struct State {
    /// Targets per input symbol. Duplicate targets are kept.
    transitions: BTreeMap<Symbol, Vec<StateId>>,
    /// Explicit terminal flag.
    terminal: bool,
}

impl State {
    /// A state is terminal when flagged so, or when it has no transitions.
    pub fn is_terminal(&self) -> bool {
        self.terminal || self.transitions.is_empty()
    }

    /// Targets reachable on `symbol` (possibly empty).
    pub fn traverse(&self, symbol: Symbol) -> &[StateId] {
        self.transitions
            .get(&symbol)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Outgoing transitions in ascending symbol order.
    pub fn transitions(&self) -> impl Iterator<Item = (Symbol, &[StateId])> {
        self.transitions.iter().map(|(s, t)| (*s, t.as_slice()))
    }
}

/// Arena-backed NFA over the alphabet `[0, alphabet_size)`.
///
/// The first state added is the start state unless [`Nfa::set_start`] says
/// otherwise.
///
/// ```
/// use deepchall_backends::Nfa;
/// use deepchall_core::{Backend, Sample};
///
/// let mut nfa = Nfa::new(2);
/// let a = nfa.add_state(true);
/// let b = nfa.add_state(false);
/// nfa.add_transition(a, 0, &[b]).unwrap();
/// nfa.add_transition(b, 1, &[a]).unwrap();
///
/// assert!(nfa.parse(&Sample::from(vec![0, 1, 0, 1])));
/// assert!(!nfa.parse(&Sample::from(vec![0])));
/// ```
#[derive(Debug, Clone)]
pub struct Nfa {
    states: Vec<State>,
    start: StateId,
    alphabet_size: usize,
    shape: Shape,
}

impl Nfa {
    /// Backend kind name.
    pub const NAME: &'static str = "fsm";

    /// Backend kind description.
    pub const DESCRIPTION: &'static str =
        "Non-deterministic finite state machine enumerated breadth-first";

    /// Static metadata for the registry.
    pub fn info() -> BackendInfo {
        BackendInfo {
            name: Self::NAME,
            description: Self::DESCRIPTION,
            shape: Shape::sequence(),
        }
    }

    /// Create an empty automaton over `alphabet_size` symbols.
    pub fn new(alphabet_size: usize) -> Self {
        Self {
            states: Vec::new(),
            start: StateId(0),
            alphabet_size,
            shape: Shape::sequence(),
        }
    }

    /// Add a state, returning its index.
    pub fn add_state(&mut self, terminal: bool) -> StateId {
        let id = StateId(self.states.len());
        self.states.push(State {
            transitions: BTreeMap::new(),
            terminal,
        });
        id
    }

    /// Add `count` states sharing the same terminal flag.
    pub fn add_states(&mut self, count: usize, terminal: bool) -> Vec<StateId> {
        (0..count).map(|_| self.add_state(terminal)).collect()
    }

    /// Choose the start state.
    pub fn set_start(&mut self, state: StateId) -> BackendResult<()> {
        self.check_state(state)?;
        self.start = state;
        Ok(())
    }

    /// Force the terminal flag of a state.
    pub fn set_terminal(&mut self, state: StateId, terminal: bool) -> BackendResult<()> {
        self.check_state(state)?;
        self.states[state.0].terminal = terminal;
        Ok(())
    }

    /// Append `targets` to the transitions of `from` on `symbol`.
    ///
    /// Existing targets for the same symbol are kept, so calling this twice
    /// with the same target records the transition twice.
    pub fn add_transition(
        &mut self,
        from: StateId,
        symbol: Symbol,
        targets: &[StateId],
    ) -> BackendResult<()> {
        self.check_state(from)?;
        for &t in targets {
            self.check_state(t)?;
        }
        if symbol as usize >= self.alphabet_size {
            return Err(BackendError::SymbolOutOfAlphabet {
                symbol,
                alphabet_size: self.alphabet_size,
            });
        }
        self.states[from.0]
            .transitions
            .entry(symbol)
            .or_default()
            .extend_from_slice(targets);
        Ok(())
    }

    /// Raw access to a state.
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.0)
    }

    /// Handle on a state of this automaton.
    pub fn handle(&self, id: StateId) -> Option<StateRef<'_>> {
        self.states.get(id.0).map(|_| StateRef { nfa: self, id })
    }

    /// Handle on the start state, `None` for an automaton without states.
    pub fn start(&self) -> Option<StateRef<'_>> {
        self.handle(self.start)
    }

    /// Convert to a petgraph graph, one edge per (symbol, target) pair.
    pub fn to_petgraph(&self) -> (DiGraph<StateLabel, Symbol>, Vec<NodeIndex>) {
        let mut graph = DiGraph::new();
        let indices: Vec<NodeIndex> = self
            .states
            .iter()
            .enumerate()
            .map(|(i, state)| {
                graph.add_node(StateLabel {
                    id: StateId(i),
                    start: StateId(i) == self.start,
                    terminal: state.is_terminal(),
                })
            })
            .collect();

        for (i, state) in self.states.iter().enumerate() {
            for (symbol, targets) in state.transitions() {
                for target in targets {
                    graph.add_edge(indices[i], indices[target.0], symbol);
                }
            }
        }

        (graph, indices)
    }

    fn check_state(&self, state: StateId) -> BackendResult<()> {
        if state.0 < self.states.len() {
            Ok(())
        } else {
            Err(BackendError::UnknownState { state })
        }
    }

    /// Backtracking recognition from `from`.
    ///
    /// Explores `(state, position)` pairs depth-first, first target first.
    /// A pair that was already explored cannot succeed the second time, so
    /// it is skipped.
    fn accepts(&self, from: StateId, input: &[Symbol]) -> bool {
        if input.iter().any(|&s| s as usize >= self.alphabet_size) {
            return false;
        }

        let mut visited: HashSet<(StateId, usize)> = HashSet::new();
        let mut stack = vec![(from, 0usize)];

        while let Some((id, pos)) = stack.pop() {
            if !visited.insert((id, pos)) {
                continue;
            }
            let state = &self.states[id.0];
            match input.get(pos) {
                None => {
                    if state.is_terminal() {
                        return true;
                    }
                }
                Some(&symbol) => {
                    for &target in state.traverse(symbol).iter().rev() {
                        stack.push((target, pos + 1));
                    }
                }
            }
        }

        false
    }
}

impl Backend for Nfa {
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
        self.alphabet_size
    }

    fn generate(&self, max_length: Option<usize>) -> SampleIter<'_> {
        match self.start() {
            Some(start) => Box::new(start.generate(max_length)),
            None => Box::new(std::iter::empty()),
        }
    }

    fn parse(&self, sample: &Sample) -> bool {
        self.start().is_some_and(|s| s.parse(sample.symbols()))
    }

    fn to_dot(&self) -> Option<String> {
        let (graph, _) = self.to_petgraph();
        Some(format!("{}", Dot::new(&graph)))
    }
}

/// Node weight used when exporting the automaton as a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLabel {
    pub id: StateId,
    pub start: bool,
    pub terminal: bool,
}

impl fmt::Display for StateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        match (self.start, self.terminal) {
            (true, true) => write!(f, " (start, terminal)"),
            (true, false) => write!(f, " (start)"),
            (false, true) => write!(f, " (terminal)"),
            (false, false) => Ok(()),
        }
    }
}

/// A state viewed through its owning automaton.
#[derive(Debug, Clone, Copy)]
pub struct StateRef<'a> {
    nfa: &'a Nfa,
    id: StateId,
}

impl<'a> StateRef<'a> {
    /// Index of this state.
    pub fn id(&self) -> StateId {
        self.id
    }

    fn state(&self) -> &'a State {
        &self.nfa.states[self.id.0]
    }

    /// Whether this state accepts the input consumed so far.
    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// States reachable on `symbol`, in insertion order.
    pub fn traverse(&self, symbol: Symbol) -> impl Iterator<Item = StateRef<'a>> + 'a {
        let nfa = self.nfa;
        self.state()
            .traverse(symbol)
            .iter()
            .map(move |&id| StateRef { nfa, id })
    }

    /// Whether `input` leads from this state to a terminal state.
    pub fn parse(&self, input: &[Symbol]) -> bool {
        self.nfa.accepts(self.id, input)
    }

    /// Breadth-first enumeration of accepted strings starting here.
    pub fn generate(&self, max_length: Option<usize>) -> NfaGenerator<'a> {
        NfaGenerator {
            nfa: self.nfa,
            queue: VecDeque::from([(Vec::new(), self.id)]),
            max_length,
            emitted: 0,
        }
    }
}

/// Lazy breadth-first enumerator over `(prefix, state)` pairs.
///
/// Prefixes come out in non-decreasing length order. Distinct paths spelling
/// the same string each produce a sample. Over a cyclic automaton the
/// sequence never ends unless `max_length` is set.
#[derive(Debug)]
pub struct NfaGenerator<'a> {
    nfa: &'a Nfa,
    queue: VecDeque<(Vec<Symbol>, StateId)>,
    max_length: Option<usize>,
    emitted: usize,
}

impl Iterator for NfaGenerator<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        while let Some((prefix, id)) = self.queue.pop_front() {
            let state = &self.nfa.states[id.0];

            // Children are one symbol longer; BFS order guarantees nothing
            // shorter is still waiting, so pruning here keeps the order.
            if self.max_length.is_none_or(|max| prefix.len() < max) {
                for (symbol, targets) in state.transitions() {
                    for &target in targets {
                        let mut next = Vec::with_capacity(prefix.len() + 1);
                        next.extend_from_slice(&prefix);
                        next.push(symbol);
                        self.queue.push_back((next, target));
                    }
                }
            }

            if state.is_terminal() {
                self.emitted += 1;
                return Some(Sample::from(prefix));
            }
        }

        debug!(emitted = self.emitted, "nfa enumeration exhausted");
        None
    }
}
