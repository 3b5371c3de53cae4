//! Lazy enumeration of grammar derivations.
//!
//! Expansion is leftmost and depth-first, alternatives in declaration order.
//! Every item of a derivation tree costs one level of depth: the start symbol
//! gets the whole budget and each right-hand-side item of an expansion gets
//! one less. An item reached with no budget left cannot be emitted.

use deepchall_core::{Sample, Symbol};
use tracing::debug;

use super::grammar::{Grammar, GrammarSymbol};

/// Partial leftmost derivation.
#[derive(Debug, Clone)]
struct Frame {
    /// Terminals emitted so far.
    output: Vec<Symbol>,
    /// Items still to expand, next item last, each with its depth budget.
    pending: Vec<(GrammarSymbol, usize)>,
    /// Shortest length the pending items can still add.
    pending_min: usize,
    /// Smallest budget consumed so far.
    min_budget: usize,
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    /// Every derivation of depth at most the bound.
    Bounded,
    /// Iterative deepening: derivations of depth exactly `level`.
    Deepening { level: usize, cut: bool },
}

/// Lazy iterator over the terminal strings of a grammar.
///
/// With a depth bound it is a depth-first walk with a cutoff. Without one it
/// deepens one level at a time, emitting only derivations whose depth equals
/// the current level, and stops once a level leaves no branch cut short.
#[derive(Debug)]
pub struct Derivations<'g> {
    grammar: &'g Grammar,
    stack: Vec<Frame>,
    mode: Mode,
    max_length: Option<usize>,
    emitted: usize,
}

impl<'g> Derivations<'g> {
    /// Enumerate derivations of depth at most `max_depth` (unbounded if `None`)
    /// whose terminal string is at most `max_length` long.
    pub fn new(grammar: &'g Grammar, max_depth: Option<usize>, max_length: Option<usize>) -> Self {
        let (mode, budget) = match max_depth {
            Some(depth) => (Mode::Bounded, depth),
            None => (Mode::Deepening { level: 1, cut: false }, 1),
        };
        let mut derivations = Self {
            grammar,
            stack: Vec::new(),
            mode,
            max_length,
            emitted: 0,
        };
        derivations.seed(budget);
        derivations
    }

    fn seed(&mut self, budget: usize) {
        let start = GrammarSymbol::NonTerminal(self.grammar.start());
        let frame = Frame {
            output: Vec::new(),
            pending: vec![(start, budget)],
            pending_min: self.grammar.min_yield(start),
            min_budget: budget,
        };
        if self.fits(&frame) {
            self.stack.push(frame);
        }
    }

    /// False when every completion of `frame` is too long, or none exists.
    fn fits(&self, frame: &Frame) -> bool {
        if frame.pending_min == usize::MAX {
            return false;
        }
        match self.max_length {
            Some(max) => frame.output.len() + frame.pending_min <= max,
            None => true,
        }
    }

    fn note_cut(&mut self) {
        if let Mode::Deepening { cut, .. } = &mut self.mode {
            *cut = true;
        }
    }

    /// Move to the next depth level, `false` once enumeration is complete.
    fn deepen(&mut self) -> bool {
        match &mut self.mode {
            Mode::Deepening { level, cut } if *cut => {
                *level += 1;
                *cut = false;
                let budget = *level;
                self.seed(budget);
                true
            }
            _ => false,
        }
    }

    fn accepts_complete(&self, frame: &Frame) -> bool {
        match self.mode {
            Mode::Bounded => true,
            Mode::Deepening { .. } => frame.min_budget == 1,
        }
    }
}

impl Iterator for Derivations<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        loop {
            let Some(mut frame) = self.stack.pop() else {
                if self.deepen() {
                    continue;
                }
                debug!(emitted = self.emitted, "grammar enumeration exhausted");
                return None;
            };

            let Some((item, budget)) = frame.pending.pop() else {
                if self.accepts_complete(&frame) {
                    self.emitted += 1;
                    return Some(Sample::from(frame.output));
                }
                continue;
            };

            if budget == 0 {
                self.note_cut();
                continue;
            }
            frame.min_budget = frame.min_budget.min(budget);
            frame.pending_min -= self.grammar.min_yield(item);

            match item {
                GrammarSymbol::Terminal(symbol) => {
                    frame.output.push(symbol);
                    if self.fits(&frame) {
                        self.stack.push(frame);
                    }
                }
                GrammarSymbol::NonTerminal(nt) => {
                    // reversed so the first alternative is expanded first
                    for &p in self.grammar.productions_of(nt).iter().rev() {
                        let added = self.grammar.production_min_yield(p);
                        if added == usize::MAX {
                            continue;
                        }
                        let mut next = frame.clone();
                        next.pending.extend(
                            self.grammar.productions()[p]
                                .rhs
                                .iter()
                                .rev()
                                .map(|&s| (s, budget - 1)),
                        );
                        next.pending_min += added;
                        if self.fits(&next) {
                            self.stack.push(next);
                        }
                    }
                }
            }
        }
    }
}
