//! Earley recogniser.
//!
//! Decides membership only; no parse trees are built. Prediction of a
//! nullable non-terminal also advances over it immediately, which keeps
//! completions of empty rules from being lost.

use std::collections::HashSet;

use deepchall_core::Symbol;

use super::grammar::{Grammar, GrammarSymbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Item {
    production: usize,
    dot: usize,
    origin: usize,
}

/// One Earley set: items in insertion order plus a membership index.
#[derive(Debug, Default)]
struct ItemSet {
    items: Vec<Item>,
    seen: HashSet<Item>,
}

impl ItemSet {
    fn add(&mut self, item: Item) {
        if self.seen.insert(item) {
            self.items.push(item);
        }
    }
}

fn next_symbol(grammar: &Grammar, item: Item) -> Option<GrammarSymbol> {
    grammar.productions()[item.production]
        .rhs
        .get(item.dot)
        .copied()
}

/// True iff `input` is derivable from the start symbol of `grammar`.
pub fn recognize(grammar: &Grammar, input: &[Symbol]) -> bool {
    let n = input.len();
    let mut chart: Vec<ItemSet> = (0..=n).map(|_| ItemSet::default()).collect();

    for &p in grammar.productions_of(grammar.start()) {
        chart[0].add(Item {
            production: p,
            dot: 0,
            origin: 0,
        });
    }

    for i in 0..=n {
        let mut j = 0;
        while j < chart[i].items.len() {
            let item = chart[i].items[j];
            j += 1;

            match next_symbol(grammar, item) {
                None => {
                    // complete
                    let lhs = grammar.productions()[item.production].lhs;
                    let waiting: Vec<Item> = chart[item.origin]
                        .items
                        .iter()
                        .filter(|w| {
                            next_symbol(grammar, **w) == Some(GrammarSymbol::NonTerminal(lhs))
                        })
                        .copied()
                        .collect();
                    for w in waiting {
                        chart[i].add(Item { dot: w.dot + 1, ..w });
                    }
                }
                Some(GrammarSymbol::NonTerminal(nt)) => {
                    // predict
                    for &p in grammar.productions_of(nt) {
                        chart[i].add(Item {
                            production: p,
                            dot: 0,
                            origin: i,
                        });
                    }
                    if grammar.is_nullable(nt) {
                        chart[i].add(Item {
                            dot: item.dot + 1,
                            ..item
                        });
                    }
                }
                Some(GrammarSymbol::Terminal(t)) => {
                    // scan
                    if i < n && input[i] == t {
                        chart[i + 1].add(Item {
                            dot: item.dot + 1,
                            ..item
                        });
                    }
                }
            }
        }
    }

    let start = grammar.start();
    chart[n].items.iter().any(|item| {
        let production = &grammar.productions()[item.production];
        item.origin == 0 && production.lhs == start && item.dot == production.rhs.len()
    })
}
