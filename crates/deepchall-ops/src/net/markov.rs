//! N-gram counting model.

use std::collections::HashMap;

use deepchall_core::{Sample, Symbol};
use rand::distr::weighted::WeightedIndex;
use rand::{prelude::*, rngs::StdRng};
use tracing::debug;

use super::{alphabet_size, required_max_length, Net};
use crate::error::{OpsError, OpsResult};
use crate::params::{ParamSpec, RunParams};

const ORDER: &str = "order";
const SEED: &str = "seed";

/// Predicts the next symbol from the previous `order` symbols.
///
/// Counts are kept for every context length up to `order`; generation backs
/// off to shorter contexts when a long one was never seen. A boundary token
/// pads the start of each sample and marks its end.
#[derive(Debug)]
pub struct Markov {
    order: usize,
    max_length: usize,
    alphabet_size: usize,
    counts: HashMap<Vec<Symbol>, Vec<u64>>,
    rng: StdRng,
}

impl Default for Markov {
    fn default() -> Self {
        Self {
            order: 2,
            max_length: 0,
            alphabet_size: 1,
            counts: HashMap::new(),
            rng: StdRng::seed_from_u64(0),
        }
    }
}

impl Markov {
    fn boundary(&self) -> Symbol {
        self.alphabet_size as Symbol
    }

    fn observe(&mut self, window: &[Symbol], next: Symbol) {
        let width = self.alphabet_size + 1;
        for k in 0..=self.order {
            let context = window[window.len() - k..].to_vec();
            self.counts.entry(context).or_insert_with(|| vec![0; width])[next as usize] += 1;
        }
    }

    fn draw(&mut self, history: &[Symbol]) -> Symbol {
        let longest = self.order.min(history.len());
        for k in (0..=longest).rev() {
            let context = &history[history.len() - k..];
            if let Some(weights) = self.counts.get(context) {
                if let Ok(dist) = WeightedIndex::new(weights) {
                    return dist.sample(&mut self.rng) as Symbol;
                }
            }
        }
        // untrained: end or any symbol, uniformly
        let boundary = self.boundary();
        self.rng.random_range(0..=boundary)
    }
}

impl Net for Markov {
    fn name(&self) -> &'static str {
        "markov"
    }

    fn description(&self) -> &'static str {
        "Back-off n-gram model over the previous `order` symbols"
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::new(
                ORDER,
                "Number of previous symbols used as context, at most max_length",
                2,
            ),
            ParamSpec::new(SEED, "Seed of the sampling generator", 42),
        ]
    }

    fn init(&mut self, params: &RunParams) -> OpsResult<()> {
        self.max_length = required_max_length(self.name(), params)?;
        self.alphabet_size = alphabet_size(params)?;
        let order = params.usize(ORDER)?;
        if order > self.max_length {
            return Err(OpsError::invalid_param(
                ORDER,
                format!("{order} exceeds max_length {}", self.max_length),
            ));
        }
        self.order = order;
        self.rng = StdRng::seed_from_u64(params.u64(SEED)?);
        self.counts.clear();
        Ok(())
    }

    fn train(&mut self, samples: &mut dyn Iterator<Item = Sample>) -> OpsResult<()> {
        let boundary = self.boundary();
        let mut seen = 0usize;
        for sample in samples {
            if !sample.within_alphabet(self.alphabet_size) {
                debug!(%sample, "ignoring sample outside the alphabet");
                continue;
            }
            let mut padded = vec![boundary; self.order];
            padded.extend_from_slice(sample.symbols());
            padded.push(boundary);
            for i in self.order..padded.len() {
                self.observe(&padded[i - self.order..i], padded[i]);
            }
            seen += 1;
        }
        debug!(samples = seen, contexts = self.counts.len(), "markov counts built");
        Ok(())
    }

    fn generate(&mut self) -> Sample {
        let boundary = self.boundary();
        let mut history = vec![boundary; self.order];
        let mut length = 0;
        while length < self.max_length {
            let next = self.draw(&history);
            if next == boundary {
                break;
            }
            history.push(next);
            length += 1;
        }
        Sample::from(history.split_off(self.order))
    }
}
