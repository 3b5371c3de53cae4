//! Uniform random baseline.

use deepchall_core::{Sample, Symbol};
use rand::{prelude::*, rngs::StdRng};
use tracing::debug;

use super::{alphabet_size, required_max_length, Net};
use crate::error::OpsResult;
use crate::params::{ParamSpec, RunParams};

const SEED: &str = "seed";

/// Ignores its training data and emits uniformly random strings.
#[derive(Debug)]
pub struct Uniform {
    max_length: usize,
    alphabet_size: usize,
    rng: StdRng,
}

impl Default for Uniform {
    fn default() -> Self {
        Self {
            max_length: 0,
            alphabet_size: 1,
            rng: StdRng::seed_from_u64(0),
        }
    }
}

impl Net for Uniform {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn description(&self) -> &'static str {
        "Random strings with length and symbols drawn uniformly, up to max_length"
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::new(SEED, "Seed of the sampling generator", 42)]
    }

    fn init(&mut self, params: &RunParams) -> OpsResult<()> {
        self.max_length = required_max_length(self.name(), params)?;
        self.alphabet_size = alphabet_size(params)?;
        self.rng = StdRng::seed_from_u64(params.u64(SEED)?);
        Ok(())
    }

    fn train(&mut self, samples: &mut dyn Iterator<Item = Sample>) -> OpsResult<()> {
        let seen = samples.count();
        debug!(samples = seen, "uniform baseline drained training data");
        Ok(())
    }

    fn generate(&mut self) -> Sample {
        let length = self.rng.random_range(0..=self.max_length);
        let upper = self.alphabet_size as Symbol;
        (0..length)
            .map(|_| self.rng.random_range(0..upper))
            .collect()
    }
}
