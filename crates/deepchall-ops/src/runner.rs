//! Benchmark runner.
//!
//! For every (language, net) pair: build the language's backend, train the
//! net on samples drawn from it, then count how many of the net's candidates
//! the backend accepts.

use std::time::Instant;

use deepchall_core::{Backend, Sample, SampleIter, Shape};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::error::{OpsError, OpsResult};
use crate::lang::Language;
use crate::net::Net;
use crate::params::{
    RunParams, ALPHABET_SIZE, MAX_LENGTH, MAX_SAMPLES, SHAPE, TEST_SAMPLES,
};
use crate::registry::Registry;

/// Statistics for one run pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Samples pulled from the backend.
    pub training_samples_generated: usize,
    /// Pulled samples dropped for exceeding `max_length`.
    pub training_samples_skipped: usize,
    /// Samples handed to the net.
    pub training_samples_used: usize,
    pub min_training_sample_length: Option<usize>,
    pub max_training_sample_length: Option<usize>,
    /// Candidates drawn from the trained net.
    pub test_samples: usize,
    /// Candidates the backend accepted.
    pub correct_generated: usize,
    /// `correct_generated / test_samples`, zero without candidates.
    pub accuracy: f64,
    /// Mean candidate length.
    pub avg_length: Option<f64>,
    pub training_time_secs: f64,
}

impl RunStats {
    fn record_training(&mut self, length: usize) {
        self.training_samples_used += 1;
        self.min_training_sample_length = Some(
            self.min_training_sample_length
                .map_or(length, |min| min.min(length)),
        );
        self.max_training_sample_length = Some(
            self.max_training_sample_length
                .map_or(length, |max| max.max(length)),
        );
    }
}

/// Outcome of one run pair.
#[derive(Debug)]
pub struct PairReport {
    /// Language instance name.
    pub lang: String,
    /// Net instance name.
    pub net: String,
    pub outcome: OpsResult<RunStats>,
}

impl PairReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// JSON view with either `stats` or `error` set.
    pub fn to_json(&self) -> serde_json::Value {
        match &self.outcome {
            Ok(stats) => json!({ "lang": self.lang, "net": self.net, "stats": stats }),
            Err(err) => json!({ "lang": self.lang, "net": self.net, "error": err.to_string() }),
        }
    }
}

/// Language, merged parameters and backend, ready for sampling.
pub struct PreparedLanguage {
    pub lang: Box<dyn Language>,
    pub params: RunParams,
    pub backend: Box<dyn Backend>,
}

impl PreparedLanguage {
    /// Merge parameters, initialise `lang` and build its backend.
    ///
    /// Precedence: global defaults < preset defaults < `overrides`. The
    /// backend must match the language's declared shape and stay inside
    /// its alphabet.
    pub fn new(mut lang: Box<dyn Language>, overrides: &RunParams) -> OpsResult<Self> {
        let params = RunParams::layered([
            &RunParams::global_defaults(),
            &RunParams::from_specs(&lang.params()),
            overrides,
        ]);
        lang.init(&params)?;
        let backend = lang.backend()?;
        lang.shape().check_compatible(backend.shape())?;
        if backend.alphabet_size() > lang.alphabet_size() {
            return Err(OpsError::AlphabetMismatch {
                lang: lang.name().to_string(),
                declared: lang.alphabet_size(),
                backend: backend.alphabet_size(),
            });
        }
        Ok(Self {
            lang,
            params,
            backend,
        })
    }

    /// Resolve `preset` in `registry` and prepare it.
    pub fn from_registry(
        registry: &Registry,
        preset: &str,
        overrides: &RunParams,
    ) -> OpsResult<Self> {
        let lang = registry
            .lang(preset)
            .ok_or_else(|| OpsError::UnknownPreset {
                kind: "lang",
                name: preset.to_string(),
            })?;
        Self::new(lang, overrides)
    }
}

/// Training stream that enforces the sample cap and length limit.
struct TrainingFeed<'a> {
    samples: SampleIter<'a>,
    shape: &'a Shape,
    max_length: Option<usize>,
    remaining: usize,
    stats: &'a mut RunStats,
}

impl Iterator for TrainingFeed<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        while self.remaining > 0 {
            let sample = self.samples.next()?;
            self.remaining -= 1;
            self.stats.training_samples_generated += 1;

            let length = self.shape.sample_length(&sample).unwrap_or(0);
            if self.max_length.is_some_and(|max| length > max) {
                debug!(%sample, length, "skipping sample longer than max_length");
                self.stats.training_samples_skipped += 1;
                continue;
            }
            self.stats.record_training(length);
            return Some(sample);
        }
        None
    }
}

/// Runs every configured language against every configured net.
#[derive(Debug)]
pub struct Runner<'r> {
    registry: &'r Registry,
    config: RunConfig,
}

impl<'r> Runner<'r> {
    /// Validate `config` against `registry`.
    pub fn new(registry: &'r Registry, config: RunConfig) -> OpsResult<Self> {
        config.validate(registry)?;
        Ok(Self { registry, config })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run all pairs, languages in the outer loop.
    ///
    /// A failing pair is logged and reported; the remaining pairs still run.
    pub fn run(&self) -> Vec<PairReport> {
        let mut reports = Vec::new();
        for lang in self.config.langs.keys() {
            for net in self.config.nets.keys() {
                let outcome = self.run_pair(lang, net);
                if let Err(err) = &outcome {
                    warn!(lang = %lang, net = %net, error = %err, "run aborted");
                }
                reports.push(PairReport {
                    lang: lang.clone(),
                    net: net.clone(),
                    outcome,
                });
            }
        }
        reports
    }

    /// Run one configured language instance against one net instance.
    pub fn run_pair(&self, lang_instance: &str, net_instance: &str) -> OpsResult<RunStats> {
        let lang_config = self.config.langs.get(lang_instance).ok_or_else(|| {
            OpsError::UnknownInstance {
                kind: "lang",
                name: lang_instance.to_string(),
            }
        })?;
        let net_config = self.config.nets.get(net_instance).ok_or_else(|| {
            OpsError::UnknownInstance {
                kind: "net",
                name: net_instance.to_string(),
            }
        })?;

        info!(lang = lang_instance, net = net_instance, "starting run");
        let prepared =
            PreparedLanguage::from_registry(self.registry, &lang_config.preset, &lang_config.params)?;
        let mut net = self
            .registry
            .net(&net_config.preset)
            .ok_or_else(|| OpsError::UnknownPreset {
                kind: "net",
                name: net_config.preset.clone(),
            })?;

        let net_params = self.net_params(&prepared, net.as_ref(), &net_config.params)?;
        debug!(lang = ?prepared.params, net = ?net_params, "merged parameters");
        net.init(&net_params)?;

        let stats = train_and_evaluate(&prepared, net.as_mut())?;
        info!(
            lang = lang_instance,
            net = net_instance,
            accuracy = stats.accuracy,
            used = stats.training_samples_used,
            "run finished"
        );
        Ok(stats)
    }

    /// Merged language parameters < net defaults < net overrides, plus the
    /// language's alphabet size and shape.
    fn net_params(
        &self,
        prepared: &PreparedLanguage,
        net: &dyn Net,
        overrides: &RunParams,
    ) -> OpsResult<RunParams> {
        let mut params = RunParams::layered([
            &prepared.params,
            &RunParams::from_specs(&net.params()),
            overrides,
        ]);
        params.insert(ALPHABET_SIZE, prepared.lang.alphabet_size());
        params.insert(SHAPE, serde_json::to_value(prepared.lang.shape())?);
        Ok(params)
    }
}

fn train_and_evaluate(prepared: &PreparedLanguage, net: &mut dyn Net) -> OpsResult<RunStats> {
    let backend = prepared.backend.as_ref();
    let max_length = prepared.params.optional_usize(MAX_LENGTH)?;
    let max_samples = prepared.params.usize(MAX_SAMPLES)?;
    let test_samples = prepared.params.usize(TEST_SAMPLES)?;

    let mut stats = RunStats::default();
    let started = Instant::now();
    {
        let mut feed = TrainingFeed {
            samples: backend.generate(max_length),
            shape: backend.shape(),
            max_length,
            remaining: max_samples,
            stats: &mut stats,
        };
        net.train(&mut feed)?;
    }
    stats.training_time_secs = started.elapsed().as_secs_f64();

    let mut total_length = 0usize;
    for _ in 0..test_samples {
        let candidate = net.generate();
        total_length += candidate.len();
        if backend.parse(&candidate) {
            stats.correct_generated += 1;
        }
    }
    stats.test_samples = test_samples;
    if test_samples > 0 {
        stats.accuracy = stats.correct_generated as f64 / test_samples as f64;
        stats.avg_length = Some(total_length as f64 / test_samples as f64);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ToyFsm;
    use serde_json::json;

    #[test]
    fn test_prepared_language_merges_defaults() {
        let overrides = RunParams::new().with(MAX_SAMPLES, 5);
        let prepared =
            PreparedLanguage::from_registry(&Registry::builtin(), "toy_cfg", &overrides).unwrap();
        assert_eq!(prepared.params.usize(MAX_SAMPLES).unwrap(), 5);
        assert_eq!(prepared.params.usize("max_depth").unwrap(), 20);
        assert_eq!(prepared.params.usize(TEST_SAMPLES).unwrap(), 100);
        assert_eq!(prepared.backend.name(), "cfg");
    }

    #[test]
    fn test_feed_caps_and_skips() {
        let prepared = PreparedLanguage::new(Box::new(ToyFsm), &RunParams::new()).unwrap();
        let backend = prepared.backend.as_ref();
        let mut stats = RunStats::default();
        let used: Vec<Sample> = TrainingFeed {
            samples: backend.generate(None),
            shape: backend.shape(),
            max_length: Some(1),
            remaining: 6,
            stats: &mut stats,
        }
        .collect();

        // [] [0] [0] then three samples of length 2
        assert_eq!(used.len(), 3);
        assert_eq!(stats.training_samples_generated, 6);
        assert_eq!(stats.training_samples_skipped, 3);
        assert_eq!(stats.training_samples_used, 3);
        assert_eq!(stats.min_training_sample_length, Some(0));
        assert_eq!(stats.max_training_sample_length, Some(1));
    }

    #[test]
    fn test_net_params_carry_language_context() {
        let registry = Registry::builtin();
        let config = RunConfig::from_value(&json!({
            "langs": { "l": { "lang": "toy_fsm", "max_length": 4 } },
            "nets": { "n": { "net": "markov", "order": 1 } }
        }))
        .unwrap();
        let runner = Runner::new(&registry, config).unwrap();
        let prepared =
            PreparedLanguage::from_registry(&registry, "toy_fsm", &runner.config().langs["l"].params)
                .unwrap();
        let net = registry.net("markov").unwrap();
        let params = runner
            .net_params(&prepared, net.as_ref(), &runner.config().nets["n"].params)
            .unwrap();

        assert_eq!(params.usize(ALPHABET_SIZE).unwrap(), 3);
        assert_eq!(params.usize(MAX_LENGTH).unwrap(), 4);
        assert_eq!(params.usize("order").unwrap(), 1);
        assert_eq!(params.u64("seed").unwrap(), 42);
        assert_eq!(params.get(SHAPE), Some(&json!([{ "fixed": 1 }, "length"])));
    }

    #[test]
    fn test_unknown_instance() {
        let registry = Registry::builtin();
        let runner = Runner::new(&registry, RunConfig::default()).unwrap();
        assert!(runner.run().is_empty());
        assert!(matches!(
            runner.run_pair("x", "y"),
            Err(OpsError::UnknownInstance { kind: "lang", .. })
        ));
    }
}
