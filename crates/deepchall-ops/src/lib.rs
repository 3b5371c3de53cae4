//! Deepchall Operations Layer
//!
//! Everything above the backends: named language presets, baseline models,
//! the preset registry, run configuration and the benchmark runner. The CLI
//! is a thin shell over this crate.
//!
//! ## Architecture
//!
//! - **Language**: a parameterised recipe producing a backend
//! - **Net**: a model trained on samples and asked for candidates
//! - **Registry**: name to factory lookup for both, plus backend metadata
//! - **Runner**: trains every net on every language and scores candidates
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use deepchall_ops::{Registry, RunConfig, Runner};
//!
//! fn main() -> anyhow::Result<()> {
//!     let registry = Registry::builtin();
//!     let config = RunConfig::load(Path::new("run.json"))?;
//!     let runner = Runner::new(&registry, config)?;
//!
//!     for report in runner.run() {
//!         println!("{} x {}: {}", report.lang, report.net, report.to_json());
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod lang;
mod net;
mod params;
mod registry;
mod runner;

// Re-export public API
pub use config::{InstanceConfig, RunConfig};
pub use error::{OpsError, OpsResult};
pub use lang::{DyckCfg, Language, ParityFsm, ToyCfg, ToyFsm};
pub use net::{Markov, Net, Uniform};
pub use params::{
    ParamSpec, RunParams, ALPHABET_SIZE, EPOCHS, MAX_LENGTH, MAX_SAMPLES, SHAPE, TEST_SAMPLES,
};
pub use registry::{LangFactory, NetFactory, Registry};
pub use runner::{PairReport, PreparedLanguage, RunStats, Runner};
