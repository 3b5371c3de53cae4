//! Sample command implementation.

use anyhow::{bail, Result};
use deepchall_ops::{PreparedLanguage, Registry, RunParams, MAX_LENGTH};
use tracing::debug;

/// Options for [`execute`].
#[derive(Debug, Clone, Default)]
pub struct SampleOptions {
    /// Samples to print.
    pub count: usize,
    /// Length limit passed to the backend.
    pub max_length: Option<usize>,
    /// `key=value` parameter overrides.
    pub overrides: Vec<String>,
    /// Print the DOT graph instead of samples.
    pub dot: bool,
}

/// Print samples of `lang`, one per line, in generation order.
pub fn execute(registry: &Registry, lang: &str, options: &SampleOptions) -> Result<()> {
    let mut overrides = RunParams::new();
    for assignment in &options.overrides {
        let (name, value) = RunParams::parse_assignment(assignment)?;
        overrides.insert(name, value);
    }
    if let Some(max_length) = options.max_length {
        overrides.insert(MAX_LENGTH, max_length);
    }

    let prepared = PreparedLanguage::from_registry(registry, lang, &overrides)?;
    let backend = prepared.backend.as_ref();
    debug!(lang, backend = backend.name(), params = ?prepared.params, "language ready");

    if options.dot {
        match backend.to_dot() {
            Some(dot) => print!("{dot}"),
            None => bail!(
                "backend '{}' of language '{}' has no graph export",
                backend.name(),
                lang
            ),
        }
        return Ok(());
    }

    let max_length = prepared.params.optional_usize(MAX_LENGTH)?;
    for sample in backend.generate(max_length).take(options.count) {
        println!("{sample}");
    }
    Ok(())
}
