//! Sequence models under test.
//!
//! A [`Net`] is trained on samples drawn from a language and then asked to
//! produce candidates, which the runner checks for membership.

mod markov;
mod uniform;

pub use markov::Markov;
pub use uniform::Uniform;

use deepchall_core::Sample;

use crate::error::{OpsError, OpsResult};
use crate::params::{ParamSpec, RunParams, ALPHABET_SIZE, MAX_LENGTH};

/// A trainable generator of samples.
pub trait Net {
    /// Preset name used in run configurations.
    fn name(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Net-specific parameters and their defaults.
    fn params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Prepare for training.
    ///
    /// `params` carries the merged language parameters, the net's own
    /// parameters, `alphabet_size` and `shape`. Fails with
    /// [`OpsError::UnsupportedParameter`] when the net cannot work with the
    /// given setting.
    fn init(&mut self, params: &RunParams) -> OpsResult<()>;

    /// Consume training samples.
    fn train(&mut self, samples: &mut dyn Iterator<Item = Sample>) -> OpsResult<()>;

    /// Produce one candidate sample.
    fn generate(&mut self) -> Sample;
}

/// `max_length` as a hard requirement.
fn required_max_length(net: &str, params: &RunParams) -> OpsResult<usize> {
    params
        .optional_usize(MAX_LENGTH)?
        .ok_or_else(|| OpsError::unsupported(net, MAX_LENGTH))
}

fn alphabet_size(params: &RunParams) -> OpsResult<usize> {
    match params.usize(ALPHABET_SIZE)? {
        0 => Err(OpsError::invalid_param(ALPHABET_SIZE, "must be positive")),
        n => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_max_length() {
        let err = required_max_length("x", &RunParams::global_defaults()).unwrap_err();
        match err {
            OpsError::UnsupportedParameter { net, param } => {
                assert_eq!(net, "x");
                assert_eq!(param, MAX_LENGTH);
            }
            other => panic!("unexpected error: {other}"),
        }
        let params = RunParams::new().with(MAX_LENGTH, 7);
        assert_eq!(required_max_length("x", &params).unwrap(), 7);
    }

    #[test]
    fn test_alphabet_size_must_be_positive() {
        assert!(alphabet_size(&RunParams::new().with(ALPHABET_SIZE, 0)).is_err());
        assert!(alphabet_size(&RunParams::new()).is_err());
        assert_eq!(
            alphabet_size(&RunParams::new().with(ALPHABET_SIZE, 3)).unwrap(),
            3
        );
    }
}
