//! Core domain types shared across the entire deepchall workspace.
//!
//! Every formal-language backend speaks in terms of the types defined here:
//! [`Symbol`]s grouped into immutable [`Sample`]s, a [`Shape`] describing the
//! layout of those samples, and the [`Backend`] trait that both the automaton
//! and the grammar engines implement.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Symbols and Samples
// =============================================================================

/// A token drawn from a language alphabet of size `alphabet_size`.
///
/// Valid symbols of a language satisfy `0 <= symbol < alphabet_size`.
pub type Symbol = u32;

/// An ordered, finite sequence of symbols.
///
/// A sample is logically a single row of a rectangular `(1, LENGTH)`
/// container: one leading batch axis of size 1 and one variable-length axis.
/// Samples are immutable once produced.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample(Vec<Symbol>);

impl Sample {
    /// The empty sample.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Symbols of this sample.
    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the sample has no symbols.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dimensions of the sample viewed as a `(1, LENGTH)` container.
    pub fn dims(&self) -> [usize; 2] {
        [1, self.0.len()]
    }

    /// Extent of the sample along `axis`, `None` if the axis does not exist.
    pub fn extent(&self, axis: usize) -> Option<usize> {
        self.dims().get(axis).copied()
    }

    /// True when every symbol lies in `[0, alphabet_size)`.
    pub fn within_alphabet(&self, alphabet_size: usize) -> bool {
        self.0.iter().all(|&s| (s as usize) < alphabet_size)
    }

    /// Consume the sample, returning the raw symbols.
    pub fn into_symbols(self) -> Vec<Symbol> {
        self.0
    }
}

impl From<Vec<Symbol>> for Sample {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }
}

impl From<&[Symbol]> for Sample {
    fn from(symbols: &[Symbol]) -> Self {
        Self(symbols.to_vec())
    }
}

impl FromIterator<Symbol> for Sample {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, s) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{s}")?;
        }
        write!(f, "]")
    }
}

// =============================================================================
// Shape Contract
// =============================================================================

/// Errors raised while building or wiring shapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// More than one variable-length dimension was declared.
    #[error("shape {shape} declares {count} LENGTH dimensions (at most one is allowed)")]
    MultipleLengthDims { shape: String, count: usize },

    /// A language's declared shape disagrees with its backend's shape.
    #[error("shape mismatch: expected {expected}, found {found}")]
    Mismatch { expected: String, found: String },
}

/// Descriptor for a single dimension of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dim {
    /// A dimension of fixed size.
    Fixed(usize),
    /// A dimension whose size is decided by the language using the backend.
    Configurable,
    /// The variable dimension: its extent is "the length" of a sample.
    Length,
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Fixed(n) => write!(f, "{n}"),
            Dim::Configurable => write!(f, "CONFIGURABLE"),
            Dim::Length => write!(f, "LENGTH"),
        }
    }
}

/// Ordered list of dimension descriptors with at most one [`Dim::Length`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Shape(Vec<Dim>);

impl Shape {
    /// Build a shape, rejecting more than one `LENGTH` dimension.
    pub fn new(dims: impl Into<Vec<Dim>>) -> Result<Self, ShapeError> {
        let dims = dims.into();
        let count = dims.iter().filter(|d| **d == Dim::Length).count();
        if count > 1 {
            return Err(ShapeError::MultipleLengthDims {
                shape: Self(dims).to_string(),
                count,
            });
        }
        Ok(Self(dims))
    }

    /// The `(1, LENGTH)` shape used by sequence backends.
    pub fn sequence() -> Self {
        Self(vec![Dim::Fixed(1), Dim::Length])
    }

    /// Dimension descriptors in order.
    pub fn dims(&self) -> &[Dim] {
        &self.0
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Axis of the `LENGTH` dimension, if any.
    pub fn length_axis(&self) -> Option<usize> {
        self.0.iter().position(|d| *d == Dim::Length)
    }

    /// Length of `sample` as seen through this shape's `LENGTH` axis.
    pub fn sample_length(&self, sample: &Sample) -> Option<usize> {
        self.length_axis().and_then(|axis| sample.extent(axis))
    }

    /// Check that `self` (a language's shape) can be served by `backend`.
    ///
    /// Ranks must agree; every dimension must be equal, except that a
    /// `CONFIGURABLE` backend dimension accepts any fixed size.
    pub fn check_compatible(&self, backend: &Shape) -> Result<(), ShapeError> {
        let mismatch = || ShapeError::Mismatch {
            expected: backend.to_string(),
            found: self.to_string(),
        };
        if self.rank() != backend.rank() {
            return Err(mismatch());
        }
        for (lang_dim, backend_dim) in self.0.iter().zip(&backend.0) {
            let ok = match (lang_dim, backend_dim) {
                (a, b) if a == b => true,
                (Dim::Fixed(_), Dim::Configurable) => true,
                _ => false,
            };
            if !ok {
                return Err(mismatch());
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dims = Vec::<Dim>::deserialize(deserializer)?;
        Shape::new(dims).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, ")")
    }
}

// =============================================================================
// Backend Contract
// =============================================================================

/// Lazily pulled sequence of samples produced by a backend.
///
/// The sequence may be infinite. Dropping it cancels the enumeration.
pub type SampleIter<'a> = Box<dyn Iterator<Item = Sample> + 'a>;

/// Static metadata describing a kind of backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendInfo {
    /// Short identifier, e.g. `fsm`.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Shape of the samples produced by this backend kind.
    pub shape: Shape,
}

/// A formal-language engine able to enumerate and recognise its language.
///
/// `generate` and `parse` are total: they never fail. Malformed or
/// out-of-alphabet samples are simply not members.
pub trait Backend {
    /// Short identifier of the backend kind.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Shape of generated samples.
    fn shape(&self) -> &Shape;

    /// Number of distinct symbols this instance can emit.
    fn alphabet_size(&self) -> usize;

    /// Start a fresh enumeration of the language.
    ///
    /// With `max_length`, samples longer than the bound are never emitted.
    /// Each call is independent of every other call.
    fn generate(&self, max_length: Option<usize>) -> SampleIter<'_>;

    /// Decide whether `sample` belongs to the language.
    fn parse(&self, sample: &Sample) -> bool;

    /// Graphviz rendering of the underlying structure, if the backend has one.
    fn to_dot(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_shape_has_length_axis_one() {
        let shape = Shape::sequence();
        assert_eq!(shape.length_axis(), Some(1));
        assert_eq!(shape.to_string(), "(1, LENGTH)");
    }

    #[test]
    fn test_shape_rejects_two_length_dims() {
        let err = Shape::new(vec![Dim::Length, Dim::Fixed(3), Dim::Length]).unwrap_err();
        match err {
            ShapeError::MultipleLengthDims { count, .. } => assert_eq!(count, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_shape_without_length_is_valid() {
        let shape = Shape::new(vec![Dim::Configurable, Dim::Fixed(4)]).unwrap();
        assert_eq!(shape.length_axis(), None);
        assert_eq!(shape.sample_length(&Sample::from(vec![1, 2])), None);
    }

    #[test]
    fn test_check_compatible() {
        let backend = Shape::new(vec![Dim::Configurable, Dim::Length]).unwrap();
        let lang = Shape::new(vec![Dim::Fixed(5), Dim::Length]).unwrap();
        assert!(lang.check_compatible(&backend).is_ok());
        assert!(Shape::sequence().check_compatible(&Shape::sequence()).is_ok());

        let wrong_rank = Shape::new(vec![Dim::Length]).unwrap();
        assert!(matches!(
            wrong_rank.check_compatible(&backend),
            Err(ShapeError::Mismatch { .. })
        ));

        let wrong_fixed = Shape::new(vec![Dim::Fixed(2), Dim::Length]).unwrap();
        assert!(wrong_fixed.check_compatible(&Shape::sequence()).is_err());
    }

    #[test]
    fn test_sample_dims_and_length() {
        let sample = Sample::from(vec![0, 1, 2]);
        assert_eq!(sample.dims(), [1, 3]);
        assert_eq!(sample.extent(0), Some(1));
        assert_eq!(sample.extent(2), None);
        assert_eq!(Shape::sequence().sample_length(&sample), Some(3));
        assert_eq!(sample.to_string(), "[0, 1, 2]");
    }

    #[test]
    fn test_sample_within_alphabet() {
        assert!(Sample::from(vec![0, 1, 2]).within_alphabet(3));
        assert!(!Sample::from(vec![0, 3]).within_alphabet(3));
        assert!(Sample::empty().within_alphabet(1));
    }

    #[test]
    fn test_shape_serde() {
        let json = serde_json::to_string(&Shape::sequence()).unwrap();
        assert_eq!(json, r#"[{"fixed":1},"length"]"#);
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Shape::sequence());
        assert!(serde_json::from_str::<Shape>(r#"["length","length"]"#).is_err());
    }
}
