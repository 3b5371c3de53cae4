//! Error types for backend construction.

use deepchall_core::Symbol;
use thiserror::Error;

use crate::nfa::StateId;

/// Result type alias for backend construction.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors raised while building a backend.
///
/// Generation and recognition never fail; only construction does.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The grammar text could not be read.
    #[error("grammar syntax error on line {line}: {message}")]
    GrammarSyntax { line: usize, message: String },

    /// The grammar text declares no productions.
    #[error("grammar has no productions")]
    EmptyGrammar,

    /// Terminals used by productions are missing from the declared alphabet.
    #[error("grammar does not cover terminals: {}", missing.join(", "))]
    GrammarCoverage { missing: Vec<String> },

    /// A transition referenced a state that is not part of the automaton.
    #[error("state not found: {state:?}")]
    UnknownState { state: StateId },

    /// A transition symbol lies outside the automaton alphabet.
    #[error("symbol {symbol} is outside the alphabet of size {alphabet_size}")]
    SymbolOutOfAlphabet { symbol: Symbol, alphabet_size: usize },
}
