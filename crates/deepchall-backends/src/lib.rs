//! Formal-language backends: a non-deterministic finite automaton and a
//! context-free grammar engine behind one [`Backend`] contract.
//!
//! Both engines can:
//!
//! - **generate**: lazily enumerate the strings of their language, without
//!   bound unless the caller supplies a maximum length or pulls a bounded
//!   number of samples
//! - **parse**: decide membership of any candidate [`Sample`], answering
//!   `false` (never failing) for malformed or out-of-alphabet input
//!
//! ## Engines
//!
//! - [`Nfa`]: states in an arena, transitions as index lists; breadth-first
//!   enumeration and backtracking recognition
//! - [`Cfg`]: grammar text compiled into productions with a terminal table;
//!   depth-bounded derivation enumeration and Earley recognition
//!
//! [`Backend`]: deepchall_core::Backend
//! [`Sample`]: deepchall_core::Sample

pub mod cfg;
mod error;
pub mod nfa;

pub use cfg::{Cfg, Derivations, Grammar, GrammarSymbol};
pub use error::{BackendError, BackendResult};
pub use nfa::{Nfa, NfaGenerator, State, StateId, StateLabel, StateRef};

use deepchall_core::BackendInfo;

/// Metadata of every backend kind in this crate.
pub fn backend_infos() -> Vec<BackendInfo> {
    vec![Nfa::info(), Cfg::info()]
}
