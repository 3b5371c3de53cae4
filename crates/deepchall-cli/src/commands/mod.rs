//! CLI command implementations.

pub mod run;
pub mod sample;
pub mod show;
