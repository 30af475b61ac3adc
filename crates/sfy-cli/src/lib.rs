//! # sfy CLI Handler Modules
//!
//! Subcommand argument types and handlers for the `sfy` binary.

pub mod simulate;
pub mod transitions;
