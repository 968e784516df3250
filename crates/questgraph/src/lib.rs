//! questgraph - quest chain validation and resolution from the command line
//!
//! The binary reads a chain definition file, validates it with
//! [`questgraph_chains::ChainResolver`] over in-memory adapters, and prints
//! the requested view of the chain: its completion order, the quests
//! eligible next, its dependency tiers or whether it can be completed at all.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

/// CLI argument parsing, error rendering and exit codes.
pub mod cli;
/// Command implementations.
pub mod commands;
/// Tracing setup.
pub mod tracing;
