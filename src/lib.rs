//! table_deps library - table dependency analysis for sqlc-style projects
//!
//! Classifies named SQL queries, matches the generated data-access methods
//! against scanned call sites, and resolves which tables every function
//! reaches, directly or through the functions it calls.

pub mod cli;
pub mod commands;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod input;
pub mod logging;
pub mod output;
pub mod types;
pub mod utils;

#[macro_use]
pub mod test_macros;

#[cfg(test)]
pub mod fixtures;

#[cfg(test)]
pub mod test_utils;
