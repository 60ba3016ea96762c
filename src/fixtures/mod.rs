//! Shared JSON fixtures for command and integration tests.

/// Users / posts / comments service with handlers on top.
///
/// Includes one query that fails to classify (`Vacuum`) and one call to a
/// method no query generates (`GetPostBySlug`).
pub const SIMPLE_PROJECT: &str = include_str!("simple_project.json");

/// A two-function cycle and a three-function cycle, each reaching one method.
pub const CYCLIC_PROJECT: &str = include_str!("cyclic_project.json");
