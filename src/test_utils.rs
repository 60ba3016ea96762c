//! Shared test utilities for command and module tests.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::commands::Context;
use crate::config::ConfigFile;
use crate::fixtures;
use crate::input::{AnalysisInput, InputSource};

/// Create a temporary file containing the given content.
pub fn create_temp_json_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

/// Build a context with default configuration over inline JSON input.
///
/// The JSON is deserialized but not validated, so commands see invalid
/// input the same way they would from a file.
pub fn context_from_json(json: &str) -> Context {
    let input: AnalysisInput = serde_json::from_str(json).expect("Fixture JSON should parse");
    Context::new(ConfigFile::default(), InputSource::Inline(input))
}

// =============================================================================
// Fixture-based helpers
// =============================================================================

/// Users, posts and comments behind service and handler layers.
///
/// Use for: analyze, functions, tables
pub fn simple_project() -> Context {
    context_from_json(fixtures::SIMPLE_PROJECT)
}

/// Two call cycles over a pair of queries.
///
/// Use for: cycles
pub fn cyclic_project() -> Context {
    context_from_json(fixtures::CYCLIC_PROJECT)
}

/// No queries and no functions.
pub fn empty_project() -> Context {
    context_from_json("{}")
}
