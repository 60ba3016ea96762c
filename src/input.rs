//! Analysis input: queries and scanned functions as one JSON document.
//!
//! ```json
//! {
//!   "queries": [{"name": "GetUser", "text": "SELECT ...", "cmd": ":one"}],
//!   "functions": [{"name": "service.UserService.GetUser", "calls": [...]}]
//! }
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Function, Query};

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read input {origin}: {source}")]
    Read {
        origin: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in input {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Query #{index} has an empty name")]
    EmptyQueryName { index: usize },

    #[error("Function #{index} has an empty name")]
    EmptyFunctionName { index: usize },

    #[error("Call #{call} in function '{function}' has an empty callee")]
    EmptyCallee { function: String, call: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInput {
    #[serde(default)]
    pub queries: Vec<Query>,
    #[serde(default)]
    pub functions: Vec<Function>,
}

impl AnalysisInput {
    pub fn from_json_str(content: &str, origin: &str) -> Result<Self, InputError> {
        let input: AnalysisInput = serde_json::from_str(content).map_err(|source| InputError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        input.validate()?;
        Ok(input)
    }

    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let origin = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| InputError::Read {
            origin: origin.clone(),
            source,
        })?;
        Self::from_json_str(&content, &origin)
    }

    pub fn from_reader(mut reader: impl Read, origin: &str) -> Result<Self, InputError> {
        let mut content = String::new();
        reader.read_to_string(&mut content).map_err(|source| InputError::Read {
            origin: origin.to_string(),
            source,
        })?;
        Self::from_json_str(&content, origin)
    }

    /// Reject structurally broken records. Query text is not checked here;
    /// bad SQL is the classifier's business.
    pub fn validate(&self) -> Result<(), InputError> {
        if let Some(index) = self.queries.iter().position(|q| q.name.trim().is_empty()) {
            return Err(InputError::EmptyQueryName { index });
        }
        for (index, function) in self.functions.iter().enumerate() {
            if function.qualified_name.trim().is_empty() {
                return Err(InputError::EmptyFunctionName { index });
            }
            if let Some(call) = function.call_sites.iter().position(|c| c.callee.trim().is_empty()) {
                return Err(InputError::EmptyCallee {
                    function: function.qualified_name.clone(),
                    call,
                });
            }
        }
        Ok(())
    }
}

/// Where a command reads its input from.
#[derive(Debug, Clone)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
    /// Already loaded, used by tests and embedding callers.
    Inline(AnalysisInput),
}

impl InputSource {
    pub fn load(&self) -> Result<AnalysisInput, InputError> {
        match self {
            InputSource::Stdin => AnalysisInput::from_reader(io::stdin().lock(), "<stdin>"),
            InputSource::File(path) => AnalysisInput::from_path(path),
            InputSource::Inline(input) => {
                input.validate()?;
                Ok(input.clone())
            }
        }
    }
}
