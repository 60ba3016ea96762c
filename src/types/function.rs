//! Scanned functions and the call sites inside them.

use serde::{Deserialize, Serialize};

/// One call expression inside a function body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub callee: String,
    /// Static type name of the receiver expression, empty for plain calls.
    #[serde(default)]
    pub receiver_type: String,
    pub line: u32,
    /// Qualified name of the analyzed function this call lands in, when the
    /// scanner could resolve it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl CallSite {
    /// A method call on a typed receiver (`q.GetUser(...)`).
    pub fn method(callee: impl Into<String>, receiver_type: impl Into<String>, line: u32) -> Self {
        Self {
            callee: callee.into(),
            receiver_type: receiver_type.into(),
            line,
            target: None,
        }
    }

    /// A call the scanner resolved to another analyzed function.
    pub fn to_function(
        callee: impl Into<String>,
        receiver_type: impl Into<String>,
        target: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            callee: callee.into(),
            receiver_type: receiver_type.into(),
            line,
            target: Some(target.into()),
        }
    }
}

/// A function record as produced by the source scanner.
///
/// Identity is `qualified_name`; everything else is location metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    #[serde(rename = "name")]
    pub qualified_name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub start_line: u32,
    #[serde(default)]
    pub end_line: u32,
    #[serde(default, rename = "calls")]
    pub call_sites: Vec<CallSite>,
}

impl Function {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            package: String::new(),
            file: String::new(),
            start_line: 0,
            end_line: 0,
            call_sites: Vec::new(),
        }
    }

    pub fn with_location(
        mut self,
        package: impl Into<String>,
        file: impl Into<String>,
        start_line: u32,
        end_line: u32,
    ) -> Self {
        self.package = package.into();
        self.file = file.into();
        self.start_line = start_line;
        self.end_line = end_line;
        self
    }

    pub fn with_call(mut self, call: CallSite) -> Self {
        self.call_sites.push(call);
        self
    }
}

/// Format location as "L42:50" or "file.go:L42:50".
/// Returns None when the scanner recorded no file.
pub fn format_location(file: &str, start_line: u32, end_line: u32) -> Option<String> {
    if file.is_empty() {
        return None;
    }
    let filename = file.rsplit('/').next().unwrap_or(file);
    Some(format!("{}:L{}:{}", filename, start_line, end_line))
}
