use std::collections::BTreeSet;
use std::error::Error;

use serde::Serialize;

use super::CyclesCmd;
use crate::commands::{Context, Execute};

/// A single call cycle
#[derive(Debug, Clone, Serialize)]
pub struct Cycle {
    /// Number of functions in the cycle
    pub length: usize,
    /// Call order: A → B → C → A
    pub functions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CyclesResult {
    pub total_cycles: usize,
    /// Distinct functions across the reported cycles
    pub functions_in_cycles: usize,
    pub cycles: Vec<Cycle>,
}

impl Execute for CyclesCmd {
    type Output = CyclesResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let resolution = ctx.resolve()?;

        let mut cycles: Vec<Cycle> = resolution
            .diagnostics
            .cycles
            .into_iter()
            .map(|warning| Cycle {
                length: warning.len(),
                functions: warning.functions,
            })
            .collect();

        if let Some(max_len) = self.max_length {
            cycles.retain(|c| c.length <= max_len);
        }
        if let Some(involving) = &self.involving {
            cycles.retain(|c| c.functions.iter().any(|f| f.contains(involving.as_str())));
        }

        let functions_in_cycles: BTreeSet<&str> = cycles
            .iter()
            .flat_map(|c| c.functions.iter().map(String::as_str))
            .collect();

        Ok(CyclesResult {
            total_cycles: cycles.len(),
            functions_in_cycles: functions_in_cycles.len(),
            cycles,
        })
    }
}
