//! Output formatting tests for cycles command.

#[cfg(test)]
mod tests {
    use super::super::execute::{Cycle, CyclesResult};
    use rstest::{fixture, rstest};

    // =========================================================================
    // Expected outputs
    // =========================================================================

    const EMPTY_TABLE: &str = "No call cycles found.\n";

    const TWO_CYCLES_TABLE: &str = "\
Call Cycles

Found 2 cycle(s):

Cycle 1 (length 2):
  a.Alpha
    → a.Beta
    → a.Alpha

Cycle 2 (length 3):
  c.X
    → c.Y
    → c.Z
    → c.X

Total: 5 function(s) involved in cycles
";

    const TWO_CYCLES_CSV: &str = "\
cycle,length,functions
1,2,a.Alpha;a.Beta
2,3,c.X;c.Y;c.Z";

    // =========================================================================
    // Fixtures
    // =========================================================================

    #[fixture]
    fn empty_result() -> CyclesResult {
        CyclesResult {
            total_cycles: 0,
            functions_in_cycles: 0,
            cycles: vec![],
        }
    }

    #[fixture]
    fn two_cycles_result() -> CyclesResult {
        CyclesResult {
            total_cycles: 2,
            functions_in_cycles: 5,
            cycles: vec![
                Cycle {
                    length: 2,
                    functions: vec!["a.Alpha".to_string(), "a.Beta".to_string()],
                },
                Cycle {
                    length: 3,
                    functions: vec!["c.X".to_string(), "c.Y".to_string(), "c.Z".to_string()],
                },
            ],
        }
    }

    // =========================================================================
    // Tests
    // =========================================================================

    crate::output_table_test! {
        test_name: test_to_table_empty,
        fixture: empty_result,
        fixture_type: CyclesResult,
        expected: EMPTY_TABLE,
    }

    crate::output_table_test! {
        test_name: test_to_table_two_cycles,
        fixture: two_cycles_result,
        fixture_type: CyclesResult,
        expected: TWO_CYCLES_TABLE,
    }

    crate::output_table_test! {
        test_name: test_format_csv,
        fixture: two_cycles_result,
        fixture_type: CyclesResult,
        expected: TWO_CYCLES_CSV,
        format: Csv,
    }

    crate::output_json_test! {
        test_name: test_format_json,
        fixture: two_cycles_result,
        fixture_type: CyclesResult,
        assertions: {
            "total_cycles": 2,
            "functions_in_cycles": 5,
            "cycles": serde_json::json!([
                {"length": 2, "functions": ["a.Alpha", "a.Beta"]},
                {"length": 3, "functions": ["c.X", "c.Y", "c.Z"]},
            ]),
        },
    }

    crate::output_toon_test! {
        test_name: test_format_toon,
        fixture: two_cycles_result,
        fixture_type: CyclesResult,
        contains: ["total_cycles: 2", "a.Alpha"],
    }
}
