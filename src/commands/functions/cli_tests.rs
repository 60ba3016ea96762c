//! CLI parsing tests for functions command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    // =========================================================================
    // Option tests
    // =========================================================================

    crate::cli_defaults_test! {
        command: "functions",
        variant: Functions,
        required_args: [],
        defaults: {
            pattern: None,
            include_empty: false,
            common.regex: false,
        },
    }

    crate::cli_option_test! {
        command: "functions",
        variant: Functions,
        test_name: test_functions_with_pattern,
        args: ["PostHandler"],
        field: pattern,
        expected: Some("PostHandler".to_string()),
    }

    crate::cli_option_test! {
        command: "functions",
        variant: Functions,
        test_name: test_functions_include_empty,
        args: ["--include-empty"],
        field: include_empty,
        expected: true,
    }

    crate::cli_option_test! {
        command: "functions",
        variant: Functions,
        test_name: test_functions_with_regex,
        args: ["^service", "--regex"],
        field: common.regex,
        expected: true,
    }

    crate::cli_option_test! {
        command: "functions",
        variant: Functions,
        test_name: test_functions_with_limit,
        args: ["--limit", "5"],
        field: common.limit,
        expected: 5,
    }

    // =========================================================================
    // Limit validation tests
    // =========================================================================

    crate::cli_limit_tests! {
        command: "functions",
        variant: Functions,
        required_args: [],
        limit: {
            field: common.limit,
            default: 100,
            max: 1000,
        },
    }
}
