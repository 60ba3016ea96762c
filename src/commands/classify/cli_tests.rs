//! CLI parsing tests for classify command.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "classify",
        test_name: test_classify_requires_name,
        required_arg: "<NAME>",
    }

    crate::cli_defaults_test! {
        command: "classify",
        variant: Classify,
        required_args: ["GetUser", "SELECT * FROM users"],
        defaults: {
            cmd: ":one",
        },
    }

    crate::cli_option_test! {
        command: "classify",
        variant: Classify,
        test_name: test_classify_with_cmd,
        args: ["ListUsers", "SELECT * FROM users", "--cmd", ":many"],
        field: cmd,
        expected: ":many",
    }

    crate::cli_option_test! {
        command: "classify",
        variant: Classify,
        test_name: test_classify_sql_positional,
        args: ["GetUser", "SELECT * FROM users"],
        field: sql,
        expected: "SELECT * FROM users",
    }
}
