//! Execute tests for tables command.

#[cfg(test)]
mod tests {
    use super::super::TablesCmd;
    use crate::commands::CommonArgs;
    use crate::types::Operation;
    use rstest::{fixture, rstest};
    use std::collections::BTreeSet;

    crate::shared_fixture! {
        fixture_name: simple,
        fixture_type: simple_project,
    }

    fn tables(pattern: Option<&str>, operation: Option<Operation>) -> TablesCmd {
        TablesCmd {
            pattern: pattern.map(str::to_string),
            operation,
            common: CommonArgs {
                regex: false,
                limit: 100,
            },
        }
    }

    // =========================================================================
    // Core functionality tests
    // =========================================================================

    crate::execute_test! {
        test_name: test_tables_all,
        fixture: simple,
        cmd: tables(None, None),
        assertions: |result| {
            let names: Vec<&str> = result.entries.iter().map(|e| e.table.as_str()).collect();
            assert_eq!(names, vec!["comments", "posts", "users"]);
        },
    }

    // Six service functions and five handlers
    crate::execute_test! {
        test_name: test_tables_users_accessors,
        fixture: simple,
        cmd: tables(Some("users"), None),
        assertions: |result| {
            let users = &result.entries[0];
            assert_eq!(users.accessed_by.len(), 11);
            assert_eq!(users.operation_totals[&Operation::Select], 9);
            assert_eq!(users.operation_totals[&Operation::Insert], 2);
            assert_eq!(
                users.accessed_by["handler.UserHandler.CreateUser"],
                BTreeSet::from([Operation::Insert])
            );
        },
    }

    crate::execute_test! {
        test_name: test_tables_posts_totals,
        fixture: simple,
        cmd: tables(Some("posts"), None),
        assertions: |result| {
            let posts = &result.entries[0];
            assert_eq!(posts.accessed_by.len(), 7);
            assert_eq!(posts.operation_totals[&Operation::Delete], 1);
            assert_eq!(posts.operation_totals[&Operation::Insert], 2);
            assert_eq!(posts.operation_totals[&Operation::Select], 4);
        },
    }

    // Impact of a DELETE: the service method and the CTE cleanup
    crate::execute_test! {
        test_name: test_tables_operation_filter,
        fixture: simple,
        cmd: tables(None, Some(Operation::Delete)),
        assertions: |result| {
            assert_eq!(result.total_items, 2);
            let comments = &result.entries[0];
            assert_eq!(comments.table, "comments");
            assert_eq!(
                comments.accessed_by.keys().collect::<Vec<_>>(),
                vec!["service.PostService.Cleanup"]
            );
            let posts = &result.entries[1];
            assert_eq!(
                posts.accessed_by.keys().collect::<Vec<_>>(),
                vec!["service.PostService.DeletePost"]
            );
        },
    }

    crate::execute_test! {
        test_name: test_tables_regex_pattern,
        fixture: simple,
        cmd: TablesCmd {
            pattern: Some("^(posts|comments)$".to_string()),
            operation: None,
            common: CommonArgs { regex: true, limit: 100 },
        },
        assertions: |result| {
            assert_eq!(result.total_items, 2);
        },
    }

    crate::execute_test! {
        test_name: test_tables_with_limit,
        fixture: simple,
        cmd: TablesCmd {
            pattern: None,
            operation: None,
            common: CommonArgs { regex: false, limit: 1 },
        },
        assertions: |result| {
            assert_eq!(result.total_items, 3);
            assert_eq!(result.entries.len(), 1);
        },
    }

    // =========================================================================
    // No match / error tests
    // =========================================================================

    crate::execute_no_match_test! {
        test_name: test_tables_no_update,
        fixture: simple,
        cmd: tables(None, Some(Operation::Update)),
        empty_field: entries,
    }

    // The VACUUM query is skipped, so nothing is attributed to it
    crate::execute_no_match_test! {
        test_name: test_tables_skipped_query_adds_nothing,
        fixture: simple,
        cmd: tables(Some("vacuum"), None),
        empty_field: entries,
    }

    crate::execute_error_test! {
        test_name: test_tables_invalid_regex,
        fixture: simple,
        cmd: TablesCmd {
            pattern: Some("(unclosed".to_string()),
            operation: None,
            common: CommonArgs { regex: true, limit: 100 },
        },
        message: "Invalid pattern",
    }
}
