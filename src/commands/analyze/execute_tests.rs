//! Execute tests for analyze command.

#[cfg(test)]
mod tests {
    use super::super::AnalyzeCmd;
    use crate::engine::ClassificationError;
    use crate::types::{AdvisoryKind, Operation};
    use rstest::{fixture, rstest};

    crate::shared_fixture! {
        fixture_name: simple,
        fixture_type: simple_project,
    }

    crate::shared_fixture! {
        fixture_name: cyclic,
        fixture_type: cyclic_project,
    }

    crate::shared_fixture! {
        fixture_name: empty,
        fixture_type: empty_project,
    }

    // =========================================================================
    // Summary tests
    // =========================================================================

    // 18 functions; FindBySlug, Ping and main.main reach no table
    crate::execute_test! {
        test_name: test_analyze_summary_counts,
        fixture: simple,
        cmd: AnalyzeCmd { summary_only: false },
        assertions: |result| {
            assert_eq!(result.summary.functions, 18);
            assert_eq!(result.summary.functions_with_access, 15);
            assert_eq!(result.summary.methods, 10);
            assert_eq!(result.summary.tables, 3);
        },
    }

    crate::execute_test! {
        test_name: test_analyze_operation_totals,
        fixture: simple,
        cmd: AnalyzeCmd { summary_only: false },
        assertions: |result| {
            let totals = &result.summary.operation_totals;
            assert_eq!(totals[&Operation::Delete], 2);
            assert_eq!(totals[&Operation::Insert], 6);
            assert_eq!(totals[&Operation::Select], 15);
            assert!(!totals.contains_key(&Operation::Update));
        },
    }

    crate::execute_test! {
        test_name: test_analyze_package_counts,
        fixture: simple,
        cmd: AnalyzeCmd { summary_only: false },
        assertions: |result| {
            assert_eq!(result.summary.packages["service"], 11);
            assert_eq!(result.summary.packages["handler"], 6);
            assert_eq!(result.summary.packages["main"], 1);
        },
    }

    // =========================================================================
    // Diagnostics tests
    // =========================================================================

    crate::execute_test! {
        test_name: test_analyze_reports_skipped_query,
        fixture: simple,
        cmd: AnalyzeCmd { summary_only: false },
        assertions: |result| {
            let skipped = &result.diagnostics.classification_errors;
            assert_eq!(skipped.len(), 1);
            assert_eq!(skipped[0].query, "Vacuum");
            assert_eq!(
                skipped[0].error,
                ClassificationError::UnknownOperation { keyword: "VACUUM".to_string() }
            );
        },
    }

    crate::execute_test! {
        test_name: test_analyze_reports_unresolved_call,
        fixture: simple,
        cmd: AnalyzeCmd { summary_only: false },
        assertions: |result| {
            let unresolved = &result.diagnostics.unresolved_methods;
            assert_eq!(unresolved.len(), 1);
            assert_eq!(unresolved[0].function, "service.PostService.FindBySlug");
            assert_eq!(unresolved[0].method, "GetPostBySlug");
            assert_eq!(unresolved[0].line, 70);
            assert_eq!(result.diagnostics.error_count(), 2);
        },
    }

    // users is reached by 11 functions, above the default of 10
    crate::execute_test! {
        test_name: test_analyze_reports_busy_table,
        fixture: simple,
        cmd: AnalyzeCmd { summary_only: false },
        assertions: |result| {
            let advisories = &result.diagnostics.advisories;
            assert_eq!(advisories.len(), 1);
            assert_eq!(advisories[0].kind, AdvisoryKind::HighFunctionAccess);
            assert_eq!(advisories[0].table.as_deref(), Some("users"));
            assert_eq!(advisories[0].count, 11);
        },
    }

    crate::execute_test! {
        test_name: test_analyze_reports_cycles,
        fixture: cyclic,
        cmd: AnalyzeCmd { summary_only: false },
        assertions: |result| {
            assert_eq!(result.diagnostics.cycles.len(), 2);
            assert!(result.diagnostics.cancelled.is_none());
        },
    }

    crate::execute_test! {
        test_name: test_analyze_empty_input,
        fixture: empty,
        cmd: AnalyzeCmd { summary_only: false },
        assertions: |result| {
            assert_eq!(result.summary.functions, 0);
            assert_eq!(result.summary.tables, 0);
            assert!(result.diagnostics.is_clean());
        },
    }

    // =========================================================================
    // View inclusion tests
    // =========================================================================

    crate::execute_test! {
        test_name: test_analyze_includes_views,
        fixture: simple,
        cmd: AnalyzeCmd { summary_only: false },
        assertions: |result| {
            assert_eq!(result.function_view.as_ref().map(|v| v.len()), Some(18));
            assert_eq!(result.table_view.as_ref().map(|v| v.len()), Some(3));
        },
    }

    crate::execute_test! {
        test_name: test_analyze_summary_only_drops_views,
        fixture: simple,
        cmd: AnalyzeCmd { summary_only: true },
        assertions: |result| {
            assert!(result.function_view.is_none());
            assert!(result.table_view.is_none());
            assert_eq!(result.summary.tables, 3);
        },
    }

    #[rstest]
    fn test_analyze_csv_lists_function_table_pairs(simple: crate::commands::Context) {
        use crate::commands::CommandRunner;
        use crate::output::OutputFormat;

        let output = AnalyzeCmd { summary_only: false }.run(&simple, OutputFormat::Csv).unwrap();
        assert!(output.starts_with("# Function View\n"));
        assert!(output.contains("\nusers,handler.UserHandler.GetUser,SELECT\n"));
        let find_by_slug = output
            .lines()
            .filter(|line| line.starts_with("service.PostService.FindBySlug,"))
            .count();
        assert_eq!(find_by_slug, 1);
    }

    // =========================================================================
    // Error handling tests
    // =========================================================================

    #[rstest]
    fn test_analyze_error_budget(mut simple: crate::commands::Context) {
        use crate::commands::Execute;

        simple.config.max_errors = Some(1);
        let err = AnalyzeCmd { summary_only: false }.execute(&simple).unwrap_err();
        assert!(err.to_string().contains("2 recoverable errors exceed max_errors = 1"));
    }
}
