#[cfg(test)]
mod tests {
    use painel_core::*;
    use std::sync::Arc;
    use painel_test_support::{result_with, text_row, FakeDriver};

    const VENDAS_SQL: &str = "SELECT \"produto\", \"valor\" FROM \"vendas\" LIMIT 100";

    fn vendas_driver() -> FakeDriver {
        FakeDriver::new()
            .with_tables(&["vendas", "clientes"])
            .with_columns("vendas", &["id", "produto", "valor", "data"])
            .with_columns("clientes", &["id", "nome"])
            .with_query_result(
                VENDAS_SQL,
                result_with(
                    &["produto", "valor"],
                    vec![
                        text_row(&["Teclado", "150.50"]),
                        text_row(&["Mouse", "80.00"]),
                        text_row(&["Monitor", "900.00"]),
                    ],
                ),
            )
    }

    fn controller_for(driver: &FakeDriver) -> (ExplorerController, Arc<QueryCache>) {
        let handle = Handle::new(Arc::new(driver.connection()));
        let queries = Arc::new(QueryCache::new());
        let controller = ExplorerController::new(
            handle,
            Arc::new(SchemaCache::new()),
            queries.clone(),
            Box::new(PostgresDialect),
        );
        (controller, queries)
    }

    #[test]
    fn select_run_scenario_yields_selected_columns_and_rows() {
        let driver = vendas_driver();
        let (mut explorer, _) = controller_for(&driver);

        let columns = explorer.select_table("vendas").unwrap();
        assert_eq!(columns.len(), 4);

        explorer
            .select_columns(vec!["produto".to_string(), "valor".to_string()])
            .unwrap();

        let outcome = explorer.run_query(&[]).unwrap();
        assert_eq!(outcome.sql, VENDAS_SQL);
        assert_eq!(outcome.result.column_count(), 2);
        assert_eq!(outcome.row_count(), 3);

        assert!(matches!(explorer.state(), ExplorerState::Rendered { .. }));
        assert_eq!(explorer.session().queries_run(), 1);
        assert_eq!(explorer.session().visited_tables(), ["vendas"]);
        assert_eq!(explorer.last_sql(), Some(VENDAS_SQL));
    }

    #[test]
    fn default_selection_is_the_first_three_columns() {
        let driver = vendas_driver();
        let (mut explorer, _) = controller_for(&driver);

        explorer.select_table("vendas").unwrap();
        let defaults = explorer.select_default_columns().unwrap();

        assert_eq!(defaults, ["id", "produto", "valor"]);
    }

    #[test]
    fn narrow_tables_default_to_all_columns() {
        let driver = vendas_driver();
        let (mut explorer, _) = controller_for(&driver);

        explorer.select_table("clientes").unwrap();
        let defaults = explorer.select_default_columns().unwrap();

        assert_eq!(defaults, ["id", "nome"]);
    }

    #[test]
    fn unknown_table_is_rejected_before_any_sql() {
        let driver = vendas_driver();
        let (mut explorer, _) = controller_for(&driver);

        let result = explorer.select_table("salarios");
        assert!(matches!(result, Err(DbError::Validation(_))));

        assert!(matches!(explorer.state(), ExplorerState::Idle));
        assert!(explorer.session().visited_tables().is_empty());
        assert!(driver.executed_statements().is_empty());
    }

    #[test]
    fn empty_column_selection_is_rejected() {
        let driver = vendas_driver();
        let (mut explorer, _) = controller_for(&driver);

        explorer.select_table("vendas").unwrap();
        assert!(matches!(
            explorer.select_columns(vec![]),
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            explorer.select_columns(vec!["salario".to_string()]),
            Err(DbError::Validation(_))
        ));
    }

    #[test]
    fn runs_count_independently_of_cache_hits() {
        let driver = vendas_driver();
        let (mut explorer, _) = controller_for(&driver);

        explorer.select_table("vendas").unwrap();
        explorer
            .select_columns(vec!["produto".to_string(), "valor".to_string()])
            .unwrap();

        explorer.run_query(&[]).unwrap();
        explorer.run_query(&[]).unwrap();
        explorer.run_query(&[]).unwrap();

        assert_eq!(explorer.session().queries_run(), 3);
        // Only the first run reached the database.
        assert_eq!(driver.execution_count(VENDAS_SQL), 1);
    }

    #[test]
    fn failed_run_counts_and_leaves_cache_untouched() {
        // The listing has no expiry, so a table can vanish between the
        // first listing and the run.
        let sql = "SELECT \"id\", \"nome\" FROM \"clientes\" LIMIT 100";
        let driver = vendas_driver()
            .with_query_error(sql, "relation \"clientes\" does not exist");
        let (mut explorer, queries) = controller_for(&driver);

        explorer.select_table("clientes").unwrap();
        explorer.select_default_columns().unwrap();

        let before = explorer.session().queries_run();
        let result = explorer.run_query(&[]);

        assert!(matches!(result, Err(DbError::QueryExecution(_))));
        assert_eq!(explorer.session().queries_run(), before + 1);
        assert!(queries.is_empty());
        assert!(matches!(
            explorer.state(),
            ExplorerState::ColumnsSelected { .. }
        ));

        // Retry stays possible from the same selection.
        driver.set_query_result(sql, result_with(&["id", "nome"], vec![]));
        assert!(explorer.run_query(&[]).is_ok());
    }

    #[test]
    fn filters_narrow_the_generated_sql() {
        let filtered =
            "SELECT \"produto\", \"valor\" FROM \"vendas\" WHERE \"produto\" = 'Mouse' LIMIT 100";
        let driver = vendas_driver().with_query_result(
            filtered,
            result_with(&["produto", "valor"], vec![text_row(&["Mouse", "80.00"])]),
        );
        let (mut explorer, _) = controller_for(&driver);

        explorer.select_table("vendas").unwrap();
        explorer
            .select_columns(vec!["produto".to_string(), "valor".to_string()])
            .unwrap();

        let outcome = explorer
            .run_query(&[EqFilter::new("produto", Value::Text("Mouse".to_string()))])
            .unwrap();

        assert_eq!(outcome.sql, filtered);
        assert_eq!(outcome.row_count(), 1);
    }

    #[test]
    fn unknown_filter_column_is_rejected_without_counting() {
        let driver = vendas_driver();
        let (mut explorer, _) = controller_for(&driver);

        explorer.select_table("vendas").unwrap();
        explorer.select_default_columns().unwrap();

        let result = explorer.run_query(&[EqFilter::new("salario", Value::Int(1))]);
        assert!(matches!(result, Err(DbError::Validation(_))));
        assert_eq!(explorer.session().queries_run(), 0);
    }

    #[test]
    fn all_blank_insert_sends_no_statements() {
        let driver = vendas_driver();
        let (mut explorer, _) = controller_for(&driver);

        explorer.select_table("vendas").unwrap();

        let fields: Vec<(String, String)> = explorer
            .insert_form_columns()
            .unwrap()
            .into_iter()
            .map(|c| (c, String::new()))
            .collect();
        assert_eq!(fields.len(), 4);

        let result = explorer.insert_row(&fields);
        assert!(matches!(result, Err(DbError::Validation(_))));
        assert!(driver.inserts().is_empty());
        assert!(driver.executed_statements().is_empty());
    }

    #[test]
    fn insert_commits_then_invalidates_then_fresh_read_sees_the_row() {
        let driver = vendas_driver();
        let (mut explorer, queries) = controller_for(&driver);

        explorer.select_table("vendas").unwrap();
        explorer
            .select_columns(vec!["produto".to_string(), "valor".to_string()])
            .unwrap();
        assert_eq!(explorer.run_query(&[]).unwrap().row_count(), 3);
        assert_eq!(queries.len(), 1);

        let fields = vec![
            ("id".to_string(), String::new()),
            ("produto".to_string(), "Notebook".to_string()),
            ("valor".to_string(), "4500".to_string()),
            ("data".to_string(), String::new()),
        ];
        let affected = explorer.insert_row(&fields).unwrap();
        assert_eq!(affected, 1);

        // Exactly one insert, blank fields omitted, values typed.
        let inserts = driver.inserts();
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].columns, ["produto", "valor"]);
        assert_eq!(
            inserts[0].values,
            [Value::Text("Notebook".to_string()), Value::Int(4500)]
        );

        // The commit invalidated everything and reloaded the view.
        assert!(queries.is_empty());
        assert!(matches!(
            explorer.state(),
            ExplorerState::TableSelected { .. }
        ));

        // A subsequent read misses the cache and sees the new row.
        driver.set_query_result(
            VENDAS_SQL,
            result_with(
                &["produto", "valor"],
                vec![
                    text_row(&["Teclado", "150.50"]),
                    text_row(&["Mouse", "80.00"]),
                    text_row(&["Monitor", "900.00"]),
                    text_row(&["Notebook", "4500"]),
                ],
            ),
        );
        explorer
            .select_columns(vec!["produto".to_string(), "valor".to_string()])
            .unwrap();
        assert_eq!(explorer.run_query(&[]).unwrap().row_count(), 4);
        assert_eq!(driver.execution_count(VENDAS_SQL), 2);
    }

    #[test]
    fn failed_insert_rolls_back_to_column_selection() {
        let driver = vendas_driver().with_insert_error("value too long for type");
        let (mut explorer, queries) = controller_for(&driver);

        explorer.select_table("vendas").unwrap();
        explorer
            .select_columns(vec!["produto".to_string(), "valor".to_string()])
            .unwrap();
        explorer.run_query(&[]).unwrap();
        assert_eq!(queries.len(), 1);

        let result = explorer.insert_row(&[("produto".to_string(), "X".repeat(999))]);
        assert!(matches!(result, Err(DbError::Write(_))));

        // No commit, so no invalidation and no partial state.
        assert_eq!(queries.len(), 1);
        assert!(driver.inserts().is_empty());
        assert!(matches!(
            explorer.state(),
            ExplorerState::ColumnsSelected { .. }
        ));
    }

    #[test]
    fn raw_sql_path_accepts_only_read_statements() {
        let sql = "SELECT produto, SUM(valor) FROM vendas GROUP BY produto";
        let driver = vendas_driver()
            .with_query_result(sql, result_with(&["produto", "sum"], vec![]));
        let (mut explorer, _) = controller_for(&driver);

        assert!(explorer.run_raw_sql(sql).is_ok());
        assert_eq!(explorer.session().queries_run(), 1);

        let rejected = explorer.run_raw_sql("DELETE FROM vendas");
        assert!(matches!(rejected, Err(DbError::Validation(_))));
        assert_eq!(explorer.session().queries_run(), 1);
        assert_eq!(driver.executed_statements().len(), 1);
    }

    #[test]
    fn table_disk_size_reports_for_the_selected_table() {
        let driver = vendas_driver().with_table_size("vendas", 8192);
        let (mut explorer, _) = controller_for(&driver);

        assert!(matches!(
            explorer.table_disk_size(),
            Err(DbError::Validation(_))
        ));

        explorer.select_table("vendas").unwrap();
        assert_eq!(explorer.table_disk_size().unwrap(), 8192);
    }
}
