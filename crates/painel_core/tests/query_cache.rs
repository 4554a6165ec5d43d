#[cfg(test)]
mod tests {
    use painel_core::*;
    use std::sync::Arc;
    use std::time::Duration;
    use painel_test_support::{result_with, text_row, FakeDriver};
    use std::thread;

    const SQL: &str = "SELECT \"produto\" FROM \"vendas\" LIMIT 100";

    fn handle_for(driver: &FakeDriver) -> Handle {
        Handle::new(Arc::new(driver.connection()))
    }

    fn scripted_driver() -> FakeDriver {
        FakeDriver::new().with_query_result(
            SQL,
            result_with(&["produto"], vec![text_row(&["Teclado"])]),
        )
    }

    #[test]
    fn second_call_within_ttl_is_served_from_cache() {
        let driver = scripted_driver();
        let handle = handle_for(&driver);
        let cache = QueryCache::new();
        let req = QueryRequest::new(SQL);

        let first = cache.execute(&handle, &req).unwrap();
        let second = cache.execute(&handle, &req).unwrap();

        // Identical result object, one execution against the handle.
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(driver.execution_count(SQL), 1);
    }

    #[test]
    fn expired_entry_re_executes() {
        let driver = scripted_driver();
        let handle = handle_for(&driver);
        let cache = QueryCache::with_ttl(Duration::from_millis(10));
        let req = QueryRequest::new(SQL);

        cache.execute(&handle, &req).unwrap();
        thread::sleep(Duration::from_millis(25));
        cache.execute(&handle, &req).unwrap();

        assert_eq!(driver.execution_count(SQL), 2);
    }

    #[test]
    fn invalidate_all_forces_re_execution_regardless_of_age() {
        let driver = scripted_driver();
        let handle = handle_for(&driver);
        let cache = QueryCache::new();
        let req = QueryRequest::new(SQL);

        cache.execute(&handle, &req).unwrap();
        assert_eq!(cache.len(), 1);

        cache.invalidate_all();
        assert!(cache.is_empty());

        cache.execute(&handle, &req).unwrap();
        assert_eq!(driver.execution_count(SQL), 2);
    }

    #[test]
    fn failures_do_not_populate_the_cache() {
        let driver =
            FakeDriver::new().with_query_error(SQL, "relation \"vendas\" does not exist");
        let handle = handle_for(&driver);
        let cache = QueryCache::new();
        let req = QueryRequest::new(SQL);

        assert!(matches!(
            cache.execute(&handle, &req),
            Err(DbError::QueryExecution(_))
        ));
        assert!(cache.is_empty());

        // Once the statement starts succeeding, it is cached normally.
        driver.set_query_result(SQL, result_with(&["produto"], vec![]));
        cache.execute(&handle, &req).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_statements_are_distinct_entries() {
        let other = "SELECT \"valor\" FROM \"vendas\" LIMIT 100";
        let driver = scripted_driver()
            .with_query_result(other, result_with(&["valor"], vec![]));
        let handle = handle_for(&driver);
        let cache = QueryCache::new();

        cache.execute(&handle, &QueryRequest::new(SQL)).unwrap();
        cache.execute(&handle, &QueryRequest::new(other)).unwrap();

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_rows_is_a_cacheable_success() {
        let empty = "SELECT \"produto\" FROM \"vendas\" WHERE \"valor\" = 0 LIMIT 100";
        let driver =
            FakeDriver::new().with_query_result(empty, result_with(&["produto"], vec![]));
        let handle = handle_for(&driver);
        let cache = QueryCache::new();

        let result = cache.execute(&handle, &QueryRequest::new(empty)).unwrap();
        assert_eq!(result.row_count(), 0);
        assert_eq!(cache.len(), 1);
    }
}
