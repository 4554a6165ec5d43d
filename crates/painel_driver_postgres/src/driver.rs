use std::sync::Mutex;
use std::time::Instant;

use native_tls::TlsConnector;
use painel_core::{
    ColumnMeta, Connection, ConnectionProfile, DbConfig, DbDriver, DbError, InsertStatement,
    PostgresDialect, QueryRequest, QueryResult, Row, SslMode, TableRef, Value,
};
use postgres::types::{ToSql, Type};
use postgres::{Client, NoTls};
use postgres_native_tls::MakeTlsConnector;

const TABLE_LISTING_SQL: &str = "SELECT table_name FROM information_schema.tables \
     WHERE table_schema = 'public' ORDER BY table_name";

const TABLE_SIZE_SQL: &str = "SELECT pg_total_relation_size($1::text::regclass)";

pub struct PostgresDriver;

impl PostgresDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl DbDriver for PostgresDriver {
    fn connect(
        &self,
        profile: &ConnectionProfile,
        password: Option<&str>,
    ) -> Result<Box<dyn Connection>, DbError> {
        let DbConfig::Postgres {
            host,
            port,
            user,
            database,
            ssl_mode,
        } = &profile.config;

        let password = password.unwrap_or("");
        let conn_string = format!(
            "host={} port={} user={} password={} dbname={}",
            host, port, user, password, database
        );

        let client = match ssl_mode {
            SslMode::Disable => Client::connect(&conn_string, NoTls)
                .map_err(|e| DbError::Configuration(e.to_string()))?,
            SslMode::Prefer | SslMode::Require => {
                let connector = TlsConnector::builder()
                    .danger_accept_invalid_certs(*ssl_mode == SslMode::Prefer)
                    .build()
                    .map_err(|e| DbError::Configuration(format!("TLS error: {e}")))?;
                let tls = MakeTlsConnector::new(connector);

                match Client::connect(&conn_string, tls) {
                    Ok(c) => c,
                    Err(_) if *ssl_mode == SslMode::Prefer => {
                        Client::connect(&conn_string, NoTls)
                            .map_err(|e| DbError::Configuration(e.to_string()))?
                    }
                    Err(e) => return Err(DbError::Configuration(e.to_string())),
                }
            }
        };

        log::info!(
            "Connected to postgres://{}@{}:{}/{}",
            user,
            host,
            port,
            database
        );

        Ok(Box::new(PostgresConnection {
            client: Mutex::new(client),
        }))
    }
}

pub struct PostgresConnection {
    client: Mutex<Client>,
}

impl Connection for PostgresConnection {
    fn ping(&self) -> Result<(), DbError> {
        let mut client = self
            .client
            .lock()
            .map_err(|e| DbError::QueryExecution(e.to_string()))?;
        client
            .simple_query("SELECT 1")
            .map_err(|e| DbError::QueryExecution(e.to_string()))?;
        Ok(())
    }

    fn execute(&self, req: &QueryRequest) -> Result<QueryResult, DbError> {
        let start = Instant::now();

        log::debug!("Executing: {}", req.sql);

        let params = bind_params(&req.params);
        let param_refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| p.as_ref()).collect();

        // Prepare first so column metadata survives a zero-row result,
        // then run the query; the lock is released before row conversion.
        let (columns, rows) = {
            let mut client = self
                .client
                .lock()
                .map_err(|e| DbError::QueryExecution(e.to_string()))?;

            let stmt = client
                .prepare(&req.sql)
                .map_err(|e| query_error(&req.sql, e))?;
            let columns = column_meta(stmt.columns());

            let rows = client
                .query(&stmt, &param_refs)
                .map_err(|e| query_error(&req.sql, e))?;

            (columns, rows)
        };

        let limit = req.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let result_rows: Vec<Row> = rows
            .iter()
            .take(limit)
            .map(|row| (0..columns.len()).map(|i| read_value(row, i)).collect())
            .collect();

        Ok(QueryResult {
            columns,
            rows: result_rows,
            affected_rows: None,
            execution_time: start.elapsed(),
        })
    }

    fn list_tables(&self) -> Result<Vec<String>, DbError> {
        let mut client = self
            .client
            .lock()
            .map_err(|e| DbError::Schema(e.to_string()))?;

        let rows = client
            .query(TABLE_LISTING_SQL, &[])
            .map_err(|e| DbError::Schema(e.to_string()))?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    fn table_columns(&self, table: &TableRef) -> Result<Vec<ColumnMeta>, DbError> {
        // Zero-row probe: preparing the statement yields the column
        // metadata without executing it.
        let sql = format!("SELECT * FROM {} LIMIT 0", table.quoted(&PostgresDialect));

        let mut client = self
            .client
            .lock()
            .map_err(|e| DbError::Schema(e.to_string()))?;

        let stmt = client
            .prepare(&sql)
            .map_err(|e| DbError::Schema(e.to_string()))?;

        Ok(column_meta(stmt.columns()))
    }

    fn insert_row(&self, stmt: &InsertStatement) -> Result<u64, DbError> {
        let sql = stmt.to_sql(&PostgresDialect).ok_or_else(|| {
            DbError::Validation("Insert requires at least one column".to_string())
        })?;

        log::debug!("Executing insert: {}", sql);

        let params = bind_params(&stmt.values);
        let param_refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| p.as_ref()).collect();
        let param_types: Vec<Type> = stmt.values.iter().map(declared_type).collect();

        let mut client = self
            .client
            .lock()
            .map_err(|e| DbError::Write(e.to_string()))?;

        // Dropping the transaction without commit rolls it back, so a
        // failed execute leaves no partial write.
        let mut tx = client
            .transaction()
            .map_err(|e| DbError::Write(e.to_string()))?;

        let prepared = tx
            .prepare_typed(&sql, &param_types)
            .map_err(|e| DbError::Write(e.to_string()))?;

        let affected = tx
            .execute(&prepared, &param_refs)
            .map_err(|e| DbError::Write(e.to_string()))?;

        tx.commit().map_err(|e| DbError::Write(e.to_string()))?;

        Ok(affected)
    }

    fn table_disk_size(&self, table: &TableRef) -> Result<i64, DbError> {
        let mut client = self
            .client
            .lock()
            .map_err(|e| DbError::Schema(e.to_string()))?;

        let target = table.quoted(&PostgresDialect);
        let row = client
            .query_one(TABLE_SIZE_SQL, &[&target])
            .map_err(|e| DbError::Schema(e.to_string()))?;

        Ok(row.get(0))
    }
}

fn query_error(sql: &str, e: postgres::Error) -> DbError {
    log::error!("Statement failed: {} ({})", sql, e);
    DbError::QueryExecution(e.to_string())
}

fn column_meta(columns: &[postgres::Column]) -> Vec<ColumnMeta> {
    columns
        .iter()
        .map(|col| ColumnMeta {
            name: col.name().to_string(),
            type_name: col.type_().name().to_string(),
            nullable: true,
        })
        .collect()
}

fn bind_params(values: &[Value]) -> Vec<Box<dyn ToSql + Sync>> {
    values.iter().map(value_to_param).collect()
}

fn value_to_param(value: &Value) -> Box<dyn ToSql + Sync> {
    match value {
        Value::Null => Box::new(Option::<String>::None),
        Value::Bool(b) => Box::new(*b),
        Value::Int(i) => Box::new(*i),
        Value::Float(f) => Box::new(*f),
        Value::Text(s) => Box::new(s.clone()),
        Value::Bytes(b) => Box::new(b.clone()),
        Value::DateTime(dt) => Box::new(*dt),
        Value::Date(d) => Box::new(*d),
        Value::Time(t) => Box::new(*t),
    }
}

/// Declared parameter type for the prepared insert. Widest type per
/// value; the server applies assignment casts to the column type.
fn declared_type(value: &Value) -> Type {
    match value {
        Value::Null | Value::Text(_) => Type::TEXT,
        Value::Bool(_) => Type::BOOL,
        Value::Int(_) => Type::INT8,
        Value::Float(_) => Type::FLOAT8,
        Value::Bytes(_) => Type::BYTEA,
        Value::DateTime(_) => Type::TIMESTAMPTZ,
        Value::Date(_) => Type::DATE,
        Value::Time(_) => Type::TIME,
    }
}

fn read_value(row: &postgres::Row, idx: usize) -> Value {
    let col_type = row.columns()[idx].type_();

    match col_type.name() {
        "bool" => row
            .try_get::<_, bool>(idx)
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "int2" => row
            .try_get::<_, i16>(idx)
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),
        "int4" => row
            .try_get::<_, i32>(idx)
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),
        "int8" => row
            .try_get::<_, i64>(idx)
            .map(Value::Int)
            .unwrap_or(Value::Null),
        "float4" => row
            .try_get::<_, f32>(idx)
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),
        "float8" | "numeric" => row
            .try_get::<_, f64>(idx)
            .map(Value::Float)
            .unwrap_or(Value::Null),
        "bytea" => row
            .try_get::<_, Vec<u8>>(idx)
            .map(Value::Bytes)
            .unwrap_or(Value::Null),
        "timestamptz" => row
            .try_get::<_, chrono::DateTime<chrono::Utc>>(idx)
            .map(Value::DateTime)
            .unwrap_or(Value::Null),
        "timestamp" => row
            .try_get::<_, chrono::NaiveDateTime>(idx)
            .map(|v| Value::DateTime(v.and_utc()))
            .unwrap_or(Value::Null),
        "date" => row
            .try_get::<_, chrono::NaiveDate>(idx)
            .map(Value::Date)
            .unwrap_or(Value::Null),
        "time" => row
            .try_get::<_, chrono::NaiveTime>(idx)
            .map(Value::Time)
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<_, String>(idx)
            .map(Value::Text)
            .unwrap_or(Value::Null),
    }
}
