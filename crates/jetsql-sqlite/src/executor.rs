//! Statement executor.
//!
//! Renders statements with the SQLite dialect and runs them on a pool.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jetsql_core::{SqlValue, SqliteDialect, Statement};
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{Arguments, FromRow};
use tracing::debug;

use crate::error::Result;

/// What the logging hook is told about each executed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementLog {
    /// SQL text with placeholders, as sent to the database.
    pub sql: String,
    /// SQL text with the arguments inlined.
    pub debug_sql: String,
    pub elapsed: Duration,
    /// Rows changed; `None` for queries.
    pub rows_affected: Option<u64>,
}

type Logger = Arc<dyn Fn(&StatementLog) + Send + Sync>;

/// Outcome of [`Executor::exec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Rowid of the last inserted row.
    pub last_insert_id: i64,
}

/// Executes statements against a SQLite pool.
#[derive(Clone)]
pub struct Executor {
    pool: SqlitePool,
    dialect: SqliteDialect,
    logger: Option<Logger>,
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("pool", &self.pool)
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Creates an executor without a logging hook.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            dialect: SqliteDialect::new(),
            logger: None,
        }
    }

    /// Installs a hook called after every executed statement.
    #[must_use]
    pub fn with_logger(mut self, hook: impl Fn(&StatementLog) + Send + Sync + 'static) -> Self {
        self.logger = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::Build`](crate::ExecError::Build) when the
    /// statement cannot be rendered and
    /// [`ExecError::Database`](crate::ExecError::Database) when SQLite rejects
    /// it.
    pub async fn exec(&self, stmt: &(impl Statement + Sync)) -> Result<ExecResult> {
        let (sql, args) = self.render(stmt)?;
        let started = Instant::now();
        let done = sqlx::query_with(&sql, bind_all(args)?)
            .execute(&self.pool)
            .await?;
        self.log(stmt, &sql, started, Some(done.rows_affected()));
        Ok(ExecResult {
            rows_affected: done.rows_affected(),
            last_insert_id: done.last_insert_rowid(),
        })
    }

    /// Runs a query and returns the raw rows.
    ///
    /// # Errors
    ///
    /// Same as [`Executor::exec`].
    pub async fn query(&self, stmt: &(impl Statement + Sync)) -> Result<Vec<SqliteRow>> {
        let (sql, args) = self.render(stmt)?;
        let started = Instant::now();
        let rows = sqlx::query_with(&sql, bind_all(args)?)
            .fetch_all(&self.pool)
            .await?;
        self.log(stmt, &sql, started, None);
        Ok(rows)
    }

    /// Runs a query and maps every row with [`FromRow`].
    ///
    /// Projected columns are labelled `table.column`, so row structs name
    /// their fields with `#[sqlx(rename = "table.column")]`.
    ///
    /// # Errors
    ///
    /// Same as [`Executor::exec`], plus mapping failures as
    /// [`ExecError::Database`](crate::ExecError::Database).
    pub async fn query_as<T>(&self, stmt: &(impl Statement + Sync)) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let (sql, args) = self.render(stmt)?;
        let started = Instant::now();
        let rows = sqlx::query_as_with::<_, T, _>(&sql, bind_all(args)?)
            .fetch_all(&self.pool)
            .await?;
        self.log(stmt, &sql, started, None);
        Ok(rows)
    }

    fn render(&self, stmt: &impl Statement) -> Result<(String, Vec<SqlValue>)> {
        let (sql, args) = stmt.sql(&self.dialect)?;
        debug!(sql = %sql, args = args.len(), "Executing statement");
        Ok((sql, args))
    }

    fn log(&self, stmt: &impl Statement, sql: &str, started: Instant, rows_affected: Option<u64>) {
        let Some(logger) = &self.logger else {
            return;
        };
        let entry = StatementLog {
            sql: sql.to_owned(),
            debug_sql: stmt.debug_sql(&self.dialect).unwrap_or_default(),
            elapsed: started.elapsed(),
            rows_affected,
        };
        logger(&entry);
    }
}

/// Binds arguments positionally.
fn bind_all<'q>(values: Vec<SqlValue>) -> Result<SqliteArguments<'q>> {
    let mut args = SqliteArguments::default();
    for value in values {
        let added = match value {
            SqlValue::Null => args.add(Option::<i64>::None),
            SqlValue::Bool(b) => args.add(b),
            SqlValue::Int(i) => args.add(i),
            SqlValue::Float(f) => args.add(f),
            SqlValue::Text(s) => args.add(s),
            SqlValue::Blob(b) => args.add(b),
            SqlValue::Date(d) => args.add(d),
            SqlValue::Time(t) => args.add(t),
            SqlValue::Timestamp(ts) => args.add(ts),
            SqlValue::TimestampTz(ts) => args.add(ts),
        };
        added.map_err(sqlx::Error::Encode)?;
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::ExecError;
    use jetsql_core::expr::kind::{Integer, Text};
    use jetsql_core::expr::ExprKind;
    use jetsql_core::statement::{raw_statement, select};
    use jetsql_core::table::{Column, ReadableTable, Table, TableSource};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::Row;

    async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        sqlx::query("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    fn notes() -> Table {
        Table::new(
            None,
            "notes",
            &[("id", ExprKind::Integer), ("body", ExprKind::String)],
        )
    }

    fn id() -> Column<Integer> {
        Column::new("notes", "id")
    }

    fn body() -> Column<Text> {
        Column::new("notes", "body")
    }

    #[tokio::test]
    async fn test_exec_reports_rows_and_rowid() {
        let executor = Executor::new(create_test_pool().await);
        let insert = notes().insert(&body()).values(("a",)).values(("b",));
        let done = executor.exec(&insert).await.unwrap();
        assert_eq!(done.rows_affected, 2);
        assert_eq!(done.last_insert_id, 2);

        let update = notes()
            .update(&body())
            .set(("c",))
            .where_clause(id().gt(1));
        assert_eq!(executor.exec(&update).await.unwrap().rows_affected, 1);
    }

    #[tokio::test]
    async fn test_query_rows_use_dotted_labels() {
        let executor = Executor::new(create_test_pool().await);
        executor
            .exec(&notes().insert(&body()).values(("hello",)))
            .await
            .unwrap();
        let rows = executor
            .query(&notes().select((&id(), &body())))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let text: String = rows[0].get("notes.body");
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn test_logger_sees_debug_sql() {
        let seen: Arc<Mutex<Vec<StatementLog>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let executor = Executor::new(create_test_pool().await)
            .with_logger(move |log| sink.lock().unwrap().push(log.clone()));

        executor
            .exec(&notes().insert(&body()).values(("x",)))
            .await
            .unwrap();
        executor
            .query(&select(&body()).from(&notes()).where_clause(id().eq(1)))
            .await
            .unwrap();

        let logs = seen.lock().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].sql, "INSERT INTO notes (body)\nVALUES (?);");
        assert_eq!(logs[0].debug_sql, "INSERT INTO notes (body)\nVALUES ('x');");
        assert_eq!(logs[0].rows_affected, Some(1));
        assert!(logs[1].debug_sql.ends_with("WHERE (notes.id = 1);"));
        assert_eq!(logs[1].rows_affected, None);
    }

    #[tokio::test]
    async fn test_build_error_is_not_sent() {
        let executor = Executor::new(create_test_pool().await);
        let err = executor.exec(&notes().delete()).await.unwrap_err();
        assert!(matches!(err, ExecError::Build(_)));
    }

    #[tokio::test]
    async fn test_database_error() {
        let executor = Executor::new(create_test_pool().await);
        let err = executor
            .exec(&raw_statement("INSERT INTO missing VALUES (:v)").arg("v", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Database(_)));
    }
}
