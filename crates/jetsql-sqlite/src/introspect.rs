//! Schema metadata read from a live SQLite database.

use jetsql_core::codegen::{ColumnMeta, SchemaMeta, TableMeta};
use jetsql_core::statement::raw_statement;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

use crate::error::Result;
use crate::executor::Executor;

/// Reads every user table and its columns, in declaration order.
///
/// # Errors
///
/// Returns [`ExecError::Database`](crate::ExecError::Database) when the
/// catalog cannot be read.
pub async fn introspect(pool: &SqlitePool) -> Result<SchemaMeta> {
    let executor = Executor::new(pool.clone());
    let names: Vec<(String,)> = executor
        .query_as(&raw_statement(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        ))
        .await?;

    let mut tables = Vec::with_capacity(names.len());
    for (name,) in names {
        let columns: Vec<(String, String, i64, i64)> = executor
            .query_as(
                &raw_statement(
                    "SELECT name, type, \"notnull\", pk \
                     FROM pragma_table_info(:table) ORDER BY cid",
                )
                .arg("table", name.as_str()),
            )
            .await?;
        debug!(table = %name, columns = columns.len(), "Introspected table");
        tables.push(TableMeta {
            schema: None,
            name,
            columns: columns
                .into_iter()
                .map(|(name, sql_type, not_null, pk)| ColumnMeta {
                    name,
                    sql_type,
                    nullable: not_null == 0 && pk == 0,
                    primary_key: pk > 0,
                })
                .collect(),
        });
    }
    Ok(SchemaMeta { tables })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_introspect() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        for ddl in [
            "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL, bio TEXT)",
            "CREATE TABLE audit (at DATETIME, payload BLOB)",
        ] {
            sqlx::query(ddl).execute(&pool).await.unwrap();
        }

        let schema = introspect(&pool).await.unwrap();
        let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["audit", "users"]);

        let users = &schema.tables[1];
        assert_eq!(
            users.columns,
            vec![
                ColumnMeta {
                    name: String::from("id"),
                    sql_type: String::from("INTEGER"),
                    nullable: false,
                    primary_key: true,
                },
                ColumnMeta {
                    name: String::from("email"),
                    sql_type: String::from("TEXT"),
                    nullable: false,
                    primary_key: false,
                },
                ColumnMeta {
                    name: String::from("bio"),
                    sql_type: String::from("TEXT"),
                    nullable: true,
                    primary_key: false,
                },
            ]
        );
        assert_eq!(schema.tables[0].columns[0].sql_type, "DATETIME");
    }
}
